//! Scenario tests spanning the graph and the propagator

mod graph_invariants;

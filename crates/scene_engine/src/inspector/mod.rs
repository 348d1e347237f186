//! Scene inspection
//!
//! Read-only views and editable snapshots of the scene graph for debug
//! tooling: a flattened hierarchy, per-node properties and a selection that
//! notices when its node is removed.

mod hierarchy;
mod properties;

pub use hierarchy::{HierarchyRow, HierarchyView};
pub use properties::{NodeProperties, Selection};

//! Structural invariants under long mutation sequences

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::scene::{NodeDesc, NodeHandle, SceneError, SceneGraph};

/// Structural snapshot: roots plus every node's parent and children
fn snapshot(graph: &SceneGraph) -> (Vec<NodeHandle>, Vec<(NodeHandle, Option<NodeHandle>, Vec<NodeHandle>)>) {
    let mut nodes: Vec<_> = graph
        .iter()
        .map(|(handle, node)| (handle, node.parent(), node.children().to_vec()))
        .collect();
    nodes.sort_by_key(|(handle, _, _)| *handle);
    (graph.roots().to_vec(), nodes)
}

fn pick(rng: &mut StdRng, live: &[NodeHandle]) -> Option<NodeHandle> {
    if live.is_empty() {
        None
    } else {
        Some(live[rng.gen_range(0..live.len())])
    }
}

#[test]
fn test_random_mutations_keep_tree_consistent() {
    for seed in 0..8u64 {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut graph = SceneGraph::new();
        let mut live: Vec<NodeHandle> = Vec::new();
        let mut removed: Vec<NodeHandle> = Vec::new();

        for step in 0..400 {
            match rng.gen_range(0..6) {
                0 | 1 => {
                    let handle = graph.create_node(NodeDesc::new(format!("n{step}")));
                    live.push(handle);
                }
                2 => {
                    if let (Some(parent), Some(child)) = (pick(&mut rng, &live), pick(&mut rng, &live)) {
                        let before = snapshot(&graph);
                        match graph.attach(parent, child) {
                            Ok(()) => assert_eq!(graph.parent(child).unwrap(), Some(parent)),
                            Err(SceneError::Cycle { .. }) => assert_eq!(snapshot(&graph), before),
                            Err(other) => panic!("unexpected error {other:?}"),
                        }
                    }
                }
                3 => {
                    if let Some(node) = pick(&mut rng, &live) {
                        graph.detach(node).unwrap();
                        assert!(graph.roots().contains(&node));
                    }
                }
                4 => {
                    if let (Some(node), Some(target)) = (pick(&mut rng, &live), pick(&mut rng, &live)) {
                        let target = if rng.gen_bool(0.2) { None } else { Some(target) };
                        let _ = graph.reparent(node, target);
                    }
                }
                _ => {
                    if let Some(node) = pick(&mut rng, &live) {
                        let subtree = graph.descendants(node).unwrap();
                        let released = graph.remove(node).unwrap();
                        assert_eq!(released, subtree.len());
                        live.retain(|h| !subtree.contains(h));
                        removed.extend(subtree);
                    }
                }
            }

            if let Err(violation) = graph.verify_integrity() {
                panic!("seed {seed} step {step}: {violation}");
            }
            assert_eq!(graph.len(), live.len());
        }

        for stale in removed {
            assert!(!graph.contains(stale));
            assert_eq!(graph.node(stale).unwrap_err(), SceneError::DanglingHandle(stale));
        }
    }
}

#[test]
fn test_cycle_rejection_leaves_graph_unchanged() {
    let mut graph = SceneGraph::new();
    let a = graph.create_node(NodeDesc::new("A"));
    let b = graph.create_child(a, NodeDesc::new("B")).unwrap();
    let c = graph.create_child(b, NodeDesc::new("C")).unwrap();
    let before = snapshot(&graph);

    for (parent, child) in [(c, a), (b, a), (a, a), (c, b)] {
        let err = graph.attach(parent, child).unwrap_err();
        assert_eq!(err, SceneError::Cycle { parent, child });
        assert_eq!(snapshot(&graph), before);
    }
    graph.verify_integrity().unwrap();
}

#[test]
fn test_removed_subtree_is_unreachable() {
    let mut graph = SceneGraph::new();
    let root = graph.create_node(NodeDesc::new("Root"));
    let branch = graph.create_child(root, NodeDesc::new("Branch")).unwrap();
    let leaf_a = graph.create_child(branch, NodeDesc::new("LeafA")).unwrap();
    let leaf_b = graph.create_child(branch, NodeDesc::new("LeafB")).unwrap();
    let keep = graph.create_child(root, NodeDesc::new("Keep")).unwrap();

    assert_eq!(graph.remove(branch).unwrap(), 3);

    let reachable = graph.descendants(root).unwrap();
    assert_eq!(reachable, vec![root, keep]);
    for stale in [branch, leaf_a, leaf_b] {
        assert!(!reachable.contains(&stale));
        assert!(graph.children(stale).is_err());
        assert!(graph.set_name(stale, "ghost").is_err());
    }
    assert_eq!(graph.len(), 2);
}

#[test]
fn test_reparent_moves_subtree_intact() {
    let mut graph = SceneGraph::new();
    let old_parent = graph.create_node(NodeDesc::new("Old"));
    let new_parent = graph.create_node(NodeDesc::new("New"));
    let node = graph.create_child(old_parent, NodeDesc::new("Node")).unwrap();
    let kids: Vec<_> = (0..3)
        .map(|i| graph.create_child(node, NodeDesc::new(format!("Kid{i}"))).unwrap())
        .collect();

    graph.reparent(node, Some(new_parent)).unwrap();

    assert!(graph.children(old_parent).unwrap().is_empty());
    assert_eq!(graph.children(new_parent).unwrap(), &[node]);
    assert_eq!(graph.children(node).unwrap(), kids.as_slice());
    for kid in kids {
        assert_eq!(graph.parent(kid).unwrap(), Some(node));
    }
    graph.verify_integrity().unwrap();
}

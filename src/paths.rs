//! Path finder.
//!
//! Enumerates up to `K` acyclic predecessor paths from a node to the
//! root using the reverse-reference index, via an iterative DFS with
//! an explicit stack — same rationale as the forward post-order indexer:
//! dumps are large enough that
//! native call-stack recursion is not viable.

use fixedbitset::FixedBitSet;

use crate::graph::Graph;
use crate::handle::NodeHandle;
use crate::predecessors::Predecessors;

/// Tunable limits for [`reference_paths`]. Defaults match the values
/// pinned by the test fixtures: at most 5 paths, each at most 50 edges
/// deep.
#[derive(Debug, Clone, Copy)]
pub struct PathFinderConfig {
    pub max_paths: usize,
    pub max_depth: usize,
}

impl Default for PathFinderConfig {
    fn default() -> Self {
        PathFinderConfig {
            max_paths: 5,
            max_depth: 50,
        }
    }
}

/// One discovered retainer path, or a report that none exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathResult {
    /// `[target, p1, p2, ..., root]`, in that order.
    ToRoot(Vec<NodeHandle>),
    /// `target` has no path back to the root.
    Rootless(NodeHandle),
}

/// Finds up to `config.max_paths` paths from `target` to `graph.root()`.
///
/// If `target` is itself the root, the single-element path `[root]` is
/// returned. If no path exists, a single [`PathResult::Rootless`] is
/// returned instead of an empty list.
pub fn reference_paths(
    graph: &Graph,
    predecessors: &Predecessors,
    target: NodeHandle,
    config: PathFinderConfig,
) -> Vec<PathResult> {
    let root = graph.root();
    if target == root {
        return vec![PathResult::ToRoot(vec![root])];
    }

    let mut results = Vec::new();
    let mut path = vec![target];
    // Visited set scoped to the current path only (cycle guard), not a
    // global visited set across the whole search.
    let mut on_path = FixedBitSet::with_capacity(graph.node_count());
    on_path.insert(target.index());
    // frames[i] is the next predecessor index to try for path[i].
    let mut frames: Vec<usize> = vec![0];

    while !path.is_empty() {
        let node = *path.last().expect("path is non-empty in this branch");
        let preds = predecessors.of(node);
        let cursor = frames.last_mut().expect("frames mirrors path");

        if *cursor >= preds.len() {
            on_path.set(node.index(), false);
            path.pop();
            frames.pop();
            continue;
        }

        let candidate = preds[*cursor];
        *cursor += 1;

        if candidate == root {
            let mut found = path.clone();
            found.push(root);
            results.push(PathResult::ToRoot(found));
            if results.len() >= config.max_paths {
                break;
            }
            continue;
        }

        if on_path.contains(candidate.index()) {
            continue; // would re-enter the path already on the stack
        }
        if path.len() >= config.max_depth {
            continue; // depth cap reached, don't descend further this way
        }

        on_path.insert(candidate.index());
        path.push(candidate);
        frames.push(0);
    }

    if results.is_empty() {
        vec![PathResult::Rootless(target)]
    } else {
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handle::TypeHandle;
    use crate::loader::{RawNode, RawType};

    fn node(children: &[u32]) -> RawNode {
        RawNode {
            type_handle: TypeHandle::new(0),
            shallow_size: 1,
            address: 0,
            children: children.to_vec(),
        }
    }

    fn types() -> Vec<RawType> {
        vec![RawType { name: "T".into() }]
    }

    #[test]
    fn cycle_terminates_and_still_finds_path_to_root() {
        // 0(root) -> 1 -> 2 -> 1
        let nodes = vec![node(&[1]), node(&[2]), node(&[1])];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let preds = Predecessors::build(&graph);

        let results = reference_paths(&graph, &preds, NodeHandle::new(2), PathFinderConfig::default());
        assert_eq!(results.len(), 1);
        match &results[0] {
            PathResult::ToRoot(path) => {
                let indices: Vec<usize> = path.iter().map(|h| h.index()).collect();
                assert_eq!(indices, vec![2, 1, 0]);
            }
            other => panic!("expected a path to root, got {other:?}"),
        }
    }

    #[test]
    fn rootless_when_unreachable() {
        // 0(root) has no edges; node 1 has no predecessors at all.
        let nodes = vec![node(&[]), node(&[])];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let preds = Predecessors::build(&graph);

        let results = reference_paths(&graph, &preds, NodeHandle::new(1), PathFinderConfig::default());
        assert_eq!(results, vec![PathResult::Rootless(NodeHandle::new(1))]);
    }

    #[test]
    fn path_count_is_capped_at_configured_max() {
        // root -> {1..20}, each i -> target(21); 20 distinct paths to target.
        let mut root_children = Vec::new();
        let mut nodes = vec![RawNode {
            type_handle: TypeHandle::new(0),
            shallow_size: 1,
            address: 0,
            children: vec![], // placeholder, filled below
        }];
        for i in 1..=20u32 {
            root_children.push(i);
            nodes.push(node(&[21]));
        }
        nodes[0].children = root_children;
        nodes.push(node(&[])); // target node 21

        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let preds = Predecessors::build(&graph);

        let config = PathFinderConfig { max_paths: 5, max_depth: 50 };
        let results = reference_paths(&graph, &preds, NodeHandle::new(21), config);
        assert_eq!(results.len(), 5);
        for result in &results {
            match result {
                PathResult::ToRoot(path) => assert!(path.len() <= 51),
                other => panic!("expected a path to root, got {other:?}"),
            }
        }
    }
}

//! Post-order indexer.
//!
//! Produces a post-order permutation of the node handles reachable from
//! the root, via an iterative DFS with an explicit stack. The call stack
//! is never used for recursion here — dumps regularly have millions of
//! nodes — so every frame lives on a heap-allocated `Vec`.

use fixedbitset::FixedBitSet;

use crate::graph::{ChildCursor, Graph};
use crate::handle::NodeHandle;

/// Computes the post-order of nodes reachable from `graph.root()`.
///
/// `post_order[post_order.len() - 1]` is always the root. Every node
/// appears strictly after all of its descendants under the DFS spanning
/// tree. Unreachable nodes simply do not appear.
pub(crate) fn compute(graph: &Graph) -> Vec<NodeHandle> {
    let node_count = graph.node_count();
    let mut visited = FixedBitSet::with_capacity(node_count);
    let mut post_order = Vec::with_capacity(node_count);

    let root = graph.root();
    visited.insert(root.index());

    let mut stack: Vec<(NodeHandle, ChildCursor<'_>)> = Vec::new();
    stack.push((root, graph.node(root).children()));

    while let Some(frame) = stack.last_mut() {
        let child = frame.1.next_child();

        if child.is_valid() {
            if visited.contains(child.index()) {
                // Duplicate or back edge to an already-visited node: move on
                // to the next sibling rather than abandoning this frame.
                continue;
            }
            visited.insert(child.index());
            let cursor = graph.node(child).children();
            stack.push((child, cursor));
        } else {
            // No next child: this node is fully explored.
            let (node, _) = stack.pop().expect("stack is non-empty in this branch");
            post_order.push(node);
        }
    }

    post_order
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::Graph;
    use crate::handle::TypeHandle;
    use crate::loader::{RawNode, RawType};

    fn node(size: u64, children: &[u32]) -> RawNode {
        RawNode {
            type_handle: TypeHandle::new(0),
            shallow_size: size,
            address: 0,
            children: children.to_vec(),
        }
    }

    fn types() -> Vec<RawType> {
        vec![RawType { name: "T".into() }]
    }

    #[test]
    fn linear_chain_emits_descendants_before_ancestors() {
        // 0(root) -> 1 -> 2 -> 3
        let nodes = vec![
            node(0, &[1]),
            node(10, &[2]),
            node(20, &[3]),
            node(30, &[]),
        ];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let post = compute(&graph);
        let indices: Vec<usize> = post.iter().map(|h| h.index()).collect();
        assert_eq!(indices, vec![3, 2, 1, 0]);
    }

    #[test]
    fn diamond_visits_every_sibling_even_after_shared_child_is_visited() {
        // 0(root) -> {1, 2}; 1 -> 3; 2 -> 3
        // Node 3 is reached first via node 1; node 2 must still be visited
        // and emitted even though its child (3) is already visited by then.
        let nodes = vec![
            node(0, &[1, 2]),
            node(10, &[3]),
            node(10, &[3]),
            node(100, &[]),
        ];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let post = compute(&graph);
        let indices: Vec<usize> = post.iter().map(|h| h.index()).collect();
        // Node 2 must appear in the post-order at all (the bug described in
        // the design notes would drop it).
        assert!(indices.contains(&2), "post-order must include node 2: {indices:?}");
        assert_eq!(indices.last(), Some(&0));
        assert_eq!(indices.len(), 4);
    }

    #[test]
    fn cycle_terminates_and_still_emits_every_node() {
        // 0(root) -> 1 -> 2 -> 1 (cycle)
        let nodes = vec![node(0, &[1]), node(5, &[2]), node(5, &[1])];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let post = compute(&graph);
        let indices: Vec<usize> = post.iter().map(|h| h.index()).collect();
        assert_eq!(indices.last(), Some(&0));
        assert_eq!(indices.len(), 3);
    }

    #[test]
    fn duplicate_edge_to_visited_child_is_not_repushed() {
        // 0(root) -> 1, 0 -> 1 (duplicate edge), 1 -> 2
        let nodes = vec![node(0, &[1, 1]), node(5, &[2]), node(5, &[])];
        let graph = Graph::from_raw(nodes, types(), 0).unwrap();
        let post = compute(&graph);
        assert_eq!(post.len(), 3);
    }
}

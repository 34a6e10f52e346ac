//! Reverse-reference (predecessor) index.
//!
//! Built by one linear pass over every node's outgoing edges, stored in a
//! packed CSR-style layout: an offsets array of length `N + 1` and a flat
//! predecessor array of length `E`. Enumeration order is stable across
//! repeated calls on the same snapshot — it is the order edges were
//! encountered while scanning nodes in handle order — which is what makes
//! the path finder deterministic.

use crate::csr_index::GroupedHandles;
use crate::graph::Graph;
use crate::handle::NodeHandle;

#[derive(Debug, Clone)]
pub(crate) struct Predecessors {
    index: GroupedHandles,
}

impl Predecessors {
    /// Builds the reverse index for every node in `graph`. `O(N + E)` time
    /// and space.
    pub(crate) fn build(graph: &Graph) -> Self {
        let node_count = graph.node_count();
        let index = GroupedHandles::build(node_count, || {
            graph.node_handles().flat_map(move |parent| {
                graph
                    .child_targets(parent)
                    .iter()
                    .map(move |&child| (child.index(), parent))
            })
        });
        Predecessors { index }
    }

    /// All predecessors of `node`, i.e. every handle `p` with `node` among
    /// `p`'s children (a duplicate edge yields a duplicate entry here).
    #[inline]
    pub(crate) fn of(&self, node: NodeHandle) -> &[NodeHandle] {
        self.index.of(node.index())
    }
}

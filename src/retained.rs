//! Retained-size engine.
//!
//! One post-order sweep folds each node's retained size into its
//! immediate dominator. The post-order property guarantees every node is
//! processed before its dominator, so a single pass with no auxiliary
//! stack suffices.

use crate::graph::Graph;
use crate::handle::NodeHandle;

/// Computes `retained[n]` for every node in `graph`.
///
/// `retained[n]` is initialized to `shallow_size(n)`, then for every node
/// except the root (in post-order, so children before parents) its
/// retained size is folded into its immediate dominator's. Nodes
/// unreachable from the root (`idom[n]` invalid) are left at their own
/// shallow size and never contribute anywhere.
pub(crate) fn compute(graph: &Graph, post_order: &[NodeHandle], idom: &[NodeHandle]) -> Vec<u64> {
    let mut retained: Vec<u64> = graph
        .node_handles()
        .map(|n| graph.node(n).shallow_size())
        .collect();

    if let Some((_, rest)) = post_order.split_last() {
        for &node in rest {
            let dominator = idom[node.index()];
            if dominator.is_valid() {
                retained[dominator.index()] += retained[node.index()];
            }
        }
    }

    retained
}

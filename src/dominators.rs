//! Dominator tree builder.
//!
//! # The dominance relation
//!
//! In a directed graph with a root node **R**, a node **A** dominates a
//! node **B** iff every path from **R** to **B** passes through **A**. The
//! *immediate dominator* of **B** is the unique strict dominator of **B**
//! that does not dominate any other strict dominator of **B**.
//!
//! This is an adaptation of Cooper, Harvey & Kennedy's "Simple, Fast
//! Dominance Algorithm" to operate directly on the dense node handles and
//! the post-order already computed during graph indexing, rather than on generic graph
//! node identifiers: the post-order index doubles as the algorithm's
//! reverse-post-order numbering, so no separate numbering pass is needed.
//! It converges in `O(|V| * |E|)` worst case; any correct dominator
//! algorithm satisfies the contract, and this one reuses the post-order and
//! predecessor index directly.

use crate::graph::Graph;
use crate::handle::NodeHandle;
use crate::predecessors::Predecessors;

const UNDEFINED: u32 = u32::MAX;

/// Computes `iDom[n]` for every node in `graph`.
///
/// `post_order` must be the output of [`crate::postorder::compute`] for
/// the same graph. The result is indexed by `NodeHandle::index()`; the
/// root and any node unreachable from the root hold
/// [`NodeHandle::INVALID`].
pub(crate) fn build(graph: &Graph, post_order: &[NodeHandle], predecessors: &Predecessors) -> Vec<NodeHandle> {
    let node_count = graph.node_count();
    let length = post_order.len();
    let mut idom = vec![NodeHandle::INVALID; node_count];

    if length == 0 {
        return idom;
    }

    // Map a node handle to its index in `post_order`, for reachable nodes.
    let mut post_index = vec![UNDEFINED; node_count];
    for (idx, &node) in post_order.iter().enumerate() {
        post_index[node.index()] = idx as u32;
    }

    let root_idx = (length - 1) as u32;
    // `doms[i]` holds the post-order index of the immediate dominator of
    // `post_order[i]`, or UNDEFINED until first computed.
    let mut doms = vec![UNDEFINED; length];
    doms[root_idx as usize] = root_idx;

    let mut changed = true;
    while changed {
        changed = false;

        // Process in reverse post-order, skipping the root: nodes closer to
        // the root (larger post-order index) are handled first, so by the
        // time a node is processed, its DFS-tree parent already has a
        // provisional dominator.
        for idx in (0..root_idx).rev() {
            let node = post_order[idx as usize];

            let mut new_idom = UNDEFINED;
            for &pred in predecessors.of(node) {
                if pred == node {
                    continue; // self-loop, never a dominance-relevant predecessor
                }
                let pred_idx = match post_index[pred.index()] {
                    UNDEFINED => continue, // predecessor unreachable from root
                    pred_idx => pred_idx,
                };
                if doms[pred_idx as usize] == UNDEFINED {
                    continue; // predecessor not yet assigned a dominator this pass
                }
                new_idom = if new_idom == UNDEFINED {
                    pred_idx
                } else {
                    intersect(&doms, new_idom, pred_idx)
                };
            }

            if new_idom != UNDEFINED && doms[idx as usize] != new_idom {
                doms[idx as usize] = new_idom;
                changed = true;
            }
        }
    }

    for idx in 0..root_idx {
        let node = post_order[idx as usize];
        let dom_idx = doms[idx as usize];
        if dom_idx != UNDEFINED {
            idom[node.index()] = post_order[dom_idx as usize];
        }
    }

    idom
}

/// Walks two post-order-index "fingers" up the partially built dominator
/// tree until they meet; both inputs are guaranteed reachable.
fn intersect(doms: &[u32], mut a: u32, mut b: u32) -> u32 {
    loop {
        match a.cmp(&b) {
            std::cmp::Ordering::Less => a = doms[a as usize],
            std::cmp::Ordering::Greater => b = doms[b as usize],
            std::cmp::Ordering::Equal => return a,
        }
    }
}

/// Builds the inverse of `idom`: for each node, the nodes it immediately
/// dominates. Pure derived data, `O(N)` to build once `idom` is known.
pub(crate) fn children_index(
    idom: &[NodeHandle],
    node_count: usize,
) -> crate::csr_index::GroupedHandles {
    crate::csr_index::GroupedHandles::build(node_count, || {
        idom.iter().enumerate().filter_map(|(idx, &dom)| {
            dom.is_valid().then(|| (dom.index(), NodeHandle::new(idx)))
        })
    })
}

//! Type aggregator.
//!
//! Groups nodes by *type handle* (not name — the comparator
//! deliberately keys by name instead, and sums across handles that
//! happen to share one). Nodes with shallow size 0 are excluded: they are
//! synthetic/root bookkeeping nodes, not user data.

use indexmap::IndexMap;

use crate::graph::Graph;
use crate::handle::{NodeHandle, TypeHandle};

/// Aggregate statistics for one type handle.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeStats {
    pub type_handle: TypeHandle,
    pub name: String,
    pub instance_count: usize,
    pub shallow_size: u64,
    pub retained_size: u64,
    /// Instance node handles, stable, in node-handle order.
    pub instances: Vec<NodeHandle>,
}

struct Accumulator {
    instance_count: usize,
    shallow_size: u64,
    retained_size: u64,
    instances: Vec<NodeHandle>,
}

/// Aggregates every node with shallow size > 0 by type handle, returning
/// records sorted by retained size descending, ties broken by name
/// ascending.
pub fn aggregate(graph: &Graph, retained: &[u64]) -> Vec<TypeStats> {
    let mut groups: IndexMap<TypeHandle, Accumulator> = IndexMap::new();

    for node in graph.node_handles() {
        let n = graph.node(node);
        let shallow = n.shallow_size();
        if shallow == 0 {
            continue;
        }

        let group = groups.entry(n.type_handle()).or_insert_with(|| Accumulator {
            instance_count: 0,
            shallow_size: 0,
            retained_size: 0,
            instances: Vec::new(),
        });
        group.instance_count += 1;
        group.shallow_size += shallow;
        group.retained_size += retained[node.index()];
        group.instances.push(node);
    }

    let mut stats: Vec<TypeStats> = groups
        .into_iter()
        .map(|(type_handle, acc)| TypeStats {
            type_handle,
            name: graph.type_name(type_handle).to_string(),
            instance_count: acc.instance_count,
            shallow_size: acc.shallow_size,
            retained_size: acc.retained_size,
            instances: acc.instances,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.retained_size
            .cmp(&a.retained_size)
            .then_with(|| a.name.cmp(&b.name))
    });

    stats
}

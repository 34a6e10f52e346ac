//! Snapshot orchestration: wires the graph store, post-order indexer,
//! reverse-reference index, dominator tree, and retained-size fold
//! eagerly at construction, and exposes type aggregation, path finding,
//! and snapshot comparison as lazy queries on top.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use tracing::{debug, trace, warn};

use crate::compare::{self, ComparisonResult, InstanceComparison, SnapshotSummary};
use crate::csr_index::GroupedHandles;
use crate::display::TypeNameFormatter;
use crate::dominators;
use crate::error::Error;
use crate::graph::Graph;
use crate::handle::{NodeHandle, TypeHandle};
use crate::loader::{RawNode, RawType};
use crate::paths::{self, PathFinderConfig, PathResult};
use crate::postorder;
use crate::predecessors::Predecessors;
use crate::retained;
use crate::types::{self, TypeStats};

/// Aggregate totals plus the loader's pass-through counters.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HeapStatistics {
    pub total_objects: u64,
    pub total_shallow: u64,
    pub total_retained: u64,
    pub counters: BTreeMap<String, u64>,
}

/// An immutable, fully indexed heap graph plus its derived tables.
///
/// Once built, every field is plain owned data — `Snapshot` is
/// `Send + Sync`, so callers may share one behind an `Arc` across threads
/// for concurrent read-only queries; the engine itself never spawns
/// threads or holds a lock.
#[derive(Debug)]
pub struct Snapshot {
    graph: Graph,
    post_order: Vec<NodeHandle>,
    predecessors: Predecessors,
    idom: Vec<NodeHandle>,
    dominator_children: GroupedHandles,
    retained: Vec<u64>,
    counters: BTreeMap<String, u64>,
    type_stats: OnceLock<Vec<TypeStats>>,
    formatter: OnceLock<TypeNameFormatter>,
}

impl Snapshot {
    /// Builds a snapshot from loader-supplied raw data, eagerly computing
    /// the post-order, reverse index, dominator tree, and retained sizes.
    #[tracing::instrument(level = "debug", skip_all, fields(node_count = nodes.len(), type_count = types.len()))]
    pub fn new(
        nodes: Vec<RawNode>,
        types: Vec<RawType>,
        root: u32,
        counters: BTreeMap<String, u64>,
    ) -> Result<Self, Error> {
        warn_on_duplicate_addresses(&nodes);

        let graph = Graph::from_raw(nodes, types, root)?;

        let post_order = {
            trace!("computing post-order");
            postorder::compute(&graph)
        };
        let predecessors = {
            trace!("building reverse-reference index");
            Predecessors::build(&graph)
        };
        let idom = {
            trace!("building dominator tree");
            dominators::build(&graph, &post_order, &predecessors)
        };
        let dominator_children = dominators::children_index(&idom, graph.node_count());
        let retained = {
            trace!("folding retained sizes");
            retained::compute(&graph, &post_order, &idom)
        };

        debug!(node_count = graph.node_count(), "snapshot construction complete");

        Ok(Snapshot {
            graph,
            post_order,
            predecessors,
            idom,
            dominator_children,
            retained,
            counters,
            type_stats: OnceLock::new(),
            formatter: OnceLock::new(),
        })
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[inline]
    pub fn root(&self) -> NodeHandle {
        self.graph.root()
    }

    /// `retained[n]`, an array lookup. `n` must be a handle returned by
    /// this same snapshot; an out-of-range handle is a programmer error.
    #[inline]
    pub fn retained_size(&self, n: NodeHandle) -> u64 {
        debug_assert!(n.index() < self.retained.len(), "node handle out of range");
        self.retained[n.index()]
    }

    /// The immediate dominator of `n`, or [`NodeHandle::INVALID`] for the
    /// root and for nodes unreachable from it.
    #[inline]
    pub fn immediate_dominator(&self, n: NodeHandle) -> NodeHandle {
        debug_assert!(n.index() < self.idom.len(), "node handle out of range");
        self.idom[n.index()]
    }

    /// The nodes `n` immediately dominates (supplemental: the inverse of
    /// [`Snapshot::immediate_dominator`]).
    #[inline]
    pub fn dominator_children(&self, n: NodeHandle) -> &[NodeHandle] {
        self.dominator_children.of(n.index())
    }

    pub fn heap_statistics(&self) -> HeapStatistics {
        let total_objects = self
            .graph
            .node_handles()
            .filter(|&n| self.graph.node(n).shallow_size() > 0)
            .count() as u64;
        let total_shallow: u64 = self
            .graph
            .node_handles()
            .map(|n| self.graph.node(n).shallow_size())
            .sum();

        HeapStatistics {
            total_objects,
            total_shallow,
            total_retained: self.retained_size(self.root()),
            counters: self.counters.clone(),
        }
    }

    /// Type statistics, built and cached on first call. Per §4.6, this
    /// call also builds and caches the §6.3 type-name formatter over the
    /// observed names as a side effect, not just the statistics
    /// themselves — `type_name_formatter()` only needs to reuse what was
    /// cached here.
    pub fn type_statistics(&self) -> &[TypeStats] {
        let stats = self
            .type_stats
            .get_or_init(|| types::aggregate(&self.graph, &self.retained));
        self.formatter
            .get_or_init(|| TypeNameFormatter::new(stats.iter().map(|t| t.name.as_str())));
        stats
    }

    /// Type statistics truncated to `limit` entries, preserving sort order.
    pub fn type_statistics_limited(&self, limit: usize) -> &[TypeStats] {
        let stats = self.type_statistics();
        &stats[..stats.len().min(limit)]
    }

    /// The display-name formatter over this snapshot's observed type
    /// names. Built and cached as a side effect of [`Snapshot::type_statistics`]
    /// (per §4.6); calling this first builds it directly if
    /// `type_statistics` hasn't run yet.
    pub fn type_name_formatter(&self) -> &TypeNameFormatter {
        self.type_statistics();
        self.formatter
            .get_or_init(|| TypeNameFormatter::new(self.type_statistics().iter().map(|t| t.name.as_str())))
    }

    /// Up to `config.max_paths` predecessor paths from `n` to the root.
    pub fn reference_paths(&self, n: NodeHandle, config: PathFinderConfig) -> Vec<PathResult> {
        paths::reference_paths(&self.graph, &self.predecessors, n, config)
    }

    /// The `limit` reachable non-root nodes with the largest retained
    /// size, ties broken by handle ascending (supplemental).
    pub fn largest_retainers(&self, limit: usize) -> Vec<NodeHandle> {
        let root = self.root();
        let mut handles: Vec<NodeHandle> = self.graph.node_handles().filter(|&n| n != root).collect();
        handles.sort_unstable_by(|&a, &b| {
            self.retained[b.index()]
                .cmp(&self.retained[a.index()])
                .then_with(|| a.index().cmp(&b.index()))
        });
        handles.truncate(limit);
        handles
    }

    fn summary(&self) -> SnapshotSummary<'_> {
        let stats = self.heap_statistics();
        SnapshotSummary {
            total_objects: stats.total_objects,
            total_shallow: stats.total_shallow,
            total_retained: stats.total_retained,
            types: self.type_statistics(),
        }
    }

    pub fn type_name(&self, handle: TypeHandle) -> &str {
        self.graph.type_name(handle)
    }
}

/// Joins two snapshots' type aggregations by name, producing per-type
/// and aggregate deltas.
pub fn compare(baseline: &Snapshot, current: &Snapshot) -> ComparisonResult {
    compare::compare(baseline.summary(), current.summary())
}

/// The first `limit` baseline and current instances of `type_name`.
pub fn compare_instances(
    baseline: &Snapshot,
    current: &Snapshot,
    type_name: &str,
    limit: usize,
) -> InstanceComparison {
    compare::compare_instances(
        &baseline.graph,
        &baseline.retained,
        baseline.type_statistics(),
        &current.graph,
        &current.retained,
        current.type_statistics(),
        type_name,
        limit,
    )
}

fn warn_on_duplicate_addresses(nodes: &[RawNode]) {
    let mut seen = hashbrown::HashSet::with_capacity(nodes.len());
    for node in nodes {
        if node.address != 0 && !seen.insert(node.address) {
            warn!(address = node.address, "duplicate node address in loader input");
        }
    }
}

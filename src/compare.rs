//! Snapshot comparator.
//!
//! Joins two type aggregations by **type name** (the aggregator in
//! `types.rs` keys by type handle; this is the deliberate asymmetry
//! spec'd for cross-snapshot joining — distinct type handles across two
//! snapshots may legitimately share a name, and only the name survives
//! the join).

use indexmap::IndexMap;

use crate::graph::Graph;
use crate::handle::NodeHandle;
use crate::types::TypeStats;

/// The subset of a snapshot's aggregate state the comparator needs. Kept
/// separate from `Snapshot` itself so this module has no dependency on
/// the orchestrator — `Snapshot` depends on `compare`, never the reverse.
#[derive(Debug, Clone, Copy)]
pub struct SnapshotSummary<'a> {
    pub total_objects: u64,
    pub total_shallow: u64,
    pub total_retained: u64,
    pub types: &'a [TypeStats],
}

/// Where a type stands between two snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TypeStatus {
    Unchanged,
    Changed,
    Added,
    Removed,
}

/// Per-type comparison, joined by type name.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TypeDelta {
    pub name: String,
    pub baseline_count: u64,
    pub current_count: u64,
    pub baseline_shallow: u64,
    pub current_shallow: u64,
    pub baseline_retained: u64,
    pub current_retained: u64,
    pub count_delta: i64,
    pub shallow_delta: i64,
    pub retained_delta: i64,
    pub status: TypeStatus,
}

/// Signed deltas over the two snapshots' totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AggregateDeltas {
    pub object_count_delta: i64,
    pub shallow_delta: i64,
    pub retained_delta: i64,
}

/// Full result of comparing a baseline snapshot against a current one.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ComparisonResult {
    pub aggregate: AggregateDeltas,
    /// One entry per type name present in either snapshot, sorted by
    /// name ascending.
    pub types: Vec<TypeDelta>,
    pub new_types: Vec<String>,
    pub removed_types: Vec<String>,
}

struct Totals {
    count: u64,
    shallow: u64,
    retained: u64,
}

/// Sums per-name totals, folding together type handles that share a name
/// ("if the same type name appears more than once, sum before joining").
fn totals_by_name(types: &[TypeStats]) -> IndexMap<&str, Totals> {
    let mut by_name: IndexMap<&str, Totals> = IndexMap::new();
    for t in types {
        let entry = by_name.entry(t.name.as_str()).or_insert(Totals {
            count: 0,
            shallow: 0,
            retained: 0,
        });
        entry.count += t.instance_count as u64;
        entry.shallow += t.shallow_size;
        entry.retained += t.retained_size;
    }
    by_name
}

/// Compares `baseline` against `current`, producing per-type deltas and
/// aggregate deltas.
pub fn compare(baseline: SnapshotSummary<'_>, current: SnapshotSummary<'_>) -> ComparisonResult {
    let baseline_totals = totals_by_name(baseline.types);
    let current_totals = totals_by_name(current.types);

    let mut names: Vec<&str> = baseline_totals
        .keys()
        .chain(current_totals.keys())
        .copied()
        .collect();
    names.sort_unstable();
    names.dedup();

    let mut types = Vec::with_capacity(names.len());
    let mut new_types = Vec::new();
    let mut removed_types = Vec::new();

    for name in names {
        let zero = || Totals { count: 0, shallow: 0, retained: 0 };
        let b = baseline_totals.get(name).map_or_else(zero, |t| Totals {
            count: t.count,
            shallow: t.shallow,
            retained: t.retained,
        });
        let c = current_totals.get(name).map_or_else(zero, |t| Totals {
            count: t.count,
            shallow: t.shallow,
            retained: t.retained,
        });

        let count_delta = c.count as i64 - b.count as i64;
        let shallow_delta = c.shallow as i64 - b.shallow as i64;
        let retained_delta = c.retained as i64 - b.retained as i64;

        let status = if b.count == 0 && c.count > 0 {
            new_types.push(name.to_string());
            TypeStatus::Added
        } else if b.count > 0 && c.count == 0 {
            removed_types.push(name.to_string());
            TypeStatus::Removed
        } else if count_delta != 0 || retained_delta != 0 {
            TypeStatus::Changed
        } else {
            TypeStatus::Unchanged
        };

        types.push(TypeDelta {
            name: name.to_string(),
            baseline_count: b.count,
            current_count: c.count,
            baseline_shallow: b.shallow,
            current_shallow: c.shallow,
            baseline_retained: b.retained,
            current_retained: c.retained,
            count_delta,
            shallow_delta,
            retained_delta,
            status,
        });
    }

    ComparisonResult {
        aggregate: AggregateDeltas {
            object_count_delta: current.total_objects as i64 - baseline.total_objects as i64,
            shallow_delta: current.total_shallow as i64 - baseline.total_shallow as i64,
            retained_delta: current.total_retained as i64 - baseline.total_retained as i64,
        },
        types,
        new_types,
        removed_types,
    }
}

/// One instance's size/identity facts, as surfaced by instance comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceDetail {
    pub handle: NodeHandle,
    pub address: u64,
    pub shallow_size: u64,
    pub retained_size: u64,
}

/// The first `limit` instances of a given type name in each of two
/// snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceComparison {
    pub type_name: String,
    pub baseline: Vec<InstanceDetail>,
    pub current: Vec<InstanceDetail>,
}

fn instance_details(
    graph: &Graph,
    retained: &[u64],
    types: &[TypeStats],
    type_name: &str,
    limit: usize,
) -> Vec<InstanceDetail> {
    types
        .iter()
        .filter(|t| t.name == type_name)
        .flat_map(|t| t.instances.iter().copied())
        .take(limit)
        .map(|handle| {
            let node = graph.node(handle);
            InstanceDetail {
                handle,
                address: node.address(),
                shallow_size: node.shallow_size(),
                retained_size: retained[handle.index()],
            }
        })
        .collect()
}

/// Returns the first `limit` baseline and current instances of `type_name`.
#[allow(clippy::too_many_arguments)]
pub fn compare_instances(
    baseline_graph: &Graph,
    baseline_retained: &[u64],
    baseline_types: &[TypeStats],
    current_graph: &Graph,
    current_retained: &[u64],
    current_types: &[TypeStats],
    type_name: &str,
    limit: usize,
) -> InstanceComparison {
    InstanceComparison {
        type_name: type_name.to_string(),
        baseline: instance_details(baseline_graph, baseline_retained, baseline_types, type_name, limit),
        current: instance_details(current_graph, current_retained, current_types, type_name, limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(type_handle: u32, name: &str, count: usize, shallow: u64, retained: u64) -> TypeStats {
        TypeStats {
            type_handle: crate::handle::TypeHandle::new(type_handle as usize),
            name: name.to_string(),
            instance_count: count,
            shallow_size: shallow,
            retained_size: retained,
            instances: Vec::new(),
        }
    }

    #[test]
    fn added_removed_and_changed_types_are_classified_correctly() {
        let baseline_types = vec![stats(0, "X", 3, 300, 300)];
        let current_types = vec![stats(0, "X", 5, 600, 600), stats(1, "Y", 1, 50, 50)];

        let baseline = SnapshotSummary {
            total_objects: 3,
            total_shallow: 300,
            total_retained: 300,
            types: &baseline_types,
        };
        let current = SnapshotSummary {
            total_objects: 6,
            total_shallow: 650,
            total_retained: 650,
            types: &current_types,
        };

        let result = compare(baseline, current);

        assert_eq!(result.aggregate.object_count_delta, 3);

        let x = result.types.iter().find(|d| d.name == "X").unwrap();
        assert_eq!(x.status, TypeStatus::Changed);
        assert_eq!(x.count_delta, 2);
        assert_eq!(x.retained_delta, 300);

        let y = result.types.iter().find(|d| d.name == "Y").unwrap();
        assert_eq!(y.status, TypeStatus::Added);
        assert_eq!(result.new_types, vec!["Y".to_string()]);
        assert!(result.removed_types.is_empty());
    }

    #[test]
    fn status_precedence_is_exhaustive_and_exclusive() {
        let cases = vec![
            (0u64, 0u64, 0i64, TypeStatus::Unchanged),
            (0, 1, 1, TypeStatus::Added),
            (1, 0, -1, TypeStatus::Removed),
            (1, 2, 10, TypeStatus::Changed),
            (1, 1, 0, TypeStatus::Unchanged),
        ];
        for (b, c, _retained_delta, expected) in cases {
            let baseline_types = if b > 0 { vec![stats(0, "X", b as usize, 0, 0)] } else { vec![] };
            let current_types = if c > 0 { vec![stats(0, "X", c as usize, 0, 0)] } else { vec![] };
            let baseline = SnapshotSummary { total_objects: b, total_shallow: 0, total_retained: 0, types: &baseline_types };
            let current = SnapshotSummary { total_objects: c, total_shallow: 0, total_retained: 0, types: &current_types };
            let result = compare(baseline, current);
            if b == 0 && c == 0 {
                assert!(result.types.is_empty());
                continue;
            }
            assert_eq!(result.types[0].status, expected, "b={b} c={c}");
        }
    }

    #[test]
    fn comparing_a_snapshot_with_itself_is_unchanged() {
        let types = vec![stats(0, "X", 3, 300, 300), stats(1, "Y", 1, 50, 50)];
        let summary = SnapshotSummary {
            total_objects: 4,
            total_shallow: 350,
            total_retained: 350,
            types: &types,
        };

        let result = compare(summary, summary);

        assert_eq!(result.aggregate.object_count_delta, 0);
        assert_eq!(result.aggregate.shallow_delta, 0);
        assert_eq!(result.aggregate.retained_delta, 0);
        assert!(result.types.iter().all(|d| d.status == TypeStatus::Unchanged));
        assert!(result.new_types.is_empty());
        assert!(result.removed_types.is_empty());
    }

    #[test]
    fn duplicate_type_handles_sharing_a_name_are_summed_before_joining() {
        let baseline_types = vec![stats(0, "X", 1, 10, 10), stats(1, "X", 1, 10, 10)];
        let current_types = vec![stats(0, "X", 1, 10, 10), stats(1, "X", 1, 10, 10)];
        let baseline = SnapshotSummary { total_objects: 2, total_shallow: 20, total_retained: 20, types: &baseline_types };
        let current = SnapshotSummary { total_objects: 2, total_shallow: 20, total_retained: 20, types: &current_types };

        let result = compare(baseline, current);

        assert_eq!(result.types.len(), 1, "distinct handles sharing a name must join into one row");
        assert_eq!(result.types[0].baseline_count, 2);
        assert_eq!(result.types[0].status, TypeStatus::Unchanged);
    }
}

//! `heapdom` computes per-object **retained size** over a rooted
//! heap-object graph via dominator-tree construction, aggregates those
//! sizes by type, enumerates retainer paths back to the root, and
//! compares two snapshots for per-type growth.
//!
//! The crate owns none of the on-disk dump format: an external loader
//! supplies [`loader::RawNode`]/[`loader::RawType`] records (see
//! [`loader`] for the exact contract), and [`Snapshot::new`] does the
//! rest. Everything downstream of construction is a read-only query —
//! there is no mutation, no file I/O, and no presentation logic here.
//!
//! ```
//! use std::collections::BTreeMap;
//! use heapdom::{NodeHandle, RawNode, RawType, Snapshot, TypeHandle};
//!
//! let t = TypeHandle::new(0);
//! let nodes = vec![
//!     RawNode { type_handle: t, shallow_size: 0, address: 0, children: vec![1] },
//!     RawNode { type_handle: t, shallow_size: 10, address: 0x1000, children: vec![] },
//! ];
//! let types = vec![RawType { name: "Widget".into() }];
//!
//! let snapshot = Snapshot::new(nodes, types, 0, BTreeMap::new()).unwrap();
//! assert_eq!(snapshot.retained_size(NodeHandle::new(0)), 10);
//! ```

mod csr_index;
mod dominators;
mod postorder;
mod predecessors;
mod retained;

pub mod compare;
pub mod display;
pub mod error;
pub mod graph;
pub mod handle;
pub mod loader;
pub mod paths;
pub mod snapshot;
pub mod types;

pub use compare::{
    AggregateDeltas, ComparisonResult, InstanceComparison, InstanceDetail, SnapshotSummary,
    TypeDelta, TypeStatus,
};
pub use display::TypeNameFormatter;
pub use error::Error;
pub use graph::Graph;
pub use handle::{NodeHandle, TypeHandle};
pub use loader::{RawNode, RawType};
pub use paths::{PathFinderConfig, PathResult};
pub use snapshot::{
    compare, compare_instances, HeapStatistics, Snapshot,
};
pub use types::TypeStats;

//! Structured errors surfaced at snapshot construction.
//!
//! Construction validates the graph once and returns a single fatal
//! error on malformed input. Query paths assume a validated snapshot and
//! perform no further validation — an out-of-range handle passed to a
//! query is a programmer error (see the `debug_assert!`s in
//! `snapshot.rs`), not something this enum reports.

use crate::handle::{NodeHandle, TypeHandle};

/// Errors that can occur while constructing a [`Snapshot`](crate::snapshot::Snapshot)
/// from loader-supplied data.
#[derive(Debug, thiserror::Error, PartialEq, Eq, Clone)]
pub enum Error {
    /// A node's child list referenced a handle outside `[0, N)`.
    #[error("node {parent:?} has a child handle {child:?} out of range for a graph of {node_count} nodes")]
    ChildOutOfRange {
        parent: NodeHandle,
        child: NodeHandle,
        node_count: usize,
    },

    /// The designated root handle is out of range.
    #[error("root handle {root:?} is out of range for a graph of {node_count} nodes")]
    InvalidRoot { root: NodeHandle, node_count: usize },

    /// A node referenced a type handle outside `[0, T)`.
    #[error("node {node:?} has type handle {type_handle:?} out of range for {type_count} types")]
    TypeHandleOutOfRange {
        node: NodeHandle,
        type_handle: TypeHandle,
        type_count: usize,
    },
}

//! The loader contract: what an external dump reader must supply
//! to construct a [`Graph`](crate::graph::Graph)/[`Snapshot`](crate::snapshot::Snapshot).
//!
//! This crate does not read any on-disk dump format itself — that is the
//! presentation/ingestion layer's job. `RawNode` and `RawType` are the
//! plain data shape a loader hands to [`Graph::from_raw`](crate::graph::Graph::from_raw).

use crate::handle::TypeHandle;

/// One node as supplied by a loader, before it is packed into a [`Graph`](crate::graph::Graph).
#[derive(Debug, Clone)]
pub struct RawNode {
    pub type_handle: TypeHandle,
    pub shallow_size: u64,
    pub address: u64,
    /// Outgoing edge targets, in the loader's stable order.
    pub children: Vec<u32>,
}

/// One type as supplied by a loader.
#[derive(Debug, Clone)]
pub struct RawType {
    pub name: String,
}

//! **Graph** is the read-only node/edge/type store.
//!
//! The store owns three flat tables — node records, type names, and a
//! packed children array — and exposes nodes only through dense
//! [`NodeHandle`]s. Child order is exactly the loader's order and is
//! never reordered; every other component's determinism rests on that.

use crate::error::Error;
use crate::handle::{NodeHandle, TypeHandle};
use crate::loader::{RawNode, RawType};

/// A single node's attributes, as packed into the [`Graph`].
#[derive(Debug, Clone, Copy)]
pub struct Node<'g> {
    graph: &'g Graph,
    handle: NodeHandle,
}

impl<'g> Node<'g> {
    #[inline]
    pub fn handle(&self) -> NodeHandle {
        self.handle
    }

    #[inline]
    pub fn type_handle(&self) -> TypeHandle {
        self.graph.type_handles[self.handle.index()]
    }

    #[inline]
    pub fn shallow_size(&self) -> u64 {
        self.graph.shallow_sizes[self.handle.index()]
    }

    #[inline]
    pub fn address(&self) -> u64 {
        self.graph.addresses[self.handle.index()]
    }

    /// A fresh, reset child enumerator for this node.
    #[inline]
    pub fn children(&self) -> ChildCursor<'g> {
        self.graph.children_of(self.handle)
    }
}

/// A resettable child enumerator. Each pushed DFS frame owns one of
/// these; it must be created fresh per frame rather than shared, since
/// siblings visited from different parents must not observe each other's
/// cursor position.
#[derive(Debug, Clone)]
pub struct ChildCursor<'g> {
    targets: &'g [NodeHandle],
    next: usize,
}

impl<'g> ChildCursor<'g> {
    #[inline]
    fn new(targets: &'g [NodeHandle]) -> Self {
        ChildCursor { targets, next: 0 }
    }

    /// Returns the first child, resetting the cursor. A fresh cursor is
    /// always "at the first child" so `next_child` alone would suffice,
    /// but the explicit name documents the reset-and-advance contract for
    /// callers that enumerate children repeatedly from the same node.
    #[inline]
    pub fn first_child(&mut self) -> NodeHandle {
        self.next = 0;
        self.next_child()
    }

    /// Advances and returns the next child, or [`NodeHandle::INVALID`] once
    /// exhausted.
    #[inline]
    pub fn next_child(&mut self) -> NodeHandle {
        match self.targets.get(self.next) {
            Some(&h) => {
                self.next += 1;
                h
            }
            None => NodeHandle::INVALID,
        }
    }
}

impl<'g> Iterator for ChildCursor<'g> {
    type Item = NodeHandle;

    #[inline]
    fn next(&mut self) -> Option<NodeHandle> {
        let h = self.next_child();
        h.is_valid().then_some(h)
    }
}

/// The immutable, read-only heap graph.
///
/// Owns every node, type, and edge table. Query components (post-order
/// indexer, predecessor index, dominator builder, ...) borrow from a
/// `Graph` read-only; none of them own node data themselves.
#[derive(Debug, Clone)]
pub struct Graph {
    type_handles: Vec<TypeHandle>,
    shallow_sizes: Vec<u64>,
    addresses: Vec<u64>,
    /// CSR-style packed children: `child_offsets[n]..child_offsets[n+1]`
    /// indexes into `child_targets` for node `n`.
    child_offsets: Vec<u32>,
    child_targets: Vec<NodeHandle>,
    type_names: Vec<String>,
    root: NodeHandle,
}

impl Graph {
    /// Builds a graph from loader-supplied raw nodes and types, validating
    /// every child handle, the root handle, and every type handle. This is
    /// the one place the engine performs validation; everything downstream
    /// assumes a validated `Graph`.
    pub fn from_raw(nodes: Vec<RawNode>, types: Vec<RawType>, root: u32) -> Result<Self, Error> {
        let node_count = nodes.len();
        let type_count = types.len();

        let mut type_handles = Vec::with_capacity(node_count);
        let mut shallow_sizes = Vec::with_capacity(node_count);
        let mut addresses = Vec::with_capacity(node_count);
        let mut child_offsets = Vec::with_capacity(node_count + 1);
        let mut child_targets = Vec::new();

        child_offsets.push(0u32);
        for (idx, node) in nodes.iter().enumerate() {
            let parent = NodeHandle::new(idx);

            if node.type_handle.index() >= type_count {
                return Err(Error::TypeHandleOutOfRange {
                    node: parent,
                    type_handle: node.type_handle,
                    type_count,
                });
            }

            for &child in &node.children {
                if child as usize >= node_count {
                    return Err(Error::ChildOutOfRange {
                        parent,
                        child: NodeHandle::new(child as usize),
                        node_count,
                    });
                }
                child_targets.push(NodeHandle::new(child as usize));
            }

            type_handles.push(node.type_handle);
            shallow_sizes.push(node.shallow_size);
            addresses.push(node.address);
            child_offsets.push(child_targets.len() as u32);
        }

        let root = NodeHandle::new(root as usize);
        if root.index() >= node_count {
            return Err(Error::InvalidRoot { root, node_count });
        }

        let type_names = types.into_iter().map(|t| t.name).collect();

        Ok(Graph {
            type_handles,
            shallow_sizes,
            addresses,
            child_offsets,
            child_targets,
            type_names,
            root,
        })
    }

    #[inline]
    pub fn node_count(&self) -> usize {
        self.shallow_sizes.len()
    }

    #[inline]
    pub fn type_count(&self) -> usize {
        self.type_names.len()
    }

    #[inline]
    pub fn root(&self) -> NodeHandle {
        self.root
    }

    #[inline]
    pub fn node(&self, handle: NodeHandle) -> Node<'_> {
        debug_assert!(handle.index() < self.node_count(), "node handle out of range");
        Node { graph: self, handle }
    }

    #[inline]
    pub fn type_name(&self, handle: TypeHandle) -> &str {
        debug_assert!(handle.index() < self.type_count(), "type handle out of range");
        &self.type_names[handle.index()]
    }

    /// The raw child target slice for a node, in loader order.
    #[inline]
    pub fn child_targets(&self, handle: NodeHandle) -> &[NodeHandle] {
        let start = self.child_offsets[handle.index()] as usize;
        let end = self.child_offsets[handle.index() + 1] as usize;
        &self.child_targets[start..end]
    }

    #[inline]
    fn children_of(&self, handle: NodeHandle) -> ChildCursor<'_> {
        ChildCursor::new(self.child_targets(handle))
    }

    /// All node handles, in handle order — `0..node_count()`.
    pub fn node_handles(&self) -> impl Iterator<Item = NodeHandle> + '_ {
        (0..self.node_count()).map(NodeHandle::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(type_handle: u32, size: u64, children: &[u32]) -> RawNode {
        RawNode {
            type_handle: TypeHandle::new(type_handle as usize),
            shallow_size: size,
            address: 0,
            children: children.to_vec(),
        }
    }

    #[test]
    fn rejects_out_of_range_child() {
        let nodes = vec![raw(0, 0, &[5])];
        let types = vec![RawType { name: "A".into() }];
        let err = Graph::from_raw(nodes, types, 0).unwrap_err();
        assert!(matches!(err, Error::ChildOutOfRange { .. }));
    }

    #[test]
    fn rejects_invalid_root() {
        let nodes = vec![raw(0, 0, &[])];
        let types = vec![RawType { name: "A".into() }];
        let err = Graph::from_raw(nodes, types, 7).unwrap_err();
        assert!(matches!(err, Error::InvalidRoot { .. }));
    }

    #[test]
    fn rejects_out_of_range_type() {
        let nodes = vec![raw(3, 0, &[])];
        let types = vec![RawType { name: "A".into() }];
        let err = Graph::from_raw(nodes, types, 0).unwrap_err();
        assert!(matches!(err, Error::TypeHandleOutOfRange { .. }));
    }

    #[test]
    fn child_cursor_yields_in_loader_order() {
        let nodes = vec![raw(0, 0, &[1, 2]), raw(0, 10, &[]), raw(0, 20, &[])];
        let types = vec![RawType { name: "A".into() }];
        let graph = Graph::from_raw(nodes, types, 0).unwrap();
        let mut cursor = graph.node(NodeHandle::new(0)).children();
        assert_eq!(cursor.first_child(), NodeHandle::new(1));
        assert_eq!(cursor.next_child(), NodeHandle::new(2));
        assert_eq!(cursor.next_child(), NodeHandle::INVALID);
    }
}

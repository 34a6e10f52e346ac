//! A small reusable CSR-style (offsets + flat values) index, built by one
//! counting-sort pass over `(key, value)` pairs. Used by both the
//! predecessor index and the dominator-children index, since both are
//! "group values by key, then enumerate a key's group" problems with the
//! same `O(N + E)` shape.

use crate::handle::NodeHandle;

#[derive(Debug, Clone)]
pub(crate) struct GroupedHandles {
    offsets: Vec<u32>,
    values: Vec<NodeHandle>,
}

impl GroupedHandles {
    /// Builds the index for `key_count` distinct keys from an iterator of
    /// `(key_index, value)` pairs, where the iterator may be traversed
    /// twice (it is re-created by the closure on each call).
    pub(crate) fn build<I>(key_count: usize, pairs: impl Fn() -> I) -> Self
    where
        I: Iterator<Item = (usize, NodeHandle)>,
    {
        let mut offsets = vec![0u32; key_count + 1];
        for (key, _) in pairs() {
            offsets[key + 1] += 1;
        }
        for i in 0..key_count {
            offsets[i + 1] += offsets[i];
        }

        let total = offsets[key_count] as usize;
        let mut values = vec![NodeHandle::INVALID; total];
        let mut cursor = offsets.clone();
        for (key, value) in pairs() {
            let pos = cursor[key] as usize;
            values[pos] = value;
            cursor[key] += 1;
        }

        GroupedHandles { offsets, values }
    }

    #[inline]
    pub(crate) fn of(&self, key: usize) -> &[NodeHandle] {
        let start = self.offsets[key] as usize;
        let end = self.offsets[key + 1] as usize;
        &self.values[start..end]
    }
}

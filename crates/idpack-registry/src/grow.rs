// Copyright (c) 2026 the idpack authors.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! Auto-growing id registry.

use crate::registry::IdRegistry;
use idpack_core::id::Id;
use tracing::debug;

const MIN_CAPACITY: usize = 16;

/// [`IdRegistry`] that grows instead of refusing.
///
/// When the range is exhausted, capacity at least doubles and the create
/// resumes from the first new slot. A cached scan cursor keeps repeated
/// creates from rescanning the low, densely used end; removals lower the
/// cursor so the lowest free slot is still always the one reused.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrowableIdRegistry<I: Id> {
    inner: IdRegistry<I>,
    /// No free slot exists below this index.
    cursor: usize,
}

impl<I: Id> GrowableIdRegistry<I> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: IdRegistry::new(capacity),
            cursor: 0,
        }
    }

    /// Register the lowest free id, growing the range when none is left.
    pub fn create(&mut self) -> I {
        if let Some(id) = self.inner.create_from(self.cursor) {
            self.cursor = id.index() + 1;
            return id;
        }
        let old = self.inner.capacity();
        self.grow_to(old + 1);
        // Slots below `old` are all taken; the first new one is free.
        self.cursor = old + 1;
        self.inner
            .create_from(old)
            .unwrap_or_else(|| unreachable!("slot {} is free after growth", old))
    }

    /// Register `count` ids, ascending, appending them to `out`. Grows as
    /// needed, so the full count is always delivered.
    pub fn create_many(&mut self, out: &mut Vec<I>, count: usize) {
        let mut remaining = count;
        let mut from = self.cursor;
        while remaining > 0 {
            let got = self.inner.create_many_from(out, remaining, from);
            remaining -= got;
            if remaining > 0 {
                let old = self.inner.capacity();
                self.grow_to(old + remaining);
                // Slots below `old` are exhausted; pick up at the new range
                // instead of rescanning them.
                from = old;
            }
        }
        if count > 0 {
            if let Some(last) = out.last() {
                // Everything below the highest new id was swept by the scan.
                self.cursor = last.index() + 1;
            }
        }
    }

    fn grow_to(&mut self, needed: usize) {
        let capacity = needed.max(self.inner.capacity() * 2).max(MIN_CAPACITY);
        debug!(
            old = self.inner.capacity(),
            new = capacity,
            "growing id registry"
        );
        self.inner.reserve(capacity);
    }

    /// Return `id` to the free pool.
    pub fn remove(&mut self, id: I) {
        self.inner.remove(id);
        self.cursor = self.cursor.min(id.index());
    }

    #[inline]
    pub fn exists(&self, id: I) -> bool {
        self.inner.exists(id)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }

    /// Pre-grow to at least `capacity` slots.
    pub fn reserve(&mut self, capacity: usize) {
        self.inner.reserve(capacity);
    }

    /// Ascending iteration over the registered ids.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.inner.ids()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_grows_from_empty() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::new();
        assert_eq!(reg.create(), 0);
        assert_eq!(reg.create(), 1);
        assert!(reg.capacity() >= 2);
    }

    #[test]
    fn test_growth_at_least_doubles() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::with_capacity(2);
        reg.create();
        reg.create();
        reg.create();
        assert!(reg.capacity() >= 16);
        let cap = reg.capacity();
        for _ in reg.len()..cap {
            reg.create();
        }
        reg.create();
        assert!(reg.capacity() >= cap * 2);
    }

    #[test]
    fn test_cursor_lowered_on_remove() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::new();
        for _ in 0..10 {
            reg.create();
        }
        reg.remove(7);
        reg.remove(2);
        assert_eq!(reg.create(), 2);
        assert_eq!(reg.create(), 7);
        assert_eq!(reg.create(), 10);
    }

    #[test]
    fn test_create_many_crosses_growth() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::with_capacity(4);
        let mut out = Vec::new();
        reg.create_many(&mut out, 100);
        assert_eq!(out, (0..100).collect::<Vec<u32>>());
        assert_eq!(reg.len(), 100);
    }

    #[test]
    fn test_create_many_resumes_from_cursor() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::with_capacity(8);
        for _ in 0..8 {
            reg.create();
        }
        reg.remove(3);
        let mut out = Vec::new();
        // Reuses the hole below the cursor, then continues past the old
        // capacity after growing.
        reg.create_many(&mut out, 4);
        assert_eq!(out, vec![3, 8, 9, 10]);
        assert_eq!(reg.len(), 11);

        // A removal lowers the cursor, so the freed slot comes back first.
        reg.remove(1);
        let mut out = Vec::new();
        reg.create_many(&mut out, 2);
        assert_eq!(out, vec![1, 11]);
    }

    #[test]
    fn test_len_tracks_create_remove() {
        let mut reg: GrowableIdRegistry<u32> = GrowableIdRegistry::new();
        let ids: Vec<u32> = (0..50).map(|_| reg.create()).collect();
        for &id in ids.iter().step_by(2) {
            reg.remove(id);
        }
        assert_eq!(reg.len(), 25);
        assert_eq!(reg.ids().count(), 25);
    }
}

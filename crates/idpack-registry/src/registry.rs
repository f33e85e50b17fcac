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

//! Fixed-capacity id registry over a flat free-slot bitset.

use idpack_core::bitvec::BitVec;
use idpack_core::id::Id;
use std::marker::PhantomData;

/// Hands out ids from `0..capacity`, recycling removed ones lowest-first.
///
/// Free slots are the *set* bits of the backing bitset. [`create`] scans
/// for the first set bit, so ids come out ascending until the range is
/// exhausted and removed ids are reused before higher fresh ones.
///
/// Exhaustion is a recoverable condition here. Use [`GrowableIdRegistry`]
/// when the id range should stretch instead.
///
/// [`create`]: IdRegistry::create
/// [`GrowableIdRegistry`]: crate::GrowableIdRegistry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdRegistry<I: Id> {
    free: BitVec<u64>,
    _id: PhantomData<I>,
}

impl<I: Id> IdRegistry<I> {
    /// An empty registry able to hold `capacity` ids.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: BitVec::new(capacity, true),
            _id: PhantomData,
        }
    }

    /// Register the lowest free id, or `None` when every slot is taken.
    pub fn create(&mut self) -> Option<I> {
        self.create_from(0)
    }

    /// Like [`create`](Self::create) but scanning from `start`. The caller
    /// must know that no slot below `start` is free.
    pub(crate) fn create_from(&mut self, start: usize) -> Option<I> {
        let slot = self.free.first_one_from(start)?;
        self.free.reset(slot);
        Some(I::from_index(slot))
    }

    /// Register up to `count` ids, ascending, appending them to `out`.
    /// Returns how many were actually created; short iff the registry ran
    /// out of free slots.
    pub fn create_many(&mut self, out: &mut Vec<I>, count: usize) -> usize {
        self.create_many_from(out, count, 0)
    }

    /// Like [`create_many`](Self::create_many) but scanning from `start`.
    /// The caller must know that no slot below `start` is free.
    pub(crate) fn create_many_from(
        &mut self,
        out: &mut Vec<I>,
        count: usize,
        start: usize,
    ) -> usize {
        let mut created = 0;
        let mut cursor = start;
        while created < count {
            let Some(slot) = self.free.first_one_from(cursor) else {
                break;
            };
            self.free.reset(slot);
            out.push(I::from_index(slot));
            cursor = slot + 1;
            created += 1;
        }
        created
    }

    /// Return `id` to the free pool.
    ///
    /// Removing an id that is not registered is a contract violation,
    /// checked in debug builds only.
    pub fn remove(&mut self, id: I) {
        debug_assert!(self.exists(id), "removed id {:?} is not registered", id);
        self.free.set(id.index());
    }

    /// Whether `id` is currently registered.
    #[inline]
    pub fn exists(&self, id: I) -> bool {
        id.index() < self.free.len() && !self.free.test(id.index())
    }

    /// Number of registered ids.
    #[inline]
    pub fn len(&self) -> usize {
        self.free.len() - self.free.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total slots, registered or not.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.free.len()
    }

    /// Grow to at least `capacity` slots. The gained slots start out free.
    /// Never shrinks.
    pub fn reserve(&mut self, capacity: usize) {
        if capacity > self.free.len() {
            self.free.resize(capacity, true);
        }
    }

    /// Ascending iteration over the registered ids.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.free.zeros().map(I::from_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ascending() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(4);
        assert_eq!(reg.create(), Some(0));
        assert_eq!(reg.create(), Some(1));
        assert_eq!(reg.create(), Some(2));
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_create_exhausted() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(2);
        reg.create();
        reg.create();
        assert_eq!(reg.create(), None);
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_remove_reuses_lowest() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(8);
        for _ in 0..4 {
            reg.create();
        }
        reg.remove(1);
        reg.remove(3);
        assert_eq!(reg.create(), Some(1));
        assert_eq!(reg.create(), Some(3));
        assert_eq!(reg.create(), Some(4));
    }

    #[test]
    fn test_create_many_short_count() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(5);
        reg.create();
        let mut out = Vec::new();
        let created = reg.create_many(&mut out, 10);
        assert_eq!(created, 4);
        assert_eq!(out, vec![1, 2, 3, 4]);
        assert_eq!(reg.len(), 5);
    }

    #[test]
    fn test_exists_and_out_of_range() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(4);
        let id = reg.create().unwrap();
        assert!(reg.exists(id));
        assert!(!reg.exists(3));
        assert!(!reg.exists(100));
    }

    #[test]
    fn test_reserve_keeps_registrations() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(2);
        reg.create();
        reg.create();
        reg.reserve(6);
        assert_eq!(reg.capacity(), 6);
        assert_eq!(reg.len(), 2);
        assert_eq!(reg.create(), Some(2));
    }

    #[test]
    fn test_ids_iteration() {
        let mut reg: IdRegistry<u32> = IdRegistry::new(8);
        for _ in 0..5 {
            reg.create();
        }
        reg.remove(2);
        assert_eq!(reg.ids().collect::<Vec<_>>(), vec![0, 1, 3, 4]);
    }
}

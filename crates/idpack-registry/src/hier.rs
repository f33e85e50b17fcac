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

//! Id registry over a hierarchical free-slot bitset.

use idpack_core::hier::HierBitset;
use idpack_core::id::Id;
use std::marker::PhantomData;

/// [`IdRegistry`] variant backed by a [`HierBitset`] of free slots.
///
/// Same external contract as the flat registry. The summary rows make
/// single creates O(log n) even when the only free slot sits at the far
/// end of a huge range, and `create_many` clears free bits in bulk without
/// visiting empty regions at all.
///
/// [`IdRegistry`]: crate::IdRegistry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierIdRegistry<I: Id> {
    free: HierBitset<u64>,
    _id: PhantomData<I>,
}

impl<I: Id> HierIdRegistry<I> {
    /// An empty registry able to hold `capacity` ids.
    pub fn new(capacity: usize) -> Self {
        Self {
            free: HierBitset::new(capacity, true),
            _id: PhantomData,
        }
    }

    /// Register the lowest free id, or `None` when every slot is taken.
    pub fn create(&mut self) -> Option<I> {
        let slot = self.free.front()?;
        self.free.reset(slot);
        Some(I::from_index(slot))
    }

    /// Register up to `count` ids, ascending, appending them to `out`.
    /// Returns how many were actually created.
    pub fn create_many(&mut self, out: &mut Vec<I>, count: usize) -> usize {
        let shortfall = self.free.take(count, |slot| out.push(I::from_index(slot)));
        count - shortfall
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
        self.free.len() - self.free.count()
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

    /// Ascending iteration over the registered ids. Walks the zeros of the
    /// free set, so this is linear in capacity; prefer keeping your own
    /// [`IdSet`] when live ids are sparse.
    ///
    /// [`IdSet`]: crate::IdSet
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        idpack_core::iter::Zeros::new(self.free.base_words(), self.free.len()).map(I::from_index)
    }
}

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

//! Bitset-backed set of typed ids.

use idpack_core::bitvec::BitVec;
use idpack_core::id::Id;
use std::marker::PhantomData;

/// A set of ids over a flat bitset, one bit per possible id.
///
/// Dense by construction: memory is proportional to the highest inserted
/// id, not to the member count. That trade is right for dirty-tracking and
/// visited-marking over registry ranges, where ids are small and reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSet<I: Id> {
    bits: BitVec<u64>,
    _id: PhantomData<I>,
}

impl<I: Id> Default for IdSet<I> {
    fn default() -> Self {
        Self {
            bits: BitVec::default(),
            _id: PhantomData,
        }
    }
}

impl<I: Id> IdSet<I> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bits: BitVec::new(capacity, false),
            _id: PhantomData,
        }
    }

    /// Insert `id`, growing the bit range as needed. Returns whether the id
    /// was newly inserted.
    pub fn insert(&mut self, id: I) -> bool {
        if id.index() >= self.bits.len() {
            self.bits.resize(id.index() + 1, false);
        }
        let fresh = !self.bits.test(id.index());
        self.bits.set(id.index());
        fresh
    }

    /// Remove `id`. Returns whether it was a member.
    pub fn remove(&mut self, id: I) -> bool {
        if id.index() >= self.bits.len() {
            return false;
        }
        let was = self.bits.test(id.index());
        self.bits.reset(id.index());
        was
    }

    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.bits.test(id.index())
    }

    /// Number of members.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.count_ones()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        self.bits.clear_all();
    }

    /// Ascending iteration over the members.
    pub fn iter(&self) -> impl Iterator<Item = I> + '_ {
        self.bits.ones().map(I::from_index)
    }
}

impl<I: Id> Extend<I> for IdSet<I> {
    fn extend<T: IntoIterator<Item = I>>(&mut self, iter: T) {
        for id in iter {
            self.insert(id);
        }
    }
}

impl<I: Id> FromIterator<I> for IdSet<I> {
    fn from_iter<T: IntoIterator<Item = I>>(iter: T) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_contains_remove() {
        let mut set: IdSet<u32> = IdSet::new();
        assert!(set.insert(9));
        assert!(!set.insert(9));
        assert!(set.contains(9));
        assert!(!set.contains(8));
        assert!(set.remove(9));
        assert!(!set.remove(9));
        assert!(set.is_empty());
    }

    #[test]
    fn test_remove_past_end_is_noop() {
        let mut set: IdSet<u32> = IdSet::with_capacity(4);
        assert!(!set.remove(100));
    }

    #[test]
    fn test_iter_ascending() {
        let set: IdSet<u32> = [5u32, 1, 3, 1].into_iter().collect();
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![1, 3, 5]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut set: IdSet<u32> = [0u32, 64, 128].into_iter().collect();
        set.clear();
        assert_eq!(set.len(), 0);
        assert!(!set.contains(64));
    }
}

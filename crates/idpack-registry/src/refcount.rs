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

//! Per-slot reference counts, plain and id-keyed.

use crate::owner::IdOwner;
use idpack_core::id::Id;
use std::ops::Deref;

/// A vector of reference counts.
///
/// Shrinking over a slot whose count is non-zero would silently invalidate
/// live references, so that is an always-on panic, not a debug assertion.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefCount {
    counts: Vec<u32>,
}

impl RefCount {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            counts: vec![0; capacity],
        }
    }

    /// Grow or shrink to `len` slots.
    ///
    /// # Panics
    ///
    /// Panics if a truncated slot still has a non-zero count.
    pub fn resize(&mut self, len: usize) {
        if len < self.counts.len() {
            let live = self.counts[len..].iter().filter(|&&c| c != 0).count();
            assert!(
                live == 0,
                "resizing away {} slots with live reference counts",
                live
            );
        }
        self.counts.resize(len, 0);
    }

    /// Increment slot `index`, growing the table when it lies past the end.
    pub fn incr(&mut self, index: usize) -> u32 {
        if index >= self.counts.len() {
            self.counts.resize(index + 1, 0);
        }
        self.counts[index] += 1;
        self.counts[index]
    }

    /// Decrement slot `index` and return the remaining count.
    ///
    /// # Panics
    ///
    /// Panics if the count is already zero.
    pub fn decr(&mut self, index: usize) -> u32 {
        let count = &mut self.counts[index];
        assert!(*count != 0, "reference count underflow at slot {}", index);
        *count -= 1;
        *count
    }
}

impl Deref for RefCount {
    type Target = [u32];

    fn deref(&self) -> &[u32] {
        &self.counts
    }
}

/// Reference counts keyed by typed ids, paired with [`IdOwner`] handles.
///
/// Every increment is witnessed by a handle and every decrement consumes
/// one, so the count can only drift if a handle leaks, and leaked handles
/// assert on drop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdRefCount<I: Id> {
    counts: RefCount,
    _id: std::marker::PhantomData<I>,
}

impl<I: Id> Default for IdRefCount<I> {
    fn default() -> Self {
        Self {
            counts: RefCount::default(),
            _id: std::marker::PhantomData,
        }
    }
}

impl<I: Id> IdRefCount<I> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one more reference to `id` and bind a handle witnessing it.
    pub fn ref_add(&mut self, id: I) -> IdOwner<I> {
        self.counts.incr(id.index());
        IdOwner::bind(id)
    }

    /// Release `owner`, clearing the handle. Returns the remaining count
    /// for the id; zero means the caller held the last reference.
    ///
    /// # Panics
    ///
    /// Panics if `owner` is empty.
    pub fn ref_release(&mut self, owner: &mut IdOwner<I>) -> u32 {
        let id = owner.release();
        assert!(!id.is_null(), "released an empty id owner");
        self.counts.decr(id.index())
    }

    /// Current count for `id`; ids past the table end count zero.
    #[inline]
    pub fn count(&self, id: I) -> u32 {
        self.counts.get(id.index()).copied().unwrap_or(0)
    }

    /// Grow or shrink the table. Same non-zero truncation panic as
    /// [`RefCount::resize`].
    pub fn resize(&mut self, len: usize) {
        self.counts.resize(len);
    }
}

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

//! A dense vector indexed by typed ids instead of raw `usize`.

use crate::id::Id;
use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A `Vec<V>` whose indexing operator takes an id type `I`.
///
/// The wrapper carries no occupancy information. It is meant to sit next to
/// a registry that owns the id lifecycle; slots for unregistered ids hold
/// defaulted values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyedVec<I: Id, V> {
    values: Vec<V>,
    _id: PhantomData<I>,
}

impl<I: Id, V> Default for KeyedVec<I, V> {
    fn default() -> Self {
        Self {
            values: Vec::new(),
            _id: PhantomData,
        }
    }
}

impl<I: Id, V> KeyedVec<I, V> {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value for `id`, or `None` when the vector is shorter than the index.
    #[inline]
    pub fn get(&self, id: I) -> Option<&V> {
        self.values.get(id.index())
    }

    #[inline]
    pub fn get_mut(&mut self, id: I) -> Option<&mut V> {
        self.values.get_mut(id.index())
    }

    pub fn iter(&self) -> impl Iterator<Item = (I, &V)> {
        self.values
            .iter()
            .enumerate()
            .map(|(ix, v)| (I::from_index(ix), v))
    }
}

impl<I: Id, V: Default> KeyedVec<I, V> {
    /// Grow or shrink to `len` slots, defaulting new values.
    pub fn resize_default(&mut self, len: usize) {
        self.values.resize_with(len, V::default);
    }

    /// Grow so that `id` is indexable, then return its slot.
    pub fn entry(&mut self, id: I) -> &mut V {
        if id.index() >= self.values.len() {
            self.resize_default(id.index() + 1);
        }
        &mut self.values[id.index()]
    }
}

impl<I: Id, V> Index<I> for KeyedVec<I, V> {
    type Output = V;

    #[inline]
    fn index(&self, id: I) -> &V {
        &self.values[id.index()]
    }
}

impl<I: Id, V> IndexMut<I> for KeyedVec<I, V> {
    #[inline]
    fn index_mut(&mut self, id: I) -> &mut V {
        &mut self.values[id.index()]
    }
}

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

//! Move-only handle that witnesses shared ownership of an id.

use idpack_core::id::Id;

/// A non-copyable, non-clonable id handle.
///
/// Handed out by [`IdRefCount::ref_add`] and consumed by
/// [`IdRefCount::ref_release`]; as long as a handle is live, its id is
/// pinned by a reference count. Dropping a handle that still holds an id
/// means a count was leaked, which debug builds flag.
///
/// Only this crate can bind or clear a handle. Moves are the only way to
/// pass one around, so double releases cannot compile.
///
/// [`IdRefCount::ref_add`]: crate::IdRefCount::ref_add
/// [`IdRefCount::ref_release`]: crate::IdRefCount::ref_release
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct IdOwner<I: Id> {
    id: I,
}

impl<I: Id> Default for IdOwner<I> {
    fn default() -> Self {
        Self { id: I::NULL }
    }
}

impl<I: Id> IdOwner<I> {
    pub(crate) fn bind(id: I) -> Self {
        Self { id }
    }

    /// Clear the handle and hand back the id it held.
    pub(crate) fn release(&mut self) -> I {
        std::mem::replace(&mut self.id, I::NULL)
    }

    /// The held id, [`Id::NULL`] for an empty handle.
    #[inline]
    pub fn value(&self) -> I {
        self.id
    }

    #[inline]
    pub fn has_value(&self) -> bool {
        !self.id.is_null()
    }
}

impl<I: Id> Drop for IdOwner<I> {
    fn drop(&mut self) {
        debug_assert!(
            self.id.is_null(),
            "id owner dropped while still holding {:?}",
            self.id
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_empty() {
        let owner: IdOwner<u32> = IdOwner::default();
        assert!(!owner.has_value());
        assert!(owner.value().is_null());
    }

    #[test]
    fn test_bind_release() {
        let mut owner: IdOwner<u32> = IdOwner::bind(5);
        assert!(owner.has_value());
        assert_eq!(owner.value(), 5);
        assert_eq!(owner.release(), 5);
        assert!(!owner.has_value());
    }

    #[test]
    #[should_panic(expected = "still holding")]
    fn test_drop_of_bound_owner_panics() {
        let _owner: IdOwner<u32> = IdOwner::bind(3);
    }
}

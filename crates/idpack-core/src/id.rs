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

//! The identifier abstraction shared by every registry and container.
//!
//! An [`Id`] is a plain index with a reserved null value at the top of its
//! range. Keeping the trait tiny lets applications define strongly typed id
//! newtypes so that ids of different registries cannot be mixed up:
//!
//! ```
//! use idpack_core::id::Id;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
//! struct NodeId(u32);
//!
//! impl Id for NodeId {
//!     const NULL: Self = NodeId(u32::MAX);
//!
//!     fn from_index(index: usize) -> Self {
//!         NodeId(u32::from_index(index))
//!     }
//!
//!     fn index(self) -> usize {
//!         self.0.index()
//!     }
//! }
//! ```

use std::fmt::Debug;
use std::hash::Hash;

/// A copyable index type with a dedicated null value.
///
/// The null value is the maximum representable value, never a valid index.
/// Conversions are checked; a registry can therefore hand out the full range
/// below null without ambiguity.
pub trait Id: Debug + Copy + PartialEq + Eq + Hash {
    /// The reserved "no id" value.
    const NULL: Self;

    /// Id for slot `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` does not fit below [`Self::NULL`].
    fn from_index(index: usize) -> Self;

    /// Slot index of this id. Meaningless for [`Self::NULL`].
    fn index(self) -> usize;

    #[inline]
    fn is_null(self) -> bool {
        self == Self::NULL
    }
}

macro_rules! impl_id_for_uint {
    ($($t:ty),*) => {$(
        impl Id for $t {
            const NULL: Self = <$t>::MAX;

            #[inline]
            fn from_index(index: usize) -> Self {
                let id = index as $t;
                assert!(
                    id as usize == index && id != <$t>::MAX,
                    "index {} out of id range",
                    index
                );
                id
            }

            #[inline]
            fn index(self) -> usize {
                self as usize
            }
        }
    )*};
}

impl_id_for_uint!(u8, u16, u32, u64, usize);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roundtrip() {
        assert_eq!(u32::from_index(7).index(), 7);
        assert_eq!(u8::from_index(254), 254u8);
    }

    #[test]
    fn test_null_is_max() {
        assert_eq!(<u16 as Id>::NULL, u16::MAX);
        assert!(<u16 as Id>::NULL.is_null());
        assert!(!u16::from_index(0).is_null());
    }

    #[test]
    #[should_panic(expected = "out of id range")]
    fn test_from_index_rejects_null_slot() {
        let _ = u8::from_index(255);
    }

    #[test]
    #[should_panic(expected = "out of id range")]
    fn test_from_index_rejects_overflow() {
        let _ = u8::from_index(1000);
    }
}

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

//! # idpack-core
//!
//! Storage primitives for data-oriented containers: packed bit words, lazy
//! bit-position iteration, flat and hierarchical free-slot bitsets, and the
//! typed identifier trait the higher layers key their arrays with.
//!
//! Everything in this crate is single-threaded by contract. Nothing here
//! synchronizes, blocks, or allocates behind the caller's back; mutating a
//! bitset while one of its iterators is alive is rejected by the borrow
//! checker rather than detected at runtime.

use num_traits::{PrimInt, Unsigned};
use std::fmt::Debug;

pub mod bitvec;
pub mod hier;
pub mod id;
pub mod iter;
pub mod keyed;
pub mod word;

/// A fixed-width unsigned integer usable as a block of bits.
///
/// Free bits are tested a whole word at a time by comparing against zero,
/// which is what makes skipping empty regions cheap.
pub trait BitWord: PrimInt + Unsigned + Debug {}
impl<T> BitWord for T where T: PrimInt + Unsigned + Debug {}

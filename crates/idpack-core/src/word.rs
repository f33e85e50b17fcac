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

//! Primitive operations on packed bit words.
//!
//! Bits are indexed LSB-first within a word, so global bit `i` of a word
//! slice lives at word `i / width`, bit `i % width`.

use crate::BitWord;

/// Number of bits in `W`.
#[inline(always)]
pub fn width<W: BitWord>() -> usize {
    std::mem::size_of::<W>() * 8
}

/// All bits set.
#[inline(always)]
pub fn ones<W: BitWord>() -> W {
    !W::zero()
}

/// Mask with bits `[start, width)` set.
#[inline(always)]
pub fn lo_mask<W: BitWord>(start: usize) -> W {
    if start >= width::<W>() {
        W::zero()
    } else {
        ones::<W>() << start
    }
}

/// Mask with bits `[0, end)` set.
#[inline(always)]
pub fn hi_mask<W: BitWord>(end: usize) -> W {
    if end == 0 {
        W::zero()
    } else if end >= width::<W>() {
        ones::<W>()
    } else {
        ones::<W>() >> (width::<W>() - end)
    }
}

/// Mask with bits `[start, end)` set.
#[inline(always)]
pub fn range_mask<W: BitWord>(start: usize, end: usize) -> W {
    lo_mask::<W>(start) & hi_mask::<W>(end)
}

/// Test a single bit of a word.
#[inline(always)]
pub fn bit_test<W: BitWord>(word: W, bit: usize) -> bool {
    word & (W::one() << bit) != W::zero()
}

/// Position of the first set bit strictly after `bit`, within one word.
#[inline]
pub fn next_set_bit<W: BitWord>(word: W, bit: usize) -> Option<usize> {
    let masked = word & (lo_mask::<W>(bit) << 1);
    if masked == W::zero() {
        None
    } else {
        Some(masked.trailing_zeros() as usize)
    }
}

/// Set the first `bits` bits of a word slice to 1, leaving the rest alone.
pub fn set_low_bits<W: BitWord>(words: &mut [W], mut bits: usize) {
    let mut it = words.iter_mut();
    while bits >= width::<W>() {
        *it.next().expect("set_low_bits: slice too short") = ones::<W>();
        bits -= width::<W>();
    }
    if bits != 0 {
        let w = it.next().expect("set_low_bits: slice too short");
        *w = *w | hi_mask::<W>(bits);
    }
}

/// Copy the first `bits` bits from `src` to `dst`, preserving the bits of
/// `dst` above the copied range.
pub fn copy_bits<W: BitWord>(src: &[W], dst: &mut [W], mut bits: usize) {
    let mut i = 0;
    while bits >= width::<W>() {
        dst[i] = src[i];
        i += 1;
        bits -= width::<W>();
    }
    if bits != 0 {
        let mask = hi_mask::<W>(bits);
        dst[i] = (dst[i] & !mask) | (src[i] & mask);
    }
}

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

//! Lazy ascending iteration over the set (or clear) bit positions of a
//! packed word slice.
//!
//! The polarity is a compile-time parameter: `ONES = true` yields positions
//! of 1 bits, `ONES = false` positions of 0 bits. Either way the iterator
//! holds the current word's remaining mask and repeatedly strips its lowest
//! set bit; words that contain nothing to yield are skipped with a single
//! compare against zero instead of a bit-by-bit scan.

use crate::word;
use crate::BitWord;
use std::iter::FusedIterator;

/// Forward-only iterator over global bit positions of one polarity.
///
/// Positions are yielded in strictly ascending order. The iterator is bounded
/// by a bit length, so garbage bits in the tail of the last word are never
/// reported (a clear-bit iteration would otherwise invent positions past the
/// logical end of the bitset).
#[derive(Debug, Clone)]
pub struct BitPosIter<'a, W: BitWord, const ONES: bool> {
    words: &'a [W],
    nbits: usize,
    word_ix: usize,
    block: W,
}

/// Positions of set bits.
pub type Ones<'a, W> = BitPosIter<'a, W, true>;
/// Positions of clear bits.
pub type Zeros<'a, W> = BitPosIter<'a, W, false>;

impl<'a, W: BitWord, const ONES: bool> BitPosIter<'a, W, ONES> {
    /// Iterate the whole slice, which logically holds `nbits` bits.
    #[inline]
    pub fn new(words: &'a [W], nbits: usize) -> Self {
        Self::from_offset(words, nbits, 0)
    }

    /// Start the sequence at global bit `start`, skipping everything below.
    ///
    /// Used to resume a scan after a growth event without revisiting
    /// already-exhausted lower slots.
    #[inline]
    pub fn from_offset(words: &'a [W], nbits: usize, start: usize) -> Self {
        debug_assert!(words.len() * word::width::<W>() >= nbits);
        let word_ix = start / word::width::<W>();
        let bit = start % word::width::<W>();
        let mut it = Self {
            words,
            nbits,
            word_ix,
            block: W::zero(),
        };
        if let Some(w) = it.read(word_ix) {
            it.block = w & word::lo_mask(bit);
        }
        it
    }

    /// Word contents normalized so that a 1 bit always means "yield".
    #[inline(always)]
    fn read(&self, ix: usize) -> Option<W> {
        let raw = *self.words.get(ix)?;
        let mut w = if ONES { raw } else { !raw };
        // Mask tail garbage in the final word.
        let base = ix * word::width::<W>();
        if base >= self.nbits {
            return None;
        }
        let remain = self.nbits - base;
        if remain < word::width::<W>() {
            w = w & word::hi_mask(remain);
        }
        Some(w)
    }
}

impl<'a, W: BitWord, const ONES: bool> Iterator for BitPosIter<'a, W, ONES> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        while self.block == W::zero() {
            self.word_ix += 1;
            self.block = self.read(self.word_ix)?;
        }
        let bit = self.block.trailing_zeros() as usize;
        // Strip the lowest set bit.
        self.block = self.block & (self.block - W::one());
        Some(self.word_ix * word::width::<W>() + bit)
    }
}

impl<'a, W: BitWord, const ONES: bool> FusedIterator for BitPosIter<'a, W, ONES> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn ones_of(words: &[u8], nbits: usize) -> Vec<usize> {
        Ones::new(words, nbits).collect()
    }

    fn zeros_of(words: &[u8], nbits: usize) -> Vec<usize> {
        Zeros::new(words, nbits).collect()
    }

    #[test]
    fn test_ones_ascending_across_words() {
        let words = [0b0000_0101u8, 0b1000_0000];
        assert_eq!(ones_of(&words, 16), vec![0, 2, 15]);
    }

    #[test]
    fn test_ones_skips_empty_words() {
        let words = [0u8, 0, 0, 0b0000_0001];
        assert_eq!(ones_of(&words, 32), vec![24]);
    }

    #[test]
    fn test_zeros_skips_full_words() {
        let words = [0xFFu8, 0xFF, 0b1111_1011];
        assert_eq!(zeros_of(&words, 24), vec![18]);
    }

    #[test]
    fn test_zeros_bounded_by_length() {
        // Bits 6 and 7 of the word are outside the logical length and must
        // not be reported even though they read as zeros.
        let words = [0b0001_1011u8];
        assert_eq!(zeros_of(&words, 6), vec![2, 5]);
    }

    #[test]
    fn test_ones_bounded_by_length() {
        let words = [0xFFu8];
        assert_eq!(ones_of(&words, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_empty_slice_yields_nothing() {
        assert_eq!(ones_of(&[], 0), Vec::<usize>::new());
    }

    #[test]
    fn test_from_offset_mid_word() {
        let words = [0b1010_1010u8, 0b0000_0001];
        let v: Vec<usize> = Ones::from_offset(&words, 16, 4).collect();
        assert_eq!(v, vec![5, 7, 8]);
    }

    #[test]
    fn test_from_offset_at_word_boundary() {
        let words = [0xFFu8, 0b0000_0110];
        let v: Vec<usize> = Ones::from_offset(&words, 16, 8).collect();
        assert_eq!(v, vec![9, 10]);
    }

    #[test]
    fn test_matches_naive_scan() {
        let words = [0xDEu8, 0xAD, 0xBE, 0xEF, 0x00, 0xFF, 0x42];
        let nbits = 52;
        let naive: Vec<usize> = (0..nbits)
            .filter(|&i| words[i / 8] & (1 << (i % 8)) != 0)
            .collect();
        assert_eq!(ones_of(&words, nbits), naive);
        let naive_z: Vec<usize> = (0..nbits)
            .filter(|&i| words[i / 8] & (1 << (i % 8)) == 0)
            .collect();
        assert_eq!(zeros_of(&words, nbits), naive_z);
    }
}

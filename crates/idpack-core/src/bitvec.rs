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

//! An owning, flat bitset over packed words.

use crate::iter::{Ones, Zeros};
use crate::word;
use crate::BitWord;

/// A flat bitset of `len` bits stored in `Vec<W>` words.
///
/// Bits in the last word beyond `len` are kept at zero, so whole-word
/// operations and ones-iteration never see tail garbage. The number of set
/// bits is tracked incrementally, making [`BitVec::count_ones`] O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BitVec<W: BitWord = u64> {
    words: Vec<W>,
    len: usize,
    ones: usize,
}

impl<W: BitWord> BitVec<W> {
    /// An empty bitset of `len` bits, optionally with every bit set.
    pub fn new(len: usize, fill: bool) -> Self {
        let nwords = len.div_ceil(word::width::<W>());
        let mut v = Self {
            words: vec![W::zero(); nwords],
            len,
            ones: 0,
        };
        if fill {
            v.set_all();
        }
        v
    }

    /// Number of bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of set bits.
    #[inline]
    pub fn count_ones(&self) -> usize {
        self.ones
    }

    /// Backing words, low bit first.
    #[inline]
    pub fn words(&self) -> &[W] {
        &self.words
    }

    /// Test bit `bit`. Out-of-range positions read as clear.
    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        if bit >= self.len {
            return false;
        }
        word::bit_test(self.words[bit / word::width::<W>()], bit % word::width::<W>())
    }

    /// Set bit `bit` to 1.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= len`.
    #[inline]
    pub fn set(&mut self, bit: usize) {
        assert!(bit < self.len, "bit position {} out of range {}", bit, self.len);
        let w = &mut self.words[bit / word::width::<W>()];
        let mask = W::one() << (bit % word::width::<W>());
        if *w & mask == W::zero() {
            *w = *w | mask;
            self.ones += 1;
        }
    }

    /// Reset bit `bit` to 0.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= len`.
    #[inline]
    pub fn reset(&mut self, bit: usize) {
        assert!(bit < self.len, "bit position {} out of range {}", bit, self.len);
        let w = &mut self.words[bit / word::width::<W>()];
        let mask = W::one() << (bit % word::width::<W>());
        if *w & mask != W::zero() {
            *w = *w & !mask;
            self.ones -= 1;
        }
    }

    /// Set every bit.
    pub fn set_all(&mut self) {
        for w in &mut self.words {
            *w = word::ones::<W>();
        }
        self.mask_tail();
        self.ones = self.len;
    }

    /// Clear every bit.
    pub fn clear_all(&mut self) {
        for w in &mut self.words {
            *w = W::zero();
        }
        self.ones = 0;
    }

    /// Grow or shrink to `len` bits, preserving existing bits. New bits are
    /// set when `fill` is true.
    pub fn resize(&mut self, len: usize, fill: bool) {
        let old_len = self.len;
        let nwords = len.div_ceil(word::width::<W>());
        self.words.resize(nwords, W::zero());
        self.len = len;
        if len > old_len {
            if fill {
                // Set [old_len, len): whole-word fill plus the two edges.
                let start_w = old_len / word::width::<W>();
                let end_w = len.div_ceil(word::width::<W>());
                for ix in start_w..end_w {
                    let base = ix * word::width::<W>();
                    let lo = old_len.saturating_sub(base).min(word::width::<W>());
                    let hi = (len - base).min(word::width::<W>());
                    self.words[ix] = self.words[ix] | word::range_mask(lo, hi);
                }
            }
        }
        self.mask_tail();
        self.recount();
    }

    /// Ascending positions of set bits.
    #[inline]
    pub fn ones(&self) -> Ones<'_, W> {
        Ones::new(&self.words, self.len)
    }

    /// Ascending positions of set bits, starting at `bit`.
    #[inline]
    pub fn ones_from(&self, bit: usize) -> Ones<'_, W> {
        Ones::from_offset(&self.words, self.len, bit)
    }

    /// Ascending positions of clear bits.
    #[inline]
    pub fn zeros(&self) -> Zeros<'_, W> {
        Zeros::new(&self.words, self.len)
    }

    /// Position of the first set bit at or after `bit`.
    #[inline]
    pub fn first_one_from(&self, bit: usize) -> Option<usize> {
        self.ones_from(bit).next()
    }

    #[inline]
    fn mask_tail(&mut self) {
        let tail = self.len % word::width::<W>();
        if tail != 0 {
            if let Some(last) = self.words.last_mut() {
                *last = *last & word::hi_mask(tail);
            }
        }
    }

    fn recount(&mut self) {
        self.ones = self
            .words
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_new_empty_has_no_ones() {
        let v: BitVec = BitVec::new(100, false);
        assert_eq!(v.len(), 100);
        assert_eq!(v.count_ones(), 0);
        assert_eq!(v.ones().next(), None);
    }

    #[test]
    fn test_new_filled_counts_all() {
        let v: BitVec = BitVec::new(70, true);
        assert_eq!(v.count_ones(), 70);
        assert_eq!(v.ones().count(), 70);
        assert_eq!(v.zeros().next(), None);
    }

    #[test]
    fn test_set_reset_roundtrip() {
        let mut v: BitVec = BitVec::new(130, false);
        v.set(0);
        v.set(64);
        v.set(129);
        assert!(v.test(64));
        assert_eq!(v.count_ones(), 3);
        assert_eq!(v.ones().collect::<Vec<_>>(), vec![0, 64, 129]);
        v.reset(64);
        assert!(!v.test(64));
        assert_eq!(v.count_ones(), 2);
    }

    #[test]
    fn test_set_is_idempotent_for_count() {
        let mut v: BitVec = BitVec::new(10, false);
        v.set(3);
        v.set(3);
        assert_eq!(v.count_ones(), 1);
        v.reset(3);
        v.reset(3);
        assert_eq!(v.count_ones(), 0);
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        let mut v: BitVec = BitVec::new(8, false);
        v.set(8);
    }

    #[test]
    fn test_test_out_of_range_reads_clear() {
        let v: BitVec = BitVec::new(8, true);
        assert!(!v.test(8));
        assert!(!v.test(1000));
    }

    #[test]
    fn test_resize_grow_filled_marks_new_only() {
        let mut v: BitVec = BitVec::new(10, false);
        v.set(3);
        v.resize(100, true);
        assert!(v.test(3));
        assert!(!v.test(4));
        assert!(v.test(10));
        assert!(v.test(99));
        assert_eq!(v.count_ones(), 1 + 90);
    }

    #[test]
    fn test_resize_grow_unfilled_leaves_new_clear() {
        let mut v: BitVec = BitVec::new(10, true);
        v.resize(80, false);
        assert_eq!(v.count_ones(), 10);
        assert!(!v.test(10));
    }

    #[test]
    fn test_resize_shrink_drops_tail() {
        let mut v: BitVec = BitVec::new(128, true);
        v.resize(5, false);
        assert_eq!(v.len(), 5);
        assert_eq!(v.count_ones(), 5);
        assert_eq!(v.zeros().next(), None);
    }

    #[test]
    fn test_zeros_complement_ones() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x1D5E7);
        let mut v: BitVec = BitVec::new(777, false);
        for _ in 0..400 {
            v.set(rng.random_range(0..777));
        }
        let ones: Vec<usize> = v.ones().collect();
        let zeros: Vec<usize> = v.zeros().collect();
        assert_eq!(ones.len() + zeros.len(), 777);
        let mut merged: Vec<usize> = ones.into_iter().chain(zeros).collect();
        merged.sort_unstable();
        assert_eq!(merged, (0..777).collect::<Vec<_>>());
    }

    #[test]
    fn test_first_one_from_resumes() {
        let mut v: BitVec = BitVec::new(200, false);
        v.set(3);
        v.set(130);
        assert_eq!(v.first_one_from(0), Some(3));
        assert_eq!(v.first_one_from(4), Some(130));
        assert_eq!(v.first_one_from(131), None);
    }
}

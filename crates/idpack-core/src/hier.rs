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

//! A bitset with hierarchical summary rows for sub-linear skip-ahead.
//!
//! Row 0 holds the user's bits. Each row above has one bit per *word* of the
//! row below, set iff that word is non-zero. Finding the next set bit, or
//! bulk-taking set bits, walks the hierarchy and so skips entire empty
//! regions in O(rows) = O(log n) word touches instead of scanning them.
//!
//! Layout for a 40-bit set with 8-bit words:
//!
//! ```text
//! row 1: 1 word,  5 bits used (one per row-0 word)
//! row 0: 5 words, 40 bits
//! ```
//!
//! All rows live back to back in one allocation, row 0 first.

use crate::word;
use crate::BitWord;
use std::iter::FusedIterator;

const MAX_ROWS: usize = 8;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Row {
    offset: usize,
    words: usize,
}

/// Bitset with summary rows. See the module docs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HierBitset<W: BitWord = u64> {
    rows: [Row; MAX_ROWS],
    top: usize,
    len: usize,
    count: usize,
    blocks: Vec<W>,
}

impl<W: BitWord> HierBitset<W> {
    /// A set of `len` bits, all set when `fill` is true.
    pub fn new(len: usize, fill: bool) -> Self {
        let (rows, top, total) = Self::layout(len);
        let mut set = Self {
            rows,
            top,
            len,
            count: 0,
            blocks: vec![W::zero(); total],
        };
        if fill {
            set.set_all();
        }
        set
    }

    /// Row offsets and sizes for `len` row-0 bits. The top row shrinks to a
    /// single word; the exponential fan-out keeps the row count at most
    /// [`MAX_ROWS`] for any realistic capacity.
    fn layout(len: usize) -> ([Row; MAX_ROWS], usize, usize) {
        let mut rows = [Row::default(); MAX_ROWS];
        let mut level = 0;
        let mut total = 0;
        let mut bits = len;
        loop {
            let words = bits.div_ceil(word::width::<W>());
            rows[level] = Row {
                offset: total,
                words,
            };
            total += words;
            if words <= 1 {
                break;
            }
            bits = words;
            level += 1;
            assert!(level < MAX_ROWS, "bit capacity {} needs too many rows", len);
        }
        (rows, level, total)
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

    /// Number of set bits, tracked incrementally.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Row-0 words. Lets callers run flat iteration over the raw bits.
    #[inline]
    pub fn base_words(&self) -> &[W] {
        &self.blocks[self.rows[0].offset..self.rows[0].offset + self.rows[0].words]
    }

    /// Test bit `bit`. Out-of-range positions read as clear.
    #[inline]
    pub fn test(&self, bit: usize) -> bool {
        if bit >= self.len {
            return false;
        }
        let w = self.blocks[self.rows[0].offset + bit / word::width::<W>()];
        word::bit_test(w, bit % word::width::<W>())
    }

    /// Set bit `bit`, propagating summary bits upward only while a word
    /// transitions from zero to non-zero.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= len`.
    pub fn set(&mut self, bit: usize) {
        assert!(bit < self.len, "bit position {} out of range {}", bit, self.len);
        let mut level = 0;
        let mut pos = bit;
        loop {
            let ix = self.rows[level].offset + pos / word::width::<W>();
            let mask = W::one() << (pos % word::width::<W>());
            let old = self.blocks[ix];
            if old & mask != W::zero() {
                break;
            }
            self.blocks[ix] = old | mask;
            if level == 0 {
                self.count += 1;
            }
            if old != W::zero() || level == self.top {
                break;
            }
            pos /= word::width::<W>();
            level += 1;
        }
    }

    /// Reset bit `bit`, propagating summary bits upward only while a word
    /// transitions from non-zero to zero.
    ///
    /// # Panics
    ///
    /// Panics if `bit >= len`.
    pub fn reset(&mut self, bit: usize) {
        assert!(bit < self.len, "bit position {} out of range {}", bit, self.len);
        let mut level = 0;
        let mut pos = bit;
        loop {
            let ix = self.rows[level].offset + pos / word::width::<W>();
            let mask = W::one() << (pos % word::width::<W>());
            let old = self.blocks[ix];
            if old & mask == W::zero() {
                break;
            }
            self.blocks[ix] = old & !mask;
            if level == 0 {
                self.count -= 1;
            }
            if self.blocks[ix] != W::zero() || level == self.top {
                break;
            }
            pos /= word::width::<W>();
            level += 1;
        }
    }

    /// Set every bit.
    pub fn set_all(&mut self) {
        for level in 0..=self.top {
            let bits = if level == 0 {
                self.len
            } else {
                self.rows[level - 1].words
            };
            let row = self.rows[level];
            word::set_low_bits(&mut self.blocks[row.offset..row.offset + row.words], bits);
        }
        self.count = self.len;
    }

    /// Clear every bit.
    pub fn clear_all(&mut self) {
        for w in &mut self.blocks {
            *w = W::zero();
        }
        self.count = 0;
    }

    /// First set bit, or `None` when the set is empty.
    #[inline]
    pub fn front(&self) -> Option<usize> {
        self.next_from(0)
    }

    /// First set bit at or after `bit`.
    pub fn next_from(&self, bit: usize) -> Option<usize> {
        if bit >= self.len {
            return None;
        }
        if self.test(bit) {
            return Some(bit);
        }
        self.next_above(0, bit / word::width::<W>(), bit % word::width::<W>())
            .map(|(block, b)| block * word::width::<W>() + b)
    }

    /// Walk for the first set bit of `level` strictly after `(block, bit)`,
    /// climbing into summary rows to hop over zero words.
    fn next_above(&self, level: usize, block: usize, bit: usize) -> Option<(usize, usize)> {
        let w = self.blocks[self.rows[level].offset + block];
        if let Some(nb) = word::next_set_bit(w, bit) {
            return Some((block, nb));
        }
        if level == self.top {
            return None;
        }
        let (ub, ubit) = self.next_above(
            level + 1,
            block / word::width::<W>(),
            block % word::width::<W>(),
        )?;
        let next_block = ub * word::width::<W>() + ubit;
        let nb = self.blocks[self.rows[level].offset + next_block].trailing_zeros() as usize;
        Some((next_block, nb))
    }

    /// Ascending iteration over set bits.
    #[inline]
    pub fn iter(&self) -> HierOnes<'_, W> {
        HierOnes {
            set: self,
            pos: self.front(),
        }
    }

    /// Clear up to `count` set bits in ascending order, feeding each cleared
    /// position to `sink`. Returns the shortfall: non-zero iff the set ran
    /// out of bits before `count` were taken.
    ///
    /// The walk descends only into summary words that are non-zero, so a
    /// bulk take skips empty subtrees wholesale.
    pub fn take<F: FnMut(usize)>(&mut self, count: usize, mut sink: F) -> usize {
        let mut remaining = count;
        let top = self.top;
        for block in 0..self.rows[top].words {
            self.take_recurse(top, block, &mut sink, &mut remaining);
            if remaining == 0 {
                break;
            }
        }
        remaining
    }

    /// Returns true when the visited word is still non-zero (or the budget
    /// ran out), telling the caller not to clear its summary bit.
    fn take_recurse<F: FnMut(usize)>(
        &mut self,
        level: usize,
        block: usize,
        sink: &mut F,
        remaining: &mut usize,
    ) -> bool {
        let ix = self.rows[level].offset + block;
        while self.blocks[ix] != W::zero() {
            if *remaining == 0 {
                return true;
            }
            let bit = self.blocks[ix].trailing_zeros() as usize;
            let row_bit = block * word::width::<W>() + bit;
            if level == 0 {
                sink(row_bit);
                *remaining -= 1;
                self.count -= 1;
                self.blocks[ix] = self.blocks[ix] & !(W::one() << bit);
            } else {
                if self.take_recurse(level - 1, row_bit, sink, remaining) {
                    continue;
                }
                self.blocks[ix] = self.blocks[ix] & !(W::one() << bit);
            }
        }
        false
    }

    /// Reallocate for `len` bits. Existing row-0 bits are preserved; bits in
    /// newly gained space are set when `fill_new` is true. Summary rows are
    /// rebuilt from scratch rather than patched.
    pub fn resize(&mut self, len: usize, fill_new: bool) {
        let mut replacement = Self::new(len, fill_new);
        let keep = self.len.min(len);
        word::copy_bits(
            self.base_words(),
            &mut replacement.blocks[replacement.rows[0].offset..],
            keep,
        );
        replacement.rebuild_summaries();
        replacement.recount();
        *self = replacement;
    }

    fn rebuild_summaries(&mut self) {
        for level in 0..self.top {
            let below = self.rows[level];
            let above = self.rows[level + 1];
            for j in 0..above.words {
                let mut w = W::zero();
                let first = j * word::width::<W>();
                let last = (first + word::width::<W>()).min(below.words);
                for (k, b) in (first..last).enumerate() {
                    if self.blocks[below.offset + b] != W::zero() {
                        w = w | (W::one() << k);
                    }
                }
                self.blocks[above.offset + j] = w;
            }
        }
    }

    fn recount(&mut self) {
        let row = self.rows[0];
        self.count = self.blocks[row.offset..row.offset + row.words]
            .iter()
            .map(|w| w.count_ones() as usize)
            .sum();
    }
}

/// Ascending iterator over the set bits of a [`HierBitset`].
#[derive(Debug, Clone)]
pub struct HierOnes<'a, W: BitWord> {
    set: &'a HierBitset<W>,
    pos: Option<usize>,
}

impl<'a, W: BitWord> Iterator for HierOnes<'a, W> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        let cur = self.pos?;
        self.pos = self.set.next_from(cur + 1);
        Some(cur)
    }
}

impl<'a, W: BitWord> FusedIterator for HierOnes<'a, W> {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;

    const CAP: usize = 13370;

    fn random_filled(seed: u64, cap: usize, fill: f64) -> (HierBitset<u64>, Vec<bool>) {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut hier: HierBitset<u64> = HierBitset::new(cap, false);
        let mut naive = vec![false; cap];
        for bit in 0..cap {
            if rng.random_bool(fill) {
                hier.set(bit);
                naive[bit] = true;
            }
        }
        (hier, naive)
    }

    #[test]
    fn test_layout_spans_multiple_rows() {
        let set: HierBitset<u64> = HierBitset::new(CAP, false);
        // 13370 bits -> 209 words -> 4 words -> 1 word
        assert_eq!(set.top, 2);
        assert_eq!(set.rows[0].words, 209);
        assert_eq!(set.rows[1].words, 4);
        assert_eq!(set.rows[2].words, 1);
    }

    #[test]
    fn test_set_reset_count() {
        let mut set: HierBitset<u64> = HierBitset::new(100, false);
        set.set(7);
        set.set(7);
        set.set(99);
        assert_eq!(set.count(), 2);
        assert!(set.test(7));
        set.reset(7);
        set.reset(7);
        assert_eq!(set.count(), 1);
        assert!(!set.test(7));
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_out_of_range_panics() {
        let mut set: HierBitset<u64> = HierBitset::new(10, false);
        set.set(10);
    }

    #[test]
    fn test_iter_matches_linear_scan_random_fill() {
        let (hier, naive) = random_filled(0xC0FFEE, CAP, 0.5);
        let expected: Vec<usize> = (0..CAP).filter(|&i| naive[i]).collect();
        let actual: Vec<usize> = hier.iter().collect();
        assert_eq!(actual, expected);
        assert_eq!(hier.count(), expected.len());
    }

    #[test]
    fn test_iter_matches_after_random_churn() {
        let mut rng = ChaCha8Rng::seed_from_u64(0xBAD5EED);
        let (mut hier, mut naive) = random_filled(42, CAP, 0.5);
        for _ in 0..20_000 {
            let bit = rng.random_range(0..CAP);
            if rng.random_bool(0.5) {
                hier.set(bit);
                naive[bit] = true;
            } else {
                hier.reset(bit);
                naive[bit] = false;
            }
        }
        let expected: Vec<usize> = (0..CAP).filter(|&i| naive[i]).collect();
        assert_eq!(hier.iter().collect::<Vec<_>>(), expected);
        assert_eq!(hier.count(), expected.len());
    }

    #[test]
    fn test_next_from_lands_on_set_bit() {
        let mut set: HierBitset<u64> = HierBitset::new(1000, false);
        set.set(130);
        set.set(900);
        assert_eq!(set.next_from(0), Some(130));
        assert_eq!(set.next_from(130), Some(130));
        assert_eq!(set.next_from(131), Some(900));
        assert_eq!(set.next_from(901), None);
    }

    #[test]
    fn test_front_empty() {
        let set: HierBitset<u64> = HierBitset::new(512, false);
        assert_eq!(set.front(), None);
    }

    #[test]
    fn test_take_all_ascending() {
        let mut set: HierBitset<u64> = HierBitset::new(300, false);
        for bit in [3usize, 64, 65, 299] {
            set.set(bit);
        }
        let mut got = Vec::new();
        let shortfall = set.take(10, |b| got.push(b));
        assert_eq!(got, vec![3, 64, 65, 299]);
        assert_eq!(shortfall, 6);
        assert_eq!(set.count(), 0);
        assert_eq!(set.front(), None);
    }

    #[test]
    fn test_take_partial_leaves_rest() {
        let mut set: HierBitset<u64> = HierBitset::new(CAP, true);
        let mut got = Vec::new();
        let shortfall = set.take(100, |b| got.push(b));
        assert_eq!(shortfall, 0);
        assert_eq!(got, (0..100).collect::<Vec<_>>());
        assert_eq!(set.count(), CAP - 100);
        assert_eq!(set.front(), Some(100));
        // Untouched bits still report set.
        assert!(set.test(100));
        assert!(set.test(CAP - 1));
    }

    #[test]
    fn test_take_then_set_consistent_summaries() {
        let mut set: HierBitset<u64> = HierBitset::new(500, true);
        let taken = {
            let mut v = Vec::new();
            set.take(500, |b| v.push(b));
            v
        };
        assert_eq!(taken.len(), 500);
        set.set(333);
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![333]);
    }

    #[test]
    fn test_resize_preserves_and_fills() {
        let mut set: HierBitset<u64> = HierBitset::new(100, false);
        set.set(3);
        set.set(99);
        set.resize(10_000, true);
        assert!(set.test(3));
        assert!(!set.test(4));
        assert!(set.test(99));
        assert!(set.test(100));
        assert!(set.test(9999));
        assert_eq!(set.count(), 2 + (10_000 - 100));
        // Summaries must be usable after the rebuild.
        assert_eq!(set.next_from(4), Some(99));
    }

    #[test]
    fn test_resize_shrink() {
        let mut set: HierBitset<u64> = HierBitset::new(10_000, true);
        set.resize(70, false);
        assert_eq!(set.len(), 70);
        assert_eq!(set.count(), 70);
        assert_eq!(set.iter().count(), 70);
    }

    #[test]
    fn test_set_all_clear_all() {
        let mut set: HierBitset<u64> = HierBitset::new(CAP, false);
        set.set_all();
        assert_eq!(set.count(), CAP);
        assert_eq!(set.iter().count(), CAP);
        set.clear_all();
        assert_eq!(set.count(), 0);
        assert_eq!(set.front(), None);
    }
}

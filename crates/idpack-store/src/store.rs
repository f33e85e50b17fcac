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

//! The fragmenting, incrementally compacting partition store.
//!
//! # Layout model
//!
//! Live partitions sit left to right in the buffer in *partition number*
//! order. Numbers are handed out by the trailing free span, which always
//! covers the buffer's right end; a fresh partition is carved off its left
//! edge. Erasing a partition turns its number and span into an interior
//! free span. So at all times:
//!
//! ```text
//! | prtn 0 | prtn 1 | (free: prtn 2) | prtn 3 | (trailing free: prtn 4..) |
//! ```
//!
//! Interior free spans are recorded in a list sorted by descending
//! partition number; the nearest hole to the buffer's front is at its back.
//! [`PartitionStore::pack`] fills that hole by sliding the partitions after
//! it left, then merges it into the next free span (interior or trailing),
//! and repeats until the move budget is spent.
//!
//! # Safety invariant
//!
//! The buffer is `MaybeUninit<T>`; a slot is initialized iff it lies inside
//! a live partition's span. Every `unsafe` block in this module relies on
//! exactly that, which is why the bookkeeping asserts are always on: a
//! stale map entry here is not a cosmetic bug but a double drop.

use idpack_core::id::Id;
use std::fmt;
use std::marker::PhantomData;
use std::mem::MaybeUninit;
use std::ptr;
use tracing::debug;

const NULL_IX: usize = usize::MAX;

/// The trailing free span cannot hold a requested partition.
///
/// Interior holes do not count as available space; only [`pack`] or
/// [`reserve_data`] turn them back into trailing space.
///
/// [`pack`]: PartitionStore::pack
/// [`reserve_data`]: PartitionStore::reserve_data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutOfSpaceError {
    requested: usize,
    available: usize,
}

impl OutOfSpaceError {
    #[inline]
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Length of the trailing free span at the time of the request.
    #[inline]
    pub fn available(&self) -> usize {
        self.available
    }
}

impl fmt::Display for OutOfSpaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "partition of {} elements does not fit in {} trailing free elements",
            self.requested, self.available
        )
    }
}

impl std::error::Error for OutOfSpaceError {}

#[derive(Debug, Clone, Copy, Default)]
struct DataSpan {
    offset: usize,
    len: usize,
}

#[derive(Debug, Clone, Copy, Default)]
struct FreeSpan {
    offset: usize,
    /// First partition number this span owns.
    prtn: usize,
    /// How many consecutive partition numbers it owns.
    prtn_count: usize,
    len: usize,
}

/// Span being filled element by element during `emplace`. Dropping it
/// mid-fill (iterator unwound) drops the written prefix, keeping the
/// untracked slots uninitialized. Forgotten on a completed fill.
struct PartialFill<'a, T> {
    slots: &'a mut [MaybeUninit<T>],
    written: usize,
}

impl<T> Drop for PartialFill<'_, T> {
    fn drop(&mut self) {
        unsafe {
            let prefix: *mut [T] =
                ptr::slice_from_raw_parts_mut(self.slots.as_mut_ptr().cast(), self.written);
            ptr::drop_in_place(prefix);
        }
    }
}

/// Many contiguous `[T]` partitions in one buffer, keyed by ids.
///
/// Allocation only ever carves from the trailing free span, so `emplace`
/// is O(1) and can fail with [`OutOfSpaceError`] even while interior holes
/// exist; fragmentation is reclaimed explicitly through [`pack`] or the
/// migrating [`reserve_data`].
///
/// [`pack`]: PartitionStore::pack
/// [`reserve_data`]: PartitionStore::reserve_data
#[derive(Debug)]
pub struct PartitionStore<I: Id, T> {
    data: Box<[MaybeUninit<T>]>,
    /// Partition number -> id index, [`NULL_IX`] for free numbers.
    prtn_to_id: Vec<usize>,
    /// Id index -> partition number, [`NULL_IX`] for absent ids.
    id_to_prtn: Vec<usize>,
    id_to_span: Vec<DataSpan>,
    /// Interior free spans, sorted by descending partition number.
    free: Vec<FreeSpan>,
    trailing: FreeSpan,
    live_ids: usize,
    used: usize,
    _id: PhantomData<I>,
}

impl<I: Id, T> PartitionStore<I, T> {
    /// A store for ids below `ids_capacity` with room for `data_capacity`
    /// elements in total.
    pub fn new(ids_capacity: usize, data_capacity: usize) -> Self {
        let mut data = Vec::with_capacity(data_capacity);
        data.resize_with(data_capacity, MaybeUninit::uninit);
        Self {
            data: data.into_boxed_slice(),
            prtn_to_id: vec![NULL_IX; ids_capacity],
            id_to_prtn: vec![NULL_IX; ids_capacity],
            id_to_span: vec![DataSpan::default(); ids_capacity],
            free: Vec::new(),
            trailing: FreeSpan {
                offset: 0,
                prtn: 0,
                prtn_count: 0,
                len: data_capacity,
            },
            live_ids: 0,
            used: 0,
            _id: PhantomData,
        }
    }

    /// Whether `id` currently holds a partition.
    #[inline]
    pub fn contains(&self, id: I) -> bool {
        self.id_to_prtn
            .get(id.index())
            .is_some_and(|&prtn| prtn != NULL_IX)
    }

    /// Number of ids holding a partition.
    #[inline]
    pub fn ids_count(&self) -> usize {
        self.live_ids
    }

    /// Total elements across live partitions.
    #[inline]
    pub fn data_size(&self) -> usize {
        self.used
    }

    #[inline]
    pub fn ids_capacity(&self) -> usize {
        self.id_to_prtn.len()
    }

    #[inline]
    pub fn data_capacity(&self) -> usize {
        self.data.len()
    }

    /// Total elements trapped in interior holes. Zero right after
    /// [`reserve_data`](Self::reserve_data) or an unbudgeted
    /// [`pack`](Self::pack).
    #[inline]
    pub fn interior_free_len(&self) -> usize {
        self.free.iter().map(|f| f.len).sum()
    }

    /// Grow the id range to at least `capacity`. Never shrinks.
    pub fn reserve_ids(&mut self, capacity: usize) {
        if capacity > self.id_to_prtn.len() {
            self.id_to_prtn.resize(capacity, NULL_IX);
            self.id_to_span.resize(capacity, DataSpan::default());
        }
    }

    /// Elements of `id`'s partition; empty for absent or out-of-range ids.
    pub fn get(&self, id: I) -> &[T] {
        match self.span_of(id) {
            // Initialized per the module invariant: inside a live span.
            Some(span) => unsafe {
                std::slice::from_raw_parts(self.data.as_ptr().add(span.offset).cast(), span.len)
            },
            None => &[],
        }
    }

    /// Mutable elements of `id`'s partition; empty for absent ids.
    pub fn get_mut(&mut self, id: I) -> &mut [T] {
        match self.span_of(id) {
            Some(span) => unsafe {
                std::slice::from_raw_parts_mut(
                    self.data.as_mut_ptr().add(span.offset).cast(),
                    span.len,
                )
            },
            None => &mut [],
        }
    }

    fn span_of(&self, id: I) -> Option<DataSpan> {
        let &prtn = self.id_to_prtn.get(id.index())?;
        (prtn != NULL_IX).then(|| self.id_to_span[id.index()])
    }

    /// Ascending iteration over the ids that hold a partition.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        self.id_to_prtn
            .iter()
            .enumerate()
            .filter(|(_, &prtn)| prtn != NULL_IX)
            .map(|(ix, _)| I::from_index(ix))
    }

    /// Create a partition for `id` from an exact-size iterator of elements.
    /// On success returns the freshly filled slice.
    ///
    /// The span is filled before any bookkeeping changes. Should the
    /// iterator panic mid-fill, the elements it already produced are
    /// dropped during unwinding and the store is left exactly as it was;
    /// no partially initialized partition ever becomes live.
    ///
    /// # Panics
    ///
    /// Panics if `id` is out of range or already holds a partition. These
    /// checks stay on in release builds; see the module docs.
    pub fn emplace<It>(&mut self, id: I, values: It) -> Result<&mut [T], OutOfSpaceError>
    where
        It: IntoIterator<Item = T>,
        It::IntoIter: ExactSizeIterator,
    {
        let values = values.into_iter();
        let len = values.len();
        let offset = self.check_create(id, len)?;

        let mut fill = PartialFill {
            slots: &mut self.data[offset..offset + len],
            written: 0,
        };
        for value in values {
            assert!(
                fill.written < len,
                "exact-size iterator lied about its length"
            );
            fill.slots[fill.written].write(value);
            fill.written += 1;
        }
        assert!(
            fill.written == len,
            "exact-size iterator lied about its length"
        );
        std::mem::forget(fill);

        self.bind_partition(id, offset, len);
        Ok(unsafe {
            std::slice::from_raw_parts_mut(self.data.as_mut_ptr().add(offset).cast(), len)
        })
    }

    /// Create a partition of `len` defaulted elements for `id`.
    ///
    /// # Panics
    ///
    /// Same contract checks as [`emplace`](Self::emplace).
    pub fn emplace_default(&mut self, id: I, len: usize) -> Result<&mut [T], OutOfSpaceError>
    where
        T: Default,
    {
        self.emplace(id, (0..len).map(|_| T::default()))
    }

    /// Check the create contract and the trailing room for a partition of
    /// `len`. Returns the offset it would get; nothing is modified yet.
    fn check_create(&self, id: I, len: usize) -> Result<usize, OutOfSpaceError> {
        assert!(
            id.index() < self.id_to_prtn.len(),
            "id {:?} out of range {}",
            id,
            self.id_to_prtn.len()
        );
        assert!(!self.contains(id), "id {:?} already holds a partition", id);

        if self.trailing.len < len {
            return Err(OutOfSpaceError {
                requested: len,
                available: self.trailing.len,
            });
        }
        Ok(self.trailing.offset)
    }

    /// Carve `len` slots off the trailing free span and register them for
    /// `id`. The slots at `offset` must already be initialized.
    fn bind_partition(&mut self, id: I, offset: usize, len: usize) {
        debug_assert!(offset == self.trailing.offset);
        let prtn = self.trailing.prtn;
        self.trailing.offset += len;
        self.trailing.len -= len;
        self.trailing.prtn += 1;

        if prtn >= self.prtn_to_id.len() {
            self.prtn_to_id.resize(prtn + 1, NULL_IX);
        }
        self.prtn_to_id[prtn] = id.index();
        self.id_to_prtn[id.index()] = prtn;
        self.id_to_span[id.index()] = DataSpan { offset, len };
        self.live_ids += 1;
        self.used += len;
    }

    /// Drop `id`'s elements in place and turn its span into an interior
    /// hole. The space is not reusable until packed or migrated.
    ///
    /// # Panics
    ///
    /// Panics if `id` holds no partition. Always on; see the module docs.
    pub fn erase(&mut self, id: I) {
        assert!(self.contains(id), "id {:?} holds no partition", id);

        let prtn = std::mem::replace(&mut self.id_to_prtn[id.index()], NULL_IX);
        let span = self.id_to_span[id.index()];
        self.prtn_to_id[prtn] = NULL_IX;
        self.live_ids -= 1;
        self.used -= span.len;

        // Initialized per the module invariant; the maps above are already
        // cleared, so nothing can reach these slots again.
        unsafe {
            let slots: *mut [T] = ptr::slice_from_raw_parts_mut(
                self.data.as_mut_ptr().add(span.offset).cast(),
                span.len,
            );
            ptr::drop_in_place(slots);
        }

        let hole = FreeSpan {
            offset: span.offset,
            prtn,
            prtn_count: 1,
            len: span.len,
        };
        // Keep the list sorted by descending partition number.
        let at = self.free.partition_point(|f| f.prtn > prtn);
        self.free.insert(at, hole);
    }

    /// Slide partitions left to fill interior holes, moving at most roughly
    /// `budget` elements.
    ///
    /// The hole nearest the buffer's front is filled first. The budget is
    /// checked after each whole-partition move, so one partition moves even
    /// at budget 0 and a partition is never left straddling a hole;
    /// repeated calls with any budget converge to a fully compact buffer.
    pub fn pack(&mut self, budget: usize) {
        let mut moved = 0;
        while let Some(&hole) = self.free.last() {
            let mut hole = hole;
            loop {
                let next_prtn = hole.prtn + hole.prtn_count;
                let next_id = self
                    .prtn_to_id
                    .get(next_prtn)
                    .copied()
                    .unwrap_or(NULL_IX);

                if next_id == NULL_IX {
                    // Reached the next free span. Fold the hole into it and
                    // retire the hole's record.
                    self.free.pop();
                    let next = match self.free.last_mut() {
                        Some(f) if f.prtn == next_prtn => f,
                        _ => &mut self.trailing,
                    };
                    debug_assert!(next.prtn == next_prtn, "free span list out of order");
                    next.offset -= hole.len;
                    next.prtn -= hole.prtn_count;
                    next.prtn_count += hole.prtn_count;
                    next.len += hole.len;
                    break;
                }

                // Slide the partition right of the hole down onto its start.
                let span = self.id_to_span[next_id];
                let dst = span.offset - hole.len;
                // Source and destination can overlap when the partition is
                // longer than the hole.
                unsafe {
                    ptr::copy(
                        self.data.as_ptr().add(span.offset),
                        self.data.as_mut_ptr().add(dst),
                        span.len,
                    );
                }
                self.prtn_to_id[hole.prtn] = next_id;
                self.prtn_to_id[next_prtn] = NULL_IX;
                self.id_to_prtn[next_id] = hole.prtn;
                self.id_to_span[next_id].offset = dst;

                // The hole itself slid right past the moved partition.
                hole.prtn += 1;
                hole.offset += span.len;
                moved += span.len;

                if moved > budget {
                    // Write the advanced hole back so the next call resumes
                    // exactly here. Its record is still in the list.
                    let last = self.free.len() - 1;
                    self.free[last] = hole;
                    return;
                }
            }
        }
    }

    /// Reallocate the buffer to hold `capacity` elements, migrating every
    /// live partition. Migration compacts: partitions land back to back,
    /// renumbered densely, and all interior holes disappear.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is less than [`data_size`](Self::data_size).
    pub fn reserve_data(&mut self, capacity: usize) {
        assert!(
            capacity >= self.used,
            "data capacity {} below {} live elements",
            capacity,
            self.used
        );
        debug!(
            old = self.data.len(),
            new = capacity,
            live = self.used,
            "migrating partition store buffer"
        );

        let mut new_data = Vec::with_capacity(capacity);
        new_data.resize_with(capacity, MaybeUninit::uninit);
        let mut new_data = new_data.into_boxed_slice();

        let mut write_prtn = 0;
        let mut write_offset = 0;
        for read_prtn in 0..self.trailing.prtn {
            let id = self.prtn_to_id[read_prtn];
            if id == NULL_IX {
                continue;
            }
            let span = self.id_to_span[id];
            // Relocation is a move: the old slots become uninitialized and
            // the old buffer is dropped without touching them.
            unsafe {
                ptr::copy_nonoverlapping(
                    self.data.as_ptr().add(span.offset),
                    new_data.as_mut_ptr().add(write_offset),
                    span.len,
                );
            }
            self.prtn_to_id[read_prtn] = NULL_IX;
            self.prtn_to_id[write_prtn] = id;
            self.id_to_prtn[id] = write_prtn;
            self.id_to_span[id].offset = write_offset;
            write_offset += span.len;
            write_prtn += 1;
        }

        self.free.clear();
        self.trailing = FreeSpan {
            offset: write_offset,
            prtn: write_prtn,
            prtn_count: 0,
            len: capacity - write_offset,
        };
        self.data = new_data;
    }
}

impl<I: Id, T> Drop for PartitionStore<I, T> {
    fn drop(&mut self) {
        for prtn in 0..self.trailing.prtn {
            let id = self.prtn_to_id[prtn];
            if id == NULL_IX {
                continue;
            }
            let span = self.id_to_span[id];
            unsafe {
                let slots: *mut [T] = ptr::slice_from_raw_parts_mut(
                    self.data.as_mut_ptr().add(span.offset).cast(),
                    span.len,
                );
                ptr::drop_in_place(slots);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use std::cell::Cell;
    use std::collections::HashMap;
    use std::rc::Rc;

    #[test]
    fn test_emplace_get_roundtrip() {
        let mut store: PartitionStore<u32, f64> = PartitionStore::new(8, 32);
        let written = store.emplace(0, [1.0, 2.0]).unwrap();
        assert_eq!(written, &mut [1.0, 2.0]);
        store.emplace(3, [7.0]).unwrap();
        assert_eq!(store.get(0), &[1.0, 2.0]);
        assert_eq!(store.get(3), &[7.0]);
        assert_eq!(store.ids_count(), 2);
        assert_eq!(store.data_size(), 3);
        assert_eq!(store.ids().collect::<Vec<_>>(), vec![0, 3]);
    }

    #[test]
    fn test_get_absent_is_empty() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(4, 16);
        assert_eq!(store.get(2), &[] as &[i32]);
        assert_eq!(store.get(100), &[] as &[i32]);
        assert!(store.get_mut(2).is_empty());
        assert!(!store.contains(2));
    }

    #[test]
    fn test_emplace_default_zeroes() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(4, 16);
        store.emplace_default(1, 5).unwrap();
        assert_eq!(store.get(1), &[0; 5]);
    }

    #[test]
    fn test_erase_frees_id_but_not_space() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(8, 10);
        store.emplace(0, [1, 2, 3]).unwrap();
        store.emplace(1, [4, 5, 6]).unwrap();
        store.erase(0);
        assert!(!store.contains(0));
        assert_eq!(store.get(0), &[] as &[i32]);
        assert_eq!(store.interior_free_len(), 3);
        // 4 trailing slots left; the erased 3 are not allocatable yet.
        let err = store.emplace(2, [0; 5]).unwrap_err();
        assert_eq!(err.requested(), 5);
        assert_eq!(err.available(), 4);
    }

    #[test]
    #[should_panic(expected = "already holds a partition")]
    fn test_double_emplace_panics() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(4, 16);
        store.emplace(0, [1]).unwrap();
        let _ = store.emplace(0, [2]);
    }

    #[test]
    #[should_panic(expected = "holds no partition")]
    fn test_erase_absent_panics() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(4, 16);
        store.erase(0);
    }

    #[test]
    fn test_pack_reclaims_interior_space() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(8, 9);
        store.emplace(0, [1, 2, 3]).unwrap();
        store.emplace(1, [4, 5, 6]).unwrap();
        store.emplace(2, [7, 8, 9]).unwrap();
        store.erase(1);
        assert!(store.emplace(3, [10, 11, 12]).is_err());

        store.pack(usize::MAX);
        assert_eq!(store.interior_free_len(), 0);
        assert_eq!(store.get(0), &[1, 2, 3]);
        assert_eq!(store.get(2), &[7, 8, 9]);
        store.emplace(3, [10, 11, 12]).unwrap();
        assert_eq!(store.get(3), &[10, 11, 12]);
    }

    #[test]
    fn test_pack_zero_budget_makes_progress() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(16, 64);
        for id in 0..8u32 {
            store.emplace(id, [id as i32; 4]).unwrap();
        }
        for id in [0u32, 2, 4, 6] {
            store.erase(id);
        }
        let mut rounds = 0;
        while store.interior_free_len() != 0 {
            store.pack(0);
            rounds += 1;
            assert!(rounds < 100, "pack(0) failed to converge");
        }
        for id in [1u32, 3, 5, 7] {
            assert_eq!(store.get(id), &[id as i32; 4]);
        }
        // All reclaimed space is trailing again.
        store.emplace(8, [9; 16]).unwrap();
    }

    #[test]
    fn test_pack_merges_adjacent_holes() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(8, 12);
        for id in 0..4u32 {
            store.emplace(id, [id as i32; 3]).unwrap();
        }
        store.erase(1);
        store.erase(2);
        store.pack(usize::MAX);
        assert_eq!(store.interior_free_len(), 0);
        assert_eq!(store.get(0), &[0; 3]);
        assert_eq!(store.get(3), &[3; 3]);
        store.emplace(4, [4; 6]).unwrap();
    }

    #[test]
    fn test_reserve_data_migrates_and_compacts() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(8, 8);
        store.emplace(0, [1, 2]).unwrap();
        store.emplace(1, [3, 4]).unwrap();
        store.emplace(2, [5, 6]).unwrap();
        store.erase(1);
        store.reserve_data(100);
        assert_eq!(store.data_capacity(), 100);
        assert_eq!(store.interior_free_len(), 0);
        assert_eq!(store.get(0), &[1, 2]);
        assert_eq!(store.get(2), &[5, 6]);
        // 4 live elements, so 96 trailing slots.
        store.emplace(3, vec![0; 96]).unwrap();
        assert!(store.emplace(4, [1]).is_err());
    }

    #[test]
    fn test_reserve_ids_extends_range() {
        let mut store: PartitionStore<u32, i32> = PartitionStore::new(2, 16);
        store.emplace(1, [1]).unwrap();
        store.reserve_ids(10);
        store.emplace(9, [9]).unwrap();
        assert_eq!(store.get(1), &[1]);
        assert_eq!(store.get(9), &[9]);
    }

    #[derive(Clone)]
    struct DropTally(Rc<Cell<usize>>);

    impl Drop for DropTally {
        fn drop(&mut self) {
            self.0.set(self.0.get() + 1);
        }
    }

    #[test]
    fn test_erase_and_drop_run_destructors_once() {
        let drops = Rc::new(Cell::new(0));
        {
            let mut store: PartitionStore<u32, DropTally> = PartitionStore::new(8, 32);
            let tally = DropTally(Rc::clone(&drops));
            store
                .emplace(0, (0..3).map(|_| tally.clone()))
                .unwrap();
            store
                .emplace(1, (0..2).map(|_| tally.clone()))
                .unwrap();
            store.erase(0);
            assert_eq!(drops.get(), 3);
            store.pack(usize::MAX);
            store.reserve_data(64);
            assert_eq!(drops.get(), 3);
            drop(tally);
        }
        // The remaining partition of 2, plus the prototype clone.
        assert_eq!(drops.get(), 3 + 2 + 1);
    }

    #[test]
    fn test_emplace_unwinds_clean_on_iterator_panic() {
        let drops = Rc::new(Cell::new(0));
        let mut store: PartitionStore<u32, DropTally> = PartitionStore::new(4, 8);
        let tally = DropTally(Rc::clone(&drops));

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = store.emplace(
                0,
                (0..3).map(|i| {
                    assert!(i < 1, "element source failed");
                    tally.clone()
                }),
            );
        }));
        assert!(result.is_err());

        // The one produced element was dropped during unwinding and no
        // partition was registered for the id.
        assert_eq!(drops.get(), 1);
        assert!(!store.contains(0));
        assert_eq!(store.ids_count(), 0);
        assert_eq!(store.data_size(), 0);

        // The trailing span was not shrunk either; the full capacity is
        // still allocatable and readable.
        store.emplace(0, (0..8).map(|_| tally.clone())).unwrap();
        assert_eq!(store.get(0).len(), 8);
    }

    /// Differential check against a hash map model, interleaving emplace,
    /// erase, budgeted packs, and occasional migrations.
    #[test]
    fn test_random_churn_matches_model() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x57011D);
        let mut store: PartitionStore<u32, i64> = PartitionStore::new(64, 4096);
        let mut model: HashMap<u32, Vec<i64>> = HashMap::new();

        for step in 0..5_000 {
            let id = rng.random_range(0..64u32);
            if model.contains_key(&id) {
                store.erase(id);
                model.remove(&id);
            } else {
                let len = rng.random_range(0..16usize);
                let values: Vec<i64> = (0..len).map(|_| rng.random()).collect();
                if store.emplace(id, values.clone()).is_ok() {
                    model.insert(id, values);
                }
            }

            if step % 7 == 0 {
                store.pack(rng.random_range(0..32));
            }
            if step % 1000 == 999 {
                store.reserve_data(4096);
                assert_eq!(store.interior_free_len(), 0);
            }

            assert_eq!(store.ids_count(), model.len());
            assert_eq!(
                store.data_size(),
                model.values().map(Vec::len).sum::<usize>()
            );
        }

        store.pack(usize::MAX);
        assert_eq!(store.interior_free_len(), 0);
        for (&id, values) in &model {
            assert_eq!(store.get(id), values.as_slice(), "payload of id {}", id);
        }
    }
}

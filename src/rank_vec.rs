//! Append-only bit vector with rank/select support.
//!
//! `RankVec` keeps a [`BitVec`] together with a two-level cumulative
//! index that is maintained incrementally on every appended bit:
//!
//! - `block_t[j]` counts the 1-bits in the first `(j+1) * BLOCK_T`
//!   positions.
//! - `block_m[k]` counts the 1-bits from the enclosing top-block start up
//!   to a middle-block boundary. The last middle block of each top block
//!   is elided from the table (its count is recoverable from `block_t`),
//!   so `k = pos / BLOCK_M - pos / BLOCK_T`.
//!
//! Rank is O(1) plus a popcount over at most `BLOCK_M` bits; select is a
//! binary search over the top blocks, a short linear scan over the
//! middle blocks, and an in-word select.
//!
//! # Example
//!
//! ```
//! use dynbits::RankVec;
//!
//! let mut rv = RankVec::new();
//! for _ in 0..10 {
//!     for bit in [false, false, true, true, false, true, false, true, true, false] {
//!         rv.push(bit);
//!     }
//! }
//! assert_eq!(rv.rank_1(99), 50);
//! assert_eq!(rv.select_1(50), Some(98));
//! assert_eq!(rv.pred_1(4), Some(3));
//! assert_eq!(rv.succ_0(98), Some(99));
//! ```

#[cfg(not(test))]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

use crate::bitops::{self, NOT_FOUND};
use crate::bitvec::BitVec;
use crate::broadword::select_in_word;
use crate::popcount::popcount_word;
use crate::search::partition_idx;

/// Append-only bit vector with O(1) rank and O(log n) select.
///
/// `BLOCK_M` and `BLOCK_T` are the middle/top block sizes in bits. Both
/// must be powers of two with `64 <= BLOCK_M < BLOCK_T < 2^16`; the
/// defaults of 256 and 4096 keep the middle counters within `u16`.
///
/// Rank follows the convention used throughout the crate: `rank_1(pos)`
/// counts the 1-bits in positions `[0, pos]`, and `select_1(r)` takes a
/// 1-based rank.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RankVec<const BLOCK_M: usize = 256, const BLOCK_T: usize = 4096> {
    bits: BitVec,
    block_m: Vec<u16>,
    block_t: Vec<u64>,
}

impl RankVec {
    /// Create an empty vector with the default block sizes.
    ///
    /// Other block sizes are constructed through
    /// `RankVec::<M, T>::default()`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty vector with capacity for at least `capacity` bits.
    pub fn with_capacity(capacity: usize) -> Self {
        let mut rv = Self::new();
        rv.reserve(capacity);
        rv
    }
}

impl<const BLOCK_M: usize, const BLOCK_T: usize> RankVec<BLOCK_M, BLOCK_T> {
    /// Number of live bits.
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// Returns true if no bit has been appended.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Current capacity in bits.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.bits.capacity()
    }

    /// Total number of 1-bits.
    #[inline]
    pub fn num_ones(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.block_t[(self.len() - 1) / BLOCK_T] as usize
        }
    }

    /// Total number of 0-bits.
    #[inline]
    pub fn num_zeros(&self) -> usize {
        self.len() - self.num_ones()
    }

    /// Read the bit at `pos`.
    #[inline]
    pub fn get(&self, pos: usize) -> bool {
        debug_assert!(pos < self.len());

        self.bits.get(pos)
    }

    /// The backing words.
    #[inline]
    pub fn words(&self) -> &[u64] {
        self.bits.words()
    }

    /// Grow capacity to at least `capacity` bits, resizing the counter
    /// tables alongside the bit buffer.
    pub fn reserve(&mut self, capacity: usize) {
        const {
            assert!(BLOCK_M.is_power_of_two() && BLOCK_T.is_power_of_two());
            assert!(BLOCK_M >= 64);
            assert!(BLOCK_M < BLOCK_T);
            assert!(BLOCK_T < 1 << 16);
        }

        if capacity > self.bits.capacity() {
            self.bits.reserve(capacity);
            let cap = self.bits.capacity();
            let len_t = cap.div_ceil(BLOCK_T).max(1);
            // One entry per middle block, minus the elided last middle
            // block of each completed top block.
            let len_m = (cap.div_ceil(BLOCK_M) - cap / BLOCK_T).max(1);
            if len_t > self.block_t.len() {
                self.block_t.resize(len_t, 0);
            }
            if len_m > self.block_m.len() {
                self.block_m.resize(len_m, 0);
            }
        }
    }

    /// Shrink the buffers to fit the current size.
    pub fn shrink_to_fit(&mut self) {
        self.bits.shrink_to_fit();
        let size = self.len();
        if size > 0 {
            let len_t = size.div_ceil(BLOCK_T);
            let len_m = (size.div_ceil(BLOCK_M) - size / BLOCK_T).max(1);
            self.block_t.truncate(len_t);
            self.block_m.truncate(len_m);
        } else {
            self.block_t.clear();
            self.block_m.clear();
        }
        self.block_t.shrink_to_fit();
        self.block_m.shrink_to_fit();
    }

    /// Set the size to zero without shrinking. Counters are reseeded as
    /// bits are appended again.
    pub fn clear(&mut self) {
        self.bits.clear();
    }

    /// Append a bit, updating the cumulative counters.
    pub fn push(&mut self, bit: bool) {
        if self.bits.len() == self.bits.capacity() {
            let grow = (self.bits.capacity() * 2).max(BLOCK_M);
            self.reserve(grow);
        }

        let pos = self.bits.len();
        self.bits.resize(pos + 1);
        self.bits.set(pos, bit);

        let b = bit as u64;
        if pos == 0 {
            self.block_t[0] = b;
            self.block_m[0] = b as u16;
            return;
        }

        let idx_t = pos / BLOCK_T;
        let rem_t = pos % BLOCK_T;
        let idx_m = pos / BLOCK_M - idx_t;
        if pos % BLOCK_M == 0 {
            if rem_t == 0 {
                // New top block: seed from the previous cumulative sum.
                self.block_t[idx_t] = self.block_t[idx_t - 1];
                self.block_m[idx_m] = 0;
            } else if rem_t < BLOCK_T - BLOCK_M {
                self.block_m[idx_m] = self.block_m[idx_m - 1];
            }
        }
        self.block_t[idx_t] += b;
        if rem_t < BLOCK_T - BLOCK_M {
            self.block_m[idx_m] += b as u16;
        }
    }

    /// Number of 1-bits in positions `[0, pos]`.
    pub fn rank_1(&self, pos: usize) -> usize {
        debug_assert!(pos < self.len(), "rank position {} out of bounds", pos);

        let idx_t = pos / BLOCK_T;
        let rem_t = pos % BLOCK_T;
        let idx_m = pos / BLOCK_M - idx_t;
        let mut rank = if idx_t > 0 {
            self.block_t[idx_t - 1] as usize
        } else {
            0
        };
        if rem_t >= BLOCK_M {
            rank += self.block_m[idx_m - 1] as usize;
        }
        rank + bitops::count_ones_upto(
            self.bits.words(),
            pos / BLOCK_M * BLOCK_M / 64,
            pos % BLOCK_M,
        )
    }

    /// Number of 0-bits in positions `[0, pos]`.
    #[inline]
    pub fn rank_0(&self, pos: usize) -> usize {
        pos + 1 - self.rank_1(pos)
    }

    /// Position of the r-th 1-bit (1-based), or `None` when fewer than
    /// `r` 1-bits exist.
    pub fn select_1(&self, r: usize) -> Option<usize> {
        if r == 0 || r > self.num_ones() {
            return None;
        }
        Some(self.select_1_pos(r))
    }

    /// Position of the r-th 0-bit (1-based), or `None` when fewer than
    /// `r` 0-bits exist.
    pub fn select_0(&self, r: usize) -> Option<usize> {
        if r == 0 || r > self.num_zeros() {
            return None;
        }
        Some(self.select_0_pos(r))
    }

    pub(crate) fn select_1_pos(&self, r: usize) -> usize {
        debug_assert!(r >= 1 && r <= self.num_ones());

        let last_t = (self.len() - 1) / BLOCK_T;
        let idx_t = partition_idx(0, last_t + 1, |j| self.block_t[j] as usize >= r);
        let pos_t = idx_t * BLOCK_T;
        let mut r = r - if idx_t > 0 {
            self.block_t[idx_t - 1] as usize
        } else {
            0
        };

        let idx_m_base = pos_t / BLOCK_M - idx_t;
        let mut i = 0;
        while i < BLOCK_T / BLOCK_M - 1 && (self.block_m[idx_m_base + i] as usize) < r {
            i += 1;
        }
        if i > 0 {
            r -= self.block_m[idx_m_base + i - 1] as usize;
        }

        let words = self.bits.words();
        let mut wi = (pos_t + i * BLOCK_M) / 64;
        loop {
            let pop = popcount_word(words[wi]) as usize;
            if r <= pop {
                return wi * 64 + select_in_word(words[wi], (r - 1) as u32) as usize;
            }
            r -= pop;
            wi += 1;
        }
    }

    pub(crate) fn select_0_pos(&self, r: usize) -> usize {
        debug_assert!(r >= 1 && r <= self.num_zeros());

        let last_t = (self.len() - 1) / BLOCK_T;
        let idx_t = partition_idx(0, last_t + 1, |j| {
            (j + 1) * BLOCK_T - self.block_t[j] as usize >= r
        });
        let pos_t = idx_t * BLOCK_T;
        let mut r = r - if idx_t > 0 {
            idx_t * BLOCK_T - self.block_t[idx_t - 1] as usize
        } else {
            0
        };

        let idx_m_base = pos_t / BLOCK_M - idx_t;
        let mut i = 0;
        while i < BLOCK_T / BLOCK_M - 1
            && (i + 1) * BLOCK_M - (self.block_m[idx_m_base + i] as usize) < r
        {
            i += 1;
        }
        if i > 0 {
            r -= i * BLOCK_M - self.block_m[idx_m_base + i - 1] as usize;
        }

        let words = self.bits.words();
        let mut wi = (pos_t + i * BLOCK_M) / 64;
        loop {
            let inv = !words[wi];
            let pop = popcount_word(inv) as usize;
            if r <= pop {
                return wi * 64 + select_in_word(inv, (r - 1) as u32) as usize;
            }
            r -= pop;
            wi += 1;
        }
    }

    /// Largest position `<= val` holding a 1-bit, or `None`.
    ///
    /// A short two-word scan handles the common nearby case before
    /// falling back to rank and select.
    pub fn pred_1(&self, val: usize) -> Option<usize> {
        let size = self.len();
        if size == 0 {
            return None;
        }
        let val = val.min(size - 1);

        let ans = bitops::pred_1(self.bits.words(), val, 2.min(1 + val / 64));
        if ans != NOT_FOUND {
            return Some(ans);
        }
        let r = self.rank_1(val);
        if r > 0 {
            Some(self.select_1_pos(r))
        } else {
            None
        }
    }

    /// Smallest position `>= val` holding a 1-bit, or `None`.
    pub fn succ_1(&self, val: usize) -> Option<usize> {
        let size = self.len();
        if val >= size {
            return None;
        }

        let ans = bitops::succ_1(self.bits.words(), val, 2.min(1 + (size - 1 - val) / 64));
        if ans != NOT_FOUND && ans < size {
            return Some(ans);
        }
        let r = self.rank_1(val);
        if r < self.num_ones() {
            Some(self.select_1_pos(r + 1))
        } else {
            None
        }
    }

    /// Largest position `<= val` holding a 0-bit, or `None`.
    pub fn pred_0(&self, val: usize) -> Option<usize> {
        let size = self.len();
        if size == 0 {
            return None;
        }
        let val = val.min(size - 1);

        let ans = bitops::pred_0(self.bits.words(), val, 2.min(1 + val / 64));
        if ans != NOT_FOUND {
            return Some(ans);
        }
        let r = self.rank_0(val);
        if r > 0 {
            Some(self.select_0_pos(r))
        } else {
            None
        }
    }

    /// Smallest position `>= val` holding a 0-bit, or `None`.
    pub fn succ_0(&self, val: usize) -> Option<usize> {
        let size = self.len();
        if val >= size {
            return None;
        }

        // Bits past the size are zero-filled, so the scan result must be
        // checked against the live prefix.
        let ans = bitops::succ_0(self.bits.words(), val, 2.min(1 + (size - 1 - val) / 64));
        if ans != NOT_FOUND && ans < size {
            return Some(ans);
        }
        let r = self.rank_0(val);
        if r < self.num_zeros() {
            Some(self.select_0_pos(r + 1))
        } else {
            None
        }
    }

    /// Truncate to `new_len` bits, recomputing the counters that cover
    /// the new tail. Queries on positions below `new_len` are unaffected.
    pub fn shorten(&mut self, new_len: usize) {
        let old = self.len();
        assert!(new_len <= old, "shorten beyond the current size");
        if new_len == old {
            return;
        }

        // Zero the dropped bits: the complement-side queries rely on dead
        // bits reading as zero.
        {
            let words = self.bits.words_mut();
            let first = new_len / 64;
            let last = (old - 1) / 64;
            let off = (new_len % 64) as u32;
            let mut w = first;
            if off > 0 {
                words[first] &= bitops::lo_mask(off);
                w += 1;
            }
            while w <= last {
                words[w] = 0;
                w += 1;
            }
        }
        self.bits.resize(new_len);
        if new_len == 0 {
            return;
        }

        let last = new_len - 1;
        let idx_t = last / BLOCK_T;
        let top_start = idx_t * BLOCK_T;
        let prefix = if idx_t > 0 {
            self.block_t[idx_t - 1]
        } else {
            0
        };
        self.block_t[idx_t] = prefix
            + bitops::count_ones_upto(self.bits.words(), top_start / 64, last - top_start) as u64;

        let idx_m_base = top_start / BLOCK_M - idx_t;
        let last_m = (last - top_start) / BLOCK_M;
        let stored = last_m.min(BLOCK_T / BLOCK_M - 2);
        for i in 0..=stored {
            let boundary = top_start + (i + 1) * BLOCK_M - 1;
            let upto = boundary.min(last);
            self.block_m[idx_m_base + i] =
                bitops::count_ones_upto(self.bits.words(), top_start / 64, upto - top_start) as u16;
        }
    }

    /// Owned bytes, including the container header.
    pub fn mem_bytes(&self) -> usize {
        core::mem::size_of::<Self>() - core::mem::size_of::<BitVec>()
            + self.bits.mem_bytes()
            + self.block_m.capacity() * 2
            + self.block_t.capacity() * 8
    }

    /// Write a diagnostic dump to `out`. With `verbose`, the counter
    /// tables in use are listed.
    pub fn dump<W: fmt::Write>(&self, out: &mut W, verbose: bool) -> fmt::Result {
        writeln!(
            out,
            "RankVec: len = {}, capacity = {}, ones = {}",
            self.len(),
            self.capacity(),
            self.num_ones()
        )?;
        if verbose && !self.is_empty() {
            let len_t = self.len().div_ceil(BLOCK_T);
            let len_m = self.len().div_ceil(BLOCK_M) - self.len() / BLOCK_T;
            writeln!(out, "  block_t: {:?}", &self.block_t[..len_t])?;
            writeln!(out, "  block_m: {:?}", &self.block_m[..len_m.max(1)])?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference model: a plain Vec<bool> answering every query by scan.
    struct Naive(Vec<bool>);

    impl Naive {
        fn rank_1(&self, pos: usize) -> usize {
            self.0[..=pos].iter().filter(|&&b| b).count()
        }
        fn select_1(&self, r: usize) -> Option<usize> {
            let mut seen = 0;
            for (i, &b) in self.0.iter().enumerate() {
                if b {
                    seen += 1;
                    if seen == r {
                        return Some(i);
                    }
                }
            }
            None
        }
        fn select_0(&self, r: usize) -> Option<usize> {
            let mut seen = 0;
            for (i, &b) in self.0.iter().enumerate() {
                if !b {
                    seen += 1;
                    if seen == r {
                        return Some(i);
                    }
                }
            }
            None
        }
        fn pred(&self, val: usize, bit: bool) -> Option<usize> {
            let top = val.min(self.0.len() - 1);
            (0..=top).rev().find(|&i| self.0[i] == bit)
        }
        fn succ(&self, val: usize, bit: bool) -> Option<usize> {
            (val..self.0.len()).find(|&i| self.0[i] == bit)
        }
    }

    fn pseudo_bits(n: usize, seed: u64) -> Vec<bool> {
        let mut state = seed;
        (0..n)
            .map(|_| {
                state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
                (state >> 33) & 1 == 1
            })
            .collect()
    }

    /// Small block sizes so the tests cross several top blocks quickly.
    type SmallRankVec = RankVec<64, 256>;

    #[test]
    fn test_empty() {
        let rv = RankVec::new();
        assert_eq!(rv.len(), 0);
        assert_eq!(rv.num_ones(), 0);
        assert_eq!(rv.select_1(1), None);
        assert_eq!(rv.pred_1(10), None);
        assert_eq!(rv.succ_1(0), None);
    }

    #[test]
    fn test_repeating_pattern() {
        let mut rv = RankVec::new();
        for _ in 0..10 {
            for bit in [false, false, true, true, false, true, false, true, true, false] {
                rv.push(bit);
            }
        }
        assert_eq!(rv.len(), 100);
        assert_eq!(rv.rank_1(99), 50);
        assert_eq!(rv.select_1(50), Some(98));
        assert_eq!(rv.pred_1(4), Some(3));
        assert_eq!(rv.succ_0(98), Some(99));
    }

    #[test]
    fn test_rank_sums() {
        let bits = pseudo_bits(3000, 7);
        let mut rv = SmallRankVec::default();
        for &b in &bits {
            rv.push(b);
        }
        for pos in 0..bits.len() {
            assert_eq!(rv.rank_1(pos) + rv.rank_0(pos), pos + 1, "pos={}", pos);
        }
    }

    #[test]
    fn test_against_naive() {
        // Enough bits to cover several top blocks at the small sizes.
        let bits = pseudo_bits(4 * 256 + 77, 42);
        let naive = Naive(bits.clone());
        let mut rv = SmallRankVec::default();
        for &b in &bits {
            rv.push(b);
        }

        for pos in 0..bits.len() {
            assert_eq!(rv.rank_1(pos), naive.rank_1(pos), "rank_1({})", pos);
        }
        for r in 1..=rv.num_ones() {
            assert_eq!(rv.select_1(r), naive.select_1(r), "select_1({})", r);
        }
        for r in 1..=rv.num_zeros() {
            assert_eq!(rv.select_0(r), naive.select_0(r), "select_0({})", r);
        }
        for val in (0..bits.len() * 2).step_by(13) {
            assert_eq!(rv.pred_1(val), naive.pred(val, true), "pred_1({})", val);
            assert_eq!(rv.pred_0(val), naive.pred(val, false), "pred_0({})", val);
            if val < bits.len() {
                assert_eq!(rv.succ_1(val), naive.succ(val, true), "succ_1({})", val);
                assert_eq!(rv.succ_0(val), naive.succ(val, false), "succ_0({})", val);
            } else {
                assert_eq!(rv.succ_1(val), None);
                assert_eq!(rv.succ_0(val), None);
            }
        }
    }

    #[test]
    fn test_select_rank_inverse() {
        let bits = pseudo_bits(2500, 99);
        let mut rv = SmallRankVec::default();
        for &b in &bits {
            rv.push(b);
        }
        for r in 1..=rv.num_ones() {
            let pos = rv.select_1(r).unwrap();
            assert!(rv.get(pos));
            assert_eq!(rv.rank_1(pos), r);
        }
        for r in 1..=rv.num_zeros() {
            let pos = rv.select_0(r).unwrap();
            assert!(!rv.get(pos));
            assert_eq!(rv.rank_0(pos), r);
        }
    }

    #[test]
    fn test_all_ones_and_all_zeros() {
        let mut ones = SmallRankVec::default();
        let mut zeros = SmallRankVec::default();
        for _ in 0..600 {
            ones.push(true);
            zeros.push(false);
        }
        assert_eq!(ones.num_ones(), 600);
        assert_eq!(ones.select_1(600), Some(599));
        assert_eq!(ones.select_0(1), None);
        assert_eq!(zeros.num_zeros(), 600);
        assert_eq!(zeros.select_0(600), Some(599));
        assert_eq!(zeros.select_1(1), None);
        assert_eq!(zeros.pred_1(599), None);
        assert_eq!(ones.pred_0(599), None);
    }

    #[test]
    fn test_shorten() {
        let bits = pseudo_bits(1500, 3);
        let mut rv = SmallRankVec::default();
        for &b in &bits {
            rv.push(b);
        }
        let full = rv.clone();
        let n = 700;
        rv.shorten(n);
        assert_eq!(rv.len(), n);
        for pos in 0..n {
            assert_eq!(rv.rank_1(pos), full.rank_1(pos), "rank after shorten, pos={}", pos);
        }
        for r in 1..=rv.num_ones() {
            assert_eq!(rv.select_1(r), full.select_1(r));
        }
        for r in 1..=rv.num_zeros() {
            assert_eq!(rv.select_0(r), full.select_0(r));
        }
    }

    #[test]
    fn test_shorten_then_append() {
        let bits = pseudo_bits(1000, 11);
        let mut rv = SmallRankVec::default();
        for &b in &bits[..800] {
            rv.push(b);
        }
        rv.shorten(500);
        for &b in &bits[500..] {
            rv.push(b);
        }
        // The result must match a vector built from the final content.
        let mut fresh = SmallRankVec::default();
        for &b in &bits {
            fresh.push(b);
        }
        assert_eq!(rv.len(), fresh.len());
        for pos in 0..rv.len() {
            assert_eq!(rv.rank_1(pos), fresh.rank_1(pos), "pos={}", pos);
        }
        for r in 1..=rv.num_ones() {
            assert_eq!(rv.select_1(r), fresh.select_1(r));
        }
    }

    #[test]
    fn test_shorten_to_zero() {
        let mut rv = SmallRankVec::default();
        for b in pseudo_bits(300, 5) {
            rv.push(b);
        }
        rv.shorten(0);
        assert!(rv.is_empty());
        rv.push(true);
        assert_eq!(rv.rank_1(0), 1);
        assert_eq!(rv.select_1(1), Some(0));
    }

    #[test]
    fn test_clone_and_take() {
        let mut rv = SmallRankVec::default();
        for b in pseudo_bits(400, 21) {
            rv.push(b);
        }
        let copy = rv.clone();
        assert_eq!(copy.len(), rv.len());
        assert_eq!(copy.rank_1(399), rv.rank_1(399));

        let moved = core::mem::take(&mut rv);
        assert_eq!(moved.len(), 400);
        assert_eq!(rv.len(), 0);
        assert_eq!(rv.capacity(), 0);
    }

    #[test]
    fn test_default_blocks() {
        // Cross a default top-block boundary.
        let mut rv = RankVec::new();
        for i in 0..10_000usize {
            rv.push(i % 3 == 0);
        }
        assert_eq!(rv.num_ones(), 3334);
        assert_eq!(rv.rank_1(9999), 3334);
        assert_eq!(rv.select_1(3334), Some(9999));
        assert_eq!(rv.select_1(3335), None);
    }

    #[test]
    fn test_dump() {
        let mut rv = RankVec::new();
        rv.push(true);
        rv.push(false);
        let mut out = String::new();
        rv.dump(&mut out, true).unwrap();
        assert!(out.contains("ones = 1"));
    }
}

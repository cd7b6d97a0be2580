//! Elias-Fano encoding for monotone integer sequences.
//!
//! `EliasFano` stores a strictly increasing sequence of unsigned
//! integers. Each value is split into high and low bits around a
//! configurable split point `lo_width`:
//!
//! - **Low bits**: packed densely into an [`IntVec`] at `lo_width` bits
//!   per element.
//! - **High bits**: gap-encoded into a [`RankVec`] — for each element,
//!   the increase of its high part over the previous element is appended
//!   as that many 0-bits followed by a single 1-bit.
//!
//! The sequence doubles as a dictionary over the stored values: rank,
//! select, predecessor and successor are supported on both the members
//! (`*_1`) and the vacant positions (`*_0`). The split point can be
//! rebalanced in place with [`convert`](EliasFano::convert); for a known
//! maximum and length, [`optimal_lo_width`](EliasFano::optimal_lo_width)
//! minimizes the total footprint.
//!
//! # Example
//!
//! ```
//! use dynbits::EliasFano;
//!
//! let mut ef = EliasFano::new(4);
//! for v in [3u64, 7, 23, 100, 1000] {
//!     ef.append(v);
//! }
//! assert_eq!(ef.select_1(3), Some(23));
//! assert_eq!(ef.rank_1(22), 2);
//! assert_eq!(ef.rank_1(23), 3);
//! assert_eq!(ef.pred_1(22), Some(7));
//! assert_eq!(ef.succ_1(24), Some(100));
//! ```

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use core::fmt;

use crate::bitops::lo_mask;
use crate::broadword::bit_size;
use crate::int_vec::IntVec;
use crate::rank_vec::RankVec;
use crate::search::partition_idx;
use crate::MAX_CAPACITY;

/// Default reserve margin applied when an append outgrows the high-bits
/// buffer.
pub const DEFAULT_GROWTH_FACTOR: f64 = 1.5;

/// Compose a value from its high and low parts.
#[inline]
fn compose(hi: u64, lo: u64, w: u32) -> u64 {
    if w == 64 {
        lo
    } else {
        (hi << w) | lo
    }
}

/// High part of a value for a given low width.
#[inline]
fn hi_part(v: u64, w: u32) -> u64 {
    if w == 64 {
        0
    } else {
        v >> w
    }
}

/// A strictly increasing sequence of `u64` stored in Elias-Fano form.
///
/// Appends must be strictly increasing. Rank and select follow the
/// 1-based convention of [`RankVec`]: `rank_1(pos)` counts members
/// `<= pos` and `select_1(r)` returns the r-th smallest member.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct EliasFano {
    /// Unary gap encoding of the high parts.
    high: RankVec,
    /// Packed low parts.
    low: IntVec,
}

impl EliasFano {
    /// Create an empty sequence with the given low-bit width.
    ///
    /// # Panics
    ///
    /// Panics if `lo_width` is not in `[1, 64]`.
    pub fn new(lo_width: u32) -> Self {
        Self::with_capacity(lo_width, 0)
    }

    /// Create an empty sequence with capacity for `capacity` elements.
    pub fn with_capacity(lo_width: u32, capacity: usize) -> Self {
        assert!(capacity as u64 <= MAX_CAPACITY);

        Self {
            high: RankVec::with_capacity(capacity),
            low: IntVec::with_capacity(lo_width, capacity),
        }
    }

    /// The low-bit width that minimizes the footprint for a sequence of
    /// `len` values bounded by `max`.
    pub fn optimal_lo_width(max: u64, len: usize) -> u32 {
        assert!(len > 0);

        bit_size((max as f64 / (len as f64 * 1.44)) as u64)
    }

    /// Current low-bit width.
    #[inline]
    pub fn lo_width(&self) -> u32 {
        self.low.width()
    }

    /// Number of stored values.
    #[inline]
    pub fn len(&self) -> usize {
        self.low.len()
    }

    /// Returns true if no value is stored.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.low.is_empty()
    }

    /// Element capacity of the low-bits buffer.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.low.capacity()
    }

    /// Number of members; identical to [`len`](Self::len).
    #[inline]
    pub fn num_ones(&self) -> usize {
        self.len()
    }

    /// Number of vacant positions in `[0, max]`, or 0 when empty.
    pub fn num_zeros(&self) -> u64 {
        if self.is_empty() {
            0
        } else {
            self.max_val() + 1 - self.len() as u64
        }
    }

    /// The largest stored value, or `None` when empty.
    pub fn max_value(&self) -> Option<u64> {
        if self.is_empty() {
            None
        } else {
            Some(self.max_val())
        }
    }

    fn max_val(&self) -> u64 {
        debug_assert!(!self.is_empty());

        compose(
            self.high.num_zeros() as u64,
            self.low.read(self.len() - 1),
            self.lo_width(),
        )
    }

    /// Append `v`, which must exceed every stored value.
    pub fn append(&mut self, v: u64) {
        self.append_with_margin(v, DEFAULT_GROWTH_FACTOR);
    }

    /// Append with an explicit reserve margin for the high-bits buffer.
    pub fn append_with_margin(&mut self, v: u64, margin: f64) {
        assert!(
            self.is_empty() || v > self.max_val(),
            "append must be strictly increasing"
        );
        debug_assert!(margin >= 1.0);

        let w = self.lo_width();
        let pos = self.low.len();
        self.low.resize(pos + 1);
        self.low.write(pos, v & lo_mask(w));

        let gap = hi_part(v, w) - self.high.num_zeros() as u64;
        let new_len = self.high.len() + gap as usize + 1;
        if new_len > self.high.capacity() {
            self.high.reserve((new_len as f64 * margin) as usize);
        }
        for _ in 0..gap {
            self.high.push(false);
        }
        self.high.push(true);
    }

    /// Number of members `<= pos`.
    pub fn rank_1(&self, pos: u64) -> usize {
        let size = self.len();
        if size == 0 {
            return 0;
        }

        let w = self.lo_width();
        let hi = hi_part(pos, w);
        let hi_max = self.high.num_zeros() as u64;
        if hi > hi_max {
            return size;
        }

        // Locate the run of members sharing the high part `hi`.
        let rv_pos = if hi > 0 {
            self.high.select_0_pos(hi as usize) + 1
        } else {
            0
        };
        let rank_lb = self.high.rank_1(rv_pos);
        if !self.high.get(rv_pos) {
            return rank_lb;
        }
        let rank_ub = if hi < hi_max {
            rank_lb + self.high.succ_0(rv_pos).expect("inner runs end in a zero") - rv_pos
        } else {
            size + 1
        };

        let key = pos & lo_mask(w);
        if key < self.low.read(rank_ub - 2) {
            partition_idx(rank_lb - 1, rank_ub - 1, |i| key < self.low.read(i))
        } else {
            rank_ub - 1
        }
    }

    /// Number of vacant positions `<= pos`.
    #[inline]
    pub fn rank_0(&self, pos: u64) -> u64 {
        pos + 1 - self.rank_1(pos) as u64
    }

    /// The r-th smallest member (1-based), or `None`.
    pub fn select_1(&self, r: usize) -> Option<u64> {
        if r == 0 || r > self.len() {
            return None;
        }
        Some(self.select_1_val(r))
    }

    fn select_1_val(&self, r: usize) -> u64 {
        let hi = self.high.rank_0(self.high.select_1_pos(r)) as u64;
        compose(hi, self.low.read(r - 1), self.lo_width())
    }

    /// The r-th smallest vacant position (1-based), or `None` when fewer
    /// than `r` vacancies exist below the maximum.
    pub fn select_0(&self, r: u64) -> Option<u64> {
        if r == 0 || r > self.num_zeros() {
            return None;
        }
        Some(self.select_0_val(r))
    }

    fn select_0_val(&self, r: u64) -> u64 {
        debug_assert!(r >= 1);

        // Vacancies below the first member need no search.
        if r < self.select_1_val(1) {
            return r - 1;
        }
        let idx = partition_idx(0, self.len(), |i| {
            r <= self.select_1_val(i + 1) - i as u64
        });
        r + idx as u64 - 1
    }

    /// Largest member `<= val`, or `None`.
    pub fn pred_1(&self, val: u64) -> Option<u64> {
        if self.is_empty() {
            return None;
        }
        if val >= self.max_val() {
            return Some(self.max_val());
        }
        let r = self.rank_1(val);
        if r > 0 {
            Some(self.select_1_val(r))
        } else {
            None
        }
    }

    /// Smallest member `>= val`, or `None`.
    pub fn succ_1(&self, val: u64) -> Option<u64> {
        if self.is_empty() || val > self.max_val() {
            return None;
        }
        let r = self.rank_1(val);
        if r == 0 {
            return Some(self.select_1_val(1));
        }
        let s = self.select_1_val(r);
        if s < val {
            Some(self.select_1_val(r + 1))
        } else {
            Some(s)
        }
    }

    /// Largest vacant position `<= val`, or `None` when `[0, val]` is
    /// fully occupied.
    pub fn pred_0(&self, val: u64) -> Option<u64> {
        if self.is_empty() || val > self.max_val() {
            return Some(val);
        }
        let r = self.rank_0(val);
        if r > 0 {
            Some(self.select_0_val(r))
        } else {
            None
        }
    }

    /// Smallest vacant position `>= val`. Vacancies extend past the
    /// maximum, so the answer always exists.
    pub fn succ_0(&self, val: u64) -> Option<u64> {
        if self.is_empty() || val > self.max_val() {
            return Some(val);
        }
        let r1 = self.rank_1(val);
        let member = r1 > 0 && self.select_1_val(r1) == val;
        if !member {
            return Some(val);
        }
        let r0 = self.rank_0(val);
        if r0 < self.num_zeros() {
            Some(self.select_0_val(r0 + 1))
        } else {
            Some(self.max_val() + 1)
        }
    }

    /// Rebalance the high/low split to `new_lo_width` with default
    /// reallocation behavior.
    pub fn convert(&mut self, new_lo_width: u32) {
        self.convert_with(new_lo_width, 0, 1.0, false);
    }

    /// Rebalance the high/low split.
    ///
    /// Rebuilds both parts so that every public query answers exactly as
    /// before. `min_capacity` and `do_shrink` control the low-bits
    /// reallocation as in [`IntVec::convert`]; `margin` reserves slack in
    /// the rebuilt high-bits buffer.
    pub fn convert_with(
        &mut self,
        new_lo_width: u32,
        min_capacity: usize,
        margin: f64,
        do_shrink: bool,
    ) {
        assert!((1..=64).contains(&new_lo_width));
        assert!(margin >= 1.0);
        assert!(min_capacity as u64 <= MAX_CAPACITY);

        let old_w = self.lo_width();
        if new_lo_width == old_w {
            if do_shrink {
                self.low.convert(new_lo_width, min_capacity, true);
                let with_margin = (self.high.len() as f64 * margin) as usize;
                if with_margin < self.high.capacity() {
                    self.high.shrink_to_fit();
                    self.high.reserve(with_margin);
                }
            }
            return;
        }

        let size = self.len();
        if size == 0 {
            self.low.convert(new_lo_width, min_capacity, do_shrink);
            return;
        }
        let min_cap = min_capacity.max(size);

        if new_lo_width > old_w {
            self.shrink_to_fit();
            let diff = new_lo_width - old_w;

            // Rebuild the low bits from the recovered values.
            let mut low_new = IntVec::with_capacity(new_lo_width, min_cap);
            low_new.resize(size);
            let mut rv_pos = 0usize;
            for i in 0..size {
                rv_pos = self.high.succ_1(rv_pos).expect("one set bit per element");
                let val = compose((rv_pos - i) as u64, self.low.read(i), old_w);
                low_new.write(i, val & lo_mask(new_lo_width));
                rv_pos += 1;
            }

            // Rebuild the high bits at the narrower high width.
            let new_high_len = size + (self.high.num_zeros() >> diff);
            let mut high_new = RankVec::with_capacity((new_high_len as f64 * margin) as usize);
            let mut rv_pos = 0usize;
            let mut cur = 0u64;
            for i in 0..size {
                rv_pos = self.high.succ_1(rv_pos).expect("one set bit per element");
                let next = ((rv_pos - i) as u64) >> diff;
                while cur < next {
                    high_new.push(false);
                    cur += 1;
                }
                high_new.push(true);
                rv_pos += 1;
            }

            self.low = low_new;
            self.high = high_new;
        } else {
            let diff = old_w - new_lo_width;

            // The high side grows; rebuild it first while the old low
            // values are still readable at the old width.
            let new_high_len = size
                + ((self.high.num_zeros() as u64) << diff) as usize
                + (self.low.read(size - 1) >> new_lo_width) as usize;
            let mut high_new = RankVec::with_capacity((new_high_len as f64 * margin) as usize);
            let mut rv_pos = 0usize;
            let mut cur = 0u64;
            for i in 0..size {
                rv_pos = self.high.succ_1(rv_pos).expect("one set bit per element");
                let next =
                    (((rv_pos - i) as u64) << diff) + (self.low.read(i) >> new_lo_width);
                while cur < next {
                    high_new.push(false);
                    cur += 1;
                }
                high_new.push(true);
                rv_pos += 1;
            }
            self.high = high_new;
            self.low.convert(new_lo_width, min_capacity, do_shrink);
        }
    }

    /// Reallocate the low-bits buffer to `max(len, capacity)` elements.
    pub fn change_capacity(&mut self, capacity: usize) {
        self.low.change_capacity(capacity);
    }

    /// Shrink both buffers to fit the current content.
    pub fn shrink_to_fit(&mut self) {
        self.low.shrink_to_fit();
        self.high.shrink_to_fit();
    }

    /// Set the size to zero without shrinking.
    pub fn clear(&mut self) {
        self.low.clear();
        self.high.clear();
    }

    /// Iterator over the stored values in increasing order.
    pub fn iter(&self) -> EliasFanoIter<'_> {
        EliasFanoIter {
            ef: self,
            idx: 0,
            rv_pos: 0,
        }
    }

    /// Owned bytes, including the container header.
    pub fn mem_bytes(&self) -> usize {
        core::mem::size_of::<Self>() + self.low.mem_bytes() + self.high.mem_bytes()
            - core::mem::size_of::<IntVec>()
            - core::mem::size_of::<RankVec>()
    }

    /// Write a diagnostic dump to `out`. With `verbose`, the stored
    /// values are listed.
    pub fn dump<W: fmt::Write>(&self, out: &mut W, verbose: bool) -> fmt::Result {
        write!(
            out,
            "EliasFano: len = {}, capacity = {}, lo_width = {}",
            self.len(),
            self.capacity(),
            self.lo_width()
        )?;
        if let Some(max) = self.max_value() {
            write!(out, ", max = {}", max)?;
        }
        writeln!(out)?;
        if verbose {
            for (i, v) in self.iter().enumerate() {
                if i > 0 {
                    write!(out, ", ")?;
                }
                write!(out, "{}", v)?;
            }
            writeln!(out)?;
        }
        Ok(())
    }
}

/// Iterator over the values of an [`EliasFano`] sequence.
#[derive(Clone, Debug)]
pub struct EliasFanoIter<'a> {
    ef: &'a EliasFano,
    idx: usize,
    rv_pos: usize,
}

impl<'a> Iterator for EliasFanoIter<'a> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.idx >= self.ef.len() {
            return None;
        }
        let pos = self.ef.high.succ_1(self.rv_pos)?;
        let v = compose(
            (pos - self.idx) as u64,
            self.ef.low.read(self.idx),
            self.ef.lo_width(),
        );
        self.idx += 1;
        self.rv_pos = pos + 1;
        Some(v)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.ef.len() - self.idx;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for EliasFanoIter<'_> {}

impl<'a> IntoIterator for &'a EliasFano {
    type Item = u64;
    type IntoIter = EliasFanoIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

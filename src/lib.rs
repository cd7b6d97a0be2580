//! # dynbits
//!
//! Growable succinct bit containers for Rust.
//!
//! This crate provides bit-level containers that stay compact while
//! remaining mutable at the end: bits, packed fixed-width integers, a
//! rank/select dictionary that is maintained incrementally as bits are
//! appended, Elias-Fano monotone sequences whose high/low split can be
//! rebalanced in place, and a 4-bit-stepped code for small blocks of
//! variable-width uints.
//!
//! ## Containers
//!
//! - [`BitVec`] - growable bit buffer with fixed-width bit I/O and
//!   overlap-safe region moves
//! - [`IntVec`] - packed vector of `w`-bit integers, `w` changeable in
//!   place
//! - [`RankVec`] - append-only bit vector with O(1) rank, O(log n)
//!   select, and predecessor/successor on both bit polarities
//! - [`EliasFano`] - strictly increasing `u64` sequence with
//!   rank/select/pred/succ over members and vacancies
//! - [`StepCode`] - small block of uints stored at widths stepped by 4
//!   bits, with a code-table/payload splice
//!
//! The containers layer strictly: [`bitops`] manipulates raw word
//! arrays, [`BitVec`] owns one, [`IntVec`] and [`RankVec`] build on
//! [`BitVec`], and [`EliasFano`] composes the previous two.
//!
//! ## Quick Start
//!
//! ```
//! use dynbits::{EliasFano, RankVec};
//!
//! // Rank/select over an appended bit stream.
//! let mut rv = RankVec::new();
//! for i in 0..100usize {
//!     rv.push(i % 3 == 0);
//! }
//! assert_eq!(rv.rank_1(99), 34);
//! assert_eq!(rv.select_1(34), Some(99));
//!
//! // A monotone sequence as a compressed dictionary.
//! let mut ef = EliasFano::new(4);
//! for v in [3u64, 7, 23, 100, 1000] {
//!     ef.append(v);
//! }
//! assert_eq!(ef.select_1(3), Some(23));
//! assert_eq!(ef.pred_1(22), Some(7));
//! ```
//!
//! ## Features
//!
//! - `std` (default) - link against `std`; disable for `no_std` + `alloc`
//! - `serde` - serialization support for the container types
//! - `portable-popcount` - portable bitwise popcount instead of
//!   `count_ones()`, for benchmarking

// Use no_std unless std feature is enabled or we're in test mode
#![cfg_attr(not(any(test, feature = "std")), no_std)]

// When using no_std, we need to explicitly link the alloc crate
#[cfg(not(any(test, feature = "std")))]
extern crate alloc;

// When using std, re-export alloc types from std for compatibility
#[cfg(any(test, feature = "std"))]
extern crate std as alloc;

pub mod bitops;
mod bitvec;
mod broadword;
mod elias_fano;
mod int_vec;
mod popcount;
mod rank_vec;
mod search;
mod step_code;
mod table;

pub use bitvec::BitVec;
pub use broadword::{bit_size, select_in_word, select_in_word_bytewise};
pub use elias_fano::{EliasFano, EliasFanoIter, DEFAULT_GROWTH_FACTOR};
pub use int_vec::{IntVec, IntVecCursor, IntVecCursorMut, IntVecIter};
pub use popcount::{popcount_word, popcount_words};
pub use rank_vec::RankVec;
pub use step_code::{stepped_width, sum_w_codes, w_code, StepCode};

/// Maximum capacity, in elements or bits, of any container that attaches
/// a per-element width to bit-positions: `2^58 - 1`, so that
/// `capacity * w` cannot overflow 63 bits for widths up to 64.
pub const MAX_CAPACITY: u64 = (1u64 << 58) - 1;

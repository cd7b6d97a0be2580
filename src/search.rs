//! Binary search over an abstract predicate.

/// Smallest index in `[lb, ub)` for which `pred` is true.
///
/// `pred` must partition `[lb, ub)` into a (possibly empty) all-false
/// prefix followed by an all-true suffix, and the true suffix must be
/// non-empty.
#[inline]
pub(crate) fn partition_idx<P: Fn(usize) -> bool>(mut lb: usize, mut ub: usize, pred: P) -> usize {
    debug_assert!(lb < ub);

    while lb + 1 < ub {
        // invariant: the answer is in [lb, ub)
        let mid = (lb + ub) / 2;
        if !pred(mid - 1) {
            lb = mid;
        } else {
            ub = mid;
        }
    }
    lb
}

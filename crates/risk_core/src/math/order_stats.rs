//! Order statistics over samples of `f64`.
//!
//! Percentiles use the standard linear interpolation between closest ranks:
//! for probability `p` over `n` sorted samples the fractional rank is
//! `p * (n - 1)`.

/// Sorts samples ascending using IEEE total ordering.
#[inline]
pub fn sort_ascending(values: &mut [f64]) {
    values.sort_unstable_by(f64::total_cmp);
}

/// Percentile of an ascending-sorted sample with linear interpolation.
///
/// `p` is a probability in `[0, 1]` and is clamped into that range.
/// Returns `None` for an empty sample.
///
/// # Examples
///
/// ```rust
/// use risk_core::math::percentile_sorted;
///
/// let sorted = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert_eq!(percentile_sorted(&sorted, 0.5), Some(3.0));
/// assert_eq!(percentile_sorted(&sorted, 0.125), Some(1.5));
/// assert_eq!(percentile_sorted(&[], 0.5), None);
/// ```
pub fn percentile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let rank = p.clamp(0.0, 1.0) * (n - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return Some(sorted[lo]);
    }
    let w = rank - lo as f64;
    Some(sorted[lo] + (sorted[hi] - sorted[lo]) * w)
}

/// Arithmetic mean; `None` for an empty sample.
#[inline]
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

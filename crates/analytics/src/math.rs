//! Guarded arithmetic: every division here yields 0 instead of NaN/Infinity.

/// `numerator / denominator`, or 0 when the denominator is zero or the result
/// is not finite.
pub fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        return 0.0;
    }
    let r = numerator / denominator;
    if r.is_finite() { r } else { 0.0 }
}

/// `numerator / denominator * 100`, guarded like [`ratio`].
pub fn percentage(numerator: f64, denominator: f64) -> f64 {
    let p = ratio(numerator, denominator) * 100.0;
    if p.is_finite() { p } else { 0.0 }
}

/// Percentage change from `prior` to `current`; 0 when there is no prior value.
pub fn growth_percentage(current: u64, prior: u64) -> f64 {
    if prior == 0 {
        return 0.0;
    }
    percentage(current as f64 - prior as f64, prior as f64)
}

//! Element-wise helpers over columns with missing values.
//!
//! Every column in this crate is a `&[Option<f64>]` where `None` marks a
//! missing observation. Arithmetic propagates missingness: if any operand is
//! missing the result is missing. A NaN produced by arithmetic (e.g. `0/0`) is
//! also stored as missing, while ±infinity is kept as a value.

/// Map NaN to missing.
pub fn missing_if_nan(v: f64) -> Option<f64> {
    if v.is_nan() { None } else { Some(v) }
}

/// Combine two equally long columns element-wise.
pub fn zip_with(a: &[Option<f64>], b: &[Option<f64>], f: impl Fn(f64, f64) -> f64) -> Vec<Option<f64>> {
    a.iter()
        .zip(b)
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => missing_if_nan(f(*x, *y)),
            _ => None,
        })
        .collect()
}

/// `a - b`.
pub fn difference(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    zip_with(a, b, |x, y| x - y)
}

/// `a / b`.
pub fn ratio(a: &[Option<f64>], b: &[Option<f64>]) -> Vec<Option<f64>> {
    zip_with(a, b, |x, y| x / y)
}

/// Move values `periods` positions forward; the first `periods` slots become missing.
pub fn shift(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let n = values.len();
    let lead = periods.min(n);
    let mut out = vec![None; lead];
    out.extend_from_slice(&values[..n - lead]);
    out
}

/// Percent change over `periods` positions, scaled by 100.
///
/// `(x_t / x_{t-periods} - 1) * 100`; the first `periods` entries are missing.
pub fn percent_change(values: &[Option<f64>], periods: usize) -> Vec<Option<f64>> {
    let lagged = shift(values, periods);
    zip_with(values, &lagged, |x, prev| (x / prev - 1.0) * 100.0)
}

/// Arithmetic mean of the present values; `None` if nothing is present.
pub fn mean_present<'a>(values: impl IntoIterator<Item = &'a Option<f64>>) -> Option<f64> {
    let mut sum = 0.0;
    let mut count = 0usize;
    for v in values.into_iter().flatten() {
        sum += v;
        count += 1;
    }
    if count == 0 {
        None
    } else {
        missing_if_nan(sum / count as f64)
    }
}

//! Least squares solver for the autoregressive mean equation.
//!
//! The ARX mean is linear in its coefficients:
//!
//! ```text
//! minimize Σ (y_t - x_t^T β)^2,   x_t = [1, y_{t-l1}, y_{t-l2}, ...]
//! ```
//!
//! The design matrix is tall (months × a handful of lags), so we solve it via
//! SVD, which copes with near-collinear lag columns (e.g. very persistent
//! index levels). Nalgebra's `QR::solve` is only for square systems.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    // Try progressively looser tolerances if strict solve fails.
    for &tol in &[1e-10, 1e-8, 1e-6] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}

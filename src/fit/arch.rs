//! Autoregressive mean with ARCH errors (ARX-ARCH) volatility filter.
//!
//! Model:
//!
//! ```text
//! y_t   = c + Σ_l φ_l y_{t-l} + e_t
//! σ²_t  = ω + Σ_{i=1..p} α_i e²_{t-i}
//! e_t   ~ N(0, σ²_t)
//! ```
//!
//! Estimation is two-step: the mean coefficients by least squares
//! (`math::ols`), then (ω, α) by Gaussian maximum likelihood on the residuals
//! with a Nelder–Mead simplex (`math::simplex`). The optimizer works on an
//! unconstrained reparameterization that guarantees `ω > 0`, `α_i > 0` and
//! `Σ α_i < 1`.
//!
//! Pre-sample squared residuals (`e²_{t-i}` with `t - i < 0`) are replaced by
//! an exponentially weighted backcast of the first residuals.
//!
//! The first `max(ar_lags)` observations are consumed by the mean equation
//! (burn-in), so residuals and conditional volatility have
//! `y.len() - burn_in` entries.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};
use crate::math::ols::solve_least_squares;
use crate::math::simplex::{SimplexOptions, minimize};

const BACKCAST_DECAY: f64 = 0.94;
const BACKCAST_WINDOW: usize = 75;
/// Share of the residual variance attributed to the ARCH terms at the start.
const START_PERSISTENCE: f64 = 0.5;
const LN_2PI: f64 = 1.837_877_066_409_345_5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArxArchSpec {
    /// Autoregressive lags in the mean equation (each ≥ 1).
    pub ar_lags: Vec<usize>,
    /// Number of lagged squared residuals in the variance equation.
    pub arch_order: usize,
}

impl Default for ArxArchSpec {
    /// The contagion model: a single lag-3 term and ARCH(5).
    fn default() -> Self {
        Self {
            ar_lags: vec![3],
            arch_order: 5,
        }
    }
}

impl ArxArchSpec {
    pub fn burn_in(&self) -> usize {
        self.ar_lags.iter().copied().max().unwrap_or(0)
    }

    fn param_count(&self) -> usize {
        1 + self.ar_lags.len() + 1 + self.arch_order
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArxArchFit {
    pub spec: ArxArchSpec,
    /// Constant followed by one coefficient per entry of `spec.ar_lags`.
    pub mean_params: Vec<f64>,
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub log_likelihood: f64,
    /// Observations used in estimation (`input length - burn-in`).
    pub n_obs: usize,
    pub converged: bool,
    pub residuals: Vec<f64>,
    pub conditional_volatility: Vec<f64>,
}

/// Fit the ARX-ARCH model to `y`.
pub fn fit_arx_arch(y: &[f64], spec: &ArxArchSpec) -> Result<ArxArchFit, AppError> {
    if spec.ar_lags.contains(&0) {
        return Err(AppError::new(ErrorKind::Model, "Autoregressive lags must be >= 1."));
    }
    if let Some(bad) = y.iter().find(|v| !v.is_finite()) {
        return Err(AppError::new(
            ErrorKind::Model,
            format!("Volatility filter input contains a non-finite value ({bad})."),
        ));
    }

    let burn_in = spec.burn_in();
    let n_obs = y.len().saturating_sub(burn_in);
    if n_obs <= spec.param_count() {
        return Err(AppError::new(
            ErrorKind::Model,
            format!(
                "ARX-ARCH needs more than {} observations after a burn-in of {burn_in}; got {n_obs}.",
                spec.param_count()
            ),
        ));
    }

    let (mean_params, residuals) = mean_residuals(y, spec, burn_in, n_obs)?;

    let backcast = backcast(&residuals);
    let variance = residuals.iter().map(|e| e * e).sum::<f64>() / n_obs as f64;
    let theta0 = starting_point(variance, spec.arch_order);

    let objective = |theta: &[f64]| {
        let (omega, alpha) = decode(theta);
        negative_log_likelihood(&residuals, backcast, omega, &alpha)
    };
    let result = minimize(objective, &theta0, SimplexOptions::default());
    if !result.value.is_finite() {
        return Err(AppError::new(
            ErrorKind::Model,
            "ARCH likelihood could not be evaluated at any candidate parameters.",
        ));
    }

    let (omega, alpha) = decode(&result.x);
    let conditional_volatility = conditional_variance(&residuals, backcast, omega, &alpha)
        .into_iter()
        .map(f64::sqrt)
        .collect();

    Ok(ArxArchFit {
        spec: spec.clone(),
        mean_params,
        omega,
        alpha,
        log_likelihood: -result.value,
        n_obs,
        converged: result.converged,
        residuals,
        conditional_volatility,
    })
}

fn mean_residuals(
    y: &[f64],
    spec: &ArxArchSpec,
    burn_in: usize,
    n_obs: usize,
) -> Result<(Vec<f64>, Vec<f64>), AppError> {
    let k = 1 + spec.ar_lags.len();
    let x = DMatrix::from_fn(n_obs, k, |i, j| {
        if j == 0 { 1.0 } else { y[burn_in + i - spec.ar_lags[j - 1]] }
    });
    let target = DVector::from_iterator(n_obs, y[burn_in..].iter().copied());

    let beta = solve_least_squares(&x, &target)
        .ok_or_else(|| AppError::new(ErrorKind::Model, "ARX mean equation is too ill-conditioned to solve."))?;
    let residuals = (&target - &x * &beta).iter().copied().collect();
    Ok((beta.iter().copied().collect(), residuals))
}

/// Exponentially weighted mean of the first squared residuals.
fn backcast(residuals: &[f64]) -> f64 {
    let window = residuals.len().min(BACKCAST_WINDOW);
    let mut weight = 1.0;
    let mut total_weight = 0.0;
    let mut acc = 0.0;
    for e in &residuals[..window] {
        acc += weight * e * e;
        total_weight += weight;
        weight *= BACKCAST_DECAY;
    }
    if total_weight > 0.0 { acc / total_weight } else { 0.0 }
}

fn conditional_variance(residuals: &[f64], backcast: f64, omega: f64, alpha: &[f64]) -> Vec<f64> {
    (0..residuals.len())
        .map(|t| {
            let arch: f64 = alpha
                .iter()
                .enumerate()
                .map(|(i, a)| {
                    let lagged = if t > i { residuals[t - i - 1].powi(2) } else { backcast };
                    a * lagged
                })
                .sum();
            omega + arch
        })
        .collect()
}

fn negative_log_likelihood(residuals: &[f64], backcast: f64, omega: f64, alpha: &[f64]) -> f64 {
    let sigma2 = conditional_variance(residuals, backcast, omega, alpha);
    let mut nll = 0.0;
    for (e, s2) in residuals.iter().zip(&sigma2) {
        if !(*s2 > 0.0) {
            return f64::INFINITY;
        }
        nll += 0.5 * (LN_2PI + s2.ln() + e * e / s2);
    }
    nll
}

/// Map unconstrained `θ` to `(ω, α)` with `ω > 0`, `α_i > 0`, `Σ α_i < 1`.
fn decode(theta: &[f64]) -> (f64, Vec<f64>) {
    let omega = theta[0].exp();
    let raw: Vec<f64> = theta[1..].iter().map(|t| t.exp()).collect();
    let denom = 1.0 + raw.iter().sum::<f64>();
    (omega, raw.into_iter().map(|r| r / denom).collect())
}

fn starting_point(variance: f64, arch_order: usize) -> Vec<f64> {
    let variance = variance.max(1e-12);
    let persistence = if arch_order == 0 { 0.0 } else { START_PERSISTENCE };
    let omega = variance * (1.0 - persistence);

    let mut theta = Vec::with_capacity(1 + arch_order);
    theta.push(omega.ln());
    for _ in 0..arch_order {
        let alpha = persistence / arch_order as f64;
        theta.push((alpha / (1.0 - persistence)).ln());
    }
    theta
}

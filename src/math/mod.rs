//! Mathematical utilities: missing-aware column arithmetic, least squares and
//! a derivative-free minimizer.

pub mod ols;
pub mod series;
pub mod simplex;

pub use ols::*;
pub use simplex::*;

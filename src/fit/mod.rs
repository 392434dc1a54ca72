//! Volatility filtering.
//!
//! Responsibilities:
//!
//! - estimate an autoregressive mean with ARCH errors on one monthly series
//! - expose the fitted conditional volatility for the contagion table

pub mod arch;

pub use arch::*;

//! `spread-panel` library crate.
//!
//! Builds the monthly panel used for bond-spread modeling: sector spreads,
//! GDP and inflation, market risk factors and FX, all aligned to month-start
//! dates. The binary (`panel`) is a thin wrapper around this library so the
//! table builders are testable without spawning processes.

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;

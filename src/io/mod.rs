//! Input/output helpers.
//!
//! - CSV ingest (`ingest`)
//! - monthly table CSV export (`export`)
//! - volatility model JSON (`model`)

pub mod export;
pub mod ingest;
pub mod model;

pub use export::*;
pub use ingest::*;
pub use model::*;

//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - the month-start calendar helpers (`calendar`)
//! - raw dated observations as read from CSV (`ObservationTable`)
//! - the month-start indexed output table (`MonthlyFrame`)
//! - small enums (`Currency`, `MarketSeries`)

pub mod calendar;
pub mod frame;
pub mod observations;
pub mod types;

pub use frame::*;
pub use observations::*;
pub use types::*;

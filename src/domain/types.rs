//! Shared domain enums and small value types.

use clap::ValueEnum;

/// Currencies carried in the FX panel.
///
/// Snapshots are quoted as units of the currency per 1 USD.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Currency {
    Eur,
    Brl,
    Clp,
}

impl Currency {
    pub const ALL: [Currency; 3] = [Currency::Eur, Currency::Brl, Currency::Clp];

    /// Snapshot ticker for this currency's quote.
    pub fn ticker(self) -> &'static str {
        match self {
            Currency::Eur => "EURUSD",
            Currency::Brl => "BRLUSD",
            Currency::Clp => "CLPUSD",
        }
    }

    /// Column name in FX tables.
    pub fn column(self) -> &'static str {
        match self {
            Currency::Eur => "eur",
            Currency::Brl => "brl",
            Currency::Clp => "clp",
        }
    }
}

/// Market tables that `MarketDataManager` can build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MarketSeries {
    Vix,
    Us3m,
    Gold,
    Commods,
    HighYield,
    Fx,
    Contagion,
}

impl MarketSeries {
    /// File stem used when exporting this table.
    pub fn file_stem(self) -> &'static str {
        match self {
            MarketSeries::Vix => "vix",
            MarketSeries::Us3m => "us3m",
            MarketSeries::Gold => "gold",
            MarketSeries::Commods => "commods",
            MarketSeries::HighYield => "us_high_yield",
            MarketSeries::Fx => "market_fx",
            MarketSeries::Contagion => "contagion",
        }
    }
}

//! Command-line parsing for the `panel` binary.
//!
//! Parsing lives here; dispatch and output live in `app`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::MarketSeries;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "panel", version, about = "Monthly spread, macro and market panel builder")]
pub struct Cli {
    /// Base data directory (overrides SPREAD_PANEL_DATA_DIR).
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Write tables as CSV files into this directory instead of stdout.
    #[arg(long, global = true, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// EUR, BRL and inverted CLP against USD.
    Fx,
    /// Italy/Brazil sector spreads, one table per tenor.
    Spreads(SpreadArgs),
    /// GDP and GDP per capita with cross-country differences and ratios.
    Gdp(GdpArgs),
    /// Brazil and Italy inflation, month-on-month and year-on-year.
    Inflation,
    /// A market risk factor.
    Market(MarketArgs),
}

#[derive(Debug, Args)]
pub struct SpreadArgs {
    /// Tenor in years (repeatable).
    #[arg(long = "tenor", required = true, num_args = 1..)]
    pub tenors: Vec<u32>,
}

#[derive(Debug, Args)]
pub struct GdpArgs {
    /// Year-on-year growth (percent) instead of levels.
    #[arg(long)]
    pub growth: bool,

    /// Shift by the three-month reporting lag.
    #[arg(long)]
    pub lag: bool,
}

#[derive(Debug, Args)]
pub struct MarketArgs {
    #[arg(value_enum)]
    pub series: MarketSeries,

    /// For `contagion`: also write the volatility model as JSON.
    #[arg(long, value_name = "JSON")]
    pub model_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spreads_take_several_tenors() {
        let cli = Cli::try_parse_from(["panel", "spreads", "--tenor", "5", "10"]).unwrap();
        match cli.command {
            Command::Spreads(args) => assert_eq!(args.tenors, vec![5, 10]),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn spreads_require_a_tenor() {
        assert!(Cli::try_parse_from(["panel", "spreads"]).is_err());
    }

    #[test]
    fn global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["panel", "gdp", "--growth", "--data-dir", "/data"]).unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/data")));
        match cli.command {
            Command::Gdp(args) => assert!(args.growth && !args.lag),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn market_series_are_kebab_case() {
        let cli = Cli::try_parse_from(["panel", "market", "high-yield"]).unwrap();
        match cli.command {
            Command::Market(args) => assert_eq!(args.series, MarketSeries::HighYield),
            other => panic!("unexpected command {other:?}"),
        }
    }
}

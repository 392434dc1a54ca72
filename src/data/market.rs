//! Market risk factors.
//!
//! Most factors are single snapshot series reduced to a monthly mean close.
//! The contagion table combines the Italy sovereign-risk index level with the
//! conditional volatility of the Brazil index from an ARX-ARCH filter.

use std::path::PathBuf;

use chrono::NaiveDate;
use log::{debug, info};

use crate::data::normalize::monthly_mean;
use crate::data::snapshot::{SnapshotSource, monthly_close};
use crate::domain::{Currency, MonthlyFrame};
use crate::error::AppError;
use crate::fit::{ArxArchFit, ArxArchSpec, fit_arx_arch};
use crate::io::ingest::{NumericParse, RawTable};

const HIGH_YIELD_TICKER: &str = "US_HIGH_YIELD";
const HIGH_YIELD_SERIES: &str = "BAMLH0A0HYM2EY";
const IT_RISK_INDEX_FILE: &str = "itvix.csv";
const BR_RISK_INDEX_FILE: &str = "brvix.csv";

/// Contagion table plus the volatility fit behind `br_contagion`.
#[derive(Debug, Clone)]
pub struct Contagion {
    pub table: MonthlyFrame,
    pub fit: ArxArchFit,
    /// Months covered by `fit.conditional_volatility`, in order.
    pub fit_dates: Vec<NaiveDate>,
}

pub struct MarketDataManager<S> {
    source: S,
    bonds_dir: PathBuf,
    volatility: ArxArchSpec,
}

impl<S: SnapshotSource> MarketDataManager<S> {
    pub fn new(source: S, bonds_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            bonds_dir: bonds_dir.into(),
            volatility: ArxArchSpec::default(),
        }
    }

    /// Override the volatility filter used by `get_contagion`.
    pub fn with_volatility_spec(mut self, spec: ArxArchSpec) -> Self {
        self.volatility = spec;
        self
    }

    /// Monthly mean close of a snapshot, as a single column `column`.
    pub fn load_snapshot_series(&self, ticker: &str, column: &str) -> Result<MonthlyFrame, AppError> {
        monthly_close(&self.source, ticker, column)
    }

    pub fn get_vix(&self) -> Result<MonthlyFrame, AppError> {
        self.load_snapshot_series("VIX", "vix")
    }

    pub fn get_us3m(&self) -> Result<MonthlyFrame, AppError> {
        self.load_snapshot_series("DTB3", "us3m")
    }

    pub fn get_gold(&self) -> Result<MonthlyFrame, AppError> {
        self.load_snapshot_series("GOLD", "gold")
    }

    pub fn get_commods(&self) -> Result<MonthlyFrame, AppError> {
        self.load_snapshot_series("DBC", "commods")
    }

    /// ICE BofA US high-yield effective yield, monthly mean.
    pub fn get_us_high_yield(&self) -> Result<MonthlyFrame, AppError> {
        let raw = self.source.snapshot(HIGH_YIELD_TICKER)?;
        let mut obs = raw.observations("DATE", &[HIGH_YIELD_SERIES], NumericParse::Plain)?;
        obs.drop_missing_rows();
        let mut frame = monthly_mean(&obs)?;
        frame.set_column_names(&["us_high_yield"])?;
        Ok(frame)
    }

    /// EUR, BRL and CLP quotes as stored (CLP is *not* inverted here, unlike
    /// `FxDataManager::get_combined_fx`).
    pub fn get_fx(&self) -> Result<MonthlyFrame, AppError> {
        let frames = Currency::ALL
            .iter()
            .map(|c| self.load_snapshot_series(c.ticker(), c.column()))
            .collect::<Result<Vec<_>, _>>()?;
        MonthlyFrame::concat(&frames)
    }

    /// `it_contagion` (index level) and `br_contagion` (conditional volatility).
    pub fn get_contagion(&self) -> Result<MonthlyFrame, AppError> {
        self.contagion_with_fit().map(|c| c.table)
    }

    /// Contagion table together with the fitted volatility model.
    pub fn contagion_with_fit(&self) -> Result<Contagion, AppError> {
        let it = self.load_risk_index(IT_RISK_INDEX_FILE, "it_contagion")?;
        let mut br = self
            .load_risk_index(BR_RISK_INDEX_FILE, "br_contagion")?
            .drop_missing_in("br_contagion")?;

        let levels: Vec<f64> = br.column("br_contagion")?.iter().flatten().copied().collect();
        let fit = fit_arx_arch(&levels, &self.volatility)?;
        debug!(
            "br_contagion ARX-ARCH: omega={:.6}, alpha={:?}, loglik={:.3}, converged={}",
            fit.omega, fit.alpha, fit.log_likelihood, fit.converged
        );

        // Volatility is shorter than the input by the burn-in; align it to the tail.
        let offset = br.len() - fit.conditional_volatility.len();
        let mut volatility = vec![None; br.len()];
        for (slot, v) in volatility[offset..].iter_mut().zip(&fit.conditional_volatility) {
            *slot = Some(*v);
        }
        br.insert_column("br_contagion", volatility)?;
        let fit_dates = br.index()[offset..].to_vec();

        let table = MonthlyFrame::concat(&[it, br])?.drop_missing_rows();
        info!("contagion table: {} months", table.len());
        Ok(Contagion { table, fit, fit_dates })
    }

    fn load_risk_index(&self, file: &str, name: &str) -> Result<MonthlyFrame, AppError> {
        let path = self.bonds_dir.join(file);
        debug!("loading {name} from {}", path.display());
        let obs = RawTable::from_path(&path)?.observations("Date", &["Price"], NumericParse::StripThousands)?;
        let mut frame = monthly_mean(&obs)?;
        frame.set_column_names(&[name])?;
        Ok(frame)
    }
}

//! Exchange-rate series and USD conversion.

use log::{debug, info};

use crate::data::snapshot::{SnapshotSource, monthly_close};
use crate::domain::{Currency, MonthlyFrame};
use crate::error::AppError;

/// Converts a value column of a monthly table using per-month FX rates.
///
/// Other components receive this as an injected dependency instead of
/// reading FX snapshots themselves.
pub trait UsdConverter {
    fn convert_to_usd(
        &self,
        frame: MonthlyFrame,
        value_column: &str,
        currency: Currency,
    ) -> Result<MonthlyFrame, AppError>;
}

pub struct FxDataManager<S> {
    source: S,
}

impl<S: SnapshotSource> FxDataManager<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Monthly mean close of `symbol` as a single column `name`.
    ///
    /// With `invert`, every value v becomes 1/v; a zero quote yields infinity.
    pub fn load_currency(&self, symbol: &str, name: &str, invert: bool) -> Result<MonthlyFrame, AppError> {
        let frame = monthly_close(&self.source, symbol, name)?;
        Ok(if invert { frame.map_values(|v| 1.0 / v) } else { frame })
    }

    /// `eur` and `brl` as quoted, `clp` inverted, outer-joined by month.
    pub fn get_combined_fx(&self) -> Result<MonthlyFrame, AppError> {
        let frames = Currency::ALL
            .iter()
            .map(|c| self.load_currency(c.ticker(), c.column(), *c == Currency::Clp))
            .collect::<Result<Vec<_>, _>>()?;
        let fx = MonthlyFrame::concat(&frames)?;
        info!("combined FX table: {} months, columns {:?}", fx.len(), fx.column_names());
        Ok(fx)
    }
}

impl<S: SnapshotSource> UsdConverter for FxDataManager<S> {
    /// Multiply `value_column` by the month's rate for `currency`.
    ///
    /// Months outside the FX table (or with a missing rate) become missing.
    fn convert_to_usd(
        &self,
        mut frame: MonthlyFrame,
        value_column: &str,
        currency: Currency,
    ) -> Result<MonthlyFrame, AppError> {
        let fx = self.get_combined_fx()?;
        let rates: Vec<Option<f64>> = frame.index().iter().map(|d| fx.value(*d, currency.column())).collect();

        let converted = crate::math::series::zip_with(frame.column(value_column)?, &rates, |v, r| v * r);
        let unmatched = rates.iter().filter(|r| r.is_none()).count();
        if unmatched > 0 {
            debug!("convert_to_usd({value_column}, {currency:?}): {unmatched} rows without a rate");
        }

        frame.insert_column(value_column, converted)?;
        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::data::snapshot::testing::MemorySnapshots;
    use crate::domain::Column;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn snapshots() -> MemorySnapshots {
        MemorySnapshots::default()
            .with("EURUSD", "Date,Close\n2024-01-10,0.9\n2024-02-10,0.9\n2024-03-10,0.9\n")
            .with("BRLUSD", "Date,Close\n2024-01-10,5.0\n2024-01-20,4.0\n2024-02-10,5.0\n")
            .with("CLPUSD", "Date,Close\n2024-02-10,800\n2024-03-10,0\n")
    }

    #[test]
    fn combined_fx_inverts_clp_only() {
        let fx = FxDataManager::new(snapshots()).get_combined_fx().unwrap();

        assert_eq!(fx.column_names(), vec!["eur", "brl", "clp"]);
        assert_eq!(fx.index(), &[d(2024, 1), d(2024, 2), d(2024, 3)]);
        assert_eq!(fx.value(d(2024, 1), "brl"), Some(4.5));
        assert_eq!(fx.value(d(2024, 2), "clp"), Some(1.0 / 800.0));
        assert_eq!(fx.value(d(2024, 1), "clp"), None);
        // Zero quotes are not special-cased.
        assert_eq!(fx.value(d(2024, 3), "clp"), Some(f64::INFINITY));
        assert_eq!(fx.value(d(2024, 3), "brl"), None);
    }

    #[test]
    fn inverting_twice_restores_the_series() {
        let mgr = FxDataManager::new(snapshots());
        let plain = mgr.load_currency("BRLUSD", "brl", false).unwrap();
        let twice = mgr.load_currency("BRLUSD", "brl", true).unwrap().map_values(|v| 1.0 / v);

        for (a, b) in plain.column("brl").unwrap().iter().zip(twice.column("brl").unwrap()) {
            match (a, b) {
                (Some(a), Some(b)) => assert!((a - b).abs() < 1e-12),
                (None, None) => {}
                other => panic!("mismatch {other:?}"),
            }
        }
    }

    #[test]
    fn constant_rate_scales_the_column_exactly() {
        let mgr = FxDataManager::new(snapshots());
        let table = MonthlyFrame::new(
            vec![d(2024, 1), d(2024, 2), d(2024, 3)],
            vec![Column::new("gdp", vec![Some(100.0), Some(200.0), None])],
        )
        .unwrap();

        let out = mgr.convert_to_usd(table, "gdp", Currency::Eur).unwrap();
        assert_eq!(out.column_names(), vec!["gdp"]);
        assert_eq!(out.column("gdp").unwrap(), &[Some(90.0), Some(180.0), None]);
    }

    #[test]
    fn rows_outside_fx_range_become_missing() {
        let mgr = FxDataManager::new(snapshots());
        let table = MonthlyFrame::new(
            vec![d(2023, 12), d(2024, 2)],
            vec![Column::new("v", vec![Some(1.0), Some(1.0)])],
        )
        .unwrap();

        let out = mgr.convert_to_usd(table, "v", Currency::Brl).unwrap();
        assert_eq!(out.column("v").unwrap(), &[None, Some(5.0)]);
    }

    #[test]
    fn missing_snapshot_aborts() {
        let src = MemorySnapshots::default().with("EURUSD", "Date,Close\n2024-01-10,0.9\n");
        let err = FxDataManager::new(src).get_combined_fx().unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::MissingFile);
    }
}

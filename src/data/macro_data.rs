//! GDP and inflation tables.
//!
//! GDP sources are long-format weekly series (`date, region, GDP`) for four
//! countries, one file for levels and one for per-capita values. Inflation
//! sources are monthly price indices for Brazil (IPCA) and Italy (HICP).

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use chrono::NaiveDate;
use log::{debug, info};

use crate::data::fx::UsdConverter;
use crate::data::normalize::monthly_mean;
use crate::domain::{Currency, MonthlyFrame, ObservationTable};
use crate::error::AppError;
use crate::io::ingest::{LongRow, NumericParse, RawTable};
use crate::math::series::percent_change;

const GDP_LEVEL_FILE: &str = "oecd_weekly_gdp_levels.csv";
const GDP_PER_CAPITA_FILE: &str = "oecd_weekly_gdp_level_percapita.csv";
const BR_INFLATION_FILE: &str = "br_inflation.csv";
const IT_INFLATION_FILE: &str = "it_inflation.csv";

/// Regions expected in both GDP files, in output column order.
pub const GDP_REGIONS: [&str; 4] = ["Brazil", "Chile", "Italy", "United States"];

/// `(minuend, subtrahend, output)` GDP differences.
pub const GDP_DIFFERENCES: [(&str, &str, &str); 8] = [
    ("Brazil_GDP", "Italy_GDP", "diff_br_it_gdp"),
    ("Brazil_GDPcapita", "Italy_GDPcapita", "diff_br_it_gdp_per_cp"),
    ("Brazil_GDP", "United States_GDP", "diff_br_us_gdp"),
    ("Brazil_GDPcapita", "United States_GDPcapita", "diff_br_us_gdp_per_cp"),
    ("Italy_GDP", "United States_GDP", "diff_it_us_gdp"),
    ("Italy_GDPcapita", "United States_GDPcapita", "diff_it_us_gdp_per_cp"),
    ("Chile_GDP", "United States_GDP", "diff_ch_us_gdp"),
    ("Chile_GDPcapita", "United States_GDPcapita", "diff_ch_us_gdp_per_cp"),
];

/// `(numerator, denominator, output)` GDP ratios.
pub const GDP_RATIOS: [(&str, &str, &str); 4] = [
    ("Brazil_GDP", "United States_GDP", "ratio_br_us_gdp"),
    ("Brazil_GDPcapita", "United States_GDPcapita", "ratio_br_us_gdp_per_cp"),
    ("Italy_GDP", "United States_GDP", "ratio_it_us_gdp"),
    ("Italy_GDPcapita", "United States_GDPcapita", "ratio_it_us_gdp_per_cp"),
];

/// Periods used for year-over-year growth on monthly data.
const YOY_PERIODS: usize = 12;

/// Reporting delay applied by `get_gdp(.., lag = true)`, in months.
pub const GDP_REPORTING_LAG: usize = 3;

/// GDP and inflation loader.
///
/// Holds the FX converter it was built with so macro series in local currency
/// can be restated in USD without reading FX snapshots here.
pub struct MacroDataManager<C> {
    macro_dir: PathBuf,
    fx: C,
}

impl<C: UsdConverter> MacroDataManager<C> {
    pub fn new(macro_dir: impl Into<PathBuf>, fx: C) -> Self {
        Self {
            macro_dir: macro_dir.into(),
            fx,
        }
    }

    /// Restate `value_column` of `frame` in USD using the injected converter.
    pub fn convert_to_usd(
        &self,
        frame: MonthlyFrame,
        value_column: &str,
        currency: Currency,
    ) -> Result<MonthlyFrame, AppError> {
        debug!("converting {value_column} from {currency:?} to USD");
        self.fx.convert_to_usd(frame, value_column, currency)
    }

    /// GDP level and per-capita panel with cross-country differences and ratios.
    ///
    /// - `growth`: replace every raw series with its 12-month percent change
    ///   (×100) before deriving differences/ratios; the first 12 months drop out.
    /// - `lag`: shift every column 3 months forward to mimic reporting delay.
    ///
    /// Rows with any missing value are dropped.
    pub fn get_gdp(&self, growth: bool, lag: bool) -> Result<MonthlyFrame, AppError> {
        let mut level = self.load_gdp_file(GDP_LEVEL_FILE, "GDP")?;
        let mut per_capita = self.load_gdp_file(GDP_PER_CAPITA_FILE, "GDPcapita")?;

        if growth {
            level = level.percent_change(YOY_PERIODS).drop_missing_rows();
            per_capita = per_capita.percent_change(YOY_PERIODS).drop_missing_rows();
        }

        for (a, b, name) in GDP_DIFFERENCES {
            if level.has_column(a) {
                level = level.with_difference(a, b, name)?;
            } else {
                per_capita = per_capita.with_difference(a, b, name)?;
            }
        }
        for (a, b, name) in GDP_RATIOS {
            if level.has_column(a) {
                level = level.with_ratio(a, b, name)?;
            } else {
                per_capita = per_capita.with_ratio(a, b, name)?;
            }
        }

        let mut gdp = MonthlyFrame::concat(&[level, per_capita])?.drop_missing_rows();
        if lag {
            gdp = gdp.shift(GDP_REPORTING_LAG).drop_missing_rows();
        }

        info!(
            "GDP table (growth={growth}, lag={lag}): {} months, {} columns",
            gdp.len(),
            gdp.columns().len()
        );
        Ok(gdp)
    }

    /// Brazil/Italy month-over-month and year-over-year inflation with differences.
    pub fn get_inflation(&self) -> Result<MonthlyFrame, AppError> {
        let br = self.load_inflation(BR_INFLATION_FILE, "IPCA", "br")?;
        let it = self.load_inflation(IT_INFLATION_FILE, "HICP - All Items", "it")?;

        let inflation = MonthlyFrame::concat(&[br, it])?
            .drop_missing_rows()
            .with_difference("br_inflation_yoy", "it_inflation_yoy", "diff_br_it_inflation_yoy")?
            .with_difference("br_inflation_mom", "it_inflation_mom", "diff_br_it_inflation_mom")?;

        info!("inflation table: {} months", inflation.len());
        Ok(inflation)
    }

    fn load_gdp_file(&self, file: &str, suffix: &str) -> Result<MonthlyFrame, AppError> {
        let path = self.macro_dir.join(file);
        debug!("loading GDP ({suffix}) from {}", path.display());
        let rows = RawTable::from_path(&path)?.long_rows("date", "region", "GDP")?;
        let wide = pivot_regions(&rows, suffix)?;
        monthly_mean(&wide)
    }

    fn load_inflation(&self, file: &str, index_column: &str, prefix: &str) -> Result<MonthlyFrame, AppError> {
        let path = self.macro_dir.join(file);
        debug!("loading {prefix} inflation from {}", path.display());
        let mut obs = RawTable::from_path(&path)?.observations("date", &[index_column], NumericParse::Plain)?;
        obs.sort_by_date();

        let level = obs.column_values(index_column)?;
        obs.set_column(&format!("{prefix}_inflation_mom"), percent_change(&level, 1))?;
        obs.set_column(&format!("{prefix}_inflation_yoy"), percent_change(&level, YOY_PERIODS))?;
        obs.drop_column(index_column)?;

        let before = obs.len();
        obs.drop_missing_rows();
        debug!("{prefix} inflation: dropped {} rows lacking history", before - obs.len());

        monthly_mean(&obs)
    }
}

/// Pivot long GDP rows into one `{region}_{suffix}` column per region.
///
/// The region set must be exactly `GDP_REGIONS`, and each (date, region)
/// pair may appear only once.
pub fn pivot_regions(rows: &[LongRow], suffix: &str) -> Result<ObservationTable, AppError> {
    let found: BTreeSet<&str> = rows.iter().map(|r| r.key.as_str()).collect();
    let expected: BTreeSet<&str> = GDP_REGIONS.into_iter().collect();
    if found != expected {
        let missing: Vec<&str> = expected.difference(&found).copied().collect();
        let unexpected: Vec<&str> = found.difference(&expected).copied().collect();
        return Err(AppError::schema(format!(
            "GDP region set mismatch: missing {missing:?}, unexpected {unexpected:?}."
        )));
    }

    let mut by_date: BTreeMap<NaiveDate, Vec<Option<f64>>> = BTreeMap::new();
    let mut seen: BTreeSet<(NaiveDate, usize)> = BTreeSet::new();
    for row in rows {
        let col = GDP_REGIONS
            .iter()
            .position(|r| *r == row.key)
            .ok_or_else(|| AppError::schema(format!("Unexpected region `{}`.", row.key)))?;
        if !seen.insert((row.date, col)) {
            return Err(AppError::schema(format!(
                "Duplicate GDP entry for {} on {}.",
                row.key, row.date
            )));
        }
        by_date
            .entry(row.date)
            .or_insert_with(|| vec![None; GDP_REGIONS.len()])[col] = row.value;
    }

    let names = GDP_REGIONS.iter().map(|r| format!("{r}_{suffix}")).collect();
    let mut table = ObservationTable::new(names);
    for (date, values) in by_date {
        table.push(date, values)?;
    }
    Ok(table)
}

#[cfg(test)]
mod tests {
    use std::fmt::Write as _;
    use std::path::Path;

    use chrono::Datelike;

    use super::*;
    use crate::data::fx::FxDataManager;
    use crate::data::snapshot::testing::MemorySnapshots;
    use crate::domain::Column;
    use crate::domain::calendar::add_months;
    use crate::error::ErrorKind;

    fn manager(dir: &Path) -> MacroDataManager<FxDataManager<MemorySnapshots>> {
        let snapshots = MemorySnapshots::default()
            .with("EURUSD", "Date,Close\n2020-01-10,0.9\n")
            .with("BRLUSD", "Date,Close\n2020-01-10,5.0\n2020-02-10,4.0\n")
            .with("CLPUSD", "Date,Close\n2020-01-10,800\n");
        MacroDataManager::new(dir, FxDataManager::new(snapshots))
    }

    fn month(offset: i32) -> NaiveDate {
        add_months(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(), offset).unwrap()
    }

    /// Write a long-format GDP file with two weekly observations per month.
    fn write_gdp(dir: &Path, file: &str, months: i32, value: impl Fn(&str, i32) -> f64) {
        let mut body = String::from("Unnamed: 0,date,region,GDP\n");
        let mut i = 0;
        for m in 0..months {
            for day in [3, 17] {
                let date = month(m).with_day(day).unwrap();
                for region in GDP_REGIONS {
                    writeln!(body, "{i},{date},{region},{}", value(region, m)).unwrap();
                    i += 1;
                }
            }
        }
        std::fs::write(dir.join(file), body).unwrap();
    }

    fn levels(region: &str, _m: i32) -> f64 {
        match region {
            "Brazil" => 100.0,
            "Chile" => 20.0,
            "Italy" => 80.0,
            _ => 50.0,
        }
    }

    fn growing(region: &str, m: i32) -> f64 {
        let m = f64::from(m);
        match region {
            "Brazil" => 100.0,
            "Chile" => 20.0 + m,
            "Italy" => 80.0 + m,
            _ => 50.0 + 2.0 * m,
        }
    }

    #[test]
    fn level_table_has_raw_and_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        write_gdp(dir.path(), GDP_LEVEL_FILE, 3, levels);
        write_gdp(dir.path(), GDP_PER_CAPITA_FILE, 3, |r, m| levels(r, m) / 10.0);

        let gdp = manager(dir.path()).get_gdp(false, false).unwrap();

        assert_eq!(gdp.len(), 3);
        assert_eq!(gdp.columns().len(), 4 + 4 + 2 + 4 + 4 + 2);
        assert_eq!(gdp.value(month(0), "diff_br_it_gdp"), Some(20.0));
        assert_eq!(gdp.value(month(0), "ratio_br_us_gdp"), Some(2.0));
        assert_eq!(gdp.value(month(1), "diff_br_it_gdp_per_cp"), Some(2.0));
        assert_eq!(gdp.value(month(2), "diff_ch_us_gdp"), Some(-30.0));

        let names = gdp.column_names();
        let level_pos = names.iter().position(|n| *n == "ratio_it_us_gdp").unwrap();
        let per_capita_pos = names.iter().position(|n| *n == "Brazil_GDPcapita").unwrap();
        assert!(level_pos < per_capita_pos);
    }

    #[test]
    fn growth_drops_first_year_and_flat_series_grow_zero() {
        let dir = tempfile::tempdir().unwrap();
        write_gdp(dir.path(), GDP_LEVEL_FILE, 15, growing);
        write_gdp(dir.path(), GDP_PER_CAPITA_FILE, 15, growing);

        let gdp = manager(dir.path()).get_gdp(true, false).unwrap();

        assert_eq!(gdp.index(), &[month(12), month(13), month(14)]);
        assert_eq!(gdp.value(month(13), "Brazil_GDP"), Some(0.0));
        let italy = gdp.value(month(12), "Italy_GDP").unwrap();
        assert!((italy - (92.0 / 80.0 - 1.0) * 100.0).abs() < 1e-9);
        assert!((gdp.value(month(12), "diff_br_it_gdp").unwrap() + italy).abs() < 1e-9);
    }

    #[test]
    fn lag_shifts_rows_three_months() {
        let dir = tempfile::tempdir().unwrap();
        write_gdp(dir.path(), GDP_LEVEL_FILE, 6, growing);
        write_gdp(dir.path(), GDP_PER_CAPITA_FILE, 6, growing);
        let mgr = manager(dir.path());

        let plain = mgr.get_gdp(false, false).unwrap();
        let lagged = mgr.get_gdp(false, true).unwrap();

        assert_eq!(lagged.index(), &plain.index()[3..]);
        for date in lagged.index() {
            let source = add_months(*date, -3).unwrap();
            for name in plain.column_names() {
                assert_eq!(lagged.value(*date, name), plain.value(source, name), "{name} at {date}");
            }
        }
    }

    #[test]
    fn unexpected_region_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        write_gdp(dir.path(), GDP_LEVEL_FILE, 2, levels);
        let mut body = std::fs::read_to_string(dir.path().join(GDP_LEVEL_FILE)).unwrap();
        body.push_str("99,2020-01-03,France,70\n");
        std::fs::write(dir.path().join(GDP_LEVEL_FILE), body).unwrap();
        write_gdp(dir.path(), GDP_PER_CAPITA_FILE, 2, levels);

        let err = manager(dir.path()).get_gdp(false, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("France"));
    }

    #[test]
    fn missing_region_fails_loudly() {
        let dir = tempfile::tempdir().unwrap();
        write_gdp(dir.path(), GDP_LEVEL_FILE, 2, levels);
        let body = std::fs::read_to_string(dir.path().join(GDP_LEVEL_FILE)).unwrap();
        let without_chile: String = body
            .lines()
            .filter(|l| !l.contains(",Chile,"))
            .map(|l| format!("{l}\n"))
            .collect();
        std::fs::write(dir.path().join(GDP_LEVEL_FILE), without_chile).unwrap();
        write_gdp(dir.path(), GDP_PER_CAPITA_FILE, 2, levels);

        let err = manager(dir.path()).get_gdp(false, false).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Schema);
        assert!(err.to_string().contains("Chile"), "{err}");
    }

    #[test]
    fn converts_local_currency_through_injected_fx() {
        let dir = tempfile::tempdir().unwrap();
        let frame = MonthlyFrame::new(
            vec![month(0), month(1)],
            vec![Column::new("gdp_brl", vec![Some(10.0), Some(10.0)])],
        )
        .unwrap();

        let usd = manager(dir.path()).convert_to_usd(frame, "gdp_brl", Currency::Brl).unwrap();
        assert_eq!(usd.column("gdp_brl").unwrap(), &[Some(50.0), Some(40.0)]);
    }

    #[test]
    fn duplicate_region_date_is_rejected() {
        let d = NaiveDate::from_ymd_opt(2020, 1, 3).unwrap();
        let mut rows: Vec<LongRow> = GDP_REGIONS
            .iter()
            .map(|r| LongRow {
                date: d,
                key: r.to_string(),
                value: Some(1.0),
            })
            .collect();
        rows.push(rows[0].clone());
        assert_eq!(pivot_regions(&rows, "GDP").unwrap_err().kind(), ErrorKind::Schema);
    }

    fn write_index(dir: &Path, file: &str, date_header: &str, value_header: &str, start: f64) {
        let mut body = format!("{date_header},{value_header}\n");
        for m in 0..13 {
            writeln!(body, "{},{}", month(m), start + f64::from(m)).unwrap();
        }
        std::fs::write(dir.join(file), body).unwrap();
    }

    #[test]
    fn inflation_rates_from_price_indices() {
        let dir = tempfile::tempdir().unwrap();
        write_index(dir.path(), BR_INFLATION_FILE, "DATE", "IPCA", 100.0);
        write_index(dir.path(), IT_INFLATION_FILE, "Date", "HICP - All Items", 200.0);

        let infl = manager(dir.path()).get_inflation().unwrap();

        assert_eq!(infl.index(), &[month(12)]);
        assert_eq!(
            infl.column_names(),
            vec![
                "br_inflation_mom",
                "br_inflation_yoy",
                "it_inflation_mom",
                "it_inflation_yoy",
                "diff_br_it_inflation_yoy",
                "diff_br_it_inflation_mom",
            ]
        );

        let br_mom = infl.value(month(12), "br_inflation_mom").unwrap();
        let br_yoy = infl.value(month(12), "br_inflation_yoy").unwrap();
        assert!((br_mom - (112.0 / 111.0 - 1.0) * 100.0).abs() < 1e-9);
        assert!((br_yoy - (112.0 / 100.0 - 1.0) * 100.0).abs() < 1e-9);

        let it_yoy = infl.value(month(12), "it_inflation_yoy").unwrap();
        let diff = infl.value(month(12), "diff_br_it_inflation_yoy").unwrap();
        assert!((diff - (br_yoy - it_yoy)).abs() < 1e-12);
    }
}

//! CSV ingest and coercion.
//!
//! Source files come from several providers with their own conventions: the
//! date column may be called `Date`, `date` or `DATE`, values may be quoted
//! with thousands separators, and market snapshots carry timestamps such as
//! `2020-01-02 00:00:00-05:00`. This module turns any of them into an
//! `ObservationTable` of dates and `Option<f64>` values.
//!
//! Rules:
//! - header lookup is case-insensitive (a UTF-8 BOM on the first header is ignored)
//! - a cell that is not a number becomes missing; it is never an error
//! - a date that cannot be parsed is an error (`ErrorKind::Parse`)
//! - a requested column that does not exist is an error (`ErrorKind::Schema`)

use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::StringRecord;

use crate::domain::ObservationTable;
use crate::error::{AppError, ErrorKind};

/// How numeric cells are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumericParse {
    Plain,
    /// Remove `,` thousands separators before parsing (`"1,234.5"`).
    StripThousands,
}

/// One long-format row (`date, key, value`).
#[derive(Debug, Clone, PartialEq)]
pub struct LongRow {
    pub date: NaiveDate,
    pub key: String,
    pub value: Option<f64>,
}

/// A CSV file held as headers plus string records.
#[derive(Debug, Clone)]
pub struct RawTable {
    source: String,
    headers: Vec<String>,
    header_map: HashMap<String, usize>,
    records: Vec<StringRecord>,
}

impl RawTable {
    pub fn from_path(path: &Path) -> Result<Self, AppError> {
        let file = File::open(path).map_err(|e| AppError::from_io(&e, path))?;
        Self::from_reader(file, &path.display().to_string())
    }

    /// Parse CSV text from any reader; `source` is used in error messages.
    pub fn from_reader<R: Read>(reader: R, source: &str) -> Result<Self, AppError> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to read CSV headers of '{source}': {e}")))?
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut records = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result.map_err(|e| {
                AppError::new(ErrorKind::Io, format!("CSV parse error in '{source}' line {}: {e}", idx + 2))
            })?;
            records.push(record);
        }

        Ok(Self {
            source: source.to_string(),
            header_map: build_header_map(&headers),
            headers,
            records,
        })
    }

    /// Select a date column and the given value columns.
    ///
    /// Output columns are named exactly as requested in `value_columns`.
    pub fn observations(
        &self,
        date_column: &str,
        value_columns: &[&str],
        numeric: NumericParse,
    ) -> Result<ObservationTable, AppError> {
        let date_idx = self.column_index(date_column)?;
        let value_idx = value_columns
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;

        let names = value_columns.iter().map(|c| (*c).to_string()).collect();
        self.collect_observations(date_idx, &value_idx, names, numeric)
    }

    /// Select a date column and every other non-index column.
    pub fn all_observations(&self, date_column: &str, numeric: NumericParse) -> Result<ObservationTable, AppError> {
        let date_idx = self.column_index(date_column)?;
        let (value_idx, names): (Vec<usize>, Vec<String>) = self
            .headers
            .iter()
            .enumerate()
            .filter(|(i, h)| *i != date_idx && !is_index_column(h))
            .map(|(i, h)| (i, h.clone()))
            .unzip();

        self.collect_observations(date_idx, &value_idx, names, numeric)
    }

    /// Read a long-format table of `(date, key, value)` rows.
    pub fn long_rows(&self, date_column: &str, key_column: &str, value_column: &str) -> Result<Vec<LongRow>, AppError> {
        let date_idx = self.column_index(date_column)?;
        let key_idx = self.column_index(key_column)?;
        let value_idx = self.column_index(value_column)?;

        self.records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let date = self.date_cell(record, date_idx, i)?;
                let key = record.get(key_idx).unwrap_or("").to_string();
                let value = parse_numeric(record.get(value_idx), NumericParse::Plain);
                Ok(LongRow { date, key, value })
            })
            .collect()
    }

    fn collect_observations(
        &self,
        date_idx: usize,
        value_idx: &[usize],
        names: Vec<String>,
        numeric: NumericParse,
    ) -> Result<ObservationTable, AppError> {
        let mut table = ObservationTable::new(names);
        for (i, record) in self.records.iter().enumerate() {
            let date = self.date_cell(record, date_idx, i)?;
            let values = value_idx
                .iter()
                .map(|idx| parse_numeric(record.get(*idx), numeric))
                .collect();
            table.push(date, values)?;
        }
        Ok(table)
    }

    fn date_cell(&self, record: &StringRecord, idx: usize, row: usize) -> Result<NaiveDate, AppError> {
        let raw = record.get(idx).unwrap_or("");
        parse_date(raw).map_err(|msg| {
            AppError::new(ErrorKind::Parse, format!("'{}' line {}: {msg}", self.source, row + 2))
        })
    }

    fn column_index(&self, name: &str) -> Result<usize, AppError> {
        self.header_map
            .get(&normalize_header_name(name))
            .copied()
            .ok_or_else(|| AppError::schema(format!("Missing column `{name}` in '{}'.", self.source)))
    }
}

fn build_header_map(headers: &[String]) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins when two headers differ only in case.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// A pandas-written row index (`""` or `Unnamed: 0`).
fn is_index_column(header: &str) -> bool {
    header.is_empty() || header.starts_with("Unnamed:")
}

/// Parse a calendar date in one of the formats seen across the sources.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    const FMTS: [&str; 5] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%b %d, %Y", "%Y%m%d"];

    let s = s.trim();
    if s.is_empty() {
        return Err("Missing date value.".to_string());
    }
    for fmt in FMTS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(d);
        }
    }
    // Monthly sources write `YYYY-MM`.
    if let Ok(d) = NaiveDate::parse_from_str(&format!("{s}-01"), "%Y-%m-%d") {
        return Ok(d);
    }
    // Timestamps such as `2020-01-02 00:00:00-05:00`: keep the calendar date.
    if let Some(prefix) = s.get(..10) {
        if s.len() > 10 {
            if let Ok(d) = NaiveDate::parse_from_str(prefix, "%Y-%m-%d") {
                return Ok(d);
            }
        }
    }
    Err(format!(
        "Invalid date '{s}'. Expected one of: YYYY-MM-DD, YYYY/MM/DD, MM/DD/YYYY, Mon DD, YYYY, YYYYMMDD, YYYY-MM."
    ))
}

/// Coerce a cell to a number; anything unparseable is missing.
pub fn parse_numeric(cell: Option<&str>, mode: NumericParse) -> Option<f64> {
    let s = cell?.trim();
    let v = match mode {
        NumericParse::Plain => s.parse::<f64>().ok()?,
        NumericParse::StripThousands => s.replace(',', "").parse::<f64>().ok()?,
    };
    if v.is_nan() { None } else { Some(v) }
}

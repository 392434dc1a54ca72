//! Cached market-data snapshots.
//!
//! Snapshots are downloaded elsewhere and stored as one CSV per ticker
//! (`{TICKER}.csv`, with at least `Date` and `Close` columns). Managers that
//! need them receive a `SnapshotSource` at construction.

use std::path::PathBuf;

use log::debug;

use crate::data::normalize::monthly_mean;
use crate::domain::MonthlyFrame;
use crate::error::AppError;
use crate::io::ingest::{NumericParse, RawTable};

pub trait SnapshotSource {
    /// Load the cached snapshot for `ticker`.
    fn snapshot(&self, ticker: &str) -> Result<RawTable, AppError>;
}

impl<S: SnapshotSource + ?Sized> SnapshotSource for &S {
    fn snapshot(&self, ticker: &str) -> Result<RawTable, AppError> {
        (**self).snapshot(ticker)
    }
}

/// Snapshot store backed by a directory of `{TICKER}.csv` files.
#[derive(Debug, Clone)]
pub struct CsvSnapshotStore {
    dir: PathBuf,
}

impl CsvSnapshotStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl SnapshotSource for CsvSnapshotStore {
    fn snapshot(&self, ticker: &str) -> Result<RawTable, AppError> {
        let path = self.dir.join(format!("{ticker}.csv"));
        debug!("loading snapshot {ticker} from {}", path.display());
        RawTable::from_path(&path)
    }
}

/// Monthly mean of a snapshot's `Close` column, renamed to `name`.
pub fn monthly_close<S: SnapshotSource>(source: &S, ticker: &str, name: &str) -> Result<MonthlyFrame, AppError> {
    let raw = source.snapshot(ticker)?;
    let obs = raw.observations("Date", &["Close"], NumericParse::Plain)?;
    let mut frame = monthly_mean(&obs)?;
    frame.set_column_names(&[name])?;
    debug!("{ticker}: {} observations -> {} months", obs.len(), frame.len());
    Ok(frame)
}

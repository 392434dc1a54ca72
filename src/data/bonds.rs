//! Italy/Brazil sector credit spreads per tenor.

use std::collections::BTreeMap;
use std::path::PathBuf;

use log::{debug, info};

use crate::data::normalize::monthly_mean;
use crate::domain::MonthlyFrame;
use crate::error::AppError;
use crate::io::ingest::{NumericParse, RawTable};

/// Sector pair subdirectory under the bonds directory.
const SECTOR_PAIR: &str = "IT_BR";

pub struct BondDataManager {
    bonds_dir: PathBuf,
}

impl BondDataManager {
    pub fn new(bonds_dir: impl Into<PathBuf>) -> Self {
        Self {
            bonds_dir: bonds_dir.into(),
        }
    }

    pub fn spread_path(&self, tenor: u32) -> PathBuf {
        self.bonds_dir
            .join(SECTOR_PAIR)
            .join(format!("monthly_spreads_{tenor}.csv"))
    }

    /// Monthly spread tables keyed by tenor (years).
    ///
    /// Every column besides `date` is treated as a spread series. The first
    /// tenor that fails aborts the whole call; callers wanting partial results
    /// should call once per tenor.
    pub fn load_sector_spreads(&self, tenors: &[u32]) -> Result<BTreeMap<u32, MonthlyFrame>, AppError> {
        let mut spreads = BTreeMap::new();
        for &tenor in tenors {
            let path = self.spread_path(tenor);
            debug!("loading {tenor}y spreads from {}", path.display());
            let obs = RawTable::from_path(&path)?.all_observations("date", NumericParse::Plain)?;
            let frame = monthly_mean(&obs)?;
            info!("{tenor}y spreads: {} months, columns {:?}", frame.len(), frame.column_names());
            spreads.insert(tenor, frame);
        }
        Ok(spreads)
    }
}

//! Data directory layout.

use std::path::{Path, PathBuf};

use crate::error::{AppError, ErrorKind};

/// Environment variable holding the base data directory.
pub const DATA_DIR_ENV: &str = "SPREAD_PANEL_DATA_DIR";

/// Where each family of source files lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPaths {
    /// Sector spread files (`IT_BR/monthly_spreads_{tenor}.csv`) and sovereign risk indices.
    pub bonds_dir: PathBuf,
    /// GDP and inflation CSVs.
    pub macro_dir: PathBuf,
    /// Cached market-data snapshots (`{TICKER}.csv`).
    pub snapshot_dir: PathBuf,
}

impl DataPaths {
    pub fn new(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        Self {
            bonds_dir: base.join("bonds").join("model"),
            macro_dir: base.join("macro").join("model"),
            snapshot_dir: base.join("macro").join("yf"),
        }
    }

    /// Read the base directory from the environment (a `.env` file is honored).
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();
        let base = std::env::var(DATA_DIR_ENV).map_err(|_| {
            AppError::new(
                ErrorKind::Config,
                format!("Missing {DATA_DIR_ENV} in environment (.env) and no --data-dir given."),
            )
        })?;
        Ok(Self::new(base))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_is_relative_to_base() {
        let p = DataPaths::new("/data");
        assert_eq!(p.bonds_dir, PathBuf::from("/data/bonds/model"));
        assert_eq!(p.macro_dir, PathBuf::from("/data/macro/model"));
        assert_eq!(p.snapshot_dir, PathBuf::from("/data/macro/yf"));
    }
}

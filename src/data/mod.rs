//! Data managers: each one reads one family of source files and returns
//! month-start aligned tables.

pub mod bonds;
pub mod fx;
pub mod macro_data;
pub mod market;
pub mod normalize;
pub mod paths;
pub mod snapshot;

pub use bonds::BondDataManager;
pub use fx::{FxDataManager, UsdConverter};
pub use macro_data::MacroDataManager;
pub use market::MarketDataManager;
pub use paths::{DATA_DIR_ENV, DataPaths};
pub use snapshot::{CsvSnapshotStore, SnapshotSource};

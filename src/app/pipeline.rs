//! Shared table-building logic behind the CLI.
//!
//! `Pipeline` owns one of each data manager, wired from a `DataPaths` layout
//! with the same snapshot source injected into the FX and market managers. The
//! macro manager receives its own FX manager as its USD converter.
//! The CLI only decides which table to request and where to write it.

use log::info;

use crate::data::{
    BondDataManager, CsvSnapshotStore, DataPaths, FxDataManager, MacroDataManager, MarketDataManager,
    SnapshotSource,
};
use crate::domain::{MarketSeries, MonthlyFrame};
use crate::error::AppError;
use crate::io::model::VolatilityModelFile;

/// A table to build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableRequest {
    Fx,
    Spreads { tenors: Vec<u32> },
    Gdp { growth: bool, lag: bool },
    Inflation,
    Market(MarketSeries),
}

/// A built table and the file stem it is exported under.
#[derive(Debug, Clone)]
pub struct NamedTable {
    pub name: String,
    pub frame: MonthlyFrame,
}

/// All outputs of one request.
#[derive(Debug, Clone)]
pub struct PanelOutput {
    pub tables: Vec<NamedTable>,
    /// Present for the contagion table.
    pub volatility_model: Option<VolatilityModelFile>,
}

pub struct Pipeline<S> {
    fx: FxDataManager<S>,
    bonds: BondDataManager,
    macro_data: MacroDataManager<FxDataManager<S>>,
    market: MarketDataManager<S>,
}

impl Pipeline<CsvSnapshotStore> {
    /// Managers reading snapshots from `paths.snapshot_dir`.
    pub fn from_paths(paths: &DataPaths) -> Self {
        Self::with_source(paths, CsvSnapshotStore::new(paths.snapshot_dir.clone()))
    }
}

impl<S: SnapshotSource + Clone> Pipeline<S> {
    pub fn with_source(paths: &DataPaths, source: S) -> Self {
        Self {
            fx: FxDataManager::new(source.clone()),
            bonds: BondDataManager::new(paths.bonds_dir.clone()),
            macro_data: MacroDataManager::new(paths.macro_dir.clone(), FxDataManager::new(source.clone())),
            market: MarketDataManager::new(source, paths.bonds_dir.clone()),
        }
    }

    pub fn macro_data(&self) -> &MacroDataManager<FxDataManager<S>> {
        &self.macro_data
    }

    pub fn build(&self, request: &TableRequest) -> Result<PanelOutput, AppError> {
        info!("building {request:?}");
        let single = |name: &str, frame: MonthlyFrame| PanelOutput {
            tables: vec![NamedTable {
                name: name.to_string(),
                frame,
            }],
            volatility_model: None,
        };

        let output = match request {
            TableRequest::Fx => single("fx", self.fx.get_combined_fx()?),
            TableRequest::Spreads { tenors } => PanelOutput {
                tables: self
                    .bonds
                    .load_sector_spreads(tenors)?
                    .into_iter()
                    .map(|(tenor, frame)| NamedTable {
                        name: format!("spreads_{tenor}"),
                        frame,
                    })
                    .collect(),
                volatility_model: None,
            },
            TableRequest::Gdp { growth, lag } => {
                let mut name = String::from("gdp");
                if *growth {
                    name.push_str("_growth");
                }
                if *lag {
                    name.push_str("_lag");
                }
                single(&name, self.macro_data.get_gdp(*growth, *lag)?)
            }
            TableRequest::Inflation => single("inflation", self.macro_data.get_inflation()?),
            TableRequest::Market(series) => self.build_market(*series)?,
        };
        Ok(output)
    }

    fn build_market(&self, series: MarketSeries) -> Result<PanelOutput, AppError> {
        let frame = match series {
            MarketSeries::Vix => self.market.get_vix()?,
            MarketSeries::Us3m => self.market.get_us3m()?,
            MarketSeries::Gold => self.market.get_gold()?,
            MarketSeries::Commods => self.market.get_commods()?,
            MarketSeries::HighYield => self.market.get_us_high_yield()?,
            MarketSeries::Fx => self.market.get_fx()?,
            MarketSeries::Contagion => {
                let contagion = self.market.contagion_with_fit()?;
                let model = VolatilityModelFile::new("br_contagion", &contagion.fit, &contagion.fit_dates)?;
                return Ok(PanelOutput {
                    tables: vec![NamedTable {
                        name: series.file_stem().to_string(),
                        frame: contagion.table,
                    }],
                    volatility_model: Some(model),
                });
            }
        };
        Ok(PanelOutput {
            tables: vec![NamedTable {
                name: series.file_stem().to_string(),
                frame,
            }],
            volatility_model: None,
        })
    }
}

//! Write fitted volatility models as JSON.
//!
//! The file is the portable record of a contagion run: the model orders, the
//! estimated parameters and the conditional volatility keyed by month, so the
//! filter can be inspected without re-running the fit.

use std::fs::File;
use std::path::Path;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};
use crate::fit::{ArxArchFit, ArxArchSpec};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityPoint {
    pub date: NaiveDate,
    pub volatility: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VolatilityModelFile {
    pub tool: String,
    pub series: String,
    pub spec: ArxArchSpec,
    pub mean_params: Vec<f64>,
    pub omega: f64,
    pub alpha: Vec<f64>,
    pub log_likelihood: f64,
    pub n_obs: usize,
    pub converged: bool,
    pub volatility: Vec<VolatilityPoint>,
}

impl VolatilityModelFile {
    /// `dates` must be the months the fit's volatility covers, in order.
    pub fn new(series: &str, fit: &ArxArchFit, dates: &[NaiveDate]) -> Result<Self, AppError> {
        if dates.len() != fit.conditional_volatility.len() {
            return Err(AppError::new(
                ErrorKind::Model,
                format!(
                    "{} dates for {} volatility values in '{series}'.",
                    dates.len(),
                    fit.conditional_volatility.len()
                ),
            ));
        }
        Ok(Self {
            tool: "panel".to_string(),
            series: series.to_string(),
            spec: fit.spec.clone(),
            mean_params: fit.mean_params.clone(),
            omega: fit.omega,
            alpha: fit.alpha.clone(),
            log_likelihood: fit.log_likelihood,
            n_obs: fit.n_obs,
            converged: fit.converged,
            volatility: dates
                .iter()
                .zip(&fit.conditional_volatility)
                .map(|(&date, &volatility)| VolatilityPoint { date, volatility })
                .collect(),
        })
    }
}

pub fn write_model_json(path: &Path, model: &VolatilityModelFile) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::from_io(&e, path))?;
    serde_json::to_writer_pretty(file, model)
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to write model JSON: {e}")))
}

pub fn read_model_json(path: &Path) -> Result<VolatilityModelFile, AppError> {
    let file = File::open(path).map_err(|e| AppError::from_io(&e, path))?;
    serde_json::from_reader(file)
        .map_err(|e| AppError::new(ErrorKind::Parse, format!("Invalid model JSON '{}': {e}", path.display())))
}

//! Top-level application orchestration.
//!
//! `src/main.rs` stays tiny; this module is the real main. It parses CLI
//! arguments, resolves the data directory, builds the requested table through
//! `pipeline`, then prints or writes it.

use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser;
use log::info;

use crate::cli::{Cli, Command};
use crate::data::DataPaths;
use crate::error::{AppError, ErrorKind};
use crate::io::export::{write_frame_csv, write_frame_csv_file};
use crate::io::model::write_model_json;

pub mod pipeline;

use pipeline::{PanelOutput, Pipeline, TableRequest};

/// Entry point for the `panel` binary.
pub fn run() -> Result<(), AppError> {
    let cli = Cli::parse();

    let paths = match &cli.data_dir {
        Some(dir) => DataPaths::new(dir),
        None => DataPaths::from_env()?,
    };
    let (request, model_json) = request_from_command(cli.command);

    let output = Pipeline::from_paths(&paths).build(&request)?;

    match (&model_json, &output.volatility_model) {
        (Some(path), Some(model)) => {
            write_model_json(path, model)?;
            info!("wrote volatility model to {}", path.display());
        }
        (Some(_), None) => {
            return Err(AppError::new(
                ErrorKind::Config,
                "--model-json only applies to `market contagion`.",
            ));
        }
        _ => {}
    }

    match &cli.out_dir {
        Some(dir) => write_tables(dir, &output),
        None => print_tables(&output, std::io::stdout().lock()),
    }
}

fn request_from_command(command: Command) -> (TableRequest, Option<std::path::PathBuf>) {
    match command {
        Command::Fx => (TableRequest::Fx, None),
        Command::Spreads(args) => (TableRequest::Spreads { tenors: args.tenors }, None),
        Command::Gdp(args) => (
            TableRequest::Gdp {
                growth: args.growth,
                lag: args.lag,
            },
            None,
        ),
        Command::Inflation => (TableRequest::Inflation, None),
        Command::Market(args) => (TableRequest::Market(args.series), args.model_json),
    }
}

fn write_tables(dir: &Path, output: &PanelOutput) -> Result<(), AppError> {
    fs::create_dir_all(dir).map_err(|e| AppError::from_io(&e, dir))?;
    for table in &output.tables {
        let path = dir.join(format!("{}.csv", table.name));
        write_frame_csv_file(&path, &table.frame)?;
        info!("wrote {} ({} months) to {}", table.name, table.frame.len(), path.display());
    }
    Ok(())
}

/// Print tables as CSV. Several tables are separated by a `# <name>` line.
fn print_tables<W: Write>(output: &PanelOutput, mut out: W) -> Result<(), AppError> {
    let labelled = output.tables.len() > 1;
    for (i, table) in output.tables.iter().enumerate() {
        if labelled {
            if i > 0 {
                writeln!(out).map_err(stdout_error)?;
            }
            writeln!(out, "# {}", table.name).map_err(stdout_error)?;
        }
        write_frame_csv(&mut out, &table.frame)?;
    }
    Ok(())
}

fn stdout_error(e: std::io::Error) -> AppError {
    AppError::new(ErrorKind::Io, format!("Failed to write to stdout: {e}"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::app::pipeline::NamedTable;
    use crate::domain::{Column, MonthlyFrame};

    fn table(name: &str, value: f64) -> NamedTable {
        let jan = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        NamedTable {
            name: name.to_string(),
            frame: MonthlyFrame::new(vec![jan], vec![Column::new("x", vec![Some(value)])]).unwrap(),
        }
    }

    #[test]
    fn single_table_prints_plain_csv() {
        let output = PanelOutput {
            tables: vec![table("fx", 1.0)],
            volatility_model: None,
        };
        let mut buf = Vec::new();
        print_tables(&output, &mut buf).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), "date,x\n2024-01-01,1\n");
    }

    #[test]
    fn several_tables_are_labelled() {
        let output = PanelOutput {
            tables: vec![table("spreads_5", 1.0), table("spreads_10", 2.0)],
            volatility_model: None,
        };
        let mut buf = Vec::new();
        print_tables(&output, &mut buf).unwrap();
        assert_eq!(
            String::from_utf8(buf).unwrap(),
            "# spreads_5\ndate,x\n2024-01-01,1\n\n# spreads_10\ndate,x\n2024-01-01,2\n"
        );
    }

    #[test]
    fn out_dir_gets_one_file_per_table() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested");
        let output = PanelOutput {
            tables: vec![table("spreads_5", 1.0), table("spreads_10", 2.0)],
            volatility_model: None,
        };
        write_tables(&out, &output).unwrap();
        assert!(out.join("spreads_5.csv").is_file());
        assert!(out.join("spreads_10.csv").is_file());
    }
}

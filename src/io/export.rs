//! Write monthly tables as CSV.
//!
//! Layout: a `date` column (ISO `YYYY-MM-DD`, month start) followed by one
//! column per series. Missing values are written as empty cells so the files
//! load back with the same missing-value semantics.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::domain::MonthlyFrame;
use crate::error::{AppError, ErrorKind};

/// Write `frame` as CSV to any writer.
pub fn write_frame_csv<W: Write>(writer: W, frame: &MonthlyFrame) -> Result<(), AppError> {
    let mut out = csv::Writer::from_writer(writer);

    let mut header = Vec::with_capacity(frame.columns().len() + 1);
    header.push("date");
    header.extend(frame.column_names());
    out.write_record(&header).map_err(write_error)?;

    for (row, date) in frame.index().iter().enumerate() {
        let mut record = Vec::with_capacity(header.len());
        record.push(date.format("%Y-%m-%d").to_string());
        for column in frame.columns() {
            record.push(column.values[row].map(|v| v.to_string()).unwrap_or_default());
        }
        out.write_record(&record).map_err(write_error)?;
    }

    out.flush()
        .map_err(|e| AppError::new(ErrorKind::Io, format!("Failed to flush CSV output: {e}")))
}

/// Create (or truncate) `path` and write `frame` into it.
pub fn write_frame_csv_file(path: &Path, frame: &MonthlyFrame) -> Result<(), AppError> {
    let file = File::create(path).map_err(|e| AppError::from_io(&e, path))?;
    write_frame_csv(file, frame)
}

fn write_error(e: csv::Error) -> AppError {
    AppError::new(ErrorKind::Io, format!("Failed to write CSV output: {e}"))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::Column;
    use crate::io::ingest::{NumericParse, RawTable};

    fn sample() -> MonthlyFrame {
        let d = |m| NaiveDate::from_ymd_opt(2024, m, 1).unwrap();
        MonthlyFrame::new(
            vec![d(1), d(2)],
            vec![
                Column::new("eur", vec![Some(1.1), None]),
                Column::new("brl", vec![Some(0.2), Some(0.25)]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn missing_cells_are_empty() {
        let mut buf = Vec::new();
        write_frame_csv(&mut buf, &sample()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "date,eur,brl\n2024-01-01,1.1,0.2\n2024-02-01,,0.25\n");
    }

    #[test]
    fn written_file_reads_back_through_ingest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fx.csv");
        write_frame_csv_file(&path, &sample()).unwrap();

        let obs = RawTable::from_path(&path)
            .unwrap()
            .all_observations("date", NumericParse::Plain)
            .unwrap();
        assert_eq!(obs.columns(), ["eur", "brl"]);
        assert_eq!(obs.column_values("eur").unwrap(), vec![Some(1.1), None]);
    }
}

//! Irregular dated observations as read from a source CSV.
//!
//! An `ObservationTable` is what ingest produces and what monthly
//! normalization consumes. Dates may be daily, weekly or monthly, unsorted,
//! and repeated.

use chrono::NaiveDate;

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    pub date: NaiveDate,
    pub values: Vec<Option<f64>>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationTable {
    columns: Vec<String>,
    rows: Vec<Observation>,
}

impl ObservationTable {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, date: NaiveDate, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.columns.len() {
            return Err(AppError::schema(format!(
                "Observation on {date} has {} values for {} columns.",
                values.len(),
                self.columns.len()
            )));
        }
        self.rows.push(Observation { date, values });
        Ok(())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Observation] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn column_position(&self, name: &str) -> Result<usize, AppError> {
        self.columns
            .iter()
            .position(|c| c == name)
            .ok_or_else(|| AppError::schema(format!("Missing column `{name}`.")))
    }

    pub fn column_values(&self, name: &str) -> Result<Vec<Option<f64>>, AppError> {
        let pos = self.column_position(name)?;
        Ok(self.rows.iter().map(|r| r.values[pos]).collect())
    }

    /// Add a column (or replace an existing one) with one value per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.rows.len() {
            return Err(AppError::schema(format!(
                "Column `{name}` has {} values for {} rows.",
                values.len(),
                self.rows.len()
            )));
        }
        match self.column_position(name) {
            Ok(pos) => {
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values[pos] = v;
                }
            }
            Err(_) => {
                self.columns.push(name.to_string());
                for (row, v) in self.rows.iter_mut().zip(values) {
                    row.values.push(v);
                }
            }
        }
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<(), AppError> {
        let pos = self.column_position(name)?;
        self.columns.remove(pos);
        for row in &mut self.rows {
            row.values.remove(pos);
        }
        Ok(())
    }

    /// Stable sort by date; same-date rows keep their file order.
    pub fn sort_by_date(&mut self) {
        self.rows.sort_by_key(|r| r.date);
    }

    /// Keep only rows where every column has a value.
    pub fn drop_missing_rows(&mut self) {
        self.rows.retain(|r| r.values.iter().all(Option::is_some));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_column_appends_and_replaces() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut t = ObservationTable::new(vec!["a".to_string()]);
        t.push(date, vec![Some(1.0)]).unwrap();

        t.set_column("b", vec![Some(2.0)]).unwrap();
        t.set_column("a", vec![None]).unwrap();

        assert_eq!(t.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(t.rows()[0].values, vec![None, Some(2.0)]);

        t.drop_missing_rows();
        assert!(t.is_empty());
    }

    #[test]
    fn push_rejects_wrong_width() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 5).unwrap();
        let mut t = ObservationTable::new(vec!["a".to_string()]);
        assert!(t.push(date, vec![Some(1.0), Some(2.0)]).is_err());
    }
}

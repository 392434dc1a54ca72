//! `MonthlyFrame`: the month-start indexed table every manager returns.
//!
//! Invariants enforced at construction:
//!
//! - the index is strictly increasing (hence unique)
//! - every index date is the first day of its month
//! - every column has exactly one value per index date
//! - column names are unique
//!
//! Operations return new frames or mutate in place but never break these
//! invariants. Missing values are `None`; see `math::series` for how they
//! propagate through arithmetic.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::calendar::is_month_start;
use crate::error::AppError;
use crate::math::series;

/// A named column of optional values.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Option<f64>>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyFrame {
    index: Vec<NaiveDate>,
    columns: Vec<Column>,
}

impl MonthlyFrame {
    pub fn new(index: Vec<NaiveDate>, columns: Vec<Column>) -> Result<Self, AppError> {
        if let Some(bad) = index.iter().find(|d| !is_month_start(**d)) {
            return Err(AppError::schema(format!("Index date {bad} is not a month start.")));
        }
        if index.windows(2).any(|w| w[0] >= w[1]) {
            return Err(AppError::schema("Monthly index must be strictly increasing."));
        }
        for (i, col) in columns.iter().enumerate() {
            if col.values.len() != index.len() {
                return Err(AppError::schema(format!(
                    "Column `{}` has {} values for an index of {} dates.",
                    col.name,
                    col.values.len(),
                    index.len()
                )));
            }
            if columns[..i].iter().any(|c| c.name == col.name) {
                return Err(AppError::schema(format!("Duplicate column `{}`.", col.name)));
            }
        }
        Ok(Self { index, columns })
    }

    pub fn index(&self) -> &[NaiveDate] {
        &self.index
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Result<&[Option<f64>], AppError> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| AppError::schema(format!("Missing column `{name}`.")))
    }

    /// Row position of `date`, if present in the index.
    pub fn position(&self, date: NaiveDate) -> Option<usize> {
        self.index.binary_search(&date).ok()
    }

    /// Value at (`date`, `name`); `None` when the date, the column or the value is absent.
    pub fn value(&self, date: NaiveDate, name: &str) -> Option<f64> {
        let row = self.position(date)?;
        self.column(name).ok()?.get(row).copied().flatten()
    }

    /// Rename all columns positionally.
    pub fn set_column_names(&mut self, names: &[&str]) -> Result<(), AppError> {
        if names.len() != self.columns.len() {
            return Err(AppError::schema(format!(
                "Expected {} column names, got {}.",
                self.columns.len(),
                names.len()
            )));
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(AppError::schema(format!("Duplicate column `{name}`.")));
            }
        }
        for (col, name) in self.columns.iter_mut().zip(names) {
            col.name = (*name).to_string();
        }
        Ok(())
    }

    /// Add a column, or replace it if one with the same name exists.
    pub fn insert_column(&mut self, name: &str, values: Vec<Option<f64>>) -> Result<(), AppError> {
        if values.len() != self.index.len() {
            return Err(AppError::schema(format!(
                "Column `{name}` has {} values for an index of {} dates.",
                values.len(),
                self.index.len()
            )));
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(col) => col.values = values,
            None => self.columns.push(Column::new(name, values)),
        }
        Ok(())
    }

    /// Apply `f` to every present value of every column.
    pub fn map_values(mut self, f: impl Fn(f64) -> f64) -> Self {
        for col in &mut self.columns {
            for v in &mut col.values {
                *v = v.and_then(|x| series::missing_if_nan(f(x)));
            }
        }
        self
    }

    /// Append `name = a - b`.
    pub fn with_difference(mut self, a: &str, b: &str, name: &str) -> Result<Self, AppError> {
        let values = series::difference(self.column(a)?, self.column(b)?);
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Append `name = a / b`.
    pub fn with_ratio(mut self, a: &str, b: &str, name: &str) -> Result<Self, AppError> {
        let values = series::ratio(self.column(a)?, self.column(b)?);
        self.insert_column(name, values)?;
        Ok(self)
    }

    /// Percent change (×100) of every column over `periods` rows.
    pub fn percent_change(&self, periods: usize) -> Self {
        self.map_columns(|values| series::percent_change(values, periods))
    }

    /// Shift every column forward by `periods` rows; the index is unchanged.
    pub fn shift(&self, periods: usize) -> Self {
        self.map_columns(|values| series::shift(values, periods))
    }

    /// Keep only rows where every column has a value.
    pub fn drop_missing_rows(self) -> Self {
        self.retain_rows(|row| row.iter().all(Option::is_some))
    }

    /// Keep only rows where column `name` has a value.
    pub fn drop_missing_in(self, name: &str) -> Result<Self, AppError> {
        let pos = self
            .columns
            .iter()
            .position(|c| c.name == name)
            .ok_or_else(|| AppError::schema(format!("Missing column `{name}`.")))?;
        Ok(self.retain_rows(|row| row[pos].is_some()))
    }

    /// Outer-join frames column-wise on their date index.
    ///
    /// Dates absent from a frame yield missing values in that frame's columns.
    pub fn concat(frames: &[MonthlyFrame]) -> Result<Self, AppError> {
        let mut index: Vec<NaiveDate> = frames.iter().flat_map(|f| f.index.iter().copied()).collect();
        index.sort();
        index.dedup();

        let positions: BTreeMap<NaiveDate, usize> = index.iter().enumerate().map(|(i, d)| (*d, i)).collect();

        let mut columns = Vec::new();
        for frame in frames {
            for col in &frame.columns {
                let mut values = vec![None; index.len()];
                for (date, v) in frame.index.iter().zip(&col.values) {
                    values[positions[date]] = *v;
                }
                columns.push(Column::new(col.name.clone(), values));
            }
        }

        Self::new(index, columns)
    }

    fn map_columns(&self, f: impl Fn(&[Option<f64>]) -> Vec<Option<f64>>) -> Self {
        Self {
            index: self.index.clone(),
            columns: self
                .columns
                .iter()
                .map(|c| Column::new(c.name.clone(), f(&c.values)))
                .collect(),
        }
    }

    fn retain_rows(self, keep: impl Fn(&[Option<f64>]) -> bool) -> Self {
        let mut index = Vec::with_capacity(self.index.len());
        let mut columns: Vec<Column> = self
            .columns
            .iter()
            .map(|c| Column::new(c.name.clone(), Vec::new()))
            .collect();

        let mut row = Vec::with_capacity(self.columns.len());
        for (i, date) in self.index.iter().enumerate() {
            row.clear();
            row.extend(self.columns.iter().map(|c| c.values[i]));
            if keep(&row) {
                index.push(*date);
                for (col, v) in columns.iter_mut().zip(&row) {
                    col.values.push(*v);
                }
            }
        }

        Self { index, columns }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn frame(dates: &[NaiveDate], name: &str, values: &[Option<f64>]) -> MonthlyFrame {
        MonthlyFrame::new(dates.to_vec(), vec![Column::new(name, values.to_vec())]).unwrap()
    }

    #[test]
    fn rejects_non_month_start_index() {
        let err = MonthlyFrame::new(vec![NaiveDate::from_ymd_opt(2024, 1, 2).unwrap()], vec![]).unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Schema);
    }

    #[test]
    fn concat_is_an_outer_join() {
        let a = frame(&[d(2024, 1), d(2024, 2)], "a", &[Some(1.0), Some(2.0)]);
        let b = frame(&[d(2024, 2), d(2024, 3)], "b", &[Some(20.0), Some(30.0)]);
        let joined = MonthlyFrame::concat(&[a, b]).unwrap();

        assert_eq!(joined.index(), &[d(2024, 1), d(2024, 2), d(2024, 3)]);
        assert_eq!(joined.column("a").unwrap(), &[Some(1.0), Some(2.0), None]);
        assert_eq!(joined.column("b").unwrap(), &[None, Some(20.0), Some(30.0)]);

        let inner = joined.drop_missing_rows();
        assert_eq!(inner.index(), &[d(2024, 2)]);
    }

    #[test]
    fn concat_rejects_duplicate_columns() {
        let a = frame(&[d(2024, 1)], "x", &[Some(1.0)]);
        let b = frame(&[d(2024, 1)], "x", &[Some(2.0)]);
        assert!(MonthlyFrame::concat(&[a, b]).is_err());
    }

    #[test]
    fn missing_column_is_a_schema_error() {
        let f = frame(&[d(2024, 1)], "x", &[Some(1.0)]);
        let err = f.with_difference("x", "y", "diff").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Schema);
    }

    #[test]
    fn difference_and_ratio_append_columns() {
        let f = MonthlyFrame::new(
            vec![d(2024, 1)],
            vec![Column::new("a", vec![Some(100.0)]), Column::new("b", vec![Some(80.0)])],
        )
        .unwrap()
        .with_difference("a", "b", "diff")
        .unwrap()
        .with_ratio("a", "b", "ratio")
        .unwrap();

        assert_eq!(f.value(d(2024, 1), "diff"), Some(20.0));
        assert_eq!(f.value(d(2024, 1), "ratio"), Some(1.25));
        assert_eq!(f.column_names(), vec!["a", "b", "diff", "ratio"]);
    }

    #[test]
    fn shift_keeps_index_and_moves_values() {
        let f = frame(&[d(2024, 1), d(2024, 2), d(2024, 3)], "x", &[Some(1.0), Some(2.0), Some(3.0)]);
        let s = f.shift(1);
        assert_eq!(s.index(), f.index());
        assert_eq!(s.column("x").unwrap(), &[None, Some(1.0), Some(2.0)]);
    }
}

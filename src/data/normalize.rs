//! Monthly normalization: irregular observations → one row per calendar month.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::calendar::{month_range, month_start};
use crate::domain::{Column, MonthlyFrame, ObservationTable};
use crate::error::AppError;
use crate::math::series::mean_present;

/// Resample to month-start frequency using the arithmetic mean.
///
/// Each observation is assigned to the first day of its month. The output has
/// one row for every month between the first and last observed month; a
/// month whose observations are all missing (or that has none) is missing,
/// not an error. An empty table yields an empty frame.
pub fn monthly_mean(table: &ObservationTable) -> Result<MonthlyFrame, AppError> {
    let n_cols = table.columns().len();

    let mut buckets: BTreeMap<NaiveDate, Vec<Vec<Option<f64>>>> = BTreeMap::new();
    for row in table.rows() {
        let cells = buckets
            .entry(month_start(row.date))
            .or_insert_with(|| vec![Vec::new(); n_cols]);
        for (cell, v) in cells.iter_mut().zip(&row.values) {
            cell.push(*v);
        }
    }

    let index = match (buckets.keys().next(), buckets.keys().next_back()) {
        (Some(first), Some(last)) => month_range(*first, *last),
        _ => Vec::new(),
    };

    let columns = table
        .columns()
        .iter()
        .enumerate()
        .map(|(c, name)| {
            let values = index
                .iter()
                .map(|month| buckets.get(month).and_then(|cells| mean_present(&cells[c])))
                .collect();
            Column::new(name.clone(), values)
        })
        .collect();

    MonthlyFrame::new(index, columns)
}

//! Month-start calendar arithmetic.

use chrono::{Datelike, Days, Months, NaiveDate};

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date - Days::new(u64::from(date.day0()))
}

pub fn is_month_start(date: NaiveDate) -> bool {
    date.day() == 1
}

/// Shift a date by `n` calendar months (negative moves backwards).
pub fn add_months(date: NaiveDate, n: i32) -> Option<NaiveDate> {
    if n >= 0 {
        date.checked_add_months(Months::new(n.unsigned_abs()))
    } else {
        date.checked_sub_months(Months::new(n.unsigned_abs()))
    }
}

/// Every month start from `first` to `last` inclusive.
pub fn month_range(first: NaiveDate, last: NaiveDate) -> Vec<NaiveDate> {
    let mut out = Vec::new();
    let mut cur = month_start(first);
    let last = month_start(last);
    while cur <= last {
        out.push(cur);
        match add_months(cur, 1) {
            Some(next) => cur = next,
            None => break,
        }
    }
    out
}

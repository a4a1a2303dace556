use chrono::{NaiveDate, TimeDelta};

use crate::error::StockChartError;

/// Unit keywords in matching order with their length in days.
const UNITS: [(&str, i64); 4] = [("year", 365), ("month", 30), ("week", 7), ("day", 1)];

/// Turns a relative period such as `"3 months"` into the date that many
/// days before `reference`. Units are matched by substring, so `"2 years ago"`
/// is a valid period. Months are 30 days and years 365.
pub fn resolve(period: &str, reference: NaiveDate) -> Result<NaiveDate, StockChartError> {
    let (_, unit_days) = UNITS
        .iter()
        .find(|(unit, _)| period.contains(unit))
        .ok_or(StockChartError::InvalidPeriod)?;

    let count: i64 = period
        .split_whitespace()
        .next()
        .and_then(|token| token.parse().ok())
        .ok_or(StockChartError::InvalidPeriod)?;

    count
        .checked_mul(*unit_days)
        .and_then(TimeDelta::try_days)
        .and_then(|delta| reference.checked_sub_signed(delta))
        .ok_or(StockChartError::InvalidPeriod)
}

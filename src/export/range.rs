use crate::errors::{AppError, AppResult};
use chrono::{Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Which shifts a timesheet or listing covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The last 7 days up to today.
    Week,
    /// One calendar month back from today.
    Month,
    All,
    /// Inclusive date range.
    Range(NaiveDate, NaiveDate),
}

impl Period {
    /// Inclusive `(start, end)` bounds; `None` means unbounded.
    pub fn bounds(&self, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
        match self {
            Period::Week => (Some(today - Duration::days(7)), Some(today)),
            Period::Month => (
                Some(today.checked_sub_months(Months::new(1)).unwrap_or(today)),
                Some(today),
            ),
            Period::All => (None, None),
            Period::Range(start, end) => (Some(*start), Some(*end)),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Period::Week => "Last 7 Days".to_string(),
            Period::Month => "Last Month".to_string(),
            Period::All => "All Time".to_string(),
            Period::Range(start, end) if start == end => start.to_string(),
            Period::Range(start, end) => format!("{start} to {end}"),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Period {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "all" => Ok(Period::All),
            other => {
                let (start, end) = parse_range(other)?;
                Ok(Period::Range(start, end))
            }
        }
    }
}

fn range_err(msg: impl Into<String>) -> AppError {
    AppError::InvalidDate(msg.into())
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    first.checked_add_months(Months::new(1))?.pred_opt()
}

/// First and last day covered by one bound: `YYYY`, `YYYY-MM` or `YYYY-MM-DD`.
fn parse_bound(raw: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    let raw = raw.trim();
    match raw.len() {
        4 => {
            let year: i32 = raw.parse().map_err(|_| range_err(format!("invalid year: {raw}")))?;
            let first = NaiveDate::from_ymd_opt(year, 1, 1);
            let last = NaiveDate::from_ymd_opt(year, 12, 31);
            first
                .zip(last)
                .ok_or_else(|| range_err(format!("invalid year: {raw}")))
        }
        7 => {
            let (y, m) = raw
                .split_once('-')
                .ok_or_else(|| range_err(format!("invalid month: {raw}")))?;
            let year: i32 = y.parse().map_err(|_| range_err(format!("invalid month: {raw}")))?;
            let month: u32 = m.parse().map_err(|_| range_err(format!("invalid month: {raw}")))?;
            let first = NaiveDate::from_ymd_opt(year, month, 1);
            let last = last_day_of_month(year, month);
            first
                .zip(last)
                .ok_or_else(|| range_err(format!("invalid month: {raw}")))
        }
        10 => {
            let d = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| range_err(format!("invalid date: {raw}")))?;
            Ok((d, d))
        }
        _ => Err(range_err(format!("unsupported range format: {raw}"))),
    }
}

/// Parse a range expression.
///
/// Accepted forms:
/// - `YYYY`, `YYYY-MM`, `YYYY-MM-DD`
/// - `A:B` where both sides use the same one of those forms
pub fn parse_range(r: &str) -> AppResult<(NaiveDate, NaiveDate)> {
    match r.split_once(':') {
        Some((start, end)) => {
            if start.trim().len() != end.trim().len() {
                return Err(range_err("start and end must have same format"));
            }
            let (first, _) = parse_bound(start)?;
            let (_, last) = parse_bound(end)?;
            if last < first {
                return Err(range_err(format!("range ends before it starts: {r}")));
            }
            Ok((first, last))
        }
        None => parse_bound(r),
    }
}

use crate::errors::{AppError, AppResult};
use chrono::{Datelike, NaiveDate};

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

pub fn parse_date(s: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(s.to_string()))
}

/// `YYYY-MM` to `(year, month)`.
pub fn parse_month(s: &str) -> AppResult<(i32, u32)> {
    let first = NaiveDate::parse_from_str(&format!("{}-01", s.trim()), "%Y-%m-%d")
        .map_err(|_| AppError::InvalidDate(s.to_string()))?;
    Ok((first.year(), first.month()))
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dates_and_months() {
        assert_eq!(
            parse_date("2025-05-09").unwrap(),
            NaiveDate::from_ymd_opt(2025, 5, 9).unwrap()
        );
        assert!(parse_date("09/05/2025").is_err());
        assert_eq!(parse_month("2025-02").unwrap(), (2025, 2));
        assert!(parse_month("2025-13").is_err());
        assert_eq!(month_name(2), "February");
    }
}

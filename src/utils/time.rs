//! Time-of-day parsing and duration display.

use crate::errors::{AppError, AppResult};
use chrono::NaiveTime;

/// Accepts `HH:MM` (24h).
pub fn parse_time(t: &str) -> AppResult<NaiveTime> {
    NaiveTime::parse_from_str(t.trim(), "%H:%M").map_err(|_| AppError::InvalidTime(t.to_string()))
}

pub fn parse_optional_time(input: Option<&str>) -> AppResult<Option<NaiveTime>> {
    input.map(parse_time).transpose()
}

/// Fractional hours as `7h 30m`.
pub fn format_hours(hours: f64) -> String {
    let mins = (hours * 60.0).round() as i64;
    crate::utils::mins2readable(mins, false, false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_and_format() {
        assert_eq!(parse_time("09:30").unwrap(), NaiveTime::from_hms_opt(9, 30, 0).unwrap());
        assert!(parse_time("9.30").is_err());
        assert_eq!(parse_optional_time(None).unwrap(), None);
        assert_eq!(format_hours(7.5), "07h 30m");
    }
}

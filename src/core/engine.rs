//! Shift time and earnings computation.
//!
//! Everything here is synchronous and side-effect free: the same inputs
//! always produce the same totals.

use crate::errors::{AppError, AppResult};
use crate::models::shift::Break;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShiftTotals {
    pub total_hours: f64,
    pub earnings: f64,
}

/// Accept a rate or goal only when it is a finite amount above zero.
pub fn positive_amount(value: f64, what: &str) -> AppResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(AppError::InvalidSetting(format!(
            "{what} must be greater than zero"
        )))
    }
}

/// Round to 2 decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Sum of closed breaks in (fractional) minutes. Open breaks are ignored.
pub fn break_minutes(breaks: &[Break]) -> f64 {
    breaks
        .iter()
        .filter_map(Break::duration_seconds)
        .map(|secs| secs as f64 / 60.0)
        .sum()
}

/// Worked hours and earnings for a finished shift.
///
/// `clock_out` must be strictly after `clock_in`; a net duration below zero
/// (breaks longer than the shift) is rejected.
pub fn compute_shift(
    clock_in: DateTime<Local>,
    clock_out: DateTime<Local>,
    breaks: &[Break],
    hourly_rate: f64,
) -> AppResult<ShiftTotals> {
    if clock_out <= clock_in {
        return Err(AppError::InvalidShift(
            "Clock out time must be after clock in time".into(),
        ));
    }

    let gross_minutes = (clock_out - clock_in).num_seconds() as f64 / 60.0;
    let net_minutes = gross_minutes - break_minutes(breaks);

    if net_minutes < 0.0 {
        return Err(AppError::InvalidShift(
            "Shift duration cannot be negative".into(),
        ));
    }

    let total_hours = round2(net_minutes / 60.0);
    let earnings = round2(total_hours * hourly_rate);

    Ok(ShiftTotals {
        total_hours,
        earnings,
    })
}

/// Resolve a naive wall-clock time in the local timezone.
pub fn local_datetime(naive: NaiveDateTime) -> AppResult<DateTime<Local>> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| AppError::InvalidTime(naive.format("%Y-%m-%d %H:%M").to_string()))
}

/// Clock-in/out instants for a manually entered shift.
///
/// A clock-out time earlier than the clock-in time means the shift ran past
/// midnight: clock-out moves to the next calendar day. Equal times are
/// rejected. Only the manual entry flow rolls over; live sessions always
/// use real timestamps.
pub fn manual_clock_times(
    date: NaiveDate,
    clock_in: NaiveTime,
    clock_out: NaiveTime,
) -> AppResult<(DateTime<Local>, DateTime<Local>)> {
    if clock_out == clock_in {
        return Err(AppError::InvalidShift(
            "Clock out time must be after clock in time".into(),
        ));
    }

    let out_date = if clock_out < clock_in {
        date.succ_opt()
            .ok_or_else(|| AppError::InvalidDate(date.to_string()))?
    } else {
        date
    };

    let start = local_datetime(date.and_time(clock_in))?;
    let end = local_datetime(out_date.and_time(clock_out))?;
    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn amounts_must_be_finite_and_positive() {
        assert_eq!(positive_amount(12.5, "Rate").unwrap(), 12.5);
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            assert!(matches!(
                positive_amount(bad, "Rate"),
                Err(AppError::InvalidSetting(_))
            ));
        }
    }

    fn at(d: u32, h: u32, m: u32) -> DateTime<Local> {
        let naive = NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap();
        local_datetime(naive).unwrap()
    }

    fn hm(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn full_day_with_lunch_break() {
        let breaks = [Break::closed(at(10, 12, 0), at(10, 12, 30))];
        let totals = compute_shift(at(10, 9, 0), at(10, 17, 0), &breaks, 20.0).unwrap();

        assert_eq!(totals.total_hours, 7.5);
        assert_eq!(totals.earnings, 150.0);
    }

    #[test]
    fn no_breaks_counts_gross_time() {
        let totals = compute_shift(at(10, 8, 15), at(10, 12, 35), &[], 18.0).unwrap();
        // 4h20m = 4.333.. -> 4.33
        assert_eq!(totals.total_hours, 4.33);
        assert_eq!(totals.earnings, round2(4.33 * 18.0));
    }

    #[test]
    fn open_breaks_are_ignored() {
        let breaks = [
            Break::closed(at(10, 10, 0), at(10, 10, 15)),
            Break::open(at(10, 11, 0)),
        ];
        let totals = compute_shift(at(10, 9, 0), at(10, 13, 0), &breaks, 10.0).unwrap();
        assert_eq!(totals.total_hours, 3.75);
        assert_eq!(totals.earnings, 37.5);
    }

    #[test]
    fn computing_twice_gives_same_result() {
        let breaks = [Break::closed(at(10, 12, 0), at(10, 12, 45))];
        let a = compute_shift(at(10, 9, 7), at(10, 16, 52), &breaks, 17.35).unwrap();
        let b = compute_shift(at(10, 9, 7), at(10, 16, 52), &breaks, 17.35).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn clock_out_before_clock_in_is_rejected() {
        let err = compute_shift(at(10, 17, 0), at(10, 9, 0), &[], 20.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidShift(_)));

        let err = compute_shift(at(10, 9, 0), at(10, 9, 0), &[], 20.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidShift(_)));
    }

    #[test]
    fn breaks_longer_than_shift_are_rejected() {
        let breaks = [Break::closed(at(10, 9, 0), at(10, 11, 0))];
        let err = compute_shift(at(10, 9, 0), at(10, 10, 0), &breaks, 20.0).unwrap_err();
        assert!(matches!(err, AppError::InvalidShift(_)));
    }

    #[test]
    fn overnight_manual_entry_rolls_over() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (start, end) = manual_clock_times(date, hm(22, 0), hm(6, 0)).unwrap();

        assert_eq!(start, at(10, 22, 0));
        assert_eq!(end, at(11, 6, 0));

        let totals = compute_shift(start, end, &[], 15.0).unwrap();
        assert_eq!(totals.total_hours, 8.0);
        assert_eq!(totals.earnings, 120.0);
    }

    #[test]
    fn manual_entry_same_day_does_not_roll_over() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let (start, end) = manual_clock_times(date, hm(9, 0), hm(17, 0)).unwrap();
        assert_eq!(start.date_naive(), end.date_naive());
    }

    #[test]
    fn manual_entry_equal_times_rejected() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        assert!(manual_clock_times(date, hm(9, 0), hm(9, 0)).is_err());
    }
}

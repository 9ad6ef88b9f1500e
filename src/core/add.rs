use crate::core::engine::{compute_shift, manual_clock_times};
use crate::errors::{AppError, AppResult};
use crate::models::shift::{Break, Shift};
use chrono::{Duration, NaiveDate, NaiveTime};

/// A shift typed in after the fact ("forgot to clock in/out").
#[derive(Debug, Clone, PartialEq)]
pub struct ManualEntry {
    pub date: NaiveDate,
    pub clock_in: NaiveTime,
    pub clock_out: NaiveTime,
    pub break_minutes: u32,
}

/// Validation and construction for manually added shifts.
pub struct AddLogic;

impl AddLogic {
    /// Build a new shift from a manual entry.
    ///
    /// Rejects, in this order: equal in/out times, future dates, a
    /// non-positive worked duration, and a date that already has a shift.
    pub fn build(
        existing: &[Shift],
        entry: &ManualEntry,
        hourly_rate: f64,
        today: NaiveDate,
    ) -> AppResult<Shift> {
        let (clock_in, clock_out) =
            manual_clock_times(entry.date, entry.clock_in, entry.clock_out)?;

        if entry.date > today {
            return Err(AppError::FutureShift(entry.date));
        }

        let breaks = manual_breaks(clock_in, entry.break_minutes);
        let totals = compute_shift(clock_in, clock_out, &breaks, hourly_rate)?;

        if totals.total_hours <= 0.0 {
            return Err(AppError::InvalidShift(
                "Shift duration must be positive".into(),
            ));
        }

        if existing.iter().any(|s| s.date == entry.date) {
            return Err(AppError::DuplicateShift(entry.date));
        }

        Ok(Shift {
            id: Shift::new_id(),
            date: entry.date,
            clock_in,
            clock_out: Some(clock_out),
            breaks,
            total_hours: totals.total_hours,
            hourly_rate,
            earnings: totals.earnings,
        })
    }
}

/// A manual break is recorded as one closed interval starting at clock-in.
pub(crate) fn manual_breaks(
    clock_in: chrono::DateTime<chrono::Local>,
    minutes: u32,
) -> Vec<Break> {
    if minutes == 0 {
        return Vec::new();
    }
    vec![Break::closed(
        clock_in,
        clock_in + Duration::minutes(i64::from(minutes)),
    )]
}

use crate::core::add::manual_breaks;
use crate::core::engine::{compute_shift, manual_clock_times, positive_amount};
use crate::errors::{AppError, AppResult};
use crate::models::shift::Shift;
use chrono::{NaiveDate, NaiveTime};

/// Fields a user may change on an existing shift. `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShiftPatch {
    pub date: Option<NaiveDate>,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub break_minutes: Option<u32>,
    pub hourly_rate: Option<f64>,
}

impl ShiftPatch {
    fn moves_times(&self) -> bool {
        self.date.is_some() || self.clock_in.is_some() || self.clock_out.is_some()
    }
}

pub struct EditLogic;

impl EditLogic {
    /// Apply `patch` to the shift `id`, recomputing hours and earnings.
    ///
    /// When the date or times move and no break length is given, the previous
    /// total break time is kept as a single break starting at clock-in.
    pub fn apply(
        existing: &[Shift],
        id: &str,
        patch: &ShiftPatch,
        today: NaiveDate,
    ) -> AppResult<Shift> {
        let current = existing
            .iter()
            .find(|s| s.id == id)
            .ok_or_else(|| AppError::ShiftNotFound(id.to_string()))?;

        let current_out = current
            .clock_out
            .ok_or_else(|| AppError::InvalidShift("Shift has no clock out time".into()))?;

        if let Some(rate) = patch.hourly_rate {
            positive_amount(rate, "Hourly rate")?;
        }

        let date = patch.date.unwrap_or(current.date);
        let hourly_rate = patch.hourly_rate.unwrap_or(current.hourly_rate);

        let (clock_in, clock_out) = if patch.moves_times() {
            manual_clock_times(
                date,
                patch.clock_in.unwrap_or(current.clock_in.time()),
                patch.clock_out.unwrap_or(current_out.time()),
            )?
        } else {
            (current.clock_in, current_out)
        };

        if date > today {
            return Err(AppError::FutureShift(date));
        }

        let breaks = match patch.break_minutes {
            Some(minutes) => manual_breaks(clock_in, minutes),
            None if patch.moves_times() => {
                manual_breaks(clock_in, current.break_minutes().max(0) as u32)
            }
            None => current.breaks.clone(),
        };

        let totals = compute_shift(clock_in, clock_out, &breaks, hourly_rate)?;
        if totals.total_hours <= 0.0 {
            return Err(AppError::InvalidShift(
                "Shift duration must be positive".into(),
            ));
        }

        if existing.iter().any(|s| s.id != id && s.date == date) {
            return Err(AppError::DuplicateShift(date));
        }

        Ok(Shift {
            id: current.id.clone(),
            date,
            clock_in,
            clock_out: Some(clock_out),
            breaks,
            total_hours: totals.total_hours,
            hourly_rate,
            earnings: totals.earnings,
        })
    }
}

use crate::core::engine::round2;
use crate::models::shift::Shift;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

/// Aggregate hours and earnings over a set of shifts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub shifts: usize,
    pub total_hours: f64,
    pub total_earnings: f64,
}

impl PeriodTotals {
    pub fn from_shifts<'a, I>(shifts: I) -> Self
    where
        I: IntoIterator<Item = &'a Shift>,
    {
        let mut out = PeriodTotals::default();
        for s in shifts {
            out.shifts += 1;
            out.total_hours += s.total_hours;
            out.total_earnings += s.earnings;
        }
        out.total_hours = round2(out.total_hours);
        out.total_earnings = round2(out.total_earnings);
        out
    }
}

/// Progress towards the monthly earnings goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthSummary {
    pub year: i32,
    pub month: u32,
    pub goal: f64,
    pub earned: f64,
    pub total_hours: f64,
    pub shifts_worked: usize,
    /// Rounded to the nearest whole percent; may exceed 100.
    pub progress_percent: u32,
    /// Never negative once the goal is reached.
    pub remaining: f64,
    pub average_per_shift: f64,
}

impl MonthSummary {
    pub fn goal_reached(&self) -> bool {
        self.earned >= self.goal
    }
}

pub fn month_summary(shifts: &[Shift], year: i32, month: u32, goal: f64) -> MonthSummary {
    let totals = PeriodTotals::from_shifts(
        shifts
            .iter()
            .filter(|s| s.date.year() == year && s.date.month() == month),
    );

    let progress_percent = if goal > 0.0 {
        (totals.total_earnings / goal * 100.0).round().max(0.0) as u32
    } else {
        0
    };

    let average_per_shift = if totals.shifts > 0 {
        round2(totals.total_earnings / totals.shifts as f64)
    } else {
        0.0
    };

    MonthSummary {
        year,
        month,
        goal,
        earned: totals.total_earnings,
        total_hours: totals.total_hours,
        shifts_worked: totals.shifts,
        progress_percent,
        remaining: round2((goal - totals.total_earnings).max(0.0)),
        average_per_shift,
    }
}

/// Shifts whose date falls in `[start, end]`, newest first.
pub fn shifts_between(
    shifts: &[Shift],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<Shift> {
    let mut out: Vec<Shift> = shifts
        .iter()
        .filter(|s| start.is_none_or(|d| s.date >= d) && end.is_none_or(|d| s.date <= d))
        .cloned()
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date).then(b.clock_in.cmp(&a.clock_in)));
    out
}

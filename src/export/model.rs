use crate::core::summary::{PeriodTotals, shifts_between};
use crate::export::range::Period;
use crate::models::shift::Shift;
use chrono::NaiveDate;
use serde::Serialize;

/// One line of the timesheet.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct TimesheetRow {
    pub date: String,
    pub clock_in: String,
    pub clock_out: String,
    pub hours: f64,
    pub rate: f64,
    pub earnings: f64,
}

impl From<&Shift> for TimesheetRow {
    fn from(s: &Shift) -> Self {
        Self {
            date: s.date_str(),
            clock_in: s.clock_in_str(),
            clock_out: s.clock_out_str(),
            hours: s.total_hours,
            rate: s.hourly_rate,
            earnings: s.earnings,
        }
    }
}

/// Shifts of a period with their totals, oldest first.
#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct Timesheet {
    pub title: String,
    pub period: String,
    pub generated_on: NaiveDate,
    pub rows: Vec<TimesheetRow>,
    pub total_hours: f64,
    pub total_earnings: f64,
}

impl Timesheet {
    pub fn build(shifts: &[Shift], period: &Period, today: NaiveDate) -> Self {
        let (start, end) = period.bounds(today);
        let mut selected = shifts_between(shifts, start, end);
        selected.reverse();

        let totals = PeriodTotals::from_shifts(&selected);

        Self {
            title: "Timesheet".to_string(),
            period: period.label(),
            generated_on: today,
            rows: selected.iter().map(TimesheetRow::from).collect(),
            total_hours: totals.total_hours,
            total_earnings: totals.total_earnings,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// CSV column names, matching the serialized row fields.
pub(crate) fn get_headers() -> [&'static str; 6] {
    ["date", "clock_in", "clock_out", "hours", "rate", "earnings"]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::add::{AddLogic, ManualEntry};
    use chrono::NaiveTime;

    fn shift(day: u32, hours: u32) -> Shift {
        AddLogic::build(
            &[],
            &ManualEntry {
                date: NaiveDate::from_ymd_opt(2025, 5, day).unwrap(),
                clock_in: NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
                clock_out: NaiveTime::from_hms_opt(9 + hours, 0, 0).unwrap(),
                break_minutes: 0,
            },
            20.0,
            NaiveDate::from_ymd_opt(2025, 5, 31).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn week_selection_with_totals() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let shifts = vec![shift(19, 8), shift(2, 4), shift(14, 6)];

        let sheet = Timesheet::build(&shifts, &Period::Week, today);

        let dates: Vec<&str> = sheet.rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(dates, vec!["2025-05-14", "2025-05-19"]);
        assert_eq!(sheet.total_hours, 14.0);
        assert_eq!(sheet.total_earnings, 280.0);
        assert_eq!(sheet.period, "Last 7 Days");
        assert_eq!(sheet.rows[0].clock_in, "09:00");
        assert_eq!(sheet.rows[0].clock_out, "15:00");
    }

    #[test]
    fn empty_selection() {
        let today = NaiveDate::from_ymd_opt(2025, 5, 20).unwrap();
        let sheet = Timesheet::build(&[shift(2, 4)], &Period::Week, today);
        assert!(sheet.is_empty());
        assert_eq!(sheet.total_earnings, 0.0);
    }
}

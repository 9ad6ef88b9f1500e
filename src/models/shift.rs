use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

/// A paused interval inside a shift. `end` stays `None` while the break is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Break {
    pub start: DateTime<Local>,
    pub end: Option<DateTime<Local>>,
}

impl Break {
    pub fn open(start: DateTime<Local>) -> Self {
        Self { start, end: None }
    }

    pub fn closed(start: DateTime<Local>, end: DateTime<Local>) -> Self {
        Self {
            start,
            end: Some(end),
        }
    }

    pub fn is_open(&self) -> bool {
        self.end.is_none()
    }

    /// Length in seconds, `None` while the break is still open.
    pub fn duration_seconds(&self) -> Option<i64> {
        self.end.map(|end| (end - self.start).num_seconds())
    }
}

/// A persisted work session.
///
/// `total_hours` and `earnings` are derived at clock-out (or on manual
/// entry/edit) and stored; `hourly_rate` is the rate that was in effect at
/// that moment and never follows later rate changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Shift {
    pub id: String,
    pub date: NaiveDate,
    pub clock_in: DateTime<Local>,
    pub clock_out: Option<DateTime<Local>>,
    #[serde(default)]
    pub breaks: Vec<Break>,
    pub total_hours: f64,
    pub hourly_rate: f64,
    pub earnings: f64,
}

impl Shift {
    pub fn new_id() -> String {
        format!("shift-{}", uuid::Uuid::new_v4())
    }

    pub fn date_str(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }

    pub fn clock_in_str(&self) -> String {
        self.clock_in.format("%H:%M").to_string()
    }

    pub fn clock_out_str(&self) -> String {
        self.clock_out
            .map(|t| t.format("%H:%M").to_string())
            .unwrap_or_else(|| "--:--".to_string())
    }

    /// Sum of closed break lengths, in whole minutes.
    pub fn break_minutes(&self) -> i64 {
        self.breaks
            .iter()
            .filter_map(Break::duration_seconds)
            .sum::<i64>()
            / 60
    }
}

/// A change to the shifts collection, mirrored to the remote store.
#[derive(Debug, Clone, PartialEq)]
pub enum ShiftChange {
    Insert(Shift),
    Update(Shift),
    Delete(String),
}

use super::shift::Break;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Status {
    #[default]
    Idle,
    ClockedIn,
    OnBreak,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Idle => "idle",
            Status::ClockedIn => "clocked-in",
            Status::OnBreak => "on-break",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// In-progress shift. Consumed at clock-out, then cleared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub status: Status,
    pub clock_in_time: Option<DateTime<Local>>,
    pub current_breaks: Vec<Break>,
}

impl SessionState {
    pub fn open_break(&self) -> Option<&Break> {
        self.current_breaks.last().filter(|b| b.is_open())
    }
}

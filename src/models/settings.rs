use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

pub const DEFAULT_HOURLY_RATE: f64 = 15.0;
pub const DEFAULT_MONTHLY_GOAL: f64 = 1000.0;

/// Per-user settings singleton. Created lazily with these defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub hourly_rate: f64,
    pub monthly_goal: f64,
    pub work_start_time: NaiveTime,
    pub work_end_time: NaiveTime,
    pub notifications_enabled: bool,
    pub auto_clock_out: bool,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            hourly_rate: DEFAULT_HOURLY_RATE,
            monthly_goal: DEFAULT_MONTHLY_GOAL,
            work_start_time: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
            work_end_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap_or_default(),
            notifications_enabled: true,
            auto_clock_out: false,
        }
    }
}

impl UserSettings {
    pub fn apply(&self, patch: &SettingsPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.hourly_rate {
            next.hourly_rate = v;
        }
        if let Some(v) = patch.monthly_goal {
            next.monthly_goal = v;
        }
        if let Some(v) = patch.work_start_time {
            next.work_start_time = v;
        }
        if let Some(v) = patch.work_end_time {
            next.work_end_time = v;
        }
        if let Some(v) = patch.notifications_enabled {
            next.notifications_enabled = v;
        }
        if let Some(v) = patch.auto_clock_out {
            next.auto_clock_out = v;
        }
        next
    }
}

/// Partial update: only the supplied fields are written, locally and remotely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hourly_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monthly_goal: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_start_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub work_end_time: Option<NaiveTime>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_clock_out: Option<bool>,
}

impl SettingsPatch {
    pub fn is_empty(&self) -> bool {
        self == &SettingsPatch::default()
    }
}

//! ANSI color helpers for terminal output.

use crate::models::session::Status;

pub const RESET: &str = "\x1b[0m";
pub const GREY: &str = "\x1b[90m";
pub const RED: &str = "\x1b[31m";
pub const GREEN: &str = "\x1b[32m";
pub const YELLOW: &str = "\x1b[33m";
pub const CYAN: &str = "\x1b[36m";

pub fn color_for_status(status: Status) -> &'static str {
    match status {
        Status::Idle => GREY,
        Status::ClockedIn => GREEN,
        Status::OnBreak => YELLOW,
    }
}

/// Red below half the goal, yellow below the goal, green once reached.
pub fn color_for_progress(percent: u32) -> &'static str {
    match percent {
        0..50 => RED,
        50..100 => YELLOW,
        _ => GREEN,
    }
}

/// Grey out placeholders such as `--:--`.
pub fn colorize_optional(value: &str) -> String {
    if value.trim().is_empty() || value.trim() == "--:--" {
        format!("{GREY}{value}{RESET}")
    } else {
        value.to_string()
    }
}

pub fn paint(color: &str, value: &str) -> String {
    format!("{color}{value}{RESET}")
}

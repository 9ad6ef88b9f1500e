//! Formatting utilities used for CLI and export outputs.

use unicode_width::UnicodeWidthStr;

pub fn bold(s: &str) -> String {
    format!("\x1b[1m{}\x1b[0m", s)
}

/// Pad to `width` terminal columns (wide characters count double).
pub fn pad_right(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{s}{}", " ".repeat(width.saturating_sub(w)))
}

pub fn pad_left(s: &str, width: usize) -> String {
    let w = UnicodeWidthStr::width(s);
    format!("{}{s}", " ".repeat(width.saturating_sub(w)))
}

pub fn mins2readable(mins: i64, want_sign: bool, short: bool) -> String {
    let abs_m = mins.abs();
    let hours = abs_m / 60;
    let minutes = abs_m % 60;

    let sign = match (want_sign, mins.signum()) {
        (true, 1) => "+",
        (true, -1) => "-",
        _ => "",
    };

    if short {
        format!("{}{:02}:{:02}", sign, hours, minutes)
    } else {
        format!("{}{:02}h {:02}m", sign, hours, minutes)
    }
}

pub fn format_money(amount: f64, currency: &str) -> String {
    if amount < 0.0 {
        format!("-{currency}{:.2}", amount.abs())
    } else {
        format!("{currency}{amount:.2}")
    }
}

/// Text progress bar, e.g. `[#####-----]`.
pub fn progress_bar(percent: u32, width: usize) -> String {
    let filled = ((percent.min(100) as usize) * width).div_ceil(100).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

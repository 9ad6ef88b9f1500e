use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::ui::messages::{header, success};
use crate::utils::colors::{color_for_progress, paint};
use crate::utils::date::{self, month_name, parse_month};
use crate::utils::formatting::progress_bar;
use chrono::Datelike;

/// Handle the `summary` command
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Summary { month } = cmd {
        let (year, month) = match month {
            Some(m) => parse_month(m)?,
            None => {
                let today = date::today();
                (today.year(), today.month())
            }
        };

        let s = ctx.app.month_summary(year, month);

        header(format!("{} {}", month_name(s.month), s.year));
        println!(
            "{} {}%",
            paint(
                color_for_progress(s.progress_percent),
                &progress_bar(s.progress_percent, 30)
            ),
            s.progress_percent
        );
        println!("Earned        : {}", ctx.money(s.earned));
        println!("Goal          : {}", ctx.money(s.goal));
        println!("Remaining     : {}", ctx.money(s.remaining));
        println!("Hours worked  : {:.2}", s.total_hours);
        println!("Shifts worked : {}", s.shifts_worked);
        println!("Avg per shift : {}", ctx.money(s.average_per_shift));

        if s.goal_reached() {
            success("Monthly goal reached!");
        }
    }

    Ok(())
}

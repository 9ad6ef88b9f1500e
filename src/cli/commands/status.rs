use crate::cli::context::Context;
use crate::core::engine::{break_minutes, round2};
use crate::errors::AppResult;
use crate::models::session::Status;
use crate::ui::messages::header;
use crate::utils::colors::{color_for_status, paint};
use crate::utils::time::format_hours;
use chrono::Local;

/// Running session plus today's figures.
pub fn handle(ctx: &Context) -> AppResult<()> {
    let state = ctx.app.session().snapshot();
    let settings = ctx.app.settings().snapshot();

    header("Status");
    println!(
        "State        : {}",
        paint(color_for_status(state.status), state.status.as_str())
    );

    if let Some(clock_in) = state.clock_in_time {
        let now = Local::now();
        let gross = (now - clock_in).num_seconds() as f64 / 60.0;
        let worked = round2(((gross - break_minutes(&state.current_breaks)) / 60.0).max(0.0));

        println!("Clocked in   : {}", clock_in.format("%Y-%m-%d %H:%M"));
        println!("Breaks       : {}", state.current_breaks.len());
        if let (Status::OnBreak, Some(open)) = (state.status, state.open_break()) {
            let on_break = (now - open.start).num_seconds() as f64 / 3600.0;
            println!("On break for : {}", format_hours(on_break));
        }
        println!("Worked so far: {}", format_hours(worked));
        println!(
            "Earned so far: {}",
            ctx.money(round2(worked * settings.hourly_rate))
        );
    }

    println!("Hourly rate  : {}", ctx.money(settings.hourly_rate));
    println!(
        "Work hours   : {} - {}",
        settings.work_start_time.format("%H:%M"),
        settings.work_end_time.format("%H:%M")
    );
    Ok(())
}

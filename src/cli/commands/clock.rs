use crate::cli::context::Context;
use crate::cli::parser::{ClockAction, Commands};
use crate::errors::AppResult;
use crate::ui::messages::success;
use chrono::Local;

pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Clock { action } = cmd {
        let now = Local::now();
        let at = now.format("%H:%M");

        match action {
            ClockAction::In => {
                ctx.app.clock_in(now).await?;
                success(format!("Clocked in at {at}"));
            }
            ClockAction::BreakStart => {
                ctx.app.start_break(now).await?;
                success(format!("Break started at {at}"));
            }
            ClockAction::BreakEnd => {
                ctx.app.end_break(now).await?;
                success(format!("Break ended at {at}"));
            }
            ClockAction::Out => {
                let shift = ctx.app.clock_out(now).await?;
                success(format!(
                    "Clocked out at {at}: {:.2}h worked, {} earned",
                    shift.total_hours,
                    ctx.money(shift.earnings)
                ));
            }
        }
    }
    Ok(())
}

use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::add::ManualEntry;
use crate::errors::AppResult;
use crate::ui::messages::success;
use crate::utils::date;
use crate::utils::time::parse_time;

/// Add a past shift ("forgot to clock in").
pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Add {
        date,
        start,
        end,
        break_minutes,
    } = cmd
    {
        let entry = ManualEntry {
            date: date::parse_date(date)?,
            clock_in: parse_time(start)?,
            clock_out: parse_time(end)?,
            break_minutes: *break_minutes,
        };

        let shift = ctx.app.add_shift(entry, date::today()).await?;

        success(format!(
            "Shift {} added for {}: {} - {}, {:.2}h, {}",
            shift.id,
            shift.date_str(),
            shift.clock_in_str(),
            shift.clock_out_str(),
            shift.total_hours,
            ctx.money(shift.earnings)
        ));
    }
    Ok(())
}

use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::edit::ShiftPatch;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::success;
use crate::utils::date;
use crate::utils::time::parse_optional_time;

pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Edit {
        id,
        date: new_date,
        start,
        end,
        break_minutes,
        rate,
    } = cmd
    {
        let patch = ShiftPatch {
            date: new_date.as_deref().map(date::parse_date).transpose()?,
            clock_in: parse_optional_time(start.as_deref())?,
            clock_out: parse_optional_time(end.as_deref())?,
            break_minutes: *break_minutes,
            hourly_rate: *rate,
        };

        if patch == ShiftPatch::default() {
            return Err(AppError::InvalidShift(
                "Nothing to change: pass at least one of --date, --in, --out, --break, --rate"
                    .into(),
            ));
        }

        let shift = ctx.app.update_shift(id, patch, date::today()).await?;

        success(format!(
            "Shift {} updated: {} {} - {}, {:.2}h at {}/h = {}",
            shift.id,
            shift.date_str(),
            shift.clock_in_str(),
            shift.clock_out_str(),
            shift.total_hours,
            ctx.money(shift.hourly_rate),
            ctx.money(shift.earnings)
        ));
    }
    Ok(())
}

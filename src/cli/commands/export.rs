use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::export::{ExportLogic, Period};
use crate::utils::date;
use tracing::debug;

pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Export {
        format,
        file,
        period,
        force,
    } = cmd
    {
        let period: Period = period.parse()?;
        let sheet = ctx.app.timesheet(&period, date::today());
        debug!(format = format.as_str(), rows = sheet.rows.len(), "exporting timesheet");
        ExportLogic::export(&sheet, format, file, *force)?;
    }
    Ok(())
}

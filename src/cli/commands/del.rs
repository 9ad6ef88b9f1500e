use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::{AppError, AppResult};
use crate::ui::messages::{confirm, info, success};

pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Del { id, yes } = cmd {
        let shift = ctx
            .app
            .shifts()
            .snapshot()
            .into_iter()
            .find(|s| &s.id == id)
            .ok_or_else(|| AppError::ShiftNotFound(id.clone()))?;

        let prompt = format!(
            "Delete the shift of {} ({} - {})? This action is irreversible.",
            shift.date_str(),
            shift.clock_in_str(),
            shift.clock_out_str()
        );

        if !*yes && !confirm(&prompt) {
            info("Operation cancelled.");
            return Ok(());
        }

        let removed = ctx.app.delete_shift(id).await?;
        success(format!("Shift of {} has been deleted.", removed.date_str()));
    }
    Ok(())
}

use crate::cli::context::Context;
use crate::errors::AppResult;
use crate::ui::messages::{info, success};

/// Handle the `sync` command
pub async fn handle(ctx: &Context) -> AppResult<()> {
    let report = ctx.app.sync_now().await?;

    let adopted: Vec<&str> = [("shifts", report.shifts), ("settings", report.settings)]
        .into_iter()
        .filter_map(|(name, changed)| changed.then_some(name))
        .collect();

    if adopted.is_empty() {
        info("Nothing to pull; this device already matches your account.");
    } else {
        success(format!("Updated from your account: {}", adopted.join(", ")));
    }
    Ok(())
}

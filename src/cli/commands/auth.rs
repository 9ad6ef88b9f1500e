//! `login`, `logout` and `whoami`.

use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::ui::messages::{info, success, warning};

pub async fn login(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Login { email } = cmd {
        let user = ctx.remote.register_user(email)?;
        let report = ctx.app.sign_in(user.clone()).await?;

        success(format!("Signed in as {}", user.email));
        if report.shifts {
            info(format!(
                "{} shift(s) loaded from your account",
                ctx.app.shifts().snapshot().len()
            ));
        }
    }
    Ok(())
}

pub async fn logout(ctx: &Context) -> AppResult<()> {
    match ctx.app.current_user() {
        Some(user) => {
            ctx.app.sign_out().await?;
            success(format!("Signed out {}; local copy cleared", user.email));
        }
        None => warning("Not signed in."),
    }
    Ok(())
}

pub fn whoami(ctx: &Context) -> AppResult<()> {
    match ctx.app.current_user() {
        Some(user) => info(format!(
            "{} (account {}, since {})",
            user.email,
            user.id,
            user.created_at.format("%Y-%m-%d")
        )),
        None => info("Not signed in. Shifts are kept on this device only."),
    }
    Ok(())
}

use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::errors::AppResult;
use crate::models::settings::UserSettings;
use crate::ui::messages::{header, success};
use crate::utils::time::parse_optional_time;

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

fn print_settings(ctx: &Context, s: &UserSettings) {
    header("Settings");
    println!("Hourly rate    : {}", ctx.money(s.hourly_rate));
    println!("Monthly goal   : {}", ctx.money(s.monthly_goal));
    println!(
        "Work hours     : {} - {}",
        s.work_start_time.format("%H:%M"),
        s.work_end_time.format("%H:%M")
    );
    println!("Notifications  : {}", on_off(s.notifications_enabled));
    println!("Auto clock-out : {}", on_off(s.auto_clock_out));
}

/// Show settings, or apply each given flag in turn.
pub async fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::Settings {
        rate,
        goal,
        start,
        end,
        notifications,
        auto_clock_out,
    } = cmd
    {
        let start = parse_optional_time(start.as_deref())?;
        let end = parse_optional_time(end.as_deref())?;

        let untouched = rate.is_none()
            && goal.is_none()
            && start.is_none()
            && end.is_none()
            && notifications.is_none()
            && auto_clock_out.is_none();
        if untouched {
            print_settings(ctx, &ctx.app.settings().snapshot());
            return Ok(());
        }

        let app = &ctx.app;
        if let Some(rate) = rate {
            app.set_hourly_rate(*rate).await?;
        }
        if let Some(goal) = goal {
            app.set_monthly_goal(*goal).await?;
        }
        if start.is_some() || end.is_some() {
            let current = app.settings().snapshot();
            app.set_work_hours(
                start.unwrap_or(current.work_start_time),
                end.unwrap_or(current.work_end_time),
            )
            .await?;
        }
        if let Some(toggle) = notifications {
            app.set_notifications_enabled(toggle.enabled()).await?;
        }
        if let Some(toggle) = auto_clock_out {
            app.set_auto_clock_out(toggle.enabled()).await?;
        }

        success("Settings updated");
        print_settings(ctx, &app.settings().snapshot());
    }

    Ok(())
}

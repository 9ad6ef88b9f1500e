use crate::cli::context::Context;
use crate::cli::parser::Commands;
use crate::core::summary::{PeriodTotals, shifts_between};
use crate::errors::AppResult;
use crate::export::Period;
use crate::ui::messages::{header, info};
use crate::utils::colors::colorize_optional;
use crate::utils::date;
use crate::utils::table::{Column, Table};
use crate::utils::{format_money, mins2readable};

/// Handle the `list` command
pub fn handle(cmd: &Commands, ctx: &Context) -> AppResult<()> {
    if let Commands::List { period } = cmd {
        let period: Period = match period {
            Some(p) => p.parse()?,
            None => Period::Month,
        };

        let (start, end) = period.bounds(date::today());
        let shifts = shifts_between(&ctx.app.shifts().snapshot(), start, end);

        header(format!("Shifts: {}", period.label()));

        if shifts.is_empty() {
            info("No shifts recorded in this period.");
            return Ok(());
        }

        let currency = &ctx.cfg.currency;
        let mut table = Table::new(vec![
            Column::left("ID"),
            Column::left("DATE"),
            Column::left("IN"),
            Column::left("OUT"),
            Column::right("BREAK"),
            Column::right("HOURS"),
            Column::right("RATE"),
            Column::right("EARNED"),
        ]);

        for s in &shifts {
            table.add_row(vec![
                s.id.clone(),
                s.date_str(),
                s.clock_in_str(),
                colorize_optional(&s.clock_out_str()),
                mins2readable(s.break_minutes(), false, true),
                format!("{:.2}", s.total_hours),
                format_money(s.hourly_rate, currency),
                format_money(s.earnings, currency),
            ]);
        }

        println!("{}", table.render());

        let totals = PeriodTotals::from_shifts(&shifts);
        println!(
            "{} shift(s), {:.2}h, {}",
            totals.shifts,
            totals.total_hours,
            format_money(totals.total_earnings, currency)
        );
    }

    Ok(())
}

use crate::errors::AppResult;
use crate::export::model::{Timesheet, get_headers};
use crate::export::notify_export_success;
use crate::ui::messages::info;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Whole timesheet, pretty-printed.
pub(crate) fn export_json(sheet: &Timesheet, path: &Path) -> AppResult<()> {
    info(format!("Exporting to JSON: {}", path.display()));

    let json_data = serde_json::to_string_pretty(sheet)?;
    let mut file = File::create(path)?;
    file.write_all(json_data.as_bytes())?;

    notify_export_success("JSON", path);
    Ok(())
}

/// One record per shift, then a `TOTAL` record.
pub(crate) fn export_csv(sheet: &Timesheet, path: &Path) -> AppResult<()> {
    info(format!("Exporting to CSV: {}", path.display()));

    let mut wtr = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)?;

    wtr.write_record(get_headers())?;
    for row in &sheet.rows {
        wtr.serialize(row)?;
    }
    wtr.write_record([
        "TOTAL".to_string(),
        String::new(),
        String::new(),
        format!("{:.2}", sheet.total_hours),
        String::new(),
        format!("{:.2}", sheet.total_earnings),
    ])?;
    wtr.flush()?;

    notify_export_success("CSV", path);
    Ok(())
}

use crate::errors::{AppError, AppResult};
use crate::export::ExportFormat;
use crate::export::fs_utils::ensure_writable;
use crate::export::json_csv::{export_csv, export_json};
use crate::export::model::Timesheet;
use crate::ui::messages::warning;
use std::path::Path;

/// High-level export of a prepared timesheet.
pub struct ExportLogic;

impl ExportLogic {
    /// Write `sheet` to `file` in `format`.
    ///
    /// `file` must be absolute. Returns `false` when there was nothing to
    /// export and no file was written.
    pub fn export(
        sheet: &Timesheet,
        format: &ExportFormat,
        file: &str,
        force: bool,
    ) -> AppResult<bool> {
        let path = Path::new(file);

        if !path.is_absolute() {
            return Err(AppError::Export(format!(
                "Output file path must be absolute: {file}"
            )));
        }

        if sheet.is_empty() {
            warning(format!("No shifts found for {}.", sheet.period));
            return Ok(false);
        }

        ensure_writable(path, force)?;

        match format {
            ExportFormat::Csv => export_csv(sheet, path)?,
            ExportFormat::Json => export_json(sheet, path)?,
        }

        Ok(true)
    }
}

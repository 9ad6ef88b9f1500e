//! Unified application error type.
//! All modules (store, sync, core, cli) return AppError to keep the error
//! handling consistent and easy to manage.

use crate::models::session::Status;
use chrono::NaiveDate;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    // ---------------------------
    // IO
    // ---------------------------
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    // ---------------------------
    // Storage plumbing
    // ---------------------------
    #[error("Database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    // ---------------------------
    // Validation errors
    // ---------------------------
    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid time format: {0}")]
    InvalidTime(String),

    #[error("Invalid shift: {0}")]
    InvalidShift(String),

    #[error("You already have a shift for {0}. Delete it first or choose a different date.")]
    DuplicateShift(NaiveDate),

    #[error("Cannot add shifts for future dates ({0})")]
    FutureShift(NaiveDate),

    #[error("Shift not found: {0}")]
    ShiftNotFound(String),

    #[error("Invalid setting: {0}")]
    InvalidSetting(String),

    #[error("Cannot {action} while {status}")]
    InvalidTransition { status: Status, action: &'static str },

    #[error("Not authenticated")]
    NotAuthenticated,

    // ---------------------------
    // Persistence
    // ---------------------------
    #[error("Local storage failure: {0}")]
    LocalStore(String),

    #[error("Remote storage failure: {0}")]
    Remote(String),

    #[error("The {0} collection is still loading")]
    NotReady(&'static str),

    // ---------------------------
    // Config errors
    // ---------------------------
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to load configuration")]
    ConfigLoad,

    #[error("Failed to save configuration")]
    ConfigSave,

    // ---------------------------
    // Export errors
    // ---------------------------
    #[error("Export error: {0}")]
    Export(String),

    // ---------------------------
    // Generic fallback
    // ---------------------------
    #[error("Internal error: {0}")]
    Other(String),
}

impl AppError {
    /// Errors rejected at the boundary before any state was committed.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            AppError::InvalidDate(_)
                | AppError::InvalidTime(_)
                | AppError::InvalidShift(_)
                | AppError::DuplicateShift(_)
                | AppError::FutureShift(_)
                | AppError::ShiftNotFound(_)
                | AppError::InvalidSetting(_)
                | AppError::InvalidTransition { .. }
                | AppError::NotAuthenticated
        )
    }
}

pub type AppResult<T> = Result<T, AppError>;

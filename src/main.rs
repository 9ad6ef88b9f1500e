//! Tito entrypoint.

use std::process::ExitCode;
use tito::run;
use tito::ui::messages::error;

/// Rejected input exits with 2, anything that broke along the way with 1.
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error(&e);
            if e.is_validation() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            }
        }
    }
}

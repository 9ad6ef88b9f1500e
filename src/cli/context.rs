use crate::app::AppState;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::{AuthSession, SqliteLocalStore, SqliteRemoteStore};
use crate::ui::messages::info;
use crate::utils::formatting::format_money;
use chrono::Local;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs: configuration and a loaded `AppState`.
pub struct Context {
    pub cfg: Config,
    pub app: Arc<AppState>,
    /// Concrete handle for account lookups during `login`.
    pub remote: Arc<SqliteRemoteStore>,
}

pub fn ensure_parent(path: &str) -> AppResult<()> {
    if let Some(parent) = Path::new(path).parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

impl Context {
    /// Open both stores, run the load sequence and apply auto clock-out.
    pub async fn open(cfg: Config) -> AppResult<Self> {
        ensure_parent(&cfg.database)?;
        ensure_parent(&cfg.remote_database)?;

        let auth = Arc::new(AuthSession::new());
        let local = Arc::new(SqliteLocalStore::open(&cfg.database)?);
        let remote = Arc::new(SqliteRemoteStore::open(&cfg.remote_database, auth.clone())?);

        let app = Arc::new(AppState::new(local, remote.clone(), auth));
        app.init().await?;

        let ctx = Self { cfg, app, remote };
        ctx.auto_clock_out().await?;
        Ok(ctx)
    }

    async fn auto_clock_out(&self) -> AppResult<()> {
        if let Some(shift) = self.app.apply_auto_clock_out(Local::now()).await? {
            info(format!(
                "Auto clock-out at {}: {:.2}h, {}",
                shift.clock_out_str(),
                shift.total_hours,
                self.money(shift.earnings)
            ));
        }
        Ok(())
    }

    pub fn money(&self, amount: f64) -> String {
        format_money(amount, &self.cfg.currency)
    }

    pub async fn close(self) {
        self.app
            .teardown(Duration::from_secs(self.cfg.remote_timeout_secs))
            .await;
    }
}

use crate::cli::context::ensure_parent;
use crate::cli::parser::Cli;
use crate::config::Config;
use crate::errors::AppResult;
use crate::store::{AuthSession, SqliteLocalStore, SqliteRemoteStore};
use std::sync::Arc;

/// Handle the `init` command
///
/// Creates the config directory and file, then both SQLite databases with
/// their schema.
pub fn handle(cli: &Cli) -> AppResult<()> {
    let cfg = Config::init_all(cli.db.as_deref(), cli.remote.as_deref(), cli.test)?;

    println!("⚙️  Initializing Tito…");
    println!("📄 Config file : {}", Config::config_file().display());
    println!("🗄️  Local DB   : {}", cfg.database);
    println!("☁️  Remote DB  : {}", cfg.remote_database);

    ensure_parent(&cfg.database)?;
    ensure_parent(&cfg.remote_database)?;
    SqliteLocalStore::open(&cfg.database)?;
    SqliteRemoteStore::open(&cfg.remote_database, Arc::new(AuthSession::new()))?;

    println!("✅ Databases initialized");
    println!("🎉 Tito initialization completed!");
    Ok(())
}

//! Tito library root.
//! Exposes the CLI parser, the high-level `run()` function and the
//! application core used by every front end.

pub mod app;
pub mod cli;
pub mod config;
pub mod core;
pub mod db;
pub mod errors;
pub mod export;
pub mod logging;
pub mod models;
pub mod store;
pub mod sync;
pub mod ui;
pub mod utils;

use clap::Parser;
use cli::commands;
use cli::context::Context;
use cli::parser::{Cli, Commands};
use config::Config;
use errors::AppResult;
use utils::path::resolve_path;

/// Central command dispatcher for commands that need a loaded `AppState`
pub async fn dispatch(cli: &Cli, ctx: &Context) -> AppResult<()> {
    let cmd = &cli.command;
    match cmd {
        Commands::Init | Commands::Config { .. } => Ok(()),
        Commands::Login { .. } => commands::auth::login(cmd, ctx).await,
        Commands::Logout => commands::auth::logout(ctx).await,
        Commands::Whoami => commands::auth::whoami(ctx),
        Commands::Clock { .. } => commands::clock::handle(cmd, ctx).await,
        Commands::Status => commands::status::handle(ctx),
        Commands::Add { .. } => commands::add::handle(cmd, ctx).await,
        Commands::Edit { .. } => commands::edit::handle(cmd, ctx).await,
        Commands::Del { .. } => commands::del::handle(cmd, ctx).await,
        Commands::List { .. } => commands::list::handle(cmd, ctx),
        Commands::Settings { .. } => commands::settings::handle(cmd, ctx).await,
        Commands::Summary { .. } => commands::summary::handle(cmd, ctx),
        Commands::Export { .. } => commands::export::handle(cmd, ctx).await,
        Commands::Sync => commands::sync::handle(ctx).await,
    }
}

/// Entry point used by main.rs
pub async fn run() -> AppResult<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        return commands::init::handle(&cli);
    }

    let mut cfg = Config::load()?;
    if let Some(custom) = &cli.db {
        cfg.database = resolve_path(custom).to_string_lossy().to_string();
    }
    if let Some(custom) = &cli.remote {
        cfg.remote_database = resolve_path(custom).to_string_lossy().to_string();
    }

    logging::init(&cfg.log_level);

    if let Commands::Config { .. } = cli.command {
        return commands::config::handle(&cli.command, &cfg);
    }

    let ctx = Context::open(cfg).await?;
    let result = dispatch(&cli, &ctx).await;
    ctx.close().await;
    result
}

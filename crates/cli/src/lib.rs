pub mod cli;
pub mod commands;
pub mod config;
pub mod render;

use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::filter::Directive;
use tracing_subscriber::EnvFilter;

pub use taskdeck_core as core;
pub use taskdeck_core::model;
pub use taskdeck_core::AppConfig;

use crate::cli::Cli;
use crate::core::app::AppState;
use crate::core::api::HttpClient;
use crate::core::storage::{FileStore, SessionStorage};
use crate::core::views;

/// Resolve configuration, wire the HTTP client and session file, and run one command
/// on a single-threaded runtime.
pub fn run(cli: Cli) -> Result<()> {
    init_tracing(&cli.log_filter)?;

    let config = config::from_cli(&cli).context("failed to resolve configuration")?;
    let client = HttpClient::new(config.request_timeout(), config.auth_scheme())
        .context("failed to build HTTP client")?;
    let storage = SessionStorage::new(FileStore::new(config.session_path()));
    let mut app = AppState::new(Arc::new(client), config.endpoints(), storage);
    tracing::debug!(
        data_dir = %config.data_dir().display(),
        api_url = config.api_url(),
        "configuration resolved"
    );

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;

    let command = cli.command.unwrap_or_default();
    let stdout = io::stdout();
    let handle = stdout.lock();
    runtime.block_on(commands::execute(&mut app, command, views::today(), handle))
}

fn init_tracing(filter: &str) -> Result<()> {
    let directive: Directive = filter
        .parse()
        .with_context(|| format!("invalid log directive '{}'", filter))?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(directive)
        .from_env_lossy();

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .compact()
        .try_init();
    Ok(())
}

//! afxctl (afx) - CLI for ArchFX Cloud
//!
//! Parses slugs offline, uploads streamer reports and queries the REST API.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;
mod config;
mod error;
mod output;
mod prompt;
mod session;

use commands::Cli;

/// Log level used when `RUST_LOG` is unset.
const LOG_LEVEL_ENV: &str = "AFX_LOG_LEVEL";

/// Set to `json` for structured log lines.
const LOG_FORMAT_ENV: &str = "AFX_LOG_FORMAT";

fn init_tracing() {
    // Prefer RUST_LOG, fall back to AFX_LOG_LEVEL, then info.
    let fallback = std::env::var(LOG_LEVEL_ENV).unwrap_or_else(|_| "info".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let json = std::env::var(LOG_FORMAT_ENV).is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing();

    if let Err(e) = cli.run().await {
        error::print_error(&e);
        std::process::exit(1);
    }

    Ok(())
}

#![forbid(unsafe_code)]

//! Elasto CLI
//!
//! Command-line interface for querying a search engine through Elasto.

mod args;
mod commands;

use anyhow::{Context, Result};
use clap::Parser;
use elasto_client::Elasto;
use elasto_core::ElastoConfig;
use tracing_subscriber::EnvFilter;

use crate::args::Args;

fn load_config(args: &Args) -> Result<ElastoConfig> {
    let mut config = match &args.config {
        Some(path) => ElastoConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            let mut config = ElastoConfig::default();
            config.apply_env_overrides()?;
            config
        }
    };
    if let Some(host) = &args.host {
        config.host = host.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&args)?;
    tracing::debug!(host = %config.host, "connecting");
    let elasto = Elasto::connect(config)?;

    let output = commands::run(&elasto, args.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

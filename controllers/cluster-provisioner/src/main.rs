//! Cluster Provisioner
//!
//! Command-line driver for managed Kubernetes clusters:
//! - create / get / list / delete / upgrade clusters
//! - add / get / list / remove / scale node groups
//! - print the JSON schema of cluster spec files
//!
//! Provider credentials and polling limits come from environment variables
//! (see [`config`]). Results are printed as JSON on stdout; logs go to stderr
//! and are filtered with `RUST_LOG`.

mod command;
mod config;
mod error;

use anyhow::Context;
use clap::Parser;
use command::{Cli, Command};
use config::Config;
use provisioner::Orchestrator;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let output = if cli.command == Command::Schema {
        command::spec_schema()?
    } else {
        let config = Config::from_env().context("loading configuration")?;
        info!(
            provider = ?config.provider,
            region = %config.region,
            endpoint = config.endpoint.as_deref().unwrap_or("default"),
            "Starting cluster provisioner"
        );

        let orchestrator = Orchestrator::new(config.adapter()?, config.provision);
        command::run(&orchestrator, cli.command).await?
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

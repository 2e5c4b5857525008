//! Binary crate for the `weather-widget` command-line tool.
//!
//! This crate focuses on:
//! - Serving the widget page with its configuration (push or pull)
//! - Interactive creation of the settings file
//! - A terminal rendering of the widget

use clap::Parser;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use widget_core::Config;

mod cli;
mod server;
mod terminal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();

    let verbose = cmd.debug || Config::from_env().debug;
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            if verbose {
                "debug,hyper=info,reqwest=info".into()
            } else {
                "info".into()
            }
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    cmd.run().await
}

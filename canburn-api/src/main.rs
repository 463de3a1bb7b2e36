//! Binary crate for the `canburn` HTTP API.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the fire-watch, geocode and health endpoints
//! - Interactive provider configuration

use clap::Parser;

mod app;
mod cli;
mod logging;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.run().await
}

// src/main.rs
// =============================================================================
// This is the entry point of the gist-search server.
//
// What happens here:
// 1. Set up logging (RUST_LOG controls the level, default "info")
// 2. Parse command-line arguments using clap
// 3. Build the GitHub client and the search handler
// 4. Serve HTTP until the process is stopped
// =============================================================================

mod cli;           // src/cli.rs - command-line parsing
mod github;        // src/github/ - GitHub gist API client
mod search;        // src/search/ - regex search over a user's gists
mod server;        // src/server/ - warp routes and the HTTP server

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use github::GistClient;
use search::SearchHandler;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(e) = run().await {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = cli.client_config()?;
    tracing::info!(
        api_url = %config.api_url,
        authenticated = config.token.is_some(),
        timeout_secs = cli.timeout_secs,
        "upstream configured"
    );

    let client = GistClient::new(&config).context("Failed to create GitHub client")?;
    let handler = SearchHandler::new(Arc::new(client));

    server::run(&cli.bind_addr(), handler).await
}

// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag can also come from an environment variable (clap's `env`
// feature), which is handy when the server runs in a container. The flag
// wins when both are given.
// =============================================================================

use anyhow::{anyhow, Result};
use clap::Parser;
use std::time::Duration;
use url::Url;

use crate::github::ClientConfig;

#[derive(Parser, Debug)]
#[command(
    name = "gist-search",
    version,
    about = "Search a GitHub user's public gists with a regular expression",
    long_about = "gist-search runs a small HTTP server. POST {\"username\": ..., \"pattern\": ...} \
                  to /api/v1/search and it answers with every gist of that user that has a file \
                  matching the pattern. GET /ping answers \"pong\"."
)]
pub struct Cli {
    /// Address to listen on
    #[arg(long, env = "GIST_SEARCH_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "GIST_SEARCH_PORT", default_value_t = 9876)]
    pub port: u16,

    /// Base URL of the GitHub REST API (change it for GitHub Enterprise)
    #[arg(long, env = "GIST_SEARCH_API_URL", default_value = "https://api.github.com")]
    pub api_url: String,

    /// GitHub token, raises the API rate limit
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Timeout for each GitHub API call, in seconds
    #[arg(long, env = "GIST_SEARCH_TIMEOUT_SECS", default_value_t = 10)]
    pub timeout_secs: u64,
}

impl Cli {
    // host:port string, resolved when the server starts
    pub fn bind_addr(&self) -> String {
        if self.host.contains(':') {
            // IPv6 literal
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }

    // Upstream client settings, with the API URL validated up front
    pub fn client_config(&self) -> Result<ClientConfig> {
        let url = Url::parse(&self.api_url)
            .map_err(|e| anyhow!("Invalid API URL '{}': {}", self.api_url, e))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow!("API URL must be http or https: {}", self.api_url));
        }

        Ok(ClientConfig {
            api_url: self.api_url.clone(),
            token: self.token.clone().filter(|t| !t.is_empty()),
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}

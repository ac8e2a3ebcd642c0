// src/github/client.rs
// =============================================================================
// This module talks to the GitHub gist API.
//
// Two calls are needed:
// - GET /users/{username}/gists  -> list of gist summaries (no file contents)
// - GET /gists/{id}              -> one gist with the contents of every file
//
// The search handler depends on the GistSource trait rather than on the
// concrete client, so tests can hand it an in-memory fake.
//
// The HTTP status of a response is not checked: GitHub reports an unknown
// user through the body shape, which GistListing decodes.
// =============================================================================

use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

use super::types::{Gist, GistListing};

// Characters that must be escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

// Everything that can go wrong while talking to GitHub
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid JSON from upstream: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unexpected upstream payload: {0}")]
    UnexpectedShape(String),

    #[error("invalid upstream URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("invalid API token: {0}")]
    Token(#[from] reqwest::header::InvalidHeaderValue),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}

// The two upstream operations the search handler needs
#[async_trait]
pub trait GistSource: Send + Sync {
    /// Lists the gist summaries of `username`
    async fn list_gists(&self, username: &str) -> Result<GistListing, UpstreamError>;

    /// Fetches one gist with its file contents
    async fn get_gist(&self, id: &str) -> Result<Gist, UpstreamError>;
}

// Settings for GistClient, filled from the command line
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub token: Option<String>,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.github.com".to_string(),
            token: None,
            timeout: Duration::from_secs(10),
        }
    }
}

// reqwest-backed implementation of GistSource
#[derive(Debug, Clone)]
pub struct GistClient {
    http: Client,
    base: Url,
}

impl GistClient {
    // Creates a client with GitHub's required headers and a request timeout.
    //
    // Fails if the base URL does not parse or the token is not a valid
    // header value.
    pub fn new(config: &ClientConfig) -> Result<Self, UpstreamError> {
        let base = Url::parse(config.api_url.trim_end_matches('/'))?;

        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static(concat!("gist-search/", env!("CARGO_PKG_VERSION"))));
        headers.insert(ACCEPT, HeaderValue::from_static("application/vnd.github+json"));

        if let Some(token) = config.token.as_deref() {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let http = Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self { http, base })
    }

    // URL of a user's gist listing
    fn user_gists_url(&self, username: &str) -> String {
        format!(
            "{}/users/{}/gists",
            self.base.as_str().trim_end_matches('/'),
            utf8_percent_encode(username, PATH_SEGMENT)
        )
    }

    // URL of a single gist
    fn gist_url(&self, id: &str) -> String {
        format!(
            "{}/gists/{}",
            self.base.as_str().trim_end_matches('/'),
            utf8_percent_encode(id, PATH_SEGMENT)
        )
    }

    // GETs a URL and parses the body as JSON, whatever the status code
    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(url, "upstream request");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|source| UpstreamError::Request { url: url.to_string(), source })?;

        debug!(url, status = response.status().as_u16(), "upstream response");

        let body = response
            .bytes()
            .await
            .map_err(|source| UpstreamError::Request { url: url.to_string(), source })?;

        Ok(serde_json::from_slice(&body)?)
    }
}

#[async_trait]
impl GistSource for GistClient {
    async fn list_gists(&self, username: &str) -> Result<GistListing, UpstreamError> {
        let url = self.user_gists_url(username);
        let value = self.get_json(&url).await?;
        GistListing::from_json(value)
    }

    async fn get_gist(&self, id: &str) -> Result<Gist, UpstreamError> {
        let url = self.gist_url(id);
        let value = self.get_json(&url).await?;
        Gist::from_json(value)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why #[async_trait]?
//    - The handler stores the client as Arc<dyn GistSource>
//    - Plain `async fn` in a trait cannot be called through `dyn` yet
//    - async_trait rewrites each method to return a boxed, Send future
//
// 2. Why thiserror here but anyhow in main.rs?
//    - The handler needs to tell these errors apart and show their text
//    - thiserror gives a real enum with Display messages
//    - anyhow is enough where we only report and exit
//
// 3. What does #[from] do?
//    - Generates From<serde_json::Error> for UpstreamError
//    - So the ? operator converts the error for us
// -----------------------------------------------------------------------------

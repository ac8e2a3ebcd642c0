// src/github/mod.rs
// =============================================================================
// This module handles everything that talks to the GitHub gist API.
//
// Submodules:
// - client: the HTTP calls (list a user's gists, fetch one gist)
// - types: the JSON shapes those calls return
//
// Other modules only see the GistSource trait and the data types, so the
// search handler never depends on reqwest directly.
// =============================================================================

mod client;
mod types;

pub use client::{ClientConfig, GistClient, GistSource, UpstreamError};
pub use types::{Gist, GistListing};

// src/search/mod.rs
// =============================================================================
// This module contains the gist search itself.
//
// Submodules:
// - pattern: compiles the caller's regex and tests file contents against it
// - handler: the request pipeline (validate, list, fetch, match)
// - types: request and response bodies
// - error: failure cases and their HTTP status codes
// =============================================================================

mod error;
mod handler;
mod pattern;
mod types;

pub use handler::SearchHandler;

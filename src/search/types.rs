// src/search/types.rs
// =============================================================================
// The request and response bodies of POST /api/v1/search.
// =============================================================================

use serde::Serialize;
use serde_json::{Map, Value};

use super::error::SearchError;
use crate::github::Gist;

// What the caller asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub username: String,
    pub pattern: String,
}

impl SearchRequest {
    // Parses the raw request body.
    //
    // The keys are looked up one by one, username first, so the first
    // missing key is the one reported.
    pub fn from_body(body: &[u8]) -> Result<Self, SearchError> {
        let value: Value = serde_json::from_slice(body)
            .map_err(|e| SearchError::BadRequest(format!("failed to decode JSON object: {}", e)))?;

        let object = value
            .as_object()
            .ok_or_else(|| SearchError::BadRequest("JSON data must be an object".to_string()))?;

        Ok(Self {
            username: required_string(object, "username")?,
            pattern: required_string(object, "pattern")?,
        })
    }
}

fn required_string(object: &Map<String, Value>, key: &'static str) -> Result<String, SearchError> {
    match object.get(key) {
        None => Err(SearchError::MissingKey(key)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(SearchError::InvalidKeyType(key)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    Success,
    Error,
}

// The JSON body we answer with, on success and on failure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    pub status: SearchStatus,
    pub matches: Vec<Gist>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SearchResult {
    pub fn success(request: SearchRequest, matches: Vec<Gist>) -> Self {
        Self {
            username: Some(request.username),
            pattern: Some(request.pattern),
            status: SearchStatus::Success,
            matches,
            reason: None,
        }
    }

    // An error result never carries matches
    pub fn error(request: Option<SearchRequest>, error: &SearchError) -> Self {
        let (username, pattern) = match request {
            Some(request) => (Some(request.username), Some(request.pattern)),
            None => (None, None),
        };

        Self {
            username,
            pattern,
            status: SearchStatus::Error,
            matches: Vec::new(),
            reason: Some(error.to_string()),
        }
    }
}

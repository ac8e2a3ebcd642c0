// src/search/error.rs
// =============================================================================
// Every way a search request can fail, and the HTTP status each one maps to.
//
// The Display text of each variant is exactly what ends up in the "reason"
// field of the JSON response, so clients can rely on these strings.
// =============================================================================

use thiserror::Error;

use crate::github::UpstreamError;
use warp::http::StatusCode;

#[derive(Debug, Error)]
pub enum SearchError {
    /// The body is not a JSON object
    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Missing '{0}' key in JSON data")]
    MissingKey(&'static str),

    #[error("'{0}' key in JSON data must be a string")]
    InvalidKeyType(&'static str),

    /// GitHub answered the listing with an error-shaped object
    #[error("User's gists not found (incorrent user name?)")]
    UserNotFound,

    #[error("Error compiling regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("file '{file}' of gist {gist_id} has no content")]
    MissingContent { gist_id: String, file: String },

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl SearchError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            SearchError::UserNotFound => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

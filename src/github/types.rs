// src/github/types.rs
// =============================================================================
// Data types returned by the GitHub gist API.
//
// We only name the fields we actually use (id, files, content). Everything
// else the API sends is kept in a flattened map so that a matching gist can
// be echoed back to the caller exactly as GitHub described it.
//
// The listing endpoint has one quirk: when the user does not exist it answers
// with an object like {"message": "Not Found", "status": "404"} instead of an
// array. GistListing turns that into an explicit variant.
//
// Files and extra fields keep the order GitHub sent them in (IndexMap, and
// serde_json's preserve_order for Map), both for scanning and for the echo.
// =============================================================================

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::client::UpstreamError;

// A single gist, either from the listing (summary) or from /gists/{id}.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gist {
    pub id: String,
    /// Keyed by filename, in upstream order
    #[serde(default)]
    pub files: IndexMap<String, FileData>,
    /// Every other field GitHub sent (url, owner, description, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// One file inside a gist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    /// Missing on the summary listing, present on the full gist
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

// The payload GitHub sends in place of a gist list for unknown users
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub documentation_url: Option<String>,
    pub status: Value,
}

// Result of listing a user's gists
#[derive(Debug, Clone, PartialEq)]
pub enum GistListing {
    /// The user exists; these are their gist summaries in API order
    Gists(Vec<Gist>),
    /// The API answered with an error-shaped object
    Missing(ErrorPayload),
}

impl GistListing {
    // Decides what a listing response is by looking at its JSON shape.
    //
    // - array               -> Gists
    // - object with status  -> Missing
    // - anything else       -> UpstreamError::UnexpectedShape
    pub fn from_json(value: Value) -> Result<Self, UpstreamError> {
        let is_error_object = value
            .as_object()
            .is_some_and(|map| map.contains_key("status"));

        if value.is_array() {
            Ok(GistListing::Gists(serde_json::from_value(value)?))
        } else if is_error_object {
            Ok(GistListing::Missing(serde_json::from_value(value)?))
        } else {
            Err(UpstreamError::UnexpectedShape(describe(&value)))
        }
    }
}

impl Gist {
    // Builds a gist from the body of GET /gists/{id}
    pub fn from_json(value: Value) -> Result<Self, UpstreamError> {
        if !value.is_object() {
            return Err(UpstreamError::UnexpectedShape(describe(&value)));
        }
        Ok(serde_json::from_value(value)?)
    }
}

// Short description of a JSON value for error messages
fn describe(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(_) => "a boolean".to_string(),
        Value::Number(_) => "a number".to_string(),
        Value::String(_) => "a string".to_string(),
        Value::Array(_) => "an array".to_string(),
        Value::Object(map) => match map.get("message").and_then(Value::as_str) {
            Some(message) => format!("an object ({})", message),
            None => "an object".to_string(),
        },
    }
}

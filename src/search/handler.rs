// src/search/handler.rs
// =============================================================================
// The search pipeline behind POST /api/v1/search.
//
// Steps (stop at the first failure):
// 1. Parse the body and pull out `username` and `pattern`
// 2. List the user's gists
// 3. Bail out with 404 if GitHub says the user does not exist
// 4. Compile the pattern
// 5. Fetch each gist in listing order and keep it if any file matches
//
// Any failure becomes an error result with no matches; the matches collected
// so far are dropped. Fetches are sequential, one upstream call per gist.
// =============================================================================

use std::sync::Arc;
use tracing::{debug, warn};

use super::error::SearchError;
use super::pattern::CompiledPattern;
use super::types::{SearchRequest, SearchResult};
use crate::github::{Gist, GistListing, GistSource};
use warp::http::StatusCode;

#[derive(Clone)]
pub struct SearchHandler {
    source: Arc<dyn GistSource>,
}

impl SearchHandler {
    pub fn new(source: Arc<dyn GistSource>) -> Self {
        Self { source }
    }

    // Runs one search and returns the HTTP status with the response body
    pub async fn handle(&self, body: &[u8]) -> (StatusCode, SearchResult) {
        let request = match SearchRequest::from_body(body) {
            Ok(request) => request,
            Err(e) => {
                warn!(reason = %e, "rejected search request");
                return (e.status_code(), SearchResult::error(None, &e));
            }
        };

        match self.search(&request).await {
            Ok(matches) => {
                debug!(username = %request.username, matches = matches.len(), "search finished");
                (StatusCode::OK, SearchResult::success(request, matches))
            }
            Err(e) => {
                warn!(username = %request.username, reason = %e, "search failed");
                (e.status_code(), SearchResult::error(Some(request), &e))
            }
        }
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Gist>, SearchError> {
        let summaries = match self.source.list_gists(&request.username).await? {
            GistListing::Gists(gists) => gists,
            GistListing::Missing(payload) => {
                debug!(username = %request.username, upstream_message = ?payload.message, "upstream has no such user");
                return Err(SearchError::UserNotFound);
            }
        };

        let pattern = CompiledPattern::compile(&request.pattern)?;

        let mut matches = Vec::new();
        for summary in &summaries {
            let gist = self.source.get_gist(&summary.id).await?;

            let matched = match pattern.first_matching_file(&gist)? {
                Some(file) => {
                    debug!(gist = %gist.id, file, "gist matched");
                    true
                }
                None => false,
            };

            if matched {
                matches.push(gist);
            }
        }

        Ok(matches)
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<dyn GistSource>?
//    - warp clones the handler into every request it serves
//    - Arc shares one client between them without copying it
//    - dyn lets tests swap in a fake without generics everywhere
//
// 2. How does `?` short-circuit the pipeline?
//    - Each step returns Result<_, SearchError> (or an error that converts)
//    - The first Err returns from `search` immediately
//    - `handle` then turns that error into the JSON error body
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::github::UpstreamError;
    use crate::search::types::SearchStatus;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    // In-memory GitHub with two users:
    // - valid_user owns gists "1" ("example content 9") and "2" ("another example")
    // - invalid_user does not exist
    // - multi_file_user owns gist "3", with two files that both say "example"
    // - todo_user owns gist "4": "z.txt" says "TODO", then "a.txt" comes back
    //   without content
    // Every other username makes the listing call fail.
    #[derive(Default)]
    struct FakeGitHub {
        fetched: Mutex<Vec<String>>,
        broken_gist: Option<String>,
    }

    #[async_trait]
    impl GistSource for FakeGitHub {
        async fn list_gists(&self, username: &str) -> Result<GistListing, UpstreamError> {
            match username {
                "valid_user" => Ok(GistListing::Gists(vec![
                    Gist::from_json(json!({"id": "1", "files": {"file1.txt": {"filename": "file1.txt"}}}))?,
                    Gist::from_json(json!({"id": "2", "files": {"file2.txt": {"filename": "file2.txt"}}}))?,
                ])),
                "multi_file_user" => GistListing::from_json(json!([
                    {"id": "3", "files": {"a.txt": {}, "b.txt": {}}}
                ])),
                "todo_user" => GistListing::from_json(json!([
                    {"id": "4", "files": {"z.txt": {}, "a.txt": {}}}
                ])),
                "invalid_user" => GistListing::from_json(json!({
                    "message": "Not Found",
                    "documentation_url": "https://docs.github.com/rest/gists/gists#list-gists-for-a-user",
                    "status": "404"
                })),
                _ => Err(UpstreamError::UnexpectedShape("an object".to_string())),
            }
        }

        async fn get_gist(&self, id: &str) -> Result<Gist, UpstreamError> {
            self.fetched.lock().unwrap().push(id.to_string());

            if self.broken_gist.as_deref() == Some(id) {
                return Err(UpstreamError::UnexpectedShape("a string".to_string()));
            }

            match id {
                "1" => Gist::from_json(json!({
                    "id": "1",
                    "files": {"file1.txt": {"content": "example content 9"}}
                })),
                "3" => Gist::from_json(json!({
                    "id": "3",
                    "files": {
                        "a.txt": {"content": "first example"},
                        "b.txt": {"content": "second example"}
                    }
                })),
                "4" => Gist::from_json(json!({
                    "id": "4",
                    "files": {
                        "z.txt": {"content": "TODO"},
                        "a.txt": {"filename": "a.txt"}
                    }
                })),
                _ => Gist::from_json(json!({
                    "id": "2",
                    "files": {"file2.txt": {"content": "another example"}}
                })),
            }
        }
    }

    fn handler_with(fake: FakeGitHub) -> (SearchHandler, Arc<FakeGitHub>) {
        let fake = Arc::new(fake);
        (SearchHandler::new(fake.clone()), fake)
    }

    async fn search(username: &str, pattern: &str) -> (StatusCode, SearchResult) {
        let (handler, _) = handler_with(FakeGitHub::default());
        let body = json!({"username": username, "pattern": pattern}).to_string();
        handler.handle(body.as_bytes()).await
    }

    #[tokio::test]
    async fn test_search_success_two_matches() {
        let (code, result) = search("valid_user", "example").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(result.status, SearchStatus::Success);
        assert_eq!(result.matches.len(), 2);
        assert_eq!(result.matches[0].id, "1");
        assert_eq!(result.matches[1].id, "2");
    }

    #[tokio::test]
    async fn test_search_success_one_match() {
        let (code, result) = search("valid_user", r"\d").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(result.pattern.as_deref(), Some(r"\d"));
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].files["file1.txt"].content.as_deref(), Some("example content 9"));
    }

    #[tokio::test]
    async fn test_empty_search_is_still_success() {
        let (code, result) = search("valid_user", "hello").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(result.status, SearchStatus::Success);
        assert!(result.matches.is_empty());
        assert_eq!(result.reason, None);
    }

    #[tokio::test]
    async fn test_unknown_user_is_404() {
        let (code, result) = search("invalid_user", "example").await;
        assert_eq!(code, StatusCode::NOT_FOUND);
        assert_eq!(result.status, SearchStatus::Error);
        assert_eq!(
            result.reason.as_deref(),
            Some("User's gists not found (incorrent user name?)")
        );
    }

    #[tokio::test]
    async fn test_invalid_regex_is_400() {
        let (code, result) = search("valid_user", "[").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.status, SearchStatus::Error);
        assert!(result.reason.unwrap().contains("Error compiling regular expression"));
    }

    #[tokio::test]
    async fn test_user_check_comes_before_pattern_check() {
        let (code, _) = search("invalid_user", "[").await;
        assert_eq!(code, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_listing_failure_is_400() {
        let (code, result) = search("someone_else", "example").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.username.as_deref(), Some("someone_else"));
        assert!(result.reason.unwrap().contains("unexpected upstream payload"));
    }

    #[tokio::test]
    async fn test_missing_keys() {
        let (handler, fake) = handler_with(FakeGitHub::default());

        let (code, result) = handler.handle(br#"{"pattern": "example"}"#).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.reason.as_deref(), Some("Missing 'username' key in JSON data"));

        let (code, result) = handler.handle(br#"{"username": "valid_user"}"#).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.reason.as_deref(), Some("Missing 'pattern' key in JSON data"));

        assert!(fake.fetched.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_json() {
        let (handler, _) = handler_with(FakeGitHub::default());
        let (code, result) = handler.handle(b"hello").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.status, SearchStatus::Error);
        assert!(result.reason.unwrap().contains("Bad Request"));
    }

    #[tokio::test]
    async fn test_fetch_failure_discards_matches() {
        let (handler, fake) = handler_with(FakeGitHub {
            broken_gist: Some("2".to_string()),
            ..FakeGitHub::default()
        });
        let body = json!({"username": "valid_user", "pattern": "example"}).to_string();

        let (code, result) = handler.handle(body.as_bytes()).await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert_eq!(result.status, SearchStatus::Error);
        assert!(result.matches.is_empty());
        assert_eq!(*fake.fetched.lock().unwrap(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_gists_fetched_in_listing_order() {
        let (handler, fake) = handler_with(FakeGitHub::default());
        let body = json!({"username": "valid_user", "pattern": "nomatch"}).to_string();

        handler.handle(body.as_bytes()).await;
        assert_eq!(*fake.fetched.lock().unwrap(), vec!["1", "2"]);
    }

    #[tokio::test]
    async fn test_gist_with_several_matching_files_is_returned_once() {
        let (code, result) = search("multi_file_user", "example").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(result.matches.len(), 1);
        assert_eq!(result.matches[0].id, "3");
        assert_eq!(result.matches[0].files.len(), 2);
    }

    #[tokio::test]
    async fn test_match_before_file_without_content() {
        let (code, result) = search("todo_user", "TODO").await;
        assert_eq!(code, StatusCode::OK);
        assert_eq!(result.status, SearchStatus::Success);
        assert_eq!(result.matches.len(), 1);

        let names: Vec<&str> = result.matches[0].files.keys().map(String::as_str).collect();
        assert_eq!(names, ["z.txt", "a.txt"]);
    }

    #[tokio::test]
    async fn test_lookaround_pattern_is_400() {
        let (code, result) = search("valid_user", "example(?= content)").await;
        assert_eq!(code, StatusCode::BAD_REQUEST);
        assert!(result.reason.unwrap().starts_with("Error compiling regular expression"));
    }
}

// src/server/routes.rs
// =============================================================================
// The warp filters that make up the HTTP API.
//
// Routes:
//   GET  /ping            -> "pong"
//   POST /api/v1/search   -> gist search (JSON in, JSON out)
//
// Anything a filter rejects (unknown path, wrong method, oversized or
// unreadable body) is turned into the same JSON error shape the search
// endpoint uses: {"status": "error", "reason": "..."}.
// =============================================================================

use futures::{Stream, StreamExt};
use serde_json::json;
use std::convert::Infallible;
use std::time::Duration;
use tracing::{info, warn};
use warp::http::StatusCode;
use warp::reject::{self, Reject, Rejection};
use warp::{Buf, Filter, Reply};

use crate::search::SearchHandler;

// Largest search body we accept
pub const MAX_BODY_BYTES: u64 = 1024 * 1024;

// How long a client gets to send the whole body
const BODY_READ_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
struct BodyTooLarge;
impl Reject for BodyTooLarge {}

#[derive(Debug)]
struct BodyTimeout;
impl Reject for BodyTimeout {}

#[derive(Debug)]
struct BodyUnreadable;
impl Reject for BodyUnreadable {}

// Every route, with rejections mapped to JSON errors and each request logged
pub fn routes(handler: SearchHandler) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    ping()
        .or(search(handler))
        .recover(handle_rejection)
        .with(warp::log::custom(log_request))
}

// GET /ping
fn ping() -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path("ping")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| "pong")
}

// POST /api/v1/search
fn search(handler: SearchHandler) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    warp::path!("api" / "v1" / "search")
        .and(warp::post())
        .and(limited_body(MAX_BODY_BYTES))
        .and(with_handler(handler))
        .and_then(|body: Vec<u8>, handler: SearchHandler| async move {
            let (code, result) = handler.handle(&body).await;
            Ok::<_, Rejection>(warp::reply::with_status(warp::reply::json(&result), code))
        })
}

fn with_handler(handler: SearchHandler) -> impl Filter<Extract = (SearchHandler,), Error = Infallible> + Clone {
    warp::any().map(move || handler.clone())
}

// The whole request body, up to `limit` bytes.
//
// Works with and without Content-Length, so chunked uploads are accepted.
// A declared length over the limit is rejected before any body is read.
fn limited_body(limit: u64) -> impl Filter<Extract = (Vec<u8>,), Error = Rejection> + Clone {
    warp::header::optional::<u64>("content-length")
        .and(warp::body::stream())
        .and_then(move |length: Option<u64>, body| async move {
            if length.map_or(false, |n| n > limit) {
                return Err(reject::custom(BodyTooLarge));
            }

            match tokio::time::timeout(BODY_READ_TIMEOUT, read_body(body, limit)).await {
                Ok(result) => result,
                Err(_) => Err(reject::custom(BodyTimeout)),
            }
        })
}

async fn read_body<S, B>(body: S, limit: u64) -> Result<Vec<u8>, Rejection>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    futures::pin_mut!(body);

    let mut bytes = Vec::new();
    while let Some(chunk) = body.next().await {
        let mut chunk = chunk.map_err(|e| {
            warn!(error = %e, "failed to read request body");
            reject::custom(BodyUnreadable)
        })?;

        if (bytes.len() + chunk.remaining()) as u64 > limit {
            return Err(reject::custom(BodyTooLarge));
        }

        while chunk.has_remaining() {
            let part = chunk.chunk();
            let len = part.len();
            bytes.extend_from_slice(part);
            chunk.advance(len);
        }
    }

    Ok(bytes)
}

async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code = if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.find::<BodyTooLarge>().is_some() {
        StatusCode::PAYLOAD_TOO_LARGE
    } else if err.find::<BodyTimeout>().is_some() {
        StatusCode::REQUEST_TIMEOUT
    } else if err.find::<BodyUnreadable>().is_some() || err.find::<reject::InvalidHeader>().is_some() {
        StatusCode::BAD_REQUEST
    } else if err.find::<reject::MethodNotAllowed>().is_some() {
        StatusCode::METHOD_NOT_ALLOWED
    } else {
        warn!(rejection = ?err, "unhandled rejection");
        StatusCode::INTERNAL_SERVER_ERROR
    };

    let reason = code.canonical_reason().unwrap_or("Error");
    let body = warp::reply::json(&json!({"status": "error", "reason": reason}));
    Ok(warp::reply::with_status(body, code))
}

fn log_request(info: warp::log::Info<'_>) {
    info!(
        peer = ?info.remote_addr(),
        method = %info.method(),
        path = info.path(),
        status = info.status().as_u16(),
        elapsed_ms = info.elapsed().as_millis() as u64,
        user_agent = info.user_agent().unwrap_or("-"),
        "request"
    );
}

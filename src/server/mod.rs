// src/server/mod.rs
// =============================================================================
// The HTTP server.
//
// Routing, body handling and error replies live in `routes` as warp filters.
// This module resolves the listen address, binds it and serves until the
// process is stopped. hyper (under warp) handles keep-alive, chunked bodies
// and one task per connection.
// =============================================================================

mod routes;

use routes::routes;

use anyhow::{anyhow, Context, Result};
use tokio::net::lookup_host;
use tracing::info;

use crate::search::SearchHandler;

// Binds `addr` ("host:port") and serves requests forever
pub async fn run(addr: &str, handler: SearchHandler) -> Result<()> {
    let socket_addr = lookup_host(addr)
        .await
        .with_context(|| format!("failed to resolve {}", addr))?
        .next()
        .ok_or_else(|| anyhow!("{} did not resolve to any address", addr))?;

    let (bound, server) = warp::serve(routes(handler))
        .try_bind_ephemeral(socket_addr)
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(addr = %bound, "gist-search listening");
    server.await;
    Ok(())
}

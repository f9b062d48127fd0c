//! Request handling and transformation.
//!
//! # Responsibilities
//! - Translate an HTTP request head into a [`RequestContext`]
//! - Expose headers and connection facts through `env`
//! - Attach the buffered body for endpoints that need it
//!
//! # Design Decisions
//! - Header names are lower-cased; non-UTF-8 header values are skipped
//! - Methods outside the supported set are rejected before routing

use std::net::SocketAddr;

use axum::body::Bytes;
use axum::http::request::Parts;

use crate::routing::context::RequestContext;
use crate::routing::method::{Method, UnsupportedMethod};

/// `env` key holding the peer address, when known.
pub const REMOTE_ADDR: &str = "remote_addr";

/// The buffered request body, stored in [`RequestContext::extensions`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestBody(pub Bytes);

/// Build the routing context for a request head.
pub fn context_from_parts(
    parts: &Parts,
    remote: Option<SocketAddr>,
) -> Result<RequestContext, UnsupportedMethod> {
    let method = Method::try_from(&parts.method)?;
    let path = parts.uri.path();
    let mut ctx = match parts.uri.query() {
        Some(query) => RequestContext::new(method, path).with_query(query),
        None => RequestContext::new(method, path),
    };

    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            ctx.env.insert(name.as_str().to_string(), value.to_string());
        }
    }
    if !ctx.env.contains_key("host") {
        if let Some(authority) = parts.uri.authority() {
            ctx.env.insert("host".to_string(), authority.host().to_string());
        }
    }
    if let Some(remote) = remote {
        ctx.env.insert(REMOTE_ADDR.to_string(), remote.to_string());
    }

    Ok(ctx)
}

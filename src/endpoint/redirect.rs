//! Redirect endpoints.

use std::fmt;
use std::sync::Arc;

use axum::http::{header, HeaderValue, StatusCode};

use crate::endpoint::Endpoint;
use crate::error::RoutingResult;
use crate::routing::context::RequestContext;
use crate::routing::matcher::PathMatcher;
use crate::routing::params::Params;
use crate::routing::response::{Outcome, Response};
use crate::routing::router::NamedRoutes;

/// 301.
pub const PERMANENT: StatusCode = StatusCode::MOVED_PERMANENTLY;
/// 303, the default.
pub const TEMPORARY: StatusCode = StatusCode::SEE_OTHER;

/// Callback computing a location at request time.
pub type ComputeFn = Arc<dyn Fn(&RedirectContext<'_>) -> RoutingResult<String> + Send + Sync>;

/// Where a redirect points.
#[derive(Clone)]
pub enum RedirectTarget {
    /// A template expanded with the matched params.
    Path(Arc<dyn PathMatcher>),
    /// A named route expanded with the matched params.
    Named(String),
    /// A callback.
    Computed(ComputeFn),
}

impl fmt::Debug for RedirectTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RedirectTarget::Path(m) => f.debug_tuple("Path").field(&m.source()).finish(),
            RedirectTarget::Named(n) => f.debug_tuple("Named").field(n).finish(),
            RedirectTarget::Computed(_) => f.write_str("Computed"),
        }
    }
}

/// What a [`RedirectTarget::Computed`] callback can see.
pub struct RedirectContext<'a> {
    params: &'a Params,
    request: &'a RequestContext,
    names: &'a NamedRoutes,
}

impl<'a> RedirectContext<'a> {
    pub fn params(&self) -> &Params {
        self.params
    }

    pub fn request(&self) -> &RequestContext {
        self.request
    }

    /// Render the path of a named route.
    pub fn expand(&self, name: &str, params: &Params) -> RoutingResult<String> {
        self.names.expand(name, params)
    }
}

/// Answers every request with an empty redirect response.
pub struct RedirectEndpoint {
    target: RedirectTarget,
    status: StatusCode,
    names: NamedRoutes,
    params_key: String,
}

impl RedirectEndpoint {
    pub fn new(
        target: RedirectTarget,
        status: StatusCode,
        names: NamedRoutes,
        params_key: impl Into<String>,
    ) -> Self {
        Self {
            target,
            status,
            names,
            params_key: params_key.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn target(&self) -> &RedirectTarget {
        &self.target
    }

    /// The `Location` this endpoint sends for `ctx`.
    pub fn location(&self, ctx: &RequestContext) -> RoutingResult<String> {
        let empty = Params::new();
        let params = ctx.params(&self.params_key).unwrap_or(&empty);

        match &self.target {
            RedirectTarget::Path(matcher) => Ok(matcher.expand(params)?),
            RedirectTarget::Named(name) => self.names.expand(name, params),
            RedirectTarget::Computed(compute) => compute(&RedirectContext {
                params,
                request: ctx,
                names: &self.names,
            }),
        }
    }
}

impl Endpoint for RedirectEndpoint {
    fn call(&self, ctx: &mut RequestContext) -> Outcome {
        let location = self
            .location(ctx)
            .map_err(|e| e.to_string())
            .and_then(|loc| HeaderValue::from_str(&loc).map_err(|e| e.to_string()));

        match location {
            Ok(location) => Response::new(self.status)
                .with_header(header::LOCATION, location)
                .into(),
            Err(error) => {
                tracing::error!(
                    error = %error,
                    path = %ctx.path(),
                    target = ?self.target,
                    "Failed to compute redirect location"
                );
                Response::new(StatusCode::INTERNAL_SERVER_ERROR).into()
            }
        }
    }
}

impl fmt::Debug for RedirectEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedirectEndpoint")
            .field("target", &self.target)
            .field("status", &self.status)
            .finish()
    }
}

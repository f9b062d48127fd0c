//! Route table entries.
//!
//! # Design Decisions
//! - A route's endpoint is already wrapped in its middleware stack
//! - Defaults merge under captures: a captured value always wins
//! - Nested routes hand the whole request to a sub-router

use std::fmt;
use std::sync::Arc;

use crate::endpoint::Handler;
use crate::error::ExpandError;
use crate::routing::context::RequestContext;
use crate::routing::matcher::{Constraints, PathMatcher};
use crate::routing::params::Params;
use crate::routing::response::Outcome;
use crate::routing::router::Router;

/// A path matcher bound to an endpoint.
pub struct Route {
    matcher: Arc<dyn PathMatcher>,
    endpoint: Handler,
    params: Params,
    constraints: Constraints,
    name: Option<String>,
}

impl Route {
    pub fn new(matcher: Arc<dyn PathMatcher>, endpoint: Handler) -> Self {
        Self {
            matcher,
            endpoint,
            params: Params::new(),
            constraints: Constraints::default(),
            name: None,
        }
    }

    /// Default params returned with every match.
    pub fn with_params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    pub fn with_constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = constraints;
        self
    }

    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Match `path` against this route.
    ///
    /// Constraints only run once the path matched; the result is the route
    /// defaults overlaid with the captured values.
    pub fn match_path(&self, path: &str, ctx: &RequestContext) -> Option<Params> {
        let captures = self.matcher.match_path(path)?;
        if !self.constraints.all(ctx) {
            return None;
        }
        let mut params = self.params.clone();
        for (name, value) in captures {
            params.insert(name, value);
        }
        Some(params)
    }

    /// Render a path for this route.
    pub fn expand(&self, params: &Params) -> Result<String, ExpandError> {
        self.matcher.expand(params)
    }

    pub fn endpoint(&self) -> &Handler {
        &self.endpoint
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// The template the route was compiled from.
    pub fn pattern(&self) -> &str {
        self.matcher.source()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern())
            .field("name", &self.name)
            .field("params", &self.params)
            .field("constraints", &self.constraints)
            .finish()
    }
}

/// A sub-router mounted under a path prefix.
pub struct NestedRoute {
    subpath: String,
    router: Arc<Router>,
}

impl NestedRoute {
    pub fn new(subpath: impl Into<String>, router: Arc<Router>) -> Self {
        Self {
            subpath: subpath.into(),
            router,
        }
    }

    /// `None` when the prefix does not match or the sub-router passed.
    ///
    /// The prefix check is a plain string prefix, so `/admin` also covers
    /// `/administrator`; the sub-router's own patterns decide from there.
    pub fn dispatch(&self, path: &str, ctx: &mut RequestContext) -> Option<Outcome> {
        if !path.starts_with(&self.subpath) {
            return None;
        }
        match self.router.call(ctx) {
            Outcome::Pass => None,
            outcome => Some(outcome),
        }
    }

    pub fn subpath(&self) -> &str {
        &self.subpath
    }

    pub fn router(&self) -> &Router {
        &self.router
    }
}

impl fmt::Debug for NestedRoute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NestedRoute")
            .field("subpath", &self.subpath)
            .finish()
    }
}

/// One slot of a routing table.
#[derive(Debug, Clone)]
pub enum TableEntry {
    Simple(Arc<Route>),
    Nested(Arc<NestedRoute>),
}

//! Route matching contracts.
//!
//! # Responsibilities
//! - Define the bidirectional path matcher a route is built on
//! - Define request constraints evaluated after the path matched
//! - Combine constraints with AND semantics, in declaration order
//!
//! # Design Decisions
//! - Path matching and request constraints are separate: a constraint only
//!   runs for paths that already matched
//! - Constraint evaluation stops at the first failure
//! - Host matching is case-insensitive, env matching is exact

use std::fmt;
use std::sync::Arc;

use crate::error::ExpandError;
use crate::routing::context::RequestContext;
use crate::routing::params::Params;

/// A compiled path template that can match forwards and expand backwards.
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Captured `(name, value)` pairs in template order, or `None`.
    fn match_path(&self, path: &str) -> Option<Vec<(String, String)>>;

    /// Render a path from parameter values.
    fn expand(&self, params: &Params) -> Result<String, ExpandError>;

    /// The template this matcher was compiled from.
    fn source(&self) -> &str;
}

/// A predicate over the request that must hold for a route to match.
pub trait Constraint: Send + Sync {
    fn check(&self, ctx: &RequestContext) -> bool;
}

impl<F> Constraint for F
where
    F: Fn(&RequestContext) -> bool + Send + Sync,
{
    fn check(&self, ctx: &RequestContext) -> bool {
        self(ctx)
    }
}

/// Matches the `host` env entry.
#[derive(Debug, Clone)]
pub struct HostConstraint {
    expected_host: String,
}

impl HostConstraint {
    /// The host is normalized to lowercase for case-insensitive matching.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            expected_host: host.into().to_lowercase(),
        }
    }
}

impl Constraint for HostConstraint {
    fn check(&self, ctx: &RequestContext) -> bool {
        ctx.env
            .get("host")
            .map(|h| h.to_lowercase() == self.expected_host)
            .unwrap_or(false)
    }
}

/// Matches one env entry exactly.
#[derive(Debug, Clone)]
pub struct EnvConstraint {
    key: String,
    value: String,
}

impl EnvConstraint {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl Constraint for EnvConstraint {
    fn check(&self, ctx: &RequestContext) -> bool {
        ctx.env.get(&self.key) == Some(&self.value)
    }
}

/// An ordered list of constraints combined with AND semantics.
#[derive(Clone, Default)]
pub struct Constraints(Vec<Arc<dyn Constraint>>);

impl Constraints {
    pub fn new(constraints: Vec<Arc<dyn Constraint>>) -> Self {
        Self(constraints)
    }

    pub fn push(&mut self, constraint: Arc<dyn Constraint>) {
        self.0.push(constraint);
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when every constraint holds; stops at the first that doesn't.
    pub fn all(&self, ctx: &RequestContext) -> bool {
        self.0.iter().all(|c| c.check(ctx))
    }
}

impl fmt::Debug for Constraints {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Constraints").field(&self.0.len()).finish()
    }
}

//! Error definitions shared by the routing subsystems.

use thiserror::Error;

/// Errors raised while compiling a path template.
#[derive(Debug, Error)]
pub enum PatternError {
    /// The same capture name appears twice in one template.
    #[error("duplicate capture `{name}` in pattern `{pattern}`")]
    DuplicateCapture { pattern: String, name: String },

    /// A `{` was opened but never closed.
    #[error("unterminated capture in pattern `{0}`")]
    Unterminated(String),

    /// A capture marker without a name (e.g. `/:/x`).
    #[error("empty capture name in pattern `{0}`")]
    EmptyCapture(String),

    /// The generated expression (or a capture constraint) is invalid.
    #[error("invalid expression for pattern `{pattern}`: {source}")]
    Regex {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Errors raised while expanding a pattern back into a path.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpandError {
    /// A required capture had no value.
    #[error("missing value for `{name}` while expanding `{pattern}`")]
    MissingParam { pattern: String, name: String },
}

/// Errors produced by route resolution and router construction.
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The endpoint spec does not name anything callable.
    #[error("cannot resolve endpoint `{spec}`")]
    UnresolvedEndpoint { spec: String },

    /// Two routes in the same router tree share a name.
    #[error("route name `{0}` is already registered")]
    DuplicateRouteName(String),

    /// Reverse routing was asked for a name nobody registered.
    #[error("no route named `{0}`")]
    UnknownRouteName(String),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error(transparent)]
    Expand(#[from] ExpandError),
}

impl RoutingError {
    pub(crate) fn unresolved(spec: impl ToString) -> Self {
        Self::UnresolvedEndpoint {
            spec: spec.to_string(),
        }
    }
}

/// Result type for routing operations.
pub type RoutingResult<T> = Result<T, RoutingError>;

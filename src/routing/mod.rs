//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming RequestContext (method, path, env)
//!     → router.rs (per-method ordered scan)
//!     → route.rs (pattern.rs match, then matcher.rs constraints)
//!         Simple: params = defaults + captures → endpoint chain
//!         Nested: prefix check → sub-router (Pass = keep scanning)
//!     → Outcome: Response, or Pass / 404 when nothing answered
//!
//! Reverse routing:
//!     name → NamedRoutes → Route → PathMatcher::expand(params) → path
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Deterministic: same input always matches same route
//! - First match wins, in declaration order
//! - Dispatch is synchronous; waiting belongs to the endpoint

pub mod context;
pub mod matcher;
pub mod method;
pub mod params;
pub mod pattern;
pub mod response;
pub mod route;
pub mod router;

pub use context::{RequestContext, DEFAULT_PARAMS_KEY};
pub use matcher::{Constraint, Constraints, EnvConstraint, HostConstraint, PathMatcher};
pub use method::Method;
pub use params::{ParamValue, Params, ACTION, CONTROLLER};
pub use pattern::{AdditionalValues, Capture, CaptureRule, CharClass, Pattern, PatternOptions, Style};
pub use response::{Outcome, Response};
pub use route::{NestedRoute, Route, TableEntry};
pub use router::{NamedRoutes, Router, RouterOptions, RoutingTable};

//! Endpoint subsystem.
//!
//! # Data Flow
//! ```text
//! Route declaration (EndpointSpec)
//!     → resolver.rs (symbolic name → handler, via registry.rs + inflect.rs)
//!     → Static: handler + {controller, action} params
//!       Dynamic: dynamic.rs defers the same lookup to request time
//!     → chain.rs (wrap in the scope's middleware, outermost first)
//!     → composed Handler stored on the Route
//! ```
//!
//! # Design Decisions
//! - Symbolic lookup goes through the `Registry` trait, never reflection
//! - Name formatting (naming pattern, namespaces) is pure string logic
//! - Static specs fail at build time; dynamic ones fail per request as a 500
//! - Middleware chains are built once per route, never per request

pub mod action;
pub mod chain;
pub mod controller;
pub mod dynamic;
pub mod inflect;
pub mod redirect;
pub mod registry;
pub mod resolver;

use std::fmt;
use std::sync::Arc;

use crate::routing::context::RequestContext;
use crate::routing::response::Outcome;

pub use action::{ActionContext, ActionEndpoint};
pub use chain::Middleware;
pub use controller::Controller;
pub use dynamic::DynamicEndpoint;
pub use redirect::{RedirectContext, RedirectEndpoint, RedirectTarget};
pub use registry::{EndpointRegistry, Registry};
pub use resolver::{Action, EndpointSpec, Resolved, Resolver, ResolverConfig, Subject};

/// Something that answers a request.
pub trait Endpoint: Send + Sync {
    fn call(&self, ctx: &mut RequestContext) -> Outcome;
}

impl<F> Endpoint for F
where
    F: Fn(&mut RequestContext) -> Outcome + Send + Sync,
{
    fn call(&self, ctx: &mut RequestContext) -> Outcome {
        self(ctx)
    }
}

/// A shared, type-erased endpoint.
pub type Handler = Arc<dyn Endpoint>;

/// Wrap a closure returning anything convertible to [`Outcome`].
pub fn from_fn<F, R>(f: F) -> Handler
where
    F: Fn(&mut RequestContext) -> R + Send + Sync + 'static,
    R: Into<Outcome>,
{
    Arc::new(move |ctx: &mut RequestContext| f(ctx).into())
}

/// A named entry in a [`Registry`].
///
/// Entries without a handler are namespaces: they qualify other names but
/// cannot answer requests themselves.
#[derive(Clone)]
pub struct EndpointRef {
    name: String,
    handler: Option<Handler>,
}

impl EndpointRef {
    pub fn new(name: impl Into<String>, handler: Handler) -> Self {
        Self {
            name: name.into(),
            handler: Some(handler),
        }
    }

    pub fn namespace(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handler: None,
        }
    }

    /// Fully qualified name, e.g. `Dragons::Types::Create`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn handler(&self) -> Option<&Handler> {
        self.handler.as_ref()
    }

    pub fn is_callable(&self) -> bool {
        self.handler.is_some()
    }
}

impl PartialEq for EndpointRef {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && match (&self.handler, &other.handler) {
                (Some(a), Some(b)) => Arc::ptr_eq(a, b),
                (None, None) => true,
                _ => false,
            }
    }
}

impl fmt::Debug for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EndpointRef")
            .field("name", &self.name)
            .field("callable", &self.is_callable())
            .finish()
    }
}

impl fmt::Display for EndpointRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

//! Signpost: a declarative HTTP request router.
//!
//! Routes are declared with a [`Builder`] (or loaded from a TOML file with
//! [`config::load_config`]) and compiled into an immutable [`Router`]. The
//! router answers [`RequestContext`]s on its own; [`HttpServer`] puts it
//! behind Axum.

pub mod builder;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod http;
pub mod observability;
pub mod routing;

pub use builder::Builder;
pub use config::schema::SignpostConfig;
pub use endpoint::{
    from_fn, Controller, Endpoint, EndpointRef, EndpointRegistry, EndpointSpec, Handler,
    Middleware, Registry,
};
pub use error::{RoutingError, RoutingResult};
pub use http::HttpServer;
pub use routing::{
    Method, Outcome, ParamValue, Params, RequestContext, Response, Router, RouterOptions,
};

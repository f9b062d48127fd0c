//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing layer)
//!     → request.rs (request head → RequestContext, body → extensions)
//!     → routing::Router::call
//!     → response.rs (Outcome → HTTP response)
//!     → Send to client
//! ```

pub mod request;
pub mod response;
pub mod server;

pub use request::{context_from_parts, RequestBody, REMOTE_ADDR};
pub use server::{shutdown_signal, HttpServer, RouterService};

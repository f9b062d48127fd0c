//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Router build and dispatch produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (dispatch outcome counters)
//!
//! Consumers:
//!     → stdout via tracing-subscriber
//!     → Metrics endpoint (Prometheus scrape, binary only)
//! ```
//!
//! # Design Decisions
//! - The library only emits; installing subscribers and exporters is left
//!   to the binary (or the embedding application)
//! - Metrics are cheap (atomic increments through the `metrics` facade)

pub mod logging;
pub mod metrics;

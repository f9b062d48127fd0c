//! Metrics collection and exposition.
//!
//! # Metrics
//! - `signpost_dispatch_total` (counter): dispatch decisions by `outcome`
//!   (`matched`, `not_found`, `pass`, `unresolved`)
//! - `signpost_routes` (gauge): routes in the last built root router
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until an
//!   exporter is installed
//! - The Prometheus exporter is opt-in and owned by the binary

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Outcome label values for `signpost_dispatch_total`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// A route's endpoint answered.
    Matched,
    /// A root router found nothing.
    NotFound,
    /// An endpoint declined and the scan continued.
    Pass,
    /// A dynamic endpoint could not resolve its target.
    Unresolved,
}

impl DispatchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            DispatchOutcome::Matched => "matched",
            DispatchOutcome::NotFound => "not_found",
            DispatchOutcome::Pass => "pass",
            DispatchOutcome::Unresolved => "unresolved",
        }
    }
}

pub fn record_dispatch(outcome: DispatchOutcome) {
    metrics::counter!("signpost_dispatch_total", "outcome" => outcome.as_str()).increment(1);
}

pub fn record_route_count(count: usize) {
    metrics::gauge!("signpost_routes").set(count as f64);
}

/// Start the Prometheus scrape endpoint on `addr`.
///
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, address = %addr, "Failed to install metrics exporter"),
    }
}

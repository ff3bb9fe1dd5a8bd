//! Metrics collection and exposition.
//!
//! # Metrics
//! - `waypoint_requests_total` (counter): requests by method, status
//! - `waypoint_request_duration_seconds` (histogram): latency distribution
//! - `waypoint_routes_registered` (gauge): size of the frozen route table
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a
//!   recorder is installed, so tests and `--routes` runs pay nothing
//! - Prometheus exposition is opt-in via `observability.metrics_enabled`

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics recorder"),
    }
}

/// Record one handled request.
pub fn record_request(method: &str, status: u16, start: Instant) {
    let labels = [
        ("method", method.to_string()),
        ("status", status.to_string()),
    ];
    ::metrics::counter!("waypoint_requests_total", &labels).increment(1);
    ::metrics::histogram!("waypoint_request_duration_seconds", &labels)
        .record(start.elapsed().as_secs_f64());
}

/// Record the number of routes once the table is frozen.
pub fn record_route_count(count: usize) {
    ::metrics::gauge!("waypoint_routes_registered").set(count as f64);
}

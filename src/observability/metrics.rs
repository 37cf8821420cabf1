//! Metrics collection and exposition.
//!
//! # Metrics
//! - `gateway_requests_total` (counter): requests by route category, status
//! - `gateway_request_duration_seconds` (histogram): latency by route category
//! - `gateway_download_resolutions_total` (counter): resolver outcomes
//! - `gateway_cache_lookups_total` (counter): cache hits/misses by kind
//!
//! # Design Decisions
//! - Recording is a no-op until the exporter is installed
//! - Low-cardinality labels only (no paths, no item ids)

use metrics::{counter, histogram};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use std::time::Instant;

/// Start the Prometheus scrape endpoint on `addr`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_request(category: &'static str, status: u16, start: Instant) {
    counter!(
        "gateway_requests_total",
        "category" => category,
        "status" => status.to_string()
    )
    .increment(1);
    histogram!("gateway_request_duration_seconds", "category" => category)
        .record(start.elapsed().as_secs_f64());
}

pub fn record_download_resolution(outcome: &'static str) {
    counter!("gateway_download_resolutions_total", "outcome" => outcome).increment(1);
}

pub fn record_cache_lookup(kind: &'static str, result: &'static str) {
    counter!("gateway_cache_lookups_total", "kind" => kind, "result" => result).increment(1);
}

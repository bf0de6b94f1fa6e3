//! Prometheus metrics for gateway observability.
//!
//! Metrics are exposed via a dedicated HTTP listener on a side port
//! (default: 9090, disabled with `METRICS_PORT=0`).
//!
//! # Available Metrics
//!
//! ## Counters
//! - `gateway_analyze_requests_total` - Analyze requests by outcome
//!   (label: outcome = ok | auth_missing | auth_invalid | rate_limited |
//!   invalid_request | provider_transport | provider_malformed | internal)
//! - `gateway_auth_failures_total` - Authentication failures
//! - `gateway_rate_limited_total` - Requests rejected by the rate limiter
//! - `gateway_provider_failures_total` - Provider transport/parse failures
//!
//! ## Histograms
//! - `gateway_provider_duration_seconds` - Completion provider call duration
//!
//! ## Gauges
//! - `gateway_tracked_identities` - Rate-limit windows currently tracked

use std::net::SocketAddr;

use metrics::{
    counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram,
};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing::info;

/// Metric names as constants for consistency.
pub mod names {
    pub const ANALYZE_REQUESTS_TOTAL: &str = "gateway_analyze_requests_total";
    pub const AUTH_FAILURES_TOTAL: &str = "gateway_auth_failures_total";
    pub const RATE_LIMITED_TOTAL: &str = "gateway_rate_limited_total";
    pub const PROVIDER_FAILURES_TOTAL: &str = "gateway_provider_failures_total";
    pub const PROVIDER_DURATION_SECONDS: &str = "gateway_provider_duration_seconds";
    pub const TRACKED_IDENTITIES: &str = "gateway_tracked_identities";
}

/// Initialize the Prometheus metrics exporter.
///
/// Starts the Prometheus HTTP listener on the given address and registers
/// metric descriptions. Call once at startup.
pub fn init_metrics(metrics_addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(metrics_addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {e}"))?;

    describe_counter!(
        names::ANALYZE_REQUESTS_TOTAL,
        "Total analyze requests by outcome"
    );
    describe_counter!(
        names::AUTH_FAILURES_TOTAL,
        "Total authentication failures (missing or invalid key)"
    );
    describe_counter!(
        names::RATE_LIMITED_TOTAL,
        "Total requests rejected by the rate limiter"
    );
    describe_counter!(
        names::PROVIDER_FAILURES_TOTAL,
        "Total completion provider transport and parse failures"
    );
    describe_histogram!(
        names::PROVIDER_DURATION_SECONDS,
        "Completion provider call duration in seconds"
    );
    describe_gauge!(
        names::TRACKED_IDENTITIES,
        "Rate-limit windows currently tracked"
    );

    info!(addr = %metrics_addr, "Prometheus metrics endpoint started");
    Ok(())
}

/// Record an analyze request outcome.
pub fn record_analyze_outcome(outcome: &'static str) {
    counter!(names::ANALYZE_REQUESTS_TOTAL, "outcome" => outcome).increment(1);
}

/// Record an authentication failure.
pub fn record_auth_failure() {
    counter!(names::AUTH_FAILURES_TOTAL).increment(1);
}

/// Record a rate-limit rejection.
pub fn record_rate_limited() {
    counter!(names::RATE_LIMITED_TOTAL).increment(1);
}

/// Record a provider failure (transport or malformed response).
pub fn record_provider_failure(kind: &'static str) {
    counter!(names::PROVIDER_FAILURES_TOTAL, "kind" => kind).increment(1);
}

/// Record the duration of one provider call.
pub fn record_provider_duration(seconds: f64) {
    histogram!(names::PROVIDER_DURATION_SECONDS).record(seconds);
}

/// Update the tracked-identities gauge (set by the eviction sweep).
pub fn set_tracked_identities(count: usize) {
    // Precision loss above 2^52 identities is acceptable for a gauge.
    gauge!(names::TRACKED_IDENTITIES).set(count as f64);
}

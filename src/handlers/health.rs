//! Health and root status endpoints.
//!
//! Neither endpoint requires authentication or consumes rate-limit budget:
//! load balancers and the extension's reachability probe hit them freely.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use tracing::instrument;

use crate::models::{HealthResponse, RootResponse};
use crate::state::AppState;

/// Health check: process status plus the configured model identifier.
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.analyzer.model().to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Root status endpoint for load-balancer health checks.
#[instrument]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        status: "ok".to_string(),
        service: "syndicate-gateway".to_string(),
    })
}

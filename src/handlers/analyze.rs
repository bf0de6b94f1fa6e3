//! `POST /api/v1/analyze` - the gateway entry point.
//!
//! Composes the admission pipeline in strict order, short-circuiting on the
//! first failure:
//!
//! 1. Resolve the caller identity (API key, else network address)
//! 2. Auth guard -> 401 (missing key) / 403 (invalid key)
//! 3. Rate limiter -> 429 with retry-after
//! 4. Document validation -> 400 with reason
//! 5. Analysis orchestrator -> 502 on provider/parse failure
//!
//! An auth failure returns before step 3, so it never consumes the caller's
//! main rate budget; repeated failures are bounded by the guard's own
//! per-address failure window instead.

use std::net::SocketAddr;
use std::time::Instant;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use tracing::{info, instrument, warn};

use crate::auth::AuthDecision;
use crate::error::{AppError, AppResult};
use crate::identity;
use crate::metrics;
use crate::models::{AnalysisResult, AnalyzeRequest};
use crate::rate_limit::Admission;
use crate::state::AppState;
use crate::validation::validate_document;

/// Analyze a Terms of Service document and return the structured risk
/// assessment.
#[instrument(skip(state, headers, peer, body))]
pub async fn analyze(
    State(state): State<AppState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(body): Json<AnalyzeRequest>,
) -> AppResult<Json<AnalysisResult>> {
    // 1. Identity resolution - deterministic, shared by auth and rate limiting
    let caller = identity::resolve(&headers, Some(peer));

    // 2. Auth guard - short-circuits before the rate limiter
    match state.auth.check(caller.api_key.as_deref()) {
        AuthDecision::Authorized => {}
        AuthDecision::Unauthorized => {
            metrics::record_auth_failure();
            // The outcome label must match the status actually returned, so
            // it is recorded only after the flood check resolves.
            if let Some(retry_after) = state.auth.note_failure(&caller.address) {
                metrics::record_analyze_outcome("rate_limited");
                return Err(AppError::RateLimited(retry_after));
            }
            metrics::record_analyze_outcome("auth_missing");
            return Err(AppError::AuthMissing);
        }
        AuthDecision::Forbidden => {
            metrics::record_auth_failure();
            warn!(caller = %caller.audit_label(), "Rejected invalid API key");
            if let Some(retry_after) = state.auth.note_failure(&caller.address) {
                metrics::record_analyze_outcome("rate_limited");
                return Err(AppError::RateLimited(retry_after));
            }
            metrics::record_analyze_outcome("auth_invalid");
            return Err(AppError::AuthInvalid);
        }
    }

    // 3. Rate limiting, keyed by the resolved identity
    if let Admission::Rejected { retry_after } = state.limiter.admit(&caller.key) {
        metrics::record_rate_limited();
        metrics::record_analyze_outcome("rate_limited");
        return Err(AppError::RateLimited(retry_after.as_secs().max(1)));
    }

    // 4. Document validation
    if let Err(e) = validate_document(&body.document_text, state.config.max_document_chars) {
        metrics::record_analyze_outcome("invalid_request");
        return Err(e);
    }

    info!(
        caller = %caller.audit_label(),
        document_chars = body.document_text.chars().count(),
        "Analyze request admitted"
    );

    // 5. Orchestration - the only suspension point; no lock held here
    let started = Instant::now();
    let result = state
        .analyzer
        .analyze(&body.document_text, body.source_url.as_deref())
        .await;
    metrics::record_provider_duration(started.elapsed().as_secs_f64());

    match result {
        Ok(analysis) => {
            metrics::record_analyze_outcome("ok");
            Ok(Json(analysis))
        }
        Err(e @ AppError::ProviderTransport(_)) => {
            metrics::record_provider_failure("transport");
            metrics::record_analyze_outcome("provider_transport");
            Err(e)
        }
        Err(e @ AppError::ProviderMalformed { .. }) => {
            metrics::record_provider_failure("malformed");
            metrics::record_analyze_outcome("provider_malformed");
            Err(e)
        }
        Err(e) => {
            metrics::record_analyze_outcome("internal");
            Err(e)
        }
    }
}

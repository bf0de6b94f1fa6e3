use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Application-wide error taxonomy with stable HTTP mappings.
///
/// The first four variants are expected, caller-facing outcomes and carry
/// specific, actionable messages. The provider and internal variants are
/// deliberately generic at the HTTP boundary: their details (error kind,
/// payload lengths, identity) go to server-side logs only, never to the
/// untrusted caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing X-API-Key header")]
    AuthMissing,

    #[error("Invalid API key")]
    AuthInvalid,

    #[error("Rate limit exceeded, retry after {0}s")]
    RateLimited(u64),

    #[error("Invalid request: {0}")]
    ValidationFailed(String),

    #[error("Completion provider transport failure: {0}")]
    ProviderTransport(String),

    #[error("Completion provider returned a malformed response ({raw_len} bytes)")]
    ProviderMalformed { raw_len: usize },

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Error response body for API endpoints.
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail server-side; sanitized message to the client.
        tracing::error!(error = %self, "Request failed");

        let (status, error_type, message, retry_after) = match &self {
            AppError::AuthMissing => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Missing X-API-Key header.".to_string(),
                None,
            ),
            AppError::AuthInvalid => (
                StatusCode::FORBIDDEN,
                "forbidden",
                "Invalid API key.".to_string(),
                None,
            ),
            AppError::RateLimited(secs) => (
                StatusCode::TOO_MANY_REQUESTS,
                "too_many_requests",
                "Rate limit exceeded. Please try again later.".to_string(),
                Some(*secs),
            ),
            AppError::ValidationFailed(reason) => (
                StatusCode::BAD_REQUEST,
                "bad_request",
                reason.clone(),
                None,
            ),
            // Provider failures - never leak transport details or raw payloads
            AppError::ProviderTransport(_) => (
                StatusCode::BAD_GATEWAY,
                "provider_unavailable",
                "Analysis provider is unavailable. Please try again later.".to_string(),
                None,
            ),
            AppError::ProviderMalformed { .. } => (
                StatusCode::BAD_GATEWAY,
                "provider_error",
                "Analysis provider returned an unusable response. Please try again.".to_string(),
                None,
            ),
            // Internal errors - never expose internal details to clients
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "internal_error",
                "Internal server error during analysis.".to_string(),
                None,
            ),
            AppError::ConfigError(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "config_error",
                "Service configuration error. Please contact support.".to_string(),
                None,
            ),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            retry_after,
        };

        let mut response = (status, axum::Json(body)).into_response();

        // Standard Retry-After header alongside the JSON body
        if let AppError::RateLimited(secs) = &self
            && let Ok(value) = secs.to_string().parse()
        {
            response.headers_mut().insert("Retry-After", value);
        }

        response
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_missing_maps_to_401() {
        let response = AppError::AuthMissing.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_invalid_maps_to_403() {
        let response = AppError::AuthInvalid.into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_rate_limited_maps_to_429_with_header() {
        let response = AppError::RateLimited(42).into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(
            response
                .headers()
                .get("Retry-After")
                .unwrap()
                .to_str()
                .unwrap(),
            "42"
        );
    }

    #[test]
    fn test_validation_failed_maps_to_400() {
        let response =
            AppError::ValidationFailed("document_text cannot be empty".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_failures_map_to_502() {
        let transport = AppError::ProviderTransport("connection refused".into()).into_response();
        assert_eq!(transport.status(), StatusCode::BAD_GATEWAY);

        let malformed = AppError::ProviderMalformed { raw_len: 17 }.into_response();
        assert_eq!(malformed.status(), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_internal_maps_to_500() {
        let response = AppError::Internal("boom".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_malformed_display_carries_length_not_content() {
        let err = AppError::ProviderMalformed { raw_len: 128 };
        assert!(err.to_string().contains("128 bytes"));
    }
}

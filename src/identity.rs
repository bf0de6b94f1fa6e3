//! Caller identity resolution.
//!
//! A single identity string keys both authentication auditing and rate-limit
//! accounting: the presented API key when one exists, otherwise the caller's
//! network address. Resolution is deterministic and side-effect free, so the
//! auth guard and the rate limiter always see the same bucket for a given
//! caller.
//!
//! # Security Warning: IP Spoofing Risk
//!
//! The address fallback trusts proxy headers (`X-Forwarded-For`,
//! `X-Real-IP`) before the transport peer address. Deploy behind a reverse
//! proxy that overwrites these headers; a caller reaching the gateway
//! directly can otherwise rotate spoofed addresses to dodge per-address
//! limiting. Requests with no headers and no peer address all share the
//! [`UNKNOWN_ADDR`] bucket, which collectively rate-limits them.

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Header name carrying the client API key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Fallback identity when no client address can be determined.
pub const UNKNOWN_ADDR: &str = "unknown";

/// Resolved caller identity for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallerIdentity {
    /// The identity string used for rate-limit accounting and audit logs.
    pub key: String,
    /// The API key as presented, if any.
    pub api_key: Option<String>,
    /// The caller's network address (always resolved, even when an API key
    /// is present, for auth-failure accounting).
    pub address: String,
}

impl CallerIdentity {
    /// Abbreviate the identity for logging: never log full API keys.
    pub fn audit_label(&self) -> String {
        match &self.api_key {
            Some(key) => match (key.get(..8), key.get(key.len().saturating_sub(4)..)) {
                (Some(head), Some(tail)) if key.len() > 12 => format!("{head}…{tail}"),
                _ => "key:redacted".to_string(),
            },
            None => format!("addr:{}", self.address),
        }
    }
}

/// Resolve the caller identity from request headers and the transport-level
/// peer address.
///
/// Policy: a non-empty `X-API-Key` header value is the identity; otherwise
/// the client network address is.
pub fn resolve(headers: &HeaderMap, peer: Option<SocketAddr>) -> CallerIdentity {
    let api_key = presented_api_key(headers);
    let address = client_address(headers, peer).into_owned();

    let key = match &api_key {
        Some(key) => key.clone(),
        None => address.clone(),
    };

    CallerIdentity {
        key,
        api_key,
        address,
    }
}

/// The `X-API-Key` header value, if present and non-empty.
pub fn presented_api_key(headers: &HeaderMap) -> Option<String> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}

/// Extract the client network address.
///
/// Checks in order (returns first match):
/// 1. `X-Forwarded-For` header (first address in a comma-separated list)
/// 2. `X-Real-IP` header
/// 3. The transport peer address
/// 4. Falls back to [`UNKNOWN_ADDR`]
pub fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>) -> Cow<'static, str> {
    // X-Forwarded-For format: "client, proxy1, proxy2" - first is the client
    if let Some(forwarded) = headers.get("x-forwarded-for")
        && let Ok(value) = forwarded.to_str()
        && let Some(first) = value.split(',').next()
        && !first.trim().is_empty()
    {
        return Cow::Owned(first.trim().to_string());
    }

    if let Some(real_ip) = headers.get("x-real-ip")
        && let Ok(value) = real_ip.to_str()
        && !value.trim().is_empty()
    {
        return Cow::Owned(value.trim().to_string());
    }

    match peer {
        Some(addr) => Cow::Owned(addr.ip().to_string()),
        None => Cow::Borrowed(UNKNOWN_ADDR),
    }
}

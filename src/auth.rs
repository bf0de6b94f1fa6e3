//! API key authentication against a configured allow-set.
//!
//! # Policy
//!
//! - No key presented: `Unauthorized` (401). A key is required even when the
//!   allow-set is empty - this is a deliberate boundary, not an accident.
//! - Key presented, allow-set non-empty and key not a member: `Forbidden` (403).
//! - Key presented, allow-set empty or key is a member: `Authorized`.
//!
//! The check itself is pure: it reads only the presented key and the
//! immutable allow-set loaded at startup.
//!
//! # Brute Force Protection
//!
//! Auth failures never touch the main per-identity rate counter (they
//! short-circuit before it), so unauthenticated flooding is bounded
//! separately: the guard owns a per-address fixed-window failure counter
//! that only auth failures feed. Once an address exhausts it, further
//! requests from that address are rejected up front.
//!
//! # Security
//!
//! Membership tests use constant-time comparison (`subtle`) to prevent
//! timing attacks on key validation.

use std::time::Duration;

use subtle::ConstantTimeEq;
use tracing::warn;

use crate::rate_limit::{Admission, FixedWindowLimiter, RatePolicy};

/// Auth failures tolerated per address per minute before blocking.
const AUTH_FAILURE_CAPACITY: u32 = 10;

/// Window for the per-address auth failure counter.
const AUTH_FAILURE_WINDOW: Duration = Duration::from_secs(60);

/// Outcome of an authentication check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthDecision {
    /// Key presented and accepted.
    Authorized,
    /// No key presented at all (HTTP 401).
    Unauthorized,
    /// Key presented but not in the non-empty allow-set (HTTP 403).
    Forbidden,
}

/// Immutable allow-set of client API keys plus the failure tracker.
pub struct AuthGuard {
    allowed_keys: Vec<String>,
    failure_windows: FixedWindowLimiter,
}

impl AuthGuard {
    /// Create a guard over the configured allow-set.
    pub fn new(allowed_keys: Vec<String>) -> Self {
        Self {
            allowed_keys,
            failure_windows: FixedWindowLimiter::new(RatePolicy {
                capacity: AUTH_FAILURE_CAPACITY,
                window: AUTH_FAILURE_WINDOW,
            }),
        }
    }

    /// Whether an allow-set is enforced (non-empty).
    pub fn is_enforced(&self) -> bool {
        !self.allowed_keys.is_empty()
    }

    /// Pure check of a presented key against the allow-set.
    pub fn check(&self, presented: Option<&str>) -> AuthDecision {
        let Some(key) = presented else {
            return AuthDecision::Unauthorized;
        };

        if self.allowed_keys.is_empty() {
            // Auth disabled: any presented key is accepted.
            return AuthDecision::Authorized;
        }

        if self.is_member(key) {
            AuthDecision::Authorized
        } else {
            AuthDecision::Forbidden
        }
    }

    /// Record an auth failure for `address` and report whether the address
    /// has exhausted its failure budget.
    ///
    /// Returns `Some(retry_after_secs)` when the address is now blocked.
    pub fn note_failure(&self, address: &str) -> Option<u64> {
        match self.failure_windows.admit(address) {
            Admission::Admitted => None,
            Admission::Rejected { retry_after } => {
                let secs = retry_after.as_secs().max(1);
                warn!(
                    address = %address,
                    retry_after_secs = secs,
                    "Address blocked after repeated auth failures"
                );
                Some(secs)
            }
        }
    }

    /// Constant-time membership test.
    ///
    /// Every configured key is compared regardless of earlier matches so
    /// the duration does not depend on which key (if any) matched.
    fn is_member(&self, presented: &str) -> bool {
        let presented = presented.as_bytes();
        let mut matched = subtle::Choice::from(0u8);
        for key in &self.allowed_keys {
            matched |= key.as_bytes().ct_eq(presented);
        }
        matched.into()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn guard(keys: &[&str]) -> AuthGuard {
        AuthGuard::new(keys.iter().map(|k| (*k).to_string()).collect())
    }

    #[test]
    fn test_missing_key_is_unauthorized() {
        assert_eq!(guard(&["key-1"]).check(None), AuthDecision::Unauthorized);
    }

    #[test]
    fn test_missing_key_is_unauthorized_even_with_empty_allow_set() {
        // A key is required even when the allow-set is empty.
        assert_eq!(guard(&[]).check(None), AuthDecision::Unauthorized);
    }

    #[test]
    fn test_empty_allow_set_admits_any_presented_key() {
        assert_eq!(
            guard(&[]).check(Some("anything-at-all")),
            AuthDecision::Authorized
        );
    }

    #[test]
    fn test_member_key_is_authorized() {
        let guard = guard(&["key-1", "key-2"]);
        assert_eq!(guard.check(Some("key-1")), AuthDecision::Authorized);
        assert_eq!(guard.check(Some("key-2")), AuthDecision::Authorized);
    }

    #[test]
    fn test_unknown_key_is_forbidden() {
        assert_eq!(
            guard(&["key-1"]).check(Some("key-2")),
            AuthDecision::Forbidden
        );
    }

    #[test]
    fn test_check_is_pure_and_repeatable() {
        let guard = guard(&["key-1"]);
        for _ in 0..3 {
            assert_eq!(guard.check(Some("wrong")), AuthDecision::Forbidden);
        }
    }

    #[test]
    fn test_is_enforced() {
        assert!(guard(&["key-1"]).is_enforced());
        assert!(!guard(&[]).is_enforced());
    }

    #[test]
    fn test_failure_budget_blocks_after_capacity() {
        let guard = guard(&["key-1"]);

        for _ in 0..AUTH_FAILURE_CAPACITY {
            assert_eq!(guard.note_failure("203.0.113.50"), None);
        }

        let blocked = guard.note_failure("203.0.113.50");
        assert!(blocked.is_some());
        assert!(blocked.unwrap() >= 1);
    }

    #[test]
    fn test_failure_budget_is_per_address() {
        let guard = guard(&["key-1"]);

        for _ in 0..AUTH_FAILURE_CAPACITY {
            assert_eq!(guard.note_failure("203.0.113.50"), None);
        }

        assert_eq!(guard.note_failure("203.0.113.51"), None);
    }
}

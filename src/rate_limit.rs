//! Per-identity rate limiting using fixed-window counting.
//!
//! # Algorithm
//!
//! Each identity (API key or client address) owns a counting window of fixed
//! duration. The first request from an identity, or the first request after
//! the stored window has ended, opens a fresh window with `count = 1`. Within
//! a live window the counter is incremented; once it exceeds the configured
//! capacity the request is rejected with the time remaining until the window
//! resets.
//!
//! # Fairness Trade-off
//!
//! Fixed windows permit up to 2x capacity across a window boundary: a client
//! can spend the full capacity at the end of one window and again immediately
//! after the reset. This is accepted for per-identity memory simplicity; a
//! sliding-window or token-bucket limiter could be substituted behind the
//! same `admit`/`Rejected(retry_after)` contract, at the cost of changing
//! observable retry-after semantics.
//!
//! # Concurrency
//!
//! The read-check-increment sequence must be atomic per identity, otherwise
//! two concurrent requests could both observe a count below capacity and both
//! be admitted. A single `std::sync::Mutex` over the window map linearizes
//! all admissions; it is never held across an await point.
//!
//! # Memory
//!
//! The map grows with distinct identities, so [`FixedWindowLimiter::sweep`]
//! evicts windows whose reset time lies more than one full window duration in
//! the past. The application state runs the sweep on a background task.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

/// Windows whose end passed more than this many window durations ago are
/// removed by [`FixedWindowLimiter::sweep`].
const SWEEP_STALE_WINDOWS: u32 = 1;

/// Fixed-window rate policy: `capacity` admissions per `window`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RatePolicy {
    /// Maximum admitted requests per window
    pub capacity: u32,
    /// Window duration
    pub window: Duration,
}

impl Default for RatePolicy {
    fn default() -> Self {
        Self {
            capacity: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl fmt::Display for RatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}s", self.capacity, self.window.as_secs())
    }
}

/// Error parsing a `count/window` policy string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RatePolicyParseError(String);

impl fmt::Display for RatePolicyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected \"count/window\", e.g. \"10/minute\"",
            self.0
        )
    }
}

impl std::error::Error for RatePolicyParseError {}

impl FromStr for RatePolicy {
    type Err = RatePolicyParseError;

    /// Parse a policy string such as `10/minute`, `5/second`, `1000/hour`,
    /// or `100/day`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (count, unit) = s
            .split_once('/')
            .ok_or_else(|| RatePolicyParseError(format!("missing '/' in {s:?}")))?;

        let capacity: u32 = count
            .trim()
            .parse()
            .map_err(|_| RatePolicyParseError(format!("invalid count in {s:?}")))?;

        if capacity == 0 {
            return Err(RatePolicyParseError(format!("count must be > 0 in {s:?}")));
        }

        let window = match unit.trim().to_ascii_lowercase().as_str() {
            "second" | "seconds" => Duration::from_secs(1),
            "minute" | "minutes" => Duration::from_secs(60),
            "hour" | "hours" => Duration::from_secs(3600),
            "day" | "days" => Duration::from_secs(86400),
            other => {
                return Err(RatePolicyParseError(format!(
                    "unknown window unit {other:?} in {s:?}"
                )));
            }
        };

        Ok(Self { capacity, window })
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Request admitted; counter incremented.
    Admitted,
    /// Request rejected; `retry_after` is the time until the window resets.
    Rejected { retry_after: Duration },
}

impl Admission {
    /// Whether the request was admitted.
    pub fn is_admitted(&self) -> bool {
        matches!(self, Admission::Admitted)
    }
}

/// Per-identity counter state.
#[derive(Debug, Clone, Copy)]
struct Window {
    count: u32,
    opened_at: Instant,
}

/// Fixed-window rate limiter keyed by identity string.
///
/// Constructed explicitly and shared by handle (`Arc`), never a global, so
/// tests can build isolated instances per case.
pub struct FixedWindowLimiter {
    policy: RatePolicy,
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Create a limiter with the given policy.
    pub fn new(policy: RatePolicy) -> Self {
        Self {
            policy,
            windows: Mutex::new(HashMap::new()),
        }
    }

    /// The configured policy.
    pub fn policy(&self) -> RatePolicy {
        self.policy
    }

    /// Check and consume one unit of budget for `identity`.
    pub fn admit(&self, identity: &str) -> Admission {
        self.admit_at(identity, Instant::now())
    }

    /// Admission check against an explicit clock reading. Exposed for tests
    /// that need to cross window boundaries without sleeping.
    pub fn admit_at(&self, identity: &str, now: Instant) -> Admission {
        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            // A poisoned lock means another thread panicked mid-update; the
            // counter state is still a plain integer map, so keep serving.
            Err(poisoned) => poisoned.into_inner(),
        };

        match windows.get_mut(identity) {
            Some(window) if now < window.opened_at + self.policy.window => {
                window.count += 1;
                if window.count > self.policy.capacity {
                    let retry_after = (window.opened_at + self.policy.window) - now;
                    debug!(
                        identity = %identity,
                        count = window.count,
                        capacity = self.policy.capacity,
                        "Admission rejected"
                    );
                    Admission::Rejected { retry_after }
                } else {
                    Admission::Admitted
                }
            }
            // No window yet, or the stored window has ended: open a new one.
            _ => {
                windows.insert(
                    identity.to_string(),
                    Window {
                        count: 1,
                        opened_at: now,
                    },
                );
                Admission::Admitted
            }
        }
    }

    /// Current counter for `identity` within its live window, if any.
    ///
    /// Used by tests to assert that short-circuited requests (401/403) never
    /// consumed budget.
    pub fn current_count(&self, identity: &str) -> Option<u32> {
        let windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        windows.get(identity).map(|w| w.count)
    }

    /// Number of tracked identities (live and stale).
    pub fn tracked_identities(&self) -> usize {
        let windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        windows.len()
    }

    /// Evict windows whose reset time lies more than [`SWEEP_STALE_WINDOWS`]
    /// window durations in the past. Returns the number of evicted entries.
    pub fn sweep(&self) -> usize {
        self.sweep_at(Instant::now())
    }

    /// Sweep against an explicit clock reading (for tests).
    pub fn sweep_at(&self, now: Instant) -> usize {
        let horizon = self.policy.window * (1 + SWEEP_STALE_WINDOWS);

        let mut windows = match self.windows.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        let before = windows.len();
        windows.retain(|_, w| now < w.opened_at + horizon);
        let evicted = before - windows.len();

        if evicted > 0 {
            warn!(
                evicted,
                remaining = windows.len(),
                "Evicted stale rate-limit windows"
            );
        }

        evicted
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn limiter(capacity: u32, window_secs: u64) -> FixedWindowLimiter {
        FixedWindowLimiter::new(RatePolicy {
            capacity,
            window: Duration::from_secs(window_secs),
        })
    }

    #[test]
    fn test_policy_parse_minute() {
        let policy: RatePolicy = "10/minute".parse().unwrap();
        assert_eq!(policy.capacity, 10);
        assert_eq!(policy.window, Duration::from_secs(60));
    }

    #[test]
    fn test_policy_parse_other_units() {
        assert_eq!(
            "5/second".parse::<RatePolicy>().unwrap().window,
            Duration::from_secs(1)
        );
        assert_eq!(
            "1000/hour".parse::<RatePolicy>().unwrap().window,
            Duration::from_secs(3600)
        );
        assert_eq!(
            "100/day".parse::<RatePolicy>().unwrap().window,
            Duration::from_secs(86400)
        );
    }

    #[test]
    fn test_policy_parse_rejects_garbage() {
        assert!("".parse::<RatePolicy>().is_err());
        assert!("10".parse::<RatePolicy>().is_err());
        assert!("ten/minute".parse::<RatePolicy>().is_err());
        assert!("10/fortnight".parse::<RatePolicy>().is_err());
        assert!("0/minute".parse::<RatePolicy>().is_err());
    }

    #[test]
    fn test_capacity_admitted_then_rejected() {
        let limiter = limiter(10, 60);
        let now = Instant::now();

        for i in 0..10 {
            assert!(
                limiter.admit_at("key-1", now).is_admitted(),
                "request {} should be admitted",
                i + 1
            );
        }

        match limiter.admit_at("key-1", now) {
            Admission::Rejected { retry_after } => {
                assert!(retry_after > Duration::ZERO);
                assert!(retry_after <= Duration::from_secs(60));
            }
            Admission::Admitted => panic!("11th request should be rejected"),
        }
    }

    #[test]
    fn test_window_boundary_resets_count() {
        let limiter = limiter(2, 60);
        let start = Instant::now();

        assert!(limiter.admit_at("key-1", start).is_admitted());
        assert!(limiter.admit_at("key-1", start).is_admitted());
        assert!(!limiter.admit_at("key-1", start).is_admitted());

        // Past the boundary: fresh window, admitted again
        let later = start + Duration::from_secs(61);
        assert!(limiter.admit_at("key-1", later).is_admitted());
        assert_eq!(limiter.current_count("key-1"), Some(1));
    }

    #[test]
    fn test_retry_after_shrinks_with_elapsed_time() {
        let limiter = limiter(1, 60);
        let start = Instant::now();

        assert!(limiter.admit_at("key-1", start).is_admitted());

        let mid = start + Duration::from_secs(45);
        match limiter.admit_at("key-1", mid) {
            Admission::Rejected { retry_after } => {
                assert_eq!(retry_after, Duration::from_secs(15));
            }
            Admission::Admitted => panic!("should be rejected"),
        }
    }

    #[test]
    fn test_identities_are_independent() {
        let limiter = limiter(1, 60);
        let now = Instant::now();

        assert!(limiter.admit_at("key-1", now).is_admitted());
        assert!(!limiter.admit_at("key-1", now).is_admitted());
        // A different identity still has a full budget
        assert!(limiter.admit_at("203.0.113.50", now).is_admitted());
    }

    #[test]
    fn test_lazy_window_creation() {
        let limiter = limiter(10, 60);
        assert_eq!(limiter.current_count("never-seen"), None);
        assert_eq!(limiter.tracked_identities(), 0);

        limiter.admit("key-1");
        assert_eq!(limiter.current_count("key-1"), Some(1));
        assert_eq!(limiter.tracked_identities(), 1);
    }

    #[test]
    fn test_sweep_evicts_only_stale_windows() {
        let limiter = limiter(10, 60);
        let start = Instant::now();

        limiter.admit_at("old", start);
        limiter.admit_at("fresh", start + Duration::from_secs(100));

        // At +130s: "old" ended at +60s and has been stale for 70s (> one
        // window); "fresh" ends at +160s and is still live.
        let evicted = limiter.sweep_at(start + Duration::from_secs(130));
        assert_eq!(evicted, 1);
        assert_eq!(limiter.tracked_identities(), 1);
        assert_eq!(limiter.current_count("fresh"), Some(1));
    }

    #[test]
    fn test_sweep_keeps_live_windows() {
        let limiter = limiter(10, 60);
        let now = Instant::now();
        limiter.admit_at("key-1", now);

        assert_eq!(limiter.sweep_at(now + Duration::from_secs(30)), 0);
        assert_eq!(limiter.current_count("key-1"), Some(1));
    }
}

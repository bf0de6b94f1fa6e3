//! Shared application state for Axum handlers.
//!
//! All process-wide state (the API key allow-set, the rate-limit windows,
//! the analysis service) is explicitly constructed here and shared by
//! handle - no global singletons - so tests can build isolated instances
//! per case.
//!
//! # Thread Safety
//!
//! Every component is wrapped in `Arc`; the rate limiter uses interior
//! mutability with a mutex that is never held across an await point.
//!
//! # Structured Concurrency
//!
//! The rate-limit eviction sweep runs on a background task managed by
//! `tokio_util::task::TaskTracker` and a `CancellationToken`. Call
//! [`AppState::shutdown`] to stop it before process exit.

use std::sync::Arc;
use std::time::Instant;

use tokio::time::interval;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info};

use crate::analyzer::AnalysisService;
use crate::auth::AuthGuard;
use crate::config::Config;
use crate::error::AppResult;
use crate::metrics;
use crate::rate_limit::FixedWindowLimiter;

/// Shared application state, cloned into each request handler.
#[derive(Clone)]
pub struct AppState {
    /// API key allow-set guard
    pub auth: Arc<AuthGuard>,
    /// Per-identity fixed-window rate limiter
    pub limiter: Arc<FixedWindowLimiter>,
    /// Analysis orchestrator (owns the provider client)
    pub analyzer: Arc<AnalysisService>,
    /// Application configuration
    pub config: Arc<Config>,
    /// Timestamp when the application started
    pub started_at: Instant,
    /// Tracks spawned background tasks for graceful shutdown
    task_tracker: TaskTracker,
    /// Cancellation token for signaling background tasks to stop
    cancellation_token: CancellationToken,
}

impl AppState {
    /// Build the application state from configuration.
    ///
    /// Spawns the rate-limit eviction sweep as a background task; call
    /// [`AppState::shutdown`] to terminate it gracefully.
    pub fn new(config: Config) -> AppResult<Self> {
        let auth = Arc::new(AuthGuard::new(config.allowed_api_keys.clone()));
        let limiter = Arc::new(FixedWindowLimiter::new(config.rate_limit));
        let analyzer = Arc::new(AnalysisService::from_config(&config)?);

        let state = Self {
            auth,
            limiter,
            analyzer,
            config: Arc::new(config),
            started_at: Instant::now(),
            task_tracker: TaskTracker::new(),
            cancellation_token: CancellationToken::new(),
        };

        state.spawn_window_sweep_task();

        Ok(state)
    }

    /// Spawn the background eviction sweep for stale rate-limit windows.
    ///
    /// Without this the window map grows with every distinct identity ever
    /// seen. The sweep runs once per window duration.
    fn spawn_window_sweep_task(&self) {
        let limiter = self.limiter.clone();
        let period = self.config.rate_limit.window;
        let cancel = self.cancellation_token.clone();

        self.task_tracker.spawn(async move {
            let mut ticker = interval(period);
            ticker.tick().await; // Skip the first immediate tick

            loop {
                tokio::select! {
                    biased; // Check cancellation first

                    _ = cancel.cancelled() => {
                        debug!("Window sweep task received cancellation signal");
                        break;
                    }
                    _ = ticker.tick() => {
                        let evicted = limiter.sweep();
                        let tracked = limiter.tracked_identities();
                        metrics::set_tracked_identities(tracked);
                        if evicted > 0 {
                            debug!(evicted, tracked, "Window sweep completed");
                        }
                    }
                }
            }

            debug!("Window sweep task shutting down");
        });
    }

    /// Gracefully shutdown all background tasks.
    pub async fn shutdown(&self) {
        info!("Initiating graceful shutdown of background tasks");

        self.cancellation_token.cancel();
        self.task_tracker.close();
        self.task_tracker.wait().await;

        info!("All background tasks have completed");
    }

    /// Get the application uptime in seconds.
    pub fn uptime_seconds(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

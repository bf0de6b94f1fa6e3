//! # Syndicate Gateway
//!
//! An HTTP gateway that fronts an LLM completion provider for Terms of
//! Service analysis, featuring:
//!
//! - **Security**: API key allow-set, per-identity rate limiting, input
//!   validation
//! - **Resilience**: Provider timeouts, stable 502 mapping for upstream
//!   failures
//! - **Observability**: Request IDs, structured logging, Prometheus metrics
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      Axum HTTP Server                       │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Middleware (Request ID → Trace → CORS → Body Limit)        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  Admission (identity → auth guard → rate limit → validate)  │
//! ├─────────────────────────────────────────────────────────────┤
//! │  AnalysisService (prompt assembly, reply parsing)           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  CompletionClient (OpenAI-compatible chat completions)      │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use syndicate_gateway::{AppState, Config, build_router};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let state = AppState::new(config)?;
//!     let app = build_router(state);
//!
//!     // Start the server...
//!     Ok(())
//! }
//! ```
//!
//! ## Security Configuration
//!
//! Enforce the API key allow-set (comma-separated; empty accepts any
//! presented key):
//! ```bash
//! ALLOWED_API_KEYS=key-one,key-two cargo run
//! ```
//!
//! Tune the rate limit:
//! ```bash
//! RATE_LIMIT=10/minute cargo run
//! ```

pub mod analyzer;
pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod identity;
pub mod metrics;
pub mod models;
pub mod provider;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod utils;
pub mod validation;

// Re-exports for convenience
pub use config::Config;
pub use error::{AppError, AppResult};
pub use routes::build_router;
pub use state::AppState;

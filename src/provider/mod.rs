//! Completion provider client (OpenAI-compatible chat completions).
//!
//! The gateway consumes a single provider operation:
//! `complete(system, user) -> raw text | transport error`. The provider is
//! opaque; the original deployment targets Groq-hosted Llama 3.3 70B, but any
//! OpenAI-compatible endpoint works via `PROVIDER_BASE_URL`/`MODEL_NAME`.
//!
//! Every call requests a JSON-formatted completion at low sampling
//! temperature with a bounded output-token budget, and is bounded by the
//! configured timeout. A timed-out call is indistinguishable from any other
//! transport failure at the boundary (502). Calls are never retried here.

mod prompt;

pub use prompt::ANALYSIS_SYSTEM_PROMPT;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    system_prompt: String,
}

/// Outbound chat-completion request body.
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat<'a>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat<'a> {
    #[serde(rename = "type")]
    kind: &'a str,
}

/// Inbound chat-completion response body (only the fields we read).
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl CompletionClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::ConfigError` if the underlying HTTP client cannot
    /// be constructed.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.provider_timeout)
            .build()
            .map_err(|e| AppError::ConfigError(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.provider_base_url.trim_end_matches('/').to_string(),
            api_key: config.provider_api_key.clone(),
            model: config.model_name.clone(),
            temperature: config.completion_temperature,
            max_tokens: config.completion_max_tokens,
            system_prompt: config
                .system_prompt
                .clone()
                .unwrap_or_else(|| ANALYSIS_SYSTEM_PROMPT.to_string()),
        })
    }

    /// The configured model identifier (exposed on `/health`).
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Issue one JSON-mode completion and return the raw completion text.
    ///
    /// # Errors
    ///
    /// - `AppError::ProviderTransport` on connection, timeout, or non-2xx
    ///   status from the provider
    /// - `AppError::ProviderMalformed` when the provider envelope itself is
    ///   unusable (no choice, missing content)
    pub async fn complete(&self, user_message: &str) -> AppResult<String> {
        let body = ChatCompletionRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &self.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            response_format: ResponseFormat { kind: "json_object" },
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::ProviderTransport(provider_error_kind(&e)))?;

        let status = response.status();
        if !status.is_success() {
            // Status only; the error body may echo provider internals.
            return Err(AppError::ProviderTransport(format!(
                "provider returned HTTP {status}"
            )));
        }

        let envelope: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|_| AppError::ProviderMalformed { raw_len: 0 })?;

        let content = envelope
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(AppError::ProviderMalformed { raw_len: 0 })?;

        debug!(raw_len = content.len(), "Received completion");
        Ok(content)
    }
}

/// Describe a reqwest error without echoing URLs or response bodies.
fn provider_error_kind(e: &reqwest::Error) -> String {
    if e.is_timeout() {
        "timeout".to_string()
    } else if e.is_connect() {
        "connection failure".to_string()
    } else {
        "request failure".to_string()
    }
}

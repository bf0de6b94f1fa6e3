//! Analysis orchestration: prompt construction, provider invocation, and
//! response parsing/validation.
//!
//! One provider call per `analyze` invocation - no retries, no caching;
//! identical inputs re-invoke the provider every time. The raw completion is
//! parsed through an explicit tagged union ([`ProviderReply`]) so both
//! branches of the "anything-shaped" provider output are handled at the
//! boundary, and diagnostics carry only the raw text LENGTH, never its
//! content.

use serde_json::Value;
use tracing::{error, info};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::models::AnalysisResult;
use crate::provider::CompletionClient;

/// Outcome of parsing the provider's raw completion text.
#[derive(Debug)]
pub enum ProviderReply {
    /// Syntactically valid JSON.
    Parsed(Value),
    /// Not JSON; carries the raw length for diagnostics.
    Malformed { raw_len: usize },
}

/// Parse raw completion text strictly as JSON.
pub fn parse_reply(raw: &str) -> ProviderReply {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => ProviderReply::Parsed(value),
        Err(_) => ProviderReply::Malformed { raw_len: raw.len() },
    }
}

/// Orchestrates one document analysis against the completion provider.
pub struct AnalysisService {
    client: CompletionClient,
}

impl AnalysisService {
    /// Build the service from configuration.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        Ok(Self {
            client: CompletionClient::from_config(config)?,
        })
    }

    /// The configured model identifier (exposed on `/health`).
    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// Analyze a Terms of Service document.
    ///
    /// # Errors
    ///
    /// - `AppError::ProviderTransport` on connection/timeout/HTTP failure
    /// - `AppError::ProviderMalformed` when the completion is not JSON or
    ///   does not match the response schema (including out-of-range
    ///   severities)
    pub async fn analyze(
        &self,
        document_text: &str,
        source_url: Option<&str>,
    ) -> AppResult<AnalysisResult> {
        let user_message = build_user_message(document_text, source_url);

        info!(
            document_chars = document_text.chars().count(),
            has_source_url = source_url.is_some(),
            model = self.client.model(),
            "Sending analysis request to completion provider"
        );

        let raw = self.client.complete(&user_message).await?;

        let value = match parse_reply(&raw) {
            ProviderReply::Parsed(value) => value,
            ProviderReply::Malformed { raw_len } => {
                error!(raw_len, "Provider completion is not valid JSON");
                return Err(AppError::ProviderMalformed { raw_len });
            }
        };

        let raw_len = raw.len();
        let result: AnalysisResult = serde_json::from_value(value).map_err(|e| {
            error!(raw_len, error = %e, "Provider JSON does not match the response schema");
            AppError::ProviderMalformed { raw_len }
        })?;

        if !result.severities_in_range() {
            error!(raw_len, "Provider reported a severity outside 0..=3");
            return Err(AppError::ProviderMalformed { raw_len });
        }

        Ok(result)
    }
}

/// Compose the user message: optional source URL line, then the document.
fn build_user_message(document_text: &str, source_url: Option<&str>) -> String {
    let analysis = format!("Analyze this Terms of Service:\n\n{document_text}");
    match source_url {
        Some(url) => format!("Source URL: {url}\n\n{analysis}"),
        None => analysis,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn valid_reply() -> &'static str {
        r#"{
            "overallSeverity": 0,
            "category": "search",
            "serviceName": "ExampleSearch",
            "summary": "Standard terms with no concerns.",
            "clauses": []
        }"#
    }

    #[test]
    fn test_parse_reply_valid_json() {
        assert!(matches!(parse_reply(valid_reply()), ProviderReply::Parsed(_)));
    }

    #[test]
    fn test_parse_reply_malformed_carries_length() {
        let raw = "I'm sorry, I can't produce JSON today.";
        match parse_reply(raw) {
            ProviderReply::Malformed { raw_len } => assert_eq!(raw_len, raw.len()),
            ProviderReply::Parsed(_) => panic!("should be malformed"),
        }
    }

    #[test]
    fn test_parse_reply_rejects_trailing_garbage() {
        assert!(matches!(
            parse_reply(r#"{"a":1} extra"#),
            ProviderReply::Malformed { .. }
        ));
    }

    #[test]
    fn test_user_message_without_source_url() {
        let msg = build_user_message("Some terms.", None);
        assert_eq!(msg, "Analyze this Terms of Service:\n\nSome terms.");
    }

    #[test]
    fn test_user_message_with_source_url() {
        let msg = build_user_message("Some terms.", Some("https://example.com/tos"));
        assert!(msg.starts_with("Source URL: https://example.com/tos\n\n"));
        assert!(msg.ends_with("Analyze this Terms of Service:\n\nSome terms."));
    }

    #[test]
    fn test_schema_mismatch_is_detectable() {
        // Valid JSON, wrong shape: parses as a Value but not as a result.
        let value = match parse_reply(r#"{"unexpected": "shape"}"#) {
            ProviderReply::Parsed(v) => v,
            ProviderReply::Malformed { .. } => panic!("syntactically valid"),
        };
        assert!(serde_json::from_value::<AnalysisResult>(value).is_err());
    }
}

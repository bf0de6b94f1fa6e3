//! Inbound document validation.

use crate::error::{AppError, AppResult};

/// Default maximum document length in characters.
///
/// Matches the upstream extension contract: documents are truncated client
/// side before submission, so anything larger indicates a misbehaving caller.
pub const DEFAULT_MAX_DOCUMENT_CHARS: usize = 30000;

/// Validate a submitted Terms of Service document.
///
/// Rules:
/// - Must be non-empty after trimming whitespace
/// - Must not exceed `max_chars` characters
///
/// Pure; returns a human-readable reason mapped to HTTP 400 by the entry
/// point.
pub fn validate_document(document_text: &str, max_chars: usize) -> AppResult<()> {
    if document_text.trim().is_empty() {
        return Err(AppError::ValidationFailed(
            "document_text cannot be empty".to_string(),
        ));
    }

    let chars = document_text.chars().count();
    if chars > max_chars {
        return Err(AppError::ValidationFailed(format!(
            "document_text exceeds the maximum length of {max_chars} characters (got {chars})"
        )));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_document() {
        assert!(validate_document("Standard privacy policy, no concerns.", 30000).is_ok());
    }

    #[test]
    fn test_rejects_empty_document() {
        let result = validate_document("", 30000);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_rejects_whitespace_only_document() {
        let result = validate_document(" \n\t  \r\n ", 30000);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_accepts_document_at_exact_limit() {
        let doc = "a".repeat(30000);
        assert!(validate_document(&doc, 30000).is_ok());
    }

    #[test]
    fn test_rejects_document_one_past_limit() {
        let doc = "a".repeat(30001);
        let result = validate_document(&doc, 30000);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_limit_counts_characters_not_bytes() {
        // Multi-byte characters: 10 chars, 20 bytes
        let doc = "§".repeat(10);
        assert!(validate_document(&doc, 10).is_ok());
        assert!(validate_document(&doc, 9).is_err());
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Request body for `POST /api/v1/analyze`.
#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Raw Terms of Service text to analyze (1..=30000 characters).
    pub document_text: String,
    /// Optional URL the document was scraped from.
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Structured risk assessment returned by the completion provider.
///
/// The gateway validates structural well-formedness only; in particular
/// `overall_severity` is the provider's verdict and is never recomputed
/// locally from the clause severities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Overall severity tier, 0 (standard) to 3 (critical).
    pub overall_severity: u8,
    /// Service category (open set defined by the classification rubric,
    /// e.g. "vpn", "email", "unknown").
    pub category: String,
    /// Name of the service the document belongs to.
    pub service_name: String,
    /// One-sentence summary of the document.
    pub summary: String,
    /// Flagged clauses, in rubric order.
    #[serde(default)]
    pub clauses: Vec<Clause>,
    /// Privacy-friendlier alternatives. Only populated by the provider for
    /// unknown categories at severity >= 2; absent otherwise.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggested_alternatives: Option<Vec<SuggestedAlternative>>,
}

impl AnalysisResult {
    /// Check the numeric range invariants (severities within 0..=3).
    ///
    /// Range violations mean the provider broke its output contract; the
    /// caller maps this to the same generic malformed-response outcome as a
    /// schema mismatch.
    pub fn severities_in_range(&self) -> bool {
        self.overall_severity <= 3 && self.clauses.iter().all(|c| c.severity <= 3)
    }
}

/// One flagged excerpt of the analyzed document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clause {
    /// Clause classification.
    #[serde(rename = "type")]
    pub kind: ClauseKind,
    /// Severity tier for this clause, 0 to 3.
    pub severity: u8,
    /// Exact quote from the document (kept brief by the provider).
    pub quote: String,
    /// Human-readable explanation of the concern.
    pub explanation: String,
    /// Opt-out or protection available, if any.
    #[serde(default)]
    pub mitigation: Option<String>,
}

/// Closed set of clause classifications from the rubric.
///
/// `Other` doubles as the fallback for values a future prompt revision might
/// introduce, so a rubric edit never turns into a 502 for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClauseKind {
    DataSelling,
    Arbitration,
    TosChanges,
    ContentRights,
    Liability,
    #[serde(other)]
    Other,
}

/// A suggested privacy-friendlier alternative service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedAlternative {
    pub name: String,
    pub url: String,
    pub reason: String,
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service health status
    pub status: String,
    /// Configured completion model identifier
    pub model: String,
    /// Service version
    pub version: String,
    /// Current timestamp
    pub timestamp: DateTime<Utc>,
}

/// Root endpoint response (load-balancer health checks).
#[derive(Debug, Serialize, Deserialize)]
pub struct RootResponse {
    pub status: String,
    pub service: String,
}

/// One entry in the mock "latest ToS versions" dataset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TosVersionEntry {
    pub version: String,
    pub url: String,
}

/// Response for a single-domain ToS version lookup.
#[derive(Debug, Serialize, Deserialize)]
pub struct TosVersionResponse {
    pub domain: String,
    pub version: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_request_deserialization() {
        let json = r#"{"document_text": "Some terms.", "source_url": "https://example.com/tos"}"#;
        let request: AnalyzeRequest = serde_json::from_str(json).unwrap();

        assert_eq!(request.document_text, "Some terms.");
        assert_eq!(request.source_url.as_deref(), Some("https://example.com/tos"));
    }

    #[test]
    fn test_analyze_request_source_url_optional() {
        let json = r#"{"document_text": "Some terms."}"#;
        let request: AnalyzeRequest = serde_json::from_str(json).unwrap();

        assert!(request.source_url.is_none());
    }

    #[test]
    fn test_analysis_result_uses_camel_case_wire_names() {
        let json = r#"{
            "overallSeverity": 2,
            "category": "vpn",
            "serviceName": "TurboVPN",
            "summary": "Aggressive data sharing.",
            "clauses": [{
                "type": "DATA_SELLING",
                "severity": 3,
                "quote": "we may sell your browsing history",
                "explanation": "Browsing history is sold to brokers.",
                "mitigation": null
            }]
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.overall_severity, 2);
        assert_eq!(result.service_name, "TurboVPN");
        assert_eq!(result.clauses.len(), 1);
        assert_eq!(result.clauses.first().unwrap().kind, ClauseKind::DataSelling);

        let out = serde_json::to_string(&result).unwrap();
        assert!(out.contains("\"overallSeverity\":2"));
        assert!(out.contains("\"serviceName\":\"TurboVPN\""));
        assert!(out.contains("\"type\":\"DATA_SELLING\""));
        // Absent alternatives are omitted, not serialized as null
        assert!(!out.contains("suggestedAlternatives"));
    }

    #[test]
    fn test_clauses_default_to_empty() {
        let json = r#"{
            "overallSeverity": 0,
            "category": "search",
            "serviceName": "DuckDuckGo",
            "summary": "Standard terms with no concerns."
        }"#;

        let result: AnalysisResult = serde_json::from_str(json).unwrap();
        assert!(result.clauses.is_empty());
        assert!(result.suggested_alternatives.is_none());
    }

    #[test]
    fn test_unknown_clause_kind_falls_back_to_other() {
        let json = r#"{
            "type": "BIOMETRIC_HARVESTING",
            "severity": 2,
            "quote": "q",
            "explanation": "e"
        }"#;

        let clause: Clause = serde_json::from_str(json).unwrap();
        assert_eq!(clause.kind, ClauseKind::Other);
    }

    #[test]
    fn test_severities_in_range() {
        let mut result = AnalysisResult {
            overall_severity: 3,
            category: "unknown".into(),
            service_name: "X".into(),
            summary: "s".into(),
            clauses: vec![],
            suggested_alternatives: None,
        };
        assert!(result.severities_in_range());

        result.overall_severity = 4;
        assert!(!result.severities_in_range());
    }

    #[test]
    fn test_round_trip_is_field_for_field() {
        let original = AnalysisResult {
            overall_severity: 1,
            category: "email".into(),
            service_name: "Gmail".into(),
            summary: "Industry standard terms.".into(),
            clauses: vec![Clause {
                kind: ClauseKind::Arbitration,
                severity: 1,
                quote: "binding arbitration".into(),
                explanation: "Standard US arbitration clause.".into(),
                mitigation: Some("30-day opt-out window".into()),
            }],
            suggested_alternatives: Some(vec![SuggestedAlternative {
                name: "ProtonMail".into(),
                url: "https://proton.me".into(),
                reason: "End-to-end encrypted".into(),
            }]),
        };

        let json = serde_json::to_string(&original).unwrap();
        let decoded: AnalysisResult = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, original);
    }
}

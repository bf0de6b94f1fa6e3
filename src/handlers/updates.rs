//! Mock "latest ToS versions" lookup endpoints.
//!
//! The extension polls these to learn whether a locally accepted ToS is out
//! of date. The dataset is a static mock; in a real deployment it would be a
//! database maintained by background crawlers. No auth, no rate limit, no
//! algorithmic content - kept outside the admission pipeline on purpose.

use std::collections::HashMap;

use axum::Json;
use axum::extract::Query;
use chrono::{Datelike, Utc};
use serde::Deserialize;
use tracing::instrument;

use crate::models::{TosVersionEntry, TosVersionResponse};

/// Mock dataset of the latest known ToS versions for popular domains.
const MOCK_TOS_LATEST_VERSIONS: &[(&str, &str, &str)] = &[
    (
        "facebook.com",
        "v2024.11",
        "https://raw.githubusercontent.com/microsoft/TypeScript/main/README.md",
    ),
    (
        "twitter.com",
        "v2024.10",
        "https://raw.githubusercontent.com/microsoft/TypeScript/main/README.md",
    ),
    (
        "amazon.com",
        "v2024.12",
        "https://raw.githubusercontent.com/microsoft/TypeScript/main/README.md",
    ),
    (
        "google.com",
        "v2024.05",
        "https://raw.githubusercontent.com/microsoft/TypeScript/main/README.md",
    ),
    (
        "netflix.com",
        "v2024.01",
        "https://raw.githubusercontent.com/microsoft/TypeScript/main/README.md",
    ),
];

/// `GET /api/v1/tos/updates` - the full domain -> version map.
#[instrument]
pub async fn latest_tos_versions() -> Json<HashMap<String, TosVersionEntry>> {
    let map = MOCK_TOS_LATEST_VERSIONS
        .iter()
        .map(|(domain, version, url)| {
            (
                (*domain).to_string(),
                TosVersionEntry {
                    version: (*version).to_string(),
                    url: (*url).to_string(),
                },
            )
        })
        .collect();

    Json(map)
}

/// Query parameters for a single-domain version lookup.
#[derive(Debug, Deserialize)]
pub struct TosVersionQuery {
    pub domain: String,
}

/// `GET /api/v1/tos/version?domain=...` - version for one domain.
///
/// Unknown domains fall back to a generic version derived from the current
/// month (e.g. "v2024.10"), a pure function of the wall clock with no
/// persistence.
#[instrument]
pub async fn tos_version(Query(query): Query<TosVersionQuery>) -> Json<TosVersionResponse> {
    let domain = query.domain.to_lowercase();

    let version = MOCK_TOS_LATEST_VERSIONS
        .iter()
        .find(|(known, _, _)| *known == domain)
        .map(|(_, version, _)| (*version).to_string())
        .unwrap_or_else(fallback_version);

    Json(TosVersionResponse { domain, version })
}

/// Generic fallback version for domains outside the mock dataset.
fn fallback_version() -> String {
    let now = Utc::now();
    format!("v{}.{:02}", now.year(), now.month())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_updates_returns_full_mock_dataset() {
        let Json(map) = latest_tos_versions().await;
        assert_eq!(map.len(), 5);
        assert_eq!(map.get("facebook.com").unwrap().version, "v2024.11");
    }

    #[tokio::test]
    async fn test_known_domain_version() {
        let Json(response) = tos_version(Query(TosVersionQuery {
            domain: "Google.com".to_string(),
        }))
        .await;

        assert_eq!(response.domain, "google.com");
        assert_eq!(response.version, "v2024.05");
    }

    #[tokio::test]
    async fn test_unknown_domain_falls_back_to_current_month() {
        let Json(response) = tos_version(Query(TosVersionQuery {
            domain: "example.org".to_string(),
        }))
        .await;

        let now = Utc::now();
        assert_eq!(response.version, format!("v{}.{:02}", now.year(), now.month()));
    }
}

//! Lookup API enrichment
//!
//! Given an extracted title, asks a MediaWiki-style query API for a short
//! plain-text description and the canonical page URL. Enrichment is best
//! effort: every failure is folded into the returned [`EnrichmentResult`]
//! and never propagates to the job.

use crate::config::EnrichmentConfig;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

/// How an enrichment attempt ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnrichmentOutcome {
    /// A page matched the title
    Matched,
    /// The API answered but had no page for the title
    NoMatch,
    /// The request or the response was unusable
    Failed(String),
    /// Enrichment is turned off in the configuration
    Disabled,
}

/// Fields contributed by the lookup API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichmentResult {
    /// Canonical page URL
    pub url: Option<String>,
    /// Generated plain-text description, never an empty string
    pub summary: Option<String>,
    pub outcome: EnrichmentOutcome,
}

impl EnrichmentResult {
    fn empty(outcome: EnrichmentOutcome) -> Self {
        Self {
            url: None,
            summary: None,
            outcome,
        }
    }

    /// Returns true if the attempt failed rather than finding nothing
    pub fn is_degraded(&self) -> bool {
        matches!(self.outcome, EnrichmentOutcome::Failed(_))
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    query: Option<ApiQuery>,
}

#[derive(Debug, Deserialize)]
struct ApiQuery {
    // Keyed by page id; key order is the response order
    #[serde(default)]
    pages: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct ApiPage {
    #[serde(default)]
    extract: Option<String>,
    #[serde(default)]
    fullurl: Option<String>,
    #[serde(default)]
    missing: Option<Value>,
    #[serde(default)]
    invalid: Option<Value>,
}

/// Client for the lookup API
#[derive(Debug, Clone)]
pub struct Enricher {
    config: EnrichmentConfig,
}

impl Enricher {
    pub fn new(config: EnrichmentConfig) -> Self {
        Self { config }
    }

    /// Looks up `title` and returns whatever could be found
    ///
    /// The request carries `action=query`, `format=json`,
    /// `prop=extracts|info`, `titles=<title>`, `exsentences=<n>`,
    /// `explaintext=1` and `inprop=url`.
    pub async fn enrich(&self, client: &Client, title: &str) -> EnrichmentResult {
        if !self.config.enabled {
            return EnrichmentResult::empty(EnrichmentOutcome::Disabled);
        }

        let sentences = self.config.sentences.to_string();
        let request = client.get(&self.config.api_url).query(&[
            ("action", "query"),
            ("format", "json"),
            ("prop", "extracts|info"),
            ("titles", title),
            ("exsentences", sentences.as_str()),
            ("explaintext", "1"),
            ("inprop", "url"),
        ]);

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!("Lookup request for '{}' failed: {}", title, e);
                return EnrichmentResult::empty(EnrichmentOutcome::Failed(e.to_string()));
            }
        };

        let status = response.status();
        if !status.is_success() {
            tracing::warn!("Lookup for '{}' returned HTTP {}", title, status.as_u16());
            return EnrichmentResult::empty(EnrichmentOutcome::Failed(format!(
                "HTTP {}",
                status.as_u16()
            )));
        }

        match response.json::<ApiResponse>().await {
            Ok(body) => select_page(body),
            Err(e) => {
                tracing::warn!("Lookup response for '{}' unreadable: {}", title, e);
                EnrichmentResult::empty(EnrichmentOutcome::Failed(e.to_string()))
            }
        }
    }
}

/// Picks the first usable page in response order
fn select_page(body: ApiResponse) -> EnrichmentResult {
    let Some(query) = body.query else {
        return EnrichmentResult::empty(EnrichmentOutcome::NoMatch);
    };

    let page = query
        .pages
        .into_iter()
        .filter_map(|(_, value)| serde_json::from_value::<ApiPage>(value).ok())
        .find(|page| page.missing.is_none() && page.invalid.is_none());

    match page {
        Some(page) => EnrichmentResult {
            url: page.fullurl.filter(|u| !u.trim().is_empty()),
            summary: page
                .extract
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            outcome: EnrichmentOutcome::Matched,
        },
        None => EnrichmentResult::empty(EnrichmentOutcome::NoMatch),
    }
}

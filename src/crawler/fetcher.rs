//! HTTP fetcher implementation
//!
//! This module handles the single outbound page request of a job:
//! - Building HTTP clients with proper user agent strings
//! - Substituting the query term into the target URL template
//! - GET requests to fetch page content
//! - Error classification
//!
//! There is no retry here. One attempt per job.

use crate::config::{UserAgentConfig, QUERY_PLACEHOLDER};
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Connect timeout, capped by the overall request timeout
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Errors that end a job at the fetch stage
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Could not reach {url}: {message}")]
    Unreachable { url: String, message: String },

    #[error("HTTP {status} from {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },
}

impl FetchError {
    /// Short name of the error kind, as reported in job failure logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Unreachable { .. } => "unreachable",
            Self::HttpStatus { .. } => "http_status",
            Self::Timeout { .. } => "timeout",
        }
    }
}

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// Final URL after redirects
    pub url: String,
    /// HTTP status code (always a success code)
    pub status: u16,
    /// Page body content
    pub body: String,
}

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Overall timeout applied to each request
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use std::time::Duration;
/// use sumi_harvest::config::UserAgentConfig;
/// use sumi_harvest::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "SumiHarvest".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, Duration::from_secs(30)).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent_string(config))
        .timeout(timeout)
        .connect_timeout(CONNECT_TIMEOUT.min(timeout))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Formats the user agent: `CrawlerName/Version (+ContactURL; ContactEmail)`
pub fn user_agent_string(config: &UserAgentConfig) -> String {
    format!(
        "{}/{} (+{}; {})",
        config.crawler_name, config.crawler_version, config.contact_url, config.contact_email
    )
}

/// Builds the target URL for a query term
///
/// The query is trimmed and substituted for `{query}`. Characters that would
/// end the path early (`?`, `#`) and `%` itself are escaped first. When the
/// placeholder sits in the query string, `&`, `=` and `+` are escaped too so
/// the term stays a single parameter value. The URL parser percent-encodes
/// everything else that needs it.
///
/// # Example
///
/// ```
/// use sumi_harvest::crawler::target_url;
///
/// let url = target_url("https://en.wikipedia.org/wiki/{query}", "Turing_Award").unwrap();
/// assert_eq!(url.as_str(), "https://en.wikipedia.org/wiki/Turing_Award");
/// ```
pub fn target_url(template: &str, query: &str) -> Result<Url, url::ParseError> {
    let mut escaped = query
        .trim()
        .replace('%', "%25")
        .replace('?', "%3F")
        .replace('#', "%23");

    let in_query_string = match (template.find('?'), template.find(QUERY_PLACEHOLDER)) {
        (Some(mark), Some(placeholder)) => placeholder > mark,
        _ => false,
    };
    if in_query_string {
        escaped = escaped
            .replace('&', "%26")
            .replace('=', "%3D")
            .replace('+', "%2B");
    }

    Url::parse(&template.replace(QUERY_PLACEHOLDER, &escaped))
}

/// Fetches a URL and returns the body of a successful response
///
/// # Error Classification
///
/// | Condition | Result |
/// |-----------|--------|
/// | Non-2xx status | `HttpStatus(code)` |
/// | Timeout (request or body) | `Timeout` |
/// | Connection refused, DNS, TLS | `Unreachable` |
/// | Body could not be read | `Unreachable` |
pub async fn fetch(client: &Client, url: &Url) -> Result<RawDocument, FetchError> {
    let response = client
        .get(url.clone())
        .send()
        .await
        .map_err(|e| classify_error(url.as_str(), e))?;

    let status = response.status();
    let final_url = response.url().to_string();

    if !status.is_success() {
        return Err(FetchError::HttpStatus {
            url: final_url,
            status: status.as_u16(),
        });
    }

    let body = response
        .text()
        .await
        .map_err(|e| classify_error(&final_url, e))?;

    Ok(RawDocument {
        url: final_url,
        status: status.as_u16(),
        body,
    })
}

fn classify_error(url: &str, e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
        }
    } else if e.is_connect() {
        FetchError::Unreachable {
            url: url.to_string(),
            message: "Connection refused".to_string(),
        }
    } else {
        FetchError::Unreachable {
            url: url.to_string(),
            message: e.to_string(),
        }
    }
}

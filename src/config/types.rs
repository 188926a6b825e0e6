use serde::Deserialize;

/// Placeholder substituted with the query term in the target URL template
pub const QUERY_PLACEHOLDER: &str = "{query}";

/// Main configuration structure for Sumi-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub target: TargetConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    pub storage: StorageConfig,
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for crawler-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

/// Target page configuration: where to fetch and what to extract
#[derive(Debug, Clone, Deserialize)]
pub struct TargetConfig {
    /// URL template containing `{query}`
    #[serde(rename = "url-template")]
    pub url_template: String,

    /// CSS selector for the title node
    #[serde(rename = "title-selector", default = "default_title_selector")]
    pub title_selector: String,

    /// CSS selector for the summary node
    #[serde(rename = "summary-selector", default = "default_summary_selector")]
    pub summary_selector: String,

    /// Whether a missing summary node fails the job
    #[serde(rename = "require-summary", default = "default_true")]
    pub require_summary: bool,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs", default = "default_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Lookup API configuration
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichmentConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Query API endpoint
    #[serde(rename = "api-url", default = "default_api_url")]
    pub api_url: String,

    /// Number of sentences requested for the generated description
    #[serde(default = "default_sentences")]
    pub sentences: u32,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: default_api_url(),
            sentences: default_sentences(),
        }
    }
}

/// Storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// SQLite database file
    Sqlite,
    /// One JSON file per query term inside a directory
    Json,
    /// Process-local map, nothing survives exit
    Memory,
}

/// Storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// Database file for `sqlite`, directory for `json`; ignored for `memory`
    #[serde(default)]
    pub path: String,
}

fn default_title_selector() -> String {
    "h1#firstHeading".to_string()
}

fn default_summary_selector() -> String {
    "div#mw-content-text p".to_string()
}

fn default_api_url() -> String {
    "https://en.wikipedia.org/w/api.php".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_sentences() -> u32 {
    2
}

fn default_true() -> bool {
    true
}

//! HTML extractor for the title and summary fields
//!
//! Selectors come from the target configuration and are compiled once per
//! extractor. Each selector picks the first matching node in document order.

use crate::config::TargetConfig;
use crate::crawler::fetcher::RawDocument;
use crate::ConfigError;
use scraper::{Html, Selector};
use thiserror::Error;

/// Errors that end a job at the extract stage
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("Required field '{0}' not found in document")]
    MissingRequiredField(&'static str),
}

/// Fields pulled out of a target page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFields {
    /// Trimmed, never empty
    pub title: String,
    /// Trimmed, may be empty
    pub summary: String,
}

/// Compiled selectors for one target site
#[derive(Debug, Clone)]
pub struct Extractor {
    title: Selector,
    summary: Selector,
    require_summary: bool,
}

impl Extractor {
    /// Compiles the selectors from the target configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Extractor)` - Both selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - A selector is not valid CSS
    pub fn new(config: &TargetConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            title: compile(&config.title_selector)?,
            summary: compile(&config.summary_selector)?,
            require_summary: config.require_summary,
        })
    }

    /// Extracts title and summary from a fetched document
    pub fn extract(&self, doc: &RawDocument) -> Result<ExtractedFields, ExtractError> {
        self.extract_html(&doc.body)
    }

    /// Extracts title and summary from raw markup
    ///
    /// # Rules
    ///
    /// - Title: first node matching the title selector, text trimmed.
    ///   Missing or blank fails with `MissingRequiredField("title")`.
    /// - Summary: first node matching the summary selector, text trimmed.
    ///   Missing fails with `MissingRequiredField("summary")` unless
    ///   `require-summary` is off, in which case the summary is empty.
    ///
    /// # Example
    ///
    /// ```
    /// use sumi_harvest::config::TargetConfig;
    /// use sumi_harvest::crawler::Extractor;
    ///
    /// let config = TargetConfig {
    ///     url_template: "https://en.wikipedia.org/wiki/{query}".to_string(),
    ///     title_selector: "h1#firstHeading".to_string(),
    ///     summary_selector: "div#mw-content-text p".to_string(),
    ///     require_summary: true,
    ///     request_timeout_secs: 30,
    /// };
    /// let extractor = Extractor::new(&config).unwrap();
    ///
    /// let html = r#"<h1 id="firstHeading"> Rust </h1>
    ///     <div id="mw-content-text"><p>A language.</p></div>"#;
    /// let fields = extractor.extract_html(html).unwrap();
    /// assert_eq!(fields.title, "Rust");
    /// assert_eq!(fields.summary, "A language.");
    /// ```
    pub fn extract_html(&self, html: &str) -> Result<ExtractedFields, ExtractError> {
        let document = Html::parse_document(html);

        let title = first_text(&document, &self.title)
            .filter(|t| !t.is_empty())
            .ok_or(ExtractError::MissingRequiredField("title"))?;

        let summary = match first_text(&document, &self.summary) {
            Some(summary) => summary,
            None if self.require_summary => {
                return Err(ExtractError::MissingRequiredField("summary"))
            }
            None => {
                tracing::debug!("No summary node for '{}', using empty summary", title);
                String::new()
            }
        };

        Ok(ExtractedFields { title, summary })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector)
        .map_err(|e| ConfigError::InvalidSelector(format!("'{}': {}", selector, e)))
}

/// Trimmed text content of the first element matching `selector`
fn first_text(document: &Html, selector: &Selector) -> Option<String> {
    document
        .select(selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
}

//! Crawler module for the per-query harvest pipeline
//!
//! This module contains the core pipeline, including:
//! - HTTP fetching of the target page
//! - HTML extraction of the title and summary
//! - Best-effort enrichment through the lookup API
//! - Job coordination and hand-off to the store

mod coordinator;
mod enricher;
mod extractor;
mod fetcher;

pub use coordinator::{assemble_record, Coordinator, JobFailure, JobResult};
pub use enricher::{EnrichmentOutcome, EnrichmentResult, Enricher};
pub use extractor::{ExtractError, ExtractedFields, Extractor};
pub use fetcher::{build_http_client, fetch, target_url, user_agent_string, FetchError, RawDocument};

use crate::config::Config;
use crate::HarvestError;

/// Runs a single harvest job
///
/// This is the main entry point for harvesting one query term. It will:
/// 1. Open the configured store
/// 2. Fetch the target page for the query
/// 3. Extract title and summary
/// 4. Enrich them through the lookup API
/// 5. Store the resulting record under the query
///
/// # Arguments
///
/// * `config` - The harvester configuration
/// * `query` - The query term
///
/// # Returns
///
/// * `Ok(JobResult)` - The job ran to a terminal state
/// * `Err(HarvestError)` - The query was blank or the store failed
pub async fn harvest(config: Config, query: &str) -> Result<JobResult, HarvestError> {
    Coordinator::from_config(config)?.run(query).await
}

//! Pipeline coordinator - runs one job per query term
//!
//! A job walks the stages in a fixed order:
//! fetch the target page, extract title and summary, enrich through the
//! lookup API, assemble one record, hand it to the store. Fetch and extract
//! failures end the job without a record. Enrichment failures only degrade
//! the record.

use crate::config::Config;
use crate::crawler::enricher::{EnrichmentOutcome, EnrichmentResult, Enricher};
use crate::crawler::extractor::{ExtractError, ExtractedFields, Extractor};
use crate::crawler::fetcher::{build_http_client, fetch, target_url, FetchError};
use crate::state::{JobState, JobStatus};
use crate::storage::{
    open_store, PartitionSummary, Record, RecordStore, SharedStore, StoreError,
};
use crate::HarvestError;
use std::sync::{Arc, MutexGuard};
use std::time::Duration;
use thiserror::Error;

/// Why a job ended without a record
#[derive(Debug, Error)]
pub enum JobFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

impl JobFailure {
    /// Short name of the failure, e.g. `timeout` or `missing_field`
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch(e) => e.kind(),
            Self::Extract(ExtractError::MissingRequiredField(_)) => "missing_field",
        }
    }
}

/// Outcome of one job
#[derive(Debug)]
pub struct JobResult {
    /// The query term the job ran for (trimmed)
    pub query: String,

    /// Records handed to the store; empty when the job failed
    pub records: Vec<Record>,

    pub status: JobStatus,

    /// Terminal pipeline state
    pub state: JobState,

    /// Set when `status` is `Failed`
    pub failure: Option<JobFailure>,

    /// How enrichment ended, if the job got that far
    pub enrichment: Option<EnrichmentOutcome>,
}

/// One execution of the pipeline; lives only inside [`Coordinator::run`]
struct Job {
    query: String,
    state: JobState,
    records: Vec<Record>,
}

impl Job {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            state: JobState::Created,
            records: Vec::new(),
        }
    }

    fn advance(&mut self, next: JobState) -> Result<(), HarvestError> {
        if !self.state.can_transition_to(next) {
            return Err(HarvestError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }

        tracing::debug!("Job '{}': {} -> {}", self.query, self.state, next);
        self.state = next;
        Ok(())
    }

    fn fail(mut self, failure: JobFailure) -> Result<JobResult, HarvestError> {
        self.advance(JobState::Failed)?;
        tracing::warn!(
            "Job '{}' failed ({}): {}",
            self.query,
            failure.kind(),
            failure
        );

        Ok(JobResult {
            query: self.query,
            records: Vec::new(),
            status: JobStatus::Failed,
            state: self.state,
            failure: Some(failure),
            enrichment: None,
        })
    }
}

/// Builds the record for a job from extracted and enriched fields
///
/// The enriched summary wins when present; otherwise the extracted summary
/// is kept. The URL only ever comes from enrichment.
pub fn assemble_record(
    query: &str,
    fields: ExtractedFields,
    enrichment: &EnrichmentResult,
) -> Record {
    Record {
        title: fields.title,
        summary: enrichment.summary.clone().unwrap_or(fields.summary),
        url: enrichment.url.clone(),
        query: query.to_string(),
    }
}

/// Main pipeline coordinator
///
/// Holds only configuration and the shared store. Each job builds and drops
/// its own HTTP client, so concurrent jobs share nothing but the store.
pub struct Coordinator {
    config: Arc<Config>,
    store: SharedStore,
    extractor: Extractor,
    enricher: Enricher,
}

impl Coordinator {
    /// Creates a coordinator over an already opened store
    ///
    /// # Arguments
    ///
    /// * `config` - The validated configuration
    /// * `store` - The store records are handed to
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Selectors compiled
    /// * `Err(HarvestError::Config)` - A selector is invalid
    pub fn new(config: Config, store: SharedStore) -> Result<Self, HarvestError> {
        let extractor = Extractor::new(&config.target)?;
        let enricher = Enricher::new(config.enrichment.clone());

        Ok(Self {
            config: Arc::new(config),
            store,
            extractor,
            enricher,
        })
    }

    /// Creates a coordinator and opens the store named in the configuration
    pub fn from_config(config: Config) -> Result<Self, HarvestError> {
        let store = open_store(&config.storage)?;
        Self::new(config, store)
    }

    /// Returns a handle to the shared store
    pub fn store(&self) -> SharedStore {
        Arc::clone(&self.store)
    }

    /// Runs one job for a query term
    ///
    /// # Returns
    ///
    /// * `Ok(JobResult)` with status `Succeeded` or `PartiallyFailed` - one
    ///   record was stored under the query
    /// * `Ok(JobResult)` with status `Failed` - fetch or extraction failed,
    ///   nothing was stored
    /// * `Err(HarvestError::EmptyQuery)` - the query was blank
    /// * `Err(HarvestError::Store)` - the record could not be stored
    ///
    /// # Example
    ///
    /// ```no_run
    /// use sumi_harvest::config::load_config;
    /// use sumi_harvest::crawler::Coordinator;
    /// use std::path::Path;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = load_config(Path::new("harvest.toml"))?;
    /// let coordinator = Coordinator::from_config(config)?;
    /// let result = coordinator.run("Turing_Award").await?;
    /// println!("{}: {} record(s)", result.status, result.records.len());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn run(&self, query: &str) -> Result<JobResult, HarvestError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(HarvestError::EmptyQuery);
        }

        let mut job = Job::new(query);
        tracing::info!("Starting job for query '{}'", query);

        let url = target_url(&self.config.target.url_template, query)?;
        let client = build_http_client(
            &self.config.user_agent,
            Duration::from_secs(self.config.target.request_timeout_secs),
        )?;

        job.advance(JobState::Fetching)?;
        let doc = match fetch(&client, &url).await {
            Ok(doc) => doc,
            Err(e) => return job.fail(e.into()),
        };
        tracing::debug!("Fetched {} ({} bytes)", doc.url, doc.body.len());

        job.advance(JobState::Extracting)?;
        let fields = match self.extractor.extract(&doc) {
            Ok(fields) => fields,
            Err(e) => return job.fail(e.into()),
        };

        job.advance(JobState::Enriching)?;
        let enrichment = self.enricher.enrich(&client, &fields.title).await;
        let status = if enrichment.is_degraded() {
            JobStatus::PartiallyFailed
        } else {
            JobStatus::Succeeded
        };

        job.advance(JobState::Assembling)?;
        let record = assemble_record(&job.query, fields, &enrichment);
        job.records.push(record);

        job.advance(JobState::Completed)?;
        self.lock_store()?.append(&job.query, &job.records)?;

        tracing::info!(
            "Job '{}' {}: stored {} record(s)",
            job.query,
            status,
            job.records.len()
        );

        Ok(JobResult {
            query: job.query,
            records: job.records,
            status,
            state: job.state,
            failure: None,
            enrichment: Some(enrichment.outcome),
        })
    }

    /// Returns every record stored under a query term
    ///
    /// The term is trimmed the same way [`Coordinator::run`] trims it, so a
    /// lookup finds what a job stored.
    pub fn records_for(&self, query: &str) -> Result<Vec<Record>, HarvestError> {
        Ok(self.lock_store()?.query(query.trim())?)
    }

    /// Lists stored query terms with their record counts
    pub fn partitions(&self) -> Result<Vec<PartitionSummary>, HarvestError> {
        Ok(self.lock_store()?.queries()?)
    }

    fn lock_store(&self) -> Result<MutexGuard<'_, dyn RecordStore + Send + 'static>, StoreError> {
        self.store
            .lock()
            .map_err(|_| StoreError::Unavailable("store lock poisoned".to_string()))
    }
}

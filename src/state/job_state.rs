/// Job state definitions for tracking pipeline progress
///
/// A job moves strictly forward through the stages. Only the fetch and
/// extract stages can fail the job; enrichment degrades the record instead.
use std::fmt;

/// Represents the current stage of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobState {
    // ===== Active States =====
    /// Job has been created for a query but no work has started
    Created,

    /// Target page is being fetched
    Fetching,

    /// Title and summary are being extracted from the markup
    Extracting,

    /// Lookup API is being consulted
    Enriching,

    /// The output record is being built
    Assembling,

    // ===== Terminal States =====
    /// A record was produced
    Completed,

    /// Fetching or extraction failed; no record was produced
    Failed,
}

impl JobState {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if the job may move from this state to `next`
    ///
    /// The happy path is strictly sequential. Only `Fetching` and
    /// `Extracting` may branch to `Failed`.
    pub fn can_transition_to(&self, next: JobState) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Fetching)
                | (Self::Fetching, Self::Extracting)
                | (Self::Fetching, Self::Failed)
                | (Self::Extracting, Self::Enriching)
                | (Self::Extracting, Self::Failed)
                | (Self::Enriching, Self::Assembling)
                | (Self::Assembling, Self::Completed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Created => "created",
            Self::Fetching => "fetching",
            Self::Extracting => "extracting",
            Self::Enriching => "enriching",
            Self::Assembling => "assembling",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Returns all possible job states
    pub fn all_states() -> Vec<Self> {
        vec![
            Self::Created,
            Self::Fetching,
            Self::Extracting,
            Self::Enriching,
            Self::Assembling,
            Self::Completed,
            Self::Failed,
        ]
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Terminal outcome of a job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JobStatus {
    /// Record produced with every stage succeeding
    Succeeded,

    /// Record produced, but enrichment failed and the record was degraded
    PartiallyFailed,

    /// No record produced
    Failed,
}

impl JobStatus {
    /// Returns true if the job produced a record
    pub fn produced_record(&self) -> bool {
        matches!(self, Self::Succeeded | Self::PartiallyFailed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Succeeded => "succeeded",
            Self::PartiallyFailed => "partially_failed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

//! State module for tracking job progress
//!
//! # Components
//!
//! - `JobState`: the per-job pipeline state machine (created, fetching, extracting, ...)
//! - `JobStatus`: the terminal outcome reported to callers

mod job_state;

pub use job_state::{JobState, JobStatus};

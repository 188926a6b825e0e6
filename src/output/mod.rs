//! Output module for presenting stored records
//!
//! This module handles:
//! - Rendering records and stored query terms as text, markdown, or JSON
//! - Writing rendered output to a file

mod markdown;

pub use markdown::{format_partitions_markdown, format_records_markdown};

use crate::storage::{PartitionSummary, Record};
use std::fs::File;
use std::io::Write;
use clap::ValueEnum;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    #[value(alias = "md")]
    Markdown,
    Json,
}

/// Renders the records stored under a query
pub fn render_records(
    query: &str,
    records: &[Record],
    format: OutputFormat,
) -> OutputResult<String> {
    match format {
        OutputFormat::Text => Ok(format_records_text(query, records)),
        OutputFormat::Markdown => Ok(format_records_markdown(query, records)),
        OutputFormat::Json => serde_json::to_string_pretty(records)
            .map_err(|e| OutputError::Format(e.to_string())),
    }
}

/// Renders the list of stored query terms
pub fn render_partitions(
    partitions: &[PartitionSummary],
    format: OutputFormat,
) -> OutputResult<String> {
    match format {
        OutputFormat::Text => {
            let mut out = String::new();
            for partition in partitions {
                out.push_str(&format!("{:>6}  {}\n", partition.records, partition.query));
            }
            Ok(out)
        }
        OutputFormat::Markdown => Ok(format_partitions_markdown(partitions)),
        OutputFormat::Json => {
            let value: Vec<serde_json::Value> = partitions
                .iter()
                .map(|p| serde_json::json!({ "query": p.query, "records": p.records }))
                .collect();
            serde_json::to_string_pretty(&value).map_err(|e| OutputError::Format(e.to_string()))
        }
    }
}

/// Writes rendered output to a file
pub fn write_output(content: &str, output_path: &Path) -> OutputResult<()> {
    let mut file = File::create(output_path)?;
    file.write_all(content.as_bytes())?;
    Ok(())
}

fn format_records_text(query: &str, records: &[Record]) -> String {
    let mut out = String::new();

    out.push_str(&format!(
        "=== Results for '{}' ({} record(s)) ===\n",
        query,
        records.len()
    ));

    for record in records {
        out.push('\n');
        out.push_str(&format!("{}\n", record.title));
        if !record.summary.is_empty() {
            out.push_str(&format!("  {}\n", record.summary));
        }
        match &record.url {
            Some(url) => out.push_str(&format!("  {}\n", url)),
            None => out.push_str("  (no link)\n"),
        }
    }

    out
}

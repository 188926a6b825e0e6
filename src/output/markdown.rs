//! Markdown rendering of stored records
//!
//! One section per record: title as heading, summary as paragraph, and the
//! canonical link when enrichment found one.

use crate::storage::{PartitionSummary, Record};

/// Formats the records stored under a query as markdown
///
/// # Arguments
///
/// * `query` - The query term the records were stored under
/// * `records` - The records to render
///
/// # Returns
///
/// A formatted markdown string
pub fn format_records_markdown(query: &str, records: &[Record]) -> String {
    let mut md = String::new();

    md.push_str(&format!("# Results for \"{}\"\n\n", query));

    if records.is_empty() {
        md.push_str("_No records stored for this query._\n");
        return md;
    }

    md.push_str(&format!("{} record(s)\n\n", records.len()));

    for record in records {
        md.push_str(&format!("## {}\n\n", record.title));
        if !record.summary.is_empty() {
            md.push_str(&format!("{}\n\n", record.summary));
        }
        if let Some(url) = &record.url {
            md.push_str(&format!("<{}>\n\n", url));
        }
    }

    md
}

/// Formats the list of stored query terms as a markdown table
pub fn format_partitions_markdown(partitions: &[PartitionSummary]) -> String {
    let mut md = String::new();

    md.push_str("# Stored Queries\n\n");
    md.push_str("| Query | Records |\n");
    md.push_str("|-------|---------|\n");
    for partition in partitions {
        md.push_str(&format!("| {} | {} |\n", partition.query, partition.records));
    }

    md
}

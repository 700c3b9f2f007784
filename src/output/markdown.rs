//! Markdown health summary generation
//!
//! This module generates a human-readable report of every stored snapshot:
//! its counters, its success ratio, and whether it should be crawled again.

use crate::output::error::OutputResult;
use crate::output::stats::CrawlStatistics;
use crate::storage::SnapshotSummary;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Writes the markdown health summary to `output_path`
pub fn generate_markdown_summary(
    summaries: &[SnapshotSummary],
    output_path: &Path,
) -> OutputResult<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let markdown = format_markdown_summary(summaries);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

/// Formats snapshot summaries as markdown
pub fn format_markdown_summary(summaries: &[SnapshotSummary]) -> String {
    let stats = CrawlStatistics::from_summaries(summaries);
    let mut md = String::new();

    md.push_str("# LyngSat Wayback Crawl Summary\n\n");

    md.push_str("## Overall Statistics\n\n");
    md.push_str(&format!("- **Snapshots**: {}\n", stats.total_snapshots));
    md.push_str(&format!(
        "- **Complete / Partial / Aborted**: {} / {} / {}\n",
        stats.complete, stats.partial, stats.aborted
    ));
    md.push_str(&format!("- **Countries Crawled**: {}\n", stats.total_countries));
    md.push_str(&format!("- **Channels Extracted**: {}\n", stats.total_channels));
    md.push_str(&format!("- **Requests Issued**: {}\n", stats.total_requests));
    md.push_str(&format!("- **Errors**: {}\n", stats.total_errors));
    md.push_str(&format!(
        "- **Success Rate**: {:.2}%\n\n",
        stats.success_rate()
    ));

    if summaries.is_empty() {
        md.push_str("No snapshots stored yet.\n");
        return md;
    }

    md.push_str("## Snapshots\n\n");
    md.push_str("| Snapshot | Status | Regions | Countries | Failed | Channels | Requests | Success | Reprocess |\n");
    md.push_str("|----------|--------|---------|-----------|--------|----------|----------|---------|-----------|\n");
    for summary in summaries {
        md.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} | {:.1}% | {} |\n",
            summary.snapshot_id,
            summary.status.to_db_string(),
            summary.region_count,
            summary.country_count,
            summary.failed_countries,
            summary.channel_count,
            summary.requests_issued,
            summary.success_ratio() * 100.0,
            if summary.needs_reprocessing() { "yes" } else { "no" }
        ));
    }
    md.push('\n');

    let errors: Vec<&SnapshotSummary> = summaries.iter().filter(|s| s.error.is_some()).collect();
    if !errors.is_empty() {
        md.push_str("## Aborted Snapshots\n\n");
        for summary in errors {
            md.push_str(&format!(
                "- `{}`: {}\n",
                summary.snapshot_id,
                summary.error.as_deref().unwrap_or_default()
            ));
        }
        md.push('\n');
    }

    md
}

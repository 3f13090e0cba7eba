//! Markdown and JSON run summaries.
//!
//! The Markdown report lists every group with the statistics of both
//! series, the charts that were written and anything that went wrong.

use crate::models::{GroupOutcome, RunMetadata, RunReport, SeriesSummary};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &RunReport) -> String {
    let mut output = String::new();

    output.push_str("# Latency Comparison Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_overview_section(&report.groups));

    for group in &report.groups {
        output.push_str(&generate_group_section(group));
    }

    output.push_str(&generate_footer());
    output
}

fn generate_metadata_section(metadata: &RunMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Input Directory:** `{}`\n", metadata.input_dir.display()));
    section.push_str(&format!(
        "- **Output Directory:** `{}`\n",
        metadata.output_dir.display()
    ));
    section.push_str(&format!("- **Parse Policy:** {}\n", metadata.parse_policy));
    section.push_str(&format!("- **Groups:** {}\n", metadata.groups));
    section.push_str(&format!("- **Charts Written:** {}\n", metadata.charts_written));
    if metadata.charts_failed > 0 {
        section.push_str(&format!("- **Charts Failed:** {}\n", metadata.charts_failed));
    }
    section.push_str(&format!("- **Duration:** {:.1}s\n", metadata.duration_seconds));
    section.push('\n');

    section
}

fn fmt_stat(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.3}", v))
}

/// Relative difference of the variant mean against the baseline mean.
fn mean_change(group: &GroupOutcome) -> Option<f64> {
    let base = group.baseline.mean?;
    let variant = group.variant.mean?;
    if base == 0.0 {
        return None;
    }
    Some((variant - base) / base * 100.0)
}

fn generate_overview_section(groups: &[GroupOutcome]) -> String {
    let mut section = String::new();

    section.push_str("## Overview\n\n");
    if groups.is_empty() {
        section.push_str("No groups were processed.\n\n");
        return section;
    }

    section.push_str("| Group | Baseline Mean | Variant Mean | Change | Charts |\n");
    section.push_str("|:---|---:|---:|---:|:---:|\n");
    for group in groups {
        let change = mean_change(group).map_or_else(|| "-".to_string(), |c| format!("{:+.1}%", c));
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            group.prefix,
            fmt_stat(group.baseline.mean),
            fmt_stat(group.variant.mean),
            change,
            group.artifacts.len()
        ));
    }
    section.push('\n');

    section
}

fn generate_series_row(series: &SeriesSummary) -> String {
    format!(
        "| {} | `{}` | {} | {} | {} | {} | {} | {} |\n",
        series.name,
        series.source.display(),
        series.count,
        fmt_stat(series.mean),
        fmt_stat(series.median),
        fmt_stat(series.min),
        fmt_stat(series.max),
        fmt_stat(series.std_dev)
    )
}

fn generate_group_section(group: &GroupOutcome) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", group.prefix));

    section.push_str("| Series | Source | Samples | Mean | Median | Min | Max | Std Dev |\n");
    section.push_str("|:---|:---|---:|---:|---:|---:|---:|---:|\n");
    section.push_str(&generate_series_row(&group.baseline));
    section.push_str(&generate_series_row(&group.variant));
    section.push('\n');

    if !group.artifacts.is_empty() {
        section.push_str("**Charts:**\n\n");
        for artifact in &group.artifacts {
            section.push_str(&format!("- {}: `{}`\n", artifact.kind, artifact.path.display()));
        }
        section.push('\n');
    }

    let issues: Vec<String> = [&group.baseline, &group.variant]
        .iter()
        .flat_map(|s| s.issues.iter().map(move |i| format!("{}: {}", s.name, i)))
        .chain(group.failures.iter().map(|f| format!("{}: {}", f.kind, f.error)))
        .collect();

    if !issues.is_empty() {
        section.push_str("**Problems:**\n\n");
        for issue in issues {
            section.push_str(&format!("- {}\n", issue));
        }
        section.push('\n');
    }

    section
}

fn generate_footer() -> String {
    format!("---\n\n*Report generated by latplot v{}*\n", env!("CARGO_PKG_VERSION"))
}

/// Generate a JSON report.
pub fn generate_json_report(report: &RunReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

//! Group processing: load both series, render the charts, summarise.
//!
//! Groups are independent. Each one runs on the blocking pool (file I/O
//! and rasterisation are synchronous) and at most `concurrency` of them
//! are in flight at once. Results come back in configuration order.

use crate::config::{Config, GroupSpec};
use crate::loader::{load_samples, ParsePolicy};
use crate::models::{GroupOutcome, RunMetadata, RunReport, SamplePair, SeriesSummary};
use crate::render::{render_pair, ChartStyle};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Everything a group needs besides its own file pair.
#[derive(Debug, Clone)]
pub struct PipelineContext {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub policy: ParsePolicy,
    pub style: ChartStyle,
}

impl PipelineContext {
    pub fn new(config: &Config, style: ChartStyle) -> Self {
        Self {
            input_dir: config.general.input_dir.clone(),
            output_dir: config.general.output_dir.clone(),
            policy: config.loader.policy,
            style,
        }
    }
}

fn load_series(ctx: &PipelineContext, name: &str, file: &Path) -> (Vec<f64>, SeriesSummary) {
    let source = ctx.input_dir.join(file);
    let loaded = load_samples(&source, ctx.policy);
    let issues = loaded.issues.iter().map(ToString::to_string).collect();
    let summary = SeriesSummary::from_samples(name, source, &loaded.samples, issues);
    (loaded.samples, summary)
}

/// Loads and renders one group.
///
/// Never fails: load problems end up in the summaries, chart problems in
/// the outcome's failure list.
pub fn run_group(group: &GroupSpec, ctx: &PipelineContext) -> GroupOutcome {
    debug!("Processing group {}", group.prefix);

    let (baseline, baseline_summary) = load_series(ctx, &ctx.style.baseline_name, &group.baseline);
    let (variant, variant_summary) = load_series(ctx, &ctx.style.variant_name, &group.variant);

    let pair = SamplePair::new(group.prefix.clone(), baseline, variant);
    if pair.is_empty() {
        warn!("{}: no samples in either series, charts will be empty", group.prefix);
    }

    let rendered = render_pair(&pair, group.clamp, &ctx.style, &ctx.output_dir);
    info!(
        "{}: {} chart(s) written, {} failed",
        group.prefix,
        rendered.artifacts.len(),
        rendered.failures.len()
    );

    GroupOutcome {
        prefix: group.prefix.clone(),
        baseline: baseline_summary,
        variant: variant_summary,
        artifacts: rendered.artifacts,
        failures: rendered.failures,
    }
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );
    pb
}

/// Runs every configured group and collects the run report.
pub async fn run_all(config: &Config, style: ChartStyle, show_progress: bool) -> RunReport {
    let start = Instant::now();
    let ctx = Arc::new(PipelineContext::new(config, style));

    if let Err(e) = std::fs::create_dir_all(&ctx.output_dir) {
        warn!(
            "Cannot create output directory {}: {}",
            ctx.output_dir.display(),
            e
        );
    }

    let progress = show_progress.then(|| progress_bar(config.groups.len()));
    let concurrency = config.general.concurrency.max(1);

    let tasks = stream::iter(config.groups.iter().cloned().enumerate());
    let mut results: Vec<(usize, GroupOutcome)> = tasks
        .map(|(index, group)| {
            let ctx = Arc::clone(&ctx);
            async move {
                let prefix = group.prefix.clone();
                let joined = tokio::task::spawn_blocking(move || run_group(&group, &ctx)).await;
                (index, prefix, joined)
            }
        })
        .buffer_unordered(concurrency)
        .filter_map(|(index, prefix, joined)| {
            if let Some(ref pb) = progress {
                pb.inc(1);
                pb.set_message(prefix.clone());
            }
            let outcome = match joined {
                Ok(outcome) => Some((index, outcome)),
                Err(e) => {
                    error!("{}: group task aborted: {}", prefix, e);
                    None
                }
            };
            async move { outcome }
        })
        .collect()
        .await;

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    results.sort_by_key(|(index, _)| *index);
    let groups: Vec<GroupOutcome> = results.into_iter().map(|(_, outcome)| outcome).collect();

    let metadata = RunMetadata {
        generated_at: Utc::now(),
        input_dir: ctx.input_dir.clone(),
        output_dir: ctx.output_dir.clone(),
        parse_policy: ctx.policy.to_string(),
        groups: groups.len(),
        charts_written: groups.iter().map(|g| g.artifacts.len()).sum(),
        charts_failed: groups.iter().map(|g| g.failures.len()).sum(),
        duration_seconds: start.elapsed().as_secs_f64(),
    };

    RunReport { metadata, groups }
}

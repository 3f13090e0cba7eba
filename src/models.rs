//! Data models for the latency plotter.
//!
//! This module contains the core data structures shared by the loader,
//! the renderer and the run report.

use crate::analysis::{mean, min_max, quantile, std_dev};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Explicit y-axis bounds for the zoomed box-plot view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct ClampRange {
    low: f64,
    high: f64,
}

/// Rejected clamp bounds.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid clamp range [{low}, {high}]: bounds must be finite and low < high")]
pub struct InvalidClamp {
    pub low: f64,
    pub high: f64,
}

impl ClampRange {
    /// Creates a clamp range, rejecting non-finite or inverted bounds.
    pub fn new(low: f64, high: f64) -> Result<Self, InvalidClamp> {
        if low.is_finite() && high.is_finite() && low < high {
            Ok(Self { low, high })
        } else {
            Err(InvalidClamp { low, high })
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }
}

impl TryFrom<[f64; 2]> for ClampRange {
    type Error = InvalidClamp;

    fn try_from(bounds: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(bounds[0], bounds[1])
    }
}

impl From<ClampRange> for [f64; 2] {
    fn from(range: ClampRange) -> Self {
        [range.low, range.high]
    }
}

impl fmt::Display for ClampRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.low, self.high)
    }
}

/// Kind of chart produced for a comparison group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    /// Side-by-side box-and-whisker distributions
    Box,
    /// The box plot again, with the y axis fixed to a clamp range
    BoxClamped,
    /// Overlapping kernel density curves
    Density,
    /// Bar chart of the series means
    Bar,
}

impl ChartKind {
    /// File name suffix, including the extension.
    pub fn suffix(&self) -> &'static str {
        match self {
            ChartKind::Box => "_box.png",
            ChartKind::BoxClamped => "_box_2.png",
            ChartKind::Density => "_kde.png",
            ChartKind::Bar => "_bar.png",
        }
    }

    /// Deterministic artifact file name for a prefix.
    pub fn file_name(&self, prefix: &str) -> String {
        format!("{}{}", prefix, self.suffix())
    }
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartKind::Box => write!(f, "Box plot"),
            ChartKind::BoxClamped => write!(f, "Box plot (clamped)"),
            ChartKind::Density => write!(f, "Density"),
            ChartKind::Bar => write!(f, "Mean bar"),
        }
    }
}

/// An image written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartArtifact {
    pub kind: ChartKind,
    pub path: PathBuf,
}

/// A chart that could not be written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartFailure {
    pub kind: ChartKind,
    pub error: String,
}

/// Baseline and variant samples compared under one label.
///
/// The two sequences are independent and may differ in length.
#[derive(Debug, Clone, Default)]
pub struct SamplePair {
    pub label: String,
    pub baseline: Vec<f64>,
    pub variant: Vec<f64>,
}

impl SamplePair {
    pub fn new(label: impl Into<String>, baseline: Vec<f64>, variant: Vec<f64>) -> Self {
        Self {
            label: label.into(),
            baseline,
            variant,
        }
    }

    /// Returns true when neither series holds any data.
    pub fn is_empty(&self) -> bool {
        self.baseline.is_empty() && self.variant.is_empty()
    }
}

/// Descriptive statistics for one loaded series.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeriesSummary {
    /// Display name of the series (e.g. "SSH").
    pub name: String,
    /// File the samples were read from.
    pub source: PathBuf,
    /// Number of samples loaded.
    pub count: usize,
    pub mean: Option<f64>,
    pub median: Option<f64>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub std_dev: Option<f64>,
    /// Loader diagnostics for this file.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub issues: Vec<String>,
}

impl SeriesSummary {
    /// Summarises a sample sequence.
    pub fn from_samples(
        name: impl Into<String>,
        source: PathBuf,
        samples: &[f64],
        issues: Vec<String>,
    ) -> Self {
        let range = min_max(samples);
        Self {
            name: name.into(),
            source,
            count: samples.len(),
            mean: mean(samples),
            median: quantile(samples, 0.5),
            min: range.map(|(lo, _)| lo),
            max: range.map(|(_, hi)| hi),
            std_dev: std_dev(samples),
            issues,
        }
    }
}

/// Result of running one comparison group through the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupOutcome {
    /// Output file prefix of the group.
    pub prefix: String,
    pub baseline: SeriesSummary,
    pub variant: SeriesSummary,
    /// Charts successfully written.
    pub artifacts: Vec<ChartArtifact>,
    /// Charts that failed to render.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<ChartFailure>,
}

/// Metadata about a complete run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunMetadata {
    /// When the run finished.
    pub generated_at: DateTime<Utc>,
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Parse policy used by the loader.
    pub parse_policy: String,
    pub groups: usize,
    pub charts_written: usize,
    pub charts_failed: usize,
    pub duration_seconds: f64,
}

/// Everything a run produced, in configuration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub groups: Vec<GroupOutcome>,
}

//! Chart rendering.
//!
//! Every comparison group produces a box plot, a density plot and a bar
//! chart of means, plus a zoomed box plot when a clamp range is given.
//! Charts are independent: one failing does not stop the others.

pub mod bar;
pub mod box_plot;
pub mod density;
pub mod style;

pub use style::ChartStyle;

use crate::models::{ChartArtifact, ChartFailure, ChartKind, ClampRange, SamplePair};
use anyhow::{Context, Result};
use plotters::coord::types::RangedCoordf64;
use plotters::prelude::{Cartesian2d, ChartContext};
use std::ops::Range;
use std::path::Path;
use tracing::{debug, warn};

/// Horizontal span of the two category slots (centred on 0 and 1).
pub(crate) const CATEGORY_RANGE: Range<f64> = -0.5..1.5;

/// Half the width of a box or bar, in category units.
pub(crate) const SLOT_HALF_WIDTH: f64 = 0.4;

/// A chart with numeric axes on both sides.
pub(crate) type Chart<'a, DB> = ChartContext<'a, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>;

/// Fraction of the data span added above and below an automatic axis.
const AXIS_MARGIN: f64 = 0.05;

/// Pads `[lo, hi]` for display; a zero-width span is widened to 1.
pub(crate) fn padded_range(lo: f64, hi: f64) -> Range<f64> {
    if !(lo.is_finite() && hi.is_finite()) {
        return 0.0..1.0;
    }
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.5)..(hi + 0.5);
    }
    (lo - span * AXIS_MARGIN)..(hi + span * AXIS_MARGIN)
}

/// Charts written and charts lost for one sample pair.
#[derive(Debug, Clone, Default)]
pub struct RenderOutcome {
    pub artifacts: Vec<ChartArtifact>,
    pub failures: Vec<ChartFailure>,
}

impl RenderOutcome {
    fn record(&mut self, kind: ChartKind, path: &Path, result: Result<()>) {
        match result {
            Ok(()) => {
                debug!("Wrote {}", path.display());
                self.artifacts.push(ChartArtifact {
                    kind,
                    path: path.to_path_buf(),
                });
            }
            Err(e) => {
                warn!("{} for {} failed: {:#}", kind, path.display(), e);
                self.failures.push(ChartFailure {
                    kind,
                    error: format!("{:#}", e),
                });
            }
        }
    }
}

/// Renders every chart for `pair` into `out_dir`, named after `pair.label`.
///
/// Existing files with the same names are overwritten.
pub fn render_pair(
    pair: &SamplePair,
    clamp: Option<ClampRange>,
    style: &ChartStyle,
    out_dir: &Path,
) -> RenderOutcome {
    let mut outcome = RenderOutcome::default();
    let path_for = |kind: ChartKind| out_dir.join(kind.file_name(&pair.label));

    let path = path_for(ChartKind::Box);
    let result = box_plot::render_box_plot(pair, None, style, &path)
        .with_context(|| format!("box plot of {}", pair.label));
    outcome.record(ChartKind::Box, &path, result);

    if let Some(range) = clamp {
        debug!("{}: clamped box plot over {}", pair.label, range);
        let path = path_for(ChartKind::BoxClamped);
        let result = box_plot::render_box_plot(pair, Some(range), style, &path)
            .with_context(|| format!("clamped box plot of {}", pair.label));
        outcome.record(ChartKind::BoxClamped, &path, result);
    }

    let path = path_for(ChartKind::Density);
    let result = density::render_density(pair, style, &path)
        .with_context(|| format!("density plot of {}", pair.label));
    outcome.record(ChartKind::Density, &path, result);

    let path = path_for(ChartKind::Bar);
    let result = bar::render_bar(pair, style, &path)
        .with_context(|| format!("bar chart of {}", pair.label));
    outcome.record(ChartKind::Bar, &path, result);

    outcome
}

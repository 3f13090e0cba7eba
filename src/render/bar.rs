//! Bar chart of series means.

use super::style::{ChartStyle, FONT_FAMILY};
use super::{AXIS_MARGIN, CATEGORY_RANGE, SLOT_HALF_WIDTH};
use crate::analysis::mean;
use crate::models::SamplePair;
use anyhow::Result;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::info;

/// Bar heights: the mean of each series, `None` for an empty one.
pub fn bar_heights(pair: &SamplePair) -> [Option<f64>; 2] {
    [mean(&pair.baseline), mean(&pair.variant)]
}

/// Y range anchored at zero with headroom above the tallest bar.
fn y_range(heights: &[Option<f64>]) -> Range<f64> {
    let values = || heights.iter().flatten().copied().filter(|v| v.is_finite());
    let lo = values().fold(0.0, f64::min);
    let hi = values().fold(0.0, f64::max);

    let span = hi - lo;
    if span <= 0.0 {
        return 0.0..1.0;
    }

    let bottom = if lo < 0.0 { lo - span * AXIS_MARGIN } else { 0.0 };
    let top = if hi > 0.0 { hi + span * AXIS_MARGIN } else { 0.0 };
    bottom..top
}

/// Writes the two-bar mean comparison of `pair` to `path`.
pub fn render_bar(pair: &SamplePair, style: &ChartStyle, path: &Path) -> Result<()> {
    let heights = bar_heights(pair);
    let y = y_range(&heights);

    let root = BitMapBackend::new(path, style.bar_size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(
                format!("Average Latency Comparison {}", pair.label),
                (FONT_FAMILY, 26),
            )
            .x_label_area_size(50)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d(CATEGORY_RANGE, y)?;

    if style.text {
        let label = |x: &f64| style.category_label(*x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&label)
            .y_desc(format!("Average Latency ({})", style.unit))
            .draw()?;
    }

    let bars = [
        (0.0, &style.baseline_name, style.baseline_color, heights[0]),
        (1.0, &style.variant_name, style.variant_color, heights[1]),
    ];

    for (x, name, color, height) in bars {
        let Some(height) = height.filter(|h| h.is_finite()) else {
            info!("{}: no finite mean for {}", pair.label, name);
            continue;
        };

        chart.draw_series(std::iter::once(Rectangle::new(
            [(x - SLOT_HALF_WIDTH, 0.0), (x + SLOT_HALF_WIDTH, height)],
            color.filled(),
        )))?;
    }

    root.present()?;
    Ok(())
}

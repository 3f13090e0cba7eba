//! Box-and-whisker comparison chart.

use super::style::{ChartStyle, FONT_FAMILY};
use super::{padded_range, Chart, CATEGORY_RANGE, SLOT_HALF_WIDTH};
use crate::analysis::BoxStats;
use crate::models::{ClampRange, SamplePair};
use anyhow::Result;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::warn;

const CAP_HALF_WIDTH: f64 = SLOT_HALF_WIDTH / 2.0;
const OUTLIER_RADIUS: i32 = 3;

/// Y-axis range: the clamp if given, otherwise everything the boxes draw.
pub fn y_range(stats: &[Option<BoxStats>], clamp: Option<ClampRange>) -> Range<f64> {
    if let Some(range) = clamp {
        return range.low()..range.high();
    }

    let extent = stats
        .iter()
        .flatten()
        .map(BoxStats::extent)
        .reduce(|(lo_a, hi_a), (lo_b, hi_b)| (lo_a.min(lo_b), hi_a.max(hi_b)));

    match extent {
        Some((lo, hi)) => padded_range(lo, hi),
        None => 0.0..1.0,
    }
}

/// Writes the box plot of `pair` to `path`.
///
/// With a clamp range the y axis is fixed to it and everything outside
/// is cut off.
pub fn render_box_plot(
    pair: &SamplePair,
    clamp: Option<ClampRange>,
    style: &ChartStyle,
    path: &Path,
) -> Result<()> {
    for (name, samples) in [
        (&style.baseline_name, &pair.baseline),
        (&style.variant_name, &pair.variant),
    ] {
        let dropped = samples.iter().filter(|v| !v.is_finite()).count();
        if dropped > 0 {
            warn!("{}: ignoring {} non-finite {} sample(s) in box plot", pair.label, dropped, name);
        }
    }

    let stats = [
        BoxStats::from_samples(&pair.baseline),
        BoxStats::from_samples(&pair.variant),
    ];
    let y = y_range(&stats, clamp);
    let clip = |v: f64| v.clamp(y.start, y.end);

    let root = BitMapBackend::new(path, style.box_size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(
                format!("{} Latency Comparison {}", style.versus(), pair.label),
                (FONT_FAMILY, 26),
            )
            .x_label_area_size(50)
            .y_label_area_size(70);
    }
    let mut chart = builder.build_cartesian_2d(CATEGORY_RANGE, y.clone())?;

    if style.text {
        let label = |x: &f64| style.category_label(*x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(3)
            .x_label_formatter(&label)
            .x_desc("Protocol")
            .y_desc(format!("Latency ({})", style.unit))
            .draw()?;
    }

    let slots = [
        (0.0, &stats[0], style.baseline_color),
        (1.0, &stats[1], style.variant_color),
    ];

    for (x, stats, color) in slots {
        let Some(stats) = stats else {
            continue;
        };

        // Entirely above or below a clamped view
        if stats.q3 < y.start || stats.q1 > y.end {
            draw_whiskers(&mut chart, x, stats, &clip)?;
            draw_outliers(&mut chart, x, stats, &y)?;
            continue;
        }

        let body = [
            (x - SLOT_HALF_WIDTH, clip(stats.q1)),
            (x + SLOT_HALF_WIDTH, clip(stats.q3)),
        ];
        chart.draw_series(std::iter::once(Rectangle::new(body, color.mix(0.75).filled())))?;
        chart.draw_series(std::iter::once(Rectangle::new(body, BLACK.stroke_width(1))))?;

        draw_whiskers(&mut chart, x, stats, &clip)?;

        if y.contains(&stats.median) {
            chart.draw_series(std::iter::once(PathElement::new(
                vec![
                    (x - SLOT_HALF_WIDTH, stats.median),
                    (x + SLOT_HALF_WIDTH, stats.median),
                ],
                BLACK.stroke_width(2),
            )))?;
        }

        draw_outliers(&mut chart, x, stats, &y)?;
    }

    root.present()?;
    Ok(())
}

fn draw_whiskers<DB>(
    chart: &mut Chart<'_, DB>,
    x: f64,
    stats: &BoxStats,
    clip: &dyn Fn(f64) -> f64,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    let segments = [
        (stats.q1, stats.lower_whisker),
        (stats.q3, stats.upper_whisker),
    ];

    for (from, to) in segments {
        let (from, to) = (clip(from), clip(to));
        if from == to {
            continue;
        }
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x, from), (x, to)],
            BLACK.stroke_width(1),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![(x - CAP_HALF_WIDTH, to), (x + CAP_HALF_WIDTH, to)],
            BLACK.stroke_width(1),
        )))?;
    }

    Ok(())
}

fn draw_outliers<DB>(
    chart: &mut Chart<'_, DB>,
    x: f64,
    stats: &BoxStats,
    visible: &Range<f64>,
) -> Result<()>
where
    DB: DrawingBackend,
    DB::ErrorType: 'static,
{
    chart.draw_series(
        stats
            .outliers
            .iter()
            .filter(|v| visible.contains(*v))
            .map(|&v| Circle::new((x, v), OUTLIER_RADIUS, BLACK.stroke_width(1))),
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_y_range_uses_clamp() {
        let stats = [BoxStats::from_samples(&[1.0, 1000.0]), None];
        let clamp = ClampRange::new(300.0, 600.0).ok();
        assert_eq!(y_range(&stats, clamp), 300.0..600.0);
    }

    #[test]
    fn test_y_range_covers_outliers() {
        let stats = [
            BoxStats::from_samples(&[1.0, 2.0, 3.0, 4.0, 5.0, 3.0, 100.0]),
            BoxStats::from_samples(&[10.0, 11.0]),
        ];
        let range = y_range(&stats, None);
        assert!(range.start < 1.0);
        assert!(range.end > 100.0);
    }

    #[test]
    fn test_y_range_skips_nan_samples() {
        let stats = [
            BoxStats::from_samples(&[1.0, f64::NAN, 3.0]),
            BoxStats::from_samples(&[4.0, 5.0, 6.0]),
        ];
        let range = y_range(&stats, None);
        assert!(range.start < 1.0);
        assert!(range.end > 6.0);
    }

    #[test]
    fn test_y_range_without_data() {
        assert_eq!(y_range(&[None, None], None), 0.0..1.0);
    }
}

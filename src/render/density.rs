//! Kernel density comparison chart.

use super::style::{ChartStyle, FONT_FAMILY};
use super::AXIS_MARGIN;
use crate::analysis::KernelDensity;
use crate::models::SamplePair;
use anyhow::Result;
use plotters::prelude::*;
use std::ops::Range;
use std::path::Path;
use tracing::{debug, info};

type Curve = Vec<(f64, f64)>;

/// Density curves of the baseline and variant series.
///
/// A series without an estimable density (fewer than two samples, or
/// all samples equal) has no curve.
pub fn density_curves(pair: &SamplePair, points: usize) -> [Option<Curve>; 2] {
    [&pair.baseline, &pair.variant].map(|samples| {
        KernelDensity::fit(samples).map(|kde| {
            debug!("{}: KDE bandwidth {:.4}", pair.label, kde.bandwidth());
            kde.curve(points)
        })
    })
}

/// Shared axes covering every curve.
fn axes(curves: &[Option<Curve>]) -> (Range<f64>, Range<f64>) {
    let points = || curves.iter().flatten().flatten();

    let x_lo = points().map(|p| p.0).fold(f64::INFINITY, f64::min);
    let x_hi = points().map(|p| p.0).fold(f64::NEG_INFINITY, f64::max);
    let y_hi = points().map(|p| p.1).fold(0.0, f64::max);

    if !(x_lo < x_hi) || y_hi <= 0.0 {
        return (0.0..1.0, 0.0..1.0);
    }
    (x_lo..x_hi, 0.0..y_hi * (1.0 + AXIS_MARGIN))
}

/// Writes overlapping filled density curves of `pair` to `path`.
pub fn render_density(pair: &SamplePair, style: &ChartStyle, path: &Path) -> Result<()> {
    let curves = density_curves(pair, style.kde_points);
    let (x, y) = axes(&curves);

    let root = BitMapBackend::new(path, style.density_size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if style.text {
        builder
            .caption(
                format!("Latency Density Comparison {}", pair.label),
                (FONT_FAMILY, 26),
            )
            .x_label_area_size(50)
            .y_label_area_size(80);
    }
    let mut chart = builder.build_cartesian_2d(x, y)?;

    if style.text {
        chart
            .configure_mesh()
            .x_desc(format!("Latency ({})", style.unit))
            .y_desc("Density")
            .draw()?;
    }

    let series = [
        (&style.baseline_name, style.baseline_color, &curves[0]),
        (&style.variant_name, style.variant_color, &curves[1]),
    ];

    let mut drawn = 0;
    for (name, color, curve) in series {
        let Some(curve) = curve else {
            info!("{}: no density for {} (needs two distinct samples)", pair.label, name);
            continue;
        };

        let anno = chart.draw_series(
            AreaSeries::new(curve.iter().copied(), 0.0, color.mix(0.25).filled())
                .border_style(color.stroke_width(2)),
        )?;
        if style.text {
            anno.label(name.as_str()).legend(move |(lx, ly)| {
                Rectangle::new([(lx, ly - 6), (lx + 16, ly + 6)], color.mix(0.5).filled())
            });
        }
        drawn += 1;
    }

    if style.text && drawn > 0 {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8).filled())
            .border_style(BLACK.stroke_width(1))
            .draw()?;
    }

    root.present()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_curves() {
        let pair = SamplePair::new("p", vec![1.0, 2.0, 3.0], vec![7.0]);
        let [baseline, variant] = density_curves(&pair, 50);
        assert_eq!(baseline.map(|c| c.len()), Some(50));
        assert!(variant.is_none());
    }

    #[test]
    fn test_axes_cover_both_curves() {
        let pair = SamplePair::new("p", vec![1.0, 2.0, 3.0], vec![10.0, 12.0, 11.0]);
        let curves = density_curves(&pair, 100);
        let (x, y) = axes(&curves);
        assert!(x.start < 1.0);
        assert!(x.end > 12.0);
        assert_eq!(y.start, 0.0);
        assert!(y.end > 0.0);
    }

    #[test]
    fn test_axes_without_curves() {
        assert_eq!(axes(&[None, None]), (0.0..1.0, 0.0..1.0));
    }
}

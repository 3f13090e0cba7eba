//! Gaussian kernel density estimation.
//!
//! Bandwidth follows Scott's rule (`sigma * n^(-1/5)`) and curves are
//! evaluated on `[min - 3h, max + 3h]`, the usual KDE-plot defaults.

use super::aggregator::{min_max, std_dev};
use std::f64::consts::PI;

/// Grid resolution used when none is configured.
pub const DEFAULT_GRID_POINTS: usize = 200;

/// How many bandwidths the evaluated curve extends past the data.
pub const CUT: f64 = 3.0;

/// A fitted Gaussian KDE.
#[derive(Debug, Clone)]
pub struct KernelDensity {
    samples: Vec<f64>,
    bandwidth: f64,
}

impl KernelDensity {
    /// Fits a KDE to the samples.
    ///
    /// Returns `None` when no density can be estimated: fewer than two
    /// samples, zero variance, or non-finite values.
    pub fn fit(samples: &[f64]) -> Option<Self> {
        let sigma = std_dev(samples)?;
        if !sigma.is_finite() || sigma <= 0.0 {
            return None;
        }

        let bandwidth = sigma * (samples.len() as f64).powf(-0.2);
        Some(Self {
            samples: samples.to_vec(),
            bandwidth,
        })
    }

    pub fn bandwidth(&self) -> f64 {
        self.bandwidth
    }

    /// Density at `x`.
    pub fn evaluate(&self, x: f64) -> f64 {
        let h = self.bandwidth;
        let norm = 1.0 / (self.samples.len() as f64 * h * (2.0 * PI).sqrt());
        let sum: f64 = self
            .samples
            .iter()
            .map(|&xi| {
                let z = (x - xi) / h;
                (-0.5 * z * z).exp()
            })
            .sum();
        sum * norm
    }

    /// Interval the curve is evaluated over.
    pub fn support(&self) -> (f64, f64) {
        // fit() guarantees at least two samples
        let (lo, hi) = min_max(&self.samples).unwrap_or((0.0, 0.0));
        (lo - CUT * self.bandwidth, hi + CUT * self.bandwidth)
    }

    /// Evaluates the density on `points` evenly spaced positions.
    pub fn curve(&self, points: usize) -> Vec<(f64, f64)> {
        let points = points.max(2);
        let (lo, hi) = self.support();
        let step = (hi - lo) / (points - 1) as f64;

        (0..points)
            .map(|i| {
                let x = lo + step * i as f64;
                (x, self.evaluate(x))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_rejects_degenerate_input() {
        assert!(KernelDensity::fit(&[]).is_none());
        assert!(KernelDensity::fit(&[1.0]).is_none());
        assert!(KernelDensity::fit(&[5.0, 5.0, 5.0]).is_none());
        assert!(KernelDensity::fit(&[1.0, f64::INFINITY]).is_none());
    }

    #[test]
    fn test_scott_bandwidth() {
        let kde = KernelDensity::fit(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap();
        assert!((kde.bandwidth() - 1.145977269496164).abs() < 1e-12);
    }

    #[test]
    fn test_curve_integrates_to_one() {
        let kde = KernelDensity::fit(&[310.0, 322.5, 298.0, 305.5, 340.0, 301.0]).unwrap();
        let curve = kde.curve(DEFAULT_GRID_POINTS);
        assert_eq!(curve.len(), DEFAULT_GRID_POINTS);

        let area: f64 = curve
            .windows(2)
            .map(|w| (w[1].0 - w[0].0) * (w[0].1 + w[1].1) / 2.0)
            .sum();
        assert!((area - 1.0).abs() < 0.01, "area was {}", area);
    }

    #[test]
    fn test_curve_is_symmetric_for_symmetric_data() {
        let kde = KernelDensity::fit(&[1.0, 2.0, 3.0]).unwrap();
        let left = kde.evaluate(2.0 - 0.7);
        let right = kde.evaluate(2.0 + 0.7);
        assert!((left - right).abs() < 1e-12);
        assert!(kde.evaluate(2.0) > left);
    }

    #[test]
    fn test_curve_spans_support() {
        let kde = KernelDensity::fit(&[4.0, 5.0, 6.0]).unwrap();
        let (lo, hi) = kde.support();
        let curve = kde.curve(10);
        assert!((curve[0].0 - lo).abs() < 1e-12);
        assert!((curve[9].0 - hi).abs() < 1e-9);
        assert!(lo < 4.0 && hi > 6.0);
    }
}

//! Descriptive statistics over sample sequences.
//!
//! Every function treats the input as an unordered bag of values and
//! returns `None` instead of NaN when the input is too small to answer.

/// Arithmetic mean. `None` for an empty sequence.
pub fn mean(samples: &[f64]) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }

    let sum: f64 = samples.iter().sum();
    Some(sum / samples.len() as f64)
}

/// Sample standard deviation (n - 1 denominator).
///
/// Needs at least two samples.
pub fn std_dev(samples: &[f64]) -> Option<f64> {
    if samples.len() < 2 {
        return None;
    }

    let m = mean(samples)?;
    let sum_sq: f64 = samples.iter().map(|x| (x - m) * (x - m)).sum();
    Some((sum_sq / (samples.len() - 1) as f64).sqrt())
}

/// Smallest and largest sample.
pub fn min_max(samples: &[f64]) -> Option<(f64, f64)> {
    let first = *samples.first()?;
    Some(
        samples
            .iter()
            .skip(1)
            .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
    )
}

/// Returns a sorted copy of the samples.
pub fn sorted(samples: &[f64]) -> Vec<f64> {
    let mut values = samples.to_vec();
    values.sort_by(|a, b| a.total_cmp(b));
    values
}

/// The `p`-th quantile (`p` in `[0, 1]`), interpolating linearly
/// between the two closest ranks.
pub fn quantile(samples: &[f64], p: f64) -> Option<f64> {
    if samples.is_empty() {
        return None;
    }
    quantile_sorted(&sorted(samples), p)
}

/// Same as [`quantile`] for data that is already sorted ascending.
pub fn quantile_sorted(sorted: &[f64], p: f64) -> Option<f64> {
    let n = sorted.len();
    if n == 0 || !(0.0..=1.0).contains(&p) {
        return None;
    }
    if n == 1 {
        return Some(sorted[0]);
    }

    let h = (n - 1) as f64 * p;
    let j = h.floor() as usize;
    let g = h - h.floor();

    if j + 1 >= n {
        Some(sorted[n - 1])
    } else {
        Some((1.0 - g) * sorted[j] + g * sorted[j + 1])
    }
}

/// Whisker reach as a multiple of the interquartile range.
pub const WHISKER_IQR: f64 = 1.5;

/// Five-number summary plus outliers, as drawn by a box plot.
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest sample inside the lower fence.
    pub lower_whisker: f64,
    /// Largest sample inside the upper fence.
    pub upper_whisker: f64,
    /// Samples outside the fences, ascending.
    pub outliers: Vec<f64>,
}

impl BoxStats {
    /// Computes box-plot statistics over the finite samples.
    ///
    /// NaN and infinities are left out. `None` when nothing finite remains.
    pub fn from_samples(samples: &[f64]) -> Option<Self> {
        let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return None;
        }

        let sorted = sorted(&finite);
        let q1 = quantile_sorted(&sorted, 0.25)?;
        let median = quantile_sorted(&sorted, 0.5)?;
        let q3 = quantile_sorted(&sorted, 0.75)?;

        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        // Whiskers never retract inside the box, even for odd interpolations
        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&v| v >= low_fence)
            .unwrap_or(q1)
            .min(q1);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&v| v <= high_fence)
            .unwrap_or(q3)
            .max(q3);

        let outliers = sorted
            .iter()
            .copied()
            .filter(|&v| v < lower_whisker || v > upper_whisker)
            .collect();

        Some(Self {
            q1,
            median,
            q3,
            lower_whisker,
            upper_whisker,
            outliers,
        })
    }

    /// Lowest and highest value the box plot draws, outliers included.
    pub fn extent(&self) -> (f64, f64) {
        let lo = self
            .outliers
            .first()
            .map_or(self.lower_whisker, |&o| o.min(self.lower_whisker));
        let hi = self
            .outliers
            .last()
            .map_or(self.upper_whisker, |&o| o.max(self.upper_whisker));
        (lo, hi)
    }
}

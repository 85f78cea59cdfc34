//! Probability-density histograms and Gaussian overlays.
//!
//! Densities are normalised per bin: `count / (total · width)`, so that
//! Σ density·width = 1 over the bins that received samples.
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Half-width of the range used when all samples share one value.
const DEGENERATE_HALF_WIDTH: f64 = 1e-3;

/// Bin layout for a histogram.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BinSpec {
    /// This many equal-width bins spanning the sample range.
    Count(usize),
    /// Explicit ascending bin edges.
    Edges(Vec<f64>),
}

pub struct Histogram {
    pub centres: Vec<f64>,
    pub density: Vec<f64>,
    /// Bin edges (`centres.len() + 1`).
    pub edges: Vec<f64>,
}

impl Histogram {
    /// Σ density·width. 1 whenever any sample landed in a bin.
    pub fn integral(&self) -> f64 {
        self.density
            .iter()
            .zip(self.edges.windows(2))
            .map(|(d, e)| d * (e[1] - e[0]))
            .sum()
    }
}

/// Default bin count for `n` samples: `⌊√n + 1⌋`.
pub fn reasonable_bin_count(n: usize) -> usize {
    ((n as f64).sqrt() + 1.0) as usize
}

/// Build a probability-density histogram of the finite samples.
pub fn density_histogram(samples: &[f64], bins: &BinSpec) -> Result<Histogram> {
    let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();

    let edges = match bins {
        BinSpec::Count(0) => {
            return Err(AnalysisError::InvalidBins("bin count must be positive".into()))
        }
        BinSpec::Count(n) => {
            if finite.is_empty() {
                return Ok(Histogram {
                    centres: vec![f64::NAN; *n],
                    density: vec![f64::NAN; *n],
                    edges: vec![f64::NAN; n + 1],
                });
            }
            let mut lo = finite.iter().cloned().fold(f64::INFINITY, f64::min);
            let mut hi = finite.iter().cloned().fold(f64::NEG_INFINITY, f64::max);
            if hi - lo <= 0.0 {
                lo -= DEGENERATE_HALF_WIDTH;
                hi += DEGENERATE_HALF_WIDTH;
            }
            let width = (hi - lo) / *n as f64;
            let mut edges: Vec<f64> = (0..=*n).map(|k| lo + k as f64 * width).collect();
            // Pin the closing edge so the maximum sample lands inside.
            edges[*n] = hi;
            edges
        }
        BinSpec::Edges(edges) => {
            if edges.len() < 2 {
                return Err(AnalysisError::InvalidBins(
                    "at least two bin edges are required".into(),
                ));
            }
            if edges.windows(2).any(|w| !(w[1] > w[0])) {
                return Err(AnalysisError::InvalidBins(
                    "bin edges must be strictly ascending".into(),
                ));
            }
            edges.clone()
        }
    };

    let n_bins = edges.len() - 1;
    let lo = edges[0];
    let hi = edges[n_bins];
    let mut counts = vec![0u64; n_bins];
    for &v in &finite {
        if v < lo || v > hi {
            continue;
        }
        // Last bin is closed on the right.
        let bin = if v == hi {
            n_bins - 1
        } else {
            edges.partition_point(|&e| e <= v) - 1
        };
        counts[bin] += 1;
    }

    let total: u64 = counts.iter().sum();
    let density = counts
        .iter()
        .zip(edges.windows(2))
        .map(|(&c, e)| {
            if total == 0 {
                f64::NAN
            } else {
                c as f64 / (total as f64 * (e[1] - e[0]))
            }
        })
        .collect();
    let centres = edges.windows(2).map(|e| (e[0] + e[1]) / 2.0).collect();

    Ok(Histogram { centres, density, edges })
}

/// First and second moments of a sample population.
#[derive(Debug, Clone, Copy)]
pub struct Moments {
    pub mean: f64,
    /// Population standard deviation.
    pub std: f64,
    /// Root mean square about zero.
    pub rms: f64,
}

impl Moments {
    /// NaN moments when there are no finite samples.
    pub fn of(samples: &[f64]) -> Self {
        let finite: Vec<f64> = samples.iter().copied().filter(|v| v.is_finite()).collect();
        if finite.is_empty() {
            return Self { mean: f64::NAN, std: f64::NAN, rms: f64::NAN };
        }
        let n = finite.len() as f64;
        let mean = finite.iter().sum::<f64>() / n;
        let var = finite.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
        let rms = (finite.iter().map(|v| v * v).sum::<f64>() / n).sqrt();
        Self { mean, std: var.sqrt(), rms }
    }
}

/// Normal density with the given mean and standard deviation, evaluated at
/// `xs`. A zero or undefined deviation yields NaN everywhere.
pub fn gaussian_pdf(xs: &[f64], mean: f64, std: f64) -> Vec<f64> {
    if !(std > 0.0) || !mean.is_finite() || !std.is_finite() {
        return vec![f64::NAN; xs.len()];
    }
    let norm = 1.0 / (std * (2.0 * std::f64::consts::PI).sqrt());
    xs.iter()
        .map(|x| norm * (-(x - mean).powi(2) / (2.0 * std * std)).exp())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;

    #[test]
    fn ten_bins_over_symmetric_heights() {
        // Heights −9, −7, …, 9, five times each: one value per bin of width 1.8.
        let samples: Vec<f64> = (0..50).map(|k| -9.0 + 2.0 * (k % 10) as f64).collect();
        let h = density_histogram(&samples, &BinSpec::Count(10)).unwrap();
        let expected_centres = [-8.1, -6.3, -4.5, -2.7, -0.9, 0.9, 2.7, 4.5, 6.3, 8.1];
        for (c, e) in h.centres.iter().zip(expected_centres) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-12);
        }
        for d in &h.density {
            assert_abs_diff_eq!(*d, 1.0 / 18.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn constant_samples_get_a_narrow_range() {
        let h = density_histogram(&[-2.0; 3], &BinSpec::Count(3)).unwrap();
        let expected = [-2.0 - 1.0 / 1500.0, -2.0, -2.0 + 1.0 / 1500.0];
        for (c, e) in h.centres.iter().zip(expected) {
            assert_abs_diff_eq!(*c, e, epsilon = 1e-9);
        }
        assert_abs_diff_eq!(h.density[0], 0.0);
        assert_abs_diff_eq!(h.density[1], 1500.0, epsilon = 1e-6);
        assert_abs_diff_eq!(h.density[2], 0.0);
    }

    #[test]
    fn explicit_edges_are_reproduced() {
        let edges = vec![-4.75, -4.25, -3.75, -3.25];
        let h = density_histogram(&[-4.0; 8], &BinSpec::Edges(edges)).unwrap();
        assert_eq!(h.centres, vec![-4.5, -4.0, -3.5]);
        assert_eq!(h.density, vec![0.0, 2.0, 0.0]);
    }

    #[test]
    fn maximum_sample_falls_in_last_bin() {
        let h = density_histogram(&[-2.0, 0.0, 2.0], &BinSpec::Count(2)).unwrap();
        assert_eq!(h.centres, vec![-1.0, 1.0]);
        assert_abs_diff_eq!(h.density[0], 1.0 / 6.0, epsilon = 1e-12);
        assert_abs_diff_eq!(h.density[1], 2.0 / 6.0, epsilon = 1e-12);
    }

    #[test]
    fn invalid_bins_are_rejected() {
        assert!(density_histogram(&[1.0], &BinSpec::Count(0)).is_err());
        assert!(density_histogram(&[1.0], &BinSpec::Edges(vec![1.0])).is_err());
        assert!(density_histogram(&[1.0], &BinSpec::Edges(vec![1.0, 1.0])).is_err());
    }

    #[test]
    fn empty_population_gives_nan_density() {
        let h = density_histogram(&[], &BinSpec::Count(4)).unwrap();
        assert_eq!(h.density.len(), 4);
        assert!(h.density.iter().all(|d| d.is_nan()));
    }

    #[test]
    fn reasonable_bins_grow_with_sqrt() {
        assert_eq!(reasonable_bin_count(3), 2);
        assert_eq!(reasonable_bin_count(100), 11);
    }

    #[test]
    fn gaussian_is_nan_for_zero_deviation() {
        assert!(gaussian_pdf(&[0.0, 1.0], 0.0, 0.0).iter().all(|v| v.is_nan()));
        let g = gaussian_pdf(&[0.0], 0.0, 1.0);
        assert_abs_diff_eq!(g[0], 1.0 / (2.0 * std::f64::consts::PI).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn serde_accepts_count_or_edges() {
        let c: BinSpec = serde_json::from_str("12").unwrap();
        assert_eq!(c, BinSpec::Count(12));
        let e: BinSpec = serde_json::from_str("[0.0, 1.0, 2.5]").unwrap();
        assert_eq!(e, BinSpec::Edges(vec![0.0, 1.0, 2.5]));
    }

    proptest! {
        #[test]
        fn density_integrates_to_one(
            samples in proptest::collection::vec(-1e3f64..1e3, 1..200),
            n_bins in 3usize..40,
        ) {
            let h = density_histogram(&samples, &BinSpec::Count(n_bins)).unwrap();
            prop_assert!((h.integral() - 1.0).abs() < 1e-9, "integral = {}", h.integral());
        }
    }
}

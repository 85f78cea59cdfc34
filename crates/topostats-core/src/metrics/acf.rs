//! Height-difference autocorrelation function.
//!
//! A(r_k) = ½ ⟨(h_{i+k} − h_i)²⟩,  r_k = k·Δ
//!
//! The structure-function sums are evaluated for every lag at once:
//!   Σ_{i<n−k} (h_{i+k} − h_i)² = Σ_{i<n−k} h_i² + Σ_{i≥k} h_i² − 2 R(k)
//! with the cross-correlation R(k) = Σ_i h_i h_{i+k} taken from a
//! zero-padded FFT (linear correlation) or an unpadded one (circular
//! correlation, periodic data).
//!
//! Non-periodic lags run 1…n−1 with n−k pairs each; a lag is reliable while
//! at least half the profile contributes pairs. Periodic lags run 1…n/2 with
//! n wrapped pairs and are all reliable.
use num_complex::Complex;
use rustfft::FftPlanner;

use super::profiles::UniformProfiles;
use super::RawCurve;

/// Autocorrelation `R(k) = Σ_i h_i h_{i+k}` for `k = 0…n−1`.
///
/// `circular` wraps indices modulo `n`; otherwise pairs leaving the profile
/// are dropped.
fn autocorrelation(planner: &mut FftPlanner<f64>, line: &[f64], circular: bool) -> Vec<f64> {
    let n = line.len();
    let m = if circular { n } else { 2 * n };
    let mut buf: Vec<Complex<f64>> = line
        .iter()
        .map(|h| Complex::new(*h, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(m)
        .collect();
    planner.plan_fft_forward(m).process(&mut buf);
    for v in buf.iter_mut() {
        *v = Complex::new(v.norm_sqr(), 0.0);
    }
    planner.plan_fft_inverse(m).process(&mut buf);
    buf.iter().take(n).map(|v| v.re / m as f64).collect()
}

/// Profile-averaged height-difference ACF of a bundle.
pub fn height_difference_acf(bundle: &UniformProfiles) -> RawCurve {
    let n = bundle.len();
    if n < 2 {
        return RawCurve::default();
    }
    let max_lag = if bundle.periodic { n / 2 } else { n - 1 };
    let mut sums = vec![0f64; max_lag + 1];
    let mut pairs = vec![0u64; max_lag + 1];

    let mut planner = FftPlanner::<f64>::new();
    for line in &bundle.lines {
        let r = autocorrelation(&mut planner, line, bundle.periodic);
        if bundle.periodic {
            let total_sq: f64 = line.iter().map(|h| h * h).sum();
            for k in 1..=max_lag {
                sums[k] += (2.0 * total_sq - 2.0 * r[k]).max(0.0);
                pairs[k] += n as u64;
            }
        } else {
            // prefix[i] = Σ_{j<i} h_j²
            let mut prefix = vec![0f64; n + 1];
            for (i, h) in line.iter().enumerate() {
                prefix[i + 1] = prefix[i] + h * h;
            }
            for k in 1..=max_lag {
                let head = prefix[n - k];
                let tail = prefix[n] - prefix[k];
                sums[k] += (head + tail - 2.0 * r[k]).max(0.0);
                pairs[k] += (n - k) as u64;
            }
        }
    }

    let mut curve = RawCurve::default();
    for k in 1..=max_lag {
        if pairs[k] == 0 {
            continue;
        }
        curve.x.push(k as f64 * bundle.spacing);
        curve.y.push(sums[k] / (2.0 * pairs[k] as f64));
        curve.reliable.push(bundle.periodic || 2 * k <= n);
    }
    curve
}

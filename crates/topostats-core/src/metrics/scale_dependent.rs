//! Scale-dependent slope and curvature.
//!
//! Derivatives are taken with the stencil widened to `k` samples, so the
//! distance `k·Δ` sets the length scale at which roughness is probed:
//! ```text
//!   slope      s_k = sqrt⟨((h_{i+k} − h_i) / kΔ)²⟩
//!   curvature  κ_k = sqrt⟨((h_{i+k} − 2h_i + h_{i−k}) / (kΔ)²)²⟩
//! ```
//! Lags are log-spaced. A lag is reliable while the stencil spans no more
//! than half the profile; periodic bundles wrap and are always reliable.
use super::binning::log_spaced_lags;
use super::profiles::UniformProfiles;
use super::RawCurve;

fn max_lag(n: usize, periodic: bool, reach: usize) -> usize {
    if periodic {
        n / 2
    } else {
        (n - 1) / reach
    }
}

fn mean_square<F>(bundle: &UniformProfiles, k: usize, reach: usize, stencil: F) -> Option<f64>
where
    F: Fn(&[f64], usize, usize) -> f64,
{
    let n = bundle.len();
    let mut sum = 0.0;
    let mut count = 0u64;
    for line in &bundle.lines {
        let range = if bundle.periodic { 0..n } else { (reach - 1) * k..n - k };
        for i in range {
            let v = stencil(line, i, k);
            sum += v * v;
            count += 1;
        }
    }
    (count > 0).then(|| sum / count as f64)
}

#[inline]
fn wrap(i: isize, n: usize) -> usize {
    i.rem_euclid(n as isize) as usize
}

fn evaluate<F>(
    bundle: &UniformProfiles,
    nb_points_per_decade: usize,
    reach: usize,
    scale: impl Fn(f64) -> f64,
    stencil: F,
) -> RawCurve
where
    F: Fn(&[f64], usize, usize) -> f64,
{
    let n = bundle.len();
    if n < reach + 1 {
        return RawCurve::default();
    }
    let mut curve = RawCurve::default();
    for k in log_spaced_lags(max_lag(n, bundle.periodic, reach), nb_points_per_decade) {
        if let Some(ms) = mean_square(bundle, k, reach, &stencil) {
            let distance = k as f64 * bundle.spacing;
            curve.x.push(distance);
            curve.y.push(ms.sqrt() / scale(distance));
            curve.reliable.push(bundle.periodic || 2 * reach * k <= n);
        }
    }
    curve
}

/// RMS slope as a function of the differencing distance.
pub fn scale_dependent_slope(bundle: &UniformProfiles, nb_points_per_decade: usize) -> RawCurve {
    let n = bundle.len();
    evaluate(bundle, nb_points_per_decade, 1, |d| d, |line, i, k| {
        line[wrap((i + k) as isize, n)] - line[i]
    })
}

/// RMS curvature as a function of the differencing distance.
pub fn scale_dependent_curvature(bundle: &UniformProfiles, nb_points_per_decade: usize) -> RawCurve {
    let n = bundle.len();
    evaluate(bundle, nb_points_per_decade, 2, |d| d * d, |line, i, k| {
        // Non-periodic ranges start at i = k, so i − k never wraps there.
        let prev = line[wrap(i as isize - k as isize, n)];
        let next = line[wrap((i + k) as isize, n)];
        next - 2.0 * line[i] + prev
    })
}

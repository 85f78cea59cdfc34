//! Scalar roughness parameters.
//!
//! Line scans are treated as piecewise-linear: means and RMS heights are
//! integrals over the profile divided by its length, and RMS slopes weight
//! each segment by its width. Grids use plain sample averages.
use super::detrend::rms;
use super::gradient::{
    area_mean_curvatures, area_second_derivatives, area_slopes, profile_curvatures, profile_slopes,
};
use crate::heightfield::{AreaMap, Axis, Profile};

/// Mean height of the piecewise-linear profile. Falls back to the sample
/// mean for a zero-length profile.
pub fn profile_mean_height(x: &[f64], h: &[f64]) -> f64 {
    let length = match (x.first(), x.last()) {
        (Some(a), Some(b)) => b - a,
        _ => 0.0,
    };
    if length <= 0.0 {
        return h.iter().sum::<f64>() / h.len().max(1) as f64;
    }
    let integral: f64 = x
        .windows(2)
        .zip(h.windows(2))
        .map(|(xs, hs)| (xs[1] - xs[0]) * (hs[0] + hs[1]) / 2.0)
        .sum();
    integral / length
}

/// RMS height of a line scan about its mean, `sqrt(1/L ∫ (h − h̄)² dx)`.
pub fn profile_rms_height(p: &Profile) -> f64 {
    let length = p.length();
    if length <= 0.0 {
        return f64::NAN;
    }
    let mean = profile_mean_height(&p.x, &p.h);
    // Exact integral of the squared linear interpolant on each segment.
    let integral: f64 = p
        .x
        .windows(2)
        .zip(p.h.windows(2))
        .map(|(xs, hs)| {
            let (a, b) = (hs[0] - mean, hs[1] - mean);
            (xs[1] - xs[0]) * (a * a + a * b + b * b) / 3.0
        })
        .sum();
    (integral / length).sqrt()
}

/// RMS height of the grid lines along `axis`, each line about its own mean.
pub fn rms_height_along(a: &AreaMap, axis: Axis) -> f64 {
    let mut sum = 0.0;
    let mut count = 0usize;
    for line in a.lines(axis) {
        let mean = line.iter().sum::<f64>() / line.len() as f64;
        sum += line.iter().map(|h| (h - mean).powi(2)).sum::<f64>();
        count += line.len();
    }
    if count == 0 {
        return f64::NAN;
    }
    (sum / count as f64).sqrt()
}

/// Areal RMS height `Sq` about the grid mean.
pub fn area_rms_height(a: &AreaMap) -> f64 {
    let n = a.data.len();
    if n == 0 {
        return f64::NAN;
    }
    let mean = a.data.iter().sum::<f64>() / n as f64;
    (a.data.iter().map(|h| (h - mean).powi(2)).sum::<f64>() / n as f64).sqrt()
}

/// RMS slope of a line scan, segments weighted by width.
pub fn profile_rms_slope(p: &Profile) -> f64 {
    let length = p.length();
    if length <= 0.0 {
        return f64::NAN;
    }
    let weighted: f64 = profile_slopes(p).iter().map(|(dx, s)| dx * s * s).sum();
    (weighted / length).sqrt()
}

pub fn rms_slope_along(a: &AreaMap, axis: Axis) -> f64 {
    rms(&area_slopes(a, axis))
}

/// `sqrt(⟨(∂h/∂x)²⟩ + ⟨(∂h/∂y)²⟩)`
pub fn rms_gradient(a: &AreaMap) -> f64 {
    let sx = rms_slope_along(a, Axis::X);
    let sy = rms_slope_along(a, Axis::Y);
    (sx * sx + sy * sy).sqrt()
}

pub fn profile_rms_curvature(p: &Profile) -> f64 {
    rms(&profile_curvatures(p))
}

pub fn rms_curvature_along(a: &AreaMap, axis: Axis) -> f64 {
    rms(&area_second_derivatives(a, axis))
}

/// RMS of the mean curvature `(∂²h/∂x² + ∂²h/∂y²) / 2`.
pub fn area_rms_curvature(a: &AreaMap) -> f64 {
    rms(&area_mean_curvatures(a))
}

/// Smallest and largest length scale a line scan resolves.
pub fn profile_bandwidth(p: &Profile) -> (f64, f64) {
    (p.shortest_interval(), p.length())
}

/// Smallest and largest length scale a map resolves: the mean pixel size and
/// the mean physical extent.
pub fn area_bandwidth(a: &AreaMap) -> (f64, f64) {
    let (px, py) = a.pixel_size();
    ((px + py) / 2.0, (a.sx + a.sy) / 2.0)
}

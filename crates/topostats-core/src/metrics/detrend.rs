//! Least-squares trend removal shared by the topography adapters and the
//! variable-bandwidth decomposition.
//!
//! On a regular grid the centred index coordinates are orthogonal to the
//! constant term (and to each other), so the normal equations decouple:
//!   slope = Σ (i − ī)·h_i / Σ (i − ī)²
//! with no matrix solve required.

/// Residuals of an equally spaced sequence after removing its best-fit line.
pub(crate) fn line_residuals(values: &[f64]) -> Vec<f64> {
    let n = values.len();
    if n == 0 {
        return Vec::new();
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let centre = (n as f64 - 1.0) / 2.0;
    let sxx: f64 = (0..n).map(|i| (i as f64 - centre).powi(2)).sum();
    let sxy: f64 = values
        .iter()
        .enumerate()
        .map(|(i, &h)| (i as f64 - centre) * h)
        .sum();
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    values
        .iter()
        .enumerate()
        .map(|(i, &h)| h - mean - slope * (i as f64 - centre))
        .collect()
}

/// Residuals after removing the best-fit line through nonuniform points.
pub(crate) fn nonuniform_line_residuals(x: &[f64], h: &[f64]) -> Vec<f64> {
    let n = x.len().min(h.len());
    if n == 0 {
        return Vec::new();
    }
    let mx = x.iter().take(n).sum::<f64>() / n as f64;
    let mh = h.iter().take(n).sum::<f64>() / n as f64;
    let mut sxx = 0.0;
    let mut sxy = 0.0;
    for i in 0..n {
        sxx += (x[i] - mx).powi(2);
        sxy += (x[i] - mx) * (h[i] - mh);
    }
    let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
    (0..n).map(|i| h[i] - mh - slope * (x[i] - mx)).collect()
}

/// Residuals of an `nx × ny` tile (`tile[ix * ny + iy]`) after removing its
/// best-fit plane.
pub(crate) fn plane_residuals(tile: &[f64], nx: usize, ny: usize) -> Vec<f64> {
    let n = nx * ny;
    if n == 0 || tile.len() != n {
        return Vec::new();
    }
    let mean = tile.iter().sum::<f64>() / n as f64;
    let cx = (nx as f64 - 1.0) / 2.0;
    let cy = (ny as f64 - 1.0) / 2.0;
    let sxx: f64 = (0..nx).map(|i| (i as f64 - cx).powi(2)).sum::<f64>() * ny as f64;
    let syy: f64 = (0..ny).map(|j| (j as f64 - cy).powi(2)).sum::<f64>() * nx as f64;

    let mut sxh = 0.0;
    let mut syh = 0.0;
    for ix in 0..nx {
        for iy in 0..ny {
            let h = tile[ix * ny + iy];
            sxh += (ix as f64 - cx) * h;
            syh += (iy as f64 - cy) * h;
        }
    }
    let bx = if sxx > 0.0 { sxh / sxx } else { 0.0 };
    let by = if syy > 0.0 { syh / syy } else { 0.0 };

    let mut out = Vec::with_capacity(n);
    for ix in 0..nx {
        for iy in 0..ny {
            let trend = mean + bx * (ix as f64 - cx) + by * (iy as f64 - cy);
            out.push(tile[ix * ny + iy] - trend);
        }
    }
    out
}

/// Root mean square of a residual vector. NaN when empty.
pub(crate) fn rms(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    (values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64).sqrt()
}

//! Finite-difference slopes and curvatures shared by the distribution
//! workflows and the roughness table.
//!
//! Stencils:
//! ```text
//!   slope      s_i  = (h_{i+1} − h_i) / Δ
//!   curvature  κ_i  = (h_{i+1} − 2 h_i + h_{i−1}) / Δ²
//!   nonuniform κ_i  = 2 · (s_i − s_{i−1}) / (x_{i+1} − x_{i−1})
//!   mean curv. κ    = (∂²h/∂x² + ∂²h/∂y²) / 2
//! ```
//! Periodic grids wrap every stencil, so each point contributes. Non-periodic
//! grids drop the points whose stencil would leave the grid. Both choices
//! give exactly zero curvature on linear fields, and on a periodic grid the
//! second differences telescope so the mean curvature is zero as well.
use crate::heightfield::{AreaMap, Axis, Profile};

/// Per-segment slopes of a line scan, paired with the segment widths.
pub(crate) fn profile_slopes(p: &Profile) -> Vec<(f64, f64)> {
    p.x.windows(2)
        .zip(p.h.windows(2))
        .map(|(x, h)| {
            let dx = x[1] - x[0];
            (dx, (h[1] - h[0]) / dx)
        })
        .collect()
}

/// Second derivative at the interior points of a line scan.
pub(crate) fn profile_curvatures(p: &Profile) -> Vec<f64> {
    let n = p.len();
    if n < 3 {
        return Vec::new();
    }
    (1..n - 1)
        .map(|i| {
            let s_left = (p.h[i] - p.h[i - 1]) / (p.x[i] - p.x[i - 1]);
            let s_right = (p.h[i + 1] - p.h[i]) / (p.x[i + 1] - p.x[i]);
            2.0 * (s_right - s_left) / (p.x[i + 1] - p.x[i - 1])
        })
        .collect()
}

/// Grid index shifted by `offset` along `axis`, or `None` when a
/// non-periodic stencil would leave the grid.
#[inline]
fn neighbour(a: &AreaMap, ix: usize, iy: usize, axis: Axis, offset: isize) -> Option<f64> {
    let (n, i) = match axis {
        Axis::X => (a.nx as isize, ix as isize),
        Axis::Y => (a.ny as isize, iy as isize),
    };
    let mut j = i + offset;
    if a.periodic {
        j = j.rem_euclid(n);
    } else if j < 0 || j >= n {
        return None;
    }
    let j = j as usize;
    Some(match axis {
        Axis::X => a.get(j, iy),
        Axis::Y => a.get(ix, j),
    })
}

/// Forward-difference slopes along `axis`.
pub(crate) fn area_slopes(a: &AreaMap, axis: Axis) -> Vec<f64> {
    let (_, spacing) = a.extent(axis);
    let mut out = Vec::with_capacity(a.nx * a.ny);
    for ix in 0..a.nx {
        for iy in 0..a.ny {
            if let Some(next) = neighbour(a, ix, iy, axis, 1) {
                out.push((next - a.get(ix, iy)) / spacing);
            }
        }
    }
    out
}

#[inline]
fn second_difference(a: &AreaMap, ix: usize, iy: usize, axis: Axis) -> Option<f64> {
    let (n, spacing) = a.extent(axis);
    if n < 3 {
        return None;
    }
    let prev = neighbour(a, ix, iy, axis, -1)?;
    let next = neighbour(a, ix, iy, axis, 1)?;
    Some((next - 2.0 * a.get(ix, iy) + prev) / (spacing * spacing))
}

/// Central second derivative along `axis`.
pub(crate) fn area_second_derivatives(a: &AreaMap, axis: Axis) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.nx * a.ny);
    for ix in 0..a.nx {
        for iy in 0..a.ny {
            if let Some(d2) = second_difference(a, ix, iy, axis) {
                out.push(d2);
            }
        }
    }
    out
}

/// Mean curvature at every point where both stencils are defined.
pub(crate) fn area_mean_curvatures(a: &AreaMap) -> Vec<f64> {
    let mut out = Vec::with_capacity(a.nx * a.ny);
    for ix in 0..a.nx {
        for iy in 0..a.ny {
            let dxx = second_difference(a, ix, iy, Axis::X);
            let dyy = second_difference(a, ix, iy, Axis::Y);
            if let (Some(dxx), Some(dyy)) = (dxx, dyy) {
                out.push((dxx + dyy) / 2.0);
            }
        }
    }
    out
}

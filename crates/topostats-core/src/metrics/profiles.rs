//! Equally spaced profile bundles: the common input of the spectral,
//! correlation and scale-dependent estimators.
use crate::heightfield::{Axis, HeightField, Profile};

/// A set of equally long, equally spaced profiles running along one axis.
pub struct UniformProfiles {
    pub lines: Vec<Vec<f64>>,
    pub spacing: f64,
    pub periodic: bool,
}

impl UniformProfiles {
    /// Points per profile.
    pub fn len(&self) -> usize {
        self.lines.first().map_or(0, |l| l.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bundle along `axis`. A line scan yields a single resampled profile
    /// and only exists along x.
    pub fn along(field: &HeightField, axis: Axis) -> Option<Self> {
        match field {
            HeightField::Profile(p) => (axis == Axis::X).then(|| resample(p)),
            HeightField::Area(a) => {
                let (_, spacing) = a.extent(axis);
                Some(Self {
                    lines: a.lines(axis),
                    spacing,
                    periodic: a.periodic,
                })
            }
        }
    }
}

/// Linear interpolation of a monotonic line scan onto as many equally spaced
/// points as it has samples, spanning its full extent.
fn resample(p: &Profile) -> UniformProfiles {
    let n = p.len();
    let x0 = p.x[0];
    let spacing = p.length() / (n - 1) as f64;
    let mut line = Vec::with_capacity(n);
    let mut seg = 0usize;
    for k in 0..n {
        let xk = if k == n - 1 { p.x[n - 1] } else { x0 + k as f64 * spacing };
        while seg + 2 < n && p.x[seg + 1] < xk {
            seg += 1;
        }
        let (xa, xb) = (p.x[seg], p.x[seg + 1]);
        let t = ((xk - xa) / (xb - xa)).clamp(0.0, 1.0);
        line.push(p.h[seg] + t * (p.h[seg + 1] - p.h[seg]));
    }
    UniformProfiles {
        lines: vec![line],
        spacing,
        periodic: false,
    }
}

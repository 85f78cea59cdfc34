//! Analysis workflows.
//!
//! Every workflow runs either on one topography or on a surface. Surface
//! mode evaluates each member on its own, reports in the finest member unit
//! and skips members that fail instead of aborting the batch.
mod distribution;
mod roughness;
mod spectral;

pub use distribution::{CurvatureDistribution, HeightDistribution, SlopeDistribution};
pub use roughness::RoughnessParameters;
pub use spectral::{
    Autocorrelation, PowerSpectralDensity, ScaleDependentCurvature, ScaleDependentSlope,
    VariableBandwidth,
};

use tracing::warn;

use crate::error::{AnalysisError, Result};
use crate::heightfield::HeightField;
use crate::topography::{Surface, Topography};

pub trait Workflow {
    type Output;

    /// Dotted registry name.
    const NAME: &'static str;

    fn topography_implementation(&self, topography: &dyn Topography) -> Result<Self::Output>;

    fn surface_implementation(&self, surface: &Surface) -> Result<Self::Output>;
}

/// Materialise the heights once and reject reentrant line scans.
pub(crate) fn guarded_heights(topography: &dyn Topography) -> Result<HeightField> {
    let field = topography.heights()?;
    field.check_monotonic()?;
    Ok(field)
}

/// Evaluate `f` on every member, keeping member order.
pub(crate) fn evaluate_members<'s, T, F>(surface: &'s Surface, f: F) -> Vec<(&'s dyn Topography, Result<T>)>
where
    T: Send,
    F: Fn(&dyn Topography) -> Result<T> + Sync,
{
    #[cfg(feature = "threading")]
    {
        use rayon::prelude::*;
        surface
            .topographies
            .par_iter()
            .map(|t| (t.as_ref(), f(t.as_ref())))
            .collect()
    }
    #[cfg(not(feature = "threading"))]
    {
        surface
            .topographies
            .iter()
            .map(|t| (t.as_ref(), f(t.as_ref())))
            .collect()
    }
}

/// Alert recorded for a member that could not be analysed.
pub(crate) fn skip_alert(workflow: &str, member: &dyn Topography, err: &AnalysisError) -> String {
    warn!(workflow, topography = member.name(), error = %err, "skipping surface member");
    format!("Topography '{}' skipped: {}", member.name(), err)
}

/// Multiply every value by `factor`, leaving the vector untouched for 1.
pub(crate) fn rescale(values: &mut [f64], factor: f64) {
    if factor != 1.0 {
        values.iter_mut().for_each(|v| *v *= factor);
    }
}

/// Sort paired samples by x.
pub(crate) fn sort_by_x(x: &mut Vec<f64>, y: &mut Vec<f64>) {
    let mut pairs: Vec<(f64, f64)> = x.iter().copied().zip(y.iter().copied()).collect();
    pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
    let (sx, sy): (Vec<f64>, Vec<f64>) = pairs.into_iter().unzip();
    *x = sx;
    *y = sy;
}

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::topography::{DetrendMode, GridTopography, LineScan, Surface, Topography};
    use crate::units::LengthUnit;

    /// 5×10 grid of size 5×10 nm with `h = −2y`, centre-detrended.
    pub fn linear_in_y() -> GridTopography {
        GridTopography::from_fn("linear", LengthUnit::Nanometre, 5, 10, (5.0, 10.0), |_, iy| {
            -2.0 * iy as f64
        })
        .detrended(DetrendMode::Center)
    }

    /// Line scan revisiting `x = 2`.
    pub fn reentrant_line_scan() -> LineScan {
        LineScan::new(
            "reentrant",
            LengthUnit::Metre,
            vec![0.0, 1.0, 2.0, 2.0, 3.0, 4.0],
            vec![1.0, 1.0, 1.0, 2.0, 2.0, 2.0],
        )
    }

    /// A 113×123 µm map of a sine along x together with a 278-point nm line scan.
    pub fn mixed_surface() -> Surface {
        let (nx, ny) = (113, 123);
        let grid = GridTopography::from_fn("map", LengthUnit::Micrometre, nx, ny, (1.0, 1.0), |ix, _| {
            (ix as f64 * 2.0 * std::f64::consts::PI / (nx as f64 * 0.3)).sin()
        });
        let n = 278;
        let x: Vec<f64> = (0..n).map(|i| i as f64 * 100.0 / n as f64).collect();
        let h = x.iter().map(|x| (x * std::f64::consts::PI / 2.0).cos()).collect();
        let scan = LineScan::new("scan", LengthUnit::Nanometre, x, h);
        let members: Vec<Box<dyn Topography>> = vec![Box::new(grid), Box::new(scan)];
        Surface::new("sample", members)
    }
}

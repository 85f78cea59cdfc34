//! Log-binned curve workflows: PSD, ACF, variable bandwidth and the
//! scale-dependent slope and curvature.
//!
//! Each workflow turns a height field into a handful of raw curves. The raw
//! curves are log-averaged twice, once over their reliable samples and once
//! over all samples, and emitted as a reliable series per curve followed by
//! the `(incl. unreliable data)` variants in the same order.
use std::collections::BTreeMap;

use tracing::debug;

use super::{evaluate_members, guarded_heights, rescale, skip_alert, sort_by_x, Workflow};
use crate::error::Result;
use crate::heightfield::{Axis, HeightField};
use crate::metrics::{
    areal_decomposition, areal_psd, height_difference_acf, log_average, profile_decomposition,
    profile_psd, scale_dependent_curvature, scale_dependent_slope, RawCurve, UniformProfiles,
};
use crate::params::{NoParams, SpectralParams};
use crate::result::{PlotResult, Series};
use crate::topography::{Surface, Topography};
use crate::units::LengthUnit;

const UNRELIABLE_SUFFIX: &str = " (incl. unreliable data)";

/// Axis labels and dimensions of a curve workflow.
pub(crate) struct CurveLayout {
    pub title: &'static str,
    pub xlabel: &'static str,
    pub ylabel: &'static str,
    /// Powers of length carried by x and y.
    pub exponents: (i32, i32),
    /// Curve names in output order.
    pub curves: &'static [&'static str],
}

pub(crate) trait CurveAnalysis: Sync {
    const NAME: &'static str;
    const LAYOUT: CurveLayout;

    /// Raw curves of a field, keyed by their index into `LAYOUT.curves`.
    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)>;

    /// Geometric bins per decade, `None` to keep the raw samples.
    fn points_per_decade(&self) -> Option<usize>;
}

/// One curve after binning, in some unit.
#[derive(Default)]
struct BinnedCurve {
    reliable: (Vec<f64>, Vec<f64>),
    all: (Vec<f64>, Vec<f64>),
}

fn bin(x: Vec<f64>, y: Vec<f64>, points_per_decade: Option<usize>) -> (Vec<f64>, Vec<f64>) {
    match points_per_decade {
        Some(n) => log_average(&x, &y, n),
        None => (x, y),
    }
}

/// Binned curves of one member plus the alerts they raise.
fn member_curves<A: CurveAnalysis>(
    analysis: &A,
    topography: &dyn Topography,
) -> Result<(BTreeMap<usize, BinnedCurve>, Vec<String>)> {
    let field = guarded_heights(topography)?;
    let mut curves = BTreeMap::new();
    let mut alerts = Vec::new();
    for (index, raw) in analysis.curves(&field) {
        let (rx, ry) = raw.reliable_part();
        let binned = BinnedCurve {
            reliable: bin(rx, ry, analysis.points_per_decade()),
            all: bin(raw.x, raw.y, analysis.points_per_decade()),
        };
        if binned.reliable.0.is_empty() {
            alerts.push(format!("{}: no reliable data points", A::LAYOUT.curves[index]));
        }
        curves.insert(index, binned);
    }
    Ok((curves, alerts))
}

fn assemble<A: CurveAnalysis>(unit: LengthUnit, curves: BTreeMap<usize, BinnedCurve>, alerts: Vec<String>) -> PlotResult {
    let layout = A::LAYOUT;
    let (ex, ey) = layout.exponents;
    let mut result = PlotResult::new(
        layout.title,
        (layout.xlabel, layout.ylabel),
        (unit.label(ex), unit.label(ey)),
    )
    .log_log();
    let mut unreliable = Vec::with_capacity(curves.len());
    for (index, curve) in curves {
        let name = layout.curves[index];
        let (rx, ry) = curve.reliable;
        let (ax, ay) = curve.all;
        result.series.push(Series::new(name, rx, ry));
        unreliable.push(Series::new(format!("{name}{UNRELIABLE_SUFFIX}"), ax, ay));
    }
    result.series.extend(unreliable);
    result.alerts = Some(alerts);
    result
}

fn topography_curves<A: CurveAnalysis>(analysis: &A, topography: &dyn Topography) -> Result<PlotResult> {
    debug!(workflow = A::NAME, topography = topography.name(), dim = topography.dim(), "topography analysis");
    let (curves, alerts) = member_curves(analysis, topography)?;
    Ok(assemble::<A>(topography.unit(), curves, alerts))
}

/// Concatenate the members' binned curves in the finest unit. Members keep
/// their own x sampling; nothing is re-averaged across members.
fn surface_curves<A: CurveAnalysis>(analysis: &A, surface: &Surface) -> Result<PlotResult> {
    debug!(workflow = A::NAME, surface = %surface.name, members = surface.topographies.len(), "surface analysis");
    let unit = surface.common_unit()?;
    let (ex, ey) = A::LAYOUT.exponents;
    let mut merged: BTreeMap<usize, BinnedCurve> = BTreeMap::new();
    let mut alerts = Vec::new();

    for (member, outcome) in evaluate_members(surface, |t| member_curves(analysis, t)) {
        let (curves, member_alerts) = match outcome {
            Ok(c) => c,
            Err(err) => {
                alerts.push(skip_alert(A::NAME, member, &err));
                continue;
            }
        };
        alerts.extend(member_alerts.into_iter().map(|a| format!("{}: {a}", member.name())));
        let factor = member.unit().factor_to(unit);
        let (fx, fy) = (factor.powi(ex), factor.powi(ey));
        for (index, mut curve) in curves {
            let target = merged.entry(index).or_default();
            for ((x, y), (tx, ty)) in [
                (&mut curve.reliable, &mut target.reliable),
                (&mut curve.all, &mut target.all),
            ] {
                rescale(x, fx);
                rescale(y, fy);
                tx.append(x);
                ty.append(y);
            }
        }
    }

    for curve in merged.values_mut() {
        sort_by_x(&mut curve.reliable.0, &mut curve.reliable.1);
        sort_by_x(&mut curve.all.0, &mut curve.all.1);
    }
    Ok(assemble::<A>(unit, merged, alerts))
}

/// Bundles along every axis the field has.
fn bundles(field: &HeightField) -> impl Iterator<Item = (Axis, UniformProfiles)> + '_ {
    field
        .axes()
        .iter()
        .filter_map(move |&axis| UniformProfiles::along(field, axis).map(|b| (axis, b)))
}

#[inline]
fn axis_index(axis: Axis) -> usize {
    match axis {
        Axis::X => 0,
        Axis::Y => 1,
    }
}

macro_rules! curve_workflow {
    ($(#[$doc:meta])* $ty:ident, $params:ty, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $ty {
            pub params: $params,
        }

        impl $ty {
            pub fn new(params: $params) -> Self {
                Self { params }
            }
        }

        impl Workflow for $ty {
            type Output = PlotResult;
            const NAME: &'static str = $name;

            fn topography_implementation(&self, topography: &dyn Topography) -> Result<PlotResult> {
                topography_curves(self, topography)
            }

            fn surface_implementation(&self, surface: &Surface) -> Result<PlotResult> {
                surface_curves(self, surface)
            }
        }
    };
}

curve_workflow!(
    /// 1D PSD along each axis and, for maps, the radial `q/π × 2D PSD`.
    PowerSpectralDensity,
    SpectralParams,
    "topostats.power_spectral_density"
);
curve_workflow!(
    /// Height-difference autocorrelation along each axis.
    Autocorrelation,
    SpectralParams,
    "topostats.autocorrelation"
);
curve_workflow!(
    /// RMS height after detrending at successively halved bandwidths.
    VariableBandwidth,
    NoParams,
    "topostats.variable_bandwidth"
);
curve_workflow!(
    ScaleDependentSlope,
    SpectralParams,
    "topostats.scale_dependent_slope"
);
curve_workflow!(
    ScaleDependentCurvature,
    SpectralParams,
    "topostats.scale_dependent_curvature"
);

impl PowerSpectralDensity {
    pub fn with_points_per_decade(nb_points_per_decade: usize) -> Self {
        Self::new(SpectralParams { nb_points_per_decade })
    }
}

impl Autocorrelation {
    pub fn with_points_per_decade(nb_points_per_decade: usize) -> Self {
        Self::new(SpectralParams { nb_points_per_decade })
    }
}

impl CurveAnalysis for PowerSpectralDensity {
    const NAME: &'static str = <Self as Workflow>::NAME;
    const LAYOUT: CurveLayout = CurveLayout {
        title: "Power-spectral density (PSD)",
        xlabel: "Wavevector",
        ylabel: "PSD",
        exponents: (-1, 3),
        curves: &["1D PSD along x", "1D PSD along y", "q/π × 2D PSD"],
    };

    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)> {
        let mut out: Vec<(usize, RawCurve)> = bundles(field)
            .map(|(axis, bundle)| (axis_index(axis), profile_psd(&bundle)))
            .collect();
        if let HeightField::Area(map) = field {
            let mut radial = areal_psd(map);
            for (q, c) in radial.x.iter().zip(radial.y.iter_mut()) {
                *c *= q / std::f64::consts::PI;
            }
            out.push((2, radial));
        }
        out
    }

    fn points_per_decade(&self) -> Option<usize> {
        Some(self.params.nb_points_per_decade)
    }
}

impl CurveAnalysis for Autocorrelation {
    const NAME: &'static str = <Self as Workflow>::NAME;
    const LAYOUT: CurveLayout = CurveLayout {
        title: "Height-difference autocorrelation function (ACF)",
        xlabel: "Distance",
        ylabel: "ACF",
        exponents: (1, 2),
        curves: &["Along x", "Along y"],
    };

    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)> {
        bundles(field)
            .map(|(axis, bundle)| (axis_index(axis), height_difference_acf(&bundle)))
            .collect()
    }

    fn points_per_decade(&self) -> Option<usize> {
        Some(self.params.nb_points_per_decade)
    }
}

impl CurveAnalysis for VariableBandwidth {
    const NAME: &'static str = <Self as Workflow>::NAME;
    const LAYOUT: CurveLayout = CurveLayout {
        title: "Variable-bandwidth analysis",
        xlabel: "Bandwidth",
        ylabel: "RMS height",
        exponents: (1, 1),
        curves: &[
            "Profile decomposition along x",
            "Profile decomposition along y",
            "Areal decomposition",
        ],
    };

    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)> {
        let mut out: Vec<(usize, RawCurve)> = bundles(field)
            .map(|(axis, bundle)| (axis_index(axis), profile_decomposition(&bundle)))
            .collect();
        if let HeightField::Area(map) = field {
            out.push((2, areal_decomposition(map)));
        }
        out
    }

    /// Bandwidths already halve from level to level.
    fn points_per_decade(&self) -> Option<usize> {
        None
    }
}

impl CurveAnalysis for ScaleDependentSlope {
    const NAME: &'static str = <Self as Workflow>::NAME;
    const LAYOUT: CurveLayout = CurveLayout {
        title: "Scale-dependent slope",
        xlabel: "Distance",
        ylabel: "Slope",
        exponents: (1, 0),
        curves: &["Slope in x-direction", "Slope in y-direction"],
    };

    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)> {
        let n = self.params.nb_points_per_decade;
        bundles(field)
            .map(|(axis, bundle)| (axis_index(axis), scale_dependent_slope(&bundle, n)))
            .collect()
    }

    /// Lags are log-spaced already.
    fn points_per_decade(&self) -> Option<usize> {
        None
    }
}

impl CurveAnalysis for ScaleDependentCurvature {
    const NAME: &'static str = <Self as Workflow>::NAME;
    const LAYOUT: CurveLayout = CurveLayout {
        title: "Scale-dependent curvature",
        xlabel: "Distance",
        ylabel: "Curvature",
        exponents: (1, -1),
        curves: &["Curvature in x-direction", "Curvature in y-direction"],
    };

    fn curves(&self, field: &HeightField) -> Vec<(usize, RawCurve)> {
        let n = self.params.nb_points_per_decade;
        bundles(field)
            .map(|(axis, bundle)| (axis_index(axis), scale_dependent_curvature(&bundle, n)))
            .collect()
    }

    fn points_per_decade(&self) -> Option<usize> {
        None
    }
}

//! Height, slope and curvature distributions.
use tracing::debug;

use super::{evaluate_members, guarded_heights, rescale, skip_alert, Workflow};
use crate::error::Result;
use crate::heightfield::{Axis, HeightField};
use crate::metrics::gradient::{area_mean_curvatures, area_slopes, profile_curvatures, profile_slopes};
use crate::metrics::rms::{profile_mean_height, profile_rms_height};
use crate::metrics::{density_histogram, gaussian_pdf, reasonable_bin_count, BinSpec, Moments};
use crate::params::DistributionParams;
use crate::result::{PlotResult, Series};
use crate::topography::{Surface, Topography};
use crate::units::LengthUnit;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quantity {
    Height,
    Slope,
    Curvature,
}

impl Quantity {
    fn label(self) -> &'static str {
        match self {
            Quantity::Height => "Height",
            Quantity::Slope => "Slope",
            Quantity::Curvature => "Curvature",
        }
    }

    /// Power of length the quantity carries.
    fn exponent(self) -> i32 {
        match self {
            Quantity::Height => 1,
            Quantity::Slope => 0,
            Quantity::Curvature => -1,
        }
    }

    fn title(self) -> &'static str {
        match self {
            Quantity::Height => "Height distribution",
            Quantity::Slope => "Slope distribution",
            Quantity::Curvature => "Curvature distribution",
        }
    }
}

/// Samples of one quantity, optionally along one axis, with their summary
/// scalars.
struct Population {
    axis: Option<Axis>,
    samples: Vec<f64>,
    mean: f64,
    rms: f64,
}

impl Population {
    /// Summary scalars from plain sample moments. Heights are reported about
    /// their mean, slopes and curvatures about zero.
    fn pooled(quantity: Quantity, axis: Option<Axis>, samples: Vec<f64>) -> Self {
        let m = Moments::of(&samples);
        let rms = if quantity == Quantity::Height { m.std } else { m.rms };
        Self { axis, samples, mean: m.mean, rms }
    }
}

fn populations(quantity: Quantity, field: &HeightField) -> Vec<Population> {
    match (quantity, field) {
        (Quantity::Height, HeightField::Profile(p)) => vec![Population {
            axis: None,
            samples: p.h.clone(),
            mean: profile_mean_height(&p.x, &p.h),
            rms: profile_rms_height(p),
        }],
        (Quantity::Height, HeightField::Area(a)) => {
            vec![Population::pooled(quantity, None, a.data.clone())]
        }
        (Quantity::Slope, HeightField::Profile(p)) => {
            let slopes = profile_slopes(p).into_iter().map(|(_, s)| s).collect();
            vec![Population::pooled(quantity, Some(Axis::X), slopes)]
        }
        (Quantity::Slope, HeightField::Area(a)) => [Axis::X, Axis::Y]
            .into_iter()
            .map(|axis| Population::pooled(quantity, Some(axis), area_slopes(a, axis)))
            .collect(),
        (Quantity::Curvature, HeightField::Profile(p)) => {
            vec![Population::pooled(quantity, None, profile_curvatures(p))]
        }
        (Quantity::Curvature, HeightField::Area(a)) => {
            vec![Population::pooled(quantity, None, area_mean_curvatures(a))]
        }
    }
}

fn member_populations(quantity: Quantity, topography: &dyn Topography) -> Result<Vec<Population>> {
    let field = if quantity == Quantity::Height {
        topography.heights()?
    } else {
        guarded_heights(topography)?
    };
    Ok(populations(quantity, &field))
}

fn build_result(
    quantity: Quantity,
    unit: LengthUnit,
    populations: &[Population],
    params: &DistributionParams,
) -> Result<PlotResult> {
    let e = quantity.exponent();
    let mut result = PlotResult::new(
        quantity.title(),
        (quantity.label(), "Probability density"),
        (unit.label(e), unit.label(-e)),
    );
    for population in populations {
        let suffix = population
            .axis
            .map(|a| format!(" ({} direction)", a.label()))
            .unwrap_or_default();
        let bins = match &params.bins {
            Some(bins) => bins.clone(),
            None => {
                let n = population.samples.iter().filter(|v| v.is_finite()).count();
                BinSpec::Count(reasonable_bin_count(n))
            }
        };
        let histogram = density_histogram(&population.samples, &bins)?;
        let moments = Moments::of(&population.samples);
        let fit = gaussian_pdf(&histogram.centres, moments.mean, moments.std);

        result.series.push(Series::new(
            format!("{} distribution{suffix}", quantity.label()),
            histogram.centres.clone(),
            histogram.density,
        ));
        result
            .series
            .push(Series::new(format!("Gaussian fit{suffix}"), histogram.centres, fit));
        result.push_scalar(format!("Mean {}{suffix}", quantity.label()), population.mean, unit.label(e));
        result.push_scalar(format!("RMS {}{suffix}", quantity.label()), population.rms, unit.label(e));
    }
    Ok(result)
}

fn topography_distribution(
    workflow: &'static str,
    quantity: Quantity,
    params: &DistributionParams,
    topography: &dyn Topography,
) -> Result<PlotResult> {
    debug!(workflow, topography = topography.name(), dim = topography.dim(), "topography analysis");
    let populations = member_populations(quantity, topography)?;
    build_result(quantity, topography.unit(), &populations, params)
}

/// Pool the members' samples per axis in the common unit.
fn surface_distribution(
    workflow: &'static str,
    quantity: Quantity,
    params: &DistributionParams,
    surface: &Surface,
) -> Result<PlotResult> {
    debug!(workflow, surface = %surface.name, members = surface.topographies.len(), "surface analysis");
    let unit = surface.common_unit()?;
    let mut pooled: Vec<(Option<Axis>, Vec<f64>)> = Vec::new();
    let mut alerts = Vec::new();

    for (member, outcome) in evaluate_members(surface, |t| member_populations(quantity, t)) {
        let populations = match outcome {
            Ok(p) => p,
            Err(err) => {
                alerts.push(skip_alert(workflow, member, &err));
                continue;
            }
        };
        let factor = member.unit().factor_to(unit).powi(quantity.exponent());
        for mut population in populations {
            rescale(&mut population.samples, factor);
            match pooled.iter_mut().find(|(axis, _)| *axis == population.axis) {
                Some((_, samples)) => samples.extend(population.samples),
                None => pooled.push((population.axis, population.samples)),
            }
        }
    }

    if pooled.is_empty() {
        // No member survived; keep the result shape with NaN entries.
        let axis = (quantity == Quantity::Slope).then_some(Axis::X);
        pooled.push((axis, Vec::new()));
    }
    let populations: Vec<Population> = pooled
        .into_iter()
        .map(|(axis, samples)| Population::pooled(quantity, axis, samples))
        .collect();
    let mut result = build_result(quantity, unit, &populations, params)?;
    result.alerts = Some(alerts);
    Ok(result)
}

macro_rules! distribution_workflow {
    ($(#[$doc:meta])* $ty:ident, $quantity:expr, $name:literal) => {
        $(#[$doc])*
        #[derive(Debug, Clone, Default)]
        pub struct $ty {
            pub params: DistributionParams,
        }

        impl $ty {
            pub fn new(params: DistributionParams) -> Self {
                Self { params }
            }

            pub fn with_bins(bins: BinSpec) -> Self {
                Self::new(DistributionParams { bins: Some(bins) })
            }
        }

        impl Workflow for $ty {
            type Output = PlotResult;
            const NAME: &'static str = $name;

            fn topography_implementation(&self, topography: &dyn Topography) -> Result<PlotResult> {
                topography_distribution(Self::NAME, $quantity, &self.params, topography)
            }

            fn surface_implementation(&self, surface: &Surface) -> Result<PlotResult> {
                surface_distribution(Self::NAME, $quantity, &self.params, surface)
            }
        }
    };
}

distribution_workflow!(
    /// Histogram of heights. Line scans report integral mean and RMS.
    HeightDistribution,
    Quantity::Height,
    "topostats.height_distribution"
);
distribution_workflow!(
    /// Histogram of slopes per direction.
    SlopeDistribution,
    Quantity::Slope,
    "topostats.slope_distribution"
);
distribution_workflow!(
    /// Histogram of (mean) curvatures.
    CurvatureDistribution,
    Quantity::Curvature,
    "topostats.curvature_distribution"
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topography::{DetrendMode, GridTopography, LineScan};
    use crate::workflows::fixtures;
    use approx::assert_abs_diff_eq;

    fn assert_all_close(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert_abs_diff_eq!(*a, *e, epsilon = 1e-7);
        }
    }

    fn keys(result: &PlotResult) -> Vec<String> {
        let value = serde_json::to_value(result).unwrap();
        let mut keys: Vec<String> = value.as_object().unwrap().keys().cloned().collect();
        keys.sort();
        keys
    }

    const DIST_KEYS: [&str; 7] = ["name", "scalars", "series", "xlabel", "xunit", "ylabel", "yunit"];

    #[test]
    fn height_distribution_of_line_scan() {
        let t = LineScan::new("p", LengthUnit::Nanometre, vec![1.0, 2.0, 3.0], vec![2.0, 4.0, 6.0])
            .detrended(DetrendMode::Center);
        let r = HeightDistribution::default().topography_implementation(&t).unwrap();
        assert_eq!(keys(&r), DIST_KEYS);
        assert_eq!(r.name, "Height distribution");
        assert_eq!((r.xlabel.as_str(), r.ylabel.as_str()), ("Height", "Probability density"));
        assert_eq!((r.xunit.as_str(), r.yunit.as_str()), ("nm", "nm⁻¹"));
        assert_abs_diff_eq!(r.scalar("Mean Height").unwrap().value, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.scalar("RMS Height").unwrap().value, (4.0f64 / 3.0).sqrt(), epsilon = 1e-12);
        assert_eq!(r.scalar("RMS Height").unwrap().unit, "nm");
        assert_eq!(r.series.len(), 2);
        assert_all_close(&r.series[0].x, &[-1.0, 1.0]);
        assert_all_close(&r.series[0].y, &[1.0 / 6.0, 2.0 / 6.0]);
        assert_eq!(r.series[1].name, "Gaussian fit");
    }

    #[test]
    fn slope_distribution_of_line_scan() {
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let h = x.iter().map(|x| -2.0 * x).collect();
        let t = LineScan::new("p", LengthUnit::Metre, x, h).detrended(DetrendMode::Center);
        let r = SlopeDistribution::with_bins(BinSpec::Count(3)).topography_implementation(&t).unwrap();
        assert_eq!(keys(&r), DIST_KEYS);
        assert_eq!(r.scalar("Mean Slope (x direction)").unwrap().value, -2.0);
        assert_eq!(r.scalar("RMS Slope (x direction)").unwrap().value, 2.0);
        assert_eq!(r.scalar("RMS Slope (x direction)").unwrap().unit, "1");
        assert_eq!((r.xunit.as_str(), r.yunit.as_str()), ("1", "1"));
        assert_eq!(r.series.len(), 2);
        assert_all_close(&r.series[0].x, &[-2.0 - 1.0 / 1500.0, -2.0, -2.0 + 1.0 / 1500.0]);
        assert_all_close(&r.series[0].y, &[0.0, 1500.0, 0.0]);
    }

    #[test]
    fn curvature_distribution_of_parabolic_line_scan() {
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let h = x.iter().map(|x| -2.0 * x * x).collect();
        let t = LineScan::new("p", LengthUnit::Nanometre, x, h).detrended(DetrendMode::Center);
        let edges = vec![-4.75, -4.25, -3.75, -3.25];
        let r = CurvatureDistribution::with_bins(BinSpec::Edges(edges))
            .topography_implementation(&t)
            .unwrap();
        assert_abs_diff_eq!(r.scalar("Mean Curvature").unwrap().value, -4.0, epsilon = 1e-9);
        assert_abs_diff_eq!(r.scalar("RMS Curvature").unwrap().value, 4.0, epsilon = 1e-9);
        assert_eq!(r.scalar("Mean Curvature").unwrap().unit, "nm⁻¹");
        assert_eq!((r.xunit.as_str(), r.yunit.as_str()), ("nm⁻¹", "nm"));
        assert_all_close(&r.series[0].x, &[-4.5, -4.0, -3.5]);
        assert_all_close(&r.series[0].y, &[0.0, 2.0, 0.0]);
    }

    #[test]
    fn height_distribution_of_linear_map() {
        let t = fixtures::linear_in_y();
        let r = HeightDistribution::with_bins(BinSpec::Count(10)).topography_implementation(&t).unwrap();
        assert_abs_diff_eq!(r.scalar("Mean Height").unwrap().value, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.scalar("RMS Height").unwrap().value, 33f64.sqrt(), epsilon = 1e-12);
        assert_eq!(r.series[0].name, "Height distribution");
        assert_all_close(&r.series[0].x, &[-8.1, -6.3, -4.5, -2.7, -0.9, 0.9, 2.7, 4.5, 6.3, 8.1]);
        assert_all_close(&r.series[0].y, &[1.0 / 18.0; 10]);
        assert_eq!(r.series[1].name, "Gaussian fit");
    }

    #[test]
    fn slope_distribution_of_linear_map() {
        let t = fixtures::linear_in_y();
        let r = SlopeDistribution::with_bins(BinSpec::Count(3)).topography_implementation(&t).unwrap();
        assert_abs_diff_eq!(r.scalar("Mean Slope (x direction)").unwrap().value, 0.0);
        assert_abs_diff_eq!(r.scalar("Mean Slope (y direction)").unwrap().value, -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.scalar("RMS Slope (x direction)").unwrap().value, 0.0);
        assert_abs_diff_eq!(r.scalar("RMS Slope (y direction)").unwrap().value, 2.0, epsilon = 1e-12);
        let names: Vec<&str> = r.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "Slope distribution (x direction)",
                "Gaussian fit (x direction)",
                "Slope distribution (y direction)",
                "Gaussian fit (y direction)",
            ]
        );
        assert_all_close(&r.series[0].x, &[-1.0 / 1500.0, 0.0, 1.0 / 1500.0]);
        assert_all_close(&r.series[0].y, &[0.0, 1500.0, 0.0]);
        assert_all_close(&r.series[2].x, &[-2.0 - 1.0 / 1500.0, -2.0, -2.0 + 1.0 / 1500.0]);
        assert_all_close(&r.series[2].y, &[0.0, 1500.0, 0.0]);
        // Zero spread: the fit is undefined rather than an error.
        assert!(r.series[1].y.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn curvature_distribution_of_linear_map_is_flat() {
        let t = fixtures::linear_in_y();
        let r = CurvatureDistribution::with_bins(BinSpec::Count(3)).topography_implementation(&t).unwrap();
        assert_abs_diff_eq!(r.scalar("Mean Curvature").unwrap().value, 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(r.scalar("RMS Curvature").unwrap().value, 0.0, epsilon = 1e-12);
        assert_all_close(&r.series[0].x, &[-1.0 / 1500.0, 0.0, 1.0 / 1500.0]);
        assert_all_close(&r.series[0].y, &[0.0, 1500.0, 0.0]);
    }

    #[test]
    fn periodic_sinusoid_has_zero_mean_curvature() {
        let t = GridTopography::from_fn("sine", LengthUnit::Nanometre, 100, 100, (100.0, 100.0), |_, iy| {
            (iy as f64 / 2.0 / std::f64::consts::PI).sin()
        })
        .periodic(true)
        .detrended(DetrendMode::Center);
        let r = CurvatureDistribution::with_bins(BinSpec::Count(3)).topography_implementation(&t).unwrap();
        assert_abs_diff_eq!(r.scalar("Mean Curvature").unwrap().value, 0.0, epsilon = 1e-12);
        assert_eq!(r.scalar("Mean Curvature").unwrap().unit, "nm⁻¹");
    }

    #[test]
    fn densities_integrate_to_one() {
        let t = fixtures::mixed_surface();
        let r = HeightDistribution::default().topography_implementation(t.topographies[0].as_ref()).unwrap();
        let s = &r.series[0];
        let width = s.x[1] - s.x[0];
        let integral: f64 = s.y.iter().map(|d| d * width).sum();
        assert_abs_diff_eq!(integral, 1.0, epsilon = 1e-9);
    }

    #[test]
    fn surface_pools_samples_in_finest_unit() {
        let coarse = LineScan::new("coarse", LengthUnit::Micrometre, vec![0.0, 1.0, 2.0], vec![0.0, 1.0, 2.0]);
        let fine = LineScan::new("fine", LengthUnit::Nanometre, vec![0.0, 1.0, 2.0], vec![0.0, 3.0, 6.0]);
        let members: Vec<Box<dyn Topography>> = vec![Box::new(coarse), Box::new(fine)];
        let surface = Surface::new("s", members);
        let r = SlopeDistribution::default().surface_implementation(&surface).unwrap();
        // Slopes are dimensionless: 1 from the µm scan, 3 from the nm scan.
        assert_abs_diff_eq!(r.scalar("Mean Slope (x direction)").unwrap().value, 2.0, epsilon = 1e-12);
        assert_eq!(r.alerts.as_deref(), Some(&[][..]));

        let r = HeightDistribution::default().surface_implementation(&surface).unwrap();
        assert_eq!(r.xunit, "nm");
        // Heights 0, 1000, 2000 nm and 0, 3, 6 nm.
        let mean = (3000.0 + 9.0) / 6.0;
        assert_abs_diff_eq!(r.scalar("Mean Height").unwrap().value, mean, epsilon = 1e-9);
    }

    #[test]
    fn surface_without_usable_members_keeps_result_shape() {
        let members: Vec<Box<dyn Topography>> = vec![Box::new(fixtures::reentrant_line_scan())];
        let surface = Surface::new("s", members);
        let r = SlopeDistribution::default().surface_implementation(&surface).unwrap();
        assert_eq!(keys(&r), ["alerts", "name", "scalars", "series", "xlabel", "xunit", "ylabel", "yunit"]);
        let names: Vec<&str> = r.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Slope distribution (x direction)", "Gaussian fit (x direction)"]);
        assert!(r.scalar("Mean Slope (x direction)").unwrap().value.is_nan());
        assert!(r.scalar("RMS Slope (x direction)").unwrap().value.is_nan());
        assert_eq!(r.alerts.as_ref().map(Vec::len), Some(1));

        let r = CurvatureDistribution::default().surface_implementation(&surface).unwrap();
        let names: Vec<&str> = r.series.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["Curvature distribution", "Gaussian fit"]);
        assert!(r.scalar("Mean Curvature").unwrap().value.is_nan());
    }

    #[test]
    fn surface_skips_reentrant_members_with_alert() {
        let members: Vec<Box<dyn Topography>> =
            vec![Box::new(fixtures::reentrant_line_scan()), Box::new(fixtures::linear_in_y())];
        let surface = Surface::new("s", members);
        let r = SlopeDistribution::default().surface_implementation(&surface).unwrap();
        let alerts = r.alerts.unwrap();
        assert_eq!(alerts.len(), 1);
        assert!(alerts[0].starts_with("Topography 'reentrant' skipped:"), "{}", alerts[0]);
        assert_eq!(r.series.len(), 4);
    }
}

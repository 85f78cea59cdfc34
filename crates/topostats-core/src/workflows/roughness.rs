//! The roughness-parameter table.
//!
//! Row order is part of the output contract: quantity first, then the
//! representation, then the direction.
use tracing::debug;

use super::{guarded_heights, Workflow};
use crate::error::{AnalysisError, Result};
use crate::heightfield::{AreaMap, Axis, HeightField, Profile};
use crate::metrics::rms::{
    area_bandwidth, area_rms_curvature, area_rms_height, profile_bandwidth, profile_rms_curvature,
    profile_rms_height, profile_rms_slope, rms_curvature_along, rms_gradient, rms_height_along,
    rms_slope_along,
};
use crate::result::{Representation, RoughnessParameterRow};
use crate::topography::{Surface, Topography};
use crate::units::LengthUnit;

const RMS_HEIGHT: &str = "RMS height";
const RMS_CURVATURE: &str = "RMS curvature";
const RMS_SLOPE: &str = "RMS slope";
const RMS_GRADIENT: &str = "RMS gradient";
const BANDWIDTH_LOWER: &str = "Bandwidth: lower bound";
const BANDWIDTH_UPPER: &str = "Bandwidth: upper bound";

/// Profile and areal RMS parameters of a single topography.
#[derive(Debug, Clone, Default)]
pub struct RoughnessParameters;

struct Table {
    unit: LengthUnit,
    rows: Vec<RoughnessParameterRow>,
}

impl Table {
    fn row(
        &mut self,
        quantity: &str,
        direction: Option<Axis>,
        from: Representation,
        symbol: &str,
        value: f64,
        exponent: i32,
    ) {
        self.rows.push(RoughnessParameterRow {
            quantity: quantity.to_string(),
            direction,
            from,
            symbol: symbol.to_string(),
            value,
            unit: self.unit.label(exponent),
        });
    }

    fn profile(&mut self, p: &Profile) {
        use Representation::Profile as P;
        let x = Some(Axis::X);
        self.row(RMS_HEIGHT, x, P, "Rq", profile_rms_height(p), 1);
        self.row(RMS_CURVATURE, x, P, "", profile_rms_curvature(p), -1);
        self.row(RMS_SLOPE, x, P, "R&Delta;q", profile_rms_slope(p), 0);
        let (lower, upper) = profile_bandwidth(p);
        self.row(BANDWIDTH_LOWER, None, P, "", lower, 1);
        self.row(BANDWIDTH_UPPER, None, P, "", upper, 1);
    }

    fn area(&mut self, a: &AreaMap) {
        use Representation::{Area, Profile as P};
        let axes = [Axis::X, Axis::Y];
        for axis in axes {
            self.row(RMS_HEIGHT, Some(axis), P, "Rq", rms_height_along(a, axis), 1);
        }
        self.row(RMS_HEIGHT, None, Area, "Sq", area_rms_height(a), 1);
        for axis in axes {
            self.row(RMS_CURVATURE, Some(axis), P, "", rms_curvature_along(a, axis), -1);
        }
        self.row(RMS_CURVATURE, None, Area, "", area_rms_curvature(a), -1);
        for axis in axes {
            self.row(RMS_SLOPE, Some(axis), P, "R&Delta;q", rms_slope_along(a, axis), 0);
        }
        self.row(RMS_GRADIENT, None, Area, "", rms_gradient(a), 0);
        let (lower, upper) = area_bandwidth(a);
        self.row(BANDWIDTH_LOWER, None, Area, "", lower, 1);
        self.row(BANDWIDTH_UPPER, None, Area, "", upper, 1);
    }
}

impl Workflow for RoughnessParameters {
    type Output = Vec<RoughnessParameterRow>;
    const NAME: &'static str = "topostats.roughness_parameters";

    fn topography_implementation(&self, topography: &dyn Topography) -> Result<Self::Output> {
        debug!(workflow = Self::NAME, topography = topography.name(), dim = topography.dim(), "topography analysis");
        let field = guarded_heights(topography)?;
        let mut table = Table { unit: topography.unit(), rows: Vec::with_capacity(11) };
        match &field {
            HeightField::Profile(p) => table.profile(p),
            HeightField::Area(a) => table.area(a),
        }
        Ok(table.rows)
    }

    fn surface_implementation(&self, _surface: &Surface) -> Result<Self::Output> {
        Err(AnalysisError::UnsupportedSubject {
            workflow: Self::NAME,
            reason: "roughness parameters are tabulated per topography",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topography::LineScan;
    use crate::workflows::fixtures;
    use approx::assert_abs_diff_eq;

    #[test]
    fn table_of_linear_map() {
        let rows = RoughnessParameters.topography_implementation(&fixtures::linear_in_y()).unwrap();
        let expected: [(&str, Option<Axis>, Representation, &str, f64, &str); 11] = [
            ("RMS height", Some(Axis::X), Representation::Profile, "Rq", 0.0, "nm"),
            ("RMS height", Some(Axis::Y), Representation::Profile, "Rq", 33f64.sqrt(), "nm"),
            ("RMS height", None, Representation::Area, "Sq", 33f64.sqrt(), "nm"),
            ("RMS curvature", Some(Axis::X), Representation::Profile, "", 0.0, "nm⁻¹"),
            ("RMS curvature", Some(Axis::Y), Representation::Profile, "", 0.0, "nm⁻¹"),
            ("RMS curvature", None, Representation::Area, "", 0.0, "nm⁻¹"),
            ("RMS slope", Some(Axis::X), Representation::Profile, "R&Delta;q", 0.0, "1"),
            ("RMS slope", Some(Axis::Y), Representation::Profile, "R&Delta;q", 2.0, "1"),
            ("RMS gradient", None, Representation::Area, "", 2.0, "1"),
            ("Bandwidth: lower bound", None, Representation::Area, "", 1.0, "nm"),
            ("Bandwidth: upper bound", None, Representation::Area, "", 7.5, "nm"),
        ];
        assert_eq!(rows.len(), expected.len());
        for (row, (quantity, direction, from, symbol, value, unit)) in rows.iter().zip(expected) {
            assert_eq!(row.quantity, quantity);
            assert_eq!(row.direction, direction, "{quantity}");
            assert_eq!(row.from, from, "{quantity}");
            assert_eq!(row.symbol, symbol, "{quantity}");
            assert_eq!(row.unit, unit, "{quantity}");
            assert_abs_diff_eq!(row.value, value, epsilon = 1e-12);
        }
    }

    #[test]
    fn table_of_line_scan() {
        let x = vec![0.0, 1.0, 3.0, 4.0];
        let h = x.iter().map(|x| 0.5 * x).collect();
        let scan = LineScan::new("p", LengthUnit::Micrometre, x, h);
        let rows = RoughnessParameters.topography_implementation(&scan).unwrap();
        let quantities: Vec<&str> = rows.iter().map(|r| r.quantity.as_str()).collect();
        assert_eq!(
            quantities,
            ["RMS height", "RMS curvature", "RMS slope", "Bandwidth: lower bound", "Bandwidth: upper bound"]
        );
        assert!(rows.iter().all(|r| r.from == Representation::Profile));
        assert_abs_diff_eq!(rows[2].value, 0.5, epsilon = 1e-12);
        assert_eq!(rows[2].unit, "1");
        assert_eq!((rows[3].value, rows[4].value), (1.0, 4.0));
        assert_eq!(rows[4].unit, "µm");
    }

    #[test]
    fn reentrant_scan_is_rejected() {
        let err = RoughnessParameters
            .topography_implementation(&fixtures::reentrant_line_scan())
            .unwrap_err();
        assert!(err.is_reentrant());
    }

    #[test]
    fn surfaces_are_not_supported() {
        let surface = Surface::new("s", Vec::new());
        assert!(matches!(
            RoughnessParameters.surface_implementation(&surface),
            Err(AnalysisError::UnsupportedSubject { .. })
        ));
    }
}

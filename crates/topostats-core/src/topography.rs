//! The accessor seam between workflows and whatever stores the measurements.
//!
//! Workflows see a measurement only through [`Topography`]. The in-memory
//! adapters here ([`LineScan`], [`GridTopography`]) detrend on
//! materialisation, so a workflow always receives heights that are already
//! consistent with the caller's detrend choice.
use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};
use crate::heightfield::{AreaMap, HeightField, Profile};
use crate::metrics::detrend::{nonuniform_line_residuals, plane_residuals};
use crate::metrics::rms::profile_mean_height;
use crate::units::LengthUnit;

/// Capabilities a workflow needs from a measurement.
///
/// `heights()` may be expensive; workflows call it once per invocation.
pub trait Topography: Send + Sync {
    fn name(&self) -> &str;
    fn unit(&self) -> LengthUnit;
    /// 1 for line scans, 2 for areal maps.
    fn dim(&self) -> usize;
    fn is_periodic(&self) -> bool;
    /// Physical extent along x and, for areal maps, along y.
    fn physical_size(&self) -> (f64, Option<f64>);
    /// Materialise the detrended height data.
    fn heights(&self) -> Result<HeightField>;
}

/// How the adapter removes the trend before handing data to a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetrendMode {
    #[default]
    None,
    /// Subtract the mean height.
    Center,
    /// Subtract the least-squares line (profiles) or plane (maps).
    Height,
}

/// An in-memory line scan with nonuniform positions.
#[derive(Debug, Clone)]
pub struct LineScan {
    pub name: String,
    pub unit: LengthUnit,
    pub x: Vec<f64>,
    pub h: Vec<f64>,
    pub detrend: DetrendMode,
}

impl LineScan {
    pub fn new(name: impl Into<String>, unit: LengthUnit, x: Vec<f64>, h: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            unit,
            x,
            h,
            detrend: DetrendMode::None,
        }
    }

    pub fn detrended(mut self, mode: DetrendMode) -> Self {
        self.detrend = mode;
        self
    }
}

impl Topography for LineScan {
    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> LengthUnit {
        self.unit
    }

    fn dim(&self) -> usize {
        1
    }

    fn is_periodic(&self) -> bool {
        false
    }

    fn physical_size(&self) -> (f64, Option<f64>) {
        match (self.x.first(), self.x.last()) {
            (Some(a), Some(b)) => (b - a, None),
            _ => (0.0, None),
        }
    }

    fn heights(&self) -> Result<HeightField> {
        let h = match self.detrend {
            DetrendMode::None => self.h.clone(),
            DetrendMode::Center => {
                let mean = profile_mean_height(&self.x, &self.h);
                self.h.iter().map(|v| v - mean).collect()
            }
            DetrendMode::Height => nonuniform_line_residuals(&self.x, &self.h),
        };
        Ok(HeightField::Profile(Profile::new(self.x.clone(), h)?))
    }
}

/// An in-memory uniform areal map, `data[ix * ny + iy]`.
#[derive(Debug, Clone)]
pub struct GridTopography {
    pub name: String,
    pub unit: LengthUnit,
    pub nx: usize,
    pub ny: usize,
    pub data: Vec<f64>,
    pub size: (f64, f64),
    pub periodic: bool,
    pub detrend: DetrendMode,
}

impl GridTopography {
    pub fn new(
        name: impl Into<String>,
        unit: LengthUnit,
        nx: usize,
        ny: usize,
        data: Vec<f64>,
        size: (f64, f64),
    ) -> Self {
        Self {
            name: name.into(),
            unit,
            nx,
            ny,
            data,
            size,
            periodic: false,
            detrend: DetrendMode::None,
        }
    }

    /// Build from a closure evaluated at every grid index `(ix, iy)`.
    pub fn from_fn<F: Fn(usize, usize) -> f64>(
        name: impl Into<String>,
        unit: LengthUnit,
        nx: usize,
        ny: usize,
        size: (f64, f64),
        f: F,
    ) -> Self {
        let mut data = Vec::with_capacity(nx * ny);
        for ix in 0..nx {
            for iy in 0..ny {
                data.push(f(ix, iy));
            }
        }
        Self::new(name, unit, nx, ny, data, size)
    }

    pub fn periodic(mut self, periodic: bool) -> Self {
        self.periodic = periodic;
        self
    }

    pub fn detrended(mut self, mode: DetrendMode) -> Self {
        self.detrend = mode;
        self
    }
}

impl Topography for GridTopography {
    fn name(&self) -> &str {
        &self.name
    }

    fn unit(&self) -> LengthUnit {
        self.unit
    }

    fn dim(&self) -> usize {
        2
    }

    fn is_periodic(&self) -> bool {
        self.periodic
    }

    fn physical_size(&self) -> (f64, Option<f64>) {
        (self.size.0, Some(self.size.1))
    }

    fn heights(&self) -> Result<HeightField> {
        let data = match self.detrend {
            DetrendMode::None => self.data.clone(),
            DetrendMode::Center => {
                let mean = self.data.iter().sum::<f64>() / self.data.len().max(1) as f64;
                self.data.iter().map(|v| v - mean).collect()
            }
            DetrendMode::Height => {
                if self.data.len() != self.nx * self.ny {
                    // Let AreaMap::new report the mismatch.
                    self.data.clone()
                } else {
                    plane_residuals(&self.data, self.nx, self.ny)
                }
            }
        };
        let map = AreaMap::new(data, self.nx, self.ny, self.size.0, self.size.1, self.periodic)?;
        Ok(HeightField::Area(map))
    }
}

/// A named collection of related measurements.
pub struct Surface {
    pub name: String,
    pub topographies: Vec<Box<dyn Topography>>,
}

impl Surface {
    pub fn new(name: impl Into<String>, topographies: Vec<Box<dyn Topography>>) -> Self {
        Self {
            name: name.into(),
            topographies,
        }
    }

    /// Finest unit among the members; results are reported in it.
    pub fn common_unit(&self) -> Result<LengthUnit> {
        LengthUnit::finest(self.topographies.iter().map(|t| t.unit()))
            .ok_or_else(|| AnalysisError::EmptySurface(self.name.clone()))
    }
}

// ── Document forms ────────────────────────────────────────────────────────────

/// Serialised form of a single measurement.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TopographyData {
    LineScan {
        name: String,
        unit: LengthUnit,
        x: Vec<f64>,
        heights: Vec<f64>,
        #[serde(default)]
        detrend: DetrendMode,
    },
    Grid {
        name: String,
        unit: LengthUnit,
        /// Rows are indexed by x, columns by y.
        heights: Vec<Vec<f64>>,
        size: (f64, f64),
        #[serde(default)]
        periodic: bool,
        #[serde(default)]
        detrend: DetrendMode,
    },
}

impl TopographyData {
    pub fn into_topography(self) -> Result<Box<dyn Topography>> {
        match self {
            TopographyData::LineScan { name, unit, x, heights, detrend } => {
                Ok(Box::new(LineScan::new(name, unit, x, heights).detrended(detrend)))
            }
            TopographyData::Grid { name, unit, heights, size, periodic, detrend } => {
                let nx = heights.len();
                let ny = heights.first().map_or(0, |row| row.len());
                if heights.iter().any(|row| row.len() != ny) {
                    return Err(AnalysisError::MalformedInput(format!(
                        "grid '{name}' has rows of unequal length"
                    )));
                }
                let data = heights.into_iter().flatten().collect();
                Ok(Box::new(
                    GridTopography::new(name, unit, nx, ny, data, size)
                        .periodic(periodic)
                        .detrended(detrend),
                ))
            }
        }
    }
}

/// Serialised form of a surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurfaceData {
    pub name: String,
    pub topographies: Vec<TopographyData>,
}

impl SurfaceData {
    pub fn into_surface(self) -> Result<Surface> {
        let topographies = self
            .topographies
            .into_iter()
            .map(TopographyData::into_topography)
            .collect::<Result<Vec<_>>>()?;
        Ok(Surface::new(self.name, topographies))
    }
}

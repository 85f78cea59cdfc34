use serde::{Deserialize, Serialize};

use crate::error::{AnalysisError, Result};

/// Direction of a profile within a height field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "x",
            Axis::Y => "y",
        }
    }
}

/// A 1D line scan with (possibly) nonuniform sampling positions.
/// Heights are linearly interpolated between positions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub x: Vec<f64>,
    pub h: Vec<f64>,
}

impl Profile {
    pub fn new(x: Vec<f64>, h: Vec<f64>) -> Result<Self> {
        if x.len() != h.len() {
            return Err(AnalysisError::MalformedInput(format!(
                "{} positions but {} heights",
                x.len(),
                h.len()
            )));
        }
        if x.len() < 2 {
            return Err(AnalysisError::MalformedInput(
                "a line scan needs at least two points".into(),
            ));
        }
        Ok(Self { x, h })
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// Distance between first and last position.
    pub fn length(&self) -> f64 {
        match (self.x.first(), self.x.last()) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    /// Index of the first position that does not strictly exceed its
    /// predecessor, if any.
    pub fn first_reentrant_index(&self) -> Option<usize> {
        self.x.windows(2).position(|w| w[1] <= w[0]).map(|i| i + 1)
    }

    /// Smallest distance between consecutive positions.
    pub fn shortest_interval(&self) -> f64 {
        self.x
            .windows(2)
            .map(|w| w[1] - w[0])
            .fold(f64::INFINITY, f64::min)
    }
}

/// A uniform 2D grid. `data[ix * ny + iy]` is the height at
/// `(ix * sx / nx, iy * sy / ny)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AreaMap {
    pub data: Vec<f64>,
    pub nx: usize,
    pub ny: usize,
    /// Physical extent along x.
    pub sx: f64,
    /// Physical extent along y.
    pub sy: f64,
    pub periodic: bool,
}

impl AreaMap {
    pub fn new(
        data: Vec<f64>,
        nx: usize,
        ny: usize,
        sx: f64,
        sy: f64,
        periodic: bool,
    ) -> Result<Self> {
        if nx == 0 || ny == 0 || data.len() != nx * ny {
            return Err(AnalysisError::MalformedInput(format!(
                "grid of {nx}×{ny} points cannot hold {} heights",
                data.len()
            )));
        }
        if !(sx > 0.0 && sy > 0.0) {
            return Err(AnalysisError::MalformedInput(format!(
                "physical size must be positive, got ({sx}, {sy})"
            )));
        }
        Ok(Self { data, nx, ny, sx, sy, periodic })
    }

    /// Create a grid filled with a constant height.
    pub fn filled(nx: usize, ny: usize, sx: f64, sy: f64, fill: f64) -> Self {
        Self {
            data: vec![fill; nx * ny],
            nx,
            ny,
            sx,
            sy,
            periodic: false,
        }
    }

    #[inline]
    pub fn get(&self, ix: usize, iy: usize) -> f64 {
        self.data[ix * self.ny + iy]
    }

    #[inline]
    pub fn set(&mut self, ix: usize, iy: usize, val: f64) {
        self.data[ix * self.ny + iy] = val;
    }

    /// Grid spacing `(px, py)`.
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.sx / self.nx as f64, self.sy / self.ny as f64)
    }

    /// Number of points and spacing along an axis.
    pub fn extent(&self, axis: Axis) -> (usize, f64) {
        let (px, py) = self.pixel_size();
        match axis {
            Axis::X => (self.nx, px),
            Axis::Y => (self.ny, py),
        }
    }

    /// All lines running along `axis`, each as an owned vector.
    pub fn lines(&self, axis: Axis) -> Vec<Vec<f64>> {
        match axis {
            Axis::X => (0..self.ny)
                .map(|iy| (0..self.nx).map(|ix| self.get(ix, iy)).collect())
                .collect(),
            Axis::Y => self.data.chunks(self.ny).map(|c| c.to_vec()).collect(),
        }
    }
}

/// Snapshot of the height data of one topography, already detrended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum HeightField {
    Profile(Profile),
    Area(AreaMap),
}

impl HeightField {
    pub fn dim(&self) -> usize {
        match self {
            HeightField::Profile(_) => 1,
            HeightField::Area(_) => 2,
        }
    }

    pub fn is_periodic(&self) -> bool {
        match self {
            HeightField::Profile(_) => false,
            HeightField::Area(a) => a.periodic,
        }
    }

    /// Axes along which profiles exist.
    pub fn axes(&self) -> &'static [Axis] {
        match self {
            HeightField::Profile(_) => &[Axis::X],
            HeightField::Area(_) => &[Axis::X, Axis::Y],
        }
    }

    /// Raw heights in storage order.
    pub fn heights(&self) -> &[f64] {
        match self {
            HeightField::Profile(p) => &p.h,
            HeightField::Area(a) => &a.data,
        }
    }

    /// Reject line scans whose positions are not strictly increasing.
    ///
    /// Derivatives, spectra and correlation functions all assume a
    /// single-valued height per position. Grids always pass.
    pub fn check_monotonic(&self) -> Result<()> {
        if let HeightField::Profile(p) = self {
            if let Some(index) = p.first_reentrant_index() {
                return Err(AnalysisError::ReentrantData {
                    index,
                    position: p.x[index],
                });
            }
        }
        Ok(())
    }
}

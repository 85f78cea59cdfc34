//! Statistical analysis of surface topography.
//!
//! Height, slope and curvature distributions, power spectra, height
//! difference autocorrelation, variable bandwidth analysis, scale-dependent
//! derivatives and tabulated roughness parameters, computed for single line
//! scans or maps and for surfaces that group several of them.
pub mod encoding;
pub mod error;
pub mod heightfield;
pub mod metrics;
pub mod params;
pub mod registry;
pub mod result;
pub mod topography;
pub mod units;
pub mod workflows;

pub use error::{AnalysisError, Result};
pub use registry::{AnalysisRunner, Registry, WorkflowDescriptor};
pub use result::{PlotResult, RoughnessParameterRow, WorkflowOutput};
pub use topography::{Surface, SurfaceData, Topography, TopographyData};
pub use units::LengthUnit;
pub use workflows::Workflow;

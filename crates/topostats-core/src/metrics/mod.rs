pub mod acf;
pub mod bandwidth;
pub mod binning;
pub(crate) mod detrend;
pub mod distribution;
pub(crate) mod gradient;
pub mod profiles;
pub mod psd;
pub mod rms;
pub mod scale_dependent;

pub use acf::height_difference_acf;
pub use bandwidth::{areal_decomposition, profile_decomposition};
pub use binning::{log_average, log_spaced_lags};
pub use distribution::{density_histogram, gaussian_pdf, reasonable_bin_count, BinSpec, Histogram, Moments};
pub use profiles::UniformProfiles;
pub use psd::{areal_psd, profile_psd};
pub use scale_dependent::{scale_dependent_curvature, scale_dependent_slope};

/// Samples of a curve at native resolution, each flagged by whether enough
/// underlying data supports it.
#[derive(Debug, Clone, Default)]
pub struct RawCurve {
    pub x: Vec<f64>,
    pub y: Vec<f64>,
    pub reliable: Vec<bool>,
}

impl RawCurve {
    /// Flag every sample with `x <= cutoff` as reliable.
    pub fn with_upper_cutoff(x: Vec<f64>, y: Vec<f64>, cutoff: f64) -> Self {
        let reliable = x.iter().map(|x| *x <= cutoff).collect();
        Self { x, y, reliable }
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// The reliable samples only.
    pub fn reliable_part(&self) -> (Vec<f64>, Vec<f64>) {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.reliable)
            .filter(|(_, ok)| **ok)
            .map(|((x, y), _)| (*x, *y))
            .unzip()
    }
}

use serde::{Deserialize, Serialize};

use crate::metrics::BinSpec;

/// Keyword parameters of the histogram workflows.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DistributionParams {
    /// Bin count or explicit edges. `None` picks `⌊√n + 1⌋` bins.
    pub bins: Option<BinSpec>,
}

/// Keyword parameters of the log-binned curve workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpectralParams {
    /// Geometric bins per decade of the x axis.
    pub nb_points_per_decade: usize,
}

impl Default for SpectralParams {
    fn default() -> Self {
        Self { nb_points_per_decade: 10 }
    }
}

/// Workflows without keyword parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NoParams {}

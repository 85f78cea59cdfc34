//! Explicit registration of the available workflows.
//!
//! The host application discovers workflows through a [`Registry`] that is
//! filled by a single call to [`Registry::register_builtin`]. Each entry
//! carries the dotted name, a display name, the default keyword parameters
//! and a constructor taking keyword parameters as JSON.
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::{AnalysisError, Result};
use crate::params::{DistributionParams, NoParams, SpectralParams};
use crate::result::{PlotResult, RoughnessParameterRow, WorkflowOutput};
use crate::topography::{Surface, Topography};
use crate::workflows::{
    Autocorrelation, CurvatureDistribution, HeightDistribution, PowerSpectralDensity,
    RoughnessParameters, ScaleDependentCurvature, ScaleDependentSlope, SlopeDistribution,
    VariableBandwidth, Workflow,
};

/// A configured workflow with its output type erased.
pub trait AnalysisRunner: Send + Sync {
    fn run_topography(&self, topography: &dyn Topography) -> Result<WorkflowOutput>;
    fn run_surface(&self, surface: &Surface) -> Result<WorkflowOutput>;
}

impl<W> AnalysisRunner for W
where
    W: Workflow + Send + Sync,
    W::Output: Into<WorkflowOutput>,
{
    fn run_topography(&self, topography: &dyn Topography) -> Result<WorkflowOutput> {
        self.topography_implementation(topography).map(Into::into)
    }

    fn run_surface(&self, surface: &Surface) -> Result<WorkflowOutput> {
        self.surface_implementation(surface).map(Into::into)
    }
}

impl From<PlotResult> for WorkflowOutput {
    fn from(result: PlotResult) -> Self {
        WorkflowOutput::Plot(result)
    }
}

impl From<Vec<RoughnessParameterRow>> for WorkflowOutput {
    fn from(rows: Vec<RoughnessParameterRow>) -> Self {
        WorkflowOutput::Table(rows)
    }
}

pub struct WorkflowDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub default_kwargs: fn() -> Value,
    pub build: fn(&Value) -> Result<Box<dyn AnalysisRunner>>,
}

impl WorkflowDescriptor {
    /// Build the workflow, filling absent keyword parameters with defaults.
    pub fn instantiate(&self, kwargs: Option<&Value>) -> Result<Box<dyn AnalysisRunner>> {
        match kwargs {
            Some(kwargs) => (self.build)(kwargs),
            None => (self.build)(&(self.default_kwargs)()),
        }
    }
}

fn defaults<P: Default + Serialize>() -> Value {
    // Parameter structs are plain data; serialising them cannot fail.
    serde_json::to_value(P::default()).unwrap_or(Value::Null)
}

fn parse<P: DeserializeOwned>(kwargs: &Value) -> Result<P> {
    let kwargs = if kwargs.is_null() { Value::Object(Default::default()) } else { kwargs.clone() };
    Ok(serde_json::from_value(kwargs)?)
}

macro_rules! descriptor {
    ($ty:ident, $params:ty, $display:literal, |$p:ident| $make:expr) => {
        WorkflowDescriptor {
            name: <$ty as Workflow>::NAME,
            display_name: $display,
            default_kwargs: defaults::<$params>,
            build: |kwargs| {
                let $p: $params = parse(kwargs)?;
                Ok(Box::new($make) as Box<dyn AnalysisRunner>)
            },
        }
    };
}

/// The nine statistics workflows.
pub fn builtin_descriptors() -> Vec<WorkflowDescriptor> {
    vec![
        descriptor!(HeightDistribution, DistributionParams, "Height distribution", |p| HeightDistribution::new(p)),
        descriptor!(SlopeDistribution, DistributionParams, "Slope distribution", |p| SlopeDistribution::new(p)),
        descriptor!(
            CurvatureDistribution,
            DistributionParams,
            "Curvature distribution",
            |p| CurvatureDistribution::new(p)
        ),
        descriptor!(
            PowerSpectralDensity,
            SpectralParams,
            "Power spectrum",
            |p| PowerSpectralDensity::new(p)
        ),
        descriptor!(Autocorrelation, SpectralParams, "Autocorrelation", |p| Autocorrelation::new(p)),
        descriptor!(VariableBandwidth, NoParams, "Variable bandwidth", |p| VariableBandwidth::new(p)),
        descriptor!(RoughnessParameters, NoParams, "Roughness parameters", |_p| RoughnessParameters),
        descriptor!(
            ScaleDependentSlope,
            SpectralParams,
            "Scale-dependent slope",
            |p| ScaleDependentSlope::new(p)
        ),
        descriptor!(
            ScaleDependentCurvature,
            SpectralParams,
            "Scale-dependent curvature",
            |p| ScaleDependentCurvature::new(p)
        ),
    ]
}

/// Workflows keyed by dotted name.
#[derive(Default)]
pub struct Registry {
    entries: BTreeMap<&'static str, WorkflowDescriptor>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in workflows.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtin();
        registry
    }

    /// Add or replace a workflow. Registering the same name twice keeps a
    /// single entry.
    pub fn register(&mut self, descriptor: WorkflowDescriptor) {
        debug!(workflow = descriptor.name, "registering workflow");
        self.entries.insert(descriptor.name, descriptor);
    }

    pub fn register_builtin(&mut self) {
        for descriptor in builtin_descriptors() {
            self.register(descriptor);
        }
    }

    pub fn get(&self, name: &str) -> Result<&WorkflowDescriptor> {
        self.entries
            .get(name)
            .ok_or_else(|| AnalysisError::UnknownWorkflow(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.keys().copied()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &WorkflowDescriptor> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::fixtures;
    use serde_json::json;

    #[test]
    fn registering_twice_keeps_one_entry_per_name() {
        let mut registry = Registry::with_builtin();
        let before: Vec<_> = registry.names().collect();
        registry.register_builtin();
        let after: Vec<_> = registry.names().collect();
        assert_eq!(before, after);
        assert_eq!(registry.len(), 9);
    }

    #[test]
    fn builtin_names_are_namespaced() {
        let registry = Registry::with_builtin();
        assert!(registry.names().all(|n| n.starts_with("topostats.")));
        assert!(registry.get("topostats.roughness_parameters").is_ok());
        assert!(matches!(
            registry.get("topostats.nonexistent"),
            Err(AnalysisError::UnknownWorkflow(_))
        ));
    }

    #[test]
    fn default_kwargs_describe_parameters() {
        let registry = Registry::with_builtin();
        let psd = registry.get("topostats.power_spectral_density").unwrap();
        assert_eq!((psd.default_kwargs)(), json!({"nb_points_per_decade": 10}));
        let height = registry.get("topostats.height_distribution").unwrap();
        assert_eq!((height.default_kwargs)(), json!({"bins": null}));
        let vb = registry.get("topostats.variable_bandwidth").unwrap();
        assert_eq!((vb.default_kwargs)(), json!({}));
    }

    #[test]
    fn built_runner_produces_expected_output_kind() {
        let registry = Registry::with_builtin();
        let t = fixtures::linear_in_y();

        let slope = registry
            .get("topostats.slope_distribution")
            .unwrap()
            .instantiate(Some(&json!({"bins": 3})))
            .unwrap();
        assert!(matches!(slope.run_topography(&t).unwrap(), WorkflowOutput::Plot(_)));

        let table = registry.get("topostats.roughness_parameters").unwrap().instantiate(None).unwrap();
        match table.run_topography(&t).unwrap() {
            WorkflowOutput::Table(rows) => assert_eq!(rows.len(), 11),
            other => panic!("expected a table, got {other:?}"),
        }
    }

    #[test]
    fn malformed_kwargs_are_rejected() {
        let registry = Registry::with_builtin();
        let psd = registry.get("topostats.power_spectral_density").unwrap();
        assert!(matches!(
            psd.instantiate(Some(&json!({"nb_points_per_decade": "ten"}))),
            Err(AnalysisError::InvalidParameters(_))
        ));
    }
}

//! Result records handed to the rendering layer.
//!
//! Field names, nesting and ordering are consumed verbatim downstream.
//! Optional keys are omitted entirely when absent rather than serialised as
//! `null`, so a distribution result and a plot-card result differ in their
//! key sets exactly as consumers expect.
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::heightfield::Axis;

/// One named curve. `x` and `y` always have the same length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub x: Vec<f64>,
    pub y: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, x: Vec<f64>, y: Vec<f64>) -> Self {
        debug_assert_eq!(x.len(), y.len());
        Self { name: name.into(), x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scalar {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisScale {
    Linear,
    Log,
}

/// A plot-card result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotResult {
    pub name: String,
    pub xlabel: String,
    pub ylabel: String,
    pub xunit: String,
    pub yunit: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xscale: Option<AxisScale>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yscale: Option<AxisScale>,
    pub series: Vec<Series>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scalars: Option<BTreeMap<String, Scalar>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<String>>,
}

impl PlotResult {
    pub fn new(
        name: &str,
        (xlabel, ylabel): (&str, &str),
        (xunit, yunit): (String, String),
    ) -> Self {
        Self {
            name: name.to_string(),
            xlabel: xlabel.to_string(),
            ylabel: ylabel.to_string(),
            xunit,
            yunit,
            xscale: None,
            yscale: None,
            series: Vec::new(),
            scalars: None,
            alerts: None,
        }
    }

    /// Log-log axes and an (initially empty) alert list.
    pub fn log_log(mut self) -> Self {
        self.xscale = Some(AxisScale::Log);
        self.yscale = Some(AxisScale::Log);
        self.alerts = Some(Vec::new());
        self
    }

    pub fn push_scalar(&mut self, name: impl Into<String>, value: f64, unit: impl Into<String>) {
        self.scalars
            .get_or_insert_with(BTreeMap::new)
            .insert(name.into(), Scalar { value, unit: unit.into() });
    }

    pub fn series(&self, name: &str) -> Option<&Series> {
        self.series.iter().find(|s| s.name == name)
    }

    pub fn scalar(&self, name: &str) -> Option<&Scalar> {
        self.scalars.as_ref().and_then(|s| s.get(name))
    }
}

/// Which representation of the data a roughness parameter is computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Representation {
    #[serde(rename = "profile (1D)")]
    Profile,
    #[serde(rename = "area (2D)")]
    Area,
}

/// One row of the roughness-parameter table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoughnessParameterRow {
    pub quantity: String,
    pub direction: Option<Axis>,
    #[serde(rename = "from")]
    pub from: Representation,
    pub symbol: String,
    pub value: f64,
    pub unit: String,
}

/// Output of any registered workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkflowOutput {
    Plot(PlotResult),
    Table(Vec<RoughnessParameterRow>),
}

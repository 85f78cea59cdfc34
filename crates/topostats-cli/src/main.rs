/// Command-line driver for the topography statistics workflows.
/// Reads a serialised topography or surface, runs one registered workflow
/// and prints the encoded result as JSON on stdout.

use std::fs;
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::info;
use tracing_subscriber::EnvFilter;

use topostats_core::encoding::{
    encode_plot_result, encode_roughness_table, NUM_SIGNIFICANT_DIGITS_RMS_VALUES,
};
use topostats_core::{Registry, SurfaceData, TopographyData, WorkflowOutput};

#[derive(Parser, Debug)]
#[command(name = "topostats", about = "Statistical analysis of surface topography")]
struct Args {
    /// List the registered workflows and exit.
    #[arg(long)]
    list: bool,

    /// Dotted workflow name, e.g. topostats.power_spectral_density.
    #[arg(short, long)]
    workflow: Option<String>,

    /// Path to a JSON document holding a topography (or a surface with --surface).
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Treat the input as a surface grouping several topographies.
    #[arg(long)]
    surface: bool,

    /// Keyword parameters as a JSON object; defaults are used when absent.
    #[arg(short, long)]
    kwargs: Option<String>,

    /// Significant digits in the output; 0 keeps full precision.
    #[arg(short, long, default_value_t = NUM_SIGNIFICANT_DIGITS_RMS_VALUES)]
    digits: u32,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    init_logging();
    let args = Args::parse();
    let registry = Registry::with_builtin();

    if args.list {
        for descriptor in registry.descriptors() {
            println!("{}\t{}", descriptor.name, descriptor.display_name);
        }
        return Ok(());
    }

    let Some(name) = args.workflow.as_deref() else {
        bail!("no workflow given; use --list to see the available ones");
    };
    let Some(path) = args.input.as_ref() else {
        bail!("no input given; use --help for usage");
    };

    let kwargs: Option<Value> = args
        .kwargs
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("parsing --kwargs")?;
    let runner = registry
        .get(name)?
        .instantiate(kwargs.as_ref())
        .with_context(|| format!("configuring {name}"))?;

    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let output = if args.surface {
        let data: SurfaceData =
            serde_json::from_str(&text).with_context(|| format!("parsing surface {}", path.display()))?;
        let surface = data.into_surface()?;
        info!(workflow = name, surface = %surface.name, members = surface.topographies.len(), "running");
        runner.run_surface(&surface)?
    } else {
        let data: TopographyData = serde_json::from_str(&text)
            .with_context(|| format!("parsing topography {}", path.display()))?;
        let topography = data.into_topography()?;
        info!(workflow = name, topography = topography.name(), "running");
        runner.run_topography(topography.as_ref())?
    };

    let encoded = match &output {
        WorkflowOutput::Plot(result) => encode_plot_result(result, args.digits),
        WorkflowOutput::Table(rows) => serde_json::to_value(encode_roughness_table(rows, args.digits))?,
    };
    println!("{}", serde_json::to_string_pretty(&encoded)?);
    Ok(())
}

//! Analyze command: transform a trace, delineate layers and emit a JSON report.

use std::path::PathBuf;

use anyhow::{Context, Result};
use ndarray::Array2;
use serde::Serialize;
use tracing::{info, info_span};

use strata_io::read_trace;
use strata_layers::{Layer, LayeredTrace, ReconcileSummary, analyze_trace};

use crate::cli::AnalyzeArgs;
use crate::config::StrataConfig;
use crate::convert;

/// JSON report of a layered trace.
#[derive(Debug, Serialize)]
pub struct Report {
    pub input: PathBuf,
    pub n_data: usize,
    pub n_wavelet: usize,
    pub n_layer: usize,
    pub depth_step: f64,
    pub reversed: bool,
    pub truncated: bool,
    pub reconciliation: SummaryReport,
    pub physical_widths: Vec<f64>,
    pub layers: Vec<LayerReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matrices: Option<MatrixReport>,
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub initial: usize,
    pub null_merged: usize,
    pub absorbed: usize,
    pub surviving: usize,
}

impl From<ReconcileSummary> for SummaryReport {
    fn from(s: ReconcileSummary) -> Self {
        Self {
            initial: s.initial,
            null_merged: s.null_merged,
            absorbed: s.absorbed,
            surviving: s.surviving,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LayerReport {
    pub rank: usize,
    pub importance: f64,
    pub raw_importance: f64,
    pub start_index: usize,
    pub end_index: usize,
    pub start_depth: f64,
    pub end_depth: f64,
    pub thickness: f64,
}

impl From<&Layer> for LayerReport {
    fn from(l: &Layer) -> Self {
        Self {
            rank: l.rank,
            importance: l.importance,
            raw_importance: l.raw_importance,
            start_index: l.start_index,
            end_index: l.end_index,
            start_depth: l.start_depth,
            end_depth: l.end_depth,
            thickness: l.thickness,
        }
    }
}

/// Row-major dumps of the per-cell matrices (`n_data` rows, `n_wavelet` columns).
#[derive(Debug, Serialize)]
pub struct MatrixReport {
    pub coefficients: Vec<Vec<f64>>,
    pub labels: Vec<Vec<usize>>,
    pub importance: Vec<Vec<f64>>,
    /// One column per scale, `extended_len` rows.
    pub wavelets: Vec<Vec<f64>>,
}

fn rows<T: Clone>(m: &Array2<T>) -> Vec<Vec<T>> {
    m.outer_iter().map(|r| r.to_vec()).collect()
}

/// Assembles the report for a layered trace.
pub fn build_report(
    input: PathBuf,
    layered: &LayeredTrace,
    with_matrices: bool,
) -> Result<Report> {
    let trace = layered.transform().trace();
    let matrices = if with_matrices {
        let wavelets = layered
            .wavelet_matrix()
            .context("failed to build wavelet matrix")?;
        Some(MatrixReport {
            coefficients: rows(layered.coefficients()),
            labels: rows(layered.labels()),
            importance: rows(&layered.importance_matrix()),
            wavelets: rows(&wavelets),
        })
    } else {
        None
    };

    Ok(Report {
        input,
        n_data: layered.n_data(),
        n_wavelet: layered.n_wavelet(),
        n_layer: layered.n_layer(),
        depth_step: layered.depth_step(),
        reversed: trace.was_reversed(),
        truncated: trace.was_truncated(),
        reconciliation: layered.summary().into(),
        physical_widths: layered.physical_widths().to_vec(),
        layers: layered.layers().iter().map(LayerReport::from).collect(),
        matrices,
    })
}

/// Run the analysis pipeline.
pub fn run(args: AnalyzeArgs) -> Result<()> {
    let _cmd = info_span!("analyze").entered();

    // Step 1: Load config and resolve paths
    let config = StrataConfig::load(&args.config)?;
    let input = args.input.or(config.io.input.clone()).ok_or_else(|| {
        anyhow::anyhow!("no input path: set [io].input in config or use --input")
    })?;

    // Step 2: Build configs from TOML
    let reader_cfg = convert::build_reader_config(&config.io)?;
    let transform_cfg = convert::build_transform_config(&config.transform)?;
    let layer_cfg = convert::build_layer_config(&config.layers)?;

    // Step 3: Read and layer the trace
    info!(path = %input.display(), "reading trace");
    let trace = read_trace(&input, &reader_cfg)
        .with_context(|| format!("failed to read Parquet: {}", input.display()))?;
    let layered =
        analyze_trace(&trace, &transform_cfg, &layer_cfg).context("layer analysis failed")?;
    info!(
        n_wavelet = layered.n_wavelet(),
        n_layer = layered.n_layer(),
        "analysis complete"
    );

    // Step 4: Write the report
    let report = build_report(input, &layered, args.matrices)?;
    let json = serde_json::to_string_pretty(&report).context("failed to serialise report")?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, &json)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            info!(path = %path.display(), "report written");
        }
        None => println!("{json}"),
    }

    Ok(())
}

//! Select command: re-block a trace from its ranked layers and write Parquet.

use anyhow::{Context, Result};
use tracing::{info, info_span};

use strata_io::{read_trace, write_blocks};
use strata_layers::{analyze_trace, select_layers};

use crate::cli::SelectArgs;
use crate::config::StrataConfig;
use crate::convert;

/// Run the selection pipeline.
pub fn run(args: SelectArgs) -> Result<()> {
    let _cmd = info_span!("select").entered();

    // Step 1: Load config and resolve paths
    let config = StrataConfig::load(&args.config)?;
    let input = args.input.or(config.io.input.clone()).ok_or_else(|| {
        anyhow::anyhow!("no input path: set [io].input in config or use --input")
    })?;
    let output = args.output.or(config.io.output.clone()).ok_or_else(|| {
        anyhow::anyhow!("no output path: set [io].output in config or use --output")
    })?;

    // Step 2: Build configs from TOML
    let reader_cfg = convert::build_reader_config(&config.io)?;
    let writer_cfg = convert::build_writer_config(&config.io)?;
    let transform_cfg = convert::build_transform_config(&config.transform)?;
    let layer_cfg = convert::build_layer_config(&config.layers)?;
    let (mode, value) =
        convert::resolve_selection(&config.select, args.mode.as_deref(), args.value)?;

    // Step 3: Read and layer the trace
    info!(path = %input.display(), "reading trace");
    let trace = read_trace(&input, &reader_cfg)
        .with_context(|| format!("failed to read Parquet: {}", input.display()))?;
    let layered =
        analyze_trace(&trace, &transform_cfg, &layer_cfg).context("layer analysis failed")?;

    // Step 4: Select and write blocks
    let selection = select_layers(&layered, mode, value)
        .with_context(|| format!("selection failed for mode {} = {value}", mode.name()))?;
    info!(
        mode = mode.name(),
        value,
        selected = selection.selected_ranks().len(),
        blocks = selection.n_layer(),
        "layers selected"
    );
    write_blocks(&output, &selection, &writer_cfg)
        .with_context(|| format!("failed to write Parquet: {}", output.display()))?;

    Ok(())
}

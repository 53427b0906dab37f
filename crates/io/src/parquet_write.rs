//! Low-level Parquet column building.

use std::path::Path;
use std::sync::Arc;

use arrow::array::{ArrayRef, Float64Array, RecordBatch, UInt32Array, UInt64Array};
use arrow::datatypes::{DataType, Field, Schema};
use parquet::arrow::ArrowWriter;
use parquet::file::properties::WriterProperties;
use strata_layers::Selection;
use strata_wavelet::Trace;

use crate::error::IoError;

/// Builds the Arrow schema for a trace: `depth` and `value`.
pub(crate) fn build_trace_schema(depth_column: &str, value_column: &str) -> Schema {
    Schema::new(vec![
        Field::new(depth_column, DataType::Float64, false),
        Field::new(value_column, DataType::Float64, false),
    ])
}

/// Builds the Arrow schema for selection blocks.
pub(crate) fn build_blocks_schema() -> Schema {
    Schema::new(vec![
        Field::new("block", DataType::UInt32, false),
        Field::new("start_index", DataType::UInt64, false),
        Field::new("end_index", DataType::UInt64, false),
        Field::new("top_depth", DataType::Float64, false),
        Field::new("bottom_depth", DataType::Float64, false),
        Field::new("thickness", DataType::Float64, false),
        Field::new("mean", DataType::Float64, false),
        Field::new("median", DataType::Float64, false),
        Field::new("variance", DataType::Float64, false),
    ])
}

/// Converts a [`Trace`] into a single [`RecordBatch`].
pub(crate) fn trace_to_record_batch(trace: &Trace, schema: &Schema) -> Result<RecordBatch, IoError> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(Float64Array::from(trace.depth().to_vec())),
        Arc::new(Float64Array::from(trace.values().to_vec())),
    ];
    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Converts the blocks of a [`Selection`] into a single [`RecordBatch`].
///
/// Blocks are numbered from 1 in depth order.
pub(crate) fn blocks_to_record_batch(
    selection: &Selection,
    schema: &Schema,
) -> Result<RecordBatch, IoError> {
    let blocks = selection.blocks();
    let n = blocks.len();

    let block_col: ArrayRef = Arc::new(UInt32Array::from_iter_values(1..=n as u32));
    let f64_col = |get: fn(&strata_layers::Block) -> f64| -> ArrayRef {
        Arc::new(Float64Array::from_iter_values(blocks.iter().map(get)))
    };

    let columns: Vec<ArrayRef> = vec![
        block_col,
        Arc::new(UInt64Array::from_iter_values(
            blocks.iter().map(|b| b.start_index as u64),
        )),
        Arc::new(UInt64Array::from_iter_values(
            blocks.iter().map(|b| b.end_index as u64),
        )),
        f64_col(|b| b.top_depth),
        f64_col(|b| b.bottom_depth),
        f64_col(|b| b.thickness),
        f64_col(|b| b.mean),
        f64_col(|b| b.median),
        f64_col(|b| b.variance),
    ];

    Ok(RecordBatch::try_new(Arc::new(schema.clone()), columns)?)
}

/// Writes a sequence of [`RecordBatch`]es to a Parquet file at `path`.
///
/// # Errors
///
/// Returns [`IoError::Parquet`] if file creation, batch writing, or file
/// finalisation fails.
pub(crate) fn write_batches(
    path: &Path,
    batches: &[RecordBatch],
    schema: &Schema,
    props: WriterProperties,
) -> Result<(), IoError> {
    let file = std::fs::File::create(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;
    let mut writer = ArrowWriter::try_new(file, Arc::new(schema.clone()), Some(props))?;

    for batch in batches {
        writer.write(batch)?;
    }

    writer.close()?;
    Ok(())
}

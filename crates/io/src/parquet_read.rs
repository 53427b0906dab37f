//! Low-level Parquet reading and column extraction.

use std::path::Path;

use arrow::array::{Array, AsArray, RecordBatch};
use arrow::datatypes::{DataType, Float64Type};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use crate::error::IoError;

/// Reads all record batches from a Parquet file.
///
/// # Errors
///
/// Returns [`IoError::FileNotFound`] if the file does not exist, or
/// [`IoError::Parquet`] if the file cannot be opened or read.
pub(crate) fn read_batches(path: &Path) -> Result<Vec<RecordBatch>, IoError> {
    if !path.exists() {
        return Err(IoError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file = std::fs::File::open(path).map_err(|e| IoError::Parquet {
        reason: e.to_string(),
    })?;

    let builder = ParquetRecordBatchReaderBuilder::try_new(file)?;
    let reader = builder.build()?;

    let batches: Vec<RecordBatch> = reader.collect::<Result<Vec<_>, _>>()?;
    Ok(batches)
}

/// Concatenates the `Float64` column `name` across all batches.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::MissingColumn`] | no column called `name` |
/// | [`IoError::ColumnType`] | the column is not `Float64` |
/// | [`IoError::Validation`] | the column contains nulls |
pub(crate) fn column_f64(
    batches: &[RecordBatch],
    name: &str,
    path: &Path,
) -> Result<Vec<f64>, IoError> {
    let mut values = Vec::with_capacity(batches.iter().map(RecordBatch::num_rows).sum());
    let mut nulls = 0;

    for batch in batches {
        let column = batch
            .column_by_name(name)
            .ok_or_else(|| IoError::MissingColumn {
                name: name.to_string(),
                path: path.to_path_buf(),
            })?;
        if column.data_type() != &DataType::Float64 {
            return Err(IoError::ColumnType {
                name: name.to_string(),
                expected: DataType::Float64.to_string(),
                got: column.data_type().to_string(),
            });
        }
        nulls += column.null_count();
        values.extend(column.as_primitive::<Float64Type>().values().iter().copied());
    }

    if nulls > 0 {
        return Err(IoError::Validation {
            count: 1,
            details: format!("column '{name}' contains {nulls} null value(s)"),
        });
    }
    Ok(values)
}

//! High-level Parquet trace reader.

use std::path::Path;

use strata_wavelet::Trace;
use tracing::{debug, info};

use crate::error::IoError;
use crate::parquet_read;

/// Configuration for reading a depth trace from Parquet.
///
/// Use the builder methods (`with_*`) to change the column names. The
/// [`Default`] implementation reads `depth` and `value`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReaderConfig {
    /// Column holding the depth of each sample.
    depth_column: String,
    /// Column holding the measured value of each sample.
    value_column: String,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            depth_column: "depth".into(),
            value_column: "value".into(),
        }
    }
}

impl ReaderConfig {
    /// Set the depth column name.
    pub fn with_depth_column(mut self, name: impl Into<String>) -> Self {
        self.depth_column = name.into();
        self
    }

    /// Set the value column name.
    pub fn with_value_column(mut self, name: impl Into<String>) -> Self {
        self.value_column = name.into();
        self
    }

    /// Returns the depth column name.
    pub fn depth_column(&self) -> &str {
        &self.depth_column
    }

    /// Returns the value column name.
    pub fn value_column(&self) -> &str {
        &self.value_column
    }

    /// Validate that the configuration is internally consistent.
    ///
    /// # Errors
    ///
    /// Returns [`IoError::Validation`] if a column name is empty or both
    /// names are the same.
    pub fn validate(&self) -> Result<(), IoError> {
        let mut problems = Vec::new();
        if self.depth_column.is_empty() {
            problems.push("depth_column must not be empty".to_string());
        }
        if self.value_column.is_empty() {
            problems.push("value_column must not be empty".to_string());
        }
        if !self.depth_column.is_empty() && self.depth_column == self.value_column {
            problems.push(format!(
                "depth_column and value_column are both '{}'",
                self.depth_column
            ));
        }
        if !problems.is_empty() {
            return Err(IoError::Validation {
                count: problems.len(),
                details: problems.join("; "),
            });
        }
        Ok(())
    }
}

/// Read a depth trace from a Parquet file.
///
/// Both columns must be non-null `Float64`. The samples are prepared by
/// [`Trace::new`]: oriented by increasing depth and truncated to an even
/// count.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`IoError::FileNotFound`] | `path` does not exist |
/// | [`IoError::Parquet`] | the file cannot be read |
/// | [`IoError::MissingColumn`] | a configured column is absent |
/// | [`IoError::ColumnType`] | a column is not `Float64` |
/// | [`IoError::Validation`] | invalid config or null values |
/// | [`IoError::Trace`] | the samples do not form a valid trace |
pub fn read_trace(path: &Path, config: &ReaderConfig) -> Result<Trace, IoError> {
    config.validate()?;

    let batches = parquet_read::read_batches(path)?;
    debug!(batches = batches.len(), path = %path.display(), "read parquet batches");

    let depth = parquet_read::column_f64(&batches, &config.depth_column, path)?;
    let values = parquet_read::column_f64(&batches, &config.value_column, path)?;

    let trace = Trace::new(depth, values)?;
    info!(
        samples = trace.len(),
        depth_step = trace.depth_step(),
        reversed = trace.was_reversed(),
        truncated = trace.was_truncated(),
        "loaded trace"
    );
    Ok(trace)
}

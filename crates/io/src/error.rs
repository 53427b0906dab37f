//! Error types for strata-io.

use std::path::PathBuf;

use strata_wavelet::WaveletError;

/// Error type for all fallible operations in the strata-io crate.
///
/// Covers missing files, Parquet and Arrow failures, schema mismatches, and
/// traces rejected during validation.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Wraps an error originating from the Parquet or Arrow libraries.
    #[error("parquet error: {reason}")]
    Parquet {
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a required column is not present in a file.
    #[error("column '{name}' not found in {}", path.display())]
    MissingColumn {
        /// Name of the missing column.
        name: String,
        /// Path to the file that was inspected.
        path: PathBuf,
    },

    /// Returned when a column has an unsupported data type.
    #[error("column '{name}' has type {got}, expected {expected}")]
    ColumnType {
        /// Name of the column.
        name: String,
        /// Expected Arrow data type.
        expected: String,
        /// Actual Arrow data type.
        got: String,
    },

    /// Returned when the columns read do not form a valid trace.
    #[error("invalid trace: {0}")]
    Trace(#[from] WaveletError),

    /// Returned when one or more validation checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },
}

impl From<parquet::errors::ParquetError> for IoError {
    fn from(e: parquet::errors::ParquetError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

impl From<arrow::error::ArrowError> for IoError {
    fn from(e: arrow::error::ArrowError) -> Self {
        IoError::Parquet {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.parquet"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.parquet");
    }

    #[test]
    fn display_parquet() {
        let err = IoError::Parquet {
            reason: "bad footer".to_string(),
        };
        assert_eq!(err.to_string(), "parquet error: bad footer");
    }

    #[test]
    fn display_missing_column() {
        let err = IoError::MissingColumn {
            name: "gamma".to_string(),
            path: PathBuf::from("well.parquet"),
        };
        assert_eq!(err.to_string(), "column 'gamma' not found in well.parquet");
    }

    #[test]
    fn display_column_type() {
        let err = IoError::ColumnType {
            name: "depth".to_string(),
            expected: "Float64".to_string(),
            got: "Utf8".to_string(),
        };
        assert_eq!(err.to_string(), "column 'depth' has type Utf8, expected Float64");
    }

    #[test]
    fn display_trace() {
        let err = IoError::from(WaveletError::NonMonotonicDepth { index: 3 });
        assert_eq!(
            err.to_string(),
            "invalid trace: depth is not strictly monotonic at sample 3"
        );
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 2,
            details: "a; b".to_string(),
        };
        assert_eq!(err.to_string(), "2 validation error(s): a; b");
    }

    #[test]
    fn from_parquet_error() {
        let err = IoError::from(parquet::errors::ParquetError::General("boom".into()));
        assert!(matches!(err, IoError::Parquet { .. }));
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn from_arrow_error() {
        let err = IoError::from(arrow::error::ArrowError::SchemaError("no field".into()));
        assert!(matches!(err, IoError::Parquet { .. }));
        assert!(err.to_string().contains("no field"));
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<IoError>();
    }
}

//! # strata-io
//!
//! Read depth traces from Parquet and write prepared traces and selection
//! blocks back to Parquet. Bridges columnar files into the
//! [`strata_wavelet::Trace`] and [`strata_layers::Selection`] types.

mod error;
mod parquet_read;
mod parquet_write;
mod reader;
mod writer;

pub use error::IoError;
pub use reader::{ReaderConfig, read_trace};
pub use writer::{Compression, WriterConfig, write_blocks, write_trace};

//! Error types for the strata-layers crate.

use strata_wavelet::WaveletError;

/// Error type for all fallible operations in the strata-layers crate.
///
/// Covers transform failures bubbled up from the wavelet crate, label-state
/// consistency failures during reconciliation, and invalid selection requests.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayerError {
    /// Wavelet transform error.
    #[error(transparent)]
    Wavelet(#[from] WaveletError),

    /// Returned when a region that never reaches the finest scale has no
    /// labelled finer neighbour to merge into.
    #[error("region {label} has no finer-scale neighbour at row {row}, column {col}")]
    OrphanWithoutNeighbor {
        /// Label of the orphaned region.
        label: usize,
        /// Row of the region's finest member cell.
        row: usize,
        /// Column of the region's finest member cell.
        col: usize,
    },

    /// Returned when a ranked layer has no cell at the finest scale.
    #[error("layer rank {rank} is missing from the finest scale")]
    MissingFromFinestScale {
        /// Rank of the offending layer.
        rank: usize,
    },

    /// Returned when a selection value is negative or not finite.
    #[error("invalid selection value: {value}")]
    InvalidSelectionValue {
        /// The rejected value.
        value: f64,
    },

    /// Returned when a selection mode name is not recognised.
    #[error("unknown selection mode: {0}")]
    UnknownSelectionMode(String),

    /// Returned when layering settings are inconsistent.
    #[error("invalid layer config: {0}")]
    InvalidConfig(String),
}

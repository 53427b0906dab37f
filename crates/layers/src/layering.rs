//! End-to-end layering of a transformed trace.

use ndarray::Array2;
use strata_wavelet::{Trace, TransformConfig, WaveletTransform, wavelet_transform};
use tracing::{info, warn};

use crate::boundary::{FinestRun, Layer, extract_layers, finest_runs};
use crate::error::LayerError;
use crate::rank::{importance_matrix, rank_layers};
use crate::reconcile::{ReconcileSummary, reconcile};
use crate::segment::{NullResponse, label_regions};

/// Configuration for segmentation and reconciliation.
///
/// # Example
///
/// ```
/// use strata_layers::{LayerConfig, NullResponse};
///
/// let config = LayerConfig::new().with_null_response(NullResponse::Distinct);
/// assert_eq!(config.zero_tolerance(), 1e-9);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct LayerConfig {
    /// Responses with `|x| <= zero_tolerance * max|x|` count as zero.
    zero_tolerance: f64,
    /// Treatment of zero-response regions.
    null_response: NullResponse,
}

impl LayerConfig {
    /// Creates a new `LayerConfig` with `zero_tolerance = 1e-9` and
    /// [`NullResponse::Merge`].
    pub fn new() -> Self {
        Self {
            zero_tolerance: 1e-9,
            null_response: NullResponse::Merge,
        }
    }

    /// Sets the relative zero tolerance.
    pub fn with_zero_tolerance(mut self, zero_tolerance: f64) -> Self {
        self.zero_tolerance = zero_tolerance;
        self
    }

    /// Sets the zero-response policy.
    pub fn with_null_response(mut self, null_response: NullResponse) -> Self {
        self.null_response = null_response;
        self
    }

    /// Returns the relative zero tolerance.
    pub fn zero_tolerance(&self) -> f64 {
        self.zero_tolerance
    }

    /// Returns the zero-response policy.
    pub fn null_response(&self) -> NullResponse {
        self.null_response
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] if `zero_tolerance` is not in
    /// `[0, 1)`.
    pub fn validate(&self) -> Result<(), LayerError> {
        if !(0.0..1.0).contains(&self.zero_tolerance) {
            return Err(LayerError::InvalidConfig(format!(
                "zero_tolerance must be in [0, 1), got {}",
                self.zero_tolerance
            )));
        }
        Ok(())
    }
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// A trace split into ranked hierarchical layers.
///
/// Owns the wavelet transform it was built from, the ranked label matrix
/// (same shape as the transform matrix, labels are ranks) and one
/// [`Layer`] per rank, most important first.
#[derive(Clone, Debug)]
pub struct LayeredTrace {
    transform: WaveletTransform,
    labels: Array2<usize>,
    layers: Vec<Layer>,
    summary: ReconcileSummary,
}

impl LayeredTrace {
    /// Returns the underlying wavelet transform.
    pub fn transform(&self) -> &WaveletTransform {
        &self.transform
    }

    /// Returns the prepared depths.
    pub fn depth(&self) -> &[f64] {
        self.transform.depth()
    }

    /// Returns the prepared raw values.
    pub fn data(&self) -> &[f64] {
        self.transform.data()
    }

    /// Returns the mean depth step.
    pub fn depth_step(&self) -> f64 {
        self.transform.depth_step()
    }

    /// Returns the number of samples.
    pub fn n_data(&self) -> usize {
        self.transform.n_data()
    }

    /// Returns the number of wavelet scales.
    pub fn n_wavelet(&self) -> usize {
        self.transform.n_wavelet()
    }

    /// Returns the number of layers.
    pub fn n_layer(&self) -> usize {
        self.layers.len()
    }

    /// Returns the transform matrix `[n_data, n_wavelet]`.
    pub fn coefficients(&self) -> &Array2<f64> {
        self.transform.coefficients()
    }

    /// Returns the ranked label matrix.
    pub fn labels(&self) -> &Array2<usize> {
        &self.labels
    }

    /// Returns the layers ordered by rank.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Returns the layer of `rank`, if it exists.
    pub fn layer(&self, rank: usize) -> Option<&Layer> {
        rank.checked_sub(1).and_then(|i| self.layers.get(i))
    }

    /// Returns the reconciliation counts.
    pub fn summary(&self) -> ReconcileSummary {
        self.summary
    }

    /// Returns the normalised importance per rank, non-increasing.
    pub fn importance(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.importance).collect()
    }

    /// Returns the raw `|mean response|` per rank, non-increasing.
    pub fn raw_importance(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.raw_importance).collect()
    }

    /// Returns `(start_index, end_index)` per rank.
    pub fn boundaries(&self) -> Vec<(usize, usize)> {
        self.layers
            .iter()
            .map(|l| (l.start_index, l.end_index))
            .collect()
    }

    /// Returns `(start_depth, end_depth)` per rank.
    pub fn layer_depths(&self) -> Vec<(f64, f64)> {
        self.layers
            .iter()
            .map(|l| (l.start_depth, l.end_depth))
            .collect()
    }

    /// Returns the thickness per rank.
    pub fn thicknesses(&self) -> Vec<f64> {
        self.layers.iter().map(|l| l.thickness).collect()
    }

    /// Returns the physical width of each wavelet scale.
    pub fn physical_widths(&self) -> &[f64] {
        self.transform.physical_widths()
    }

    /// Returns the disjoint runs of equal rank at the finest scale.
    pub fn finest_runs(&self) -> Vec<FinestRun> {
        finest_runs(&self.labels)
    }

    /// Returns the full-size matrix of normalised layer importance.
    pub fn importance_matrix(&self) -> Array2<f64> {
        importance_matrix(&self.labels, &self.raw_importance())
    }

    /// Returns the raw wavelet bank `[2 * n_data + 2, n_wavelet]`.
    ///
    /// # Errors
    ///
    /// Propagates wavelet construction errors as [`LayerError::Wavelet`].
    pub fn wavelet_matrix(&self) -> Result<Array2<f64>, LayerError> {
        Ok(self.transform.wavelet_matrix()?)
    }
}

/// Segments, reconciles, ranks and bounds the layers of a transformed trace.
///
/// A transform without scales yields an empty layer set.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`LayerError::InvalidConfig`] | invalid configuration |
/// | [`LayerError::OrphanWithoutNeighbor`] | inconsistent label state during reconciliation |
/// | [`LayerError::MissingFromFinestScale`] | a rank missing from the finest scale |
pub fn layer_trace(
    transform: WaveletTransform,
    config: &LayerConfig,
) -> Result<LayeredTrace, LayerError> {
    config.validate()?;

    let coefficients = transform.coefficients();
    let segmentation = label_regions(coefficients, config.zero_tolerance());
    let state = reconcile(segmentation, coefficients, config)?;
    let summary = state.summary();
    let ranking = rank_layers(state, coefficients);
    let layers = extract_layers(&ranking, transform.depth(), transform.depth_step())?;

    if layers.is_empty() {
        warn!(
            n_data = transform.n_data(),
            n_wavelet = transform.n_wavelet(),
            "no layers found"
        );
    } else {
        info!(
            n_layer = layers.len(),
            regions = summary.initial,
            "layered trace"
        );
    }

    Ok(LayeredTrace {
        labels: ranking.into_labels(),
        transform,
        layers,
        summary,
    })
}

/// Runs the wavelet transform and layering in one call.
///
/// # Errors
///
/// Returns [`LayerError::Wavelet`] for transform failures, otherwise see
/// [`layer_trace`].
pub fn analyze_trace(
    trace: &Trace,
    transform_config: &TransformConfig,
    layer_config: &LayerConfig,
) -> Result<LayeredTrace, LayerError> {
    let transform = wavelet_transform(trace, transform_config)?;
    layer_trace(transform, layer_config)
}

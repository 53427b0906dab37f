//! Multi-scale second-derivative wavelet transform.
//!
//! The trace is mean-centred, extended with an odd-symmetric mirror and
//! transformed to the frequency domain once. Each scale then only needs the
//! spectrum of its own wavelet, a pointwise product and an inverse FFT.

use std::sync::atomic::{AtomicUsize, Ordering};

use ndarray::Array2;
use num_complex::Complex;
use rayon::prelude::*;
use rustfft::{Fft, FftPlanner};
use tracing::{debug, warn};

use crate::error::WaveletError;
use crate::kernel::{MIN_FUNCTIONAL_WIDTH, second_derivative_wavelet};
use crate::trace::Trace;

/// Receives a notification each time one wavelet scale has been computed.
///
/// Scales may finish out of order when the transform runs in parallel;
/// `completed` counts finished scales. Any `Fn(width, completed, total)`
/// closure that is `Sync` is an observer.
pub trait ScaleObserver: Sync {
    /// Called once per finished scale.
    fn scale_done(&self, width: usize, completed: usize, total: usize);
}

impl<F> ScaleObserver for F
where
    F: Fn(usize, usize, usize) + Sync,
{
    fn scale_done(&self, width: usize, completed: usize, total: usize) {
        self(width, completed, total)
    }
}

/// Configuration for the multi-scale transform.
///
/// Wavelet widths run `first_width, first_width + width_step, ...` up to
/// `min(3n - 1, 2n + 2)` for a trace of `n` samples, optionally capped by
/// `max_width`.
///
/// # Example
///
/// ```
/// use strata_wavelet::TransformConfig;
///
/// let config = TransformConfig::new().with_max_width(64).with_parallel(false);
/// assert_eq!(config.first_width(), 8);
/// assert_eq!(config.max_width(), Some(64));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct TransformConfig {
    /// Functional width of the finest wavelet.
    first_width: usize,
    /// Increment between consecutive widths.
    width_step: usize,
    /// Optional upper bound on the functional width.
    max_width: Option<usize>,
    /// Whether scales are computed on the rayon thread pool.
    parallel: bool,
}

impl TransformConfig {
    /// Creates a new `TransformConfig` with default parameters.
    ///
    /// Defaults: `first_width = 8`, `width_step = 4`, `max_width = None`,
    /// `parallel = true`.
    pub fn new() -> Self {
        Self {
            first_width: 8,
            width_step: 4,
            max_width: None,
            parallel: true,
        }
    }

    /// Sets the functional width of the finest wavelet.
    pub fn with_first_width(mut self, first_width: usize) -> Self {
        self.first_width = first_width;
        self
    }

    /// Sets the increment between consecutive widths.
    pub fn with_width_step(mut self, width_step: usize) -> Self {
        self.width_step = width_step;
        self
    }

    /// Caps the functional width of the coarsest wavelet.
    pub fn with_max_width(mut self, max_width: usize) -> Self {
        self.max_width = Some(max_width);
        self
    }

    /// Enables or disables the parallel per-scale map.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Returns the functional width of the finest wavelet.
    pub fn first_width(&self) -> usize {
        self.first_width
    }

    /// Returns the increment between consecutive widths.
    pub fn width_step(&self) -> usize {
        self.width_step
    }

    /// Returns the width cap, if set.
    pub fn max_width(&self) -> Option<usize> {
        self.max_width
    }

    /// Returns whether scales are computed in parallel.
    pub fn parallel(&self) -> bool {
        self.parallel
    }

    /// Validates this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`WaveletError::InvalidConfig`] if `width_step` is zero,
    /// `first_width` is below [`MIN_FUNCTIONAL_WIDTH`], or either is odd.
    /// The mirror-extended trace always has even length, so only even widths
    /// centre exactly.
    pub fn validate(&self) -> Result<(), WaveletError> {
        if self.width_step == 0 {
            return Err(WaveletError::InvalidConfig(
                "width_step must be > 0".to_string(),
            ));
        }
        if self.first_width < MIN_FUNCTIONAL_WIDTH {
            return Err(WaveletError::InvalidConfig(format!(
                "first_width must be >= {MIN_FUNCTIONAL_WIDTH}"
            )));
        }
        if self.first_width % 2 != 0 || self.width_step % 2 != 0 {
            return Err(WaveletError::InvalidConfig(format!(
                "first_width ({}) and width_step ({}) must be even",
                self.first_width, self.width_step
            )));
        }
        Ok(())
    }
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of a multi-scale wavelet transform.
///
/// Holds the prepared trace together with the `[n_data, n_wavelet]` response
/// matrix, the functional widths used, and their physical extent in depth
/// units.
#[derive(Clone, Debug)]
pub struct WaveletTransform {
    trace: Trace,
    coefficients: Array2<f64>,
    widths: Vec<usize>,
    physical_widths: Vec<f64>,
}

impl WaveletTransform {
    /// Returns the prepared trace the transform was computed on.
    pub fn trace(&self) -> &Trace {
        &self.trace
    }

    /// Returns the prepared depths.
    pub fn depth(&self) -> &[f64] {
        self.trace.depth()
    }

    /// Returns the prepared (uncentred) values.
    pub fn data(&self) -> &[f64] {
        self.trace.values()
    }

    /// Returns the mean depth step.
    pub fn depth_step(&self) -> f64 {
        self.trace.depth_step()
    }

    /// Returns the response matrix `[n_data, n_wavelet]`.
    pub fn coefficients(&self) -> &Array2<f64> {
        &self.coefficients
    }

    /// Returns the functional width of each column, finest first.
    pub fn widths(&self) -> &[usize] {
        &self.widths
    }

    /// Returns the physical width `(w + 1) / 3 * depth_step` of each column.
    pub fn physical_widths(&self) -> &[f64] {
        &self.physical_widths
    }

    /// Returns the number of samples.
    pub fn n_data(&self) -> usize {
        self.trace.len()
    }

    /// Returns the number of wavelet scales.
    pub fn n_wavelet(&self) -> usize {
        self.widths.len()
    }

    /// Returns the length of the mirror-extended sequence, `2 * n_data + 2`.
    pub fn extended_len(&self) -> usize {
        2 * self.n_data() + 2
    }

    /// Rebuilds the wavelet bank as a `[extended_len, n_wavelet]` matrix,
    /// one zero-padded wavelet per column.
    ///
    /// # Errors
    ///
    /// Propagates [`WaveletError`] from wavelet construction.
    pub fn wavelet_matrix(&self) -> Result<Array2<f64>, WaveletError> {
        let len = self.extended_len();
        let mut matrix = Array2::zeros((len, self.n_wavelet()));
        for (j, &width) in self.widths.iter().enumerate() {
            let wavelet = second_derivative_wavelet(width, len)?;
            for (cell, &tap) in matrix.column_mut(j).iter_mut().zip(wavelet.taps()) {
                *cell = tap;
            }
        }
        Ok(matrix)
    }
}

/// Returns the functional widths used for a trace of `n_data` samples.
///
/// # Example
///
/// ```
/// use strata_wavelet::{TransformConfig, scale_widths};
///
/// let widths = scale_widths(32, &TransformConfig::new());
/// assert_eq!(widths.first(), Some(&8));
/// assert_eq!(widths.last(), Some(&64));
/// ```
pub fn scale_widths(n_data: usize, config: &TransformConfig) -> Vec<usize> {
    if config.width_step == 0 {
        return Vec::new();
    }
    let mut bound = (3 * n_data).saturating_sub(1).min(2 * n_data + 2);
    if let Some(cap) = config.max_width {
        bound = bound.min(cap);
    }
    (config.first_width..=bound)
        .step_by(config.width_step)
        .collect()
}

/// Computes the multi-scale wavelet transform of a trace.
///
/// A constant trace carries no structure and yields zero scales.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::InvalidConfig`] | invalid configuration |
/// | [`WaveletError::InvalidWaveletLength`] | a wavelet does not fit the extended trace |
/// | [`WaveletError::InvalidWaveletWidth`] | a wavelet width is too narrow |
pub fn wavelet_transform(
    trace: &Trace,
    config: &TransformConfig,
) -> Result<WaveletTransform, WaveletError> {
    wavelet_transform_observed(trace, config, &|_: usize, _: usize, _: usize| {})
}

/// Same as [`wavelet_transform`], reporting per-scale progress to `observer`.
///
/// # Errors
///
/// See [`wavelet_transform`]. Any failing scale aborts the whole transform.
pub fn wavelet_transform_observed(
    trace: &Trace,
    config: &TransformConfig,
    observer: &dyn ScaleObserver,
) -> Result<WaveletTransform, WaveletError> {
    config.validate()?;

    let values = trace.values();
    let n = values.len();

    let constant = values.iter().all(|&v| v == values[0]);
    let widths = if constant {
        warn!(n_data = n, "trace has zero variance, no wavelet scales computed");
        Vec::new()
    } else {
        scale_widths(n, config)
    };

    let mean = values.iter().sum::<f64>() / n as f64;
    let centred: Vec<f64> = values.iter().map(|&v| v - mean).collect();

    // Odd-symmetric extension: -reversed, 0, 0, values.
    let len = 2 * n + 2;
    let mut spectrum: Vec<Complex<f64>> = centred
        .iter()
        .rev()
        .map(|&v| Complex::new(-v, 0.0))
        .chain(std::iter::repeat_n(Complex::new(0.0, 0.0), 2))
        .chain(centred.iter().map(|&v| Complex::new(v, 0.0)))
        .collect();

    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(len);
    let inverse = planner.plan_fft_inverse(len);
    forward.process(&mut spectrum);

    let total = widths.len();
    let completed = AtomicUsize::new(0);
    let column = |&width: &usize| -> Result<Vec<f64>, WaveletError> {
        let response = scale_response(width, n, &spectrum, forward.as_ref(), inverse.as_ref())?;
        let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(width, done, total, "wavelet scale computed");
        observer.scale_done(width, done, total);
        Ok(response)
    };

    let columns: Vec<Vec<f64>> = if config.parallel {
        widths.par_iter().map(&column).collect::<Result<_, _>>()?
    } else {
        widths.iter().map(&column).collect::<Result<_, _>>()?
    };

    let mut coefficients = Array2::zeros((n, total));
    for (j, response) in columns.iter().enumerate() {
        for (cell, &v) in coefficients.column_mut(j).iter_mut().zip(response) {
            *cell = v;
        }
    }

    let depth_step = trace.depth_step();
    let physical_widths = widths
        .iter()
        .map(|&w| (w as f64 + 1.0) / 3.0 * depth_step)
        .collect();

    Ok(WaveletTransform {
        trace: trace.clone(),
        coefficients,
        widths,
        physical_widths,
    })
}

/// Convolves the extended trace (given by its spectrum) with one wavelet and
/// returns the `n` samples aligned with the original trace.
fn scale_response(
    width: usize,
    n: usize,
    spectrum: &[Complex<f64>],
    forward: &dyn Fft<f64>,
    inverse: &dyn Fft<f64>,
) -> Result<Vec<f64>, WaveletError> {
    let len = spectrum.len();
    let wavelet = second_derivative_wavelet(width, len)?;

    let mut product: Vec<Complex<f64>> = wavelet
        .taps()
        .iter()
        .map(|&t| Complex::new(t, 0.0))
        .collect();
    forward.process(&mut product);
    for (p, &s) in product.iter_mut().zip(spectrum) {
        *p = *p * s;
    }
    inverse.process(&mut product);

    // rustfft is unnormalized
    let norm = 1.0 / len as f64;
    Ok(product[1..=n].iter().map(|c| c.re * norm).collect())
}

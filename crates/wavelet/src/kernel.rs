//! Second-derivative wavelet construction.

use tracing::warn;

use crate::error::WaveletError;

/// Smallest functional width that still carries the full wavelet shape.
pub const MIN_FUNCTIONAL_WIDTH: usize = 3;

/// Control points of the canonical double-derivative shape on `x = 0..=4`.
const SHAPE: [f64; 5] = [0.0, -0.5, 1.0, -0.5, 0.0];

/// A discrete, zero-mean, symmetric second-derivative wavelet.
///
/// The functional (non-zero) support sits in the middle of a zero-padded
/// window of `total_length` taps. Taps sum to zero and have L2 norm `0.5`.
///
/// # Example
///
/// ```
/// use strata_wavelet::second_derivative_wavelet;
///
/// let wavelet = second_derivative_wavelet(8, 12).unwrap();
/// assert_eq!(wavelet.taps().len(), 12);
/// assert_eq!(wavelet.functional_width(), 8);
/// let energy: f64 = wavelet.taps().iter().map(|t| t * t).sum();
/// assert!((energy.sqrt() - 0.5).abs() < 1e-12);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct SecondDerivativeWavelet {
    functional_width: usize,
    total_length: usize,
    taps: Vec<f64>,
}

impl SecondDerivativeWavelet {
    /// Returns the functional width actually used (after parity adjustment).
    pub fn functional_width(&self) -> usize {
        self.functional_width
    }

    /// Returns the total number of taps including zero padding.
    pub fn total_length(&self) -> usize {
        self.total_length
    }

    /// Returns the wavelet taps.
    pub fn taps(&self) -> &[f64] {
        &self.taps
    }

    /// Consumes the wavelet and returns its taps.
    pub fn into_taps(self) -> Vec<f64> {
        self.taps
    }
}

/// Builds a second-derivative wavelet of `functional_width` non-zero taps
/// centred in a window of `total_length` taps.
///
/// When the parities of the two lengths differ the functional width is
/// reduced by one so the support can be centred exactly; a warning is
/// logged and construction continues.
///
/// # Errors
///
/// | Variant | Trigger |
/// |---------|---------|
/// | [`WaveletError::InvalidWaveletLength`] | `functional_width > total_length` |
/// | [`WaveletError::InvalidWaveletWidth`] | adjusted width below [`MIN_FUNCTIONAL_WIDTH`] |
pub fn second_derivative_wavelet(
    functional_width: usize,
    total_length: usize,
) -> Result<SecondDerivativeWavelet, WaveletError> {
    if functional_width > total_length {
        return Err(WaveletError::InvalidWaveletLength {
            width: functional_width,
            total: total_length,
        });
    }

    let mut width = functional_width;
    if width % 2 != total_length % 2 {
        warn!(
            requested = functional_width,
            total_length, "wavelet width parity differs from total length, narrowing by one"
        );
        width = width.saturating_sub(1);
    }
    if width < MIN_FUNCTIONAL_WIDTH {
        return Err(WaveletError::InvalidWaveletWidth {
            width,
            min: MIN_FUNCTIONAL_WIDTH,
        });
    }

    // One half sampled at cell centres, then mirrored. Odd widths share the
    // centre tap.
    let half: Vec<f64> = (0..width.div_ceil(2))
        .map(|k| shape_at(4.0 * (k as f64 + 0.5) / width as f64))
        .collect();
    let mut support = Vec::with_capacity(width);
    support.extend_from_slice(&half);
    support.extend(half.iter().rev().skip(width % 2));

    let mean = support.iter().sum::<f64>() / width as f64;
    support.iter_mut().for_each(|t| *t -= mean);

    let norm = support.iter().map(|t| t * t).sum::<f64>().sqrt();
    if norm <= f64::EPSILON {
        return Err(WaveletError::InvalidWaveletWidth {
            width,
            min: MIN_FUNCTIONAL_WIDTH,
        });
    }
    let scale = 1.0 / (2.0 * norm);

    let pad = (total_length - width) / 2;
    let mut taps = vec![0.0; total_length];
    for (slot, &t) in taps[pad..pad + width].iter_mut().zip(&support) {
        *slot = t * scale;
    }

    Ok(SecondDerivativeWavelet {
        functional_width: width,
        total_length,
        taps,
    })
}

/// Piecewise-linear interpolation of [`SHAPE`] at `x`; zero outside `[0, 4)`.
fn shape_at(x: f64) -> f64 {
    if !(0.0..4.0).contains(&x) {
        return 0.0;
    }
    let k = x.floor() as usize;
    let frac = x - k as f64;
    SHAPE[k] + (SHAPE[k + 1] - SHAPE[k]) * frac
}

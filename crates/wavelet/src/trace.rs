//! Validated depth trace.

use tracing::debug;

use crate::error::WaveletError;

/// A validated, prepared depth trace of finite `(depth, value)` samples.
///
/// Construction normalises the input so downstream stages can rely on:
/// - depth strictly increasing (a trace recorded bottom-up is reversed)
/// - an even number of samples (the last sample is dropped if needed)
/// - all depths and values finite
///
/// The mean depth step is computed from the oriented input before the
/// parity truncation.
///
/// # Example
///
/// ```
/// use strata_wavelet::Trace;
///
/// let trace = Trace::new(vec![3.0, 2.0, 1.0, 0.0], vec![4.0, 3.0, 2.0, 1.0]).unwrap();
/// assert_eq!(trace.depth(), &[0.0, 1.0, 2.0, 3.0]);
/// assert_eq!(trace.values(), &[1.0, 2.0, 3.0, 4.0]);
/// assert!(trace.was_reversed());
/// ```
#[derive(Clone, Debug)]
pub struct Trace {
    depth: Vec<f64>,
    values: Vec<f64>,
    depth_step: f64,
    reversed: bool,
    truncated: bool,
}

impl Trace {
    /// Creates a new `Trace` after validating and preparing the samples.
    ///
    /// # Errors
    ///
    /// | Variant | Trigger |
    /// |---------|---------|
    /// | [`WaveletError::LengthMismatch`] | `depth.len() != values.len()` |
    /// | [`WaveletError::SeriesTooShort`] | fewer than 2 samples |
    /// | [`WaveletError::NonFiniteDepth`] | any depth is NaN or infinite |
    /// | [`WaveletError::NonFiniteData`] | any value is NaN or infinite |
    /// | [`WaveletError::NonMonotonicDepth`] | depth repeats or changes direction |
    pub fn new(mut depth: Vec<f64>, mut values: Vec<f64>) -> Result<Self, WaveletError> {
        if depth.len() != values.len() {
            return Err(WaveletError::LengthMismatch {
                depth: depth.len(),
                values: values.len(),
            });
        }
        let n = depth.len();
        if n < 2 {
            return Err(WaveletError::SeriesTooShort { len: n, min: 2 });
        }
        if !depth.iter().all(|d| d.is_finite()) {
            return Err(WaveletError::NonFiniteDepth);
        }
        if !values.iter().all(|v| v.is_finite()) {
            return Err(WaveletError::NonFiniteData);
        }

        let reversed = mean_increment(&depth) < 0.0;
        if reversed {
            depth.reverse();
            values.reverse();
        }

        if let Some(index) = (1..n).find(|&i| depth[i] <= depth[i - 1]) {
            return Err(WaveletError::NonMonotonicDepth { index });
        }

        let depth_step = mean_increment(&depth);

        let truncated = n % 2 == 1;
        if truncated {
            depth.pop();
            values.pop();
            debug!(len = n, "dropped last sample to reach even length");
        }

        Ok(Self {
            depth,
            values,
            depth_step,
            reversed,
            truncated,
        })
    }

    /// Returns the prepared depths (strictly increasing).
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Returns the prepared values, aligned with [`depth`](Self::depth).
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Returns the mean depth increment between samples.
    pub fn depth_step(&self) -> f64 {
        self.depth_step
    }

    /// Returns the number of prepared samples (always even).
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if the trace holds no samples.
    ///
    /// Note: a valid `Trace` always holds at least 2 samples.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns `true` if the input was recorded with decreasing depth.
    pub fn was_reversed(&self) -> bool {
        self.reversed
    }

    /// Returns `true` if the last input sample was dropped for parity.
    pub fn was_truncated(&self) -> bool {
        self.truncated
    }
}

/// Mean step between consecutive depths: `(last - first) / (n - 1)`.
fn mean_increment(depth: &[f64]) -> f64 {
    let n = depth.len();
    (depth[n - 1] - depth[0]) / (n - 1) as f64
}

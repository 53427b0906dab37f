//! Error types for the strata-wavelet crate.

/// Error type for all fallible operations in the strata-wavelet crate.
///
/// Covers trace validation failures, wavelet construction problems, and
/// invalid transform settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WaveletError {
    /// Returned when the depth and value sequences differ in length.
    #[error("length mismatch: {depth} depths but {values} values")]
    LengthMismatch {
        /// Number of depth samples provided.
        depth: usize,
        /// Number of value samples provided.
        values: usize,
    },

    /// Returned when the input trace is shorter than the minimum required length.
    #[error("trace too short: got {len} samples, need at least {min}")]
    SeriesTooShort {
        /// Number of samples provided.
        len: usize,
        /// Minimum number of samples required.
        min: usize,
    },

    /// Returned when the measured values contain NaN or infinity.
    #[error("trace values contain non-finite data")]
    NonFiniteData,

    /// Returned when the depth column contains NaN or infinity.
    #[error("trace depths contain non-finite data")]
    NonFiniteDepth,

    /// Returned when depth is not strictly monotonic.
    #[error("depth is not strictly monotonic at sample {index}")]
    NonMonotonicDepth {
        /// Index (after orientation) of the first offending sample.
        index: usize,
    },

    /// Returned when a wavelet's functional width exceeds its total length.
    #[error("invalid wavelet length: functional width {width} exceeds total length {total}")]
    InvalidWaveletLength {
        /// Requested functional width.
        width: usize,
        /// Requested total tap count.
        total: usize,
    },

    /// Returned when the functional width is too narrow to carry the shape.
    #[error("invalid wavelet width: {width} is below the minimum of {min}")]
    InvalidWaveletWidth {
        /// Functional width after parity adjustment.
        width: usize,
        /// Minimum supported functional width.
        min: usize,
    },

    /// Returned when transform settings are inconsistent.
    #[error("invalid transform config: {0}")]
    InvalidConfig(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_length_mismatch() {
        let err = WaveletError::LengthMismatch {
            depth: 10,
            values: 9,
        };
        assert_eq!(err.to_string(), "length mismatch: 10 depths but 9 values");
    }

    #[test]
    fn error_series_too_short() {
        let err = WaveletError::SeriesTooShort { len: 1, min: 2 };
        assert_eq!(
            err.to_string(),
            "trace too short: got 1 samples, need at least 2"
        );
    }

    #[test]
    fn error_non_finite() {
        assert_eq!(
            WaveletError::NonFiniteData.to_string(),
            "trace values contain non-finite data"
        );
        assert_eq!(
            WaveletError::NonFiniteDepth.to_string(),
            "trace depths contain non-finite data"
        );
    }

    #[test]
    fn error_non_monotonic() {
        let err = WaveletError::NonMonotonicDepth { index: 4 };
        assert_eq!(err.to_string(), "depth is not strictly monotonic at sample 4");
    }

    #[test]
    fn error_invalid_wavelet_length() {
        let err = WaveletError::InvalidWaveletLength {
            width: 12,
            total: 10,
        };
        assert_eq!(
            err.to_string(),
            "invalid wavelet length: functional width 12 exceeds total length 10"
        );
    }

    #[test]
    fn error_invalid_wavelet_width() {
        let err = WaveletError::InvalidWaveletWidth { width: 2, min: 3 };
        assert_eq!(
            err.to_string(),
            "invalid wavelet width: 2 is below the minimum of 3"
        );
    }

    #[test]
    fn error_invalid_config() {
        let err = WaveletError::InvalidConfig("width_step must be > 0".into());
        assert_eq!(
            err.to_string(),
            "invalid transform config: width_step must be > 0"
        );
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<WaveletError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<WaveletError>();
    }
}

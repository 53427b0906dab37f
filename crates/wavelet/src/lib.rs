//! # strata-wavelet
//!
//! Second-derivative wavelet bank and multi-scale transform for depth traces.
//!
//! ## Analysis Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["Trace::new(depth, values)?"] -->|"orient, validate, truncate"| B["Trace"]
//!     B -->|"wavelet_transform(&trace, &config)?"| C["WaveletTransform"]
//!     C --> D[".coefficients()"]
//!     C --> E[".physical_widths()"]
//!     C --> F[".wavelet_matrix()?"]
//! ```
//!
//! ## Wavelet Widths
//!
//! | Setting | Default | Meaning |
//! |---------|---------|---------|
//! | `first_width` | 8 | functional width of the finest wavelet |
//! | `width_step` | 4 | increment between consecutive widths |
//! | `max_width` | none | optional cap below `min(3n - 1, 2n + 2)` |
//!
//! ## Quick Start
//!
//! ```
//! use strata_wavelet::{Trace, TransformConfig, wavelet_transform};
//!
//! let depth: Vec<f64> = (0..64).map(f64::from).collect();
//! let values: Vec<f64> = (0..64).map(|i| if i < 32 { 0.0 } else { 10.0 }).collect();
//! let trace = Trace::new(depth, values).unwrap();
//!
//! let result = wavelet_transform(&trace, &TransformConfig::new()).unwrap();
//! assert_eq!(result.n_data(), 64);
//! assert_eq!(result.n_wavelet(), 31);
//! ```

mod error;
mod kernel;
mod trace;
mod transform;

pub use error::WaveletError;
pub use kernel::{MIN_FUNCTIONAL_WIDTH, SecondDerivativeWavelet, second_derivative_wavelet};
pub use trace::Trace;
pub use transform::{
    ScaleObserver, TransformConfig, WaveletTransform, scale_widths, wavelet_transform,
    wavelet_transform_observed,
};

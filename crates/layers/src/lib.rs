//! # strata-layers
//!
//! Hierarchical layer detection on a multi-scale wavelet transform, and
//! re-blocking of the trace by a selection criterion.
//!
//! ## Pipeline
//!
//! ```mermaid
//! graph LR
//!     A["WaveletTransform"] -->|"label_regions"| B["Segmentation"]
//!     B -->|"reconcile"| C["ReconciliationState"]
//!     C -->|"rank_layers"| D["Ranking"]
//!     D -->|"extract_layers"| E["LayeredTrace"]
//!     E -->|"select_layers(mode, value)"| F["Selection"]
//! ```
//!
//! [`layer_trace`] runs the four middle stages; [`analyze_trace`] also runs
//! the transform.
//!
//! ## Selection Modes
//!
//! | Mode | Picks |
//! |------|-------|
//! | [`SelectionMode::MaxOperatorWidth`] | ranks at the coarsest scale with physical width ≤ value |
//! | [`SelectionMode::TopCount`] | ranks `1..=floor(value)` |
//! | [`SelectionMode::TopPercent`] | ranks `1..=floor(value * n_layer / 100)` |
//! | [`SelectionMode::MinThickness`] | layers with thickness ≥ value |
//! | [`SelectionMode::MaxThickness`] | layers with thickness ≤ value |
//!
//! ## Quick Start
//!
//! ```
//! use strata_layers::{LayerConfig, SelectionMode, analyze_trace, select_layers};
//! use strata_wavelet::{Trace, TransformConfig};
//!
//! let depth: Vec<f64> = (0..64).map(f64::from).collect();
//! let values: Vec<f64> = (0..64).map(|i| if i < 32 { 0.0 } else { 10.0 }).collect();
//! let trace = Trace::new(depth, values).unwrap();
//!
//! let layered = analyze_trace(&trace, &TransformConfig::new(), &LayerConfig::new()).unwrap();
//! assert_eq!(layered.n_layer(), 2);
//!
//! let selection = select_layers(&layered, SelectionMode::TopCount, 1.0).unwrap();
//! assert_eq!(selection.n_layer(), 2);
//! ```

mod boundary;
mod error;
mod layering;
mod rank;
mod reconcile;
mod segment;
mod select;
mod stats;

pub use boundary::{FinestRun, Layer, extract_layers, finest_runs};
pub use error::LayerError;
pub use layering::{LayerConfig, LayeredTrace, analyze_trace, layer_trace};
pub use rank::{Ranking, importance_matrix, normalize_importance, rank_layers};
pub use reconcile::{Cell, ReconcileSummary, ReconciliationState, reconcile};
pub use segment::{NullResponse, Segmentation, Sign, label_regions};
pub use select::{Block, Selection, SelectionMode, StairSteps, select_layers};

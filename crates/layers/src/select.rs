//! Re-blocking a layered trace by a selection criterion.
//!
//! A selection picks a subset of ranked layers and cuts the trace at their
//! boundaries. The resulting blocks always cover every sample exactly once,
//! whatever the criterion selects.

use std::collections::BTreeSet;

use tracing::debug;

use crate::error::LayerError;
use crate::layering::LayeredTrace;
use crate::stats;

/// Criterion used to pick layers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SelectionMode {
    /// Ranks present at the coarsest scale whose physical width is at most
    /// the value.
    MaxOperatorWidth,
    /// Ranks `1..=floor(value)`.
    TopCount,
    /// Ranks `1..=floor(value * n_layer / 100)`.
    TopPercent,
    /// Layers at least `value` thick.
    MinThickness,
    /// Layers at most `value` thick.
    MaxThickness,
}

impl SelectionMode {
    /// All modes, in declaration order.
    pub const ALL: [SelectionMode; 5] = [
        SelectionMode::MaxOperatorWidth,
        SelectionMode::TopCount,
        SelectionMode::TopPercent,
        SelectionMode::MinThickness,
        SelectionMode::MaxThickness,
    ];

    /// Parses a mode name, ignoring case, `-` and `_`.
    ///
    /// `"top-n"` is accepted as an alias of `"top-count"`.
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::UnknownSelectionMode`] for any other name.
    ///
    /// # Example
    ///
    /// ```
    /// use strata_layers::SelectionMode;
    ///
    /// assert_eq!(SelectionMode::from_name("top-count").unwrap(), SelectionMode::TopCount);
    /// assert_eq!(SelectionMode::from_name("Min_Thickness").unwrap(), SelectionMode::MinThickness);
    /// ```
    pub fn from_name(name: &str) -> Result<Self, LayerError> {
        let key: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "maxoperatorwidth" => Ok(SelectionMode::MaxOperatorWidth),
            "topcount" | "topn" => Ok(SelectionMode::TopCount),
            "toppercent" => Ok(SelectionMode::TopPercent),
            "minthickness" => Ok(SelectionMode::MinThickness),
            "maxthickness" => Ok(SelectionMode::MaxThickness),
            _ => Err(LayerError::UnknownSelectionMode(name.to_string())),
        }
    }

    /// Returns the canonical kebab-case name.
    pub fn name(self) -> &'static str {
        match self {
            SelectionMode::MaxOperatorWidth => "max-operator-width",
            SelectionMode::TopCount => "top-count",
            SelectionMode::TopPercent => "top-percent",
            SelectionMode::MinThickness => "min-thickness",
            SelectionMode::MaxThickness => "max-thickness",
        }
    }
}

/// One contiguous block of the re-blocked trace.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// First sample index.
    pub start_index: usize,
    /// Last sample index.
    pub end_index: usize,
    /// Depth at `start_index`.
    pub top_depth: f64,
    /// Depth at `end_index`.
    pub bottom_depth: f64,
    /// `bottom_depth - top_depth + depth_step`.
    pub thickness: f64,
    /// Mean of the raw values in the block.
    pub mean: f64,
    /// Median of the raw values in the block.
    pub median: f64,
    /// Sample variance of the raw values; 0 for a single sample.
    pub variance: f64,
}

/// Doubled sequences for drawing blocks as a piecewise-constant curve.
///
/// Each block contributes two points: its top edge and its bottom edge.
/// Interior edges sit midway between the neighbouring samples of adjacent
/// blocks, so consecutive blocks share an edge even when the depth spacing is
/// irregular. The two outer edges sit half a mean depth step beyond the first
/// and last sample.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StairSteps {
    /// Edge depths.
    pub depth: Vec<f64>,
    /// Block mean at each edge.
    pub mean: Vec<f64>,
    /// Block median at each edge.
    pub median: Vec<f64>,
}

/// Result of [`select_layers`].
///
/// Carries the prepared depth and data it was selected from, so it can be
/// plotted without the originating [`LayeredTrace`].
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    mode: SelectionMode,
    value: f64,
    selected_ranks: Vec<usize>,
    blocks: Vec<Block>,
    depth: Vec<f64>,
    data: Vec<f64>,
    depth_step: f64,
}

impl Selection {
    /// Returns the mode the selection was made with.
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Returns the selection value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Returns the selected ranks in ascending order.
    pub fn selected_ranks(&self) -> &[usize] {
        &self.selected_ranks
    }

    /// Returns the blocks, ordered by depth.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Returns the number of blocks.
    pub fn n_layer(&self) -> usize {
        self.blocks.len()
    }

    /// Returns the prepared depths of the trace.
    pub fn depth(&self) -> &[f64] {
        &self.depth
    }

    /// Returns the prepared values of the trace.
    pub fn data(&self) -> &[f64] {
        &self.data
    }

    /// Returns the mean depth step of the trace.
    pub fn depth_step(&self) -> f64 {
        self.depth_step
    }

    /// Builds the stair-step plot arrays.
    pub fn stair_steps(&self) -> StairSteps {
        let n = 2 * self.blocks.len();
        let half = self.depth_step / 2.0;
        let depth = &self.depth;
        let last = depth.len().saturating_sub(1);
        let mut steps = StairSteps {
            depth: Vec::with_capacity(n),
            mean: Vec::with_capacity(n),
            median: Vec::with_capacity(n),
        };
        for block in &self.blocks {
            let top = match block.start_index {
                0 => block.top_depth - half,
                start => (depth[start - 1] + depth[start]) / 2.0,
            };
            let bottom = if block.end_index >= last {
                block.bottom_depth + half
            } else {
                (depth[block.end_index] + depth[block.end_index + 1]) / 2.0
            };
            steps.depth.push(top);
            steps.depth.push(bottom);
            steps.mean.extend([block.mean; 2]);
            steps.median.extend([block.median; 2]);
        }
        steps
    }
}

/// Selects layers by `mode` and re-blocks the trace at their boundaries.
///
/// The blocks are contiguous, sorted and cover `[0, n_data)`. When nothing
/// is selected (or the trace has no layers) a single block spans the trace.
///
/// # Errors
///
/// Returns [`LayerError::InvalidSelectionValue`] if `value` is negative or
/// not finite.
///
/// # Example
///
/// ```
/// use strata_layers::{LayerConfig, SelectionMode, analyze_trace, select_layers};
/// use strata_wavelet::{Trace, TransformConfig};
///
/// let depth: Vec<f64> = (0..64).map(f64::from).collect();
/// let values: Vec<f64> = (0..64).map(|i| if i < 32 { 0.0 } else { 10.0 }).collect();
/// let trace = Trace::new(depth, values).unwrap();
/// let layered = analyze_trace(&trace, &TransformConfig::new(), &LayerConfig::new()).unwrap();
///
/// let selection = select_layers(&layered, SelectionMode::TopCount, 1.0).unwrap();
/// assert_eq!(selection.blocks().first().map(|b| b.start_index), Some(0));
/// assert_eq!(selection.blocks().last().map(|b| b.end_index), Some(63));
/// ```
pub fn select_layers(
    layered: &LayeredTrace,
    mode: SelectionMode,
    value: f64,
) -> Result<Selection, LayerError> {
    if !value.is_finite() || value < 0.0 {
        return Err(LayerError::InvalidSelectionValue { value });
    }

    let selected_ranks = selected_ranks(layered, mode, value);
    let spans: Vec<(usize, usize)> = selected_ranks
        .iter()
        .filter_map(|&rank| layered.layer(rank))
        .map(|layer| (layer.start_index, layer.end_index))
        .collect();

    let depth = layered.depth();
    let data = layered.data();
    let depth_step = layered.depth_step();
    let blocks: Vec<Block> = cover_blocks(&spans, layered.n_data())
        .into_iter()
        .map(|(start, end)| {
            let values = &data[start..=end];
            Block {
                start_index: start,
                end_index: end,
                top_depth: depth[start],
                bottom_depth: depth[end],
                thickness: depth[end] - depth[start] + depth_step,
                mean: stats::mean(values),
                median: stats::median(values),
                variance: stats::variance(values),
            }
        })
        .collect();

    debug!(
        mode = mode.name(),
        value,
        selected = selected_ranks.len(),
        blocks = blocks.len(),
        "selected layers"
    );

    Ok(Selection {
        mode,
        value,
        selected_ranks,
        blocks,
        depth: depth.to_vec(),
        data: data.to_vec(),
        depth_step,
    })
}

/// Ranks picked by `mode`, ascending.
fn selected_ranks(layered: &LayeredTrace, mode: SelectionMode, value: f64) -> Vec<usize> {
    let n_layer = layered.n_layer();
    match mode {
        SelectionMode::MaxOperatorWidth => {
            let Some(col) = layered
                .physical_widths()
                .iter()
                .rposition(|&width| width <= value)
            else {
                return Vec::new();
            };
            let ranks: BTreeSet<usize> = layered
                .labels()
                .column(col)
                .iter()
                .copied()
                .filter(|&rank| rank > 0)
                .collect();
            ranks.into_iter().collect()
        }
        SelectionMode::TopCount => (1..=(value.floor() as usize).min(n_layer)).collect(),
        SelectionMode::TopPercent => {
            let count = (value * n_layer as f64 / 100.0).floor() as usize;
            (1..=count.min(n_layer)).collect()
        }
        SelectionMode::MinThickness => layered
            .layers()
            .iter()
            .filter(|layer| layer.thickness >= value)
            .map(|layer| layer.rank)
            .collect(),
        SelectionMode::MaxThickness => layered
            .layers()
            .iter()
            .filter(|layer| layer.thickness <= value)
            .map(|layer| layer.rank)
            .collect(),
    }
}

/// Cuts `[0, n_data)` into contiguous blocks at the boundaries of `spans`.
///
/// Every span contributes its last index and the index before its first as
/// cut points. The pool is consumed smallest-first, each cut closing the
/// block that began right after the previous one; the last sample always
/// closes the final block.
fn cover_blocks(spans: &[(usize, usize)], n_data: usize) -> Vec<(usize, usize)> {
    let Some(last) = n_data.checked_sub(1) else {
        return Vec::new();
    };
    let mut cuts: BTreeSet<usize> = BTreeSet::new();
    for &(start, end) in spans {
        if end < last {
            cuts.insert(end);
        }
        if start > 0 {
            cuts.insert(start - 1);
        }
    }
    cuts.insert(last);

    let mut blocks = Vec::with_capacity(cuts.len());
    let mut next = 0;
    for cut in cuts {
        blocks.push((next, cut));
        next = cut + 1;
    }
    blocks
}

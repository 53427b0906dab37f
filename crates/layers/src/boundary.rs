//! Layer boundaries read from the finest wavelet scale.

use ndarray::Array2;

use crate::error::LayerError;
use crate::rank::Ranking;

/// One ranked layer.
///
/// `start_index..=end_index` is the span between the first and last sample
/// bearing this rank at the finest scale. A layer that reaches the finest
/// scale in several runs encloses the layers nested between them, so spans
/// of different layers are either nested or disjoint.
#[derive(Clone, Debug, PartialEq)]
pub struct Layer {
    /// Rank, 1 = most important.
    pub rank: usize,
    /// `|mean response|` over the layer's cells.
    pub raw_importance: f64,
    /// Normalised importance; exactly 1 for rank 1.
    pub importance: f64,
    /// First sample index at the finest scale.
    pub start_index: usize,
    /// Last sample index at the finest scale.
    pub end_index: usize,
    /// Depth at `start_index`.
    pub start_depth: f64,
    /// Depth at `end_index`.
    pub end_depth: f64,
    /// `end_depth - start_depth + depth_step`.
    pub thickness: f64,
}

/// A maximal run of equal rank in the finest-scale column.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FinestRun {
    /// Rank carried by the run.
    pub rank: usize,
    /// First sample index.
    pub start: usize,
    /// Last sample index.
    pub end: usize,
}

/// Builds one [`Layer`] per rank from the finest-scale column.
///
/// # Errors
///
/// Returns [`LayerError::MissingFromFinestScale`] if a rank has no sample in
/// column 0.
pub fn extract_layers(
    ranking: &Ranking,
    depth: &[f64],
    depth_step: f64,
) -> Result<Vec<Layer>, LayerError> {
    let n_ranks = ranking.n_ranks();
    let mut spans: Vec<Option<(usize, usize)>> = vec![None; n_ranks];

    let labels = ranking.labels();
    if labels.ncols() > 0 {
        for (row, &rank) in labels.column(0).iter().enumerate() {
            if rank == 0 || rank > n_ranks {
                continue;
            }
            let span = &mut spans[rank - 1];
            *span = Some(match *span {
                Some((start, _)) => (start, row),
                None => (row, row),
            });
        }
    }

    spans
        .into_iter()
        .enumerate()
        .map(|(i, span)| {
            let rank = i + 1;
            let (start_index, end_index) =
                span.ok_or(LayerError::MissingFromFinestScale { rank })?;
            let start_depth = depth[start_index];
            let end_depth = depth[end_index];
            Ok(Layer {
                rank,
                raw_importance: ranking.raw()[i],
                importance: ranking.importance()[i],
                start_index,
                end_index,
                start_depth,
                end_depth,
                thickness: end_depth - start_depth + depth_step,
            })
        })
        .collect()
}

/// Splits the finest-scale column of `labels` into runs of equal rank.
///
/// The runs are ordered and together cover every row exactly once. A matrix
/// without columns has no runs.
pub fn finest_runs(labels: &Array2<usize>) -> Vec<FinestRun> {
    if labels.ncols() == 0 {
        return Vec::new();
    }
    let mut runs: Vec<FinestRun> = Vec::new();
    for (row, &rank) in labels.column(0).iter().enumerate() {
        match runs.last_mut() {
            Some(run) if run.rank == rank => run.end = row,
            _ => runs.push(FinestRun {
                rank,
                start: row,
                end: row,
            }),
        }
    }
    runs
}

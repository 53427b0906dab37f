//! Reconciliation of labelled regions into finest-scale layers.
//!
//! Every surviving region must reach column 0, the finest scale, because
//! layer boundaries are read there. Regions that do not are absorbed into
//! the finer-scale neighbour at the point where they disappear.

use ndarray::Array2;
use tracing::{debug, warn};

use crate::error::LayerError;
use crate::layering::LayerConfig;
use crate::segment::{NullResponse, Segmentation, Sign};

/// A `(row, col)` cell index into the label matrix.
pub type Cell = (usize, usize);

/// Counts collected while reconciling.
///
/// `initial == surviving + null_merged + absorbed` always holds.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReconcileSummary {
    /// Regions produced by segmentation.
    pub initial: usize,
    /// Zero-response regions merged into a signed neighbour.
    pub null_merged: usize,
    /// Regions absorbed because they never reach the finest scale.
    pub absorbed: usize,
    /// Regions left after reconciliation.
    pub surviving: usize,
}

/// Label matrix together with per-label member cells and signs.
///
/// Labels are contiguous `1..=n_labels()`; `members()[label - 1]` lists the
/// cells bearing `label`.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconciliationState {
    labels: Array2<usize>,
    members: Vec<Vec<Cell>>,
    signs: Vec<Sign>,
    summary: ReconcileSummary,
}

impl ReconciliationState {
    /// Returns the label matrix.
    pub fn labels(&self) -> &Array2<usize> {
        &self.labels
    }

    /// Returns the member cells of each label, indexed by `label - 1`.
    pub fn members(&self) -> &[Vec<Cell>] {
        &self.members
    }

    /// Returns the sign each surviving region was segmented with.
    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    /// Returns the reconciliation counts.
    pub fn summary(&self) -> ReconcileSummary {
        self.summary
    }

    /// Returns the number of labels.
    pub fn n_labels(&self) -> usize {
        self.members.len()
    }

    /// Consumes the state and returns `(labels, members)`.
    pub fn into_parts(self) -> (Array2<usize>, Vec<Vec<Cell>>) {
        (self.labels, self.members)
    }

    fn from_segmentation(segmentation: Segmentation) -> Self {
        let (labels, signs) = segmentation.into_parts();
        let mut members = vec![Vec::new(); signs.len()];
        for ((row, col), &label) in labels.indexed_iter() {
            if label > 0 {
                members[label - 1].push((row, col));
            }
        }
        let summary = ReconcileSummary {
            initial: signs.len(),
            ..ReconcileSummary::default()
        };
        Self {
            labels,
            members,
            signs,
            summary,
        }
    }

    /// Moves every cell of `from` into `into`.
    fn absorb(&mut self, from: usize, into: usize) {
        let cells = std::mem::take(&mut self.members[from - 1]);
        for &cell in &cells {
            self.labels[cell] = into;
        }
        self.members[into - 1].extend(cells);
    }

    fn is_live(&self, label: usize) -> bool {
        !self.members[label - 1].is_empty()
    }
}

/// Reconciles a segmentation so every surviving label reaches column 0.
///
/// Steps:
/// 1. With [`NullResponse::Merge`], merge each zero-response region into a
///    signed neighbour one scale coarser (or, at the coarsest scale, into the
///    adjacent signed cell with the largest response).
/// 2. In ascending label order, absorb every region with no cell in column 0
///    into the label at `(row, col - 1)` of its finest, topmost cell. A single
///    pass suffices since an absorption target is either already verified or
///    processed later with the absorbed cells included.
/// 3. Renumber survivors `1..=k` preserving their relative order.
///
/// # Errors
///
/// Returns [`LayerError::OrphanWithoutNeighbor`] if an orphan's finer
/// neighbour cell is unlabelled.
pub fn reconcile(
    segmentation: Segmentation,
    coefficients: &Array2<f64>,
    config: &LayerConfig,
) -> Result<ReconciliationState, LayerError> {
    let mut state = ReconciliationState::from_segmentation(segmentation);

    if config.null_response() == NullResponse::Merge {
        state.summary.null_merged = merge_null_regions(&mut state, coefficients);
    }
    state.summary.absorbed = absorb_orphans(&mut state)?;
    renumber(&mut state);
    state.summary.surviving = state.n_labels();

    debug!(
        initial = state.summary.initial,
        null_merged = state.summary.null_merged,
        absorbed = state.summary.absorbed,
        surviving = state.summary.surviving,
        "reconciled regions"
    );
    Ok(state)
}

fn merge_null_regions(state: &mut ReconciliationState, coefficients: &Array2<f64>) -> usize {
    let n_cols = state.labels.ncols();
    let zero_labels: Vec<usize> = (1..=state.signs.len())
        .filter(|&label| state.signs[label - 1] == Sign::Zero)
        .collect();

    let mut merged = 0;
    for label in zero_labels {
        let Some(&(row, col)) = state.members[label - 1]
            .iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
        else {
            continue;
        };

        let target = if col + 1 < n_cols {
            Some(state.labels[[row, col + 1]])
        } else {
            strongest_signed_neighbour(state, coefficients, label)
        };

        match target {
            Some(target) if target != label => {
                state.absorb(label, target);
                merged += 1;
            }
            _ => warn!(label, "zero-response region has no signed neighbour, kept as is"),
        }
    }
    merged
}

/// Label of the signed cell 4-adjacent to `label` with the largest `|x|`.
fn strongest_signed_neighbour(
    state: &ReconciliationState,
    coefficients: &Array2<f64>,
    label: usize,
) -> Option<usize> {
    let (n_rows, n_cols) = state.labels.dim();
    let mut best: Option<(f64, usize)> = None;
    for &(row, col) in &state.members[label - 1] {
        let neighbours = [
            row.checked_sub(1).map(|r| (r, col)),
            (row + 1 < n_rows).then_some((row + 1, col)),
            col.checked_sub(1).map(|c| (row, c)),
            (col + 1 < n_cols).then_some((row, col + 1)),
        ];
        for cell in neighbours.into_iter().flatten() {
            let other = state.labels[cell];
            if other == 0 || other == label || state.signs[other - 1] == Sign::Zero {
                continue;
            }
            let strength = coefficients[cell].abs();
            if best.is_none_or(|(b, _)| strength > b) {
                best = Some((strength, other));
            }
        }
    }
    best.map(|(_, other)| other)
}

fn absorb_orphans(state: &mut ReconciliationState) -> Result<usize, LayerError> {
    let mut absorbed = 0;
    for label in 1..=state.members.len() {
        if !state.is_live(label) {
            continue;
        }
        let Some(&(row, col)) = state.members[label - 1]
            .iter()
            .min_by(|a, b| a.1.cmp(&b.1).then(a.0.cmp(&b.0)))
        else {
            continue;
        };
        if col == 0 {
            continue;
        }

        let target = state.labels[[row, col - 1]];
        if target == 0 || target == label {
            return Err(LayerError::OrphanWithoutNeighbor { label, row, col });
        }
        debug!(label, target, row, col, "absorbing region missing from finest scale");
        state.absorb(label, target);
        absorbed += 1;
    }
    Ok(absorbed)
}

fn renumber(state: &mut ReconciliationState) {
    let mut mapping = vec![0usize; state.members.len() + 1];
    let mut members = Vec::new();
    let mut signs = Vec::new();
    for (old, cells) in state.members.drain(..).enumerate() {
        if cells.is_empty() {
            continue;
        }
        members.push(cells);
        signs.push(state.signs[old]);
        mapping[old + 1] = members.len();
    }
    state.labels.mapv_inplace(|label| mapping[label]);
    state.members = members;
    state.signs = signs;
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::segment::label_regions;

    fn reconcile_with(coef: &Array2<f64>, null_response: NullResponse) -> ReconciliationState {
        let config = LayerConfig::new().with_null_response(null_response);
        reconcile(label_regions(coef, 1e-9), coef, &config).unwrap()
    }

    #[test]
    fn orphan_is_absorbed_into_finer_neighbour() {
        // The negative island at (1, 1..=2) never reaches column 0.
        let coef = array![[1.0, 1.0, 1.0], [1.0, -1.0, -1.0], [1.0, 1.0, 1.0]];
        let state = reconcile_with(&coef, NullResponse::Merge);
        assert_eq!(state.n_labels(), 1);
        assert!(state.labels().iter().all(|&l| l == 1));
        assert_eq!(state.members()[0].len(), 9);
        assert_eq!(
            state.summary(),
            ReconcileSummary {
                initial: 2,
                null_merged: 0,
                absorbed: 1,
                surviving: 1,
            }
        );
    }

    #[test]
    fn regions_reaching_finest_scale_survive() {
        let coef = array![[1.0, 1.0], [-1.0, -1.0], [1.0, -1.0]];
        let state = reconcile_with(&coef, NullResponse::Merge);
        assert_eq!(state.n_labels(), 3);
        assert_eq!(state.summary().absorbed, 0);
        assert_eq!(state.labels(), &array![[1, 1], [2, 2], [3, 2]]);
        assert_eq!(state.signs(), &[Sign::Positive, Sign::Negative, Sign::Positive]);
    }

    #[test]
    fn absorption_chains_resolve_in_one_pass() {
        // The positive island at (2, 2) sits on region 2, which sits on region 1.
        let coef = array![
            [1.0, 1.0, -1.0],
            [1.0, -1.0, -1.0],
            [1.0, -1.0, 1.0],
            [1.0, -1.0, -1.0],
            [1.0, 1.0, -1.0],
        ];
        let state = reconcile_with(&coef, NullResponse::Merge);
        assert_eq!(state.n_labels(), 1);
        assert_eq!(state.summary().initial, 3);
        assert_eq!(state.summary().absorbed, 2);
        assert!(state.labels().iter().all(|&l| l == 1));
    }

    #[test]
    fn survivors_are_renumbered_contiguously() {
        // Regions: 1 (+), 2 (- at column 0), 3 (- island at column 2).
        let coef = array![
            [1.0, 1.0, 1.0],
            [-1.0, 1.0, -1.0],
            [1.0, 1.0, 1.0],
        ];
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 3);
        let state = reconcile(seg, &coef, &LayerConfig::new()).unwrap();
        assert_eq!(state.n_labels(), 2);
        let mut seen: Vec<usize> = state.labels().iter().copied().collect();
        seen.sort_unstable();
        seen.dedup();
        assert_eq!(seen, vec![1, 2]);
        for (i, cells) in state.members().iter().enumerate() {
            for &cell in cells {
                assert_eq!(state.labels()[cell], i + 1);
            }
        }
    }

    #[test]
    fn zero_region_merges_one_scale_coarser() {
        let coef = array![[1.0, 1.0], [0.0, 1.0], [-1.0, -1.0]];
        let merged = reconcile_with(&coef, NullResponse::Merge);
        assert_eq!(merged.n_labels(), 2);
        assert_eq!(merged.labels()[[1, 0]], merged.labels()[[0, 0]]);
        assert_eq!(merged.summary().null_merged, 1);

        let distinct = reconcile_with(&coef, NullResponse::Distinct);
        assert_eq!(distinct.n_labels(), 3);
        assert_eq!(distinct.signs()[1], Sign::Zero);
        assert_eq!(distinct.summary().null_merged, 0);
    }

    #[test]
    fn zero_region_at_coarsest_scale_joins_strongest_neighbour() {
        let coef = array![[1.0, 1.0], [-3.0, 0.0], [-3.0, -2.0]];
        let state = reconcile_with(&coef, NullResponse::Merge);
        // Neighbours of (1, 1): (0, 1) = 1.0, (2, 1) = -2.0, (1, 0) = -3.0.
        assert_eq!(state.labels()[[1, 1]], state.labels()[[1, 0]]);
        assert_eq!(state.n_labels(), 2);
    }

    #[test]
    fn all_zero_matrix_keeps_single_region() {
        let coef = Array2::<f64>::zeros((4, 2));
        let state = reconcile_with(&coef, NullResponse::Merge);
        assert_eq!(state.n_labels(), 1);
        assert_eq!(state.summary().null_merged, 0);
        assert_eq!(state.signs(), &[Sign::Zero]);
    }

    #[test]
    fn unlabelled_neighbour_is_fatal() {
        let labels = array![[1, 1], [0, 2]];
        let mut state = ReconciliationState {
            labels,
            members: vec![vec![(0, 0), (0, 1)], vec![(1, 1)]],
            signs: vec![Sign::Positive, Sign::Negative],
            summary: ReconcileSummary::default(),
        };
        let err = absorb_orphans(&mut state).unwrap_err();
        assert_eq!(
            err,
            LayerError::OrphanWithoutNeighbor {
                label: 2,
                row: 1,
                col: 1
            }
        );
    }

    #[test]
    fn summary_counts_balance() {
        let coef = array![
            [1.0, 1.0, 1.0, 1.0],
            [0.0, -1.0, -1.0, 1.0],
            [-1.0, 1.0, 0.0, 1.0],
            [-1.0, -1.0, -1.0, -1.0],
        ];
        let s = reconcile_with(&coef, NullResponse::Merge).summary();
        assert_eq!(s.initial, s.surviving + s.null_merged + s.absorbed);
        let s = reconcile_with(&coef, NullResponse::Distinct).summary();
        assert_eq!(s.initial, s.surviving + s.absorbed);
    }
}

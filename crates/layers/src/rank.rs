//! Importance ranking of reconciled regions.

use ndarray::Array2;

use crate::reconcile::{Cell, ReconciliationState};

/// Normalises importance values with `(x - max) / (max - min) + 1`.
///
/// The maximum maps to exactly 1 and the minimum to 0. When every value is
/// equal (including a single value) all map to 1. Empty input gives an
/// empty result.
///
/// # Example
///
/// ```
/// use strata_layers::normalize_importance;
///
/// assert_eq!(normalize_importance(&[2.0, 4.0, 3.0]), vec![0.0, 1.0, 0.5]);
/// assert_eq!(normalize_importance(&[7.0]), vec![1.0]);
/// ```
pub fn normalize_importance(values: &[f64]) -> Vec<f64> {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let range = max - min;
    if !(range > 0.0) {
        return vec![1.0; values.len()];
    }
    values.iter().map(|&x| (x - max) / range + 1.0).collect()
}

/// Regions relabelled by descending importance.
///
/// Index `r` of every vector describes rank `r + 1`.
#[derive(Clone, Debug, PartialEq)]
pub struct Ranking {
    labels: Array2<usize>,
    members: Vec<Vec<Cell>>,
    raw: Vec<f64>,
    importance: Vec<f64>,
}

impl Ranking {
    /// Returns the label matrix with ranks as labels.
    pub fn labels(&self) -> &Array2<usize> {
        &self.labels
    }

    /// Returns the member cells of each rank.
    pub fn members(&self) -> &[Vec<Cell>] {
        &self.members
    }

    /// Returns `|mean response|` of each rank, non-increasing.
    pub fn raw(&self) -> &[f64] {
        &self.raw
    }

    /// Returns the normalised importance of each rank, non-increasing.
    pub fn importance(&self) -> &[f64] {
        &self.importance
    }

    /// Returns the number of ranked layers.
    pub fn n_ranks(&self) -> usize {
        self.raw.len()
    }

    /// Consumes the ranking and returns its label matrix.
    pub fn into_labels(self) -> Array2<usize> {
        self.labels
    }
}

#[cfg(test)]
impl Ranking {
    pub(crate) fn from_parts(labels: Array2<usize>, raw: Vec<f64>) -> Self {
        let importance = normalize_importance(&raw);
        Self {
            labels,
            members: vec![Vec::new(); raw.len()],
            raw,
            importance,
        }
    }
}

/// Ranks reconciled regions by `|mean(response over member cells)|`.
///
/// Ties keep their reconciled order. The label matrix is relabelled so that
/// rank 1 is the most important region.
pub fn rank_layers(state: ReconciliationState, coefficients: &Array2<f64>) -> Ranking {
    let (labels, members) = state.into_parts();

    let raw: Vec<f64> = members
        .iter()
        .map(|cells| {
            let sum: f64 = cells.iter().map(|&cell| coefficients[cell]).sum();
            (sum / cells.len() as f64).abs()
        })
        .collect();

    let mut order: Vec<usize> = (0..raw.len()).collect();
    order.sort_by(|&a, &b| raw[b].total_cmp(&raw[a]));

    let mut rank_of = vec![0usize; raw.len() + 1];
    for (rank, &old) in order.iter().enumerate() {
        rank_of[old + 1] = rank + 1;
    }

    let mut members = members;
    let sorted_members: Vec<Vec<Cell>> = order
        .iter()
        .map(|&old| std::mem::take(&mut members[old]))
        .collect();
    let sorted_raw: Vec<f64> = order.iter().map(|&old| raw[old]).collect();
    let importance = normalize_importance(&sorted_raw);

    Ranking {
        labels: labels.mapv(|label| rank_of[label]),
        members: sorted_members,
        raw: sorted_raw,
        importance,
    }
}

/// Full-size matrix holding each cell's layer importance.
///
/// The raw importance of each cell's rank is normalised over the flattened
/// matrix with [`normalize_importance`]. Unlabelled cells count as 0.
pub fn importance_matrix(labels: &Array2<usize>, raw: &[f64]) -> Array2<f64> {
    let cell_raw: Vec<f64> = labels
        .iter()
        .map(|&rank| rank.checked_sub(1).and_then(|i| raw.get(i)).copied().unwrap_or(0.0))
        .collect();
    let normalized = normalize_importance(&cell_raw);
    let mut matrix = Array2::zeros(labels.dim());
    for (cell, value) in matrix.iter_mut().zip(normalized) {
        *cell = value;
    }
    matrix
}

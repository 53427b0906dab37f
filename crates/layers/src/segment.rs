//! Same-sign region labelling of the transform matrix.

use ndarray::Array2;
use tracing::debug;

use crate::error::LayerError;

/// Sign class of one transform cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Sign {
    /// Response below `-threshold`.
    Negative,
    /// Response within `[-threshold, threshold]`.
    Zero,
    /// Response above `threshold`.
    Positive,
}

impl Sign {
    /// Classifies `value` against an absolute `threshold`.
    pub fn classify(value: f64, threshold: f64) -> Self {
        if value > threshold {
            Sign::Positive
        } else if value < -threshold {
            Sign::Negative
        } else {
            Sign::Zero
        }
    }

    /// Returns `-1`, `0` or `1`.
    pub fn as_i8(self) -> i8 {
        match self {
            Sign::Negative => -1,
            Sign::Zero => 0,
            Sign::Positive => 1,
        }
    }
}

/// How regions of zero response are treated before reconciliation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NullResponse {
    /// Merge each zero region into an adjacent signed region.
    #[default]
    Merge,
    /// Keep zero regions as layers of their own.
    Distinct,
}

impl NullResponse {
    /// Parses a policy name (`"merge"` or `"distinct"`, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`LayerError::InvalidConfig`] for any other name.
    pub fn from_name(name: &str) -> Result<Self, LayerError> {
        match name.to_ascii_lowercase().as_str() {
            "merge" => Ok(NullResponse::Merge),
            "distinct" => Ok(NullResponse::Distinct),
            other => Err(LayerError::InvalidConfig(format!(
                "unknown null response policy '{other}'"
            ))),
        }
    }

    /// Returns the canonical lowercase name.
    pub fn name(self) -> &'static str {
        match self {
            NullResponse::Merge => "merge",
            NullResponse::Distinct => "distinct",
        }
    }
}

/// Labelled same-sign regions of a transform matrix.
///
/// Labels start at 1. `signs()[label - 1]` is the sign shared by every cell
/// of that region.
#[derive(Clone, Debug, PartialEq)]
pub struct Segmentation {
    labels: Array2<usize>,
    signs: Vec<Sign>,
}

impl Segmentation {
    /// Returns the label matrix, same shape as the transform matrix.
    pub fn labels(&self) -> &Array2<usize> {
        &self.labels
    }

    /// Returns the sign of each region, indexed by `label - 1`.
    pub fn signs(&self) -> &[Sign] {
        &self.signs
    }

    /// Returns the sign of `label`, or `None` if the label does not exist.
    pub fn sign_of(&self, label: usize) -> Option<Sign> {
        label.checked_sub(1).and_then(|i| self.signs.get(i).copied())
    }

    /// Returns the number of regions.
    pub fn n_regions(&self) -> usize {
        self.signs.len()
    }

    /// Consumes the segmentation and returns `(labels, signs)`.
    pub fn into_parts(self) -> (Array2<usize>, Vec<Sign>) {
        (self.labels, self.signs)
    }
}

/// Labels the maximal 4-connected regions of uniform sign in `coefficients`.
///
/// A cell counts as zero when `|x| <= relative_tolerance * max|x|`. Cells are
/// scanned column by column (finest scale first), top to bottom, and labels
/// are numbered in order of first encounter.
///
/// # Example
///
/// ```
/// use ndarray::array;
/// use strata_layers::{Sign, label_regions};
///
/// let coef = array![[1.0, -1.0], [1.0, 1.0]];
/// let seg = label_regions(&coef, 1e-9);
/// assert_eq!(seg.n_regions(), 2);
/// assert_eq!(seg.labels()[[0, 1]], 2);
/// assert_eq!(seg.sign_of(2), Some(Sign::Negative));
/// ```
pub fn label_regions(coefficients: &Array2<f64>, relative_tolerance: f64) -> Segmentation {
    let (n_rows, n_cols) = coefficients.dim();
    let peak = coefficients.iter().fold(0.0_f64, |acc, x| acc.max(x.abs()));
    let threshold = relative_tolerance * peak;

    let signs = coefficients.mapv(|x| Sign::classify(x, threshold));

    // First pass: provisional labels with equivalences recorded in `parent`.
    let mut provisional = Array2::<usize>::zeros((n_rows, n_cols));
    let mut parent: Vec<usize> = Vec::new();
    let mut provisional_sign: Vec<Sign> = Vec::new();
    for col in 0..n_cols {
        for row in 0..n_rows {
            let sign = signs[[row, col]];
            let up = (row > 0 && signs[[row - 1, col]] == sign).then(|| provisional[[row - 1, col]]);
            let left =
                (col > 0 && signs[[row, col - 1]] == sign).then(|| provisional[[row, col - 1]]);
            provisional[[row, col]] = match (up, left) {
                (Some(a), Some(b)) => {
                    union(&mut parent, a, b);
                    a.min(b)
                }
                (Some(a), None) | (None, Some(a)) => a,
                (None, None) => {
                    parent.push(parent.len());
                    provisional_sign.push(sign);
                    parent.len() - 1
                }
            };
        }
    }

    // Second pass: resolve roots and number them by first encounter.
    let mut final_label = vec![0usize; parent.len()];
    let mut region_signs = Vec::new();
    let mut labels = Array2::<usize>::zeros((n_rows, n_cols));
    for col in 0..n_cols {
        for row in 0..n_rows {
            let root = find(&mut parent, provisional[[row, col]]);
            if final_label[root] == 0 {
                region_signs.push(provisional_sign[root]);
                final_label[root] = region_signs.len();
            }
            labels[[row, col]] = final_label[root];
        }
    }

    debug!(
        provisional = parent.len(),
        regions = region_signs.len(),
        threshold,
        "labelled same-sign regions"
    );

    Segmentation {
        labels,
        signs: region_signs,
    }
}

/// Root of `i` with path halving.
fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Joins the sets of `a` and `b`; the smaller root wins.
fn union(parent: &mut [usize], a: usize, b: usize) {
    let ra = find(parent, a);
    let rb = find(parent, b);
    if ra != rb {
        let (lo, hi) = if ra < rb { (ra, rb) } else { (rb, ra) };
        parent[hi] = lo;
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn sign_classification() {
        assert_eq!(Sign::classify(0.5, 0.1), Sign::Positive);
        assert_eq!(Sign::classify(-0.5, 0.1), Sign::Negative);
        assert_eq!(Sign::classify(0.1, 0.1), Sign::Zero);
        assert_eq!(Sign::classify(-0.05, 0.1), Sign::Zero);
        assert_eq!(Sign::classify(0.0, 0.0), Sign::Zero);
        assert_eq!(Sign::Negative.as_i8(), -1);
        assert_eq!(Sign::Zero.as_i8(), 0);
        assert_eq!(Sign::Positive.as_i8(), 1);
    }

    #[test]
    fn null_response_names() {
        assert_eq!(NullResponse::default(), NullResponse::Merge);
        assert_eq!(NullResponse::from_name("Merge").unwrap(), NullResponse::Merge);
        assert_eq!(
            NullResponse::from_name("DISTINCT").unwrap(),
            NullResponse::Distinct
        );
        assert!(matches!(
            NullResponse::from_name("drop"),
            Err(LayerError::InvalidConfig(_))
        ));
        assert_eq!(NullResponse::Distinct.name(), "distinct");
    }

    #[test]
    fn single_region() {
        let coef = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 1);
        assert!(seg.labels().iter().all(|&l| l == 1));
        assert_eq!(seg.signs(), &[Sign::Positive]);
    }

    #[test]
    fn labels_follow_column_major_first_encounter() {
        let coef = array![[1.0, -1.0], [-1.0, -1.0], [1.0, 1.0]];
        let seg = label_regions(&coef, 1e-9);
        // (0,0)=+ -> 1, (1,0)=- -> 2, (2,0)=+ -> 3; column 1 joins 2 and 3.
        assert_eq!(seg.labels(), &array![[1, 2], [2, 2], [3, 3]]);
        assert_eq!(
            seg.signs(),
            &[Sign::Positive, Sign::Negative, Sign::Positive]
        );
    }

    #[test]
    fn diagonal_cells_are_not_connected() {
        let coef = array![[1.0, -1.0], [-1.0, 1.0]];
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 4);
        assert_eq!(seg.labels(), &array![[1, 3], [2, 4]]);
    }

    #[test]
    fn u_shape_merges_provisional_labels() {
        // Two positive arms joined only in the last column.
        let coef = array![
            [1.0, 1.0, 1.0],
            [-1.0, -1.0, 1.0],
            [1.0, 1.0, 1.0],
        ];
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 2);
        assert_eq!(seg.labels(), &array![[1, 1, 1], [2, 2, 1], [1, 1, 1]]);
        assert_eq!(seg.sign_of(1), Some(Sign::Positive));
        assert_eq!(seg.sign_of(2), Some(Sign::Negative));
        assert_eq!(seg.sign_of(0), None);
        assert_eq!(seg.sign_of(3), None);
    }

    #[test]
    fn tolerance_is_relative_to_peak() {
        let coef = array![[100.0], [1e-10], [-1e-10], [-100.0]];
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.labels(), &array![[1], [2], [2], [3]]);
        assert_eq!(seg.signs(), &[Sign::Positive, Sign::Zero, Sign::Negative]);

        // Without tolerance the round-off cells pick up the signs around them.
        let seg = label_regions(&coef, 0.0);
        assert_eq!(seg.labels(), &array![[1], [1], [2], [2]]);
    }

    #[test]
    fn all_zero_matrix_is_one_zero_region() {
        let coef = Array2::<f64>::zeros((4, 3));
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 1);
        assert_eq!(seg.signs(), &[Sign::Zero]);
    }

    #[test]
    fn empty_matrix_has_no_regions() {
        let coef = Array2::<f64>::zeros((6, 0));
        let seg = label_regions(&coef, 1e-9);
        assert_eq!(seg.n_regions(), 0);
        assert_eq!(seg.labels().dim(), (6, 0));
    }

    #[test]
    fn union_find_keeps_smallest_root() {
        let mut parent: Vec<usize> = (0..5).collect();
        union(&mut parent, 3, 4);
        union(&mut parent, 4, 1);
        assert_eq!(find(&mut parent, 4), 1);
        assert_eq!(find(&mut parent, 3), 1);
        assert_eq!(find(&mut parent, 2), 2);
    }
}

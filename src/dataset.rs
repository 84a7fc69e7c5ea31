use crate::{Matrix, Vector};
use tracing::warn;

/// Build a dense matrix from possibly ragged rows.
///
/// The width is the widest row; short rows are zero-filled and non-finite
/// cells become 0. Row order is kept so labels map back to source records.
pub fn dense_matrix(rows: &[Vec<f64>]) -> Matrix {
    let n_features = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut matrix = Matrix::zeros((rows.len(), n_features));

    for (i, row) in rows.iter().enumerate() {
        for (j, &v) in row.iter().enumerate() {
            if v.is_finite() {
                matrix[[i, j]] = v;
            }
        }
    }

    matrix
}

/// Replace NaN and infinite cells with 0.
pub fn sanitize(x: &Matrix) -> Matrix {
    x.mapv(|v| if v.is_finite() { v } else { 0.0 })
}

/// Ordered set of named numeric features.
///
/// Column `j` of every matrix built through a schema means `names()[j]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<String>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Lay out `(name, value)` pairs in schema order.
    ///
    /// Absent fields are 0. Unknown names are dropped. A repeated name keeps
    /// its last value.
    pub fn vectorize(&self, fields: &[(&str, f64)]) -> Vector {
        let mut v = Vector::zeros(self.len());
        for &(name, value) in fields {
            match self.index_of(name) {
                Some(j) => v[j] = if value.is_finite() { value } else { 0.0 },
                None => warn!(field = name, "ignoring feature not in schema"),
            }
        }
        v
    }

    pub fn matrix(&self, records: &[Vec<(&str, f64)>]) -> Matrix {
        let mut x = Matrix::zeros((records.len(), self.len()));
        for (i, record) in records.iter().enumerate() {
            x.row_mut(i).assign(&self.vectorize(record));
        }
        x
    }
}

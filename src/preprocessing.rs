use crate::{Matrix, Vector};
use ndarray::{ArrayView1, Axis};

/// Columns whose spread is at or below this are left unscaled.
const MIN_STD: f64 = 1e-8;

#[inline]
fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() { v } else { 0.0 }
}

#[inline]
fn clamp_std(s: f64) -> f64 {
    if !s.is_finite() || s <= MIN_STD { 1.0 } else { s }
}

/// Per-column standardization: `(value - mean[j]) / std[j]`.
///
/// `std` uses Bessel's correction with the divisor guarded to at least 1, and
/// any degenerate column (zero variance, a single sample) gets `std = 1` so it
/// is only mean-centered.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardScaler {
    mean: Vector,
    std: Vector,
}

impl StandardScaler {
    /// Fit mean and sample standard deviation per column.
    ///
    /// An empty matrix yields an empty scaler rather than an error.
    pub fn fit(data: &Matrix) -> Self {
        let n_samples = data.nrows();
        let n_features = if n_samples == 0 { 0 } else { data.ncols() };

        // Running mean, divided before adding so huge columns cannot overflow
        let mut mean = Vector::zeros(n_features);
        for (i, row) in data.axis_iter(Axis(0)).enumerate() {
            let k = (i + 1) as f64;
            for (j, &v) in row.iter().enumerate() {
                mean[j] += finite_or_zero(v) / k - mean[j] / k;
            }
        }

        let mut sq_dev = Vector::zeros(n_features);
        for row in data.axis_iter(Axis(0)) {
            for (j, &v) in row.iter().enumerate() {
                let d = finite_or_zero(v) - mean[j];
                sq_dev[j] += d * d;
            }
        }
        let divisor = n_samples.saturating_sub(1).max(1) as f64;
        let std = sq_dev.mapv(|s| clamp_std((s / divisor).sqrt()));

        Self { mean, std }
    }

    /// Rebuild a scaler from stored parameters. Degenerate `std` entries are clamped to 1.
    pub fn from_parts(mean: Vector, std: Vector) -> Self {
        Self {
            mean,
            std: std.mapv(clamp_std),
        }
    }

    pub fn mean(&self) -> &Vector {
        &self.mean
    }

    pub fn std(&self) -> &Vector {
        &self.std
    }

    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// `mean` and `std` describe the same columns.
    pub fn is_well_formed(&self) -> bool {
        self.mean.len() == self.std.len()
    }

    #[inline]
    fn scale_cell(&self, j: usize, v: f64) -> f64 {
        let v = finite_or_zero(v);
        let scaled = match (self.mean.get(j), self.std.get(j)) {
            (Some(&m), Some(&s)) => (v - m) / s,
            // Columns the scaler never saw pass through (mean 0, std 1)
            _ => v,
        };
        // Keep the sign of overflowed cells; the distance metric reads inf as 0
        scaled.clamp(f64::MIN, f64::MAX)
    }

    /// Scale a single row. Rows wider than the scaler keep their extra columns as-is.
    pub fn transform_row(&self, row: ArrayView1<f64>) -> Vector {
        if !self.is_well_formed() {
            return row.to_owned();
        }
        row.iter()
            .enumerate()
            .map(|(j, &v)| self.scale_cell(j, v))
            .collect()
    }

    pub fn transform(&self, data: &Matrix) -> Matrix {
        if !self.is_well_formed() {
            return data.clone();
        }
        let mut result = data.clone();
        for mut row in result.axis_iter_mut(Axis(0)) {
            for (j, v) in row.iter_mut().enumerate() {
                *v = self.scale_cell(j, *v);
            }
        }
        result
    }

    pub fn fit_transform(data: &Matrix) -> (Self, Matrix) {
        let scaler = Self::fit(data);
        let scaled = scaler.transform(data);
        (scaler, scaled)
    }
}

pub fn fit_scaler(data: &Matrix) -> StandardScaler {
    StandardScaler::fit(data)
}

/// Apply `scaler` to `data`; without a scaler this is the identity.
pub fn apply_scaler(data: &Matrix, scaler: Option<&StandardScaler>) -> Matrix {
    match scaler {
        Some(scaler) => scaler.transform(data),
        None => data.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_standard_scaler() {
        let data = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&data);

        assert_eq!(scaled.shape(), data.shape());
        assert!((scaler.mean()[0] - 3.0).abs() < 1e-10);
        assert!((scaler.mean()[1] - 4.0).abs() < 1e-10);
        // Sample std of [1, 3, 5] is 2
        assert!((scaler.std()[0] - 2.0).abs() < 1e-10);
        assert!((scaled[[0, 0]] + 1.0).abs() < 1e-10);
        assert!((scaled[[2, 1]] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_single_row_has_unit_std() {
        let data = array![[4.0, -2.0, 9.0]];
        let scaler = fit_scaler(&data);

        for &s in scaler.std().iter() {
            assert_eq!(s, 1.0);
        }
        let scaled = scaler.transform(&data);
        for &v in scaled.iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_constant_column_is_only_centered() {
        let data = array![[7.0, 1.0], [7.0, 2.0], [7.0, 3.0]];
        let scaler = fit_scaler(&data);

        assert_eq!(scaler.std()[0], 1.0);
        let row = scaler.transform_row(array![9.0, 2.0].view());
        assert!((row[0] - 2.0).abs() < 1e-10);
        assert!(row[1].abs() < 1e-10);
    }

    #[test]
    fn test_empty_matrix_fits_empty_scaler() {
        let data = Matrix::zeros((0, 3));
        let scaler = fit_scaler(&data);

        assert_eq!(scaler.n_features(), 0);
        assert!(scaler.std().is_empty());
    }

    #[test]
    fn test_non_finite_cells_treated_as_zero() {
        let data = array![[f64::NAN, 1.0], [2.0, 1.0]];
        let scaler = fit_scaler(&data);

        assert!((scaler.mean()[0] - 1.0).abs() < 1e-10);
        assert!(scaler.std().iter().all(|s| s.is_finite()));
    }

    #[test]
    fn test_extreme_values_stay_finite_and_signed() {
        let data = array![[1e308, 0.0], [1e308, 0.0], [-1e308, 0.0], [0.0, 5.0]];
        let (scaler, scaled) = StandardScaler::fit_transform(&data);

        assert!(scaler.mean().iter().all(|m| m.is_finite()));
        assert!(scaled.iter().all(|v| v.is_finite()));
        assert!(scaled[[0, 0]] > 0.0);
        assert!(scaled[[2, 0]] < 0.0);
    }

    #[test]
    fn test_wider_row_passes_extra_columns_through() {
        let data = array![[0.0], [2.0]];
        let scaler = fit_scaler(&data);

        let row = scaler.transform_row(array![2.0, 5.0].view());
        assert_eq!(row.len(), 2);
        assert_eq!(row[1], 5.0);
    }

    #[test]
    fn test_apply_without_scaler_is_identity() {
        let data = array![[1.0, 2.0], [3.0, 4.0]];
        assert_eq!(apply_scaler(&data, None), data);
    }

    #[test]
    fn test_malformed_scaler_is_identity() {
        let scaler = StandardScaler::from_parts(array![1.0, 2.0], array![1.0]);
        assert!(!scaler.is_well_formed());

        let data = array![[5.0, 6.0]];
        assert_eq!(scaler.transform(&data), data);
    }

    #[test]
    fn test_from_parts_clamps_degenerate_std() {
        let scaler = StandardScaler::from_parts(array![0.0, 0.0], array![0.0, f64::NAN]);
        assert_eq!(scaler.std(), &array![1.0, 1.0]);
    }
}

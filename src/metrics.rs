use ndarray::ArrayView1;

#[inline]
fn cell(v: &ArrayView1<f64>, i: usize) -> f64 {
    match v.get(i) {
        Some(&x) if x.is_finite() => x,
        _ => 0.0,
    }
}

/// Euclidean distance over `max(a.len(), b.len())` positions.
///
/// Positions past the end of either vector, and non-finite cells, count as 0,
/// so vectors from slightly different feature layouts still compare.
pub fn euclidean_distance(a: &ArrayView1<f64>, b: &ArrayView1<f64>) -> f64 {
    let len = a.len().max(b.len());
    (0..len)
        .map(|i| {
            let d = cell(a, i) - cell(b, i);
            d * d
        })
        .sum::<f64>()
        .sqrt()
}

pub fn euclidean_distance_slices(a: &[f64], b: &[f64]) -> f64 {
    euclidean_distance(&ArrayView1::from(a), &ArrayView1::from(b))
}

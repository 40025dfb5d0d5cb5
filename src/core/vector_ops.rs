use crate::core::types::SearchResult;
use std::cmp::Ordering;

pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

pub fn l2_squared(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Scales `v` to unit length. Zero vectors are left untouched.
pub fn normalize_in_place(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm == 0.0 {
        return;
    }
    for x in v.iter_mut() {
        *x /= norm;
    }
}

/// Sorts `(label, distance)` pairs closest first and keeps the best `k`.
/// Distances here are already mapped so that smaller means closer.
pub fn closest_k(mut candidates: Vec<(i64, f32)>, k: usize) -> Vec<(i64, f32)> {
    candidates.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });
    candidates.truncate(k);
    candidates
}

pub fn into_results(
    candidates: Vec<(i64, f32)>,
    metric: crate::core::types::Metric,
) -> Vec<SearchResult> {
    candidates
        .into_iter()
        .map(|(label, d)| SearchResult::new(label, metric.from_distance(d)))
        .collect()
}

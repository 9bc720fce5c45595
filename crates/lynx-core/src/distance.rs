//! Distance metrics for vector similarity calculations.
//!
//! Both metrics are minimised for "closer": L2 returns the squared
//! Euclidean distance (the square root is skipped since it preserves
//! ordering), and cosine returns `1 - cos(a, b)`.

use serde::{Deserialize, Serialize};

/// Distance metric for vector similarity calculations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DistanceMetric {
    /// Squared Euclidean distance.
    /// Best for spatial data and when magnitude matters.
    L2,

    /// Cosine distance (`1 - cosine_similarity`).
    /// Best for normalized vectors, commonly used with text embeddings.
    #[default]
    Cosine,
}

impl DistanceMetric {
    /// Calculates the distance between two vectors using this metric.
    ///
    /// Lower is more similar for both metrics. The caller guarantees that
    /// `a` and `b` have the same length.
    #[must_use]
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f64 {
        debug_assert_eq!(a.len(), b.len(), "vector dimensions must match");

        match self {
            Self::L2 => l2_sq(a, b),
            Self::Cosine => cosine(a, b),
        }
    }
}

/// Squared Euclidean distance between two vectors.
///
/// Accumulates in f64 to keep high-dimensional sums stable.
#[must_use]
pub fn l2_sq(a: &[f32], b: &[f32]) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = f64::from(*x) - f64::from(*y);
            d * d
        })
        .sum()
}

/// Cosine distance `1 - dot(a, b) / (|a| * |b|)` between two vectors.
///
/// A zero vector has no direction; its distance to anything is defined
/// as `1.0` rather than an error.
#[must_use]
pub fn cosine(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;

    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

/// Scales `vector` to unit length in place.
///
/// Zero vectors are left untouched. Used by cosine-mode k-means, which
/// clusters on the unit sphere.
pub(crate) fn normalize_in_place(vector: &mut [f32]) {
    let norm: f64 = vector.iter().map(|x| f64::from(*x) * f64::from(*x)).sum();
    if norm == 0.0 {
        return;
    }

    let norm = norm.sqrt();
    #[allow(clippy::cast_possible_truncation)]
    for x in vector.iter_mut() {
        *x = (f64::from(*x) / norm) as f32;
    }
}

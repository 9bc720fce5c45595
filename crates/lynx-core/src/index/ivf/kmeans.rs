//! Lloyd's k-means over the store contents, used to train the IVF index.
//!
//! Initialisation is deterministic: seeds are distinct rows picked by
//! uniform stride sampling, so repeated training over the same data
//! yields the same centroids. Under the cosine metric, clustering runs
//! on unit-normalised copies of the data and centroids stay on the unit
//! sphere after every mean update.

use crate::distance::{self, DistanceMetric};
use crate::error::{Error, Result};
use rayon::prelude::*;
use tracing::debug;

/// Hyperparameters for k-means training.
#[derive(Debug, Clone, Copy)]
pub struct KmeansParams {
    /// Maximum Lloyd iterations before giving up on convergence.
    pub max_iterations: usize,
    /// Convergence threshold on the maximum squared centroid shift.
    pub tolerance: f64,
}

impl Default for KmeansParams {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            tolerance: 1e-4,
        }
    }
}

/// Result of a training run: a centroid bank and the final assignment.
#[derive(Debug)]
pub(crate) struct KmeansOutput {
    /// `nlist * dimension` row-major centroid matrix.
    pub centroids: Vec<f32>,
    /// Cluster index for every training row, in row order.
    pub assignments: Vec<usize>,
    /// Iterations actually run.
    pub iterations: usize,
}

/// Index of the centroid nearest to `row` under `metric`.
///
/// Ties break toward the smaller centroid index: the strict comparison
/// keeps the first (smallest) index seen on equal distances.
pub(crate) fn nearest_centroid(
    centroids: &[f32],
    dimension: usize,
    metric: DistanceMetric,
    row: &[f32],
) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;

    for (c, centroid) in centroids.chunks_exact(dimension).enumerate() {
        let dist = metric.distance(row, centroid);
        if dist < best_dist {
            best = c;
            best_dist = dist;
        }
    }

    best
}

/// Runs Lloyd's k-means on a flat row-major matrix.
///
/// # Errors
///
/// Returns [`Error::InsufficientData`] when `count < nlist` and
/// [`Error::InvalidVector`] when the data contains a non-finite value.
pub(crate) fn train(
    data: &[f32],
    count: usize,
    dimension: usize,
    nlist: usize,
    metric: DistanceMetric,
    params: &KmeansParams,
) -> Result<KmeansOutput> {
    if count < nlist {
        return Err(Error::InsufficientData {
            needed: nlist,
            available: count,
        });
    }

    if let Some(pos) = data.iter().position(|x| !x.is_finite()) {
        return Err(Error::InvalidVector(format!(
            "non-finite value in row {}",
            pos / dimension
        )));
    }

    // Cosine clusters on the unit sphere; train on normalised copies so
    // assignment and mean recomputation stay consistent with the metric.
    let normalized;
    let data: &[f32] = match metric {
        DistanceMetric::L2 => data,
        DistanceMetric::Cosine => {
            let mut copy = data.to_vec();
            for row in copy.chunks_exact_mut(dimension) {
                distance::normalize_in_place(row);
            }
            normalized = copy;
            &normalized
        }
    };

    let mut centroids = seed_centroids(data, count, dimension, nlist);
    let mut assignments = vec![0_usize; count];
    let mut iterations = 0;

    while iterations < params.max_iterations {
        iterations += 1;

        assign(data, dimension, metric, &centroids, &mut assignments);
        let next = recompute_centroids(data, dimension, metric, nlist, &assignments, &centroids);

        let shift = max_centroid_shift(&centroids, &next, dimension);
        centroids = next;

        if shift < params.tolerance {
            debug!(iterations, shift, "k-means converged");
            break;
        }
    }

    // One final pass so the reported assignment matches the returned
    // centroid bank, not the previous iteration's.
    assign(data, dimension, metric, &centroids, &mut assignments);

    Ok(KmeansOutput {
        centroids,
        assignments,
        iterations,
    })
}

/// Picks `nlist` distinct seed rows by uniform stride over the dataset.
fn seed_centroids(data: &[f32], count: usize, dimension: usize, nlist: usize) -> Vec<f32> {
    let stride = count / nlist;
    let mut centroids = Vec::with_capacity(nlist * dimension);

    for c in 0..nlist {
        let row = c * stride;
        centroids.extend_from_slice(&data[row * dimension..(row + 1) * dimension]);
    }

    centroids
}

/// Assigns every row to its nearest centroid.
fn assign(
    data: &[f32],
    dimension: usize,
    metric: DistanceMetric,
    centroids: &[f32],
    assignments: &mut [usize],
) {
    assignments
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, slot)| {
            let row = &data[i * dimension..(i + 1) * dimension];
            *slot = nearest_centroid(centroids, dimension, metric, row);
        });
}

/// Moves each centroid to the mean of its assigned rows.
///
/// An empty cluster collapses k-means; it is re-seeded to the data point
/// farthest from its currently assigned centroid.
fn recompute_centroids(
    data: &[f32],
    dimension: usize,
    metric: DistanceMetric,
    nlist: usize,
    assignments: &[usize],
    previous: &[f32],
) -> Vec<f32> {
    let mut sums = vec![0.0_f64; nlist * dimension];
    let mut counts = vec![0_usize; nlist];

    for (row, &cluster) in data.chunks_exact(dimension).zip(assignments.iter()) {
        counts[cluster] += 1;
        let sum = &mut sums[cluster * dimension..(cluster + 1) * dimension];
        for (acc, x) in sum.iter_mut().zip(row.iter()) {
            *acc += f64::from(*x);
        }
    }

    let mut centroids = vec![0.0_f32; nlist * dimension];
    let mut empty = Vec::new();

    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    for c in 0..nlist {
        if counts[c] == 0 {
            empty.push(c);
            continue;
        }

        let inv = 1.0 / counts[c] as f64;
        let out = &mut centroids[c * dimension..(c + 1) * dimension];
        let sum = &sums[c * dimension..(c + 1) * dimension];
        for (o, s) in out.iter_mut().zip(sum.iter()) {
            *o = (s * inv) as f32;
        }

        if metric == DistanceMetric::Cosine {
            distance::normalize_in_place(out);
        }
    }

    if !empty.is_empty() {
        reseed_empty_clusters(
            data, dimension, metric, assignments, previous, &empty, &mut centroids,
        );
    }

    centroids
}

/// Re-seeds empty clusters to the rows farthest from their own centroid.
///
/// Each empty cluster takes the next-farthest distinct row, so two empty
/// clusters never collapse onto the same point.
fn reseed_empty_clusters(
    data: &[f32],
    dimension: usize,
    metric: DistanceMetric,
    assignments: &[usize],
    previous: &[f32],
    empty: &[usize],
    centroids: &mut [f32],
) {
    let mut by_distance: Vec<(usize, f64)> = data
        .par_chunks_exact(dimension)
        .enumerate()
        .map(|(i, row)| {
            let centroid =
                &previous[assignments[i] * dimension..(assignments[i] + 1) * dimension];
            (i, metric.distance(row, centroid))
        })
        .collect();
    by_distance.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    for (slot, &cluster) in empty.iter().enumerate() {
        let (row, _) = by_distance[slot];
        let out = &mut centroids[cluster * dimension..(cluster + 1) * dimension];
        out.copy_from_slice(&data[row * dimension..(row + 1) * dimension]);
    }
}

/// Largest squared shift of any centroid between two iterations.
fn max_centroid_shift(previous: &[f32], current: &[f32], dimension: usize) -> f64 {
    previous
        .chunks_exact(dimension)
        .zip(current.chunks_exact(dimension))
        .map(|(old, new)| distance::l2_sq(old, new))
        .fold(0.0_f64, f64::max)
}

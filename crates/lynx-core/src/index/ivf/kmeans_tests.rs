//! Tests for `kmeans` module

use super::kmeans::*;
use crate::distance::DistanceMetric;
use crate::error::Error;

fn flat(rows: &[[f32; 2]]) -> Vec<f32> {
    rows.iter().flatten().copied().collect()
}

#[test]
fn test_insufficient_data() {
    let data = flat(&[[0.0, 0.0], [1.0, 1.0]]);
    let err = train(
        &data,
        2,
        2,
        3,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        Error::InsufficientData {
            needed: 3,
            available: 2
        }
    ));
}

#[test]
fn test_non_finite_data_rejected() {
    let data = vec![0.0, 1.0, f32::NAN, 2.0];
    let err = train(
        &data,
        2,
        2,
        1,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, Error::InvalidVector(_)));
}

#[test]
fn test_separated_clusters_recovered() {
    // Two tight blobs far apart; k-means must place one centroid per blob.
    let data = flat(&[
        [0.0, 0.0],
        [0.1, 0.0],
        [0.0, 0.1],
        [10.0, 10.0],
        [10.1, 10.0],
        [10.0, 10.1],
    ]);

    let output = train(
        &data,
        6,
        2,
        2,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap();

    // The first three rows share a cluster, the last three share the other.
    assert_eq!(output.assignments[0], output.assignments[1]);
    assert_eq!(output.assignments[1], output.assignments[2]);
    assert_eq!(output.assignments[3], output.assignments[4]);
    assert_eq!(output.assignments[4], output.assignments[5]);
    assert_ne!(output.assignments[0], output.assignments[3]);

    // Each centroid sits at its blob's mean.
    let near = output.assignments[0];
    let c = &output.centroids[near * 2..near * 2 + 2];
    assert!((f64::from(c[0]) - 0.0333).abs() < 0.01);
    assert!((f64::from(c[1]) - 0.0333).abs() < 0.01);
}

#[test]
fn test_training_is_deterministic() {
    let data: Vec<f32> = (0..40).map(|i| (i as f32 * 0.37).sin()).collect();

    let a = train(
        &data,
        10,
        4,
        3,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap();
    let b = train(
        &data,
        10,
        4,
        3,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap();

    assert_eq!(a.centroids, b.centroids);
    assert_eq!(a.assignments, b.assignments);
}

#[test]
fn test_cosine_centroids_are_unit_length() {
    let data = flat(&[
        [3.0, 0.0],
        [5.0, 0.1],
        [0.0, 2.0],
        [0.1, 7.0],
    ]);

    let output = train(
        &data,
        4,
        2,
        2,
        DistanceMetric::Cosine,
        &KmeansParams::default(),
    )
    .unwrap();

    for centroid in output.centroids.chunks_exact(2) {
        let norm: f64 = centroid
            .iter()
            .map(|x| f64::from(*x) * f64::from(*x))
            .sum();
        assert!((norm.sqrt() - 1.0).abs() < 1e-5);
    }
}

#[test]
fn test_identical_points_do_not_collapse_training() {
    // Every row identical: one cluster swallows everything and the other
    // is re-seeded each round. Training must still terminate cleanly.
    let data = flat(&[[1.0, 1.0]; 6]);

    let output = train(
        &data,
        6,
        2,
        2,
        DistanceMetric::L2,
        &KmeansParams::default(),
    )
    .unwrap();

    assert_eq!(output.assignments.len(), 6);
    assert!(output.assignments.iter().all(|&c| c < 2));
}

#[test]
fn test_assignment_ties_prefer_smaller_cluster() {
    let centroids = flat(&[[0.0, 0.0], [2.0, 0.0]]);
    // Equidistant from both centroids.
    assert_eq!(
        nearest_centroid(&centroids, 2, DistanceMetric::L2, &[1.0, 0.0]),
        0
    );
}

#[test]
fn test_max_iterations_bounds_work() {
    let data: Vec<f32> = (0..64).map(|i| (i as f32 * 1.7).cos()).collect();
    let params = KmeansParams {
        max_iterations: 1,
        tolerance: 0.0,
    };

    let output = train(&data, 16, 4, 4, DistanceMetric::L2, &params).unwrap();
    assert_eq!(output.iterations, 1);
}

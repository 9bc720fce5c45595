//! Tests for `topk` module

use super::topk::*;
use proptest::prelude::*;

#[test]
fn test_keeps_k_smallest() {
    let mut selector = TopKSelector::new(3);
    for (id, dist) in [(0, 5.0), (1, 1.0), (2, 4.0), (3, 2.0), (4, 3.0)] {
        selector.push(id, dist);
    }

    let results = selector.into_sorted();
    let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
    assert_eq!(ids, vec![1, 3, 4]);
}

#[test]
fn test_results_sorted_ascending_by_distance() {
    let mut selector = TopKSelector::new(10);
    for (id, dist) in [(0, 0.9), (1, 0.1), (2, 0.5)] {
        selector.push(id, dist);
    }

    let results = selector.into_sorted();
    for pair in results.windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
}

#[test]
fn test_ties_broken_by_ascending_id() {
    let mut selector = TopKSelector::new(2);
    selector.push(7, 1.0);
    selector.push(2, 1.0);
    selector.push(5, 1.0);

    let results = selector.into_sorted();
    let ids: Vec<u64> = results.iter().map(|r| r.id).collect();
    // On equal distances the smaller ids survive and sort first.
    assert_eq!(ids, vec![2, 5]);
}

#[test]
fn test_fewer_candidates_than_k() {
    let mut selector = TopKSelector::new(10);
    selector.push(0, 2.0);
    selector.push(1, 1.0);

    let results = selector.into_sorted();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].id, 1);
}

#[test]
fn test_zero_capacity_keeps_nothing() {
    let mut selector = TopKSelector::new(0);
    selector.push(0, 1.0);
    assert!(selector.is_empty());
    assert!(selector.into_sorted().is_empty());
}

fn full_sort_topk(pairs: &[(u64, f64)], k: usize) -> Vec<(u64, f64)> {
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
    sorted.truncate(k);
    sorted
}

proptest! {
    #[test]
    fn prop_selector_matches_full_sort(
        distances in proptest::collection::vec(0.0_f64..1000.0, 0..200),
        k in 1_usize..20,
    ) {
        let pairs: Vec<(u64, f64)> = distances
            .iter()
            .enumerate()
            .map(|(i, &d)| (i as u64, d))
            .collect();

        let mut selector = TopKSelector::new(k);
        for &(id, dist) in &pairs {
            selector.push(id, dist);
        }

        let got: Vec<(u64, f64)> = selector
            .into_sorted()
            .into_iter()
            .map(|r| (r.id, r.distance))
            .collect();
        prop_assert_eq!(got, full_sort_topk(&pairs, k));
    }
}

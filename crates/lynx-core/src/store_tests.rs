//! Tests for `store` module

use super::error::Error;
use super::store::*;

#[test]
fn test_empty_store() {
    let store = VectorStore::new();
    assert_eq!(store.len(), 0);
    assert!(store.is_empty());
    assert_eq!(store.dimension(), 0);
}

#[test]
fn test_first_insert_fixes_dimension() {
    let mut store = VectorStore::new();
    let id = store.add(&[1.0, 2.0, 3.0]).unwrap();
    assert_eq!(id, 0);
    assert_eq!(store.dimension(), 3);

    let err = store.add(&[1.0, 2.0]).unwrap_err();
    assert!(matches!(
        err,
        Error::DimensionMismatch {
            expected: 3,
            actual: 2
        }
    ));
}

#[test]
fn test_empty_vector_rejected() {
    let mut store = VectorStore::new();
    assert!(matches!(store.add(&[]), Err(Error::EmptyInput(_))));
}

#[test]
fn test_ids_are_dense_and_monotonic() {
    let mut store = VectorStore::new();
    for i in 0..10 {
        let id = store.add(&[i as f32, 0.0]).unwrap();
        assert_eq!(id, i);
    }
    assert_eq!(store.len(), 10);
}

#[test]
fn test_get_returns_exact_bytes() {
    let mut store = VectorStore::new();
    let original = vec![0.1_f32, -2.5, f32::MIN_POSITIVE, 1e30];
    store.add(&original).unwrap();

    let row = store.get(0).unwrap();
    for (a, b) in row.iter().zip(original.iter()) {
        assert_eq!(a.to_bits(), b.to_bits());
    }
}

#[test]
fn test_get_out_of_range() {
    let mut store = VectorStore::new();
    store.add(&[1.0]).unwrap();
    assert!(matches!(
        store.get(1),
        Err(Error::IdOutOfRange { id: 1, size: 1 })
    ));
    assert!(store.get(u64::MAX).is_err());
}

#[test]
fn test_add_batch_returns_id_range() {
    let mut store = VectorStore::new();
    store.add(&[0.0, 0.0]).unwrap();

    let ids = store
        .add_batch(&[vec![1.0, 1.0], vec![2.0, 2.0], vec![3.0, 3.0]])
        .unwrap();
    assert_eq!(ids, 1..4);
    assert_eq!(store.len(), 4);
    assert_eq!(store.get(3).unwrap(), &[3.0, 3.0]);
}

#[test]
fn test_add_batch_is_all_or_nothing() {
    let mut store = VectorStore::new();
    store.add(&[1.0, 2.0]).unwrap();

    let err = store
        .add_batch(&[vec![3.0, 4.0], vec![5.0, 6.0, 7.0]])
        .unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { .. }));

    // Nothing from the failed batch was applied.
    assert_eq!(store.len(), 1);
    assert_eq!(store.as_flat(), &[1.0, 2.0]);
}

#[test]
fn test_add_batch_rejects_empty_batch_and_empty_rows() {
    let mut store = VectorStore::new();
    assert!(matches!(store.add_batch(&[]), Err(Error::EmptyInput(_))));
    assert!(matches!(
        store.add_batch(&[vec![1.0], Vec::new()]),
        Err(Error::EmptyInput(_))
    ));
    assert!(store.is_empty());
}

#[test]
fn test_add_batch_fixes_dimension_on_empty_store() {
    let mut store = VectorStore::new();
    store.add_batch(&[vec![1.0, 2.0, 3.0], vec![4.0, 5.0, 6.0]]).unwrap();
    assert_eq!(store.dimension(), 3);
    assert_eq!(store.len(), 2);
}

#[test]
fn test_iter_yields_rows_in_id_order() {
    let mut store = VectorStore::new();
    for i in 0..5 {
        store.add(&[i as f32, i as f32 + 0.5]).unwrap();
    }

    let rows: Vec<(u64, Vec<f32>)> = store.iter().map(|(id, row)| (id, row.to_vec())).collect();
    assert_eq!(rows.len(), 5);
    for (i, (id, row)) in rows.iter().enumerate() {
        assert_eq!(*id, i as u64);
        assert_eq!(row[0], i as f32);
    }
}

#[test]
fn test_to_rows_round_trip() {
    let mut store = VectorStore::new();
    let batch = vec![vec![1.0_f32, 2.0], vec![3.0, 4.0]];
    store.add_batch(&batch).unwrap();
    assert_eq!(store.to_rows(), batch);
}

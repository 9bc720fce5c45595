//! Exact nearest-neighbor search by exhaustive scan.

use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::{SearchResult, VectorIndex};
use crate::store::VectorStore;
use crate::topk::TopKSelector;

/// Exact top-k index scanning the whole store on every query.
///
/// The scan is `O(N * D)` per query and serves as the recall baseline
/// for the IVF index. The index itself is stateless: all vector data
/// stays in the [`VectorStore`] borrowed per call.
#[derive(Debug, Clone, Copy)]
pub struct BruteForceIndex {
    metric: DistanceMetric,
}

impl BruteForceIndex {
    /// Creates a brute-force index using the given metric.
    #[must_use]
    pub const fn new(metric: DistanceMetric) -> Self {
        Self { metric }
    }

    /// The distance metric this index scores with.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }
}

impl VectorIndex for BruteForceIndex {
    /// Returns the exact `min(k, N)` nearest vectors to `query`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EmptyInput`] for an empty query or an empty
    /// store, [`Error::InvalidK`] for `k == 0`, and
    /// [`Error::DimensionMismatch`] when the query dimension differs
    /// from the store dimension.
    fn search(&self, store: &VectorStore, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        if query.is_empty() {
            return Err(Error::EmptyInput("query"));
        }
        if k == 0 {
            return Err(Error::InvalidK(k));
        }
        if store.is_empty() {
            return Err(Error::EmptyInput("store"));
        }
        if query.len() != store.dimension() {
            return Err(Error::DimensionMismatch {
                expected: store.dimension(),
                actual: query.len(),
            });
        }

        let mut selector = TopKSelector::new(k);
        for (id, vector) in store.iter() {
            selector.push(id, self.metric.distance(query, vector));
        }

        Ok(selector.into_sorted())
    }

    fn len(&self, store: &VectorStore) -> usize {
        store.len()
    }
}

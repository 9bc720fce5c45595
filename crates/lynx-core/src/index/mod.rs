//! Retrieval indexes over the vector store.
//!
//! Two strategies share the same search contract:
//!
//! - [`BruteForceIndex`]: exact top-k by scanning every stored vector
//! - [`IvfIndex`]: approximate top-k via an inverted file over k-means
//!   clusters, trading recall for latency through `nprobe`
//!
//! Both hold no owning reference to vector data; the store is borrowed
//! per call, so an index can never outlive the data it searches.

mod bruteforce;
pub mod ivf;


pub use bruteforce::BruteForceIndex;
pub use ivf::IvfIndex;

use crate::error::Result;
use crate::store::VectorStore;
use serde::{Deserialize, Serialize};

/// A single search hit: a stored vector id and its distance to the query.
///
/// Result sequences are sorted ascending by distance, ties broken by
/// ascending id.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Id of the matching vector.
    pub id: u64,
    /// Distance under the index's metric; lower is more similar.
    pub distance: f64,
}

/// Common contract implemented by every retrieval strategy.
pub trait VectorIndex {
    /// Returns the k nearest stored vectors to `query`.
    ///
    /// # Errors
    ///
    /// Fails on an empty query, `k == 0`, a dimension mismatch with the
    /// store, or an index that is not ready to serve searches.
    fn search(&self, store: &VectorStore, query: &[f32], k: usize) -> Result<Vec<SearchResult>>;

    /// Number of vectors currently searchable through this index.
    fn len(&self, store: &VectorStore) -> usize;

    /// Returns true when no vector is searchable.
    fn is_empty(&self, store: &VectorStore) -> bool {
        self.len(store) == 0
    }
}

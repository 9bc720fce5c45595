//! The IVF index proper: centroid bank, posting lists, probe search.

use super::kmeans::{self, KmeansParams};
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::{SearchResult, VectorIndex};
use crate::store::VectorStore;
use crate::topk::TopKSelector;
use tracing::info;

/// Training state of an [`IvfIndex`].
///
/// An untrained index is an explicit variant rather than a null handle:
/// operations that need centroids match on the state and surface
/// [`Error::NotTrained`] otherwise.
#[derive(Debug, Clone)]
pub enum IvfState {
    /// No centroids yet; searches fail, `update()` may train.
    Empty,
    /// Centroids established; postings cover ids `0..indexed`.
    Trained {
        /// `nlist * dimension` row-major centroid matrix.
        centroids: Vec<f32>,
        /// Dimension the index was trained at.
        dimension: usize,
        /// Per-centroid ordered lists of assigned vector ids.
        postings: Vec<Vec<u64>>,
        /// Number of store ids covered by the postings.
        indexed: usize,
    },
}

/// Inverted-file index over k-means clusters.
///
/// Search happens in two phases: the query is compared against all
/// `nlist` centroids, then only the posting lists of the `nprobe`
/// nearest clusters are scanned. Recall grows monotonically with
/// `nprobe`; at `nprobe == nlist` the search is exhaustive and matches
/// the brute-force result exactly.
#[derive(Debug, Clone)]
pub struct IvfIndex {
    metric: DistanceMetric,
    nlist: usize,
    nprobe: usize,
    params: KmeansParams,
    state: IvfState,
}

impl IvfIndex {
    /// Creates an untrained index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when `nlist == 0`, `nprobe == 0`,
    /// or `nprobe > nlist`.
    pub fn new(metric: DistanceMetric, nlist: usize, nprobe: usize) -> Result<Self> {
        Self::with_params(metric, nlist, nprobe, KmeansParams::default())
    }

    /// Creates an untrained index with explicit training parameters.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid `nlist`/`nprobe`
    /// pair.
    pub fn with_params(
        metric: DistanceMetric,
        nlist: usize,
        nprobe: usize,
        params: KmeansParams,
    ) -> Result<Self> {
        if nlist == 0 {
            return Err(Error::InvalidConfig("nlist must be greater than 0".into()));
        }
        if nprobe == 0 || nprobe > nlist {
            return Err(Error::InvalidConfig(format!(
                "nprobe must be in 1..={nlist}, got {nprobe}"
            )));
        }

        Ok(Self {
            metric,
            nlist,
            nprobe,
            params,
            state: IvfState::Empty,
        })
    }

    /// The distance metric this index was built with.
    #[must_use]
    pub const fn metric(&self) -> DistanceMetric {
        self.metric
    }

    /// Number of clusters.
    #[must_use]
    pub const fn nlist(&self) -> usize {
        self.nlist
    }

    /// Number of clusters probed per query.
    #[must_use]
    pub const fn nprobe(&self) -> usize {
        self.nprobe
    }

    /// Returns true once training has established centroids.
    #[must_use]
    pub const fn is_trained(&self) -> bool {
        matches!(self.state, IvfState::Trained { .. })
    }

    /// Number of store ids covered by the posting lists.
    #[must_use]
    pub fn indexed_len(&self) -> usize {
        match &self.state {
            IvfState::Empty => 0,
            IvfState::Trained { indexed, .. } => *indexed,
        }
    }

    /// The per-centroid posting lists, or `None` before training.
    #[must_use]
    pub fn postings(&self) -> Option<&[Vec<u64>]> {
        match &self.state {
            IvfState::Empty => None,
            IvfState::Trained { postings, .. } => Some(postings),
        }
    }

    /// The flat `nlist * dimension` centroid matrix, or `None` before
    /// training.
    #[must_use]
    pub fn centroids(&self) -> Option<&[f32]> {
        match &self.state {
            IvfState::Empty => None,
            IvfState::Trained { centroids, .. } => Some(centroids),
        }
    }

    /// Sets the number of probed clusters. O(1), valid in any state.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] unless `1 <= nprobe <= nlist`.
    /// Changing `nlist` instead requires discarding and rebuilding the
    /// index.
    pub fn set_nprobe(&mut self, nprobe: usize) -> Result<()> {
        if nprobe == 0 || nprobe > self.nlist {
            return Err(Error::InvalidConfig(format!(
                "nprobe must be in 1..={}, got {nprobe}",
                self.nlist
            )));
        }
        self.nprobe = nprobe;
        Ok(())
    }

    /// Brings the index up to date with the store.
    ///
    /// - Untrained with at least `nlist` stored vectors: trains k-means
    ///   and builds the posting lists from the final assignment.
    /// - Trained: assigns every id added since the last update to its
    ///   nearest centroid. Centroids are not recomputed.
    /// - Untrained with fewer than `nlist` vectors: no-op; the index
    ///   stays a stub and searches keep failing with
    ///   [`Error::NotTrained`].
    ///
    /// # Errors
    ///
    /// Training surfaces [`Error::InvalidVector`] on non-finite data; the
    /// index remains untrained in that case.
    pub fn update(&mut self, store: &VectorStore) -> Result<()> {
        let metric = self.metric;

        let IvfState::Trained {
            centroids,
            dimension,
            postings,
            indexed,
        } = &mut self.state
        else {
            if store.len() < self.nlist {
                return Ok(());
            }
            return self.train(store);
        };

        let dimension = *dimension;
        for id in *indexed..store.len() {
            let cluster = kmeans::nearest_centroid(centroids, dimension, metric, store.row(id));
            postings[cluster].push(id as u64);
        }
        *indexed = store.len();
        Ok(())
    }

    /// Trains centroids over the full store and replaces the state.
    fn train(&mut self, store: &VectorStore) -> Result<()> {
        let output = kmeans::train(
            store.as_flat(),
            store.len(),
            store.dimension(),
            self.nlist,
            self.metric,
            &self.params,
        )?;

        let mut postings = vec![Vec::new(); self.nlist];
        for (id, &cluster) in output.assignments.iter().enumerate() {
            postings[cluster].push(id as u64);
        }

        info!(
            nlist = self.nlist,
            vectors = store.len(),
            iterations = output.iterations,
            metric = ?self.metric,
            "IVF index trained"
        );

        self.state = IvfState::Trained {
            centroids: output.centroids,
            dimension: store.dimension(),
            postings,
            indexed: store.len(),
        };
        Ok(())
    }

    /// The ordered probe set: the `nprobe` centroids nearest to `query`,
    /// ascending by distance with ties toward the smaller cluster index.
    fn probe(&self, centroids: &[f32], dimension: usize, query: &[f32]) -> Vec<SearchResult> {
        let mut selector = TopKSelector::new(self.nprobe);
        for (c, centroid) in centroids.chunks_exact(dimension).enumerate() {
            selector.push(c as u64, self.metric.distance(query, centroid));
        }
        selector.into_sorted()
    }
}

impl VectorIndex for IvfIndex {
    /// Approximate top-k: probes the `nprobe` nearest clusters and scans
    /// only their posting lists.
    ///
    /// Returns at most `min(k, Σ|postings[c]| for probed c)` results.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotTrained`] before a successful `update()`, then
    /// [`Error::EmptyInput`], [`Error::InvalidK`], or
    /// [`Error::DimensionMismatch`] for malformed queries.
    fn search(&self, store: &VectorStore, query: &[f32], k: usize) -> Result<Vec<SearchResult>> {
        let IvfState::Trained {
            centroids,
            dimension,
            postings,
            ..
        } = &self.state
        else {
            return Err(Error::NotTrained);
        };

        if query.is_empty() {
            return Err(Error::EmptyInput("query"));
        }
        if k == 0 {
            return Err(Error::InvalidK(k));
        }
        if query.len() != *dimension {
            return Err(Error::DimensionMismatch {
                expected: *dimension,
                actual: query.len(),
            });
        }

        let mut selector = TopKSelector::new(k);
        for probe in self.probe(centroids, *dimension, query) {
            for &id in &postings[probe.id as usize] {
                let distance = self.metric.distance(query, store.row(id as usize));
                selector.push(id, distance);
            }
        }

        Ok(selector.into_sorted())
    }

    fn len(&self, _store: &VectorStore) -> usize {
        self.indexed_len()
    }
}

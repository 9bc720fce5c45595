//! Engine facade: the vector store and both indexes behind one lock.
//!
//! Many reader threads fan out over searches, status queries, and
//! benchmark runs under a shared lock; writers (inserts, IVF updates,
//! reconfiguration, snapshot loads) take the lock exclusively. A search
//! therefore always sees a point-in-time snapshot of the store, never a
//! half-applied write.

use crate::benchmark::{self, BenchmarkReport, SweepReport};
use crate::config::EngineConfig;
use crate::distance::DistanceMetric;
use crate::error::{Error, Result};
use crate::index::ivf::{IvfIndex, KmeansParams};
use crate::index::{BruteForceIndex, SearchResult, VectorIndex};
use crate::snapshot::Snapshot;
use crate::store::VectorStore;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Contract for the external text-to-embedding service.
///
/// The engine never talks HTTP itself; the surrounding layer provides an
/// implementation of this trait. Failures map to [`Error::Backend`].
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds a single text into a vector.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when the service is unreachable or
    /// responds with a malformed payload.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embeds a batch of texts, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when the service is unreachable or
    /// responds with a malformed payload.
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Search response envelope, mirroring what the HTTP layer serialises.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    /// Ordered search hits.
    pub results: Vec<SearchResult>,
    /// Wall time of the search call, in milliseconds.
    pub search_time_ms: f64,
    /// Which index served the query: `"bruteforce"` or `"ivf"`.
    pub index_type: &'static str,
    /// Number of vectors searchable through the serving index at the
    /// time of the query.
    pub index_size: usize,
}

/// Status of one index.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct IndexStatus {
    /// True when the index can serve searches.
    pub initialised: bool,
    /// Number of vectors searchable through the index.
    pub vector_count: usize,
}

/// Combined status of both indexes.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EngineStatus {
    /// Brute-force index status.
    pub bruteforce: IndexStatus,
    /// IVF index status.
    pub ivf: IndexStatus,
    /// Current number of IVF clusters.
    pub nlist: usize,
    /// Current number of probed clusters.
    pub nprobe: usize,
}

/// Store-level information for status endpoints.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StoreInfo {
    /// Number of stored vectors.
    pub size: usize,
    /// Vector dimension; 0 until the first insert.
    pub dimension: usize,
}

/// Outcome of an IVF reconfiguration.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ConfigureReport {
    /// True when the nlist change forced a rebuild and training
    /// succeeded over the current store.
    pub retrained: bool,
}

/// State guarded by the engine's reader-writer lock.
struct EngineState {
    store: VectorStore,
    ivf: IvfIndex,
}

/// In-process vector search engine.
///
/// Owns the canonical vector data and both retrieval indexes. All public
/// operations are `&self`: interior mutability is confined to one
/// `parking_lot::RwLock` over the (store, IVF) pair, and the stateless
/// brute-force scanner lives outside it.
pub struct Engine {
    bf: BruteForceIndex,
    state: RwLock<EngineState>,
    snapshot: Snapshot,
    kmeans: KmeansParams,
    embedder: Option<Arc<dyn EmbeddingProvider>>,
}

impl Engine {
    /// Creates an engine from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] when the configuration fails
    /// validation.
    pub fn new(config: &EngineConfig) -> Result<Self> {
        config.validate()?;

        let kmeans = KmeansParams {
            max_iterations: config.ivf.max_iterations,
            tolerance: config.ivf.tolerance,
        };
        let ivf = IvfIndex::with_params(config.metric, config.ivf.nlist, config.ivf.nprobe, kmeans)?;

        Ok(Self {
            bf: BruteForceIndex::new(config.metric),
            state: RwLock::new(EngineState {
                store: VectorStore::new(),
                ivf,
            }),
            snapshot: Snapshot::new(&config.snapshot.path),
            kmeans,
            embedder: None,
        })
    }

    /// Attaches an embedding provider, enabling the text-level insert
    /// operations.
    #[must_use]
    pub fn with_embedder(mut self, embedder: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    /// The distance metric shared by both indexes.
    #[must_use]
    pub fn metric(&self) -> DistanceMetric {
        self.bf.metric()
    }

    /// Appends one vector and refreshes the IVF index.
    ///
    /// # Errors
    ///
    /// Store validation errors surface unchanged; an IVF training
    /// failure is reported after the vector has been stored.
    pub fn add_vector(&self, vector: &[f32]) -> Result<u64> {
        let mut state = self.state.write();
        let id = state.store.add(vector)?;
        let EngineState { store, ivf } = &mut *state;
        ivf.update(store)?;
        Ok(id)
    }

    /// Appends a batch of vectors (all-or-nothing) and refreshes the IVF
    /// index so the new ids become searchable through it.
    ///
    /// # Errors
    ///
    /// Store validation errors surface unchanged and leave the store
    /// untouched.
    pub fn add_batch(&self, vectors: &[Vec<f32>]) -> Result<Range<u64>> {
        let mut state = self.state.write();
        let ids = state.store.add_batch(vectors)?;
        let EngineState { store, ivf } = &mut *state;
        ivf.update(store)?;
        debug!(count = vectors.len(), "batch added to store");
        Ok(ids)
    }

    /// Seeds the engine from the durable text/embedding store at
    /// startup. Equivalent to [`add_batch`](Engine::add_batch); the
    /// caller iterates its persistence layer and hands over the dump.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`add_batch`](Engine::add_batch).
    pub fn seed(&self, vectors: &[Vec<f32>]) -> Result<Range<u64>> {
        let ids = self.add_batch(vectors)?;
        info!(count = ids.end - ids.start, "engine seeded");
        Ok(ids)
    }

    /// Embeds `text` through the attached provider and appends the
    /// resulting vector. The embedding call happens outside the lock.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Backend`] when no provider is attached or the
    /// provider fails; store errors surface unchanged.
    pub fn add_text(&self, text: &str) -> Result<u64> {
        let vector = self.embedder()?.embed(text)?;
        self.add_vector(&vector)
    }

    /// Embeds a batch of texts and appends the resulting vectors.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`add_text`](Engine::add_text).
    pub fn add_text_batch(&self, texts: &[String]) -> Result<Range<u64>> {
        let vectors = self.embedder()?.embed_batch(texts)?;
        self.add_batch(&vectors)
    }

    /// Exact search over the whole store.
    ///
    /// # Errors
    ///
    /// See [`BruteForceIndex::search`][crate::index::BruteForceIndex].
    pub fn bf_search(&self, query: &[f32], k: usize) -> Result<SearchResponse> {
        let state = self.state.read();
        let start = Instant::now();
        let results = self.bf.search(&state.store, query, k)?;

        Ok(SearchResponse {
            results,
            search_time_ms: start.elapsed().as_secs_f64() * 1_000.0,
            index_type: "bruteforce",
            index_size: state.store.len(),
        })
    }

    /// Approximate search through the IVF index.
    ///
    /// # Errors
    ///
    /// See [`IvfIndex::search`][crate::index::IvfIndex]; in particular
    /// [`Error::NotTrained`] before the first successful update.
    pub fn ivf_search(&self, query: &[f32], k: usize) -> Result<SearchResponse> {
        let state = self.state.read();
        let start = Instant::now();
        let results = state.ivf.search(&state.store, query, k)?;

        Ok(SearchResponse {
            results,
            search_time_ms: start.elapsed().as_secs_f64() * 1_000.0,
            index_type: "ivf",
            index_size: state.ivf.indexed_len(),
        })
    }

    /// Reconfigures the IVF index.
    ///
    /// A changed `nlist` discards the trained index and rebuilds it from
    /// scratch over the current store; an unchanged `nlist` only adjusts
    /// `nprobe` in place.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfig`] for an invalid pair. Rebuild
    /// training failures surface unchanged and leave the previous index
    /// replaced by the untrained rebuild, matching the discard-and-
    /// rebuild contract.
    pub fn configure_ivf(&self, nlist: usize, nprobe: usize) -> Result<ConfigureReport> {
        let mut state = self.state.write();

        if nlist == state.ivf.nlist() {
            state.ivf.set_nprobe(nprobe)?;
            debug!(nlist, nprobe, "IVF nprobe reconfigured");
            return Ok(ConfigureReport { retrained: false });
        }

        let mut ivf = IvfIndex::with_params(self.metric(), nlist, nprobe, self.kmeans)?;
        ivf.update(&state.store)?;
        let retrained = ivf.is_trained();
        state.ivf = ivf;

        info!(nlist, nprobe, retrained, "IVF index rebuilt");
        Ok(ConfigureReport { retrained })
    }

    /// Per-index status plus the current IVF parameters.
    #[must_use]
    pub fn status(&self) -> EngineStatus {
        let state = self.state.read();
        EngineStatus {
            bruteforce: IndexStatus {
                initialised: !state.store.is_empty(),
                vector_count: state.store.len(),
            },
            ivf: IndexStatus {
                initialised: state.ivf.is_trained(),
                vector_count: state.ivf.indexed_len(),
            },
            nlist: state.ivf.nlist(),
            nprobe: state.ivf.nprobe(),
        }
    }

    /// Store size and dimension.
    #[must_use]
    pub fn info(&self) -> StoreInfo {
        let state = self.state.read();
        StoreInfo {
            size: state.store.len(),
            dimension: state.store.dimension(),
        }
    }

    /// Benchmarks both indexes over a query set.
    ///
    /// # Errors
    ///
    /// The first failing query search is surfaced as-is.
    pub fn benchmark(&self, queries: &[Vec<f32>], k: usize) -> Result<BenchmarkReport> {
        let state = self.state.read();
        benchmark::run(&state.store, &self.bf, &state.ivf, queries, k)
    }

    /// Sweeps the `(nlist, nprobe)` grid over the current store and
    /// returns the measured points plus the best operating points.
    ///
    /// # Errors
    ///
    /// Training and search failures inside the sweep surface as-is.
    pub fn ivf_param_sweep(
        &self,
        queries: &[Vec<f32>],
        k: usize,
        nlist_values: &[usize],
        nprobe_values: &[usize],
    ) -> Result<SweepReport> {
        let state = self.state.read();
        benchmark::sweep(
            &state.store,
            &self.bf,
            self.kmeans,
            queries,
            k,
            nlist_values,
            nprobe_values,
        )
    }

    /// Writes the current store contents to the configured snapshot
    /// file and returns the number of vectors saved.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] on filesystem failures.
    pub fn save_snapshot(&self) -> Result<usize> {
        let state = self.state.read();
        let vectors = state.store.to_rows();
        self.snapshot.save(&vectors)?;
        Ok(vectors.len())
    }

    /// Loads the snapshot file, appends its vectors to the store, and
    /// refreshes the IVF index. Returns the number of vectors loaded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Snapshot`] / [`Error::Io`] for unreadable files
    /// and store errors when the snapshot dimension conflicts with
    /// already-stored vectors.
    pub fn load_snapshot(&self) -> Result<usize> {
        let mut state = self.state.write();
        let vectors = self.snapshot.load()?;
        state.store.add_batch(&vectors)?;
        let EngineState { store, ivf } = &mut *state;
        ivf.update(store)?;
        Ok(vectors.len())
    }

    /// Header of the configured snapshot file: `(count, dimension)`.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Snapshot::info`].
    pub fn snapshot_info(&self) -> Result<(u64, usize)> {
        self.snapshot.info()
    }

    fn embedder(&self) -> Result<&dyn EmbeddingProvider> {
        self.embedder
            .as_deref()
            .ok_or_else(|| Error::Backend("no embedding provider configured".into()))
    }
}

//! # `Lynx` Core
//!
//! In-process vector similarity search engine for dense `f32` embeddings.
//!
//! A query vector is matched against the stored vectors under a
//! configured distance metric through one of two strategies:
//!
//! - **Brute force**: exact top-k by scanning every stored vector
//! - **IVF**: approximate top-k through an inverted file over k-means
//!   clusters, trading recall for latency via `nprobe`
//!
//! ## Quick Start
//!
//! ```rust
//! use lynx_core::{DistanceMetric, EngineConfig, Engine};
//!
//! # fn main() -> lynx_core::Result<()> {
//! let mut config = EngineConfig::default();
//! config.metric = DistanceMetric::L2;
//! config.ivf.nlist = 4;
//! config.ivf.nprobe = 2;
//!
//! let engine = Engine::new(&config)?;
//! engine.add_batch(&(0..16).map(|i| vec![i as f32, 1.0, 0.0]).collect::<Vec<_>>())?;
//!
//! let exact = engine.bf_search(&[3.0, 1.0, 0.0], 5)?;
//! let approx = engine.ivf_search(&[3.0, 1.0, 0.0], 5)?;
//! assert_eq!(exact.results[0].id, approx.results[0].id);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod benchmark;
pub mod config;
pub mod distance;
pub mod engine;
pub mod error;
pub mod index;
pub mod snapshot;
pub mod store;
pub mod topk;

#[cfg(test)]
mod error_tests;
#[cfg(test)]
mod store_tests;
#[cfg(test)]
mod topk_tests;

pub use benchmark::{BenchmarkReport, SummaryStats, SweepPoint, SweepReport};
pub use config::EngineConfig;
pub use distance::DistanceMetric;
pub use engine::{EmbeddingProvider, Engine, SearchResponse};
pub use error::{Error, Result};
pub use index::{BruteForceIndex, IvfIndex, SearchResult, VectorIndex};
pub use snapshot::Snapshot;
pub use store::VectorStore;
pub use topk::TopKSelector;

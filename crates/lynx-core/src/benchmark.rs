//! Recall and latency benchmarking for the retrieval indexes.
//!
//! The brute-force index is the ground truth: recall@k for the IVF index
//! is the fraction of exact top-k ids it recovers. The parameter sweep
//! maps the (recall, latency) plane over a grid of `(nlist, nprobe)`
//! pairs and picks the best operating points under four selection rules.

use crate::error::{Error, Result};
use crate::index::ivf::{IvfIndex, KmeansParams};
use crate::index::{BruteForceIndex, SearchResult, VectorIndex};
use crate::store::VectorStore;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Instant;
use tracing::{debug, info};

/// Calculates recall@k: the fraction of exact top-k ids recovered by the
/// approximate result.
///
/// # Formula
///
/// `recall@k = |exact_ids ∩ approx_ids| / k`
#[must_use]
pub fn recall_at_k(exact: &[SearchResult], approx: &[SearchResult], k: usize) -> f64 {
    if k == 0 {
        return 0.0;
    }

    let exact_ids: HashSet<u64> = exact.iter().map(|r| r.id).collect();
    let matches = approx.iter().filter(|r| exact_ids.contains(&r.id)).count();

    #[allow(clippy::cast_precision_loss)]
    let recall = matches as f64 / k as f64;
    recall
}

/// Summary statistics over a sample set.
///
/// The standard deviation uses the population formula
/// `sqrt(E[X²] - (E[X])²)`; the median takes the lower-middle element on
/// even sample counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    /// Number of samples.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Median (lower-middle on even counts).
    pub median: f64,
    /// Smallest sample.
    pub min: f64,
    /// Largest sample.
    pub max: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl SummaryStats {
    /// Computes summary statistics over `samples`.
    ///
    /// An empty sample set yields all-zero statistics.
    #[must_use]
    pub fn from_samples(samples: &[f64]) -> Self {
        if samples.is_empty() {
            return Self {
                count: 0,
                mean: 0.0,
                median: 0.0,
                min: 0.0,
                max: 0.0,
                std_dev: 0.0,
            };
        }

        #[allow(clippy::cast_precision_loss)]
        let n = samples.len() as f64;
        let mean = samples.iter().sum::<f64>() / n;
        let mean_sq = samples.iter().map(|x| x * x).sum::<f64>() / n;
        let variance = (mean_sq - mean * mean).max(0.0);

        let mut sorted = samples.to_vec();
        sorted.sort_by(f64::total_cmp);
        let median = sorted[(sorted.len() - 1) / 2];

        Self {
            count: samples.len(),
            mean,
            median,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            std_dev: variance.sqrt(),
        }
    }
}

/// Outcome of benchmarking a query set against both indexes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Top-k used for every query.
    pub k: usize,
    /// Recall@k of the IVF index per query.
    pub recall: SummaryStats,
    /// Brute-force latency per query, in milliseconds.
    pub bf_latency_ms: SummaryStats,
    /// IVF latency per query, in milliseconds.
    pub ivf_latency_ms: SummaryStats,
    /// Mean of the per-query `bf_time / ivf_time` ratios.
    pub mean_speedup: f64,
}

/// Runs every query against both indexes and aggregates recall, latency,
/// and speedup.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty query set; the first
/// failing query search is surfaced as-is.
pub fn run(
    store: &VectorStore,
    bf: &BruteForceIndex,
    ivf: &IvfIndex,
    queries: &[Vec<f32>],
    k: usize,
) -> Result<BenchmarkReport> {
    if queries.is_empty() {
        return Err(Error::EmptyInput("queries"));
    }

    let mut recalls = Vec::with_capacity(queries.len());
    let mut bf_times = Vec::with_capacity(queries.len());
    let mut ivf_times = Vec::with_capacity(queries.len());
    let mut speedups = Vec::with_capacity(queries.len());

    for query in queries {
        let (exact, bf_ms) = timed(|| bf.search(store, query, k))?;
        let (approx, ivf_ms) = timed(|| ivf.search(store, query, k))?;

        recalls.push(recall_at_k(&exact, &approx, k));
        bf_times.push(bf_ms);
        ivf_times.push(ivf_ms);
        speedups.push(bf_ms / ivf_ms);
    }

    #[allow(clippy::cast_precision_loss)]
    let mean_speedup = speedups.iter().sum::<f64>() / speedups.len() as f64;

    Ok(BenchmarkReport {
        k,
        recall: SummaryStats::from_samples(&recalls),
        bf_latency_ms: SummaryStats::from_samples(&bf_times),
        ivf_latency_ms: SummaryStats::from_samples(&ivf_times),
        mean_speedup,
    })
}

/// One measured operating point of the parameter sweep.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SweepPoint {
    /// Number of clusters the temporary index was trained with.
    pub nlist: usize,
    /// Number of probed clusters.
    pub nprobe: usize,
    /// Mean recall@k over the query set.
    pub mean_recall: f64,
    /// Mean IVF latency over the query set, in milliseconds.
    pub mean_latency_ms: f64,
    /// `mean_bf_latency / mean_ivf_latency` over the query set.
    pub speedup: f64,
}

/// Sweep results plus the best operating points under each selection
/// rule. The options are `None` only when the grid produced no valid
/// `(nlist, nprobe)` pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SweepReport {
    /// Every measured `(nlist, nprobe)` point.
    pub results: Vec<SweepPoint>,
    /// Highest `mean_recall * speedup` (recall-weighted throughput).
    pub best_speedup: Option<SweepPoint>,
    /// Highest mean recall.
    pub best_recall: Option<SweepPoint>,
    /// Lowest mean latency.
    pub best_latency: Option<SweepPoint>,
    /// Knee of the recall/latency curve under min-max normalisation.
    pub best_balanced: Option<SweepPoint>,
}

/// Sweeps the `(nlist, nprobe)` grid over the same store and query set.
///
/// For each `nlist` a temporary IVF index is trained once; each
/// `nprobe <= nlist` is then measured by reconfiguring the probe count
/// in place. Pairs with `nprobe > nlist` are skipped.
///
/// # Errors
///
/// Returns [`Error::EmptyInput`] for an empty query set. Training and
/// search failures (e.g. an `nlist` larger than the store) are surfaced
/// as-is.
pub fn sweep(
    store: &VectorStore,
    bf: &BruteForceIndex,
    params: KmeansParams,
    queries: &[Vec<f32>],
    k: usize,
    nlist_values: &[usize],
    nprobe_values: &[usize],
) -> Result<SweepReport> {
    if queries.is_empty() {
        return Err(Error::EmptyInput("queries"));
    }

    // Ground truth and the brute-force baseline cost are independent of
    // the grid; measure them once.
    let mut exact = Vec::with_capacity(queries.len());
    let mut bf_times = Vec::with_capacity(queries.len());
    for query in queries {
        let (results, bf_ms) = timed(|| bf.search(store, query, k))?;
        exact.push(results);
        bf_times.push(bf_ms);
    }
    #[allow(clippy::cast_precision_loss)]
    let mean_bf_ms = bf_times.iter().sum::<f64>() / bf_times.len() as f64;

    let mut results = Vec::new();
    for &nlist in nlist_values {
        let probes: Vec<usize> = nprobe_values.iter().copied().filter(|&p| p <= nlist).collect();
        let Some(&first_probe) = probes.first() else {
            continue;
        };

        if store.len() < nlist {
            return Err(Error::InsufficientData {
                needed: nlist,
                available: store.len(),
            });
        }

        let mut ivf = IvfIndex::with_params(bf.metric(), nlist, first_probe, params)?;
        ivf.update(store)?;

        for nprobe in probes {
            ivf.set_nprobe(nprobe)?;

            let mut recalls = Vec::with_capacity(queries.len());
            let mut ivf_times = Vec::with_capacity(queries.len());
            for (query, truth) in queries.iter().zip(exact.iter()) {
                let (approx, ivf_ms) = timed(|| ivf.search(store, query, k))?;
                recalls.push(recall_at_k(truth, &approx, k));
                ivf_times.push(ivf_ms);
            }

            #[allow(clippy::cast_precision_loss)]
            let mean_latency_ms = ivf_times.iter().sum::<f64>() / ivf_times.len() as f64;
            #[allow(clippy::cast_precision_loss)]
            let mean_recall = recalls.iter().sum::<f64>() / recalls.len() as f64;

            let point = SweepPoint {
                nlist,
                nprobe,
                mean_recall,
                mean_latency_ms,
                speedup: mean_bf_ms / mean_latency_ms,
            };
            debug!(?point, "sweep point measured");
            results.push(point);
        }
    }

    info!(points = results.len(), k, "parameter sweep complete");
    Ok(SweepReport::from_points(results))
}

impl SweepReport {
    /// Builds a report from measured points, applying all four selection
    /// rules. Ties resolve to the earliest measured point.
    #[must_use]
    pub fn from_points(results: Vec<SweepPoint>) -> Self {
        Self {
            best_speedup: select_max(&results, |p| p.mean_recall * p.speedup),
            best_recall: select_max(&results, |p| p.mean_recall),
            best_latency: select_max(&results, |p| -p.mean_latency_ms),
            best_balanced: select_balanced(&results),
            results,
        }
    }
}

/// First point maximising `score`, or `None` on an empty set.
fn select_max(points: &[SweepPoint], score: impl Fn(&SweepPoint) -> f64) -> Option<SweepPoint> {
    points
        .iter()
        .copied()
        .reduce(|best, p| if score(&p) > score(&best) { p } else { best })
}

/// Knee selection: min-max normalise recall and latency over the result
/// set and maximise `norm_recall - norm_latency`. A zero range collapses
/// the normalised value to 1 to avoid division by zero.
fn select_balanced(points: &[SweepPoint]) -> Option<SweepPoint> {
    if points.is_empty() {
        return None;
    }

    let normalize = |x: f64, min: f64, max: f64| {
        if max - min == 0.0 {
            1.0
        } else {
            (x - min) / (max - min)
        }
    };

    let (min_r, max_r) = min_max(points.iter().map(|p| p.mean_recall));
    let (min_l, max_l) = min_max(points.iter().map(|p| p.mean_latency_ms));

    select_max(points, |p| {
        normalize(p.mean_recall, min_r, max_r) - normalize(p.mean_latency_ms, min_l, max_l)
    })
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(min, max), x| {
        (min.min(x), max.max(x))
    })
}

/// Runs `op` and pairs its output with the elapsed wall time in
/// milliseconds.
fn timed<T>(op: impl FnOnce() -> Result<T>) -> Result<(T, f64)> {
    let start = Instant::now();
    let value = op()?;
    Ok((value, start.elapsed().as_secs_f64() * 1_000.0))
}

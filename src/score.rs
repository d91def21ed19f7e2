//! Window scorer: pick the best fixed-length window of a consensus.

use crate::error::{DesignError, Result};
use crate::index::KmerPool;

/// How a per-target hit vector collapses into one window score.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScoreAggregate {
    /// Median of the hit vector; zeros count as zeros.
    #[default]
    Median,
    /// Geometric mean with every zero replaced by 1.
    GeometricMean,
}

impl ScoreAggregate {
    pub fn score(self, hits: &[u32]) -> f64 {
        match self {
            ScoreAggregate::Median => median(hits),
            ScoreAggregate::GeometricMean => geometric_mean(hits),
        }
    }
}

/// Median of `values`; mean of the two middle values for even lengths, 0 when empty.
pub fn median(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] as f64 + sorted[mid] as f64) / 2.0
    } else {
        sorted[mid] as f64
    }
}

/// Geometric mean with zeros counted as 1, computed in log space.
pub fn geometric_mean(values: &[u32]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let log_sum: f64 = values.iter().map(|&v| (v.max(1) as f64).ln()).sum();
    (log_sum / values.len() as f64).exp()
}

/// A selected construct: sequence, per-target k-mer hits and aggregate score.
#[derive(Clone, Debug, PartialEq)]
pub struct Construct {
    pub seq: String,
    pub kmer_hits: Vec<u32>,
    pub score: f64,
}

/// Scan every `window_len` window of `consensus` and keep the best-scoring one.
///
/// Hit vectors come from the unconsumed `pool`, so k-mers used up during assembly
/// still count. Only a strictly higher score replaces the incumbent.
pub fn select_best_window(
    pool: &KmerPool,
    consensus: &str,
    window_len: usize,
    kmer_len: usize,
    aggregate: ScoreAggregate,
) -> Result<Construct> {
    if consensus.len() < window_len {
        return Err(DesignError::ConsensusTooShort {
            len: consensus.len(),
            construct_len: window_len,
        });
    }
    let n = pool.n_targets();
    let zeros = vec![0u32; n];

    let per_kmer: Vec<&[u32]> = if kmer_len == 0 || consensus.len() < kmer_len {
        Vec::new()
    } else {
        (0..=consensus.len() - kmer_len)
            .map(|i| pool.get(&consensus[i..i + kmer_len]).unwrap_or(zeros.as_slice()))
            .collect()
    };
    // k-mers fully inside one window
    let per_window = (window_len + 1).saturating_sub(kmer_len);

    let mut best: Option<(usize, Vec<u32>, f64)> = None;
    for start in 0..=consensus.len() - window_len {
        let mut hits = vec![0u32; n];
        let end = (start + per_window).min(per_kmer.len());
        for kmer_hits in &per_kmer[start.min(end)..end] {
            for (acc, &h) in hits.iter_mut().zip(kmer_hits.iter()) {
                *acc += h;
            }
        }
        let score = aggregate.score(&hits);
        if best.as_ref().is_none_or(|(_, _, s)| score > *s) {
            best = Some((start, hits, score));
        }
    }

    let (start, kmer_hits, score) = best.unwrap_or((0, zeros, 0.0));
    Ok(Construct {
        seq: consensus[start..start + window_len].to_string(),
        kmer_hits,
        score,
    })
}

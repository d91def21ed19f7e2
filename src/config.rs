//! Run configuration.

use crate::error::{DesignError, Result};
use crate::score::ScoreAggregate;

/// Default read chunk for the binary off-target stream (64 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Design-time configuration.
#[derive(Clone, Debug)]
pub struct DesignConfig {
    kmer_len: usize,
    construct_len: usize,
    iterations: usize,
    threads: Option<usize>,
    workers: usize,
    chunk_size: usize,
    seed: Option<u64>,
    aggregate: ScoreAggregate,
}

impl Default for DesignConfig {
    fn default() -> Self {
        Self {
            kmer_len: 21,
            construct_len: 300,
            iterations: 100,
            threads: None,
            workers: 32,
            chunk_size: DEFAULT_CHUNK_SIZE,
            seed: None,
            aggregate: ScoreAggregate::Median,
        }
    }
}

impl DesignConfig {
    /// Target k-mer length L.
    pub fn with_kmer_len(mut self, k: usize) -> Self {
        self.kmer_len = k;
        self
    }
    /// Construct (window) length W.
    pub fn with_construct_len(mut self, w: usize) -> Self {
        self.construct_len = w;
        self
    }
    /// Number of independent search trials.
    pub fn with_iterations(mut self, n: usize) -> Self {
        self.iterations = n;
        self
    }
    /// Fix the number of threads used by rayon.
    pub fn with_threads(mut self, n: usize) -> Self {
        self.threads = Some(n);
        self
    }
    /// Worker threads for the binary off-target stream.
    pub fn with_workers(mut self, n: usize) -> Self {
        self.workers = n;
        self
    }
    /// Chunk size in bytes for the binary off-target stream.
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes;
        self
    }
    /// Base seed; trial `i` uses `seed + i`.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
    /// Per-window score aggregate.
    pub fn with_aggregate(mut self, a: ScoreAggregate) -> Self {
        self.aggregate = a;
        self
    }

    pub fn kmer_len(&self) -> usize {
        self.kmer_len
    }
    pub fn construct_len(&self) -> usize {
        self.construct_len
    }
    pub(crate) fn iterations(&self) -> usize {
        self.iterations
    }
    pub(crate) fn threads(&self) -> Option<usize> {
        self.threads
    }
    pub(crate) fn workers(&self) -> usize {
        self.workers
    }
    pub(crate) fn chunk_size(&self) -> usize {
        self.chunk_size
    }
    pub(crate) fn seed(&self) -> Option<u64> {
        self.seed
    }
    pub(crate) fn aggregate(&self) -> ScoreAggregate {
        self.aggregate
    }

    /// Reject values no run can succeed with.
    pub fn validate(&self) -> Result<()> {
        if self.kmer_len == 0 {
            return Err(DesignError::Config("k-mer length must be at least 1".into()));
        }
        if self.construct_len < self.kmer_len {
            return Err(DesignError::Config(format!(
                "construct length {} is shorter than k-mer length {}",
                self.construct_len, self.kmer_len
            )));
        }
        if self.iterations == 0 {
            return Err(DesignError::Config("iterations must be at least 1".into()));
        }
        if self.workers == 0 {
            return Err(DesignError::Config("workers must be at least 1".into()));
        }
        if self.chunk_size < 8 {
            return Err(DesignError::Config(
                "chunk size must hold at least one 8-byte record".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(DesignError::Config("threads must be at least 1".into()));
        }
        Ok(())
    }
}

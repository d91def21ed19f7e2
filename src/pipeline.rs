//! End-to-end run: index targets, filter off-targets, search for the best construct.

use log::{info, warn};

use crate::config::DesignConfig;
use crate::error::{DesignError, Result};
use crate::filter::OffTargetFilter;
use crate::index::{KmerPool, build_index};
use crate::io::StreamOptions;
use crate::score::Construct;
use crate::search::{SearchParams, search};
use crate::seq::SequenceRecord;

/// Everything a run hands to the reporting side.
#[derive(Clone, Debug)]
pub struct DesignOutcome {
    /// Best construct, or `None` when no trial produced one.
    pub construct: Option<Construct>,
    /// Filtered target pool the construct was scored against.
    pub pool: KmerPool,
    /// Entries removed by the off-target filter.
    pub removed: usize,
    /// Base seed the trials were derived from.
    pub seed: u64,
}

/// Stream options for the binary filter taken from `cfg`.
pub fn stream_options(cfg: &DesignConfig) -> StreamOptions {
    StreamOptions {
        workers: cfg.workers(),
        chunk_size: cfg.chunk_size(),
    }
}

/// Run the whole design pipeline.
pub fn design_construct(
    targets: &[SequenceRecord],
    filter: Option<&OffTargetFilter>,
    cfg: &DesignConfig,
) -> Result<DesignOutcome> {
    cfg.validate()?;
    match cfg.threads() {
        Some(n) => rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build()
            .map_err(|e| DesignError::Config(e.to_string()))?
            .install(|| run(targets, filter, cfg)),
        None => run(targets, filter, cfg),
    }
}

fn run(
    targets: &[SequenceRecord],
    filter: Option<&OffTargetFilter>,
    cfg: &DesignConfig,
) -> Result<DesignOutcome> {
    info!("Getting target sequence k-mers (k={})", cfg.kmer_len());
    let mut pool = build_index(targets, cfg.kmer_len());
    info!("{} distinct k-mers across {} targets", pool.len(), pool.n_targets());

    let removed = match filter {
        Some(f) => {
            info!("Subtracting off-target k-mers ({} strategy)", f.name());
            f.apply(&mut pool)?
        }
        None => 0,
    };

    let abundance = pool.abundance();
    let seed = cfg.seed().unwrap_or_else(rand::random);
    info!("Finding best construct: {} iterations, seed {seed}", cfg.iterations());
    let params = SearchParams {
        kmer_len: cfg.kmer_len(),
        construct_len: cfg.construct_len(),
        iterations: cfg.iterations(),
        seed,
        aggregate: cfg.aggregate(),
    };
    let construct = search(&pool, &abundance, &params)?;
    match &construct {
        Some(c) => info!("best construct score {:.3}", c.score),
        None => warn!("no trial produced a construct of length {}", cfg.construct_len()),
    }

    Ok(DesignOutcome {
        construct,
        pool,
        removed,
        seed,
    })
}

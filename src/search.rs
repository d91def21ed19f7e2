//! Multi-iteration search: independent randomized trials reduced to one construct.

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::StdRng;
use rayon::prelude::*;

use crate::builder::ConsensusBuilder;
use crate::error::{DesignError, Result};
use crate::index::{Abundance, KmerPool};
use crate::score::{Construct, ScoreAggregate, select_best_window};

/// Parameters of one search batch.
#[derive(Clone, Copy, Debug)]
pub struct SearchParams {
    pub kmer_len: usize,
    pub construct_len: usize,
    pub iterations: usize,
    pub seed: u64,
    pub aggregate: ScoreAggregate,
}

/// One trial: seed, assemble on a private abundance copy, then score against `pool`.
pub fn run_trial(
    pool: &KmerPool,
    abundance: &Abundance,
    seeds: &[String],
    params: &SearchParams,
    rng: &mut StdRng,
) -> Result<Construct> {
    let mut builder = ConsensusBuilder::new(abundance.clone(), params.kmer_len, rng);
    let seed = builder.pick_seed(seeds)?;
    let consensus = builder.assemble(seed);
    select_best_window(
        pool,
        &consensus,
        params.construct_len,
        params.kmer_len,
        params.aggregate,
    )
}

/// Run `params.iterations` trials in parallel and keep the highest-scoring construct.
///
/// Trials whose consensus is too short yield nothing; `Ok(None)` means no trial
/// succeeded. Trial `i` draws from `StdRng::seed_from_u64(seed + i)` and ties go to
/// the lowest trial index, so the result does not depend on scheduling.
pub fn search(
    pool: &KmerPool,
    abundance: &Abundance,
    params: &SearchParams,
) -> Result<Option<Construct>> {
    if abundance.is_empty() {
        return Err(DesignError::EmptyPool);
    }
    let mut seeds: Vec<String> = abundance.keys().cloned().collect();
    seeds.sort_unstable();

    let outcomes: Vec<Result<Construct>> = (0..params.iterations)
        .into_par_iter()
        .map(|i| {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(i as u64));
            run_trial(pool, abundance, &seeds, params, &mut rng)
        })
        .collect();

    let mut best: Option<Construct> = None;
    let mut failed = 0usize;
    for outcome in outcomes {
        match outcome {
            Ok(c) => {
                if best.as_ref().is_none_or(|b| c.score > b.score) {
                    best = Some(c);
                }
            }
            Err(e) if e.is_trial_local() => {
                debug!("trial produced no candidate: {e}");
                failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!(
        "{} of {} trials produced a candidate",
        params.iterations - failed,
        params.iterations
    );
    Ok(best)
}

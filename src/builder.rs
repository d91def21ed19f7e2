//! Construct builder: randomized greedy consensus extension over a consumable
//! abundance map.
//!
//! Each trial owns its map. Every k-mer used to extend the consensus is removed
//! from it, so the walk cannot revisit a k-mer and always terminates.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::error::{DesignError, Result};
use crate::index::Abundance;

const NUCLEOTIDES: [char; 4] = ['A', 'C', 'G', 'T'];

/// Greedy consensus assembler for one trial.
pub struct ConsensusBuilder<'r, R: Rng> {
    abundance: Abundance,
    kmer_len: usize,
    rng: &'r mut R,
}

impl<'r, R: Rng> ConsensusBuilder<'r, R> {
    /// Take ownership of a private copy of the abundance map.
    pub fn new(abundance: Abundance, kmer_len: usize, rng: &'r mut R) -> Self {
        Self {
            abundance,
            kmer_len,
            rng,
        }
    }

    /// Pick a seed k-mer uniformly from `candidates`.
    pub fn pick_seed<'a>(&mut self, candidates: &'a [String]) -> Result<&'a str> {
        candidates
            .choose(&mut *self.rng)
            .map(String::as_str)
            .ok_or(DesignError::EmptyPool)
    }

    /// Extend `seed` forward, then backward, until no candidate k-mer is left.
    ///
    /// The seed is consumed first, so the walk cannot come back through it.
    pub fn assemble(mut self, seed: &str) -> String {
        self.abundance.remove(seed);
        let forward = self.extend_forward(seed.to_string());
        self.extend_backward(forward)
    }

    /// Append bases while the trailing (L-1)-mer has a live successor.
    pub fn extend_forward(&mut self, mut consensus: String) -> String {
        if self.kmer_len == 0 || consensus.len() < self.kmer_len {
            return consensus;
        }
        loop {
            let suffix = &consensus[consensus.len() + 1 - self.kmer_len..];
            match self.best_extension(|nuc| format!("{suffix}{nuc}")) {
                Some((nuc, kmer)) => {
                    consensus.push(nuc);
                    self.abundance.remove(&kmer);
                }
                None => return consensus,
            }
        }
    }

    /// Prepend bases while the leading (L-1)-mer has a live predecessor.
    pub fn extend_backward(&mut self, mut consensus: String) -> String {
        if self.kmer_len == 0 || consensus.len() < self.kmer_len {
            return consensus;
        }
        loop {
            let prefix = &consensus[..self.kmer_len - 1];
            match self.best_extension(|nuc| format!("{nuc}{prefix}")) {
                Some((nuc, kmer)) => {
                    consensus.insert(0, nuc);
                    self.abundance.remove(&kmer);
                }
                None => return consensus,
            }
        }
    }

    /// Highest-abundance live candidate; ties go to a uniformly random base.
    fn best_extension<F>(&mut self, candidate: F) -> Option<(char, String)>
    where
        F: Fn(char) -> String,
    {
        let mut order = NUCLEOTIDES;
        order.shuffle(&mut *self.rng);

        let mut best: Option<(char, String, u32)> = None;
        for nuc in order {
            let kmer = candidate(nuc);
            if let Some(&count) = self.abundance.get(&kmer) {
                if count > best.as_ref().map_or(0, |b| b.2) {
                    best = Some((nuc, kmer, count));
                }
            }
        }
        best.map(|(nuc, kmer, _)| (nuc, kmer))
    }

    /// Remaining (unconsumed) abundance map.
    pub fn remaining(&self) -> &Abundance {
        &self.abundance
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn abundance(pairs: &[(&str, u32)]) -> Abundance {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn forward_prefers_higher_abundance() {
        let mut rng = StdRng::seed_from_u64(7);
        let map = abundance(&[("CGA", 1), ("CGT", 3)]);
        let mut b = ConsensusBuilder::new(map, 3, &mut rng);
        let cons = b.extend_forward("ACG".to_string());
        assert_eq!(cons, "ACGT");
        assert!(!b.remaining().contains_key("CGT"));
        assert!(b.remaining().contains_key("CGA"));
    }

    #[test]
    fn consumed_kmers_stop_cycles() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = abundance(&[("AA", 2)]);
        let cons = ConsensusBuilder::new(map, 2, &mut rng).assemble("AA");
        assert_eq!(cons, "AA");
    }

    #[test]
    fn cyclic_pool_uses_each_kmer_once() {
        let map = abundance(&[("ACGT", 1), ("CGTA", 1), ("GTAC", 1), ("TACG", 1)]);
        for s in 0..16u64 {
            let mut rng = StdRng::seed_from_u64(s);
            let cons = ConsensusBuilder::new(map.clone(), 4, &mut rng).assemble("ACGT");
            let kmers: Vec<&str> = (0..=cons.len() - 4).map(|i| &cons[i..i + 4]).collect();
            let distinct: std::collections::HashSet<&str> = kmers.iter().copied().collect();
            assert_eq!(kmers.len(), distinct.len(), "{cons}");
            assert_eq!(cons.len(), 7);
        }
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let mut rng = StdRng::seed_from_u64(0);
        let mut b = ConsensusBuilder::new(Abundance::new(), 3, &mut rng);
        assert!(matches!(b.pick_seed(&[]), Err(DesignError::EmptyPool)));
    }
}

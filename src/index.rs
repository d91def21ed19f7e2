//! KmerPool: k-mer -> per-target presence vector, plus the derived abundance map.

use std::collections::{HashMap, HashSet};

use log::debug;

use crate::seq::SequenceRecord;

/// Abundance map: k-mer -> number of targets that contain it.
pub type Abundance = HashMap<String, u32>;

/// Presence table for target k-mers of one fixed length.
///
/// Every vector has length `n_targets` and holds only 0/1 entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct KmerPool {
    k: usize,
    n_targets: usize,
    entries: HashMap<String, Vec<u32>>,
}

impl KmerPool {
    /// Create an empty pool for `n_targets` targets.
    pub fn new(k: usize, n_targets: usize) -> Self {
        Self {
            k,
            n_targets,
            entries: HashMap::new(),
        }
    }

    /// Build a pool from explicit `(k-mer, presence)` pairs.
    ///
    /// `k` is taken from the first key; vectors are assumed to share one length.
    pub fn from_entries<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<u32>)>,
        S: Into<String>,
    {
        let entries: HashMap<String, Vec<u32>> =
            entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let k = entries.keys().next().map_or(0, |s| s.len());
        let n_targets = entries.values().next().map_or(0, |v| v.len());
        Self {
            k,
            n_targets,
            entries,
        }
    }

    #[inline]
    pub fn k(&self) -> usize {
        self.k
    }

    #[inline]
    pub fn n_targets(&self) -> usize {
        self.n_targets
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn contains(&self, kmer: &str) -> bool {
        self.entries.contains_key(kmer)
    }

    /// Presence vector of `kmer`, if present.
    #[inline]
    pub fn get(&self, kmer: &str) -> Option<&[u32]> {
        self.entries.get(kmer).map(Vec::as_slice)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u32])> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Mark `kmer` as present in target `target`.
    pub(crate) fn mark(&mut self, kmer: &str, target: usize) {
        let n = self.n_targets;
        match self.entries.get_mut(kmer) {
            Some(v) => v[target] = 1,
            None => {
                let mut v = vec![0u32; n];
                v[target] = 1;
                self.entries.insert(kmer.to_string(), v);
            }
        }
    }

    /// Keep only entries for which `keep` returns true; returns the number removed.
    pub fn retain<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&str) -> bool,
    {
        let before = self.entries.len();
        self.entries.retain(|k, _| keep(k));
        before - self.entries.len()
    }

    /// Remove every key in `kmers`; returns the number actually removed.
    pub fn remove_all<'a, I>(&mut self, kmers: I) -> usize
    where
        I: IntoIterator<Item = &'a String>,
    {
        kmers
            .into_iter()
            .filter(|k| self.entries.remove(k.as_str()).is_some())
            .count()
    }

    /// Abundance map: the sum of each presence vector.
    pub fn abundance(&self) -> Abundance {
        self.entries
            .iter()
            .map(|(k, v)| (k.clone(), v.iter().sum()))
            .collect()
    }

    /// All length-`sub_k` substrings of the live keys.
    pub fn sub_kmers(&self, sub_k: usize) -> HashSet<String> {
        let mut out = HashSet::new();
        for kmer in self.entries.keys() {
            if kmer.len() < sub_k || sub_k == 0 {
                continue;
            }
            for i in 0..=kmer.len() - sub_k {
                out.insert(kmer[i..i + sub_k].to_string());
            }
        }
        out
    }
}

/// Index the forward strand of every target at k-mer length `k`.
///
/// Presence is set once per target: repeats within one sequence do not count twice.
pub fn build_index(targets: &[SequenceRecord], k: usize) -> KmerPool {
    let mut pool = KmerPool::new(k, targets.len());
    if k == 0 {
        return pool;
    }
    for (i, rec) in targets.iter().enumerate() {
        let seq = rec.seq.as_str();
        if seq.len() < k {
            continue;
        }
        for pos in 0..=seq.len() - k {
            pool.mark(&seq[pos..pos + k], i);
        }
    }
    debug!(
        "indexed {} targets at k={}: {} distinct k-mers",
        targets.len(),
        k,
        pool.len()
    );
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repeats_within_one_target_stay_binary() {
        let pool = build_index(&[SequenceRecord::new("r", "AAAAAA")], 3);
        assert_eq!(pool.get("AAA"), Some(&[1u32][..]));
        assert_eq!(pool.abundance()["AAA"], 1);
    }

    #[test]
    fn short_targets_contribute_nothing() {
        let pool = build_index(
            &[SequenceRecord::new("a", "AC"), SequenceRecord::new("b", "ACGT")],
            4,
        );
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.get("ACGT"), Some(&[0u32, 1][..]));
    }
}

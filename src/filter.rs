//! Off-target filtering: drop target k-mers shared with unrelated sequences.
//!
//! Three strategies, picked once per run through [`OffTargetFilter`]:
//! - exact: same-length k-mers from both strands of off-target records
//! - substring: shorter off-target k-mers matched anywhere inside a target k-mer
//! - binary: a pre-encoded canonical k-mer file streamed by worker threads
//!   (see [`crate::io`])

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use log::info;
use rayon::prelude::*;

use crate::encode::reverse_complement;
use crate::error::{DesignError, Result};
use crate::index::KmerPool;
use crate::io::{StreamOptions, filter_binary};
use crate::seq::SequenceRecord;

/// Off-target source and the strategy used to apply it.
#[derive(Clone, Debug)]
pub enum OffTargetFilter {
    /// Remove pool k-mers found verbatim on either strand of `records`.
    Exact { records: Vec<SequenceRecord> },
    /// Remove pool k-mers containing any `sub_len`-mer of `records` (either orientation).
    Substring {
        records: Vec<SequenceRecord>,
        sub_len: usize,
    },
    /// Remove pool k-mers matched by a binary canonical k-mer file.
    Binary { path: PathBuf, opts: StreamOptions },
}

impl OffTargetFilter {
    /// Apply the filter in place; returns the number of pool entries removed.
    pub fn apply(&self, pool: &mut KmerPool) -> Result<usize> {
        let removed = match self {
            OffTargetFilter::Exact { records } => {
                let hits = shared_kmers(pool, records, pool.k());
                pool.remove_all(&hits)
            }
            OffTargetFilter::Substring { records, sub_len } => {
                if *sub_len > pool.k() {
                    return Err(DesignError::OffTargetLengthExceeds {
                        off_target: *sub_len,
                        target: pool.k(),
                    });
                }
                let subs = off_target_kmers(records, *sub_len);
                remove_containing(pool, &subs)
            }
            OffTargetFilter::Binary { path, opts } => return filter_binary(pool, path, *opts),
        };
        info!("removed {removed} off-target-matching k-mers");
        Ok(removed)
    }

    pub fn name(&self) -> &'static str {
        match self {
            OffTargetFilter::Exact { .. } => "exact",
            OffTargetFilter::Substring { .. } => "substring",
            OffTargetFilter::Binary { .. } => "binary",
        }
    }
}

/// Pool k-mers that occur on either strand of any record, gathered per record in
/// parallel and unioned.
pub fn shared_kmers(pool: &KmerPool, records: &[SequenceRecord], k: usize) -> HashSet<String> {
    records
        .par_iter()
        .map(|rec| {
            let mut hits = HashSet::new();
            for strand in [rec.seq.as_str(), rec.reverse_seq.as_str()] {
                for_each_window(strand, k, |kmer| {
                    if pool.contains(kmer) {
                        hits.insert(kmer.to_string());
                    }
                });
            }
            hits
        })
        .reduce(HashSet::new, |mut a, b| {
            a.extend(b);
            a
        })
}

/// Every length-`k` substring of both strands of `records`.
pub fn off_target_kmers(records: &[SequenceRecord], k: usize) -> HashSet<String> {
    records
        .par_iter()
        .map(|rec| {
            let mut out = HashSet::new();
            for strand in [rec.seq.as_str(), rec.reverse_seq.as_str()] {
                for_each_window(strand, k, |kmer| {
                    out.insert(kmer.to_string());
                });
            }
            out
        })
        .reduce(HashSet::new, |mut a, b| {
            a.extend(b);
            a
        })
}

/// Drop every pool entry that contains any of `subs`, or its reverse complement, as
/// a substring. `subs` may mix lengths. Returns the number removed.
pub fn remove_containing(pool: &mut KmerPool, subs: &HashSet<String>) -> usize {
    if subs.is_empty() {
        return 0;
    }
    let lengths: BTreeSet<usize> = subs.iter().map(String::len).filter(|&l| l > 0).collect();
    let rc_subs: HashSet<String> = subs.iter().map(|s| reverse_complement(s)).collect();
    pool.retain(|kmer| {
        !lengths.iter().any(|&l| {
            l <= kmer.len()
                && (0..=kmer.len() - l).any(|i| {
                    let w = &kmer[i..i + l];
                    subs.contains(w) || rc_subs.contains(w)
                })
        })
    })
}

fn for_each_window<F: FnMut(&str)>(seq: &str, k: usize, mut f: F) {
    if k == 0 || seq.len() < k {
        return;
    }
    for pos in 0..=seq.len() - k {
        f(&seq[pos..pos + k]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substring_check_covers_reverse_complement() {
        let mut pool = KmerPool::from_entries([("AAGTC", vec![1u32]), ("CCCCC", vec![1])]);
        // reverse complement of "ACT" is "AGT"
        let subs: HashSet<String> = ["ACT".to_string()].into_iter().collect();
        assert_eq!(remove_containing(&mut pool, &subs), 1);
        assert!(pool.contains("CCCCC"));
    }

    #[test]
    fn exact_ignores_kmers_missing_from_pool() {
        let pool = KmerPool::from_entries([("ACGT", vec![1u32])]);
        let hits = shared_kmers(&pool, &[SequenceRecord::new("ot", "TTTTACGTTT")], 4);
        assert_eq!(hits.len(), 1);
        assert!(hits.contains("ACGT"));
    }
}

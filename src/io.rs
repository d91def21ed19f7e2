//! Binary off-target k-mer files: 8-byte header + stream of canonical codes.
//! All integers are little-endian.
//!
//! Layout
//! - `u64` k-mer length in bases
//! - repeated `u64` canonical codes (see [`crate::encode`]) until EOF
//!
//! There is no record count; a trailing partial record is an error.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, ErrorKind, Read};
use std::path::Path;
use std::thread;

use byteorder::{ByteOrder, LittleEndian as LE, ReadBytesExt};
use crossbeam_channel::{Sender, bounded};
use log::{debug, info};

use crate::encode::{canonical, decode_kmer, reverse_complement};
use crate::error::{DesignError, Result};
use crate::filter::remove_containing;
use crate::index::KmerPool;

/// Size of one record (header or code) in bytes.
pub const RECORD_BYTES: usize = 8;

/// Tuning for the concurrent stream scan.
#[derive(Clone, Copy, Debug)]
pub struct StreamOptions {
    /// Worker threads consuming chunks.
    pub workers: usize,
    /// Bytes per chunk, rounded down to whole records.
    pub chunk_size: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            workers: 32,
            chunk_size: crate::config::DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Read the k-mer length header.
pub fn read_header<R: Read>(r: &mut R) -> Result<usize> {
    let k = r
        .read_u64::<LE>()
        .map_err(|e| DesignError::MalformedHeader(e.to_string()))?;
    match usize::try_from(k) {
        Ok(0) | Err(_) => Err(DesignError::MalformedHeader(format!("k-mer length {k}"))),
        Ok(k) => Ok(k),
    }
}

/// Canonical codes of `kmers`, the read-only lookup set for a scan.
///
/// K-mers with a base outside A/C/G/T have no code and cannot match the file, so
/// they are left out.
pub fn canonical_lookup<'a, I>(kmers: I) -> Result<HashSet<u64>>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut lookup = HashSet::new();
    let mut skipped = 0usize;
    for kmer in kmers {
        match canonical(kmer.as_bytes()) {
            Ok(code) => {
                lookup.insert(code);
            }
            Err(DesignError::InvalidBase { .. }) => skipped += 1,
            Err(e) => return Err(e),
        }
    }
    if skipped > 0 {
        debug!("{skipped} k-mers with non-ACGT bases left out of the lookup");
    }
    Ok(lookup)
}

/// Stream the codes after the header through `opts.workers` threads and return the
/// decoded k-mers whose code is in `lookup`.
///
/// Each worker keeps a private hit set and hands it back once when the chunk channel
/// closes; the sets are unioned, so the result does not depend on worker count or
/// chunk size.
pub fn scan_codes<R: Read>(
    reader: &mut R,
    k: usize,
    lookup: &HashSet<u64>,
    opts: StreamOptions,
) -> Result<HashSet<String>> {
    let workers = opts.workers.max(1);
    let chunk_size = (opts.chunk_size / RECORD_BYTES).max(1) * RECORD_BYTES;

    thread::scope(|s| {
        let (chunk_tx, chunk_rx) = bounded::<Vec<u8>>(workers);
        let (hits_tx, hits_rx) = bounded::<HashSet<String>>(workers);

        for _ in 0..workers {
            let chunk_rx = chunk_rx.clone();
            let hits_tx = hits_tx.clone();
            s.spawn(move || {
                let mut local = HashSet::new();
                for chunk in chunk_rx {
                    scan_chunk(&chunk, k, lookup, &mut local);
                }
                let _ = hits_tx.send(local);
            });
        }
        drop(chunk_rx);
        drop(hits_tx);

        let produced = produce_chunks(reader, chunk_size, &chunk_tx);
        drop(chunk_tx);

        let mut removed = HashSet::new();
        for local in hits_rx {
            removed.extend(local);
        }
        let chunks = produced?;
        debug!("scanned {chunks} chunks with {workers} workers: {} hits", removed.len());
        Ok(removed)
    })
}

/// Decode consecutive records of `chunk` and collect hits.
pub fn scan_chunk(chunk: &[u8], k: usize, lookup: &HashSet<u64>, out: &mut HashSet<String>) {
    for record in chunk.chunks_exact(RECORD_BYTES) {
        let code = LE::read_u64(record);
        if lookup.contains(&code) {
            out.insert(decode_kmer(code, k));
        }
    }
}

/// Read whole-record chunks and send them; returns the number of chunks sent.
fn produce_chunks<R: Read>(reader: &mut R, chunk_size: usize, tx: &Sender<Vec<u8>>) -> Result<usize> {
    let mut sent = 0usize;
    loop {
        let mut chunk = vec![0u8; chunk_size];
        let filled = fill(reader, &mut chunk)?;
        if filled == 0 {
            return Ok(sent);
        }
        let trailing = filled % RECORD_BYTES;
        if trailing != 0 {
            return Err(DesignError::TruncatedRecord { trailing });
        }
        chunk.truncate(filled);
        if tx.send(chunk).is_err() {
            return Ok(sent);
        }
        sent += 1;
        if filled < chunk_size {
            return Ok(sent);
        }
    }
}

/// Fill `buf` as far as the reader allows; short only at EOF.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize> {
    let mut n = 0;
    while n < buf.len() {
        match reader.read(&mut buf[n..]) {
            Ok(0) => break,
            Ok(m) => n += m,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(n)
}

/// Remove from `pool` every k-mer matched by the off-target file at `path`.
///
/// - header length > pool k: configuration error
/// - header length < pool k: scan the pool's sub-k-mers of that length, then drop
///   every pool entry that contains a hit in either orientation
/// - equal: scan the pool's own canonical codes, then drop every entry whose
///   sequence or reverse complement was hit
///
/// Returns the number of entries removed.
pub fn filter_binary(pool: &mut KmerPool, path: &Path, opts: StreamOptions) -> Result<usize> {
    let mut reader = BufReader::new(File::open(path)?);
    let off_k = read_header(&mut reader)?;
    let k = pool.k();
    info!("off-target k-mer length {off_k}, target k-mer length {k}");

    if off_k > k {
        return Err(DesignError::OffTargetLengthExceeds {
            off_target: off_k,
            target: k,
        });
    }

    let removed = if off_k < k {
        let subs = pool.sub_kmers(off_k);
        let lookup = canonical_lookup(subs.iter().map(String::as_str))?;
        let hits = scan_codes(&mut reader, off_k, &lookup, opts)?;
        remove_containing(pool, &hits)
    } else {
        let lookup = canonical_lookup(pool.keys())?;
        let hits = scan_codes(&mut reader, off_k, &lookup, opts)?;
        pool.retain(|kmer| !hits.contains(kmer) && !hits.contains(&reverse_complement(kmer)))
    };
    info!("removed {removed} off-target-matching k-mers");
    Ok(removed)
}

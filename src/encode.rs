//! K-mer encoding: 2-bit mapping, single-pass reverse complement, canonicalization.
//!
//! Conventions
//! - Codes are **LSB-aligned**: the lower `2k` bits hold the k-mer, first base highest.
//! - The canonical code is `min(forward, reverse_complement)`, so a k-mer and its
//!   reverse complement share one code.
//! - Only A/C/G/T are encodable. Ambiguous bases are an error on this path; the
//!   string helpers ([`reverse_complement`]) pass them through unchanged.

use crate::error::{DesignError, Result};

/// Longest k-mer that fits a `u64` at 2 bits per base.
pub const MAX_K: usize = 32;

/// 256-entry LUT: ASCII -> 2-bit (A=0, C=1, G=2, T=3), 0xFF for anything else.
pub static MAP_LUT: [u8; 256] = {
    const X: u8 = 0xFF;
    let mut t = [X; 256];
    t[b'A' as usize] = 0;
    t[b'a' as usize] = 0;
    t[b'C' as usize] = 1;
    t[b'c' as usize] = 1;
    t[b'G' as usize] = 2;
    t[b'g' as usize] = 2;
    t[b'T' as usize] = 3;
    t[b't' as usize] = 3;
    t
};

const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

/// 2-bit encoding via LUT: A=00, C=01, G=10, T=11. `None` if unsupported.
#[inline]
pub fn map_base(b: u8) -> Option<u8> {
    let v = MAP_LUT[b as usize];
    if v <= 3 { Some(v) } else { None }
}

/// Mask covering the lower `2k` bits.
#[inline]
pub fn kmer_mask(k: usize) -> u64 {
    if k >= MAX_K {
        u64::MAX
    } else {
        (1u64 << (2 * k)) - 1
    }
}

/// Encode a k-mer into its forward and reverse-complement codes in one pass.
///
/// The reverse complement is built while scanning left to right: each step shifts
/// the running value right by one base and inserts the complemented base at the
/// high end.
pub fn encode_kmer(kmer: &[u8]) -> Result<(u64, u64)> {
    let k = kmer.len();
    if k > MAX_K {
        return Err(DesignError::KmerTooLong { k });
    }
    if k == 0 {
        return Ok((0, 0));
    }
    let mask = kmer_mask(k);
    let shift = 2 * (k - 1);
    let mut fwd: u64 = 0;
    let mut rc: u64 = 0;
    for (position, &b) in kmer.iter().enumerate() {
        let v = map_base(b).ok_or(DesignError::InvalidBase {
            base: b as char,
            position,
        })? as u64;
        fwd = ((fwd << 2) | v) & mask;
        rc = (rc >> 2) | ((v ^ 0b11) << shift);
    }
    Ok((fwd, rc))
}

/// Orientation-independent code: `min(forward, reverse_complement)`.
#[inline]
pub fn canonical(kmer: &[u8]) -> Result<u64> {
    let (fwd, rc) = encode_kmer(kmer)?;
    Ok(fwd.min(rc))
}

/// Decode an LSB-aligned code of `k` bases back to its 5'->3' string.
pub fn decode_kmer(code: u64, k: usize) -> String {
    let mut out = vec![b'A'; k];
    let mut c = code;
    for slot in out.iter_mut().rev() {
        *slot = BASES[(c & 0b11) as usize];
        c >>= 2;
    }
    out.into_iter().map(char::from).collect()
}

/// Reverse complement of a nucleotide string. Only A/C/G/T are complemented;
/// other letters are kept and only reversed.
pub fn reverse_complement(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b {
            b'A' => 'T',
            b'T' => 'A',
            b'G' => 'C',
            b'C' => 'G',
            other => other as char,
        })
        .collect()
}

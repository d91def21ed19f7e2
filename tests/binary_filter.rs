use std::io::Write;
use std::path::PathBuf;

use byteorder::{LittleEndian, WriteBytesExt};
use kira_dsrna_designer::*;
use tempfile::TempDir;

fn pool_of(seqs: &[&str], k: usize) -> KmerPool {
    let recs: Vec<SequenceRecord> = seqs
        .iter()
        .enumerate()
        .map(|(i, s)| SequenceRecord::new(format!("t{i}"), s))
        .collect();
    build_index(&recs, k)
}

fn write_kmer_file(dir: &TempDir, header: u64, kmers: &[&str]) -> PathBuf {
    let path = dir.path().join("off_target.bin");
    let mut f = std::fs::File::create(&path).unwrap();
    f.write_u64::<LittleEndian>(header).unwrap();
    for kmer in kmers {
        f.write_u64::<LittleEndian>(canonical(kmer.as_bytes()).unwrap())
            .unwrap();
    }
    path
}

fn opts() -> StreamOptions {
    StreamOptions {
        workers: 3,
        chunk_size: 16,
    }
}

#[test]
fn equal_length_removes_matches() {
    let dir = TempDir::new().unwrap();
    // TACG is the reverse complement of CGTA
    let path = write_kmer_file(&dir, 4, &["TACG", "GGGG"]);
    let mut pool = pool_of(&["ACGTA"], 4);
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 1);
    assert!(pool.contains("ACGT"));
    assert!(!pool.contains("CGTA"));
}

#[test]
fn equal_length_removes_non_canonical_pool_keys() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 4, &["CGTA"]);
    let mut pool = pool_of(&["TACGG"], 4);
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 1);
    assert_eq!(pool.keys().collect::<Vec<_>>(), vec!["ACGG"]);
}

#[test]
fn shorter_file_kmers_match_as_substrings() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 3, &["ACT"]);
    // AAGTC contains AGT, the reverse complement of ACT
    let mut pool = pool_of(&["AAGTC", "GGCTC"], 5);
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 1);
    assert_eq!(pool.keys().collect::<Vec<_>>(), vec!["GGCTC"]);
}

#[test]
fn longer_file_kmers_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 6, &["ACGTAC"]);
    let mut pool = pool_of(&["ACGTA"], 4);
    assert!(matches!(
        filter_binary(&mut pool, &path, opts()),
        Err(DesignError::OffTargetLengthExceeds {
            off_target: 6,
            target: 4
        })
    ));
    assert_eq!(pool.len(), 2);
}

#[test]
fn trailing_partial_record_is_an_error() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 4, &["ACGT"]);
    std::fs::OpenOptions::new()
        .append(true)
        .open(&path)
        .unwrap()
        .write_all(&[1, 2, 3])
        .unwrap();
    let mut pool = pool_of(&["ACGTA"], 4);
    assert!(matches!(
        filter_binary(&mut pool, &path, opts()),
        Err(DesignError::TruncatedRecord { trailing: 3 })
    ));
}

#[test]
fn header_only_file_removes_nothing() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 4, &[]);
    let mut pool = pool_of(&["ACGTA"], 4);
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 0);
    assert_eq!(pool.len(), 2);
}

#[test]
fn short_header_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("short.bin");
    std::fs::write(&path, [4u8, 0, 0, 0]).unwrap();
    let mut pool = pool_of(&["ACGTA"], 4);
    assert!(matches!(
        filter_binary(&mut pool, &path, opts()),
        Err(DesignError::MalformedHeader(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    let dir = TempDir::new().unwrap();
    let mut pool = pool_of(&["ACGTA"], 4);
    let err = filter_binary(&mut pool, &dir.path().join("absent.bin"), opts()).unwrap_err();
    assert!(matches!(err, DesignError::Io(_)));
}

#[test]
fn binary_filter_through_enum() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 4, &["ACGT"]);
    let mut pool = pool_of(&["ACGTA"], 4);
    let filter = OffTargetFilter::Binary {
        path,
        opts: StreamOptions::default(),
    };
    assert_eq!(filter.name(), "binary");
    assert_eq!(filter.apply(&mut pool).unwrap(), 1);
    assert!(pool.contains("CGTA"));
}

#[test]
fn kmers_with_unknown_bases_are_skipped() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 4, &["ACGT"]);
    let mut pool = pool_of(&["ACGTNACGT"], 4);
    assert_eq!(pool.len(), 5);
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 1);
    assert!(!pool.contains("ACGT"));
    assert!(pool.contains("GTNA"));

    let path = write_kmer_file(&dir, 2, &["CG"]);
    let mut pool = pool_of(&["ACGTNACGT"], 4);
    // every pool k-mer holds CG except GTNA and TNAC
    assert_eq!(filter_binary(&mut pool, &path, opts()).unwrap(), 3);
    assert_eq!(pool.len(), 2);
}

#[test]
fn zero_length_header_is_malformed() {
    let dir = TempDir::new().unwrap();
    let path = write_kmer_file(&dir, 0, &[]);
    let mut pool = pool_of(&["ACGTA"], 4);
    assert!(matches!(
        filter_binary(&mut pool, &path, opts()),
        Err(DesignError::MalformedHeader(_))
    ));
}

//! Sequence records and the FASTA loading collaborator.

use std::path::Path;

use log::info;
use needletail::parse_fastx_file;

use crate::encode::reverse_complement;
use crate::error::{DesignError, Result};

/// One loaded sequence: header label, uppercase forward strand and its reverse complement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SequenceRecord {
    pub header: String,
    pub seq: String,
    pub reverse_seq: String,
}

impl SequenceRecord {
    /// Build a record from a header and a sequence; the sequence is uppercased and
    /// non-ASCII characters become `N`, so byte offsets are character offsets.
    pub fn new(header: impl Into<String>, seq: impl AsRef<str>) -> Self {
        let seq: String = seq
            .as_ref()
            .chars()
            .map(|c| if c.is_ascii() { c.to_ascii_uppercase() } else { 'N' })
            .collect();
        let reverse_seq = reverse_complement(&seq);
        Self {
            header: header.into(),
            seq,
            reverse_seq,
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }
}

/// Load every record of a FASTA/FASTQ file (optionally gzipped).
pub fn load_sequences(path: &Path) -> Result<Vec<SequenceRecord>> {
    let parse_err = |message: String| DesignError::Parse {
        path: path.display().to_string(),
        message,
    };
    let mut reader = parse_fastx_file(path).map_err(|e| parse_err(e.to_string()))?;
    let mut records = Vec::new();
    while let Some(record) = reader.next() {
        let record = record.map_err(|e| parse_err(e.to_string()))?;
        let header = String::from_utf8_lossy(record.id()).into_owned();
        let seq = record.seq();
        records.push(SequenceRecord::new(header, String::from_utf8_lossy(&seq)));
    }
    info!("{} sequences loaded from {}", records.len(), path.display());
    Ok(records)
}

/// Load and concatenate the records of several files, in order.
pub fn load_many<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<SequenceRecord>> {
    let mut all = Vec::new();
    for p in paths {
        all.extend(load_sequences(p.as_ref())?);
    }
    Ok(all)
}

/// Insert `copies` extra references to the record named `header` right after it.
///
/// Each copy is an extra target column in the presence vectors, so windows that
/// cover this target score higher.
pub fn apply_bias(
    records: &[SequenceRecord],
    header: &str,
    copies: usize,
) -> Result<Vec<SequenceRecord>> {
    let mut biased = Vec::with_capacity(records.len() + copies);
    let mut found = false;
    for rec in records {
        biased.push(rec.clone());
        if rec.header == header {
            found = true;
            biased.extend(std::iter::repeat_n(rec, copies).cloned());
        }
    }
    if !found {
        return Err(DesignError::BiasHeaderMissing(header.to_string()));
    }
    Ok(biased)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_uppercases_and_reverse_complements() {
        let r = SequenceRecord::new("t1", "aacH");
        assert_eq!(r.seq, "AACH");
        assert_eq!(r.reverse_seq, "HGTT");
    }

    #[test]
    fn bias_duplicates_selected_header() {
        let recs = vec![SequenceRecord::new("a", "ACGT"), SequenceRecord::new("b", "GGGG")];
        let biased = apply_bias(&recs, "a", 2).unwrap();
        let headers: Vec<_> = biased.iter().map(|r| r.header.as_str()).collect();
        assert_eq!(headers, ["a", "a", "a", "b"]);
        assert!(matches!(
            apply_bias(&recs, "zzz", 1),
            Err(DesignError::BiasHeaderMissing(_))
        ));
    }
}

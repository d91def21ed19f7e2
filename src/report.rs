//! Reporting: per-target statistics for a selected construct, table and CSV output.

use std::collections::HashSet;
use std::fmt::Write as _;
use std::path::Path;

use csv::WriterBuilder;

use crate::error::Result;
use crate::index::KmerPool;
use crate::score::{Construct, median};
use crate::seq::SequenceRecord;

/// Statistics of one target against the construct.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetRow {
    pub header: String,
    /// Construct k-mers present in this target.
    pub matches: usize,
    /// Mean GC% of those k-mers.
    pub mean_gc: f64,
    /// Share of matching k-mers ending in A (guide strand starts with U).
    pub five_prime_u: f64,
    /// Share ending in T (guide strand starts with A).
    pub five_prime_a: f64,
    /// Share ending in G (guide strand starts with C).
    pub five_prime_c: f64,
}

/// Full report for one run.
#[derive(Clone, Debug)]
pub struct Report {
    pub kmer_len: usize,
    pub rows: Vec<TargetRow>,
    pub median_matches: f64,
    pub construct_seq: String,
    pub construct_gc: f64,
}

/// GC content of `seq` as a percentage; 0 for an empty string.
pub fn gc_content(seq: &str) -> f64 {
    if seq.is_empty() {
        return 0.0;
    }
    let gc = seq.bytes().filter(|&b| b == b'G' || b == b'C').count();
    gc as f64 * 100.0 / seq.len() as f64
}

/// For each target column, the construct k-mers present in it.
pub fn kmers_per_target<'a>(pool: &KmerPool, construct: &'a str, k: usize) -> Vec<Vec<&'a str>> {
    let mut out = vec![Vec::new(); pool.n_targets()];
    if k == 0 || construct.len() < k {
        return out;
    }
    for i in 0..=construct.len() - k {
        let kmer = &construct[i..i + k];
        if let Some(presence) = pool.get(kmer) {
            for (target, _) in presence.iter().enumerate().filter(|&(_, &p)| p == 1) {
                out[target].push(kmer);
            }
        }
    }
    out
}

fn target_row(header: &str, kmers: &[&str]) -> TargetRow {
    let n = kmers.len();
    let share = |base: u8| {
        if n == 0 {
            return 0.0;
        }
        kmers.iter().filter(|k| k.as_bytes().last() == Some(&base)).count() as f64 / n as f64
    };
    let mean_gc = if n == 0 {
        0.0
    } else {
        kmers.iter().map(|k| gc_content(k)).sum::<f64>() / n as f64
    };
    TargetRow {
        header: header.to_string(),
        matches: n,
        mean_gc,
        five_prime_u: share(b'A'),
        five_prime_a: share(b'T'),
        five_prime_c: share(b'G'),
    }
}

/// Build the report; a header repeated by target bias is listed once.
pub fn build_report(
    pool: &KmerPool,
    construct: &Construct,
    targets: &[SequenceRecord],
    kmer_len: usize,
) -> Report {
    let per_target = kmers_per_target(pool, &construct.seq, kmer_len);
    let mut seen = HashSet::new();
    let mut rows = Vec::new();
    for (rec, kmers) in targets.iter().zip(per_target.iter()) {
        if seen.insert(rec.header.as_str()) {
            rows.push(target_row(&rec.header, kmers));
        }
    }
    let counts: Vec<u32> = rows.iter().map(|r| r.matches as u32).collect();
    Report {
        kmer_len,
        median_matches: median(&counts),
        construct_gc: gc_content(&construct.seq),
        construct_seq: construct.seq.clone(),
        rows,
    }
}

impl Report {
    pub fn column_names(&self) -> [String; 6] {
        [
            "Target sequence header".to_string(),
            format!("{}nt matches", self.kmer_len),
            "Kmer mean GC (%)".to_string(),
            "5'U (%)".to_string(),
            "5'A (%)".to_string(),
            "5'C (%)".to_string(),
        ]
    }

    fn cells(row: &TargetRow) -> [String; 6] {
        [
            row.header.clone(),
            row.matches.to_string(),
            format!("{:.1}", row.mean_gc),
            format!("{:.1}", row.five_prime_u * 100.0),
            format!("{:.1}", row.five_prime_a * 100.0),
            format!("{:.1}", row.five_prime_c * 100.0),
        ]
    }

    /// Plain-text table, left aligned.
    pub fn render_table(&self) -> String {
        let header = self.column_names();
        let body: Vec<[String; 6]> = self.rows.iter().map(Self::cells).collect();
        let mut widths = header.clone().map(|h| h.len());
        for cells in &body {
            for (w, c) in widths.iter_mut().zip(cells.iter()) {
                *w = (*w).max(c.len());
            }
        }
        let rule: String = widths
            .iter()
            .map(|w| "-".repeat(w + 2))
            .collect::<Vec<_>>()
            .join("+");
        let mut out = String::new();
        let _ = writeln!(out, "+{rule}+");
        for (i, cells) in std::iter::once(&header).chain(body.iter()).enumerate() {
            let line: Vec<String> = cells
                .iter()
                .zip(widths.iter())
                .map(|(c, &w)| format!(" {c:<w$} "))
                .collect();
            let _ = writeln!(out, "|{}|", line.join("|"));
            if i == 0 {
                let _ = writeln!(out, "+{rule}+");
            }
        }
        let _ = writeln!(out, "+{rule}+");
        out
    }

    /// Write the table, a blank row, a label row and the construct sequence.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let mut w = WriterBuilder::new().flexible(true).from_path(path)?;
        w.write_record(self.column_names())?;
        for row in &self.rows {
            w.write_record(Self::cells(row))?;
        }
        w.write_record([""])?;
        w.write_record(["dsRNA sense-arm sequence:"])?;
        w.write_record([self.construct_seq.as_str()])?;
        w.flush()?;
        Ok(())
    }
}

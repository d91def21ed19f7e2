use kira_dsrna_designer::report::{build_report, gc_content};
use kira_dsrna_designer::*;
use tempfile::TempDir;

#[test]
fn fasta_to_csv_report() {
    let dir = TempDir::new().unwrap();
    let fasta = dir.path().join("targets.fa");
    std::fs::write(&fasta, ">t0\nACGTAC\n>t1\nacgta\n").unwrap();

    let targets = load_sequences(&fasta).unwrap();
    assert_eq!(targets.len(), 2);
    assert_eq!(targets[1].header, "t1");
    assert_eq!(targets[1].seq, "ACGTA");

    let cfg = DesignConfig::default()
        .with_kmer_len(4)
        .with_construct_len(5)
        .with_iterations(4)
        .with_seed(11);
    let outcome = design_construct(&targets, None, &cfg).unwrap();
    let construct = outcome.construct.unwrap();
    let report = build_report(&outcome.pool, &construct, &targets, 4);

    assert_eq!(report.rows.len(), 2);
    let row = &report.rows[0];
    assert_eq!(row.matches, 2);
    assert_eq!(row.mean_gc, 50.0);
    // CGTA ends in A, ACGT ends in T
    assert_eq!(row.five_prime_u, 0.5);
    assert_eq!(row.five_prime_a, 0.5);
    assert_eq!(row.five_prime_c, 0.0);
    assert_eq!(report.median_matches, 2.0);
    assert_eq!(report.construct_gc, gc_content("ACGTA"));

    let table = report.render_table();
    assert!(table.contains("4nt matches"));
    assert!(table.contains("| t1 "));

    let csv_path = dir.path().join("out.csv");
    report.write_csv(&csv_path).unwrap();
    let text = std::fs::read_to_string(&csv_path).unwrap();
    let first = text.lines().next().unwrap();
    assert!(first.starts_with("Target sequence header,4nt matches,"));
    assert!(text.contains("t0,2,50.0,50.0,50.0,0.0"));
    assert!(text.ends_with("dsRNA sense-arm sequence:\nACGTA\n"));
}

#[test]
fn biased_headers_are_reported_once() {
    let targets = apply_bias(
        &[
            SequenceRecord::new("t0", "ACGTAC"),
            SequenceRecord::new("t1", "ACGTA"),
        ],
        "t1",
        2,
    )
    .unwrap();
    let pool = build_index(&targets, 4);
    let construct = Construct {
        seq: "ACGTA".to_string(),
        kmer_hits: vec![2; 4],
        score: 2.0,
    };
    let report = build_report(&pool, &construct, &targets, 4);
    let headers: Vec<_> = report.rows.iter().map(|r| r.header.as_str()).collect();
    assert_eq!(headers, ["t0", "t1"]);
}

#[test]
fn missing_fasta_is_a_parse_error() {
    let dir = TempDir::new().unwrap();
    let err = load_sequences(&dir.path().join("none.fa")).unwrap_err();
    assert!(matches!(err, DesignError::Parse { .. }));
}

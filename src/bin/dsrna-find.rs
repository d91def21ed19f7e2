use anyhow::{Context, bail};
use clap::Parser;
use kira_dsrna_designer::report::build_report;
use kira_dsrna_designer::*;
use log::info;
use std::path::PathBuf;

/// Find a dsRNA construct shared by the targets and free of off-target k-mers.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Target FASTA path
    #[arg(short, long)]
    targets: PathBuf,

    /// Off-target FASTA paths, comma-separated
    #[arg(long, value_delimiter = ',', conflicts_with = "off_target_kmers")]
    off_targets: Vec<PathBuf>,

    /// Off-target k-mer length for substring matching (< kmer-len)
    #[arg(long, requires = "off_targets")]
    off_target_kmer_len: Option<usize>,

    /// Binary off-target k-mer file (u64 length header + canonical u64 codes)
    #[arg(long)]
    off_target_kmers: Option<PathBuf>,

    /// K-mer length
    #[arg(short = 'k', long, default_value_t = 21)]
    kmer_len: usize,

    /// dsRNA sense arm length
    #[arg(short = 'c', long, default_value_t = 300)]
    construct_len: usize,

    /// Number of search iterations
    #[arg(short = 'i', long, default_value_t = 100)]
    iterations: usize,

    /// Threads (rayon)
    #[arg(long)]
    threads: Option<usize>,

    /// Worker threads for the binary off-target scan
    #[arg(long, default_value_t = 32)]
    workers: usize,

    /// Chunk size in bytes for the binary off-target scan
    #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
    chunk_size: usize,

    /// Base random seed (reproducible runs)
    #[arg(long)]
    seed: Option<u64>,

    /// Window score: median|geomean
    #[arg(long, default_value = "median")]
    score: String,

    /// Write results to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Header of a target to bias the design toward
    #[arg(long)]
    bias_header: Option<String>,

    /// Extra copies of the biased target
    #[arg(long, default_value_t = 0)]
    bias: usize,
}

fn parse_score(s: &str) -> anyhow::Result<ScoreAggregate> {
    match s {
        "median" => Ok(ScoreAggregate::Median),
        "geomean" | "geometric" => Ok(ScoreAggregate::GeometricMean),
        other => bail!("unknown score aggregate '{other}' (expected median|geomean)"),
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = DesignConfig::default()
        .with_kmer_len(args.kmer_len)
        .with_construct_len(args.construct_len)
        .with_iterations(args.iterations)
        .with_workers(args.workers)
        .with_chunk_size(args.chunk_size)
        .with_aggregate(parse_score(&args.score)?);
    if let Some(n) = args.threads {
        cfg = cfg.with_threads(n);
    }
    if let Some(s) = args.seed {
        cfg = cfg.with_seed(s);
    }
    cfg.validate()?;

    info!("Loading target sequences");
    let mut targets = load_sequences(&args.targets)
        .with_context(|| format!("loading targets from {}", args.targets.display()))?;
    if let Some(header) = &args.bias_header {
        targets = apply_bias(&targets, header, args.bias)?;
    }

    let filter = if let Some(path) = args.off_target_kmers {
        Some(OffTargetFilter::Binary {
            path,
            opts: stream_options(&cfg),
        })
    } else if !args.off_targets.is_empty() {
        info!("Loading off-target sequences");
        let records = load_many(&args.off_targets).context("loading off-target sequences")?;
        Some(match args.off_target_kmer_len {
            Some(sub_len) => OffTargetFilter::Substring { records, sub_len },
            None => OffTargetFilter::Exact { records },
        })
    } else {
        None
    };

    let outcome = design_construct(&targets, filter.as_ref(), &cfg)?;
    let Some(construct) = outcome.construct else {
        println!(
            "Could not identify a dsRNA sense arm sequence. Check input format and sequence lengths"
        );
        return Ok(());
    };

    let report = build_report(&outcome.pool, &construct, &targets, cfg.kmer_len());
    println!("\nResults:");
    print!("{}", report.render_table());
    if let Some(path) = &args.csv {
        report
            .write_csv(path)
            .with_context(|| format!("writing {}", path.display()))?;
        println!("Results written to {}", path.display());
    }
    println!(
        "\nMedian of kmer hits to each target sequence: {}",
        report.median_matches
    );
    println!(
        "\ndsRNA sense-arm sequence - {:.1}% GC content",
        report.construct_gc
    );
    println!("{}\n", report.construct_seq);
    Ok(())
}

use anyhow::Result;
use clap::Parser;
use log::info;
use std::path::PathBuf;

use contigorf::{
    fasta::{get_contig_stats, parse_fasta_file},
    hits::{add_relative_hits, parse_hits_file, HITS_OUTFMT},
    logging::init_logger,
    output::{Gff3Writer, ProteinWriter, SummaryWriter},
    prediction::OrfPredictor,
    types::{
        BoundaryPolicy, PredictionConfig, DEFAULT_MIN_EXPECT, DEFAULT_QS_THRESH,
        DEFAULT_SS_THRESH,
    },
};

/// contigorf: infer ORFs on assembled contigs from BLASTX hits against relatives
#[derive(Parser)]
#[command(name = "contigorf")]
#[command(about = "Infer ORFs on assembled contigs from BLASTX evidence")]
#[command(version)]
struct Args {
    /// Input contig FASTA file
    #[arg(short = 'f', long = "fasta", value_name = "FILE")]
    fasta_file: PathBuf,

    /// Tabular BLASTX hits of one relative, as NAME=FILE (repeatable)
    #[arg(long = "hits", value_name = "NAME=FILE", required = true, value_parser = parse_hits_arg)]
    hits: Vec<(String, PathBuf)>,

    /// Output GFF3 file with predicted ORFs
    #[arg(short = 'o', long = "gff3", value_name = "FILE")]
    gff3_file: PathBuf,

    /// Output protein FASTA file
    #[arg(short = 'p', long = "proteins", value_name = "FILE")]
    protein_file: Option<PathBuf>,

    /// Output per-contig summary table
    #[arg(short = 's', long = "summary", value_name = "FILE")]
    summary_file: Option<PathBuf>,

    /// Maximum expect value for an HSP to count as evidence
    #[arg(long = "min-expect", default_value_t = DEFAULT_MIN_EXPECT)]
    min_expect: f64,

    /// Query start threshold for missing 5' detection
    #[arg(long = "qs-thresh", default_value_t = DEFAULT_QS_THRESH)]
    qs_thresh: usize,

    /// Subject start threshold for missing 5' detection
    #[arg(long = "ss-thresh", default_value_t = DEFAULT_SS_THRESH)]
    ss_thresh: usize,

    /// Start boundary policy: inclusive (5'-most start before a stop) or
    /// canonical (start codon closest to the 5' anchor)
    #[arg(long = "policy", default_value = "inclusive")]
    policy: BoundaryPolicy,

    /// Verbose output (shows warnings and debug info)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,

    /// Log file path (optional, logs all messages including per-contig details)
    #[arg(long = "log-file", value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Number of threads to use for parallel processing (default: number of CPU cores)
    #[arg(short = 't', long = "threads", value_name = "N")]
    threads: Option<usize>,
}

fn parse_hits_arg(value: &str) -> std::result::Result<(String, PathBuf), String> {
    match value.split_once('=') {
        Some((name, path)) if !name.is_empty() && !path.is_empty() => {
            Ok((name.to_string(), PathBuf::from(path)))
        }
        _ => Err(format!("expected NAME=FILE, got '{}'", value)),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logger(args.verbose, args.log_file.as_deref())?;

    if let Some(threads) = args.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .map_err(|e| anyhow::anyhow!("Failed to set thread pool: {}", e))?;
        info!("Using {} threads for parallel processing", threads);
    } else {
        info!(
            "Using {} threads for parallel processing (auto-detected)",
            rayon::current_num_threads()
        );
    }

    info!("Starting contigorf v{}", env!("CARGO_PKG_VERSION"));
    info!("Input FASTA: {}", args.fasta_file.display());
    for (relative, path) in &args.hits {
        info!("Input hits ({}): {}", relative, path.display());
    }
    info!("Output GFF3: {}", args.gff3_file.display());

    validate_input_files(&args)?;
    run_prediction_pipeline(&args)?;

    Ok(())
}

fn validate_input_files(args: &Args) -> Result<()> {
    if !args.fasta_file.exists() {
        anyhow::bail!("FASTA file does not exist: {}", args.fasta_file.display());
    }
    for (relative, path) in &args.hits {
        if !path.exists() {
            anyhow::bail!("Hits file for {} does not exist: {}", relative, path.display());
        }
    }
    let mut names: Vec<&str> = args.hits.iter().map(|(name, _)| name.as_str()).collect();
    names.sort_unstable();
    if let Some(pair) = names.windows(2).find(|pair| pair[0] == pair[1]) {
        anyhow::bail!("Relative given more than once: {}", pair[0]);
    }
    if args.min_expect.is_nan() || args.min_expect < 0.0 {
        anyhow::bail!("--min-expect must be a non-negative number");
    }

    info!("All input files validated successfully");
    Ok(())
}

fn run_prediction_pipeline(args: &Args) -> Result<()> {
    info!("Step 1: Loading contigs");
    let mut contigs = parse_fasta_file(&args.fasta_file)?;
    info!("Contigs loaded: {}", get_contig_stats(&contigs));

    info!("Step 2: Loading BLASTX evidence (-outfmt \"{}\")", HITS_OUTFMT);
    for (relative, path) in &args.hits {
        let hits = parse_hits_file(path, relative)?;
        add_relative_hits(&mut contigs, &hits);
    }

    let config = PredictionConfig {
        min_expect: args.min_expect,
        qs_thresh: args.qs_thresh,
        ss_thresh: args.ss_thresh,
        policy: args.policy,
    };

    let predictor = OrfPredictor::new(config);
    info!(
        "Step 3: Predicting ORFs (policy: {}, min expect: {})",
        predictor.config().policy,
        predictor.config().min_expect
    );
    let (predictions, summary) = predictor.predict_all(contigs.contigs());
    info!("Prediction summary: {}", summary);

    info!("Step 4: Writing results");
    Gff3Writer::create(&args.gff3_file)?.write_predictions(&predictions)?;
    if let Some(path) = &args.protein_file {
        ProteinWriter::create(path)?.write_predictions(&predictions)?;
    }
    if let Some(path) = &args.summary_file {
        SummaryWriter::create(path)?.write_predictions(&predictions)?;
    }

    info!("ORF prediction completed successfully!");
    info!("Output written to: {}", args.gff3_file.display());

    Ok(())
}

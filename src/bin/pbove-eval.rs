//! A binary to evaluate predicted read-to-read overlaps against the ground
//! truth locations of the reads on a reference.
//!
//! ```shell
//! cargo run --release --bin=pbove-eval --features=binaries -- \
//!     query.fasta target.fasta reseq.m4 preassembly.m4 out.tbl
//! ```
//!
//! It achieves this by carrying out the following:
//!
//! * Mapping the query and target reads onto the reference through the
//!   resequencing alignments, and counting how many query/target pairs
//!   overlap on the reference.
//! * Looking up how much each predicted overlap actually overlaps on the
//!   reference.
//! * Tallying the predictions into score buckets and accumulating the buckets
//!   into one confusion matrix per score cutoff.

use std::fs;
use std::fs::File;
use std::io::BufRead;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use pbove::evaluate;
use pbove::evaluate::Evaluation;
use pbove::evaluate::Summary;
use pbove::ground_truth;
use pbove::read;
use pbove::record::AlignmentRecord;
use tabled::builder::Builder;
use tabled::settings::object::Rows;
use tabled::settings::Alignment;
use tabled::settings::Style;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Query reads in FASTA format.
    query_fasta: PathBuf,

    /// Target reads in FASTA format.
    target_fasta: PathBuf,

    /// Alignments of the query reads to the reference, used as ground truth.
    reseq_m4: PathBuf,

    /// Alignments of the query reads to the target reads, used as
    /// predictions.
    preassembly_m4: PathBuf,

    /// Where to write the cumulative table.
    out_tb: PathBuf,

    /// The minimum number of overlapping bases for two reads to overlap.
    #[arg(long = "ovl-cut-off", default_value_t = evaluate::DEFAULT_OVERLAP_CUTOFF)]
    overlap_cutoff: i64,

    /// The output directory.
    #[arg(short = 'd', long, default_value = "pbove_out")]
    out_dir: PathBuf,

    /// Where to write the scored predictions (defaults to `out.scored` in the
    /// output directory).
    #[arg(long)]
    out_scored: Option<PathBuf>,

    /// Where to write the delta table (defaults to `out.delta` in the output
    /// directory).
    #[arg(long)]
    out_delta: Option<PathBuf>,

    /// If desired, where to write every query/target pair that overlaps on
    /// the reference.
    #[arg(long)]
    gt_overlaps: Option<PathBuf>,

    /// The width of a score bucket.
    #[arg(long, default_value_t = evaluate::DEFAULT_SCORE_STEP)]
    step: i64,

    /// Only measure predicted overlaps within the ground truth alignments.
    #[arg(long, default_value_t = false)]
    no_infer: bool,

    /// The delimiter between the fields of alignment records.
    #[arg(long, default_value_t = ' ')]
    delimiter: char,

    #[command(flatten)]
    verbose: Verbosity,
}

/// Reads the read names from a FASTA file.
fn read_names(path: &Path) -> Result<Vec<read::Name>> {
    let reader = pbove::reader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .into_inner();

    read::fasta::read_names(reader).with_context(|| format!("reading {}", path.display()))
}

/// Opens a file of alignment records split on the delimiter in `options`.
fn open_alignments(
    path: &Path,
    options: &evaluate::Options,
) -> Result<pbove::Reader<Box<dyn BufRead>>> {
    let inner = pbove::reader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .into_inner();

    Ok(options.reader(inner))
}

/// Reads every alignment record from a file.
fn read_alignments(path: &Path, options: &evaluate::Options) -> Result<Vec<AlignmentRecord>> {
    let mut reader = open_alignments(path, options)?;

    reader
        .records::<AlignmentRecord>()
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("reading {}", path.display()))
}

/// Creates a buffered file for writing.
fn create(path: &Path) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .with_context(|| format!("creating {}", path.display()))
}

/// Renders the summary as a table for logging.
fn summary_table(summary: &Summary) -> String {
    let mut builder = Builder::default();
    builder.push_record(["Statistic", "Value"]);

    for line in summary.to_string().lines() {
        if let Some((statistic, value)) = line.rsplit_once(": ") {
            builder.push_record([statistic, value]);
        }
    }

    builder
        .build()
        .with(Style::rounded())
        .modify(Rows::new(1..), Alignment::left())
        .to_string()
}

fn throw(args: &Args) -> Result<()> {
    fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("creating {}", args.out_dir.display()))?;

    let options = evaluate::Options {
        overlap_cutoff: args.overlap_cutoff,
        score_step: args.step,
        infer: !args.no_infer,
        delimiter: args.delimiter,
    };

    info!("reading ground truth from {}", args.reseq_m4.display());
    let reader = open_alignments(&args.reseq_m4, &options)?;
    let ground_truth = ground_truth::Builder::default()
        .try_build_from(reader)
        .with_context(|| format!("reading {}", args.reseq_m4.display()))?;

    info!("reading query reads from {}", args.query_fasta.display());
    let queries = read_names(&args.query_fasta)?;

    info!("reading target reads from {}", args.target_fasta.display());
    let targets = read_names(&args.target_fasta)?;

    info!("reading predictions from {}", args.preassembly_m4.display());
    let predictions = read_alignments(&args.preassembly_m4, &options)?;

    let evaluation = Evaluation::run(&ground_truth, &queries, &targets, &predictions, options)
        .context("evaluating predictions")?;

    info!("summary:\n{}", summary_table(evaluation.summary()));

    let summary_path = args.out_dir.join("summary.txt");
    let mut writer = create(&summary_path)?;
    writeln!(writer, "{}", evaluation.summary())?;
    writer.flush()?;

    if let Some(path) = &args.gt_overlaps {
        info!("writing ground truth overlaps to {}", path.display());
        let mut writer = create(path)?;

        for overlap in evaluation.ground_truth_overlaps() {
            writeln!(writer, "{}", overlap)?;
        }

        writer.flush()?;
    }

    let scored_path = args
        .out_scored
        .clone()
        .unwrap_or_else(|| args.out_dir.join("out.scored"));
    info!("writing scored predictions to {}", scored_path.display());
    let mut writer = create(&scored_path)?;

    for comment in evaluation.ground_truth_totals().to_comments() {
        writeln!(writer, "{}", comment)?;
    }

    for record in evaluation.scored() {
        writeln!(writer, "{}", record)?;
    }

    writer.flush()?;

    let delta_path = args
        .out_delta
        .clone()
        .unwrap_or_else(|| args.out_dir.join("out.delta"));
    info!("writing delta table to {}", delta_path.display());
    let mut writer = create(&delta_path)?;
    evaluation.delta().write_to(&mut writer)?;
    writer.flush()?;

    info!("writing cumulative table to {}", args.out_tb.display());
    let mut writer = create(&args.out_tb)?;
    evaluation.cumulative().write_to(&mut writer)?;
    writer.flush()?;

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_max_level(args.verbose.log_level_filter().as_trace())
            .init(),
    };

    throw(&args)
}

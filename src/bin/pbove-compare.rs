//! A binary to compare two sets of alignments of the same reads by how much
//! reference sequence each set covers for each read.
//!
//! ```shell
//! cargo run --release --bin=pbove-compare --features=binaries -- \
//!     first.m4 second.m4 comparison.tsv
//! ```

use std::fs::File;
use std::io::BufWriter;
use std::io::Write as _;
use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap_verbosity_flag::Verbosity;
use pbove::compare;
use pbove::compare::Alignments;
use tracing::info;
use tracing_log::AsTrace as _;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// The first set of alignments.
    m4_1: PathBuf,

    /// The second set of alignments.
    m4_2: PathBuf,

    /// Where to write the comparison.
    out_file: PathBuf,

    /// The delimiter between the fields of alignment records.
    #[arg(long, default_value_t = ' ')]
    delimiter: char,

    #[command(flatten)]
    verbose: Verbosity,
}

/// Reads and collects the alignments in a file.
fn read_alignments(path: &Path, delimiter: char) -> Result<Alignments> {
    info!("reading alignments from {}", path.display());

    let mut reader = pbove::reader::open(path)
        .with_context(|| format!("opening {}", path.display()))?
        .with_delimiter(delimiter);

    let alignments = Alignments::try_from_reader(&mut reader)
        .with_context(|| format!("reading {}", path.display()))?;

    info!("read alignments for {} query reads", alignments.len());

    Ok(alignments)
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

    let first = read_alignments(&args.m4_1, args.delimiter)?;
    let second = read_alignments(&args.m4_2, args.delimiter)?;

    let comparison = compare::compare(&first, &second).context("comparing alignments")?;

    let first_name = args.m4_1.display().to_string();
    let second_name = args.m4_2.display().to_string();

    for line in comparison.summary(&first_name, &second_name) {
        info!("{line}");
    }

    let mut writer = File::create(&args.out_file)
        .map(BufWriter::new)
        .with_context(|| format!("creating {}", args.out_file.display()))?;
    comparison.write_to(&mut writer, &first_name, &second_name)?;
    writer.flush()?;

    Ok(())
}

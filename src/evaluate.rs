//! End-to-end evaluation of predicted read-to-read overlaps.
//!
//! An evaluation maps the query and target reads onto the reference through
//! the ground truth, counts the ground truth classes over every query/target
//! pair, annotates each predicted overlap with its ground truth overlap and
//! finally tallies the predictions into score-bucketed tables.

use std::io::BufRead;

use crate::classify;
use crate::classify::Counts;
use crate::ground_truth;
use crate::ground_truth::GroundTruth;
use crate::ground_truth::MappedRead;
use crate::prediction;
use crate::read;
use crate::record::alignment;
use crate::record::scored::GroundTruthTotals;
use crate::record::AlignmentRecord;
use crate::record::ScoredRecord;
use crate::table::cumulative;
use crate::table::delta;
use crate::table::CumulativeTable;
use crate::table::DeltaTable;

/// The default minimum overlap for a ground truth positive pair.
pub const DEFAULT_OVERLAP_CUTOFF: i64 = 200;

/// The default width of a score bucket.
pub const DEFAULT_SCORE_STEP: i64 = 100;

/// An error related to evaluation.
#[derive(Debug)]
pub enum Error {
    /// Mapping reads onto the reference failed.
    GroundTruth(ground_truth::Error),
    /// Classifying the mapped reads failed.
    Classify(classify::Error),
    /// Annotating the predictions failed.
    Prediction(prediction::Error),
    /// Building the delta table failed.
    DeltaTable(delta::Error),
    /// Building the cumulative table failed.
    CumulativeTable(cumulative::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::GroundTruth(err) => write!(f, "ground truth error: {}", err),
            Error::Classify(err) => write!(f, "classification error: {}", err),
            Error::Prediction(err) => write!(f, "prediction error: {}", err),
            Error::DeltaTable(err) => write!(f, "delta table error: {}", err),
            Error::CumulativeTable(err) => write!(f, "cumulative table error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Options for an evaluation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Options {
    /// The minimum overlap on the reference for a pair to be positive.
    pub overlap_cutoff: i64,
    /// The width of a score bucket.
    pub score_step: i64,
    /// Whether to extrapolate predicted alignments beyond the ground truth
    /// alignments when measuring their overlap.
    pub infer: bool,
    /// The delimiter between the fields of alignment records.
    pub delimiter: char,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            overlap_cutoff: DEFAULT_OVERLAP_CUTOFF,
            score_step: DEFAULT_SCORE_STEP,
            infer: true,
            delimiter: alignment::DEFAULT_DELIMITER,
        }
    }
}

impl Options {
    /// Wraps `inner` in a reader that splits alignment record fields on the
    /// configured delimiter.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::evaluate::Options;
    /// use pbove::ground_truth;
    ///
    /// let options = Options {
    ///     delimiter: ',',
    ///     ..Default::default()
    /// };
    ///
    /// let data = b"m1/1/0_500,chr1,-100,90.0,+,0,500,500,+,100,600,10000,254\n";
    /// let ground_truth = ground_truth::Builder::default().try_build_from(options.reader(&data[..]))?;
    /// assert_eq!(ground_truth.len(), 1);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn reader<T>(&self, inner: T) -> crate::Reader<T>
    where
        T: BufRead,
    {
        crate::Reader::new(inner).with_delimiter(self.delimiter)
    }
}

/// A brief summary of an evaluation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Summary {
    /// The number of query reads.
    pub queries: usize,
    /// The number of target reads.
    pub targets: usize,
    /// The ground truth class counts.
    pub counts: Counts,
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Number of query reads: {}", self.queries)?;
        writeln!(f, "Number of target reads: {}", self.targets)?;
        writeln!(
            f,
            "Number of ground truth positive overlaps: {}",
            self.counts.positive
        )?;
        writeln!(
            f,
            "Number of ground truth negative overlaps: {}",
            self.counts.negative
        )?;
        writeln!(f, "Number of ground truth weak overlaps: {}", self.counts.weak)?;
        writeln!(
            f,
            "Number of ground truth unmappable pairs of reads: {}",
            self.counts.unmappable
        )?;
        writeln!(
            f,
            "Number of ground truth mappable pairs of reads: {}",
            self.counts.mappable
        )?;
        write!(f, "Total number of pairs of reads: {}", self.counts.total)
    }
}

/// The results of an evaluation.
#[derive(Debug)]
pub struct Evaluation {
    /// The summary.
    summary: Summary,
    /// The query reads, mapped and sorted.
    query_reads: Vec<MappedRead>,
    /// The target reads, mapped and sorted.
    target_reads: Vec<MappedRead>,
    /// The mappable predictions, sorted by ascending score.
    scored: Vec<ScoredRecord>,
    /// The delta table.
    delta: DeltaTable,
    /// The cumulative table.
    cumulative: CumulativeTable,
}

impl Evaluation {
    /// Runs an evaluation.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::evaluate::Evaluation;
    /// use pbove::evaluate::Options;
    /// use pbove::record::AlignmentRecord;
    ///
    /// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
    ///              m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 550 1050 10000 254\n";
    /// let reader = pbove::Reader::new(&data[..]);
    /// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
    ///
    /// let queries = vec!["m1/1/0_500".parse()?];
    /// let targets = vec!["m1/2/0_500".parse()?];
    /// let predictions = vec!["m1/1/0_500 m1/2/0_500 -900 88.0 + 450 500 500 + 0 50 500 254"
    ///     .parse::<AlignmentRecord>()?];
    ///
    /// let options = Options {
    ///     overlap_cutoff: 50,
    ///     ..Default::default()
    /// };
    ///
    /// let evaluation = Evaluation::run(&ground_truth, &queries, &targets, &predictions, options)?;
    ///
    /// assert_eq!(evaluation.summary().counts.positive, 1);
    /// assert_eq!(evaluation.cumulative().rows()[0].true_positive, 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn run(
        ground_truth: &GroundTruth,
        queries: &[read::Name],
        targets: &[read::Name],
        predictions: &[AlignmentRecord],
        options: Options,
    ) -> Result<Self> {
        tracing::info!("mapping {} query reads onto the reference", queries.len());
        let query_reads = ground_truth
            .map_reads(queries, false)
            .map_err(Error::GroundTruth)?;

        tracing::info!("mapping {} target reads onto the reference", targets.len());
        let target_reads = ground_truth
            .map_reads(targets, false)
            .map_err(Error::GroundTruth)?;

        tracing::info!("counting ground truth positive and negative pairs");
        let counts = classify::classify_all(&query_reads, &target_reads, options.overlap_cutoff)
            .map_err(Error::Classify)?;

        tracing::info!("retrieving overlaps of {} predictions", predictions.len());
        let annotations = prediction::annotate(predictions, ground_truth, options.infer)
            .map_err(Error::Prediction)?;

        let mut scored = prediction::to_scored(&annotations);
        scored.sort_by_key(ScoredRecord::score);

        let delta = DeltaTable::try_new(&scored, options.score_step, options.overlap_cutoff)
            .map_err(Error::DeltaTable)?;
        let cumulative =
            CumulativeTable::try_new(&delta, &counts).map_err(Error::CumulativeTable)?;

        Ok(Self {
            summary: Summary {
                queries: queries.len(),
                targets: targets.len(),
                counts,
            },
            query_reads,
            target_reads,
            scored,
            delta,
            cumulative,
        })
    }

    /// Returns the summary.
    pub fn summary(&self) -> &Summary {
        &self.summary
    }

    /// Returns the query reads, mapped and sorted.
    pub fn query_reads(&self) -> &[MappedRead] {
        &self.query_reads
    }

    /// Returns the target reads, mapped and sorted.
    pub fn target_reads(&self) -> &[MappedRead] {
        &self.target_reads
    }

    /// Returns the mappable predictions as scored records in ascending score
    /// order.
    pub fn scored(&self) -> &[ScoredRecord] {
        &self.scored
    }

    /// Returns the ground truth totals to accompany the scored records.
    pub fn ground_truth_totals(&self) -> GroundTruthTotals {
        GroundTruthTotals {
            positive: Some(self.summary.counts.positive as i64),
            negative: Some(self.summary.counts.negative as i64),
        }
    }

    /// Returns the delta table.
    pub fn delta(&self) -> &DeltaTable {
        &self.delta
    }

    /// Returns the cumulative table.
    pub fn cumulative(&self) -> &CumulativeTable {
        &self.cumulative
    }

    /// Lists every query/target pair that overlaps on the reference.
    pub fn ground_truth_overlaps(&self) -> Vec<classify::GroundTruthOverlap<'_>> {
        classify::ground_truth_overlaps(&self.query_reads, &self.target_reads)
    }
}

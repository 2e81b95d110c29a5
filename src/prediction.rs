//! Predicted read-to-read overlaps annotated with the ground truth.
//!
//! A prediction is an alignment record whose query and target are both
//! reads. Annotating it looks both reads up in the [`GroundTruth`] and
//! measures how much the aligned portions overlap once mapped onto the
//! reference.

use crate::ground_truth;
use crate::ground_truth::GroundTruth;
use crate::ground_truth::Window;
use crate::read;
use crate::record::AlignmentRecord;
use crate::record::ScoredRecord;

/// An error related to annotating predictions.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The target of a prediction is not a read.
    UnrecognizedReadName(String),
    /// Mapping onto the reference failed.
    GroundTruth(ground_truth::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnrecognizedReadName(name) => {
                write!(f, "unrecognized read name: \"{}\" is not a subread", name)
            }
            Error::GroundTruth(err) => write!(f, "ground truth error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A prediction and what the ground truth says about it.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation<'a> {
    /// The prediction.
    pub record: &'a AlignmentRecord,
    /// The decoded target read.
    pub target_read: &'a read::Name,
    /// Whether the query read maps onto the reference.
    pub query_mappable: bool,
    /// Whether the target read maps onto the reference.
    pub target_mappable: bool,
    /// The overlap (or negated gap) of the aligned portions on the reference,
    /// or [`ground_truth::INCOMPARABLE`].
    pub overlap: i64,
}

impl Annotation<'_> {
    /// Returns whether both reads map onto the reference.
    pub fn is_mappable(&self) -> bool {
        self.query_mappable && self.target_mappable
    }
}

/// The classes of annotated predictions.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Tally {
    /// Predictions overlapping by at least the cutoff.
    pub true_positive: u64,
    /// Predictions that do not overlap.
    pub false_positive: u64,
    /// Predictions overlapping by less than the cutoff.
    pub weak: u64,
}

/// Annotates every prediction.
///
/// Mappability is decided on the windows named by the reads, without
/// inference. The overlap is measured on the aligned portions with the given
/// `infer` setting.
///
/// # Examples
///
/// ```
/// use pbove::prediction;
/// use pbove::record::AlignmentRecord;
///
/// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
///              m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 550 1050 10000 254\n";
/// let reader = pbove::Reader::new(&data[..]);
/// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
///
/// let predictions = vec!["m1/1/0_500 m1/2/0_500 -900 88.0 + 450 500 500 + 0 50 500 254"
///     .parse::<AlignmentRecord>()?];
///
/// let annotations = prediction::annotate(&predictions, &ground_truth, true)?;
/// assert_eq!(annotations[0].overlap, 50);
///
/// let scored = prediction::to_scored(&annotations);
/// assert_eq!(scored[0].to_string(), "m1/1/0_500\tm1/2/0_500\t-900\t50");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn annotate<'a>(
    records: &'a [AlignmentRecord],
    ground_truth: &GroundTruth,
    infer: bool,
) -> Result<Vec<Annotation<'a>>> {
    let mut annotations = Vec::with_capacity(records.len());

    for (i, record) in records.iter().enumerate() {
        if i % 1000 == 0 {
            tracing::debug!("annotating prediction {i} / {}", records.len());
        }

        annotations.push(annotate_one(record, ground_truth, infer)?);
    }

    tracing::info!("annotated {} predictions", annotations.len());

    Ok(annotations)
}

/// Annotates a single prediction.
fn annotate_one<'a>(
    record: &'a AlignmentRecord,
    ground_truth: &GroundTruth,
    infer: bool,
) -> Result<Annotation<'a>> {
    let query_read = record.query_read();
    let target_read = record
        .target_read()
        .ok_or_else(|| Error::UnrecognizedReadName(record.target().name().into()))?;

    let query_mappable = ground_truth
        .is_mappable(query_read, false)
        .map_err(Error::GroundTruth)?;
    let target_mappable = ground_truth
        .is_mappable(target_read, false)
        .map_err(Error::GroundTruth)?;

    let query = record.absolute_query();
    let target = record.absolute_target();

    let overlap = ground_truth
        .overlap_length(
            Window::new(query_read.movie(), query_read.hole(), query.start(), query.end()),
            Window::new(target_read.movie(), target_read.hole(), target.start(), target.end()),
            infer,
        )
        .map_err(Error::GroundTruth)?;

    Ok(Annotation {
        record,
        target_read,
        query_mappable,
        target_mappable,
        overlap,
    })
}

/// Converts the predictions where both reads are mappable into scored
/// records.
pub fn to_scored(annotations: &[Annotation<'_>]) -> Vec<ScoredRecord> {
    annotations
        .iter()
        .filter(|annotation| annotation.is_mappable())
        .map(|annotation| {
            ScoredRecord::new(
                annotation.record.query_read().to_string(),
                annotation.target_read.to_string(),
                annotation.record.score(),
                annotation.overlap,
            )
        })
        .collect()
}

/// Classifies every annotated prediction against the overlap cutoff.
pub fn tally(annotations: &[Annotation<'_>], cutoff: i64) -> Tally {
    let mut tally = Tally::default();

    for annotation in annotations {
        if annotation.overlap >= cutoff {
            tally.true_positive += 1;
        } else if annotation.overlap <= 0 {
            tally.false_positive += 1;
        } else {
            tally.weak += 1;
        }
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Reader;

    fn ground_truth() -> GroundTruth {
        let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
                     m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 550 1050 10000 254\n\
                     m1/3/0_500 chr1 -100 90.0 + 0 500 500 + 5000 5500 10000 254\n\
                     m1/4/0_500 chr2 -100 90.0 + 0 500 500 + 100 600 10000 254\n";

        ground_truth::Builder::default()
            .try_build_from(Reader::new(&data[..]))
            .unwrap()
    }

    fn predictions(lines: &[&str]) -> Vec<AlignmentRecord> {
        lines.iter().map(|line| line.parse().unwrap()).collect()
    }

    #[test]
    fn test_annotate() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let gt = ground_truth();
        let records = predictions(&[
            "m1/1/0_500 m1/2/0_500 -900 88.0 + 450 500 500 + 0 50 500 254",
            "m1/1/0_500 m1/3/0_500 -300 88.0 + 0 500 500 + 0 500 500 254",
            "m1/1/0_500 m1/4/0_500 -300 88.0 + 0 500 500 + 0 500 500 254",
            "m1/1/0_500 m1/9/0_500 -300 88.0 + 0 500 500 + 0 500 500 254",
        ]);

        let annotations = annotate(&records, &gt, true)?;

        assert_eq!(annotations[0].overlap, 50);
        assert!(annotations[0].is_mappable());

        assert_eq!(annotations[1].overlap, -4402);
        assert!(annotations[1].is_mappable());

        assert_eq!(annotations[2].overlap, ground_truth::INCOMPARABLE);
        assert!(annotations[2].is_mappable());

        assert!(annotations[3].query_mappable);
        assert!(!annotations[3].target_mappable);
        assert_eq!(annotations[3].overlap, ground_truth::INCOMPARABLE);

        let scored = to_scored(&annotations);
        assert_eq!(scored.len(), 3);

        let t = tally(&annotations, 50);
        assert_eq!(
            t,
            Tally {
                true_positive: 1,
                false_positive: 3,
                weak: 0
            }
        );

        let t = tally(&annotations, 51);
        assert_eq!(t.weak, 1);

        Ok(())
    }

    #[test]
    fn test_target_must_be_a_read() {
        let gt = ground_truth();
        let records = predictions(&["m1/1/0_500 chr1 -900 88.0 + 0 500 500 + 100 600 10000 254"]);

        let err = annotate(&records, &gt, true).unwrap_err();
        assert_eq!(err, Error::UnrecognizedReadName(String::from("chr1")));
        assert_eq!(
            err.to_string(),
            "unrecognized read name: \"chr1\" is not a subread"
        );
    }
}

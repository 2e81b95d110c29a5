//! An alignment record between a read and a reference (or another read).
//!
//! Alignment records are single lines of thirteen delimited fields:
//!
//! ```text
//! qname tname score pctSimilarity qstrand qstart qend qseqlength tstrand tstart tend tseqlength mapqv
//! ```
//!
//! The query must always be a subread or subsubread aligned on the positive
//! strand. On parsing, both sides are normalized into absolute coordinates:
//!
//! - the target span is flipped onto the positive strand when the target is
//!   aligned on the negative strand, and shifted by the subread start when
//!   the target name is itself a subread;
//! - the query span of a subsubread is shifted by the start of the
//!   subsubread within the full-length read.
//!
//! Once normalized, an [`AlignmentRecord`] projects points and intervals from
//! the query's absolute coordinates onto the target's absolute coordinates
//! (see [`AlignmentRecord::map_point`] and [`AlignmentRecord::map_interval`]).

pub mod sequence;

use std::num::ParseFloatError;
use std::num::ParseIntError;
use std::str::FromStr;

use omics::coordinate::Strand;
pub use sequence::Sequence;

use crate::core::interval;
use crate::core::interval::Position;
use crate::core::strand;
use crate::core::Interval;
use crate::read;

/// The default delimiter between the fields of an alignment record.
pub const DEFAULT_DELIMITER: char = ' ';

/// The number of expected fields in an alignment record.
pub const NUM_FIELDS: usize = 13;

/// The field names of an alignment record, in order.
pub const FIELD_NAMES: [&str; NUM_FIELDS] = [
    "qname",
    "tname",
    "score",
    "pctsimilarity",
    "qstrand",
    "qstart",
    "qend",
    "qseqlength",
    "tstrand",
    "tstart",
    "tend",
    "tseqlength",
    "mapqv",
];

/// An error associated with parsing an alignment record.
#[derive(Debug, PartialEq)]
pub enum ParseError {
    /// An incorrect number of fields in the line.
    IncorrectNumberOfFields(usize),
    /// An invalid score.
    InvalidScore(ParseIntError),
    /// An invalid percent similarity.
    InvalidPercentSimilarity(ParseFloatError),
    /// An invalid query sequence.
    InvalidQuerySequence(sequence::ParseError),
    /// An invalid target sequence.
    InvalidTargetSequence(sequence::ParseError),
    /// An invalid mapping quality.
    InvalidMappingQuality(ParseIntError),
    /// The query is aligned on the negative strand.
    NegativeQueryStrand,
    /// The query name could not be decoded.
    InvalidReadName(read::ParseError),
    /// The query name decodes, but not as a subread or subsubread.
    UnrecognizedReadName(String),
    /// The normalized coordinates do not form a valid interval.
    InvalidAbsoluteInterval(interval::Error),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "invalid number of fields in alignment record: expected {} fields, found {} fields",
                NUM_FIELDS, n
            ),
            ParseError::InvalidScore(err) => write!(f, "invalid score: {}", err),
            ParseError::InvalidPercentSimilarity(err) => {
                write!(f, "invalid percent similarity: {}", err)
            }
            ParseError::InvalidQuerySequence(err) => write!(f, "invalid query sequence: {}", err),
            ParseError::InvalidTargetSequence(err) => {
                write!(f, "invalid target sequence: {}", err)
            }
            ParseError::InvalidMappingQuality(err) => {
                write!(f, "invalid mapping quality: {}", err)
            }
            ParseError::NegativeQueryStrand => {
                write!(f, "the query must be aligned on the positive strand")
            }
            ParseError::InvalidReadName(err) => write!(f, "invalid read name: {}", err),
            ParseError::UnrecognizedReadName(name) => write!(
                f,
                "unrecognized read name: \"{}\" is neither a subread nor a subsubread",
                name
            ),
            ParseError::InvalidAbsoluteInterval(err) => {
                write!(f, "invalid absolute coordinates: {}", err)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// An error associated with mapping through an alignment record.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The mapped interval ends before it starts.
    InvariantViolation(Position, Position),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvariantViolation(start, end) => write!(
                f,
                "invariant violation: mapped start ({}) is greater than mapped end ({})",
                start, end
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A parsed and normalized alignment record.
#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentRecord {
    /// The query sequence.
    query: Sequence,
    /// The target sequence.
    target: Sequence,
    /// The alignment score.
    score: i64,
    /// The percent similarity.
    percent_similarity: f64,
    /// The mapping quality.
    mapping_quality: i64,
    /// The decoded query read identity.
    query_read: read::Name,
    /// The decoded target read identity, if the target is a subread.
    target_read: Option<read::Name>,
    /// The query span in full-length read coordinates.
    absolute_query: Interval,
    /// The target span in positive strand (and full-length read) coordinates.
    absolute_target: Interval,
}

impl AlignmentRecord {
    /// Parses an alignment record whose fields are split by `delimiter`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::AlignmentRecord;
    ///
    /// let line = "m1/1/0_500\tchr1\t-100\t90.0\t+\t0\t500\t500\t+\t100\t600\t10000\t254";
    /// let record = AlignmentRecord::parse_with_delimiter(line, '\t')?;
    ///
    /// assert_eq!(record.target().name(), "chr1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_with_delimiter(s: &str, delimiter: char) -> Result<Self, ParseError> {
        let parts = s.split(delimiter).collect::<Vec<_>>();
        if parts.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(parts.len()));
        }

        let score = parts[2].parse().map_err(ParseError::InvalidScore)?;
        let percent_similarity = parts[3]
            .parse()
            .map_err(ParseError::InvalidPercentSimilarity)?;
        let query = Sequence::new(parts[0], parts[4], parts[5], parts[6], parts[7])
            .map_err(ParseError::InvalidQuerySequence)?;
        let target = Sequence::new(parts[1], parts[8], parts[9], parts[10], parts[11])
            .map_err(ParseError::InvalidTargetSequence)?;
        let mapping_quality = parts[12]
            .parse()
            .map_err(ParseError::InvalidMappingQuality)?;

        if query.strand() != Strand::Positive {
            return Err(ParseError::NegativeQueryStrand);
        }

        let query_read = query.name().parse::<read::Name>().map_err(|err| match err {
            read::ParseError::IncorrectNumberOfFields(..) => {
                ParseError::UnrecognizedReadName(query.name().into())
            }
            err => ParseError::InvalidReadName(err),
        })?;

        let query_offset = match &query_read {
            read::Name::Subread { .. } => 0,
            read::Name::Subsubread { .. } => query_read.window().map_or(0, |(start, _)| start),
            read::Name::Read { .. } => {
                return Err(ParseError::UnrecognizedReadName(query.name().into()))
            }
        };

        let absolute_query = Interval::try_new(
            query.alignment_start() + query_offset,
            query.alignment_end() + query_offset,
        )
        .map_err(ParseError::InvalidAbsoluteInterval)?;

        // Targets are not required to be reads, so a failed decode is expected.
        let target_read = read::Name::parse_subread(target.name()).ok();
        let target_offset = target_read
            .as_ref()
            .and_then(read::Name::subread_start)
            .unwrap_or(0);

        let (start, end) = match target.strand() {
            Strand::Positive => (target.alignment_start(), target.alignment_end()),
            Strand::Negative => (
                target.length() - target.alignment_end(),
                target.length() - target.alignment_start(),
            ),
        };

        let absolute_target = Interval::try_new(start + target_offset, end + target_offset)
            .map_err(ParseError::InvalidAbsoluteInterval)?;

        Ok(Self {
            query,
            target,
            score,
            percent_similarity,
            mapping_quality,
            query_read,
            target_read,
            absolute_query,
            absolute_target,
        })
    }

    /// Returns the query sequence.
    pub fn query(&self) -> &Sequence {
        &self.query
    }

    /// Returns the target sequence.
    pub fn target(&self) -> &Sequence {
        &self.target
    }

    /// Returns the alignment score.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::AlignmentRecord;
    ///
    /// let record = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"
    ///     .parse::<AlignmentRecord>()?;
    /// assert_eq!(record.score(), -100);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Returns the percent similarity.
    pub fn percent_similarity(&self) -> f64 {
        self.percent_similarity
    }

    /// Returns the mapping quality.
    pub fn mapping_quality(&self) -> i64 {
        self.mapping_quality
    }

    /// Returns the decoded identity of the query read.
    pub fn query_read(&self) -> &read::Name {
        &self.query_read
    }

    /// Returns the decoded identity of the target read, if the target name is
    /// a subread name.
    pub fn target_read(&self) -> Option<&read::Name> {
        self.target_read.as_ref()
    }

    /// Returns the query span in coordinates of the full-length read.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    /// use pbove::record::AlignmentRecord;
    ///
    /// let record = "m1/1/100_900/50_250 chr1 -100 90.0 + 0 200 200 + 100 300 10000 254"
    ///     .parse::<AlignmentRecord>()?;
    /// assert_eq!(record.absolute_query(), Interval::try_new(150, 350)?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn absolute_query(&self) -> Interval {
        self.absolute_query
    }

    /// Returns the target span in positive strand coordinates.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    /// use pbove::record::AlignmentRecord;
    ///
    /// let record = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 - 100 600 10000 254"
    ///     .parse::<AlignmentRecord>()?;
    /// assert_eq!(record.absolute_target(), Interval::try_new(9400, 9900)?);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn absolute_target(&self) -> Interval {
        self.absolute_target
    }

    /// Projects a point linearly along the alignment without any range check.
    fn infer_point(&self, point: Position) -> Position {
        let (qs, qe) = (self.absolute_query.start(), self.absolute_query.end());
        let (ts, te) = (self.absolute_target.start(), self.absolute_target.end());

        if qs == qe {
            return match self.target.strand() {
                Strand::Positive => ts,
                Strand::Negative => te,
            };
        }

        let offset = (point - qs) as f64;
        let span = (qe - qs) as f64;
        let width = (te - ts) as f64;

        // `as` truncates toward zero.
        match self.target.strand() {
            Strand::Positive => (offset * width / span + ts as f64) as Position,
            Strand::Negative => (te as f64 - width * offset / span) as Position,
        }
    }

    /// Maps a point in query coordinates onto the target.
    ///
    /// Unless `infer` is set, points outside of the closed query span
    /// `[start, end]` are unmapped. On the negative strand, the mapping runs
    /// backwards from the end of the target span.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::AlignmentRecord;
    ///
    /// let record = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"
    ///     .parse::<AlignmentRecord>()?;
    ///
    /// assert_eq!(record.map_point(0, false), Some(100));
    /// assert_eq!(record.map_point(500, false), Some(600));
    /// assert_eq!(record.map_point(501, false), None);
    /// assert_eq!(record.map_point(550, true), Some(650));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn map_point(&self, point: Position, infer: bool) -> Option<Position> {
        if !infer
            && (point < self.absolute_query.start() || point > self.absolute_query.end())
        {
            return None;
        }

        Some(self.infer_point(point))
    }

    /// Maps the query interval `[start, end)` onto the target.
    ///
    /// With `infer`, both endpoints are extrapolated. Without it, an endpoint
    /// that falls outside of the query span is clamped to the boundary of the
    /// target span, and an interval covering the whole query span maps to the
    /// whole target span. `Ok(None)` means the interval does not map.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    /// use pbove::record::AlignmentRecord;
    ///
    /// let record = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 - 100 600 1000 254"
    ///     .parse::<AlignmentRecord>()?;
    ///
    /// // The target span is [400, 900) on the positive strand.
    /// assert_eq!(
    ///     record.map_interval(100, 200, false)?,
    ///     Some(Interval::try_new(700, 800)?)
    /// );
    /// assert_eq!(
    ///     record.map_interval(-100, 600, false)?,
    ///     Some(Interval::try_new(400, 900)?)
    /// );
    /// assert_eq!(record.map_interval(600, 700, false)?, None);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn map_interval(
        &self,
        start: Position,
        end: Position,
        infer: bool,
    ) -> Result<Option<Interval>, Error> {
        let strand = self.target.strand();
        let (ts, te) = (self.absolute_target.start(), self.absolute_target.end());

        let mapped_start = self.map_point(start, infer);
        let mapped_end = self.map_point(end, infer);

        let (s, e) = match (mapped_start, mapped_end) {
            (Some(s), Some(e)) => match strand {
                Strand::Positive => (s, e),
                Strand::Negative => (e, s),
            },
            (None, Some(e)) => match strand {
                Strand::Positive => (ts, e),
                Strand::Negative => (e, te),
            },
            (Some(s), None) => match strand {
                Strand::Positive => (s, te),
                Strand::Negative => (ts, s),
            },
            (None, None) => {
                if start < self.absolute_query.start() && end > self.absolute_query.end() {
                    (ts, te)
                } else {
                    return Ok(None);
                }
            }
        };

        Interval::try_new(s, e)
            .map(Some)
            .map_err(|_| Error::InvariantViolation(s, e))
    }
}

impl FromStr for AlignmentRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_delimiter(s, DEFAULT_DELIMITER)
    }
}

impl std::fmt::Display for AlignmentRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {} {} {} {} {}",
            self.query.name(),
            self.target.name(),
            self.score,
            self.percent_similarity,
            strand::encode(self.query.strand()),
            self.query.alignment_start(),
            self.query.alignment_end(),
            self.query.length(),
            strand::encode(self.target.strand()),
            self.target.alignment_start(),
            self.target.alignment_end(),
            self.target.length(),
            self.mapping_quality
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(s: &str) -> AlignmentRecord {
        s.parse::<AlignmentRecord>().unwrap()
    }

    #[test]
    fn test_valid_record() -> Result<(), Box<dyn std::error::Error>> {
        let record = "m1/1/0_500 chr1 -100 90.5 + 0 500 500 + 100 600 10000 254"
            .parse::<AlignmentRecord>()?;

        assert_eq!(record.query().name(), "m1/1/0_500");
        assert_eq!(record.score(), -100);
        assert_eq!(record.percent_similarity(), 90.5);
        assert_eq!(record.mapping_quality(), 254);
        assert_eq!(record.query_read().hole(), 1);
        assert!(record.target_read().is_none());
        assert_eq!(record.absolute_query(), Interval::try_new(0, 500)?);
        assert_eq!(record.absolute_target(), Interval::try_new(100, 600)?);

        Ok(())
    }

    #[test]
    fn test_query_names_of_other_shapes() {
        for name in ["read1", "chr1", "m1/1/0_500/0_100/7"] {
            let err = format!("{name} chr1 -100 90.0 + 0 500 500 + 100 600 10000 254")
                .parse::<AlignmentRecord>()
                .unwrap_err();
            assert_eq!(err, ParseError::UnrecognizedReadName(String::from(name)));
        }
    }

    #[test]
    fn test_strand_encodings() -> Result<(), Box<dyn std::error::Error>> {
        let record = "m1/1/0_500 chr1 -100 90.5 0 0 500 500 1 100 600 1000 254"
            .parse::<AlignmentRecord>()?;
        assert_eq!(record.target().strand(), Strand::Negative);
        assert_eq!(record.absolute_target(), Interval::try_new(400, 900)?);

        Ok(())
    }

    #[test]
    fn test_subsubread_query_is_shifted() -> Result<(), Box<dyn std::error::Error>> {
        let subsubread = record("m1/1/100_900/50_250 chr1 -100 90.0 + 10 20 200 + 0 10 10000 254");
        assert_eq!(subsubread.absolute_query(), Interval::try_new(160, 170)?);
        Ok(())
    }

    #[test]
    fn test_read_target_is_shifted() -> Result<(), Box<dyn std::error::Error>> {
        let positive = record("m1/1/0_500 m1/2/1000_2000 -100 90.0 + 0 500 500 + 0 500 1000 254");
        assert_eq!(positive.absolute_target(), Interval::try_new(1000, 1500)?);
        assert_eq!(positive.target_read().map(|r| r.hole()), Some(2));

        let negative = record("m1/1/0_500 m1/2/1000_2000 -100 90.0 + 0 500 500 - 0 500 1000 254");
        assert_eq!(negative.absolute_target(), Interval::try_new(1500, 2000)?);

        Ok(())
    }

    #[test]
    fn test_invalid_records() {
        let err = "m1/1/0_500 chr1 -100".parse::<AlignmentRecord>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid number of fields in alignment record: expected 13 fields, found 3 fields"
        );

        let err = "m1/1/0_500 chr1 -100 90.0 - 0 500 500 + 100 600 10000 254"
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert_eq!(err, ParseError::NegativeQueryStrand);

        let err = "m1/1/0_500 chr1 -100 90.0 + 0 600 500 + 100 600 10000 254"
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidQuerySequence(_)));

        let err = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 "
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidMappingQuality(_)));

        let err = "m1/1 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized read name: \"m1/1\" is neither a subread nor a subsubread"
        );

        let err = "m1/x/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert!(matches!(err, ParseError::InvalidReadName(_)));

        let err = "m1/1/0_500 chr1 -100 90.0 + 0 500 500 x 100 600 10000 254"
            .parse::<AlignmentRecord>()
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid target sequence: invalid strand: unknown strand: x"
        );
    }

    #[test]
    fn test_map_point_boundaries() {
        let positive = record("m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254");
        assert_eq!(positive.map_point(0, false), Some(100));
        assert_eq!(positive.map_point(500, false), Some(600));
        assert_eq!(positive.map_point(250, false), Some(350));
        assert_eq!(positive.map_point(-1, false), None);

        let negative = record("m1/1/0_500 chr1 -100 90.0 + 0 500 500 - 100 600 1000 254");
        assert_eq!(negative.map_point(0, false), Some(900));
        assert_eq!(negative.map_point(500, false), Some(400));
        assert_eq!(negative.map_point(100, false), Some(800));
    }

    #[test]
    fn test_map_point_truncates() {
        // Target span is twice as short as the query span.
        let halved = record("m1/1/0_300 chr1 -100 90.0 + 0 300 300 + 0 150 10000 254");
        assert_eq!(halved.map_point(3, false), Some(1));

        // Extrapolation below zero truncates toward zero.
        assert_eq!(halved.map_point(-3, true), Some(-1));
    }

    #[test]
    fn test_map_interval_clamping() -> Result<(), Box<dyn std::error::Error>> {
        let positive = record("m1/1/100_600 chr1 -100 90.0 + 100 600 600 + 100 600 10000 254");
        assert_eq!(
            positive.map_interval(0, 200, false)?,
            Some(Interval::try_new(100, 200)?)
        );
        assert_eq!(
            positive.map_interval(500, 700, false)?,
            Some(Interval::try_new(500, 600)?)
        );
        assert_eq!(
            positive.map_interval(0, 700, false)?,
            Some(Interval::try_new(100, 600)?)
        );
        assert_eq!(positive.map_interval(0, 50, false)?, None);
        assert_eq!(
            positive.map_interval(0, 50, true)?,
            Some(Interval::try_new(0, 50)?)
        );

        let negative = record("m1/1/100_600 chr1 -100 90.0 + 100 600 600 - 100 600 1000 254");
        // The target span is [400, 900); query 100 maps to 900, 600 maps to 400.
        assert_eq!(
            negative.map_interval(0, 200, false)?,
            Some(Interval::try_new(800, 900)?)
        );
        assert_eq!(
            negative.map_interval(500, 700, false)?,
            Some(Interval::try_new(400, 500)?)
        );
        assert_eq!(
            negative.map_interval(200, 300, true)?,
            Some(Interval::try_new(700, 800)?)
        );

        Ok(())
    }

    #[test]
    fn test_map_interval_invariant_violation() {
        let positive = record("m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254");
        let err = positive.map_interval(300, 200, false).unwrap_err();
        assert_eq!(err, Error::InvariantViolation(400, 300));
        assert_eq!(
            err.to_string(),
            "invariant violation: mapped start (400) is greater than mapped end (300)"
        );
    }

    #[test]
    fn test_zero_length_query_span() -> Result<(), Box<dyn std::error::Error>> {
        let positive = record("m1/1/0_500 chr1 -100 90.0 + 100 100 500 + 100 600 10000 254");
        assert_eq!(positive.map_point(100, false), Some(100));

        let negative = record("m1/1/0_500 chr1 -100 90.0 + 100 100 500 - 100 600 1000 254");
        assert_eq!(negative.map_point(100, false), Some(900));
        assert_eq!(
            negative.map_interval(0, 200, false)?,
            Some(Interval::try_new(400, 900)?)
        );

        Ok(())
    }

    #[test]
    fn test_display() {
        let line = "m1/1/0_500 chr1 -100 90.5 + 0 500 500 - 100 600 10000 254";
        assert_eq!(record(line).to_string(), line);
    }
}

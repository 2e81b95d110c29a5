//! A predicted read-to-read alignment score paired with the ground truth
//! overlap of the two reads.
//!
//! Scored records are tab-delimited lines of four fields:
//!
//! ```text
//! qname tname score overlap
//! ```
//!
//! Files of scored records may carry the number of ground truth positive and
//! negative pairs as comments (`#numGroundTruthOVLPos=<n>` and
//! `#numGroundTruthOVLNeg=<n>`), decoded by [`GroundTruthTotals`].

use std::num::ParseIntError;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

/// The delimiter between the fields of a scored record.
pub const DELIMITER: char = '\t';

/// The number of expected fields in a scored record.
pub const NUM_FIELDS: usize = 4;

/// The field names of a scored record, in order.
pub const FIELD_NAMES: [&str; NUM_FIELDS] = ["qname", "tname", "score", "overlap"];

/// Matches a ground truth total comment.
static TOTAL_COMMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#numGroundTruthOVL(Pos|Neg)=(-?\d+)$").expect("valid regular expression")
});

/// An error associated with parsing a scored record.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An incorrect number of fields in the line.
    IncorrectNumberOfFields(usize),
    /// An invalid score.
    InvalidScore(ParseIntError),
    /// An invalid overlap length.
    InvalidOverlap(ParseIntError),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(n) => write!(
                f,
                "invalid number of fields in scored record: expected {NUM_FIELDS} fields, found {n} fields"
            ),
            ParseError::InvalidScore(err) => write!(f, "invalid score: {err}"),
            ParseError::InvalidOverlap(err) => write!(f, "invalid overlap: {err}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// A scored read-to-read record.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct ScoredRecord {
    /// The query read name.
    query_name: String,
    /// The target read name.
    target_name: String,
    /// The predicted alignment score.
    score: i64,
    /// The ground truth overlap length.
    overlap: i64,
}

impl ScoredRecord {
    /// Creates a new scored record.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::ScoredRecord;
    ///
    /// let record = ScoredRecord::new("m1/1/0_500", "m1/2/0_500", -1000, 50);
    /// assert_eq!(record.to_string(), "m1/1/0_500\tm1/2/0_500\t-1000\t50");
    /// ```
    pub fn new(
        query_name: impl Into<String>,
        target_name: impl Into<String>,
        score: i64,
        overlap: i64,
    ) -> Self {
        Self {
            query_name: query_name.into(),
            target_name: target_name.into(),
            score,
            overlap,
        }
    }

    /// Parses a scored record whose fields are split by `delimiter`.
    pub fn parse_with_delimiter(s: &str, delimiter: char) -> Result<Self, ParseError> {
        let parts = s.split(delimiter).collect::<Vec<_>>();
        if parts.len() != NUM_FIELDS {
            return Err(ParseError::IncorrectNumberOfFields(parts.len()));
        }

        Ok(Self {
            query_name: parts[0].into(),
            target_name: parts[1].into(),
            score: parts[2].parse().map_err(ParseError::InvalidScore)?,
            overlap: parts[3].parse().map_err(ParseError::InvalidOverlap)?,
        })
    }

    /// Returns the query read name.
    pub fn query_name(&self) -> &str {
        &self.query_name
    }

    /// Returns the target read name.
    pub fn target_name(&self) -> &str {
        &self.target_name
    }

    /// Returns the predicted alignment score.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::ScoredRecord;
    ///
    /// let record = "m1/1/0_500\tm1/2/0_500\t-1000\t50".parse::<ScoredRecord>()?;
    /// assert_eq!(record.score(), -1000);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Returns the ground truth overlap length.
    pub fn overlap(&self) -> i64 {
        self.overlap
    }
}

impl FromStr for ScoredRecord {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_with_delimiter(s, DELIMITER)
    }
}

impl std::fmt::Display for ScoredRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}{DELIMITER}{}{DELIMITER}{}{DELIMITER}{}",
            self.query_name, self.target_name, self.score, self.overlap
        )
    }
}

/// The ground truth totals carried by comment lines.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct GroundTruthTotals {
    /// The number of ground truth positive pairs, if seen.
    pub positive: Option<i64>,
    /// The number of ground truth negative pairs, if seen.
    pub negative: Option<i64>,
}

impl GroundTruthTotals {
    /// Records the total carried by a comment line, if it carries one.
    ///
    /// Returns whether the comment was a ground truth total.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::scored::GroundTruthTotals;
    ///
    /// let mut totals = GroundTruthTotals::default();
    ///
    /// assert!(totals.observe("#numGroundTruthOVLPos=100"));
    /// assert!(totals.observe("#numGroundTruthOVLNeg=200"));
    /// assert!(!totals.observe("# some other comment"));
    ///
    /// assert_eq!(totals.positive, Some(100));
    /// assert_eq!(totals.negative, Some(200));
    /// ```
    pub fn observe(&mut self, comment: &str) -> bool {
        let Some(captures) = TOTAL_COMMENT.captures(comment) else {
            return false;
        };

        let Ok(value) = captures[2].parse() else {
            return false;
        };

        match &captures[1] {
            "Pos" => self.positive = Some(value),
            _ => self.negative = Some(value),
        }

        true
    }

    /// Renders the totals as comment lines.
    pub fn to_comments(&self) -> Vec<String> {
        let mut comments = Vec::new();

        if let Some(n) = self.positive {
            comments.push(format!("#numGroundTruthOVLPos={n}"));
        }

        if let Some(n) = self.negative {
            comments.push(format!("#numGroundTruthOVLNeg={n}"));
        }

        comments
    }
}

//! One side (query or target) of an alignment record.

use std::num::ParseIntError;

use omics::coordinate::Strand;

use crate::core::interval::Position;
use crate::core::strand;

/// Errors associated with parsing a sequence.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// An invalid strand.
    InvalidStrand(strand::Error),
    /// An invalid alignment start.
    InvalidAlignmentStart(ParseIntError),
    /// An invalid alignment end.
    InvalidAlignmentEnd(ParseIntError),
    /// An invalid sequence length.
    InvalidLength(ParseIntError),
    /// The alignment coordinates fall outside of the sequence.
    OutOfRange(Position, Position, Position),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidStrand(err) => write!(f, "invalid strand: {}", err),
            ParseError::InvalidAlignmentStart(err) => write!(f, "invalid alignment start: {}", err),
            ParseError::InvalidAlignmentEnd(err) => write!(f, "invalid alignment end: {}", err),
            ParseError::InvalidLength(err) => write!(f, "invalid sequence length: {}", err),
            ParseError::OutOfRange(start, end, length) => write!(
                f,
                "alignment [{}, {}) does not satisfy 0 <= start <= end <= length ({})",
                start, end, length
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// The query or target portion of an alignment record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sequence {
    /// The sequence name.
    name: String,
    /// The strand.
    strand: Strand,
    /// The start of the alignment.
    alignment_start: Position,
    /// The end of the alignment.
    alignment_end: Position,
    /// The length of the sequence.
    length: Position,
}

impl Sequence {
    /// Creates a new sequence from its textual fields.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::alignment::Sequence;
    ///
    /// let sequence = Sequence::new("chr1", "-", "10", "20", "100")?;
    /// assert_eq!(sequence.alignment_end(), 20);
    ///
    /// assert!(Sequence::new("chr1", "+", "10", "200", "100").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn new(
        name: &str,
        strand: &str,
        alignment_start: &str,
        alignment_end: &str,
        length: &str,
    ) -> Result<Self, ParseError> {
        let strand = strand::decode(strand).map_err(ParseError::InvalidStrand)?;
        let alignment_start = alignment_start
            .parse()
            .map_err(ParseError::InvalidAlignmentStart)?;
        let alignment_end = alignment_end
            .parse()
            .map_err(ParseError::InvalidAlignmentEnd)?;
        let length = length.parse().map_err(ParseError::InvalidLength)?;

        if length <= 0
            || alignment_start < 0
            || alignment_start > alignment_end
            || alignment_end > length
        {
            return Err(ParseError::OutOfRange(
                alignment_start,
                alignment_end,
                length,
            ));
        }

        Ok(Self {
            name: name.into(),
            strand,
            alignment_start,
            alignment_end,
            length,
        })
    }

    /// Returns the sequence name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the strand.
    pub fn strand(&self) -> Strand {
        self.strand
    }

    /// Returns the alignment start.
    pub fn alignment_start(&self) -> Position {
        self.alignment_start
    }

    /// Returns the alignment end.
    pub fn alignment_end(&self) -> Position {
        self.alignment_end
    }

    /// Returns the length of the sequence.
    pub fn length(&self) -> Position {
        self.length
    }
}

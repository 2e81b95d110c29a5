//! Delimited records.
//!
//! Two record formats are supported: [`AlignmentRecord`]s, describing where
//! a read aligned, and [`ScoredRecord`]s, pairing a predicted read-to-read
//! alignment score with the ground truth overlap of the two reads.

pub mod alignment;
pub mod scored;

pub use alignment::AlignmentRecord;
pub use scored::ScoredRecord;

/// A record that occupies a single delimited line.
pub trait Record: Sized {
    /// The error returned when a line fails to parse.
    type ParseError: std::error::Error;

    /// The delimiter used when none is configured.
    const DEFAULT_DELIMITER: char;

    /// The names of the fields, in order, as they appear in a header line.
    const FIELD_NAMES: &'static [&'static str];

    /// Parses a record whose fields are split by `delimiter`.
    fn parse(s: &str, delimiter: char) -> Result<Self, Self::ParseError>;

    /// Returns whether the line is a header line listing the field names.
    ///
    /// Field names are compared without regard to ASCII case.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::Record;
    /// use pbove::record::ScoredRecord;
    ///
    /// assert!(ScoredRecord::is_header("qname\ttname\tscore\toverlap", '\t'));
    /// assert!(ScoredRecord::is_header("qName\ttName\tscore\toverlap", '\t'));
    /// assert!(!ScoredRecord::is_header("m1/1/0_5\tm1/2/0_5\t-10\t5", '\t'));
    /// ```
    fn is_header(s: &str, delimiter: char) -> bool {
        let mut fields = s.split(delimiter);

        Self::FIELD_NAMES
            .iter()
            .all(|name| fields.next().is_some_and(|field| field.eq_ignore_ascii_case(name)))
            && fields.next().is_none()
    }
}

impl Record for AlignmentRecord {
    type ParseError = alignment::ParseError;

    const DEFAULT_DELIMITER: char = alignment::DEFAULT_DELIMITER;

    const FIELD_NAMES: &'static [&'static str] = &alignment::FIELD_NAMES;

    fn parse(s: &str, delimiter: char) -> Result<Self, Self::ParseError> {
        AlignmentRecord::parse_with_delimiter(s, delimiter)
    }
}

impl Record for ScoredRecord {
    type ParseError = scored::ParseError;

    const DEFAULT_DELIMITER: char = scored::DELIMITER;

    const FIELD_NAMES: &'static [&'static str] = &scored::FIELD_NAMES;

    fn parse(s: &str, delimiter: char) -> Result<Self, Self::ParseError> {
        ScoredRecord::parse_with_delimiter(s, delimiter)
    }
}

//! A line within a delimited record file.

use crate::record::Record;

/// The prefix for a comment line.
pub const COMMENT_PREFIX: char = '#';

/// An error associated with parsing a line.
#[derive(Debug)]
pub enum ParseError<E> {
    /// An invalid record.
    InvalidRecord(E, String),
}

impl<E> std::fmt::Display for ParseError<E>
where
    E: std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidRecord(err, line) => {
                write!(f, "invalid record: {}\n\nline: {}", err, line)
            }
        }
    }
}

impl<E> std::error::Error for ParseError<E> where E: std::error::Error {}

/// A line within a delimited record file.
#[derive(Clone, Debug, PartialEq)]
pub enum Line<R> {
    /// An empty line.
    Empty,
    /// A comment line, including its prefix.
    Comment(String),
    /// A header line listing the field names.
    Header,
    /// A record line.
    Record(R),
}

impl<R> Line<R>
where
    R: Record,
{
    /// Parses a line whose fields are split by `delimiter`.
    ///
    /// Trailing whitespace is ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::line::Line;
    /// use pbove::record::ScoredRecord;
    ///
    /// let line = Line::<ScoredRecord>::parse("#numGroundTruthOVLPos=1", '\t')?;
    /// assert!(matches!(line, Line::Comment(_)));
    ///
    /// let line = Line::<ScoredRecord>::parse("qname\ttname\tscore\toverlap", '\t')?;
    /// assert!(matches!(line, Line::Header));
    ///
    /// let line = Line::<ScoredRecord>::parse("q\tt\t-1\t5\n", '\t')?;
    /// assert!(matches!(line, Line::Record(_)));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse(s: &str, delimiter: char) -> Result<Self, ParseError<R::ParseError>> {
        let s = s.trim_end();

        if s.is_empty() {
            Ok(Line::Empty)
        } else if s.starts_with(COMMENT_PREFIX) {
            Ok(Line::Comment(s.into()))
        } else if R::is_header(s, delimiter) {
            Ok(Line::Header)
        } else {
            R::parse(s, delimiter)
                .map(Line::Record)
                .map_err(|e| ParseError::InvalidRecord(e, s.into()))
        }
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use crate::record::AlignmentRecord;
    use crate::record::ScoredRecord;

    #[test]
    pub fn test_empty_and_comment_lines() -> Result<(), Box<dyn std::error::Error>> {
        assert!(matches!(
            Line::<AlignmentRecord>::parse("", ' ')?,
            Line::Empty
        ));
        assert!(matches!(
            Line::<AlignmentRecord>::parse("  \t", ' ')?,
            Line::Empty
        ));
        assert_eq!(
            Line::<AlignmentRecord>::parse("# comment", ' ')?,
            Line::Comment(String::from("# comment"))
        );
        Ok(())
    }

    #[test]
    pub fn test_header_lines() -> Result<(), Box<dyn std::error::Error>> {
        let header = "qname tname score pctsimilarity qstrand qstart qend qseqlength \
                      tstrand tstart tend tseqlength mapqv";
        assert!(matches!(
            Line::<AlignmentRecord>::parse(header, ' ')?,
            Line::Header
        ));

        let header = header.replace(' ', "\t");
        assert!(matches!(
            Line::<AlignmentRecord>::parse(&header, '\t')?,
            Line::Header
        ));

        Ok(())
    }

    #[test]
    pub fn test_record_lines() -> Result<(), Box<dyn std::error::Error>> {
        let line = Line::<AlignmentRecord>::parse(
            "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254 ",
            ' ',
        )?;
        assert!(matches!(line, Line::Record(_)));

        let line = Line::<ScoredRecord>::parse("q\tt\t1\t2", '\t')?;
        assert_eq!(line, Line::Record(ScoredRecord::new("q", "t", 1, 2)));

        Ok(())
    }

    #[test]
    pub fn test_invalid_record_line() {
        let err = Line::<ScoredRecord>::parse("q\tt\t1", '\t').unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid record: invalid number of fields in scored record: \
             expected 4 fields, found 3 fields\n\nline: q\tt\t1"
        );
    }
}

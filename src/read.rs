//! Read identities of the form `movie/hole[/start_end[/start_end]]`.
//!
//! A sequencing read is identified by the movie it was recorded in and the
//! hole (sensor position) that recorded it. Reads may be subdivided: a
//! **subread** names a window `[start1, end1)` of the full-length read, and a
//! **subsubread** names a window `[start2, end2)` relative to its subread.
//!
//! ```text
//! m1/42                    <= a read
//! m1/42/100_900            <= a subread spanning [100, 900) of the read
//! m1/42/100_900/50_250     <= a subsubread spanning [150, 350) of the read
//! ```

pub mod fasta;

use std::num::ParseIntError;
use std::str::FromStr;

use crate::core::interval::Position;

/// The delimiter between the fields of a read name.
pub const FIELD_DELIMITER: char = '/';

/// The delimiter between the start and end of a window.
pub const WINDOW_DELIMITER: char = '_';

/// An error associated with parsing a read name.
#[derive(Debug, Eq, PartialEq)]
pub enum ParseError {
    /// The name has a number of fields that matches no read shape.
    IncorrectNumberOfFields(String, usize),
    /// The hole number could not be parsed.
    InvalidHole(String, ParseIntError),
    /// A window is not of the form `start_end`.
    InvalidWindow(String),
    /// A window position could not be parsed.
    InvalidPosition(String, ParseIntError),
    /// A window ends before it starts.
    ReversedWindow(String),
    /// The subsubread window extends beyond its subread.
    SubsubreadOutOfBounds(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::IncorrectNumberOfFields(name, n) => write!(
                f,
                "unrecognized read name \"{name}\": expected 2, 3 or 4 fields, found {n} fields"
            ),
            ParseError::InvalidHole(name, err) => {
                write!(f, "invalid hole number in read name \"{name}\": {err}")
            }
            ParseError::InvalidWindow(window) => {
                write!(f, "invalid window: expected start_end, found \"{window}\"")
            }
            ParseError::InvalidPosition(window, err) => {
                write!(f, "invalid position in window \"{window}\": {err}")
            }
            ParseError::ReversedWindow(window) => {
                write!(f, "invalid window \"{window}\": end is less than start")
            }
            ParseError::SubsubreadOutOfBounds(name) => write!(
                f,
                "subsubread window of \"{name}\" is out of the bounds of its subread"
            ),
        }
    }
}

impl std::error::Error for ParseError {}

/// A read identity.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub enum Name {
    /// A full-length read.
    Read {
        /// The movie.
        movie: String,
        /// The hole number.
        hole: u64,
    },

    /// A window of a full-length read.
    Subread {
        /// The movie.
        movie: String,
        /// The hole number.
        hole: u64,
        /// The start of the subread within the read.
        start1: Position,
        /// The end of the subread within the read.
        end1: Position,
    },

    /// A window of a subread.
    Subsubread {
        /// The movie.
        movie: String,
        /// The hole number.
        hole: u64,
        /// The start of the subread within the read.
        start1: Position,
        /// The end of the subread within the read.
        end1: Position,
        /// The start of the subsubread within the subread.
        start2: Position,
        /// The end of the subsubread within the subread.
        end2: Position,
    },
}

impl Name {
    /// Parses only the `movie/hole/start1_end1` prefix of a name.
    ///
    /// Fields beyond the subread window are ignored, so both subread and
    /// subsubread names decode to the enclosing [`Name::Subread`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::read::Name;
    ///
    /// let name = Name::parse_subread("m1/42/100_900/50_250")?;
    /// assert_eq!(name.to_string(), "m1/42/100_900");
    ///
    /// assert!(Name::parse_subread("chr1").is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_subread(s: &str) -> Result<Self, ParseError> {
        let parts = s.split(FIELD_DELIMITER).collect::<Vec<_>>();
        let (movie, hole, start1, end1) = parse_subread_fields(s, &parts)?;

        Ok(Name::Subread {
            movie,
            hole,
            start1,
            end1,
        })
    }

    /// Gets the movie.
    pub fn movie(&self) -> &str {
        match self {
            Name::Read { movie, .. } => movie,
            Name::Subread { movie, .. } => movie,
            Name::Subsubread { movie, .. } => movie,
        }
    }

    /// Gets the hole number.
    pub fn hole(&self) -> u64 {
        match self {
            Name::Read { hole, .. } => *hole,
            Name::Subread { hole, .. } => *hole,
            Name::Subsubread { hole, .. } => *hole,
        }
    }

    /// Gets the window this name spans in the coordinates of the full-length
    /// read.
    ///
    /// A full-length read carries no window.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::read::Name;
    ///
    /// assert_eq!("m1/42".parse::<Name>()?.window(), None);
    /// assert_eq!("m1/42/100_900".parse::<Name>()?.window(), Some((100, 900)));
    /// assert_eq!(
    ///     "m1/42/100_900/50_250".parse::<Name>()?.window(),
    ///     Some((150, 350))
    /// );
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn window(&self) -> Option<(Position, Position)> {
        match self {
            Name::Read { .. } => None,
            Name::Subread { start1, end1, .. } => Some((*start1, *end1)),
            Name::Subsubread {
                start1,
                start2,
                end2,
                ..
            } => Some((start1 + start2, start1 + end2)),
        }
    }

    /// Gets the offset of the subread within the full-length read.
    pub fn subread_start(&self) -> Option<Position> {
        match self {
            Name::Read { .. } => None,
            Name::Subread { start1, .. } => Some(*start1),
            Name::Subsubread { start1, .. } => Some(*start1),
        }
    }
}

impl std::fmt::Display for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Name::Read { movie, hole } => write!(f, "{movie}/{hole}"),
            Name::Subread {
                movie,
                hole,
                start1,
                end1,
            } => write!(f, "{movie}/{hole}/{start1}_{end1}"),
            Name::Subsubread {
                movie,
                hole,
                start1,
                end1,
                start2,
                end2,
            } => write!(f, "{movie}/{hole}/{start1}_{end1}/{start2}_{end2}"),
        }
    }
}

impl FromStr for Name {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts = s.split(FIELD_DELIMITER).collect::<Vec<_>>();

        match parts.len() {
            2 => Ok(Name::Read {
                movie: parts[0].into(),
                hole: parse_hole(s, parts[1])?,
            }),
            3 => Name::parse_subread(s),
            4 => {
                let (movie, hole, start1, end1) = parse_subread_fields(s, &parts)?;
                let (start2, end2) = parse_window(parts[3])?;

                if start2 < 0 || end2 > end1 - start1 {
                    return Err(ParseError::SubsubreadOutOfBounds(s.into()));
                }

                Ok(Name::Subsubread {
                    movie,
                    hole,
                    start1,
                    end1,
                    start2,
                    end2,
                })
            }
            n => Err(ParseError::IncorrectNumberOfFields(s.into(), n)),
        }
    }
}

/// Parses the `movie/hole/start1_end1` prefix of an already split name.
fn parse_subread_fields(
    name: &str,
    parts: &[&str],
) -> Result<(String, u64, Position, Position), ParseError> {
    if parts.len() < 3 {
        return Err(ParseError::IncorrectNumberOfFields(name.into(), parts.len()));
    }

    let hole = parse_hole(name, parts[1])?;
    let (start1, end1) = parse_window(parts[2])?;

    Ok((parts[0].into(), hole, start1, end1))
}

/// Parses a hole number.
fn parse_hole(name: &str, hole: &str) -> Result<u64, ParseError> {
    hole.parse()
        .map_err(|err| ParseError::InvalidHole(name.into(), err))
}

/// Parses a `start_end` window.
fn parse_window(window: &str) -> Result<(Position, Position), ParseError> {
    let (start, end) = window
        .split_once(WINDOW_DELIMITER)
        .ok_or_else(|| ParseError::InvalidWindow(window.into()))?;

    let start = start
        .parse()
        .map_err(|err| ParseError::InvalidPosition(window.into(), err))?;
    let end = end
        .parse()
        .map_err(|err| ParseError::InvalidPosition(window.into(), err))?;

    if end < start {
        return Err(ParseError::ReversedWindow(window.into()));
    }

    Ok((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_shapes() -> Result<(), Box<dyn std::error::Error>> {
        let read = "m1/7".parse::<Name>()?;
        assert_eq!(
            read,
            Name::Read {
                movie: String::from("m1"),
                hole: 7
            }
        );

        let subread = "m1/7/0_500".parse::<Name>()?;
        assert!(matches!(subread, Name::Subread { .. }));
        assert_eq!(subread.movie(), "m1");
        assert_eq!(subread.hole(), 7);
        assert_eq!(subread.subread_start(), Some(0));

        let subsubread = "m1/7/100_500/10_20".parse::<Name>()?;
        assert!(matches!(subsubread, Name::Subsubread { .. }));
        assert_eq!(subsubread.window(), Some((110, 120)));
        assert_eq!(subsubread.subread_start(), Some(100));

        Ok(())
    }

    #[test]
    fn test_display_round_trips() -> Result<(), Box<dyn std::error::Error>> {
        for name in ["m1/7", "m1/7/0_500", "m1/7/100_500/10_20"] {
            assert_eq!(name.parse::<Name>()?.to_string(), name);
        }

        Ok(())
    }

    #[test]
    fn test_invalid_names() {
        let err = "chr1".parse::<Name>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "unrecognized read name \"chr1\": expected 2, 3 or 4 fields, found 1 fields"
        );

        let err = "m1/x/0_500".parse::<Name>().unwrap_err();
        assert!(matches!(err, ParseError::InvalidHole(_, _)));

        let err = "m1/7/0-500".parse::<Name>().unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid window: expected start_end, found \"0-500\""
        );

        let err = "m1/7/500_0".parse::<Name>().unwrap_err();
        assert_eq!(err, ParseError::ReversedWindow(String::from("500_0")));

        let err = "m1/7/1/2/3".parse::<Name>().unwrap_err();
        assert!(matches!(err, ParseError::IncorrectNumberOfFields(_, 5)));
    }

    #[test]
    fn test_subsubread_bounds() {
        assert!("m1/7/100_200/0_100".parse::<Name>().is_ok());

        let err = "m1/7/100_200/0_101".parse::<Name>().unwrap_err();
        assert_eq!(
            err,
            ParseError::SubsubreadOutOfBounds(String::from("m1/7/100_200/0_101"))
        );

        let err = "m1/7/100_200/-5_10".parse::<Name>().unwrap_err();
        assert!(matches!(err, ParseError::SubsubreadOutOfBounds(_)));
    }

    #[test]
    fn test_lenient_subread_parsing() -> Result<(), Box<dyn std::error::Error>> {
        let name = Name::parse_subread("m1/7/100_200/0_500")?;
        assert_eq!(name.window(), Some((100, 200)));

        assert!(Name::parse_subread("m1/7").is_err());
        assert!(Name::parse_subread("chr1").is_err());

        Ok(())
    }
}

//! Read identities collected from FASTA headers.

use std::io;
use std::io::BufRead;
use std::string::FromUtf8Error;

use noodles::fasta;

use crate::read::Name;
use crate::read::ParseError;

/// An error related to collecting read names from a FASTA file.
#[derive(Debug)]
pub enum Error {
    /// An I/O error.
    Io(io::Error),
    /// A record name that is not valid UTF-8.
    InvalidEncoding(FromUtf8Error),
    /// A record name that is not a subread name.
    InvalidName(ParseError),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err) => write!(f, "i/o error: {err}"),
            Error::InvalidEncoding(err) => write!(f, "invalid record name encoding: {err}"),
            Error::InvalidName(err) => write!(f, "invalid record name: {err}"),
        }
    }
}

impl std::error::Error for Error {}

/// Collects the subread identity of every record in a FASTA stream.
///
/// Each header is decoded with [`Name::parse_subread`], so subsubread
/// headers contribute the window of their enclosing subread.
///
/// # Examples
///
/// ```
/// use pbove::read::fasta;
///
/// let data = b">m1/1/0_500\nACGT\n>m1/2/10_20/0_5\nAC\n";
/// let names = fasta::read_names(&data[..])?;
///
/// assert_eq!(names.len(), 2);
/// assert_eq!(names[0].to_string(), "m1/1/0_500");
/// assert_eq!(names[1].window(), Some((10, 20)));
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn read_names<R>(reader: R) -> Result<Vec<Name>, Error>
where
    R: BufRead,
{
    let mut reader = fasta::io::Reader::new(reader);
    let mut names = Vec::new();

    for result in reader.records() {
        let record = result.map_err(Error::Io)?;
        let name = String::from_utf8(record.name().to_vec()).map_err(Error::InvalidEncoding)?;
        names.push(Name::parse_subread(&name).map_err(Error::InvalidName)?);
    }

    tracing::debug!("collected {} read names", names.len());

    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_names() -> Result<(), Box<dyn std::error::Error>> {
        let data = b">m1/1/0_500 some description\nACGT\nACGT\n>m2/9/5_10\nA\n";
        let names = read_names(&data[..])?;

        assert_eq!(names.len(), 2);
        assert_eq!(names[0].movie(), "m1");
        assert_eq!(names[0].window(), Some((0, 500)));
        assert_eq!(names[1].hole(), 9);

        Ok(())
    }

    #[test]
    fn test_non_subread_header() {
        let data = b">chr1\nACGT\n";
        let err = read_names(&data[..]).unwrap_err();
        assert!(matches!(err, Error::InvalidName(_)));
    }
}

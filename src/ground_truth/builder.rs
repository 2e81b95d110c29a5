//! A builder for a [`GroundTruth`].

use std::io::BufRead;

use crate::ground_truth::GroundTruth;
use crate::reader;
use crate::record::alignment;
use crate::record::AlignmentRecord;

/// An error related to building a [`GroundTruth`].
#[derive(Debug)]
pub enum Error {
    /// An error reading an alignment record.
    InvalidRecord(reader::Error<alignment::ParseError>),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidRecord(err) => write!(f, "invalid ground truth record: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A builder for a [`GroundTruth`].
#[allow(missing_debug_implementations)]
pub struct Builder;

impl Builder {
    /// Builds a [`GroundTruth`] from every alignment record in `reader`.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254";
    /// let reader = pbove::Reader::new(&data[..]);
    ///
    /// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
    /// assert_eq!(ground_truth.len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_build_from<T>(&self, mut reader: reader::Reader<T>) -> Result<GroundTruth>
    where
        T: BufRead,
    {
        let records = reader
            .records::<AlignmentRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::InvalidRecord)?;

        tracing::info!("loaded {} ground truth alignment records", records.len());

        Ok(GroundTruth::from_records(records))
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_skips_headers_and_comments() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let data = b"# ground truth\n\
                     qname tname score pctsimilarity qstrand qstart qend qseqlength tstrand tstart tend tseqlength mapqv\n\
                     m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
                     \n";

        let ground_truth = Builder::default().try_build_from(reader::Reader::new(&data[..]))?;
        assert_eq!(ground_truth.len(), 1);

        Ok(())
    }

    #[test]
    fn test_builder_fails_on_malformed_record() {
        let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
                     m1/2/0_500 chr1 -100 90.0 + 0 500\n";

        let err = Builder::default()
            .try_build_from(reader::Reader::new(&data[..]))
            .unwrap_err();

        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(err.to_string().starts_with("invalid ground truth record: "));
    }
}

//! Decoding of the strand tokens found in alignment records.
//!
//! Aligners disagree on how to write the strand of an alignment: some emit
//! `+`/`-`, while others emit `0`/`1`. Both encodings are accepted here and
//! decoded into an [`omics::coordinate::Strand`].

use omics::coordinate::Strand;

/// An error related to the decoding of a strand token.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The token is not one of the accepted strand encodings.
    UnknownStrand(String),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnknownStrand(token) => write!(f, "unknown strand: {token}"),
        }
    }
}

impl std::error::Error for Error {}

/// Decodes a strand token.
///
/// `+` and `0` decode to [`Strand::Positive`]; `-` and `1` decode to
/// [`Strand::Negative`].
///
/// # Examples
///
/// ```
/// use omics::coordinate::Strand;
/// use pbove::core::strand;
///
/// assert_eq!(strand::decode("+")?, Strand::Positive);
/// assert_eq!(strand::decode("0")?, Strand::Positive);
/// assert_eq!(strand::decode("-")?, Strand::Negative);
/// assert_eq!(strand::decode("1")?, Strand::Negative);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn decode(token: &str) -> Result<Strand, Error> {
    match token {
        "+" | "0" => Ok(Strand::Positive),
        "-" | "1" => Ok(Strand::Negative),
        token => Err(Error::UnknownStrand(token.to_string())),
    }
}

/// Encodes a strand using the `+`/`-` convention.
pub fn encode(strand: Strand) -> char {
    match strand {
        Strand::Positive => '+',
        Strand::Negative => '-',
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;

    #[test]
    fn test_strand_decode() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(decode("+")?, Strand::Positive);
        assert_eq!(decode("0")?, Strand::Positive);
        assert_eq!(decode("-")?, Strand::Negative);
        assert_eq!(decode("1")?, Strand::Negative);

        let err = decode("?").unwrap_err();
        assert_eq!(err.to_string(), "unknown strand: ?");

        let err = decode("++").unwrap_err();
        assert_eq!(err, Error::UnknownStrand(String::from("++")));

        Ok(())
    }

    #[test]
    fn test_strand_encode() {
        assert_eq!(encode(Strand::Positive), '+');
        assert_eq!(encode(Strand::Negative), '-');
    }
}

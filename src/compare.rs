//! Region-by-region comparison of two sets of alignments.
//!
//! Each set is reduced to the reference regions covered by each query read.
//! The two sets are then compared query by query: how much of the covered
//! reference they share and how much only one of them covers. Either side
//! can serve as the gold standard when deriving sensitivity and the false
//! discovery rate.

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::io;
use std::io::BufRead;
use std::io::Write;

use crate::core::interval::References;
use crate::line::COMMENT_PREFIX;
use crate::reader;
use crate::record::alignment;
use crate::record::AlignmentRecord;

/// The field names of a per-query comparison row, in order.
pub const FIELD_NAMES: [&str; 10] = [
    "qname",
    "q_aln_len_in_1",
    "q_aln_len_in_2",
    "q_aln_intersect_len",
    "q_aln_not_in_1_len",
    "q_aln_not_in_2_len",
    "sensitivity_1_as_gold",
    "fdr_1_as_gold",
    "sensitivity_2_as_gold",
    "fdr_2_as_gold",
];

/// An error related to comparing alignments.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The intersection measured from either side disagrees.
    InvariantViolation {
        /// The query read.
        query: String,
        /// The intersection length measured from the first set.
        first: u64,
        /// The intersection length measured from the second set.
        second: u64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvariantViolation {
                query,
                first,
                second,
            } => write!(
                f,
                "invariant violation: intersection lengths for \"{query}\" disagree \
                 ({first} != {second})"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Formats `numerator / denominator` with five decimals.
///
/// A zero numerator is `"0"` and a zero denominator is `"NA"`.
///
/// # Examples
///
/// ```
/// use pbove::compare::ratio;
///
/// assert_eq!(ratio(1, 3), "0.33333");
/// assert_eq!(ratio(0, 0), "0");
/// assert_eq!(ratio(5, 0), "NA");
/// ```
pub fn ratio(numerator: u64, denominator: u64) -> String {
    if numerator == 0 {
        return String::from("0");
    }

    if denominator == 0 {
        return String::from("NA");
    }

    format!("{:.5}", numerator as f64 / denominator as f64)
}

/// Which alignment set is taken as the gold standard.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Gold {
    /// The first set.
    First,
    /// The second set.
    Second,
}

/// The reference regions covered by each query read.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Alignments(BTreeMap<String, References<String>>);

impl Alignments {
    /// Collects the target spans of alignment records by query name and
    /// target name.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::compare::Alignments;
    /// use pbove::record::AlignmentRecord;
    ///
    /// let records = vec![
    ///     "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254".parse::<AlignmentRecord>()?,
    ///     "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 500 900 10000 254".parse::<AlignmentRecord>()?,
    /// ];
    ///
    /// let alignments = Alignments::from_records(&records);
    /// assert_eq!(alignments.get("m1/1/0_500").unwrap().length(), 800);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a AlignmentRecord>,
    {
        let mut alignments = Self::default();

        for record in records {
            alignments
                .0
                .entry(record.query().name().to_string())
                .or_default()
                .entry(record.target().name().to_string())
                .add(record.absolute_target());
        }

        alignments
    }

    /// Reads every alignment record from `reader` and collects them.
    pub fn try_from_reader<T>(
        reader: &mut reader::Reader<T>,
    ) -> std::result::Result<Self, reader::Error<alignment::ParseError>>
    where
        T: BufRead,
    {
        let records = reader
            .records::<AlignmentRecord>()
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self::from_records(&records))
    }

    /// Gets the regions covered by a query read.
    pub fn get(&self, query: &str) -> Option<&References<String>> {
        self.0.get(query)
    }

    /// Returns the names of the query reads in ascending order.
    pub fn queries(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Returns the number of query reads.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether there are no query reads.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// The covered lengths of two alignment sets.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Lengths {
    /// The length covered by the first set.
    pub first: u64,
    /// The length covered by the second set.
    pub second: u64,
    /// The length covered by both sets.
    pub intersection: u64,
    /// The length covered by the first set only.
    pub first_only: u64,
    /// The length covered by the second set only, counted on the targets the
    /// first set aligns the query to.
    pub second_only: u64,
}

impl Lengths {
    /// Computes the sensitivity against the gold standard.
    pub fn sensitivity(&self, gold: Gold) -> String {
        let missed = match gold {
            Gold::First => self.first_only,
            Gold::Second => self.second_only,
        };

        ratio(self.intersection, self.intersection + missed)
    }

    /// Computes the false discovery rate against the gold standard.
    pub fn false_discovery_rate(&self, gold: Gold) -> String {
        let spurious = match gold {
            Gold::First => self.second_only,
            Gold::Second => self.first_only,
        };

        ratio(spurious, spurious + self.intersection)
    }
}

impl std::ops::AddAssign for Lengths {
    fn add_assign(&mut self, other: Self) {
        self.first += other.first;
        self.second += other.second;
        self.intersection += other.intersection;
        self.first_only += other.first_only;
        self.second_only += other.second_only;
    }
}

/// The comparison of a single query read.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct QueryComparison {
    /// The query read name.
    pub query: String,
    /// The covered lengths.
    pub lengths: Lengths,
}

impl std::fmt::Display for QueryComparison {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let l = &self.lengths;

        write!(
            f,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query,
            l.first,
            l.second,
            l.intersection,
            l.second_only,
            l.first_only,
            l.sensitivity(Gold::First),
            l.false_discovery_rate(Gold::First),
            l.sensitivity(Gold::Second),
            l.false_discovery_rate(Gold::Second),
        )
    }
}

/// The comparison of two alignment sets.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Comparison {
    /// The per-query comparisons in ascending query order.
    queries: Vec<QueryComparison>,
    /// The lengths summed over every query.
    totals: Lengths,
}

impl Comparison {
    /// Returns the per-query comparisons in ascending query order.
    pub fn queries(&self) -> &[QueryComparison] {
        &self.queries
    }

    /// Returns the lengths summed over every query.
    pub fn totals(&self) -> Lengths {
        self.totals
    }

    /// Renders the overall summary, naming the sets `first` and `second`.
    pub fn summary(&self, first: &str, second: &str) -> Vec<String> {
        let t = &self.totals;

        vec![
            format!("Taking {first} as gold standard: "),
            format!("Sensitivity: {}", t.sensitivity(Gold::First)),
            format!("False discovery rate: {}", t.false_discovery_rate(Gold::First)),
            format!("Taking {second} as gold standard: "),
            format!("Sensitivity: {}", t.sensitivity(Gold::Second)),
            format!("False discovery rate: {}", t.false_discovery_rate(Gold::Second)),
            String::from("Comparing total length of intervals in reference:"),
            format!("{}\t{}\t{}", t.first, t.second, ratio(t.second, t.first)),
        ]
    }

    /// Writes the per-query rows followed by the commented summary.
    pub fn write_to<W>(&self, writer: &mut W, first: &str, second: &str) -> io::Result<()>
    where
        W: Write,
    {
        writeln!(writer, "{COMMENT_PREFIX}m4_1:{first}")?;
        writeln!(writer, "{COMMENT_PREFIX}m4_2:{second}")?;
        writeln!(writer, "{COMMENT_PREFIX}{}", FIELD_NAMES.join("\t"))?;

        for query in &self.queries {
            writeln!(writer, "{}", query)?;
        }

        for line in self.summary(first, second) {
            writeln!(writer, "{COMMENT_PREFIX}{line}")?;
        }

        Ok(())
    }
}

/// Compares two alignment sets query by query.
///
/// A query or target present in only one set is treated as covering nothing
/// in the other. The length covered by the second set alone only counts the
/// targets the first set aligns that query to, while the length covered by the
/// first set alone counts every target.
///
/// # Examples
///
/// ```
/// use pbove::compare;
/// use pbove::compare::Alignments;
/// use pbove::compare::Gold;
/// use pbove::record::AlignmentRecord;
///
/// let first = vec!["m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"
///     .parse::<AlignmentRecord>()?];
/// let second = vec!["m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 200 700 10000 254"
///     .parse::<AlignmentRecord>()?];
///
/// let comparison = compare::compare(
///     &Alignments::from_records(&first),
///     &Alignments::from_records(&second),
/// )?;
///
/// let totals = comparison.totals();
/// assert_eq!(totals.intersection, 400);
/// assert_eq!(totals.sensitivity(Gold::First), "0.80000");
/// assert_eq!(totals.false_discovery_rate(Gold::First), "0.20000");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn compare(first: &Alignments, second: &Alignments) -> Result<Comparison> {
    let empty = References::new();
    let queries = first
        .queries()
        .chain(second.queries())
        .collect::<BTreeSet<_>>();

    let mut comparison = Comparison::default();

    for query in queries {
        tracing::debug!("comparing alignments of {query}");

        let a = first.get(query).unwrap_or(&empty);
        let b = second.get(query).unwrap_or(&empty);

        let from_first = a.intersect(b).length();
        let from_second = b.intersect(a).length();

        if from_first != from_second {
            return Err(Error::InvariantViolation {
                query: query.to_string(),
                first: from_first,
                second: from_second,
            });
        }

        let lengths = Lengths {
            first: a.length(),
            second: b.length(),
            intersection: from_first,
            first_only: a.difference(b).length(),
            second_only: a
                .iter()
                .map(|(target, set)| b.get(target).difference(set).length())
                .sum(),
        };

        comparison.totals += lengths;
        comparison.queries.push(QueryComparison {
            query: query.to_string(),
            lengths,
        });
    }

    Ok(comparison)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignments(lines: &[&str]) -> Alignments {
        let records = lines
            .iter()
            .map(|line| line.parse::<AlignmentRecord>().unwrap())
            .collect::<Vec<_>>();

        Alignments::from_records(&records)
    }

    #[test]
    fn test_ratio() {
        assert_eq!(ratio(0, 10), "0");
        assert_eq!(ratio(0, 0), "0");
        assert_eq!(ratio(3, 0), "NA");
        assert_eq!(ratio(2, 3), "0.66667");
        assert_eq!(ratio(10, 10), "1.00000");
    }

    #[test]
    fn test_compare() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let first = alignments(&[
            "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254",
            "m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 0 500 10000 254",
            "m1/3/0_500 chr2 -100 90.0 + 0 500 500 + 0 500 10000 254",
        ]);
        let second = alignments(&[
            "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 200 700 10000 254",
            "m1/2/0_500 chr2 -100 90.0 + 0 500 500 + 0 500 10000 254",
            "m1/4/0_500 chr1 -100 90.0 + 0 500 500 + 0 100 10000 254",
        ]);

        let comparison = compare(&first, &second)?;

        let rows = comparison
            .queries()
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            rows,
            vec![
                "m1/1/0_500\t500\t500\t400\t100\t100\t0.80000\t0.20000\t0.80000\t0.20000",
                "m1/2/0_500\t500\t500\t0\t0\t500\t0\t0\t0\t1.00000",
                "m1/3/0_500\t500\t0\t0\t0\t500\t0\t0\t0\t1.00000",
                "m1/4/0_500\t0\t100\t0\t0\t0\t0\t0\t0\t0",
            ]
        );

        assert_eq!(
            comparison.totals(),
            Lengths {
                first: 1500,
                second: 1100,
                intersection: 400,
                first_only: 1100,
                second_only: 100,
            }
        );

        Ok(())
    }

    #[test]
    fn test_targets_only_in_second_set() -> std::result::Result<(), Box<dyn std::error::Error>>
    {
        let first = alignments(&["m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"]);
        let second = alignments(&[
            "m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254",
            "m1/1/0_500 chr2 -100 90.0 + 0 500 500 + 0 300 10000 254",
            "m1/4/0_500 chr1 -100 90.0 + 0 500 500 + 0 100 10000 254",
        ]);

        let comparison = compare(&first, &second)?;

        let rows = comparison
            .queries()
            .iter()
            .map(|q| q.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            rows,
            vec![
                "m1/1/0_500\t500\t800\t500\t0\t0\t1.00000\t0\t1.00000\t0",
                "m1/4/0_500\t0\t100\t0\t0\t0\t0\t0\t0\t0",
            ]
        );

        assert_eq!(
            comparison.totals(),
            Lengths {
                first: 500,
                second: 900,
                intersection: 500,
                first_only: 0,
                second_only: 0,
            }
        );

        Ok(())
    }

    #[test]
    fn test_write_to() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let first = alignments(&["m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254"]);
        let comparison = compare(&first, &first)?;

        let mut buffer = Vec::new();
        comparison.write_to(&mut buffer, "a.m4", "b.m4")?;
        let output = String::from_utf8(buffer)?;

        assert!(output.starts_with("#m4_1:a.m4\n#m4_2:b.m4\n#qname\t"));
        assert!(output.contains(
            "m1/1/0_500\t500\t500\t500\t0\t0\t1.00000\t0\t1.00000\t0\n"
        ));
        assert!(output.ends_with(
            "#Comparing total length of intervals in reference:\n#500\t500\t1.00000\n"
        ));

        Ok(())
    }
}

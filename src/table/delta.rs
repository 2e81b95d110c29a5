//! Per-bucket tallies of predicted overlaps.

use std::io;
use std::io::Write;

use crate::line::COMMENT_PREFIX;
use crate::record::ScoredRecord;
use crate::table::write_fields;

/// The number of fields in a delta table row.
pub const NUM_FIELDS: usize = 5;

/// The field names of a delta table row, in order.
pub const FIELD_NAMES: [&str; NUM_FIELDS] = [
    "scoreLowerBound",
    "scoreUpperBound",
    "numDeltaTruePositive",
    "numDeltaFalsePositive",
    "numDeltaWeakPositive",
];

/// The granularity that the first bucket's lower bound is aligned to.
const BUCKET_ALIGNMENT: i64 = 100;

/// An error related to building a delta table.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The score step is not positive.
    InvalidStep(i64),
    /// A record's score falls below the current bucket, so the records were
    /// not sorted by ascending score.
    OrderingViolation {
        /// The offending score.
        score: i64,
        /// The lower bound of the current bucket.
        lower_bound: i64,
    },
    /// The bounds of the bucket holding a score cannot be represented.
    BucketOverflow(i64),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidStep(step) => write!(f, "invalid score step: {step}"),
            Error::OrderingViolation { score, lower_bound } => write!(
                f,
                "ordering violation: score {score} is less than the bucket lower bound \
                 {lower_bound}"
            ),
            Error::BucketOverflow(score) => {
                write!(f, "bucket overflow: no bucket can hold score {score}")
            }
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The tallies for records with scores in `[lower_bound, upper_bound)`.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Row {
    /// The inclusive lower bound of the bucket.
    pub lower_bound: i64,
    /// The exclusive upper bound of the bucket.
    pub upper_bound: i64,
    /// Records whose overlap meets the cutoff.
    pub true_positive: u64,
    /// Records with no overlap.
    pub false_positive: u64,
    /// Records that overlap by less than the cutoff.
    pub weak: u64,
}

impl Row {
    /// Returns whether nothing was tallied.
    fn is_empty(&self) -> bool {
        self.true_positive == 0 && self.false_positive == 0 && self.weak == 0
    }
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}\t{}\t{}\t{}\t{}",
            self.lower_bound, self.upper_bound, self.true_positive, self.false_positive, self.weak
        )
    }
}

/// A delta table.
///
/// Buckets where nothing was tallied are omitted.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table(Vec<Row>);

impl Table {
    /// Tallies records sorted by ascending score into buckets of width
    /// `step`.
    ///
    /// The first bucket starts one alignment unit (100) below the minimum
    /// score rounded down to a multiple of 100. Within a bucket, an overlap of
    /// at least `cutoff` is a true positive, an overlap of zero or less is a
    /// false positive and anything else is weak.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::record::ScoredRecord;
    /// use pbove::table::DeltaTable;
    ///
    /// let records = vec![
    ///     ScoredRecord::new("q1", "t1", 10, 300),
    ///     ScoredRecord::new("q2", "t2", 50, 0),
    ///     ScoredRecord::new("q3", "t3", 150, 10),
    /// ];
    ///
    /// let table = DeltaTable::try_new(&records, 100, 200)?;
    /// let rows = table.rows();
    ///
    /// assert_eq!(rows.len(), 2);
    /// assert_eq!(rows[0].to_string(), "0\t100\t1\t1\t0");
    /// assert_eq!(rows[1].to_string(), "100\t200\t0\t0\t1");
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(records: &[ScoredRecord], step: i64, cutoff: i64) -> Result<Self> {
        if step <= 0 {
            return Err(Error::InvalidStep(step));
        }

        let (Some(min), Some(max)) = (
            records.iter().map(ScoredRecord::score).min(),
            records.iter().map(ScoredRecord::score).max(),
        ) else {
            return Ok(Self::default());
        };

        let mut rows = Vec::new();
        let mut cursor = records.iter().peekable();
        let mut lower_bound = min
            .div_euclid(BUCKET_ALIGNMENT)
            .checked_mul(BUCKET_ALIGNMENT)
            .and_then(|bound| bound.checked_sub(BUCKET_ALIGNMENT))
            .ok_or(Error::BucketOverflow(min))?;

        while lower_bound <= max {
            let next = cursor.peek().map_or(max, |record| record.score());
            let upper_bound = lower_bound
                .checked_add(step)
                .ok_or(Error::BucketOverflow(next))?;

            let mut row = Row {
                lower_bound,
                upper_bound,
                true_positive: 0,
                false_positive: 0,
                weak: 0,
            };

            while let Some(record) = cursor.peek() {
                let score = record.score();

                if score < row.lower_bound {
                    return Err(Error::OrderingViolation {
                        score,
                        lower_bound: row.lower_bound,
                    });
                }

                if score >= row.upper_bound {
                    break;
                }

                if record.overlap() >= cutoff {
                    row.true_positive += 1;
                } else if record.overlap() <= 0 {
                    row.false_positive += 1;
                } else {
                    row.weak += 1;
                }

                cursor.next();
            }

            if !row.is_empty() {
                rows.push(row);
            }

            lower_bound = upper_bound;
        }

        tracing::debug!("built delta table with {} rows", rows.len());

        Ok(Self(rows))
    }

    /// Returns the non-empty rows in ascending score order.
    pub fn rows(&self) -> &[Row] {
        &self.0
    }

    /// Writes the table with a commented header line.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
        write!(writer, "{}", COMMENT_PREFIX)?;
        write_fields(writer, FIELD_NAMES)?;

        for row in &self.0 {
            writeln!(writer, "{}", row)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(pairs: &[(i64, i64)]) -> Vec<ScoredRecord> {
        pairs
            .iter()
            .enumerate()
            .map(|(i, &(score, overlap))| {
                ScoredRecord::new(format!("q{i}"), format!("t{i}"), score, overlap)
            })
            .collect()
    }

    #[test]
    fn test_buckets() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = Table::try_new(&records(&[(10, 300), (50, 0), (150, 10)]), 100, 200)?;

        assert_eq!(
            table.rows(),
            &[
                Row {
                    lower_bound: 0,
                    upper_bound: 100,
                    true_positive: 1,
                    false_positive: 1,
                    weak: 0
                },
                Row {
                    lower_bound: 100,
                    upper_bound: 200,
                    true_positive: 0,
                    false_positive: 0,
                    weak: 1
                },
            ]
        );

        Ok(())
    }

    #[test]
    fn test_negative_scores() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = Table::try_new(
            &records(&[(-1050, 500), (-1001, -3), (-20, 199), (-20, 200)]),
            250,
            200,
        )?;

        let rows = table
            .rows()
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>();

        // The first bucket starts 100 below the floored minimum of -1100.
        assert_eq!(rows, vec!["-1200\t-950\t1\t1\t0", "-200\t50\t1\t0\t1"]);

        Ok(())
    }

    #[test]
    fn test_empty_records() -> std::result::Result<(), Box<dyn std::error::Error>> {
        assert!(Table::try_new(&[], 100, 200)?.rows().is_empty());
        Ok(())
    }

    #[test]
    fn test_unsorted_records() {
        let err = Table::try_new(&records(&[(150, 10), (10, 300)]), 100, 200).unwrap_err();
        assert_eq!(
            err,
            Error::OrderingViolation {
                score: 10,
                lower_bound: 100
            }
        );
        assert_eq!(
            err.to_string(),
            "ordering violation: score 10 is less than the bucket lower bound 100"
        );
    }

    #[test]
    fn test_wide_buckets() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let step = i64::MAX - 1000;
        let table = Table::try_new(&records(&[(1000, 0), (2000, 300)]), step, 200)?;

        assert_eq!(
            table.rows(),
            &[Row {
                lower_bound: 900,
                upper_bound: i64::MAX - 100,
                true_positive: 1,
                false_positive: 1,
                weak: 0
            }]
        );

        Ok(())
    }

    #[test]
    fn test_bucket_overflow() {
        let err = Table::try_new(&records(&[(1000, 0)]), i64::MAX, 200).unwrap_err();
        assert_eq!(err, Error::BucketOverflow(1000));
        assert_eq!(
            err.to_string(),
            "bucket overflow: no bucket can hold score 1000"
        );

        let err = Table::try_new(&records(&[(i64::MIN, 0)]), 100, 200).unwrap_err();
        assert_eq!(err, Error::BucketOverflow(i64::MIN));

        let err = Table::try_new(&records(&[(i64::MAX, 0)]), 100, 200).unwrap_err();
        assert_eq!(err, Error::BucketOverflow(i64::MAX));
    }

    #[test]
    fn test_invalid_step() {
        let err = Table::try_new(&records(&[(0, 0)]), 0, 200).unwrap_err();
        assert_eq!(err, Error::InvalidStep(0));
    }

    #[test]
    fn test_write_to() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = Table::try_new(&records(&[(10, 300)]), 100, 200)?;

        let mut buffer = Vec::new();
        table.write_to(&mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "#scoreLowerBound\tscoreUpperBound\tnumDeltaTruePositive\t\
             numDeltaFalsePositive\tnumDeltaWeakPositive\n\
             0\t100\t1\t0\t0\n"
        );

        Ok(())
    }
}

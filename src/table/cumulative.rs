//! Running confusion matrices over ascending score cutoffs.

use std::io;
use std::io::Write;

use crate::classify::Counts;
use crate::table::delta;
use crate::table::write_fields;

/// The number of fields in a cumulative table row.
pub const NUM_FIELDS: usize = 15;

/// The field names of a cumulative table row, in order.
pub const FIELD_NAMES: [&str; NUM_FIELDS] = [
    "ScoreCutoff",
    "numTP",
    "numFP",
    "numFN",
    "numTN",
    "numPW",
    "numNW",
    "numGTPos",
    "numGTNeg",
    "numGTWeak",
    "numPredPos",
    "numPredNeg",
    "numUnmappableAlns",
    "numMappableAlns",
    "numAlns",
];

/// An error related to building a cumulative table.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The predicted or ground truth totals do not add up to the number of
    /// mappable pairs.
    InvariantViolation {
        /// The score cutoff of the offending row.
        score_cutoff: i64,
        /// The sum of the predicted positives and negatives.
        predicted: i64,
        /// The sum of the ground truth positives, negatives and weak pairs.
        ground_truth: i64,
        /// The number of mappable pairs.
        mappable: i64,
    },
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvariantViolation {
                score_cutoff,
                predicted,
                ground_truth,
                mappable,
            } => write!(
                f,
                "invariant violation at score cutoff {score_cutoff}: {predicted} predicted and \
                 {ground_truth} ground truth pairs, expected {mappable} mappable pairs"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// The confusion matrix for predictions scoring below a cutoff.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Row {
    /// The exclusive score cutoff.
    pub score_cutoff: i64,
    /// True positives.
    pub true_positive: i64,
    /// False positives.
    pub false_positive: i64,
    /// False negatives.
    pub false_negative: i64,
    /// True negatives.
    pub true_negative: i64,
    /// Weak pairs predicted to overlap.
    pub weak_positive: i64,
    /// Weak pairs not predicted to overlap.
    pub weak_negative: i64,
    /// Ground truth positives.
    pub ground_truth_positive: i64,
    /// Ground truth negatives.
    pub ground_truth_negative: i64,
    /// Ground truth weak pairs.
    pub ground_truth_weak: i64,
    /// Pairs predicted to overlap.
    pub predicted_positive: i64,
    /// Pairs not predicted to overlap.
    pub predicted_negative: i64,
    /// Pairs where either read is unmappable.
    pub unmappable: i64,
    /// Pairs where both reads are mappable.
    pub mappable: i64,
    /// All pairs.
    pub total: i64,
}

impl std::fmt::Display for Row {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fields = [
            self.score_cutoff,
            self.true_positive,
            self.false_positive,
            self.false_negative,
            self.true_negative,
            self.weak_positive,
            self.weak_negative,
            self.ground_truth_positive,
            self.ground_truth_negative,
            self.ground_truth_weak,
            self.predicted_positive,
            self.predicted_negative,
            self.unmappable,
            self.mappable,
            self.total,
        ];

        let line = fields.map(|field| field.to_string()).join("\t");
        write!(f, "{}", line)
    }
}

/// A cumulative table.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Table(Vec<Row>);

impl Table {
    /// Accumulates the rows of a delta table against the ground truth counts.
    ///
    /// Each output row describes predictions scoring below its cutoff, the
    /// upper bound of the corresponding delta row.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::classify::Counts;
    /// use pbove::record::ScoredRecord;
    /// use pbove::table::CumulativeTable;
    /// use pbove::table::DeltaTable;
    ///
    /// let records = vec![
    ///     ScoredRecord::new("q1", "t1", 10, 300),
    ///     ScoredRecord::new("q2", "t2", 150, 0),
    /// ];
    /// let delta = DeltaTable::try_new(&records, 100, 200)?;
    ///
    /// let counts = Counts {
    ///     positive: 2,
    ///     negative: 7,
    ///     weak: 1,
    ///     unmappable: 2,
    ///     mappable: 10,
    ///     total: 12,
    /// };
    ///
    /// let table = CumulativeTable::try_new(&delta, &counts)?;
    /// let rows = table.rows();
    ///
    /// assert_eq!(rows[0].score_cutoff, 100);
    /// assert_eq!(rows[0].false_negative, 1);
    /// assert_eq!(rows[1].true_negative, 6);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(delta: &delta::Table, counts: &Counts) -> Result<Self> {
        let ground_truth_positive = counts.positive as i64;
        let ground_truth_negative = counts.negative as i64;
        let ground_truth_weak = counts.weak as i64;
        let mappable = counts.mappable as i64;

        let mut rows = Vec::with_capacity(delta.rows().len());
        let (mut true_positive, mut false_positive, mut weak_positive) = (0i64, 0i64, 0i64);

        for delta_row in delta.rows() {
            true_positive += delta_row.true_positive as i64;
            false_positive += delta_row.false_positive as i64;
            weak_positive += delta_row.weak as i64;

            let false_negative = ground_truth_positive - true_positive;
            let true_negative = ground_truth_negative - false_positive;
            let weak_negative = ground_truth_weak - weak_positive;

            let predicted_positive = true_positive + false_positive + weak_positive;
            let predicted_negative = false_negative + true_negative + weak_negative;

            let predicted = predicted_positive + predicted_negative;
            let ground_truth = ground_truth_positive + ground_truth_negative + ground_truth_weak;

            if predicted != mappable || ground_truth != mappable {
                return Err(Error::InvariantViolation {
                    score_cutoff: delta_row.upper_bound,
                    predicted,
                    ground_truth,
                    mappable,
                });
            }

            rows.push(Row {
                score_cutoff: delta_row.upper_bound,
                true_positive,
                false_positive,
                false_negative,
                true_negative,
                weak_positive,
                weak_negative,
                ground_truth_positive,
                ground_truth_negative,
                ground_truth_weak,
                predicted_positive,
                predicted_negative,
                unmappable: counts.unmappable as i64,
                mappable,
                total: counts.total as i64,
            });
        }

        Ok(Self(rows))
    }

    /// Returns the rows in ascending score cutoff order.
    pub fn rows(&self) -> &[Row] {
        &self.0
    }

    /// Writes the table with a header line.
    pub fn write_to<W>(&self, writer: &mut W) -> io::Result<()>
    where
        W: Write,
    {
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
    use crate::record::ScoredRecord;

    fn counts(positive: u64, negative: u64, weak: u64, unmappable: u64) -> Counts {
        Counts {
            positive,
            negative,
            weak,
            unmappable,
            mappable: positive + negative + weak,
            total: positive + negative + weak + unmappable,
        }
    }

    fn delta() -> delta::Table {
        let records = vec![
            ScoredRecord::new("q1", "t1", 10, 300),
            ScoredRecord::new("q2", "t2", 50, 0),
            ScoredRecord::new("q3", "t3", 150, 10),
        ];

        delta::Table::try_new(&records, 100, 200).unwrap()
    }

    #[test]
    fn test_rows_accumulate() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let table = Table::try_new(&delta(), &counts(3, 5, 2, 4))?;

        let rows = table
            .rows()
            .iter()
            .map(|row| row.to_string())
            .collect::<Vec<_>>();

        assert_eq!(
            rows,
            vec![
                "100\t1\t1\t2\t4\t0\t2\t3\t5\t2\t2\t8\t4\t10\t14",
                "200\t1\t1\t2\t4\t1\t1\t3\t5\t2\t3\t7\t4\t10\t14",
            ]
        );

        for row in table.rows() {
            assert_eq!(row.predicted_positive + row.predicted_negative, row.mappable);
        }

        Ok(())
    }

    #[test]
    fn test_inconsistent_totals() {
        let mut inconsistent = counts(3, 5, 2, 4);
        inconsistent.mappable = 11;

        let err = Table::try_new(&delta(), &inconsistent).unwrap_err();
        assert_eq!(
            err,
            Error::InvariantViolation {
                score_cutoff: 100,
                predicted: 10,
                ground_truth: 10,
                mappable: 11
            }
        );
        assert_eq!(
            err.to_string(),
            "invariant violation at score cutoff 100: 10 predicted and 10 ground truth pairs, \
             expected 11 mappable pairs"
        );
    }

    #[test]
    fn test_write_to() -> std::result::Result<(), Box<dyn std::error::Error>> {
        let mut buffer = Vec::new();
        Table::default().write_to(&mut buffer)?;

        assert_eq!(
            String::from_utf8(buffer)?,
            "ScoreCutoff\tnumTP\tnumFP\tnumFN\tnumTN\tnumPW\tnumNW\tnumGTPos\tnumGTNeg\t\
             numGTWeak\tnumPredPos\tnumPredNeg\tnumUnmappableAlns\tnumMappableAlns\tnumAlns\n"
        );

        Ok(())
    }
}

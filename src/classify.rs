//! Ground truth classification of query/target read pairs.
//!
//! Every (query, target) pair of reads falls into exactly one class once both
//! reads have been mapped onto the reference:
//!
//! - **unmappable**, when either read has no location on the reference;
//! - **positive**, when the reads overlap by at least the overlap cutoff;
//! - **weak**, when the reads overlap, but by less than the cutoff;
//! - **negative**, otherwise.
//!
//! Rather than comparing every pair, [`classify_all`] sweeps the sorted target
//! reads once per query read and only looks at targets that can overlap.

use std::collections::HashMap;

use rust_lapper as lapper;

use crate::core::interval::Position;
use crate::ground_truth::Location;
use crate::ground_truth::MappedRead;
use crate::read;

/// An error related to classification.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The mapped reads are not sorted by reference, start and descending
    /// end. The index of the first out of order read is included.
    UnsortedReads(usize),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::UnsortedReads(index) => write!(
                f,
                "mapped reads are not sorted by reference, start and descending end \
                 (first violation at index {index})"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// Computes the overlap of `[s1, e1)` and `[s2, e2)`, or the negated gap
/// between them when they are disjoint.
///
/// Overlapping (or touching) intervals yield the non-negative overlap length.
/// Disjoint intervals yield
/// `-min(|min(s1, e1 - 1) - max(s2, e2 - 1) - 1|, |max(s1, e1 - 1) - min(s2, e2 - 1) - 1|)`.
///
/// # Examples
///
/// ```
/// use pbove::classify::overlap_or_gap;
///
/// assert_eq!(overlap_or_gap(0, 10, 5, 15), 5);
/// assert_eq!(overlap_or_gap(0, 10, 10, 20), 0);
/// assert_eq!(overlap_or_gap(0, 10, 20, 30), -12);
/// ```
pub fn overlap_or_gap(s1: Position, e1: Position, s2: Position, e2: Position) -> i64 {
    let overlap = e1.min(e2) - s1.max(s2);

    if overlap >= 0 {
        return overlap;
    }

    let a = (s1.min(e1 - 1) - s2.max(e2 - 1) - 1).abs();
    let b = (s1.max(e1 - 1) - s2.min(e2 - 1) - 1).abs();

    -a.min(b)
}

/// The ground truth class counts over all query/target pairs.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct Counts {
    /// The number of positive pairs.
    pub positive: u64,
    /// The number of negative pairs.
    pub negative: u64,
    /// The number of weak pairs.
    pub weak: u64,
    /// The number of pairs where either read is unmappable.
    pub unmappable: u64,
    /// The number of pairs where both reads are mappable.
    pub mappable: u64,
    /// The total number of pairs.
    pub total: u64,
}

/// The sort key that [`classify_all`] expects mapped reads to be ordered by.
///
/// Unmapped reads sort first.
pub fn sort_key(read: &MappedRead) -> Option<(&str, Position, std::cmp::Reverse<Position>)> {
    read.location().map(|location| {
        (
            location.reference(),
            location.interval().start(),
            std::cmp::Reverse(location.interval().end()),
        )
    })
}

/// Checks that reads are ordered by [`sort_key`].
fn ensure_sorted(reads: &[MappedRead]) -> Result<()> {
    match reads
        .windows(2)
        .position(|pair| sort_key(&pair[0]) > sort_key(&pair[1]))
    {
        Some(i) => Err(Error::UnsortedReads(i + 1)),
        None => Ok(()),
    }
}

/// Classifies every query/target pair.
///
/// Both lists must be sorted by [`sort_key`]. See
/// [`classify_all_with_progress`] to observe progress.
///
/// # Examples
///
/// ```
/// use pbove::classify;
/// use pbove::core::Interval;
/// use pbove::ground_truth::Location;
/// use pbove::ground_truth::MappedRead;
///
/// let query = vec![MappedRead::new(
///     "m1/1/0_500".parse()?,
///     Some(Location::new("chr1", Interval::try_new(100, 600)?)),
/// )];
/// let target = vec![MappedRead::new(
///     "m1/2/0_500".parse()?,
///     Some(Location::new("chr1", Interval::try_new(550, 1050)?)),
/// )];
///
/// let counts = classify::classify_all(&query, &target, 50)?;
/// assert_eq!(counts.positive, 1);
///
/// let counts = classify::classify_all(&query, &target, 51)?;
/// assert_eq!(counts.weak, 1);
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn classify_all(query: &[MappedRead], target: &[MappedRead], cutoff: i64) -> Result<Counts> {
    classify_all_with_progress(query, target, cutoff, |i, n| {
        if i % 1000 == 0 {
            tracing::debug!("classifying query read {i} / {n}");
        }
    })
}

/// Classifies every query/target pair, calling `progress` with the index of
/// each query read and the number of query reads before it is processed.
pub fn classify_all_with_progress<F>(
    query: &[MappedRead],
    target: &[MappedRead],
    cutoff: i64,
    mut progress: F,
) -> Result<Counts>
where
    F: FnMut(usize, usize),
{
    ensure_sorted(query)?;
    ensure_sorted(target)?;

    let mappable_query = query.iter().filter(|r| r.location().is_some()).count() as u64;
    let mappable_target = target.iter().filter(|r| r.location().is_some()).count() as u64;

    let total = query.len() as u64 * target.len() as u64;
    let mappable = mappable_query * mappable_target;

    let max_target_len = target
        .iter()
        .filter_map(MappedRead::location)
        .map(|location| location.interval().len() as i64)
        .max()
        .unwrap_or(0);

    tracing::debug!("maximum mapped target length: {max_target_len}");

    let mut positive = 0;
    let mut weak = 0;

    for (i, read) in query.iter().enumerate() {
        progress(i, query.len());

        let Some(q) = read.location() else {
            continue;
        };

        let (qs, qe) = (q.interval().start(), q.interval().end());

        // The first target that could overlap the query read.
        let lower = target.partition_point(|t| match t.location() {
            None => true,
            Some(t) => {
                t.reference() < q.reference()
                    || (t.reference() == q.reference()
                        && t.interval().start() + max_target_len < qs)
            }
        });

        for t in target[lower..].iter().filter_map(MappedRead::location) {
            if t.reference() != q.reference() || t.interval().start() > qe {
                break;
            }

            let (ts, te) = (t.interval().start(), t.interval().end());

            if te < qs || qe < ts {
                continue;
            }

            let overlap = overlap_or_gap(qs, qe, ts, te);

            if overlap >= cutoff {
                positive += 1;
            } else if overlap > 0 {
                weak += 1;
            }
        }
    }

    let counts = Counts {
        positive,
        negative: mappable - positive - weak,
        weak,
        unmappable: total - mappable,
        mappable,
        total,
    };

    tracing::info!(
        "ground truth pairs: {} positive, {} negative, {} weak, {} unmappable, {} mappable, {} total",
        counts.positive,
        counts.negative,
        counts.weak,
        counts.unmappable,
        counts.mappable,
        counts.total
    );

    Ok(counts)
}

/// A query/target pair whose mapped locations overlap.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroundTruthOverlap<'a> {
    /// The query read.
    pub query: &'a read::Name,
    /// The target read.
    pub target: &'a read::Name,
    /// The number of overlapping reference positions.
    pub length: i64,
}

impl std::fmt::Display for GroundTruthOverlap<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}\t{}\t{}", self.query, self.target, self.length)
    }
}

/// Lists every query/target pair that overlaps on the reference.
///
/// Pairs are ordered by query read, then by the position of the target read
/// within `target`.
///
/// # Examples
///
/// ```
/// use pbove::classify;
/// use pbove::core::Interval;
/// use pbove::ground_truth::Location;
/// use pbove::ground_truth::MappedRead;
///
/// let query = vec![MappedRead::new(
///     "m1/1/0_500".parse()?,
///     Some(Location::new("chr1", Interval::try_new(100, 600)?)),
/// )];
/// let target = vec![
///     MappedRead::new(
///         "m1/2/0_500".parse()?,
///         Some(Location::new("chr1", Interval::try_new(550, 1050)?)),
///     ),
///     MappedRead::new(
///         "m1/3/0_500".parse()?,
///         Some(Location::new("chr2", Interval::try_new(100, 600)?)),
///     ),
/// ];
///
/// let overlaps = classify::ground_truth_overlaps(&query, &target);
/// assert_eq!(overlaps.len(), 1);
/// assert_eq!(overlaps[0].to_string(), "m1/1/0_500\tm1/2/0_500\t50");
///
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn ground_truth_overlaps<'a>(
    query: &'a [MappedRead],
    target: &'a [MappedRead],
) -> Vec<GroundTruthOverlap<'a>> {
    // Lapper requires unsigned coordinates.
    let offset = query
        .iter()
        .chain(target.iter())
        .filter_map(MappedRead::location)
        .map(|location| location.interval().start())
        .min()
        .unwrap_or(0);

    let shift = |position: Position| (position - offset) as u64;

    let mut by_reference = HashMap::<&str, Vec<lapper::Interval<u64, usize>>>::new();

    for (index, read) in target.iter().enumerate() {
        if let Some(location) = read.location() {
            by_reference
                .entry(location.reference())
                .or_default()
                .push(lapper::Interval {
                    start: shift(location.interval().start()),
                    stop: shift(location.interval().end()),
                    val: index,
                });
        }
    }

    let lappers = by_reference
        .into_iter()
        .map(|(reference, intervals)| (reference, lapper::Lapper::new(intervals)))
        .collect::<HashMap<_, _>>();

    let mut overlaps = Vec::new();

    for read in query {
        let Some(q) = read.location() else {
            continue;
        };

        let Some(lapper) = lappers.get(q.reference()) else {
            continue;
        };

        let mut hits = lapper
            .find(shift(q.interval().start()), shift(q.interval().end()))
            .map(|iv| iv.val)
            .collect::<Vec<_>>();
        hits.sort_unstable();

        for index in hits {
            let t = &target[index];

            if let Some(length) = t.location().map(|location| overlap_length(q, location)) {
                if length > 0 {
                    overlaps.push(GroundTruthOverlap {
                        query: read.read(),
                        target: t.read(),
                        length,
                    });
                }
            }
        }
    }

    overlaps
}

/// Counts the reference positions shared by two locations.
fn overlap_length(a: &Location, b: &Location) -> i64 {
    let start = a.interval().start().max(b.interval().start());
    let end = a.interval().end().min(b.interval().end());
    (end - start).max(0)
}

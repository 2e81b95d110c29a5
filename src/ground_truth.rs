//! Ground truth locations of reads on a reference.
//!
//! The ground truth is a set of alignments of subreads directly to the
//! reference. Looking up a read (by movie and hole) yields every alignment of
//! that read; the alignment whose query span best matches the requested
//! window is then used to project the window onto the reference.

pub mod builder;

use rayon::prelude::*;

pub use builder::Builder;

use crate::classify;
use crate::core::interval::Position;
use crate::core::Interval;
use crate::read;
use crate::record::alignment;
use crate::record::AlignmentRecord;

/// The overlap reported for two reads that cannot be compared, either
/// because one of them is unmappable or because they map to different
/// references.
pub const INCOMPARABLE: i64 = -i64::MAX;

/// An error related to the ground truth.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// Mapping through an alignment produced an invalid interval.
    Mapping(alignment::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Mapping(err) => write!(f, "mapping error: {}", err),
        }
    }
}

impl std::error::Error for Error {}

/// A [`Result`](std::result::Result) with an [`Error`].
type Result<T> = std::result::Result<T, Error>;

/// A location on the reference.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Location {
    /// The reference name.
    reference: String,
    /// The interval on the reference.
    interval: Interval,
}

impl Location {
    /// Creates a new location.
    pub fn new(reference: impl Into<String>, interval: Interval) -> Self {
        Self {
            reference: reference.into(),
            interval,
        }
    }

    /// Returns the reference name.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Returns the interval on the reference.
    pub fn interval(&self) -> Interval {
        self.interval
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.reference, self.interval)
    }
}

/// A read and its location on the reference, if it has one.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MappedRead {
    /// The read.
    read: read::Name,
    /// The location of the read.
    location: Option<Location>,
}

impl MappedRead {
    /// Creates a new mapped read.
    pub fn new(read: read::Name, location: Option<Location>) -> Self {
        Self { read, location }
    }

    /// Returns the read.
    pub fn read(&self) -> &read::Name {
        &self.read
    }

    /// Returns the location of the read, or [`None`] if it is unmappable.
    pub fn location(&self) -> Option<&Location> {
        self.location.as_ref()
    }
}

/// A window of a read, addressed by movie and hole.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Window<'a> {
    /// The movie.
    pub movie: &'a str,
    /// The hole number.
    pub hole: u64,
    /// The start of the window within the full-length read.
    pub start: Position,
    /// The end of the window within the full-length read.
    pub end: Position,
}

impl<'a> Window<'a> {
    /// Creates a window spanning `[start, end)` of a read.
    pub fn new(movie: &'a str, hole: u64, start: Position, end: Position) -> Self {
        Self {
            movie,
            hole,
            start,
            end,
        }
    }

    /// Creates the window named by a read identity, or [`None`] for a
    /// full-length read.
    pub fn of(name: &'a read::Name) -> Option<Self> {
        name.window()
            .map(|(start, end)| Self::new(name.movie(), name.hole(), start, end))
    }
}

/// An index of ground truth alignments.
///
/// Records are sorted by query movie, query hole and absolute query start.
/// Generally, you will want to use a [`Builder`] to construct one of these.
#[derive(Debug)]
pub struct GroundTruth {
    /// The sorted alignment records.
    records: Vec<AlignmentRecord>,
}

/// The movie and hole that records are grouped by.
fn key(record: &AlignmentRecord) -> (&str, u64) {
    (record.query_read().movie(), record.query_read().hole())
}

impl GroundTruth {
    /// Creates a ground truth index from alignment records in any order.
    pub fn from_records(mut records: Vec<AlignmentRecord>) -> Self {
        records.sort_by(|a, b| {
            key(a)
                .cmp(&key(b))
                .then(a.absolute_query().start().cmp(&b.absolute_query().start()))
        });

        Self { records }
    }

    /// Returns the sorted alignment records.
    pub fn records(&self) -> &[AlignmentRecord] {
        &self.records
    }

    /// Returns the number of alignment records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns whether there are no alignment records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Finds every alignment of the read with the given movie and hole.
    ///
    /// The alignments are returned in ascending order of absolute query
    /// start.
    ///
    /// # Examples
    ///
    /// ```
    /// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
    ///              m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 550 1050 10000 254\n\
    ///              m1/1/600_900 chr2 -100 90.0 + 600 900 900 + 0 300 10000 254\n";
    /// let reader = pbove::Reader::new(&data[..]);
    /// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
    ///
    /// assert_eq!(ground_truth.search("m1", 1).len(), 2);
    /// assert_eq!(ground_truth.search("m1", 2).len(), 1);
    /// assert!(ground_truth.search("m1", 3).is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn search(&self, movie: &str, hole: u64) -> &[AlignmentRecord] {
        let lower = self.records.partition_point(|r| key(r) < (movie, hole));
        let upper = self.records.partition_point(|r| key(r) <= (movie, hole));
        &self.records[lower..upper]
    }

    /// Selects the candidate whose absolute query span lies closest to
    /// `[start, end)`.
    ///
    /// Overlapping spans are preferred by overlap length, disjoint spans by
    /// the smallest gap. Ties go to the earliest candidate.
    pub fn select_best(
        candidates: &[AlignmentRecord],
        start: Position,
        end: Position,
    ) -> Option<&AlignmentRecord> {
        let mut best = None;
        let mut min_distance = i64::MAX;

        for candidate in candidates {
            let query = candidate.absolute_query();
            let distance = -classify::overlap_or_gap(query.start(), query.end(), start, end);

            if distance < min_distance {
                min_distance = distance;
                best = Some(candidate);
            }
        }

        best
    }

    /// Maps a window of a read onto the reference.
    ///
    /// Returns `Ok(None)` when the read has no ground truth alignment or the
    /// window does not map through the best alignment.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    /// use pbove::ground_truth::Window;
    ///
    /// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n";
    /// let reader = pbove::Reader::new(&data[..]);
    /// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
    ///
    /// let location = ground_truth
    ///     .map_window(Window::new("m1", 1, 100, 200), false)?
    ///     .unwrap();
    /// assert_eq!(location.reference(), "chr1");
    /// assert_eq!(location.interval(), Interval::try_new(200, 300)?);
    ///
    /// assert!(ground_truth
    ///     .map_window(Window::new("m1", 2, 100, 200), false)?
    ///     .is_none());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn map_window(&self, window: Window<'_>, infer: bool) -> Result<Option<Location>> {
        let candidates = self.search(window.movie, window.hole);

        let Some(best) = Self::select_best(candidates, window.start, window.end) else {
            return Ok(None);
        };

        let interval = best
            .map_interval(window.start, window.end, infer)
            .map_err(Error::Mapping)?;

        Ok(interval.map(|interval| Location::new(best.target().name(), interval)))
    }

    /// Maps the window named by a read identity onto the reference.
    ///
    /// Full-length reads name no window and never map.
    pub fn map_read(&self, name: &read::Name, infer: bool) -> Result<Option<Location>> {
        match Window::of(name) {
            Some(window) => self.map_window(window, infer),
            None => Ok(None),
        }
    }

    /// Returns whether the window named by a read identity maps onto the
    /// reference.
    pub fn is_mappable(&self, name: &read::Name, infer: bool) -> Result<bool> {
        Ok(self.map_read(name, infer)?.is_some())
    }

    /// Computes the overlap (or negated gap) between two windows once mapped
    /// onto the reference.
    ///
    /// Returns [`INCOMPARABLE`] if either window does not map or the two
    /// windows map to different references.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::ground_truth::Window;
    /// use pbove::ground_truth::INCOMPARABLE;
    ///
    /// let data = b"m1/1/0_500 chr1 -100 90.0 + 0 500 500 + 100 600 10000 254\n\
    ///              m1/2/0_500 chr1 -100 90.0 + 0 500 500 + 550 1050 10000 254\n\
    ///              m1/3/0_500 chr2 -100 90.0 + 0 500 500 + 550 1050 10000 254\n";
    /// let reader = pbove::Reader::new(&data[..]);
    /// let ground_truth = pbove::ground_truth::Builder::default().try_build_from(reader)?;
    ///
    /// let a = Window::new("m1", 1, 0, 500);
    /// let b = Window::new("m1", 2, 0, 500);
    /// let c = Window::new("m1", 3, 0, 500);
    ///
    /// assert_eq!(ground_truth.overlap_length(a, b, false)?, 50);
    /// assert_eq!(ground_truth.overlap_length(a, c, false)?, INCOMPARABLE);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn overlap_length(&self, first: Window<'_>, second: Window<'_>, infer: bool) -> Result<i64> {
        let Some(a) = self.map_window(first, infer)? else {
            return Ok(INCOMPARABLE);
        };

        let Some(b) = self.map_window(second, infer)? else {
            return Ok(INCOMPARABLE);
        };

        if a.reference() != b.reference() {
            return Ok(INCOMPARABLE);
        }

        Ok(classify::overlap_or_gap(
            a.interval().start(),
            a.interval().end(),
            b.interval().start(),
            b.interval().end(),
        ))
    }

    /// Maps every read onto the reference and sorts the results by
    /// [`classify::sort_key`], with unmappable reads first.
    ///
    /// Reads are mapped in parallel; the result does not depend on the
    /// number of threads.
    pub fn map_reads(&self, reads: &[read::Name], infer: bool) -> Result<Vec<MappedRead>> {
        let mut mapped = reads
            .par_iter()
            .map(|read| {
                self.map_read(read, infer)
                    .map(|location| MappedRead::new(read.clone(), location))
            })
            .collect::<Result<Vec<_>>>()?;

        mapped.sort_by(|a, b| classify::sort_key(a).cmp(&classify::sort_key(b)));

        tracing::debug!(
            "mapped {} of {} reads onto the reference",
            mapped.iter().filter(|m| m.location().is_some()).count(),
            mapped.len()
        );

        Ok(mapped)
    }
}

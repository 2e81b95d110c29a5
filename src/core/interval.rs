//! A 0-based, half-open interval of discrete positions.
//!
//! An interval `[start, end)` contains the integers `start`, `start + 1`, ...,
//! `end - 1`. The end must never be less than the start; an interval whose
//! start equals its end contains no positions and is considered empty.
//!
//! ```text
//! | 0 | 1 | 2 | 3 | 4 | 5 | 6 | 7 | 8 |
//! -------------------------------------
//! |   |   | X | X | X | X | O |   |   |  <= [2, 6)
//! ```
//!
//! Intervals are the building block of two collections:
//!
//! - [`Set`], an ordered collection of disjoint, merged intervals supporting
//!   set algebra.
//! - [`References`], a [`Set`] per reference key.

pub mod references;
pub mod set;

pub use references::References;
pub use set::Set;

/// A position within an interval.
pub type Position = i64;

/// An error related to an interval.
#[derive(Debug, Eq, PartialEq)]
pub enum Error {
    /// The end position is less than the start position.
    InvalidInterval(Position, Position),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidInterval(start, end) => write!(
                f,
                "invalid interval: end position ({end}) is less than start position ({start})"
            ),
        }
    }
}

impl std::error::Error for Error {}

/// A half-open interval `[start, end)`.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct Interval {
    /// The start position (inclusive).
    start: Position,

    /// The end position (exclusive).
    end: Position,
}

impl Interval {
    /// Attempts to create a new [`Interval`].
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    ///
    /// let interval = Interval::try_new(10, 20)?;
    /// assert_eq!(interval.start(), 10);
    /// assert_eq!(interval.end(), 20);
    ///
    /// assert!(Interval::try_new(20, 10).is_err());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_new(start: Position, end: Position) -> Result<Self, Error> {
        if end < start {
            return Err(Error::InvalidInterval(start, end));
        }

        Ok(Self { start, end })
    }

    /// Creates the empty interval `[0, 0)`.
    pub const fn empty() -> Self {
        Self { start: 0, end: 0 }
    }

    /// Gets the start position.
    pub fn start(&self) -> Position {
        self.start
    }

    /// Gets the end position.
    pub fn end(&self) -> Position {
        self.end
    }

    /// Gets the number of positions contained within the interval.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    ///
    /// assert_eq!(Interval::try_new(10, 20)?.len(), 10);
    /// assert_eq!(Interval::try_new(10, 10)?.len(), 0);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn len(&self) -> u64 {
        self.end.abs_diff(self.start)
    }

    /// Returns whether the interval contains no positions.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Returns whether the two intervals share at least one position.
    ///
    /// Empty intervals never intersect anything.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    ///
    /// let a = Interval::try_new(0, 10)?;
    ///
    /// assert!(a.intersects(&Interval::try_new(5, 15)?));
    /// assert!(!a.intersects(&Interval::try_new(10, 15)?));
    /// assert!(!a.intersects(&Interval::try_new(5, 5)?));
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn intersects(&self, other: &Interval) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        !(self.start >= other.end || self.end <= other.start)
    }

    /// Computes the intersection of two intervals.
    ///
    /// If the intervals do not intersect, the empty interval is returned.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::Interval;
    ///
    /// let a = Interval::try_new(0, 10)?;
    /// let b = Interval::try_new(5, 15)?;
    /// assert_eq!(a.intersect(&b), Interval::try_new(5, 10)?);
    ///
    /// let c = Interval::try_new(20, 30)?;
    /// assert!(a.intersect(&c).is_empty());
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn intersect(&self, other: &Interval) -> Interval {
        if self.intersects(other) {
            Interval {
                start: self.start.max(other.start),
                end: self.end.min(other.end),
            }
        } else {
            Interval::empty()
        }
    }

    /// Returns whether every position of `self` is contained in `other`.
    ///
    /// The empty interval is a sub-interval of every interval.
    pub fn is_subinterval_of(&self, other: &Interval) -> bool {
        if self.is_empty() {
            return true;
        }

        self.start >= other.start && self.end <= other.end
    }

    /// Returns whether every position of `other` is contained in `self`.
    ///
    /// Every interval is a super-interval of the empty interval.
    pub fn is_superinterval_of(&self, other: &Interval) -> bool {
        if other.is_empty() {
            return true;
        }

        self.start <= other.start && self.end >= other.end
    }
}

impl TryFrom<(Position, Position)> for Interval {
    type Error = Error;

    fn try_from((start, end): (Position, Position)) -> Result<Self, Self::Error> {
        Interval::try_new(start, end)
    }
}

impl std::fmt::Display for Interval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "[,)");
        }

        write!(f, "[{}, {})", self.start, self.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_and_invalid_intervals() {
        assert!(Interval::try_new(0, 0).is_ok());
        assert!(Interval::try_new(-10, 0).is_ok());

        let err = Interval::try_new(10, 9).unwrap_err();
        assert_eq!(err, Error::InvalidInterval(10, 9));
        assert_eq!(
            err.to_string(),
            "invalid interval: end position (9) is less than start position (10)"
        );
    }

    #[test]
    fn test_emptiness() -> Result<(), Box<dyn std::error::Error>> {
        assert!(Interval::try_new(5, 5)?.is_empty());
        assert!(!Interval::try_new(5, 6)?.is_empty());
        assert_eq!(Interval::try_new(5, 6)?.len(), 1);
        Ok(())
    }

    #[test]
    fn test_sub_and_super_intervals() -> Result<(), Box<dyn std::error::Error>> {
        let outer = Interval::try_new(0, 100)?;
        let inner = Interval::try_new(10, 20)?;
        let empty = Interval::try_new(500, 500)?;

        assert!(inner.is_subinterval_of(&outer));
        assert!(!outer.is_subinterval_of(&inner));
        assert!(outer.is_superinterval_of(&inner));
        assert!(empty.is_subinterval_of(&inner));
        assert!(inner.is_superinterval_of(&empty));
        assert!(outer.is_subinterval_of(&outer));

        Ok(())
    }

    #[test]
    fn test_display() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(Interval::try_new(1, 10)?.to_string(), "[1, 10)");
        assert_eq!(Interval::empty().to_string(), "[,)");
        Ok(())
    }
}

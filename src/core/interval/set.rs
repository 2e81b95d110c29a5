//! An ordered collection of disjoint, merged intervals.

use crate::core::interval::Error;
use crate::core::interval::Position;
use crate::core::Interval;

/// An ordered collection of disjoint intervals.
///
/// Intervals are kept sorted by start position. No two stored intervals ever
/// overlap or touch: intervals that do are merged eagerly when they are added.
/// Empty intervals are never stored.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Set(Vec<Interval>);

impl Set {
    /// Creates an empty [`Set`].
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Attempts to create a [`Set`] from `(start, end)` pairs.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::Set;
    ///
    /// let set = Set::try_from_pairs([(1, 100), (200, 300), (500, 900), (1, 10000)])?;
    /// assert_eq!(set.to_pairs(), vec![(1, 10000)]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (Position, Position)>,
    {
        let mut set = Set::new();

        for pair in pairs {
            set.add(Interval::try_from(pair)?);
        }

        Ok(set)
    }

    /// Gets the stored intervals in ascending order.
    pub fn intervals(&self) -> &[Interval] {
        &self.0
    }

    /// Converts the stored intervals into `(start, end)` pairs.
    pub fn to_pairs(&self) -> Vec<(Position, Position)> {
        self.0.iter().map(|iv| (iv.start(), iv.end())).collect()
    }

    /// Returns whether the set contains no intervals.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the total number of positions covered by the set.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::Set;
    ///
    /// let set = Set::try_from_pairs([(0, 10), (20, 25)])?;
    /// assert_eq!(set.length(), 15);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn length(&self) -> u64 {
        self.0.iter().map(Interval::len).sum()
    }

    /// Adds an interval to the set.
    ///
    /// Every stored interval that overlaps or touches `interval` is absorbed
    /// into a single merged interval, which may span many previously stored
    /// intervals.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::Set;
    /// use pbove::core::Interval;
    ///
    /// let mut set = Set::try_from_pairs([(0, 10), (20, 30), (40, 50)])?;
    /// set.add(Interval::try_new(10, 40)?);
    ///
    /// assert_eq!(set.to_pairs(), vec![(0, 50)]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn add(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }

        // `first..last` spans every stored interval touching `interval`.
        let first = self.0.partition_point(|iv| iv.end() < interval.start());
        let last = self.0.partition_point(|iv| iv.start() <= interval.end());

        if first == last {
            self.0.insert(first, interval);
            return;
        }

        let start = interval.start().min(self.0[first].start());
        let end = interval.end().max(self.0[last - 1].end());

        self.0.splice(first..last, [Interval { start, end }]);
    }

    /// Removes every position within `interval` from the set.
    ///
    /// Stored intervals that are fully covered are deleted, intervals that
    /// strictly contain `interval` are split in two, and partially covered
    /// intervals are truncated.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::Set;
    /// use pbove::core::Interval;
    ///
    /// let mut set = Set::try_from_pairs([(1, 10000)])?;
    ///
    /// set.remove(Interval::try_new(500, 900)?);
    /// assert_eq!(set.to_pairs(), vec![(1, 500), (900, 10000)]);
    ///
    /// set.remove(Interval::try_new(-1000, 300)?);
    /// assert_eq!(set.to_pairs(), vec![(300, 500), (900, 10000)]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn remove(&mut self, interval: Interval) {
        if interval.is_empty() {
            return;
        }

        // `first..last` spans every stored interval intersecting `interval`.
        let first = self.0.partition_point(|iv| iv.end() <= interval.start());
        let last = self.0.partition_point(|iv| iv.start() < interval.end());

        if first >= last {
            return;
        }

        let mut remainder = Vec::with_capacity(2);

        for iv in &self.0[first..last] {
            if iv.start() < interval.start() {
                remainder.push(Interval {
                    start: iv.start(),
                    end: interval.start(),
                });
            }

            if interval.end() < iv.end() {
                remainder.push(Interval {
                    start: interval.end(),
                    end: iv.end(),
                });
            }
        }

        self.0.splice(first..last, remainder);
    }

    /// Computes the intersection of two sets.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::Set;
    ///
    /// let a = Set::try_from_pairs([(0, 10), (20, 30)])?;
    /// let b = Set::try_from_pairs([(5, 25)])?;
    ///
    /// assert_eq!(a.intersect(&b).to_pairs(), vec![(5, 10), (20, 25)]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn intersect(&self, other: &Set) -> Set {
        let mut result = Set::new();
        let (mut i, mut j) = (0, 0);

        while i < self.0.len() && j < other.0.len() {
            let a = &self.0[i];
            let b = &other.0[j];

            if a.intersects(b) {
                result.add(a.intersect(b));
            }

            match a.end().cmp(&b.end()) {
                std::cmp::Ordering::Less => i += 1,
                std::cmp::Ordering::Greater => j += 1,
                std::cmp::Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }

        result
    }

    /// Computes the union of two sets.
    pub fn union(&self, other: &Set) -> Set {
        let mut result = self.clone();

        for iv in other.intervals() {
            result.add(*iv);
        }

        result
    }

    /// Computes the positions in `self` that are not in `other`.
    pub fn difference(&self, other: &Set) -> Set {
        let mut result = self.clone();

        for iv in other.intervals() {
            result.remove(*iv);
        }

        result
    }
}

impl FromIterator<Interval> for Set {
    fn from_iter<T: IntoIterator<Item = Interval>>(iter: T) -> Self {
        let mut set = Set::new();

        for iv in iter {
            set.add(iv);
        }

        set
    }
}

impl std::fmt::Display for Set {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts = self.0.iter().map(|iv| iv.to_string()).collect::<Vec<_>>();
        write!(f, "{}", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use super::*;

    fn set(pairs: &[(Position, Position)]) -> Set {
        Set::try_from_pairs(pairs.iter().copied()).unwrap()
    }

    #[test]
    fn test_merge_chain() {
        let a = set(&[(1, 100), (200, 300), (500, 900), (1, 10000)]);
        assert_eq!(a.to_pairs(), vec![(1, 10000)]);

        let b = set(&[(1, 10000), (200, 300), (1, 100), (500, 900)]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_add_touching_intervals_merge() {
        let a = set(&[(0, 5), (5, 10)]);
        assert_eq!(a.to_pairs(), vec![(0, 10)]);

        let b = set(&[(20, 30), (0, 5), (10, 15)]);
        assert_eq!(b.to_pairs(), vec![(0, 5), (10, 15), (20, 30)]);

        let mut c = b.clone();
        c.add(Interval::try_new(5, 10).unwrap());
        assert_eq!(c.to_pairs(), vec![(0, 15), (20, 30)]);

        let mut d = b.clone();
        d.add(Interval::try_new(12, 25).unwrap());
        assert_eq!(d.to_pairs(), vec![(0, 5), (10, 30)]);
    }

    #[test]
    fn test_add_ignores_empty_intervals() {
        let a = set(&[(5, 5)]);
        assert!(a.is_empty());
        assert_eq!(a.length(), 0);
    }

    #[test]
    fn test_add_is_order_independent() {
        let pairs = vec![
            (1, 100),
            (200, 300),
            (250, 260),
            (299, 450),
            (500, 900),
            (901, 950),
            (950, 1000),
            (-50, 2),
            (2000, 2001),
            (1500, 2000),
        ];

        let expected = set(&pairs);
        let mut rng = StdRng::seed_from_u64(42);

        for _ in 0..100 {
            let mut shuffled = pairs.clone();
            shuffled.shuffle(&mut rng);
            assert_eq!(set(&shuffled), expected);
        }

        assert_eq!(
            expected.to_pairs(),
            vec![(-50, 100), (200, 450), (500, 900), (901, 1000), (1500, 2001)]
        );
    }

    #[test]
    fn test_remove() {
        let a = set(&[(1, 10000)]);

        let b = a.difference(&set(&[(500, 900)]));
        assert_eq!(b.to_pairs(), vec![(1, 500), (900, 10000)]);

        let c = b.difference(&set(&[(-1000, 300)]));
        assert_eq!(c.to_pairs(), vec![(300, 500), (900, 10000)]);

        let d = a.difference(&set(&[(500, 900), (-1000, 300), (450, 1000)]));
        assert_eq!(d.to_pairs(), vec![(300, 450), (1000, 10000)]);
    }

    #[test]
    fn test_remove_spanning_many_intervals() {
        let mut a = set(&[(0, 10), (20, 30), (40, 50), (60, 70)]);
        a.remove(Interval::try_new(5, 65).unwrap());
        assert_eq!(a.to_pairs(), vec![(0, 5), (65, 70)]);

        let mut b = set(&[(0, 10), (20, 30)]);
        b.remove(Interval::try_new(0, 30).unwrap());
        assert!(b.is_empty());

        let mut c = set(&[(0, 10)]);
        c.remove(Interval::try_new(0, 4).unwrap());
        c.remove(Interval::try_new(8, 10).unwrap());
        c.remove(Interval::try_new(5, 5).unwrap());
        assert_eq!(c.to_pairs(), vec![(4, 8)]);
    }

    #[test]
    fn test_intersect() {
        let a = set(&[(0, 10), (20, 30), (40, 50)]);
        let b = set(&[(5, 25), (30, 45), (100, 200)]);

        let ab = a.intersect(&b);
        let ba = b.intersect(&a);

        assert_eq!(ab, ba);
        assert_eq!(ab.to_pairs(), vec![(5, 10), (20, 25), (40, 45)]);
        assert!(ab.length() <= a.length().min(b.length()));

        assert!(a.intersect(&Set::new()).is_empty());
    }

    #[test]
    fn test_union() {
        let a = set(&[(0, 10)]);
        let b = set(&[(10, 20), (30, 40)]);
        assert_eq!(a.union(&b).to_pairs(), vec![(0, 20), (30, 40)]);
    }

    #[test]
    fn test_invalid_pair() {
        let err = Set::try_from_pairs([(0, 10), (10, 5)]).unwrap_err();
        assert_eq!(err, Error::InvalidInterval(10, 5));
    }

    #[test]
    fn test_display() {
        assert_eq!(set(&[(0, 10), (20, 30)]).to_string(), "[0, 10),[20, 30)");
    }
}

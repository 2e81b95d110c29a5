//! Interval sets keyed by reference.

use std::collections::btree_map;
use std::collections::BTreeMap;

use crate::core::interval::Set;

/// The set returned for references that hold no intervals.
static EMPTY: Set = Set::new();

/// A mapping from a reference key to the [`Set`] of intervals on it.
///
/// Accessing a missing key through [`References::get`] yields an empty set
/// without inserting it. Mutable access through [`References::entry`] inserts
/// an empty set first.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct References<K: Ord>(BTreeMap<K, Set>);

impl<K: Ord> Default for References<K> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<K: Ord> References<K> {
    /// Creates an empty [`References`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Gets the set of intervals for a key.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::References;
    /// use pbove::core::Interval;
    ///
    /// let mut references = References::new();
    /// references.entry("chr1").add(Interval::try_new(0, 10)?);
    ///
    /// assert_eq!(references.get(&"chr1").length(), 10);
    /// assert!(references.get(&"chr2").is_empty());
    /// assert_eq!(references.len(), 1);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn get(&self, key: &K) -> &Set {
        self.0.get(key).unwrap_or(&EMPTY)
    }

    /// Gets a mutable reference to the set for a key, inserting an empty set
    /// if none exists.
    pub fn entry(&mut self, key: K) -> &mut Set {
        self.0.entry(key).or_default()
    }

    /// Replaces the set stored for a key.
    pub fn insert(&mut self, key: K, set: Set) -> Option<Set> {
        self.0.insert(key, set)
    }

    /// Gets the number of keys present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether no keys are present.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Gets the keys in ascending order.
    pub fn keys(&self) -> btree_map::Keys<'_, K, Set> {
        self.0.keys()
    }

    /// Iterates over the keys and their sets in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, K, Set> {
        self.0.iter()
    }

    /// Gets the total number of positions covered across every key.
    pub fn length(&self) -> u64 {
        self.0.values().map(Set::length).sum()
    }
}

impl<K: Ord + Clone> References<K> {
    /// Intersects the sets of every key present in both collections.
    ///
    /// Keys whose intersection is empty are not included in the result.
    ///
    /// # Examples
    ///
    /// ```
    /// use pbove::core::interval::References;
    /// use pbove::core::interval::Set;
    ///
    /// let mut a = References::new();
    /// a.insert("r1", Set::try_from_pairs([(0, 100)])?);
    /// a.insert("r2", Set::try_from_pairs([(0, 100)])?);
    ///
    /// let mut b = References::new();
    /// b.insert("r1", Set::try_from_pairs([(50, 150)])?);
    ///
    /// let c = a.intersect(&b);
    /// assert_eq!(c.length(), 50);
    /// assert_eq!(c.keys().collect::<Vec<_>>(), vec![&"r1"]);
    ///
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn intersect(&self, other: &References<K>) -> References<K> {
        let mut result = References::new();

        for (key, set) in self.iter() {
            let intersection = set.intersect(other.get(key));

            if !intersection.is_empty() {
                result.insert(key.clone(), intersection);
            }
        }

        result
    }

    /// Removes the intervals in `other` from each key of `self`.
    ///
    /// Keys whose remaining set is empty are not included in the result.
    pub fn difference(&self, other: &References<K>) -> References<K> {
        let mut result = References::new();

        for (key, set) in self.iter() {
            let remainder = set.difference(other.get(key));

            if !remainder.is_empty() {
                result.insert(key.clone(), remainder);
            }
        }

        result
    }
}

impl<'a, K: Ord> IntoIterator for &'a References<K> {
    type Item = (&'a K, &'a Set);
    type IntoIter = btree_map::Iter<'a, K, Set>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Interval;

    #[test]
    fn test_missing_keys_are_empty_and_not_inserted() {
        let references = References::<String>::new();
        assert!(references.get(&String::from("chr1")).is_empty());
        assert!(references.is_empty());
    }

    #[test]
    fn test_entry_auto_vivifies() -> Result<(), Box<dyn std::error::Error>> {
        let mut references = References::new();
        references.entry("chr1");
        assert_eq!(references.len(), 1);
        assert!(references.get(&"chr1").is_empty());

        references.entry("chr1").add(Interval::try_new(0, 10)?);
        references.entry("chr1").add(Interval::try_new(5, 20)?);
        assert_eq!(references.get(&"chr1").to_pairs(), vec![(0, 20)]);

        Ok(())
    }

    #[test]
    fn test_intersect_and_difference() -> Result<(), Box<dyn std::error::Error>> {
        let mut a = References::new();
        a.insert("q1", Set::try_from_pairs([(0, 100), (200, 300)])?);
        a.insert("q2", Set::try_from_pairs([(0, 10)])?);

        let mut b = References::new();
        b.insert("q1", Set::try_from_pairs([(50, 250)])?);
        b.insert("q3", Set::try_from_pairs([(0, 10)])?);

        let both = a.intersect(&b);
        assert_eq!(both.get(&"q1").to_pairs(), vec![(50, 100), (200, 250)]);
        assert_eq!(both.len(), 1);
        assert_eq!(both.length(), 100);
        assert_eq!(b.intersect(&a), both);

        let only_a = a.difference(&b);
        assert_eq!(only_a.get(&"q1").to_pairs(), vec![(0, 50), (250, 300)]);
        assert_eq!(only_a.get(&"q2").to_pairs(), vec![(0, 10)]);
        assert_eq!(only_a.length(), 110);

        let only_b = b.difference(&a);
        assert_eq!(only_b.get(&"q1").to_pairs(), vec![(100, 200)]);
        assert_eq!(only_b.get(&"q3").to_pairs(), vec![(0, 10)]);
        assert_eq!(only_b.length(), 110);

        Ok(())
    }
}

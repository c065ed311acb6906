//! # Result Sets
//!
//! An ordered collection of typed records with set combination and
//! field-based sorting. Uniqueness is never enforced on the collection
//! itself; `or` and `and` compare elements by their designated *key field*
//! (via the `Entity` descriptor), not by full-value equality.

use std::collections::HashSet;

use crate::error::{StoreError, StoreResult};
use crate::schema::Entity;

/// Ordered collection of typed records.
#[derive(Debug, Clone)]
pub struct ResultSet<T> {
    pub results: Vec<T>,
}

impl<T> Default for ResultSet<T> {
    fn default() -> Self {
        Self {
            results: Vec::new(),
        }
    }
}

impl<T> From<Vec<T>> for ResultSet<T> {
    fn from(results: Vec<T>) -> Self {
        Self { results }
    }
}

impl<T> IntoIterator for ResultSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter()
    }
}

impl<T> ResultSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.results.iter()
    }
}

impl<T: Entity + Clone> ResultSet<T> {
    fn require_key_field() -> StoreResult<()> {
        match T::key_field() {
            Some(_) => Ok(()),
            None => Err(StoreError::configuration(format!(
                "type mapped to column family '{}' has no designated key field",
                T::column_family()
            ))),
        }
    }

    fn key_of(element: &T) -> StoreResult<String> {
        element.key().ok_or_else(|| {
            StoreError::configuration(format!(
                "element of column family '{}' has no key value",
                T::column_family()
            ))
        })
    }

    /// Union by key: all of this set's elements, plus every element of
    /// `other` whose key does not already match one of this set's keys.
    pub fn or(&self, other: &ResultSet<T>) -> StoreResult<ResultSet<T>> {
        Self::require_key_field()?;
        let own_keys = self
            .results
            .iter()
            .map(Self::key_of)
            .collect::<StoreResult<HashSet<_>>>()?;

        let mut combined = ResultSet {
            results: self.results.clone(),
        };
        for candidate in &other.results {
            if !own_keys.contains(&Self::key_of(candidate)?) {
                combined.results.push(candidate.clone());
            }
        }
        Ok(combined)
    }

    /// Intersection by key, in `other`'s order: every element of `other`
    /// whose key matches some element of this set.
    pub fn and(&self, other: &ResultSet<T>) -> StoreResult<ResultSet<T>> {
        Self::require_key_field()?;
        let own_keys = self
            .results
            .iter()
            .map(Self::key_of)
            .collect::<StoreResult<HashSet<_>>>()?;

        let mut intersection = ResultSet::new();
        for candidate in &other.results {
            if own_keys.contains(&Self::key_of(candidate)?) {
                intersection.results.push(candidate.clone());
            }
        }
        Ok(intersection)
    }

    /// A copy of this set stable-sorted ascending on the named field.
    ///
    /// Strings compare case-insensitively, integers numerically, anything
    /// else (and unset values) as equal. An empty set sorts to an empty set;
    /// a field the type does not have is a configuration error.
    pub fn ascending_by(&self, field: &str) -> StoreResult<ResultSet<T>> {
        self.sorted_by(field, false)
    }

    /// A copy of this set stable-sorted descending on the named field.
    pub fn descending_by(&self, field: &str) -> StoreResult<ResultSet<T>> {
        self.sorted_by(field, true)
    }

    fn sorted_by(&self, field: &str, descending: bool) -> StoreResult<ResultSet<T>> {
        let mut sorted = ResultSet {
            results: self.results.clone(),
        };
        if sorted.results.is_empty() {
            return Ok(sorted);
        }
        if !T::field_names().contains(&field) {
            return Err(StoreError::configuration(format!(
                "type mapped to column family '{}' has no field '{}' to sort by",
                T::column_family(),
                field
            )));
        }

        sorted.results.sort_by(|a, b| {
            let ordering = match (a.field_value(field), b.field_value(field)) {
                (Some(left), Some(right)) => left.compare(&right),
                // Unset values sort as equal, same as untyped fields.
                _ => std::cmp::Ordering::Equal,
            };
            if descending {
                ordering.reverse()
            } else {
                ordering
            }
        });
        Ok(sorted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{Orphan, Person};

    fn set(people: &[Person]) -> ResultSet<Person> {
        ResultSet::from(people.to_vec())
    }

    fn names(set: &ResultSet<Person>) -> Vec<&str> {
        set.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn test_or_with_disjoint_keys_keeps_everything() {
        let left = set(&[Person::new("alice", 31), Person::new("bob", 25)]);
        let right = set(&[Person::new("carol", 40)]);

        let union = left.or(&right).unwrap();
        assert_eq!(union.len(), 3);
        assert_eq!(names(&union), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_or_deduplicates_shared_keys() {
        let left = set(&[Person::new("alice", 31), Person::new("bob", 25)]);
        // Same key, different column values: the receiver's element wins.
        let right = set(&[Person::new("alice", 99), Person::new("carol", 40)]);

        let union = left.or(&right).unwrap();
        assert_eq!(union.len(), 3);
        let alice = union.iter().find(|p| p.name == "alice").unwrap();
        assert_eq!(alice.age, Some(31));
    }

    #[test]
    fn test_and_with_no_shared_keys_is_empty() {
        let left = set(&[Person::new("alice", 31)]);
        let right = set(&[Person::new("bob", 25)]);
        assert!(left.and(&right).unwrap().is_empty());
    }

    #[test]
    fn test_and_keeps_other_order_and_other_elements() {
        let left = set(&[Person::new("alice", 31), Person::new("bob", 25)]);
        let right = set(&[Person::new("bob", 26), Person::new("alice", 32), Person::new("dave", 1)]);

        let intersection = left.and(&right).unwrap();
        assert_eq!(names(&intersection), vec!["bob", "alice"]);
        // Intersection takes its elements from `other`.
        assert_eq!(intersection.results[0].age, Some(26));
    }

    #[test]
    fn test_keyless_type_cannot_combine() {
        let left: ResultSet<Orphan> = ResultSet::from(vec![Orphan::new("a")]);
        let right: ResultSet<Orphan> = ResultSet::new();
        assert!(matches!(
            left.or(&right),
            Err(StoreError::Configuration(_))
        ));
        assert!(matches!(
            left.and(&right),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_sorting_empty_set_is_fine() {
        let empty: ResultSet<Person> = ResultSet::new();
        assert!(empty.ascending_by("age").unwrap().is_empty());
        // The field is not even checked when there is nothing to sort.
        assert!(empty.descending_by("no_such_field").unwrap().is_empty());
    }

    #[test]
    fn test_sorting_unknown_field_is_a_configuration_error() {
        let people = set(&[Person::new("alice", 31)]);
        assert!(matches!(
            people.ascending_by("shoe_size"),
            Err(StoreError::Configuration(_))
        ));
    }

    #[test]
    fn test_numeric_sort_and_reversal() {
        let people = set(&[
            Person::new("bob", 25),
            Person::new("alice", 31),
            Person::new("carol", 9),
        ]);

        let ascending = people.ascending_by("age").unwrap();
        assert_eq!(names(&ascending), vec!["carol", "bob", "alice"]);

        let descending = ascending.descending_by("age").unwrap();
        assert_eq!(names(&descending), vec!["alice", "bob", "carol"]);
    }

    #[test]
    fn test_string_sort_ignores_case() {
        let people = set(&[
            Person::with_city("bob", 25, "oslo"),
            Person::with_city("alice", 31, "Lima"),
            Person::with_city("carol", 40, "Accra"),
        ]);

        let by_city = people.ascending_by("city").unwrap();
        assert_eq!(names(&by_city), vec!["carol", "alice", "bob"]);
    }

    #[test]
    fn test_unset_values_leave_order_stable() {
        let people = set(&[
            Person::with_city("bob", 25, "oslo"),
            Person::new("alice", 31),
            Person::new("carol", 40),
        ]);

        // alice and carol have no city; the sort must keep their relative
        // order while placing comparable values deterministically.
        let by_city = people.ascending_by("city").unwrap();
        let alice = by_city.iter().position(|p| p.name == "alice").unwrap();
        let carol = by_city.iter().position(|p| p.name == "carol").unwrap();
        assert!(alice < carol);
        assert_eq!(by_city.len(), 3);
    }
}

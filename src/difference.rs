// Copyright 2024 The DocAssert Authors
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Result tree of a comparison.
//!
//! A comparison returns `None` when both values are equal and a [`Difference`]
//! otherwise. Nested differences form a tree rooted at the compared pair, with
//! one child per mismatching field, element or map entry.

use std::collections::{BTreeMap, BTreeSet};

use crate::reflect::Reflect;

/// Score given to a mismatch between values of unrelated types.
const TYPE_MISMATCH_SCORE: usize = 5;

/// Left and right values differ.
#[derive(Debug, Clone)]
pub enum Difference<'a> {
    /// Two values that differ as a whole.
    Value(ValueDifference<'a>),
    Object(ObjectDifference<'a>),
    Collection(CollectionDifference<'a>),
    UnorderedCollection(UnorderedCollectionDifference<'a>),
    Map(MapDifference<'a>),
}

impl<'a> Difference<'a> {
    pub(crate) fn value(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
    ) -> Self {
        Difference::Value(ValueDifference::new(message, left_value, right_value))
    }

    fn base(&self) -> &ValueDifference<'a> {
        match self {
            Difference::Value(difference) => difference,
            Difference::Object(difference) => &difference.base,
            Difference::Collection(difference) => &difference.base,
            Difference::UnorderedCollection(difference) => &difference.base,
            Difference::Map(difference) => &difference.base,
        }
    }

    /// Describes why the values differ.
    pub fn message(&self) -> &str {
        &self.base().message
    }

    pub fn left_value(&self) -> &'a dyn Reflect {
        self.base().left_value
    }

    pub fn right_value(&self) -> &'a dyn Reflect {
        self.base().right_value
    }

    pub fn as_object(&self) -> Option<&ObjectDifference<'a>> {
        match self {
            Difference::Object(difference) => Some(difference),
            _ => None,
        }
    }

    pub fn as_collection(&self) -> Option<&CollectionDifference<'a>> {
        match self {
            Difference::Collection(difference) => Some(difference),
            _ => None,
        }
    }

    pub fn as_unordered_collection(&self) -> Option<&UnorderedCollectionDifference<'a>> {
        match self {
            Difference::UnorderedCollection(difference) => Some(difference),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&MapDifference<'a>> {
        match self {
            Difference::Map(difference) => Some(difference),
            _ => None,
        }
    }

    /// How far apart the two values are; lower means a closer match.
    ///
    /// Used to pick the best matching element when an unordered comparison
    /// fails.
    pub fn matching_score(&self) -> usize {
        match self {
            Difference::Value(difference) => {
                let left = difference.left_value;
                let right = difference.right_value;
                if !left.reflect().is_null()
                    && !right.reflect().is_null()
                    && left.type_name() != right.type_name()
                {
                    TYPE_MISMATCH_SCORE
                } else {
                    1
                }
            }
            Difference::Object(difference) => difference.field_differences.len(),
            Difference::Collection(difference) => difference.element_differences.len(),
            Difference::Map(difference) => {
                difference.value_differences.len()
                    + difference.left_missing_keys.len()
                    + difference.right_missing_keys.len()
            }
            Difference::UnorderedCollection(difference) => difference
                .best_matching_indexes
                .iter()
                .map(|(left, right)| {
                    difference
                        .element_differences
                        .get(&(*left, *right))
                        .map_or(0, Difference::matching_score)
                })
                .sum(),
        }
    }
}

/// Message and the two values at the point of difference.
#[derive(Debug, Clone)]
pub struct ValueDifference<'a> {
    message: String,
    left_value: &'a dyn Reflect,
    right_value: &'a dyn Reflect,
}

impl<'a> ValueDifference<'a> {
    pub(crate) fn new(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
    ) -> Self {
        Self {
            message: message.into(),
            left_value,
            right_value,
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn left_value(&self) -> &'a dyn Reflect {
        self.left_value
    }

    pub fn right_value(&self) -> &'a dyn Reflect {
        self.right_value
    }
}

/// Field differences of two objects, in field declaration order.
#[derive(Debug, Clone)]
pub struct ObjectDifference<'a> {
    base: ValueDifference<'a>,
    field_differences: Vec<(&'static str, Difference<'a>)>,
}

impl<'a> ObjectDifference<'a> {
    pub(crate) fn new(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
    ) -> Self {
        Self {
            base: ValueDifference::new(message, left_value, right_value),
            field_differences: vec![],
        }
    }

    pub(crate) fn add_field_difference(&mut self, field: &'static str, difference: Difference<'a>) {
        self.field_differences.push((field, difference));
    }

    pub fn field_differences(&self) -> &[(&'static str, Difference<'a>)] {
        &self.field_differences
    }

    pub fn field_difference(&self, field: &str) -> Option<&Difference<'a>> {
        self.field_differences
            .iter()
            .find(|(name, _)| *name == field)
            .map(|(_, difference)| difference)
    }

    pub fn is_empty(&self) -> bool {
        self.field_differences.is_empty()
    }
}

/// Element differences of two ordered collections of the same size, by index.
#[derive(Debug, Clone)]
pub struct CollectionDifference<'a> {
    base: ValueDifference<'a>,
    element_differences: BTreeMap<usize, Difference<'a>>,
}

impl<'a> CollectionDifference<'a> {
    pub(crate) fn new(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
    ) -> Self {
        Self {
            base: ValueDifference::new(message, left_value, right_value),
            element_differences: BTreeMap::new(),
        }
    }

    pub(crate) fn add_element_difference(&mut self, index: usize, difference: Difference<'a>) {
        self.element_differences.insert(index, difference);
    }

    pub fn element_differences(&self) -> &BTreeMap<usize, Difference<'a>> {
        &self.element_differences
    }

    pub fn is_empty(&self) -> bool {
        self.element_differences.is_empty()
    }
}

/// Two collections for which no pairing of elements is equal.
///
/// The element matrix is only filled in when all differences were requested;
/// a pair of indexes without an entry is then an exact match.
#[derive(Debug, Clone)]
pub struct UnorderedCollectionDifference<'a> {
    base: ValueDifference<'a>,
    left_size: usize,
    right_size: usize,
    detailed: bool,
    element_differences: BTreeMap<(usize, usize), Difference<'a>>,
    best_matching_indexes: BTreeMap<usize, usize>,
}

impl<'a> UnorderedCollectionDifference<'a> {
    pub(crate) fn new(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
        left_size: usize,
        right_size: usize,
    ) -> Self {
        Self {
            base: ValueDifference::new(message, left_value, right_value),
            left_size,
            right_size,
            detailed: false,
            element_differences: BTreeMap::new(),
            best_matching_indexes: BTreeMap::new(),
        }
    }

    pub(crate) fn add_element_difference(
        &mut self,
        left_index: usize,
        right_index: usize,
        difference: Difference<'a>,
    ) {
        self.element_differences
            .insert((left_index, right_index), difference);
    }

    /// Marks the element matrix as complete and selects the best match of
    /// every left element that has no exact match.
    ///
    /// Exact matches are taken out on both sides first. Among the remaining
    /// right elements the lowest [`Difference::matching_score`] wins; on a tie
    /// the first right index is kept.
    pub(crate) fn complete(&mut self) {
        self.detailed = true;

        let mut matched_left = BTreeSet::new();
        let mut matched_right = BTreeSet::new();
        for left in 0..self.left_size {
            for right in 0..self.right_size {
                if !self.element_differences.contains_key(&(left, right)) {
                    matched_left.insert(left);
                    matched_right.insert(right);
                }
            }
        }

        for left in (0..self.left_size).filter(|index| !matched_left.contains(index)) {
            let mut best: Option<(usize, usize)> = None;
            for right in (0..self.right_size).filter(|index| !matched_right.contains(index)) {
                let score = self
                    .element_differences
                    .get(&(left, right))
                    .map_or(0, Difference::matching_score);
                if best.map_or(true, |(best_score, _)| score < best_score) {
                    best = Some((score, right));
                }
            }
            if let Some((_, right)) = best {
                self.best_matching_indexes.insert(left, right);
            }
        }
    }

    pub fn left_size(&self) -> usize {
        self.left_size
    }

    pub fn right_size(&self) -> usize {
        self.right_size
    }

    /// Whether the element matrix was computed.
    pub fn is_detailed(&self) -> bool {
        self.detailed
    }

    pub fn element_differences(&self) -> &BTreeMap<(usize, usize), Difference<'a>> {
        &self.element_differences
    }

    pub fn element_difference(&self, left_index: usize, right_index: usize) -> Option<&Difference<'a>> {
        self.element_differences.get(&(left_index, right_index))
    }

    /// Left index to the index of its closest right element.
    pub fn best_matching_indexes(&self) -> &BTreeMap<usize, usize> {
        &self.best_matching_indexes
    }
}

/// Differences of two maps, keyed by the left map's keys.
#[derive(Debug, Clone)]
pub struct MapDifference<'a> {
    base: ValueDifference<'a>,
    value_differences: Vec<(&'a dyn Reflect, Difference<'a>)>,
    left_missing_keys: Vec<(&'a dyn Reflect, &'a dyn Reflect)>,
    right_missing_keys: Vec<(&'a dyn Reflect, &'a dyn Reflect)>,
}

impl<'a> MapDifference<'a> {
    pub(crate) fn new(
        message: impl Into<String>,
        left_value: &'a dyn Reflect,
        right_value: &'a dyn Reflect,
    ) -> Self {
        Self {
            base: ValueDifference::new(message, left_value, right_value),
            value_differences: vec![],
            left_missing_keys: vec![],
            right_missing_keys: vec![],
        }
    }

    pub(crate) fn add_value_difference(&mut self, key: &'a dyn Reflect, difference: Difference<'a>) {
        self.value_differences.push((key, difference));
    }

    pub(crate) fn add_left_missing_key(&mut self, key: &'a dyn Reflect, value: &'a dyn Reflect) {
        self.left_missing_keys.push((key, value));
    }

    pub(crate) fn add_right_missing_key(&mut self, key: &'a dyn Reflect, value: &'a dyn Reflect) {
        self.right_missing_keys.push((key, value));
    }

    /// Keys present on both sides whose values differ.
    pub fn value_differences(&self) -> &[(&'a dyn Reflect, Difference<'a>)] {
        &self.value_differences
    }

    /// Entries present only in the right map.
    pub fn left_missing_keys(&self) -> &[(&'a dyn Reflect, &'a dyn Reflect)] {
        &self.left_missing_keys
    }

    /// Entries present only in the left map.
    pub fn right_missing_keys(&self) -> &[(&'a dyn Reflect, &'a dyn Reflect)] {
        &self.right_missing_keys
    }

    pub fn is_empty(&self) -> bool {
        self.value_differences.is_empty()
            && self.left_missing_keys.is_empty()
            && self.right_missing_keys.is_empty()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_value_matching_score() {
        let one = 1u8;
        let two = 2u8;
        let text = "2".to_string();
        let none: Option<u8> = None;

        assert_eq!(Difference::value("", &one, &two).matching_score(), 1);
        assert_eq!(
            Difference::value("", &one, &text).matching_score(),
            TYPE_MISMATCH_SCORE
        );
        assert_eq!(Difference::value("", &none, &text).matching_score(), 1);
    }

    #[test]
    fn test_best_matches_skip_exact_matches() {
        let left = vec![1u8, 2, 3];
        let right = vec![3u8, 4, 5];
        let mut difference = UnorderedCollectionDifference::new("", &left, &right, 3, 3);

        // left[2] == right[0], everything else differs; left[0] is further from right[2]
        for (l, r) in [(0, 0), (0, 1), (1, 0), (1, 1), (1, 2), (2, 1), (2, 2)] {
            difference.add_element_difference(l, r, Difference::value("", &left[l], &right[r]));
        }
        let mut object = ObjectDifference::new("", &left[0], &right[2]);
        object.add_field_difference("a", Difference::value("", &left[0], &right[2]));
        object.add_field_difference("b", Difference::value("", &left[0], &right[2]));
        difference.add_element_difference(0, 2, Difference::Object(object));
        difference.complete();

        let best = difference.best_matching_indexes();
        assert!(difference.is_detailed());
        assert_eq!(best.get(&0), Some(&1));
        assert_eq!(best.get(&1), Some(&1));
        assert_eq!(best.get(&2), None);
        assert_eq!(Difference::UnorderedCollection(difference).matching_score(), 2);
    }

    #[test]
    fn test_map_difference_is_empty() {
        let key = "y".to_string();
        let value = 2u8;
        let mut difference = MapDifference::new("", &key, &value);
        assert!(difference.is_empty());
        difference.add_left_missing_key(&key, &value);
        assert!(!difference.is_empty());
        assert_eq!(Difference::Map(difference).matching_score(), 1);
    }
}

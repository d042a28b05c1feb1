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

use super::{Comparator, Operand, Session};
use crate::difference::{CollectionDifference, Difference, UnorderedCollectionDifference};
use crate::error::{ComparisonError, ComparisonResult};
use crate::reflect::{Reflect, Reflected};

fn elements<'o, 'a>(
    left: &'o Operand<'a>,
    right: &'o Operand<'a>,
) -> ComparisonResult<(&'o [&'a dyn Reflect], &'o [&'a dyn Reflect])> {
    match (left.reflected().elements(), right.reflected().elements()) {
        (Some(left_elements), Some(right_elements)) => Ok((left_elements, right_elements)),
        _ => Err(ComparisonError::NoComparator {
            left: left.type_name().to_string(),
            right: right.type_name().to_string(),
        }),
    }
}

fn size_message(left_size: usize, right_size: usize) -> String {
    format!(
        "Different collection sizes. Left size: {}, right size: {}",
        left_size, right_size
    )
}

/// Compares two ordered collections element by element.
#[derive(Debug)]
pub struct CollectionComparator;

impl Comparator for CollectionComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        matches!((left, right), (Reflected::Seq(_), Reflected::Seq(_)))
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        only_first_difference: bool,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let (left_elements, right_elements) = elements(left, right)?;
        if left_elements.len() != right_elements.len() {
            return Ok(Some(Difference::value(
                size_message(left_elements.len(), right_elements.len()),
                left.value(),
                right.value(),
            )));
        }

        let mut difference =
            CollectionDifference::new("Different elements.", left.value(), right.value());
        for (index, (left_element, right_element)) in
            left_elements.iter().zip(right_elements).enumerate()
        {
            if let Some(element_difference) =
                session.difference(*left_element, *right_element, only_first_difference)?
            {
                difference.add_element_difference(index, element_difference);
                if only_first_difference {
                    break;
                }
            }
        }

        if difference.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Difference::Collection(difference)))
        }
    }
}

/// Compares two collections ignoring the order of their elements.
///
/// The collections are equal when every left element can be paired with a
/// distinct, equal right element and no right element is left over. The
/// pairing is searched for by backtracking, so duplicates must be matched as
/// many times as they occur.
///
/// In the strict chain it still handles sets, which have no order to respect.
#[derive(Debug)]
pub struct LenientOrderCollectionComparator;

impl LenientOrderCollectionComparator {
    /// Tries to pair `left[left_index..]` with the `remaining` right indexes.
    ///
    /// Candidates are tried in right order and the first complete pairing
    /// wins.
    fn is_equal<'a>(
        left: &[&'a dyn Reflect],
        right: &[&'a dyn Reflect],
        left_index: usize,
        remaining: &[usize],
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<bool> {
        let Some(left_element) = left.get(left_index) else {
            return Ok(remaining.is_empty());
        };

        for (position, right_index) in remaining.iter().enumerate() {
            if !session.is_equal(*left_element, right[*right_index])? {
                continue;
            }

            let mut rest = remaining.to_vec();
            rest.remove(position);
            if Self::is_equal(left, right, left_index + 1, &rest, session)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

impl Comparator for LenientOrderCollectionComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        left.is_collection() && right.is_collection()
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        only_first_difference: bool,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let (left_elements, right_elements) = elements(left, right)?;

        if left_elements.len() == right_elements.len() {
            let remaining: Vec<usize> = (0..right_elements.len()).collect();
            if Self::is_equal(left_elements, right_elements, 0, &remaining, session)? {
                return Ok(None);
            }
        }
        tracing::debug!(
            left_size = left_elements.len(),
            right_size = right_elements.len(),
            "no matching ordering of the right elements"
        );

        let message = if left_elements.len() == right_elements.len() {
            "Collections contain different elements.".to_string()
        } else {
            size_message(left_elements.len(), right_elements.len())
        };
        let mut difference = UnorderedCollectionDifference::new(
            message,
            left.value(),
            right.value(),
            left_elements.len(),
            right_elements.len(),
        );
        if only_first_difference {
            return Ok(Some(Difference::UnorderedCollection(difference)));
        }

        for (left_index, left_element) in left_elements.iter().enumerate() {
            for (right_index, right_element) in right_elements.iter().enumerate() {
                if let Some(element_difference) =
                    session.difference(*left_element, *right_element, false)?
                {
                    difference.add_element_difference(left_index, right_index, element_difference);
                }
            }
        }
        difference.complete();
        Ok(Some(Difference::UnorderedCollection(difference)))
    }
}

#[cfg(test)]
mod test {
    use std::collections::HashSet;

    use crate::comparator::{ComparatorMode, ReflectionComparator};

    fn strict() -> ReflectionComparator {
        ReflectionComparator::with_modes(&[]).unwrap()
    }

    fn lenient_order() -> ReflectionComparator {
        ReflectionComparator::with_modes(&[ComparatorMode::LenientOrder]).unwrap()
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_ordered_elements() {
        let left = strings(&["a", "b"]);
        let right = strings(&["b", "a"]);

        let difference = strict().get_all_differences(&left, &right).unwrap().unwrap();
        let collection = difference.as_collection().unwrap();
        assert_eq!(
            collection.element_differences().keys().copied().collect::<Vec<_>>(),
            vec![0, 1]
        );

        let difference = strict().get_difference(&left, &right).unwrap().unwrap();
        assert_eq!(difference.as_collection().unwrap().element_differences().len(), 1);

        assert!(strict().is_equal(&left, &left.clone()).unwrap());
    }

    #[test]
    fn test_ordered_sizes() {
        let left = vec![1, 2];
        let right = vec![1, 2, 3];
        let difference = strict().get_all_differences(&left, &right).unwrap().unwrap();
        assert_eq!(
            difference.message(),
            "Different collection sizes. Left size: 2, right size: 3"
        );
        assert!(difference.as_collection().is_none());
    }

    #[test]
    fn test_arrays_and_vectors() {
        assert!(strict().is_equal(&[1, 2, 3], &vec![1, 2, 3]).unwrap());
        assert!(!strict().is_equal(&[1, 2, 3], &vec![1, 3, 2]).unwrap());
    }

    #[test]
    fn test_lenient_order() {
        let left = strings(&["a", "b"]);
        let right = strings(&["b", "a"]);
        assert!(lenient_order().get_all_differences(&left, &right).unwrap().is_none());
    }

    #[test]
    fn test_lenient_order_counts_duplicates() {
        let left = strings(&["a", "b"]);
        let right = strings(&["a", "a", "b"]);
        let difference = lenient_order().get_difference(&left, &right).unwrap().unwrap();
        assert!(difference.as_unordered_collection().is_some());

        let left = strings(&["a", "a", "b"]);
        let right = strings(&["a", "b", "b"]);
        assert!(!lenient_order().is_equal(&left, &right).unwrap());
    }

    #[test]
    fn test_lenient_order_backtracks() {
        // the first candidate for left[0] is equal under ignored defaults but
        // is the only possible match for left[1]
        let comparator = ReflectionComparator::with_modes(&[
            ComparatorMode::LenientOrder,
            ComparatorMode::IgnoreDefaults,
        ])
        .unwrap();
        let left = vec![0, 5];
        let right = vec![5, 7];
        assert!(comparator.is_equal(&left, &right).unwrap());

        let left = vec![vec![0, 1], vec![2, 1]];
        let right = vec![vec![2, 1], vec![9, 1]];
        assert!(comparator.is_equal(&left, &right).unwrap());
    }

    #[test]
    fn test_unordered_details() {
        let left = vec![1, 2, 3];
        let right = vec![3, 4, 1];

        let difference = lenient_order().get_difference(&left, &right).unwrap().unwrap();
        let unordered = difference.as_unordered_collection().unwrap();
        assert!(!unordered.is_detailed());
        assert!(unordered.element_differences().is_empty());

        let difference = lenient_order().get_all_differences(&left, &right).unwrap().unwrap();
        let unordered = difference.as_unordered_collection().unwrap();
        assert!(unordered.is_detailed());
        assert_eq!(unordered.element_differences().len(), 7);
        assert!(unordered.element_difference(0, 2).is_none());
        assert!(unordered.element_difference(2, 0).is_none());
        assert_eq!(unordered.best_matching_indexes().get(&1), Some(&1));
        assert_eq!(unordered.best_matching_indexes().len(), 1);
    }

    #[test]
    fn test_sets_ignore_order_in_strict_mode() {
        let left: HashSet<String> = strings(&["a", "b", "c"]).into_iter().collect();
        let right = strings(&["c", "b", "a"]);
        assert!(strict().is_equal(&left, &right).unwrap());
    }
}

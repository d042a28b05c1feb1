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

use super::simple::scalars_equal;
use super::{Comparator, Operand, Session};
use crate::difference::{Difference, MapDifference};
use crate::error::{ComparisonError, ComparisonResult};
use crate::reflect::{Reflect, Reflected};

/// Compares two maps entry by entry.
///
/// Scalar keys must be exactly equal; keys of any other kind are matched
/// with the session's comparison, so lenient modes apply to them too.
#[derive(Debug)]
pub struct MapComparator;

impl MapComparator {
    fn keys_equal<'a>(
        left: &'a dyn Reflect,
        right: &'a dyn Reflect,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<bool> {
        let left_key = Operand::resolve(left);
        let right_key = Operand::resolve(right);
        match scalars_equal(left_key.reflected(), right_key.reflected()) {
            Some(equal) => Ok(equal),
            None if left_key.reflected().is_scalar() || right_key.reflected().is_scalar() => {
                Ok(false)
            }
            None => session.is_equal(left, right),
        }
    }
}

impl Comparator for MapComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        matches!((left, right), (Reflected::Map(_), Reflected::Map(_)))
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        only_first_difference: bool,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let (Reflected::Map(left_entries), Reflected::Map(right_entries)) =
            (left.reflected(), right.reflected())
        else {
            return Err(ComparisonError::NoComparator {
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            });
        };

        let mut difference = MapDifference::new("Different maps.", left.value(), right.value());
        let mut unmatched: Vec<usize> = (0..right_entries.len()).collect();

        for (left_key, left_value) in left_entries {
            let mut found = None;
            for (position, right_index) in unmatched.iter().enumerate() {
                if Self::keys_equal(*left_key, right_entries[*right_index].0, session)? {
                    found = Some(position);
                    break;
                }
            }

            match found {
                Some(position) => {
                    let right_index = unmatched.remove(position);
                    let right_value = right_entries[right_index].1;
                    if let Some(value_difference) =
                        session.difference(*left_value, right_value, only_first_difference)?
                    {
                        difference.add_value_difference(*left_key, value_difference);
                    }
                }
                None => difference.add_right_missing_key(*left_key, *left_value),
            }
            if only_first_difference && !difference.is_empty() {
                return Ok(Some(Difference::Map(difference)));
            }
        }

        for right_index in unmatched {
            let (right_key, right_value) = right_entries[right_index];
            difference.add_left_missing_key(right_key, right_value);
            if only_first_difference {
                break;
            }
        }

        if difference.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Difference::Map(difference)))
        }
    }
}

#[cfg(test)]
mod test {
    use std::collections::{BTreeMap, HashMap};

    use crate::comparator::{ComparatorMode, ReflectionComparator};

    fn map(entries: &[(&str, i32)]) -> BTreeMap<String, i32> {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), *value))
            .collect()
    }

    #[test]
    fn test_equal_maps() {
        let comparator = ReflectionComparator::with_modes(&[]).unwrap();
        let left = map(&[("x", 1), ("y", 2)]);
        let right: HashMap<String, i32> = left.clone().into_iter().collect();
        assert!(comparator.is_equal(&left, &right).unwrap());
    }

    #[test]
    fn test_missing_keys() {
        let comparator = ReflectionComparator::with_modes(&[]).unwrap();
        let left = map(&[("x", 1), ("z", 3)]);
        let right = map(&[("x", 1), ("y", 2)]);

        let difference = comparator.get_all_differences(&left, &right).unwrap().unwrap();
        let map_difference = difference.as_map().unwrap();
        assert!(map_difference.value_differences().is_empty());

        let left_missing = map_difference.left_missing_keys();
        assert_eq!(left_missing.len(), 1);
        assert_eq!(left_missing[0].0.to_string(), "\"y\"");

        let right_missing = map_difference.right_missing_keys();
        assert_eq!(right_missing.len(), 1);
        assert_eq!(right_missing[0].0.to_string(), "\"z\"");
    }

    #[test]
    fn test_value_differences() {
        let comparator = ReflectionComparator::with_modes(&[]).unwrap();
        let left = map(&[("a", 1), ("b", 2), ("c", 3)]);
        let right = map(&[("a", 9), ("b", 2), ("c", 8)]);

        let difference = comparator.get_all_differences(&left, &right).unwrap().unwrap();
        assert_eq!(difference.as_map().unwrap().value_differences().len(), 2);

        let difference = comparator.get_difference(&left, &right).unwrap().unwrap();
        assert_eq!(difference.as_map().unwrap().value_differences().len(), 1);
    }

    #[test]
    fn test_scalar_keys_ignore_lenient_modes() {
        let comparator = ReflectionComparator::with_modes(&[ComparatorMode::IgnoreDefaults]).unwrap();
        let left: BTreeMap<i32, i32> = [(0, 1)].into_iter().collect();
        let right: BTreeMap<i32, i32> = [(5, 1)].into_iter().collect();
        assert!(!comparator.is_equal(&left, &right).unwrap());
    }

    #[test]
    fn test_composite_keys() {
        let comparator = ReflectionComparator::with_modes(&[ComparatorMode::LenientOrder]).unwrap();
        let left: BTreeMap<Vec<i32>, u8> = [(vec![1, 2], 1)].into_iter().collect();
        let right: BTreeMap<Vec<i32>, u8> = [(vec![2, 1], 1)].into_iter().collect();
        assert!(comparator.is_equal(&left, &right).unwrap());
    }
}

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
use crate::difference::Difference;
use crate::error::ComparisonResult;
use crate::reflect::Reflected;

/// Compares nulls and scalars (booleans, characters, numbers, strings, dates).
///
/// Numbers are compared by value: `1u8`, `1i64` and `1.0f64` are equal.
#[derive(Debug)]
pub struct SimpleCasesComparator;

impl Comparator for SimpleCasesComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        left.is_null() || right.is_null() || left.is_scalar() || right.is_scalar()
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        _only_first_difference: bool,
        _session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let (left_reflected, right_reflected) = (left.reflected(), right.reflected());
        if left_reflected.is_null() && right_reflected.is_null() {
            return Ok(None);
        }
        if left_reflected.is_null() {
            return Ok(Some(Difference::value(
                "Left value null.",
                left.value(),
                right.value(),
            )));
        }
        if right_reflected.is_null() {
            return Ok(Some(Difference::value(
                "Right value null.",
                left.value(),
                right.value(),
            )));
        }

        match scalars_equal(left_reflected, right_reflected) {
            Some(true) => Ok(None),
            Some(false) => Ok(Some(Difference::value(
                "Different values.",
                left.value(),
                right.value(),
            ))),
            None => Ok(Some(type_mismatch(left, right))),
        }
    }
}

/// Equality of two scalars of the same kind, `None` when the kinds differ or
/// either side is not a scalar.
pub(crate) fn scalars_equal(left: &Reflected<'_>, right: &Reflected<'_>) -> Option<bool> {
    match (left, right) {
        (Reflected::Bool(left), Reflected::Bool(right)) => Some(left == right),
        (Reflected::Char(left), Reflected::Char(right)) => Some(left == right),
        (Reflected::Number(left), Reflected::Number(right)) => Some(left.same_value(right)),
        (Reflected::Str(left), Reflected::Str(right)) => Some(left == right),
        (Reflected::Date(left), Reflected::Date(right)) => Some(left == right),
        _ => None,
    }
}

pub(crate) fn type_mismatch<'a>(left: &Operand<'a>, right: &Operand<'a>) -> Difference<'a> {
    Difference::value(
        format!(
            "Different types. Left: {}, right: {}",
            left.type_name(),
            right.type_name()
        ),
        left.value(),
        right.value(),
    )
}

#[cfg(test)]
mod test {
    use crate::comparator::{Config, ReflectionComparator};

    fn strict() -> ReflectionComparator {
        ReflectionComparator::new(&Config::new()).unwrap()
    }

    #[test]
    fn test_scalars() {
        let comparator = strict();
        assert!(comparator.is_equal(&true, &true).unwrap());
        assert!(!comparator.is_equal(&true, &false).unwrap());
        assert!(comparator.is_equal(&'a', &'a').unwrap());
        assert!(comparator
            .is_equal(&"abc".to_string(), &"abc".to_string())
            .unwrap());
        assert!(!comparator
            .is_equal(&"abc".to_string(), &"abd".to_string())
            .unwrap());
    }

    #[test]
    fn test_numbers_compare_by_value() {
        let comparator = strict();
        assert!(comparator.is_equal(&1u8, &1i64).unwrap());
        assert!(comparator.is_equal(&1i32, &1.0f64).unwrap());
        assert!(!comparator.is_equal(&1i32, &2i32).unwrap());
        assert!(!comparator.is_equal(&0.1f64, &0.2f64).unwrap());
    }

    #[test]
    fn test_nulls() {
        let comparator = strict();
        let none: Option<String> = None;
        let some = Some("x".to_string());

        assert!(comparator.get_difference(&none, &none).unwrap().is_none());

        let difference = comparator.get_difference(&none, &some).unwrap().unwrap();
        assert_eq!(difference.message(), "Left value null.");

        let difference = comparator.get_difference(&some, &none).unwrap().unwrap();
        assert_eq!(difference.message(), "Right value null.");
    }

    #[test]
    fn test_scalar_kinds_mismatch() {
        let comparator = strict();
        let text = "1".to_string();
        let difference = comparator.get_difference(&1u8, &text).unwrap().unwrap();
        assert_eq!(
            difference.message(),
            "Different types. Left: u8, right: alloc::string::String"
        );

        let chars = vec!['x'];
        let difference = comparator.get_difference(&'x', &chars).unwrap().unwrap();
        assert!(difference.message().starts_with("Different types."));
    }
}

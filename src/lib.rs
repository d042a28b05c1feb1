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

#![doc = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/README.md"))]

mod comparator;
mod difference;
mod error;
mod format;
mod path;
mod property;
mod reflect;


pub use crate::comparator::{
    CollectionComparator, Comparator, ComparatorMode, Config, IgnoreDefaultsComparator,
    LenientDatesComparator, LenientOrderCollectionComparator, MapComparator, ObjectComparator,
    Operand, ReflectionComparator, Session, SimpleCasesComparator,
};
pub use crate::difference::{
    CollectionDifference, Difference, MapDifference, ObjectDifference,
    UnorderedCollectionDifference, ValueDifference,
};
pub use crate::error::{AssertionError, ComparisonError, ComparisonResult};
pub use crate::format::{entries, DifferenceEntry};
pub use crate::path::{Key, Path, PropertyPath};
pub use crate::reflect::{Number, Object, Reflect, Reflected};

use crate::format::{Indent, Render};

/// Whether two values are equal under the given modes.
///
/// # Examples
///
/// ```
/// use reflect_assert::{is_equal, ComparatorMode};
///
/// assert!(is_equal(&vec![1, 2], &vec![2, 1], &[ComparatorMode::LenientOrder])?);
/// assert!(!is_equal(&vec![1, 2], &vec![2, 1], &[])?);
/// # Ok::<(), reflect_assert::ComparisonError>(())
/// ```
pub fn is_equal<L: Reflect, R: Reflect>(
    left: &L,
    right: &R,
    modes: &[ComparatorMode],
) -> ComparisonResult<bool> {
    ReflectionComparator::with_modes(modes)?.is_equal(left, right)
}

/// First difference between two values, `None` if they are equal.
pub fn get_difference<'a, L: Reflect, R: Reflect>(
    left: &'a L,
    right: &'a R,
    modes: &[ComparatorMode],
) -> ComparisonResult<Option<Difference<'a>>> {
    ReflectionComparator::with_modes(modes)?.get_difference(left, right)
}

/// Every difference between two values, `None` if they are equal.
pub fn get_all_differences<'a, L: Reflect, R: Reflect>(
    left: &'a L,
    right: &'a R,
    modes: &[ComparatorMode],
) -> ComparisonResult<Option<Difference<'a>>> {
    ReflectionComparator::with_modes(modes)?.get_all_differences(left, right)
}

/// Asserts that `actual` is structurally equal to `expected`.
///
/// On a mismatch the error carries a report listing every difference.
///
/// # Examples
///
/// ```
/// use reflect_assert::{assert_reflection_eq, AssertionError};
///
/// assert!(assert_reflection_eq(&vec![1, 2], &vec![1, 2], &[]).is_ok());
///
/// let err = assert_reflection_eq(&vec![1, 2], &vec![1, 3], &[]).unwrap_err();
/// assert!(matches!(err, AssertionError::Mismatch { .. }));
/// ```
pub fn assert_reflection_eq<E: Reflect, A: Reflect>(
    expected: &E,
    actual: &A,
    modes: &[ComparatorMode],
) -> Result<(), AssertionError> {
    check(expected, actual, modes, None)
}

/// Asserts equality ignoring collection order and default expected values.
pub fn assert_lenient_eq<E: Reflect, A: Reflect>(
    expected: &E,
    actual: &A,
) -> Result<(), AssertionError> {
    assert_reflection_eq(
        expected,
        actual,
        &[ComparatorMode::LenientOrder, ComparatorMode::IgnoreDefaults],
    )
}

/// Asserts that the property at `path` in `actual` equals `expected`.
///
/// Paths select fields (`address.city`), elements (`lines[0].amount`) or a
/// projection over every element of a collection (`[*].name`).
///
/// # Examples
///
/// ```
/// use reflect_assert::{assert_property_reflection_eq, reflect_object};
///
/// struct Person {
///     name: String,
/// }
///
/// reflect_object!(Person { name });
///
/// let people = vec![
///     Person { name: "Ann".to_string() },
///     Person { name: "Bob".to_string() },
/// ];
/// let names = vec!["Ann".to_string(), "Bob".to_string()];
/// assert!(assert_property_reflection_eq("[*].name", &names, &people, &[]).is_ok());
/// ```
pub fn assert_property_reflection_eq<E: Reflect, A: Reflect>(
    path: &str,
    expected: &E,
    actual: &A,
    modes: &[ComparatorMode],
) -> Result<(), AssertionError> {
    let property = property::resolve(actual, path)?;
    check(expected, property.as_reflect(), modes, Some(path))
}

/// [`assert_property_reflection_eq`] ignoring collection order and default
/// expected values.
pub fn assert_property_lenient_eq<E: Reflect, A: Reflect>(
    path: &str,
    expected: &E,
    actual: &A,
) -> Result<(), AssertionError> {
    assert_property_reflection_eq(
        path,
        expected,
        actual,
        &[ComparatorMode::LenientOrder, ComparatorMode::IgnoreDefaults],
    )
}

fn check(
    expected: &dyn Reflect,
    actual: &dyn Reflect,
    modes: &[ComparatorMode],
    property: Option<&str>,
) -> Result<(), AssertionError> {
    let comparator = ReflectionComparator::with_modes(modes)?;
    let Some(difference) = comparator.compare(expected, actual, false)? else {
        return Ok(());
    };

    let mut report = String::new();
    if let Some(path) = property {
        report.push_str(&format!("Property {} differs.\n", path));
    }
    report.push_str(&format!(
        "Expected: {}\nActual:   {}\n\n{}",
        Render::new(expected),
        Render::new(actual),
        difference.to_string().indent(2)
    ));
    Err(AssertionError::Mismatch { report })
}

/// Panics unless both values are structurally equal under the given modes.
///
/// ```
/// use reflect_assert::{assert_reflection_eq, ComparatorMode};
///
/// assert_reflection_eq!(vec![1, 2], vec![1, 2]);
/// assert_reflection_eq!(vec![1, 2], vec![2, 1], ComparatorMode::LenientOrder);
/// ```
#[macro_export]
macro_rules! assert_reflection_eq {
    ($expected:expr, $actual:expr $(, $mode:expr)* $(,)?) => {
        if let Err(err) = $crate::assert_reflection_eq(&$expected, &$actual, &[$($mode),*]) {
            panic!("assertion `expected == actual` failed\n{}", err);
        }
    };
}

/// Panics unless both values are equal ignoring collection order and
/// default expected values.
///
/// ```
/// use reflect_assert::assert_lenient_eq;
///
/// assert_lenient_eq!(vec![0, 2], vec![2, 7]);
/// ```
#[macro_export]
macro_rules! assert_lenient_eq {
    ($expected:expr, $actual:expr $(,)?) => {
        if let Err(err) = $crate::assert_lenient_eq(&$expected, &$actual) {
            panic!("assertion `expected == actual` failed\n{}", err);
        }
    };
}

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

use super::simple::type_mismatch;
use super::{Comparator, Operand, Session};
use crate::difference::{Difference, ObjectDifference};
use crate::error::{ComparisonError, ComparisonResult};
use crate::reflect::Reflected;

/// Compares two objects field by field, the parent part included.
///
/// This is the last comparator of every chain: it accepts any pair of
/// non-null values and reports a type mismatch for those that are not two
/// compatible objects.
#[derive(Debug)]
pub struct ObjectComparator;

impl Comparator for ObjectComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        !left.is_null() && !right.is_null()
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        only_first_difference: bool,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let (Reflected::Object(left_object), Reflected::Object(right_object)) =
            (left.reflected(), right.reflected())
        else {
            return Ok(Some(type_mismatch(left, right)));
        };
        if !left_object.is_assignable_from(right_object) {
            return Ok(Some(type_mismatch(left, right)));
        }

        let mut difference =
            ObjectDifference::new("Different field values.", left.value(), right.value());
        for (field, left_value) in left_object.all_fields() {
            let right_value =
                right_object
                    .get(field)
                    .ok_or_else(|| ComparisonError::FieldAccess {
                        type_name: right.type_name().to_string(),
                        field: field.to_string(),
                    })?;

            if let Some(field_difference) =
                session.difference(left_value, right_value, only_first_difference)?
            {
                difference.add_field_difference(field, field_difference);
                if only_first_difference {
                    break;
                }
            }
        }

        if difference.is_empty() {
            Ok(None)
        } else {
            Ok(Some(Difference::Object(difference)))
        }
    }
}

#[cfg(test)]
mod test {
    use crate::comparator::{ComparatorMode, ReflectionComparator};
    use crate::error::ComparisonError;
    use crate::reflect::{Object, Reflect, Reflected};
    use crate::reflect_object;

    #[derive(Clone)]
    struct Address {
        street: String,
        number: u32,
    }

    reflect_object!(Address { street, number });

    #[derive(Clone)]
    struct Person {
        name: String,
        age: u8,
        address: Address,
        nickname: String,
    }

    reflect_object!(Person { name, age, address });

    struct Employee {
        person: Person,
        salary: u32,
    }

    reflect_object!(Employee { ..person, salary });

    fn person() -> Person {
        Person {
            name: "John".to_string(),
            age: 30,
            address: Address {
                street: "Main".to_string(),
                number: 1,
            },
            nickname: "Johnny".to_string(),
        }
    }

    fn strict() -> ReflectionComparator {
        ReflectionComparator::with_modes(&[]).unwrap()
    }

    #[test]
    fn test_unlisted_fields_are_ignored() {
        let left = person();
        let mut right = person();
        right.nickname = "Jack".to_string();
        assert!(strict().is_equal(&left, &right).unwrap());
    }

    #[test]
    fn test_field_differences_in_declaration_order() {
        let left = person();
        let mut right = person();
        right.name = "Jane".to_string();
        right.address.number = 2;

        let difference = strict().get_all_differences(&left, &right).unwrap().unwrap();
        let object = difference.as_object().unwrap();
        let fields: Vec<_> = object.field_differences().iter().map(|(name, _)| *name).collect();
        assert_eq!(fields, vec!["name", "address"]);

        let address = object.field_difference("address").unwrap().as_object().unwrap();
        assert!(address.field_difference("number").is_some());
        assert!(address.field_difference("street").is_none());

        let difference = strict().get_difference(&left, &right).unwrap().unwrap();
        assert_eq!(difference.as_object().unwrap().field_differences().len(), 1);
    }

    #[test]
    fn test_parent_fields_are_compared() {
        let left = Employee {
            person: person(),
            salary: 10,
        };
        let mut other = person();
        other.age = 31;
        let right = Employee {
            person: other,
            salary: 10,
        };

        let difference = strict().get_all_differences(&left, &right).unwrap().unwrap();
        let object = difference.as_object().unwrap();
        assert!(object.field_difference("age").is_some());
        assert!(object.field_difference("salary").is_none());
    }

    #[test]
    fn test_subtype_on_the_right() {
        let left = person();
        let right = Employee {
            person: person(),
            salary: 10,
        };
        assert!(strict().is_equal(&left, &right).unwrap());

        let difference = strict().get_difference(&right, &left).unwrap().unwrap();
        assert!(difference.message().starts_with("Different types."));
    }

    #[test]
    fn test_unrelated_types() {
        let left = person();
        let right = left.address.clone();
        let difference = strict().get_difference(&left, &right).unwrap().unwrap();
        assert!(difference.message().contains("Person"));
        assert!(difference.message().contains("Address"));

        let numbers = vec![1];
        let difference = strict().get_difference(&left, &numbers).unwrap().unwrap();
        assert!(difference.message().starts_with("Different types."));
    }

    struct Named(&'static str, String);

    impl Reflect for Named {
        fn reflect(&self) -> Reflected<'_> {
            Reflected::Object(Object::new(self.0).field("value", &self.1))
        }
    }

    struct Renamed(&'static str, String);

    impl Reflect for Renamed {
        fn reflect(&self) -> Reflected<'_> {
            Reflected::Object(Object::new(self.0).field("other", &self.1))
        }
    }

    #[test]
    fn test_missing_right_field() {
        let left = Named("shared", "a".to_string());
        let right = Renamed("shared", "a".to_string());
        let err = strict().get_difference(&left, &right).unwrap_err();
        assert!(matches!(err, ComparisonError::FieldAccess { field, .. } if field == "value"));
    }

    #[test]
    fn test_ignore_defaults_on_fields() {
        let comparator = ReflectionComparator::with_modes(&[ComparatorMode::IgnoreDefaults]).unwrap();
        let mut left = person();
        left.age = 0;
        left.address.number = 0;
        let right = person();
        assert!(comparator.is_equal(&left, &right).unwrap());
        assert!(!comparator.is_equal(&right, &left).unwrap());
    }
}

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

use crate::comparator::Operand;
use crate::error::{ComparisonError, ComparisonResult};
use crate::path::{Key, PropertyPath};
use crate::reflect::{Reflect, Reflected};

/// Values selected by a `[*]` projection, compared as a sequence.
#[derive(Debug)]
pub(crate) struct Projection<'a>(Vec<&'a dyn Reflect>);

impl<'a> Reflect for Projection<'a> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.0.clone())
    }
}

/// A resolved property.
#[derive(Debug)]
pub(crate) enum Property<'a> {
    Value(&'a dyn Reflect),
    Projection(Projection<'a>),
}

impl<'a> Property<'a> {
    pub(crate) fn as_reflect(&self) -> &dyn Reflect {
        match self {
            Property::Value(value) => *value,
            Property::Projection(projection) => projection,
        }
    }
}

/// Resolves `path` on `root`.
///
/// Fields are looked up on objects, and on maps with string keys. After a
/// `[*]` every following key applies to each selected element.
pub(crate) fn resolve<'a>(root: &'a dyn Reflect, path: &str) -> ComparisonResult<Property<'a>> {
    let parsed = path.property_path()?;
    let mut current = vec![root];
    let mut projected = false;

    for key in parsed.keys() {
        let mut next = Vec::with_capacity(current.len());
        for value in current {
            let operand = Operand::resolve(value);
            match key {
                Key::Field(name) => next.push(field(&operand, name, path)?),
                Key::Idx(index) => {
                    let element = elements(&operand, path)?.get(*index).copied().ok_or_else(|| {
                        not_found(path, format!("index {} out of bounds", index))
                    })?;
                    next.push(element);
                }
                Key::WildcardArray => {
                    projected = true;
                    next.extend_from_slice(elements(&operand, path)?);
                }
                Key::Entry(_) => {
                    return Err(not_found(path, "map entries cannot be selected".to_string()))
                }
            }
        }
        current = next;
    }

    tracing::trace!(path, selected = current.len(), projected, "resolved property");
    if projected {
        return Ok(Property::Projection(Projection(current)));
    }
    match current.first() {
        Some(value) => Ok(Property::Value(*value)),
        None => Err(not_found(path, "nothing selected".to_string())),
    }
}

fn field<'a>(operand: &Operand<'a>, name: &str, path: &str) -> ComparisonResult<&'a dyn Reflect> {
    match operand.reflected() {
        Reflected::Object(object) => object.get(name).ok_or_else(|| {
            not_found(
                path,
                format!("{} has no field {}", operand.type_name(), name),
            )
        }),
        Reflected::Map(entries) => entries
            .iter()
            .find(|(key, _)| {
                matches!(Operand::resolve(*key).reflected(), Reflected::Str(key) if *key == name)
            })
            .map(|(_, value)| *value)
            .ok_or_else(|| not_found(path, format!("no entry {}", name))),
        Reflected::Null => Err(not_found(path, format!("null value before {}", name))),
        _ => Err(not_found(
            path,
            format!("{} has no fields", operand.type_name()),
        )),
    }
}

fn elements<'o, 'a>(
    operand: &'o Operand<'a>,
    path: &str,
) -> ComparisonResult<&'o [&'a dyn Reflect]> {
    operand
        .reflected()
        .elements()
        .ok_or_else(|| not_found(path, format!("{} is not a collection", operand.type_name())))
}

fn not_found(path: &str, reason: String) -> ComparisonError {
    ComparisonError::PropertyNotFound {
        path: path.to_string(),
        reason,
    }
}

#[cfg(test)]
mod test {
    use serde_json::json;

    use super::*;
    use crate::reflect_object;

    struct Line {
        amount: u32,
    }

    reflect_object!(Line { amount });

    struct Order {
        id: u8,
        lines: Vec<Line>,
        note: Option<String>,
    }

    reflect_object!(Order { id, lines, note });

    fn order() -> Order {
        Order {
            id: 7,
            lines: vec![Line { amount: 10 }, Line { amount: 20 }],
            note: None,
        }
    }

    fn rendered(property: &Property<'_>) -> String {
        property.as_reflect().to_string()
    }

    #[test]
    fn test_fields_and_indexes() {
        let order = order();
        assert_eq!(rendered(&resolve(&order, "id").unwrap()), "7");
        assert_eq!(rendered(&resolve(&order, "lines[1].amount").unwrap()), "20");
        assert_eq!(rendered(&resolve(&order, "note").unwrap()), "null");
    }

    #[test]
    fn test_projection() {
        let orders = vec![order(), order()];
        let property = resolve(&orders, "[*].lines[*].amount").unwrap();
        assert!(matches!(property, Property::Projection(_)));
        assert_eq!(rendered(&property), "[10, 20, 10, 20]");
    }

    #[test]
    fn test_json_fields() {
        let value = json!({ "address": { "city": "Paris" } });
        assert_eq!(rendered(&resolve(&value, "address.city").unwrap()), "\"Paris\"");
    }

    #[test]
    fn test_not_found() {
        let order = order();
        for path in ["missing", "lines[5]", "id.value", "note.text", "id[0]"] {
            let err = resolve(&order, path).unwrap_err();
            assert!(
                matches!(err, ComparisonError::PropertyNotFound { path: ref found, .. } if found == path),
                "{} should not resolve",
                path
            );
        }

        let err = resolve(&order, "lines[").unwrap_err();
        assert!(matches!(err, ComparisonError::InvalidPath { .. }));
    }
}

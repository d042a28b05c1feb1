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

mod impls;

use std::fmt;

use crate::format::Render;

/// A value that can be compared structurally.
///
/// Implementations describe the value as a borrowed [`Reflected`] view. Child
/// values (fields, elements, map entries) are handed out as references into
/// `self`, which is what lets the comparator track instances by address and
/// terminate on cyclic graphs.
///
/// Structs usually implement it through [`reflect_object!`](crate::reflect_object).
pub trait Reflect {
    /// Returns the view of this value the comparator works on.
    fn reflect(&self) -> Reflected<'_>;

    /// Runtime type name, used in type mismatch messages and instance identity.
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

impl fmt::Debug for dyn Reflect + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Render::new(self))
    }
}

impl fmt::Display for dyn Reflect + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", Render::new(self))
    }
}

/// Borrowed description of a value.
#[derive(Debug, Clone)]
pub enum Reflected<'a> {
    Null,
    Bool(bool),
    Char(char),
    Number(Number),
    Str(&'a str),
    /// An instant, in nanoseconds since the UNIX epoch.
    Date(i128),
    /// Ordered collection: the position of an element is significant.
    Seq(Vec<&'a dyn Reflect>),
    /// Collection without a meaningful iteration order.
    Set(Vec<&'a dyn Reflect>),
    Map(Vec<(&'a dyn Reflect, &'a dyn Reflect)>),
    Object(Object<'a>),
    /// A holder standing in for another value (smart pointers, lazy cells,
    /// proxies). The comparator always looks through it.
    Proxy(&'a dyn Reflect),
}

impl<'a> Reflected<'a> {
    pub fn is_null(&self) -> bool {
        matches!(self, Reflected::Null)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Reflected::Bool(_)
                | Reflected::Char(_)
                | Reflected::Number(_)
                | Reflected::Str(_)
                | Reflected::Date(_)
        )
    }

    pub fn is_date(&self) -> bool {
        matches!(self, Reflected::Date(_))
    }

    pub fn is_collection(&self) -> bool {
        matches!(self, Reflected::Seq(_) | Reflected::Set(_))
    }

    /// Elements of a collection, `None` for any other kind.
    pub fn elements(&self) -> Option<&[&'a dyn Reflect]> {
        match self {
            Reflected::Seq(elements) | Reflected::Set(elements) => Some(elements),
            _ => None,
        }
    }

    /// Whether the value is what an unset field would hold: null, `false`,
    /// `'\0'` or zero.
    pub fn is_default(&self) -> bool {
        match self {
            Reflected::Null => true,
            Reflected::Bool(value) => !value,
            Reflected::Char(value) => *value == '\0',
            Reflected::Number(number) => number.is_zero(),
            _ => false,
        }
    }
}

/// A numeric scalar. Numbers compare by value, whatever their width.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Int(i128),
    UInt(u128),
    Float(f64),
}

impl Number {
    pub fn is_zero(&self) -> bool {
        match *self {
            Number::Int(value) => value == 0,
            Number::UInt(value) => value == 0,
            Number::Float(value) => value == 0.0,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(value) => value as f64,
            Number::UInt(value) => value as f64,
            Number::Float(value) => value,
        }
    }

    /// Value equality across representations. `NaN` equals `NaN`.
    pub fn same_value(&self, other: &Number) -> bool {
        match (*self, *other) {
            (Number::Int(a), Number::Int(b)) => a == b,
            (Number::UInt(a), Number::UInt(b)) => a == b,
            (Number::Int(a), Number::UInt(b)) | (Number::UInt(b), Number::Int(a)) => {
                u128::try_from(a).is_ok_and(|a| a == b)
            }
            (Number::Float(a), Number::Float(b)) => a == b || (a.is_nan() && b.is_nan()),
            (Number::Int(a), Number::Float(b)) | (Number::Float(b), Number::Int(a)) => {
                integral(b, -I128_BOUND, I128_BOUND).is_some_and(|b| b as i128 == a)
            }
            (Number::UInt(a), Number::Float(b)) | (Number::Float(b), Number::UInt(a)) => {
                integral(b, 0.0, U128_BOUND).is_some_and(|b| b as u128 == a)
            }
        }
    }
}

/// 2^127 and 2^128, exactly representable as `f64`.
const I128_BOUND: f64 = 170141183460469231731687303715884105728.0;
const U128_BOUND: f64 = 340282366920938463463374607431768211456.0;

/// The float when it holds a whole number in `[min, max)`, so that the
/// integer cast is exact.
fn integral(value: f64, min: f64, max: f64) -> Option<f64> {
    (value.fract() == 0.0 && value >= min && value < max).then_some(value)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Int(value) => write!(f, "{}", value),
            Number::UInt(value) => write!(f, "{}", value),
            Number::Float(value) => write!(f, "{}", value),
        }
    }
}

/// A value compared field by field.
///
/// Fields are kept in declaration order. An object may extend a parent part
/// (the Rust stand-in for a superclass): its fields come after the object's
/// own fields, and its type name makes the object assignable to the parent
/// type.
#[derive(Debug, Clone)]
pub struct Object<'a> {
    type_name: &'static str,
    fields: Vec<(&'static str, &'a dyn Reflect)>,
    parent: Option<Box<Object<'a>>>,
}

impl<'a> Object<'a> {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: vec![],
            parent: None,
        }
    }

    /// Registers the next field. Unregistered fields take no part in comparisons.
    pub fn field(mut self, name: &'static str, value: &'a dyn Reflect) -> Self {
        self.fields.push((name, value));
        self
    }

    /// Sets the parent part. `parent` must reflect as an object, possibly
    /// behind proxies; anything else is ignored.
    pub fn extends(mut self, parent: &'a dyn Reflect) -> Self {
        let mut current = parent.reflect();
        loop {
            match current {
                Reflected::Proxy(inner) => current = inner.reflect(),
                Reflected::Object(object) => {
                    self.parent = Some(Box::new(object));
                    break;
                }
                _ => {
                    tracing::warn!(
                        object = self.type_name,
                        parent = parent.type_name(),
                        "parent part does not reflect as an object, ignoring it"
                    );
                    break;
                }
            }
        }
        self
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn parent(&self) -> Option<&Object<'a>> {
        self.parent.as_deref()
    }

    /// Fields of this object followed by the fields of its parent chain.
    pub fn all_fields(&self) -> Vec<(&'static str, &'a dyn Reflect)> {
        let mut fields = self.fields.clone();
        let mut parent = self.parent();
        while let Some(current) = parent {
            fields.extend(current.fields.iter().copied());
            parent = current.parent();
        }
        fields
    }

    /// Looks a field up by name, own fields first.
    pub fn get(&self, name: &str) -> Option<&'a dyn Reflect> {
        let mut current = Some(self);
        while let Some(object) = current {
            if let Some((_, value)) = object.fields.iter().find(|(field, _)| *field == name) {
                return Some(*value);
            }
            current = object.parent();
        }
        None
    }

    /// Whether `other` is of this object's type or extends it.
    pub fn is_assignable_from(&self, other: &Object<'_>) -> bool {
        let mut current = Some(other);
        while let Some(object) = current {
            if object.type_name == self.type_name {
                return true;
            }
            current = object.parent();
        }
        false
    }
}

/// Implements [`Reflect`] for a struct by registering its fields.
///
/// Listed fields are compared in the given order; fields left out are ignored.
/// A leading `..field` names a field holding the parent part, whose own fields
/// are compared after the listed ones.
///
/// ```
/// use reflect_assert::reflect_object;
///
/// struct Employee {
///     name: String,
///     salary: u32,
/// }
///
/// struct Manager {
///     base: Employee,
///     reports: Vec<String>,
///     cache: Option<String>,
/// }
///
/// reflect_object!(Employee { name, salary });
/// reflect_object!(Manager { ..base, reports });
/// ```
#[macro_export]
macro_rules! reflect_object {
    ($ty:ty { ..$parent:ident $(, $field:ident)* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn reflect(&self) -> $crate::Reflected<'_> {
                $crate::Reflected::Object(
                    $crate::Object::new(::std::any::type_name::<Self>())
                        $(.field(stringify!($field), &self.$field))*
                        .extends(&self.$parent),
                )
            }
        }
    };
    ($ty:ty { $($field:ident),* $(,)? }) => {
        impl $crate::Reflect for $ty {
            fn reflect(&self) -> $crate::Reflected<'_> {
                $crate::Reflected::Object(
                    $crate::Object::new(::std::any::type_name::<Self>())
                        $(.field(stringify!($field), &self.$field))*,
                )
            }
        }
    };
}

#[cfg(test)]
mod test {
    use super::*;

    struct Point {
        x: i32,
        y: i32,
        label: String,
    }

    reflect_object!(Point { x, y });

    struct Pixel {
        point: Point,
        color: u32,
    }

    reflect_object!(Pixel { ..point, color });

    #[test]
    fn test_object_fields_in_declaration_order() {
        let point = Point {
            x: 1,
            y: 2,
            label: "ignored".to_string(),
        };
        let Reflected::Object(object) = point.reflect() else {
            panic!("expected an object");
        };

        let names: Vec<_> = object.all_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["x", "y"]);
        assert!(object.get("label").is_none());
        assert_eq!(point.label, "ignored");
    }

    #[test]
    fn test_parent_fields_come_last() {
        let pixel = Pixel {
            point: Point {
                x: 1,
                y: 2,
                label: String::new(),
            },
            color: 7,
        };
        let Reflected::Object(object) = pixel.reflect() else {
            panic!("expected an object");
        };

        let names: Vec<_> = object.all_fields().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, vec!["color", "x", "y"]);
        assert!(object.get("x").is_some());

        let Reflected::Object(parent) = pixel.point.reflect() else {
            panic!("expected an object");
        };
        assert!(parent.is_assignable_from(&object));
        assert!(!object.is_assignable_from(&parent));
    }

    #[test]
    fn test_defaults() {
        assert!(Reflected::Null.is_default());
        assert!(Reflected::Bool(false).is_default());
        assert!(Reflected::Char('\0').is_default());
        assert!(Reflected::Number(Number::Float(0.0)).is_default());
        assert!(!Reflected::Number(Number::Int(3)).is_default());
        assert!(!Reflected::Str("").is_default());
        assert!(!Reflected::Seq(vec![]).is_default());
    }

    #[test]
    fn test_number_same_value() {
        assert!(Number::Int(1).same_value(&Number::UInt(1)));
        assert!(Number::Int(1).same_value(&Number::Float(1.0)));
        assert!(!Number::Int(-1).same_value(&Number::UInt(u128::MAX)));
        assert!(Number::Float(f64::NAN).same_value(&Number::Float(f64::NAN)));
        assert!(!Number::Float(0.5).same_value(&Number::Int(0)));
    }

    #[test]
    fn test_large_integers_against_floats() {
        let float = Number::Float(9007199254740992.0);
        assert!(Number::Int(9007199254740992).same_value(&float));
        assert!(!Number::Int(9007199254740993).same_value(&float));
        assert!(!float.same_value(&Number::UInt(9007199254740993)));
        assert!(!Number::UInt(u128::MAX).same_value(&Number::Float(f64::INFINITY)));
        assert!(!Number::Int(0).same_value(&Number::Float(f64::NAN)));
    }
}

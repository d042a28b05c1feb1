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

//! Human and machine readable output for differences.

use std::fmt;

use chrono::{DateTime, SecondsFormat};
use serde::Serialize;

use crate::difference::Difference;
use crate::path::{Key, Path};
use crate::reflect::{Reflect, Reflected};

/// Nesting rendered before values are elided. Keeps cyclic values finite.
const MAX_RENDER_DEPTH: usize = 4;

const NANOS_PER_SECOND: i128 = 1_000_000_000;

pub trait Indent {
    fn indent(&self, level: u32) -> String;
}

impl<T> Indent for T
where
    T: ToString,
{
    fn indent(&self, level: u32) -> String {
        let mut indent = String::new();
        for _ in 0..level {
            indent.push(' ');
        }

        self.to_string()
            .lines()
            .map(|line| format!("{}{}", indent, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Depth-limited rendering of a reflected value.
pub(crate) struct Render<'r> {
    value: &'r dyn Reflect,
}

impl<'r> Render<'r> {
    pub(crate) fn new(value: &'r dyn Reflect) -> Self {
        Self { value }
    }

    fn write(f: &mut fmt::Formatter<'_>, value: &dyn Reflect, depth: usize) -> fmt::Result {
        let reflected = value.reflect();
        if depth >= MAX_RENDER_DEPTH && !reflected.is_scalar() && !reflected.is_null() {
            return write!(f, "...");
        }

        match reflected {
            Reflected::Null => write!(f, "null"),
            Reflected::Bool(value) => write!(f, "{}", value),
            Reflected::Char(value) => write!(f, "{:?}", value),
            Reflected::Number(number) => write!(f, "{}", number),
            Reflected::Str(value) => write!(f, "{:?}", value),
            Reflected::Date(nanos) => write_date(f, nanos),
            Reflected::Seq(elements) | Reflected::Set(elements) => {
                write!(f, "[")?;
                for (index, element) in elements.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    Self::write(f, *element, depth + 1)?;
                }
                write!(f, "]")
            }
            Reflected::Map(entries) => {
                write!(f, "{{")?;
                for (index, (key, value)) in entries.iter().enumerate() {
                    if index > 0 {
                        write!(f, ", ")?;
                    }
                    Self::write(f, *key, depth + 1)?;
                    write!(f, ": ")?;
                    Self::write(f, *value, depth + 1)?;
                }
                write!(f, "}}")
            }
            Reflected::Object(object) => {
                write!(f, "{} {{", short_type_name(object.type_name()))?;
                for (index, (name, value)) in object.all_fields().into_iter().enumerate() {
                    write!(f, "{}{}: ", if index > 0 { ", " } else { " " }, name)?;
                    Self::write(f, value, depth + 1)?;
                }
                write!(f, " }}")
            }
            Reflected::Proxy(inner) => Self::write(f, inner, depth),
        }
    }
}

impl<'r> fmt::Display for Render<'r> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Self::write(f, self.value, 0)
    }
}

fn write_date(f: &mut fmt::Formatter<'_>, nanos: i128) -> fmt::Result {
    let seconds = i64::try_from(nanos.div_euclid(NANOS_PER_SECOND)).ok();
    let subsec = u32::try_from(nanos.rem_euclid(NANOS_PER_SECOND)).ok();
    match seconds
        .zip(subsec)
        .and_then(|(seconds, subsec)| DateTime::from_timestamp(seconds, subsec))
    {
        Some(date) => write!(f, "{}", date.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => write!(f, "{}ns", nanos),
    }
}

/// `alloc::vec::Vec<my::Point>` becomes `Vec`, `my::Point` becomes `Point`.
fn short_type_name(type_name: &str) -> &str {
    let base = type_name.split('<').next().unwrap_or(type_name);
    base.rsplit("::").next().unwrap_or(base)
}

/// One mismatch of a difference tree, flattened for reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DifferenceEntry {
    pub path: String,
    pub message: String,
    pub left: String,
    pub right: String,
}

impl DifferenceEntry {
    fn new(path: &Path<'_>, message: impl Into<String>, left: String, right: String) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
            left,
            right,
        }
    }
}

impl fmt::Display for DifferenceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}: {}", self.path, self.message)?;
        writeln!(f, "{}", format!("left:  {}", self.left).indent(2))?;
        write!(f, "{}", format!("right: {}", self.right).indent(2))
    }
}

const MISSING: &str = "<missing>";

/// Flattens a difference tree into one entry per leaf mismatch, in tree order.
///
/// Unordered collections get an entry of their own followed, when detailed,
/// by a hint and the differences of every best matching pair.
pub fn entries(difference: &Difference<'_>) -> Vec<DifferenceEntry> {
    let mut entries = vec![];
    collect(difference, &Path::Root, &mut entries);
    entries
}

fn render(value: &dyn Reflect) -> String {
    Render::new(value).to_string()
}

fn collect(difference: &Difference<'_>, path: &Path<'static>, entries: &mut Vec<DifferenceEntry>) {
    match difference {
        Difference::Value(value) => entries.push(DifferenceEntry::new(
            path,
            value.message(),
            render(value.left_value()),
            render(value.right_value()),
        )),
        Difference::Object(object) => {
            for (field, child) in object.field_differences() {
                collect(child, &path.append(Key::Field(*field)), entries);
            }
        }
        Difference::Collection(collection) => {
            for (index, child) in collection.element_differences() {
                collect(child, &path.append(Key::Idx(*index)), entries);
            }
        }
        Difference::Map(map) => {
            for (key, child) in map.value_differences() {
                collect(child, &path.append(Key::Entry(render(*key))), entries);
            }
            for (key, value) in map.right_missing_keys() {
                entries.push(DifferenceEntry::new(
                    &path.append(Key::Entry(render(*key))),
                    "Key missing on the right.",
                    render(*value),
                    MISSING.to_string(),
                ));
            }
            for (key, value) in map.left_missing_keys() {
                entries.push(DifferenceEntry::new(
                    &path.append(Key::Entry(render(*key))),
                    "Key missing on the left.",
                    MISSING.to_string(),
                    render(*value),
                ));
            }
        }
        Difference::UnorderedCollection(unordered) => {
            entries.push(DifferenceEntry::new(
                path,
                difference.message(),
                render(difference.left_value()),
                render(difference.right_value()),
            ));

            let left = difference.left_value().reflect();
            let right = difference.right_value().reflect();
            let (Some(left), Some(right)) = (element_values(&left), element_values(&right)) else {
                return;
            };
            for (left_index, right_index) in unordered.best_matching_indexes() {
                let element_path = path.append(Key::Idx(*left_index));
                let (Some(left_element), Some(right_element)) =
                    (left.get(*left_index), right.get(*right_index))
                else {
                    continue;
                };
                entries.push(DifferenceEntry::new(
                    &element_path,
                    format!("Best match is right element [{}].", right_index),
                    render(*left_element),
                    render(*right_element),
                ));
                if let Some(child) = unordered.element_difference(*left_index, *right_index) {
                    collect(child, &element_path, entries);
                }
            }
        }
    }
}

/// Elements of a collection, looking through proxies.
fn element_values<'v>(reflected: &Reflected<'v>) -> Option<Vec<&'v dyn Reflect>> {
    match reflected {
        Reflected::Proxy(inner) => element_values(&inner.reflect()),
        other => other.elements().map(<[_]>::to_vec),
    }
}

impl<'a> fmt::Display for Difference<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = entries(self);
        write!(f, "{}", self.message())?;
        for entry in entries {
            write!(f, "\n\n{}", entry)?;
        }
        Ok(())
    }
}

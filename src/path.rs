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

use regex::Regex;
use std::fmt;

use crate::error::{ComparisonError, ComparisonResult};

/// Location of a value inside a compared value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path<'a> {
    Root,
    Keys(Vec<Key<'a>>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key<'a> {
    Field(&'a str),
    Idx(usize),
    /// Every element of a collection.
    WildcardArray,
    /// A map entry, by its rendered key.
    Entry(String),
}

// FromStr would not let the keys borrow from the parsed string
pub trait PropertyPath {
    fn property_path(&self) -> ComparisonResult<Path<'_>>;
}

impl PropertyPath for str {
    fn property_path(&self) -> ComparisonResult<Path<'_>> {
        Path::from_property_path(self)
    }
}

impl<'a> fmt::Display for Key<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Key::Field(name) => write!(f, ".{}", name),
            Key::Idx(idx) => write!(f, "[{}]", idx),
            Key::WildcardArray => write!(f, "[*]"),
            Key::Entry(key) => write!(f, "{{{}}}", key),
        }
    }
}

impl<'a> Path<'a> {
    pub(crate) fn append(&self, next: Key<'a>) -> Path<'a> {
        match self {
            Path::Root => Path::Keys(vec![next]),
            Path::Keys(list) => {
                let mut copy = list.clone();
                copy.push(next);
                Path::Keys(copy)
            }
        }
    }

    pub fn keys(&self) -> &[Key<'a>] {
        match self {
            Path::Root => &[],
            Path::Keys(keys) => keys,
        }
    }

    /// Parses a property path such as `address.city`, `lines[0].amount` or
    /// `[*].name`.
    pub fn from_property_path(path: &'a str) -> ComparisonResult<Self> {
        let re = Regex::new(
            r"^([a-zA-Z_][a-zA-Z0-9_]*|\[(\d+|\*)\])(\.[a-zA-Z_][a-zA-Z0-9_]*|\[(\d+|\*)\])*$",
        )
        .map_err(|err| ComparisonError::InvalidPath {
            path: path.to_string(),
            reason: err.to_string(),
        })?;

        if !re.is_match(path) {
            return Err(ComparisonError::InvalidPath {
                path: path.to_string(),
                reason: "expected field names and [index] or [*] selectors".to_string(),
            });
        }

        let mut keys = Vec::new();
        for segment in path
            .split(|c| c == '.' || c == '[')
            .filter(|segment| !segment.is_empty())
        {
            keys.push(Self::parse_token(path, segment)?);
        }

        Ok(Path::Keys(keys))
    }

    fn parse_token(path: &str, token: &'a str) -> ComparisonResult<Key<'a>> {
        let Some(selector) = token.strip_suffix(']') else {
            return Ok(Key::Field(token));
        };

        if selector == "*" {
            return Ok(Key::WildcardArray);
        }

        selector
            .parse::<usize>()
            .map(Key::Idx)
            .map_err(|err| ComparisonError::InvalidPath {
                path: path.to_string(),
                reason: format!("index {}: {}", selector, err),
            })
    }
}

impl<'a> fmt::Display for Path<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Path::Root => write!(f, "(root)"),
            Path::Keys(keys) => {
                for key in keys {
                    write!(f, "{}", key)?;
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_property_path() {
        let path: Path = "address.city".property_path().unwrap();
        assert_eq!(
            path,
            Path::Keys(vec![Key::Field("address"), Key::Field("city")])
        );

        let path = "lines[0].amount".property_path().unwrap();
        assert_eq!(
            path,
            Path::Keys(vec![Key::Field("lines"), Key::Idx(0), Key::Field("amount")])
        );

        let path = "[*].name".property_path().unwrap();
        assert_eq!(path, Path::Keys(vec![Key::WildcardArray, Key::Field("name")]));

        let path = "orders[12][*].lines[*]".property_path().unwrap();
        assert_eq!(
            path,
            Path::Keys(vec![
                Key::Field("orders"),
                Key::Idx(12),
                Key::WildcardArray,
                Key::Field("lines"),
                Key::WildcardArray,
            ])
        );
    }

    #[test]
    fn test_property_path_validation() {
        assert!("a.b.c".property_path().is_ok());
        assert!("a_1.b".property_path().is_ok());

        for invalid in ["", ".a", "a.", "a..b", "a[", "a[]", "a[1:2]", "1a", "a.*", "$.a"] {
            let err = invalid.property_path().unwrap_err();
            assert!(
                matches!(err, ComparisonError::InvalidPath { ref path, .. } if path == invalid),
                "{} should be rejected",
                invalid
            );
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(Path::Root.to_string(), "(root)");

        let path = Path::Root
            .append(Key::Field("lines"))
            .append(Key::Idx(2))
            .append(Key::Entry("\"total\"".to_string()))
            .append(Key::WildcardArray);
        assert_eq!(path.to_string(), ".lines[2]{\"total\"}[*]");
        assert_eq!(path.keys().len(), 4);
    }
}

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

//! Error types for comparisons and assertions.
//!
//! A mismatch between two values is never an error: it is returned as a
//! [`Difference`](crate::Difference). The errors below signal a misuse of the
//! comparator or an inconsistent [`Reflect`](crate::Reflect) implementation.

use thiserror::Error;

use crate::comparator::ComparatorMode;

/// Fatal conditions raised while building or running a comparator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ComparisonError {
    /// The same mode was given more than once.
    #[error("comparator mode {0:?} specified more than once")]
    DuplicateMode(ComparatorMode),

    /// None of the registered comparators accepted the pair.
    #[error("no comparator found for values of type {left} and {right}")]
    NoComparator { left: String, right: String },

    /// A field announced by the left object could not be read on the right one.
    #[error("unable to read field {field} on a value of type {type_name}")]
    FieldAccess { type_name: String, field: String },

    /// The property path could not be parsed.
    #[error("invalid property path {path}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// The property path does not lead to a value.
    #[error("property {path} not found: {reason}")]
    PropertyNotFound { path: String, reason: String },
}

/// Outcome of a failed assertion.
#[derive(Error, Debug)]
pub enum AssertionError {
    /// The values are not equal; the report describes every difference found.
    #[error("{report}")]
    Mismatch { report: String },

    /// The comparison itself could not be carried out.
    #[error(transparent)]
    Comparison(#[from] ComparisonError),
}

/// Convenience alias for comparator results.
pub type ComparisonResult<T> = Result<T, ComparisonError>;

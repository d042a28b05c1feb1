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

/// Treats two dates as equal when both have a value or both are null.
#[derive(Debug)]
pub struct LenientDatesComparator;

impl Comparator for LenientDatesComparator {
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool {
        (left.is_date() || left.is_null())
            && (right.is_date() || right.is_null())
            && (left.is_date() || right.is_date())
    }

    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        _only_first_difference: bool,
        _session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        if left.reflected().is_null() == right.reflected().is_null() {
            return Ok(None);
        }
        Ok(Some(Difference::value(
            "Lenient dates, but not both value or both null.",
            left.value(),
            right.value(),
        )))
    }
}

/// Ignores the pair when the left value is a default value.
#[derive(Debug)]
pub struct IgnoreDefaultsComparator;

impl Comparator for IgnoreDefaultsComparator {
    fn can_compare(&self, left: &Reflected<'_>, _right: &Reflected<'_>) -> bool {
        left.is_default()
    }

    fn compare<'a>(
        &self,
        _left: &Operand<'a>,
        _right: &Operand<'a>,
        _only_first_difference: bool,
        _session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        Ok(None)
    }
}

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

mod collection;
mod lenient;
mod map;
mod object;
mod simple;

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::fmt;

use serde::{Deserialize, Serialize};

pub use collection::{CollectionComparator, LenientOrderCollectionComparator};
pub use lenient::{IgnoreDefaultsComparator, LenientDatesComparator};
pub use map::MapComparator;
pub use object::ObjectComparator;
pub use simple::SimpleCasesComparator;

use crate::difference::Difference;
use crate::error::{ComparisonError, ComparisonResult};
use crate::reflect::{Reflect, Reflected};

/// Leniency applied by a comparator.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ComparatorMode {
    /// Collections are equal when some ordering of the right elements matches
    /// the left ones.
    LenientOrder,
    /// A default left value (null, `false`, `'\0'`, zero) matches any right value.
    IgnoreDefaults,
    /// Dates are equal when both have a value or both are null.
    LenientDates,
}

/// Configuration for how values should be compared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    modes: Vec<ComparatorMode>,
}

impl Config {
    /// Create a new strict [`Config`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Ignores collection order and default values.
    pub fn lenient() -> Self {
        Self::new()
            .mode(ComparatorMode::LenientOrder)
            .mode(ComparatorMode::IgnoreDefaults)
    }

    /// Add a comparator mode.
    pub fn mode(mut self, mode: ComparatorMode) -> Self {
        self.modes.push(mode);
        self
    }

    /// Add several comparator modes.
    pub fn modes(mut self, modes: &[ComparatorMode]) -> Self {
        self.modes.extend_from_slice(modes);
        self
    }

    pub fn has_mode(&self, mode: ComparatorMode) -> bool {
        self.modes.contains(&mode)
    }

    fn validate(&self) -> ComparisonResult<()> {
        let mut seen = HashSet::new();
        for mode in &self.modes {
            if !seen.insert(*mode) {
                return Err(ComparisonError::DuplicateMode(*mode));
            }
        }
        Ok(())
    }
}

/// A strategy for comparing one category of values.
///
/// The root [`ReflectionComparator`] asks its strategies in order whether they
/// can compare a pair; the first one that can does the comparison, and uses
/// the given [`Session`] for every nested value.
pub trait Comparator: fmt::Debug {
    /// Whether this comparator handles the pair. Must not have side effects.
    fn can_compare(&self, left: &Reflected<'_>, right: &Reflected<'_>) -> bool;

    /// Compares the pair, `None` meaning equal. With `only_first_difference`
    /// the comparison stops at the first mismatch found.
    fn compare<'a>(
        &self,
        left: &Operand<'a>,
        right: &Operand<'a>,
        only_first_difference: bool,
        session: &Session<'_, 'a>,
    ) -> ComparisonResult<Option<Difference<'a>>>;
}

/// A compared value with its proxies looked through.
#[derive(Debug, Clone)]
pub struct Operand<'a> {
    value: &'a dyn Reflect,
    reflected: Reflected<'a>,
}

impl<'a> Operand<'a> {
    /// Follows proxies down to the real value.
    pub fn resolve(value: &'a dyn Reflect) -> Self {
        let mut value = value;
        loop {
            match value.reflect() {
                Reflected::Proxy(inner) => value = inner,
                reflected => return Self { value, reflected },
            }
        }
    }

    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }

    pub fn reflected(&self) -> &Reflected<'a> {
        &self.reflected
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    fn identity(&self) -> Identity {
        Identity {
            address: (self.value as *const dyn Reflect).cast::<()>() as usize,
            type_name: self.type_name(),
        }
    }
}

/// An instance: its address and its type, as a struct and its first field
/// share an address.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct Identity {
    address: usize,
    type_name: &'static str,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
struct PairKey {
    left: Identity,
    right: Identity,
}

/// Compares values structurally using an ordered chain of [`Comparator`]s.
///
/// # Examples
///
/// ```
/// use reflect_assert::{ComparatorMode, Config, ReflectionComparator};
///
/// let comparator = ReflectionComparator::new(&Config::new().mode(ComparatorMode::LenientOrder))?;
/// assert!(comparator.is_equal(&vec![1, 2], &vec![2, 1])?);
/// # Ok::<(), reflect_assert::ComparisonError>(())
/// ```
#[derive(Debug)]
pub struct ReflectionComparator {
    config: Config,
    comparators: Vec<Box<dyn Comparator>>,
}

impl ReflectionComparator {
    /// Builds the comparator chain for the configured modes.
    ///
    /// Fails when a mode is given more than once.
    pub fn new(config: &Config) -> ComparisonResult<Self> {
        config.validate()?;

        let mut comparators: Vec<Box<dyn Comparator>> = vec![];
        if config.has_mode(ComparatorMode::LenientDates) {
            comparators.push(Box::new(LenientDatesComparator));
        }
        if config.has_mode(ComparatorMode::IgnoreDefaults) {
            comparators.push(Box::new(IgnoreDefaultsComparator));
        }
        comparators.push(Box::new(SimpleCasesComparator));
        if !config.has_mode(ComparatorMode::LenientOrder) {
            comparators.push(Box::new(CollectionComparator));
        }
        comparators.push(Box::new(LenientOrderCollectionComparator));
        comparators.push(Box::new(MapComparator));
        comparators.push(Box::new(ObjectComparator));

        tracing::debug!(modes = ?config.modes, chain = ?comparators, "built comparator chain");

        Ok(Self {
            config: config.clone(),
            comparators,
        })
    }

    /// Shorthand for a comparator using the given modes.
    pub fn with_modes(modes: &[ComparatorMode]) -> ComparisonResult<Self> {
        Self::new(&Config::new().modes(modes))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Compares two type-erased values in a fresh session.
    pub fn compare<'a>(
        &self,
        left: &'a dyn Reflect,
        right: &'a dyn Reflect,
        only_first_difference: bool,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        Session::new(self).difference(left, right, only_first_difference)
    }

    /// Returns the first difference found, `None` if the values are equal.
    pub fn get_difference<'a, L: Reflect, R: Reflect>(
        &self,
        left: &'a L,
        right: &'a R,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        self.compare(left, right, true)
    }

    /// Returns every difference between the values, `None` if they are equal.
    pub fn get_all_differences<'a, L: Reflect, R: Reflect>(
        &self,
        left: &'a L,
        right: &'a R,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        self.compare(left, right, false)
    }

    pub fn is_equal<L: Reflect, R: Reflect>(&self, left: &L, right: &R) -> ComparisonResult<bool> {
        Ok(self.get_difference(left, right)?.is_none())
    }
}

const SETTLED: usize = usize::MAX;

/// State of one top-level comparison.
///
/// Results are memoized per pair of instances. A pair that is still being
/// compared counts as equal when it is reached again, which is what ends the
/// recursion on cyclic graphs. An equal result that relied on such a pair is
/// only memoized once that pair has settled.
pub struct Session<'c, 'a> {
    comparator: &'c ReflectionComparator,
    memo: RefCell<HashMap<(PairKey, bool), Option<Difference<'a>>>>,
    /// Pairs being compared, with their depth in the comparison stack.
    running: RefCell<HashMap<PairKey, usize>>,
    /// Shallowest running pair assumed equal by the current comparison.
    assumed: Cell<usize>,
}

impl<'c, 'a> Session<'c, 'a> {
    fn new(comparator: &'c ReflectionComparator) -> Self {
        Self {
            comparator,
            memo: RefCell::new(HashMap::new()),
            running: RefCell::new(HashMap::new()),
            assumed: Cell::new(SETTLED),
        }
    }

    /// Compares two values with the root comparator chain.
    pub fn difference(
        &self,
        left: &'a dyn Reflect,
        right: &'a dyn Reflect,
        only_first_difference: bool,
    ) -> ComparisonResult<Option<Difference<'a>>> {
        let left = Operand::resolve(left);
        let right = Operand::resolve(right);

        if left.reflected().is_null() && right.reflected().is_null() {
            return Ok(None);
        }
        let key = PairKey {
            left: left.identity(),
            right: right.identity(),
        };
        if key.left == key.right {
            return Ok(None);
        }
        if let Some(depth) = self.running.borrow().get(&key).copied() {
            self.assumed.set(self.assumed.get().min(depth));
            tracing::trace!(
                left = left.type_name(),
                right = right.type_name(),
                "pair already being compared, assuming equal"
            );
            return Ok(None);
        }
        if let Some(result) = self.memo.borrow().get(&(key, only_first_difference)) {
            return Ok(result.clone());
        }

        let comparator = self
            .comparator
            .comparators
            .iter()
            .find(|comparator| comparator.can_compare(left.reflected(), right.reflected()))
            .ok_or_else(|| ComparisonError::NoComparator {
                left: left.type_name().to_string(),
                right: right.type_name().to_string(),
            })?;
        tracing::trace!(
            left = left.type_name(),
            right = right.type_name(),
            comparator = ?comparator,
            "comparing"
        );

        let depth = self.running.borrow().len();
        self.running.borrow_mut().insert(key, depth);
        let outer = self.assumed.replace(SETTLED);
        let result = comparator.compare(&left, &right, only_first_difference, self);
        self.running.borrow_mut().remove(&key);

        // assumptions on this pair or deeper ones are resolved by now
        let pending = match self.assumed.get() {
            assumed if assumed < depth => assumed,
            _ => SETTLED,
        };
        self.assumed.set(outer.min(pending));

        let result = result?;
        if result.is_some() || pending == SETTLED {
            self.memo
                .borrow_mut()
                .insert((key, only_first_difference), result.clone());
        }
        Ok(result)
    }

    /// Whether two values are equal under the session's modes.
    pub fn is_equal(&self, left: &'a dyn Reflect, right: &'a dyn Reflect) -> ComparisonResult<bool> {
        Ok(self.difference(left, right, true)?.is_none())
    }

    pub fn config(&self) -> &Config {
        &self.comparator.config
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_duplicate_modes_are_rejected() {
        let config = Config::new()
            .mode(ComparatorMode::LenientOrder)
            .mode(ComparatorMode::LenientOrder);
        let err = ReflectionComparator::new(&config).unwrap_err();
        assert_eq!(err, ComparisonError::DuplicateMode(ComparatorMode::LenientOrder));
    }

    #[test]
    fn test_chain_follows_modes() {
        let strict = ReflectionComparator::new(&Config::new()).unwrap();
        let names: Vec<_> = strict
            .comparators
            .iter()
            .map(|comparator| format!("{:?}", comparator))
            .collect();
        assert_eq!(
            names,
            vec![
                "SimpleCasesComparator",
                "CollectionComparator",
                "LenientOrderCollectionComparator",
                "MapComparator",
                "ObjectComparator",
            ]
        );

        let lenient = ReflectionComparator::with_modes(&[
            ComparatorMode::LenientOrder,
            ComparatorMode::IgnoreDefaults,
            ComparatorMode::LenientDates,
        ])
        .unwrap();
        let names: Vec<_> = lenient
            .comparators
            .iter()
            .map(|comparator| format!("{:?}", comparator))
            .collect();
        assert_eq!(
            names,
            vec![
                "LenientDatesComparator",
                "IgnoreDefaultsComparator",
                "SimpleCasesComparator",
                "LenientOrderCollectionComparator",
                "MapComparator",
                "ObjectComparator",
            ]
        );
    }

    #[test]
    fn test_proxies_are_resolved() {
        let value = Box::new(Some(5u8));
        let operand = Operand::resolve(&value);
        assert!(matches!(operand.reflected(), Reflected::Number(_)));
        assert_eq!(operand.type_name(), "u8");
    }

    #[test]
    fn test_same_instance_is_equal() {
        let comparator = ReflectionComparator::new(&Config::new()).unwrap();
        let value = vec![1.0f64, f64::NAN];
        assert!(comparator.is_equal(&value, &value).unwrap());
    }

    #[test]
    fn test_mode_names() {
        let json = serde_json::to_string(&ComparatorMode::LenientOrder).unwrap();
        assert_eq!(json, "\"LENIENT_ORDER\"");
        let mode: ComparatorMode = serde_json::from_str("\"IGNORE_DEFAULTS\"").unwrap();
        assert_eq!(mode, ComparatorMode::IgnoreDefaults);
    }
}

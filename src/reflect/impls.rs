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

use std::cell::OnceCell;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{DateTime, NaiveDateTime, TimeZone};
use serde_json::Value;

use super::{Number, Reflect, Reflected};

macro_rules! reflect_number {
    ($variant:ident as $repr:ty: $($t:ty),*) => {
        $(
            impl Reflect for $t {
                fn reflect(&self) -> Reflected<'_> {
                    Reflected::Number(Number::$variant(*self as $repr))
                }
            }
        )*
    };
}

reflect_number!(Int as i128: i8, i16, i32, i64, i128, isize);
reflect_number!(UInt as u128: u8, u16, u32, u64, u128, usize);
reflect_number!(Float as f64: f32, f64);

impl Reflect for bool {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Bool(*self)
    }
}

impl Reflect for char {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Char(*self)
    }
}

impl Reflect for str {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Str(self)
    }
}

impl Reflect for String {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Str(self.as_str())
    }
}

impl Reflect for () {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Null
    }
}

// Pointer-like holders forward to their target so that instance identity is
// the identity of the pointee.

impl<T: Reflect> Reflect for Option<T> {
    fn reflect(&self) -> Reflected<'_> {
        match self {
            Some(value) => Reflected::Proxy(value),
            None => Reflected::Null,
        }
    }
}

impl<T: Reflect> Reflect for &T {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Proxy(*self)
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Proxy(self.as_ref())
    }
}

impl<T: Reflect> Reflect for Rc<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Proxy(self.as_ref())
    }
}

impl<T: Reflect> Reflect for Arc<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Proxy(self.as_ref())
    }
}

impl<T: Reflect> Reflect for OnceCell<T> {
    fn reflect(&self) -> Reflected<'_> {
        match self.get() {
            Some(value) => Reflected::Proxy(value),
            None => Reflected::Null,
        }
    }
}

impl<T: Reflect> Reflect for [T] {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for VecDeque<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Seq(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<T: Reflect, S> Reflect for HashSet<T, S> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Set(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<T: Reflect> Reflect for BTreeSet<T> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Set(self.iter().map(|value| value as &dyn Reflect).collect())
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Map(
            self.iter()
                .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect))
                .collect(),
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn reflect(&self) -> Reflected<'_> {
        Reflected::Map(
            self.iter()
                .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect))
                .collect(),
        )
    }
}

const NANOS_PER_SECOND: i128 = 1_000_000_000;

impl Reflect for SystemTime {
    fn reflect(&self) -> Reflected<'_> {
        let nanos = match self.duration_since(UNIX_EPOCH) {
            Ok(elapsed) => elapsed.as_nanos() as i128,
            Err(err) => -(err.duration().as_nanos() as i128),
        };
        Reflected::Date(nanos)
    }
}

fn instant<Tz: TimeZone>(time: &DateTime<Tz>) -> Reflected<'static> {
    Reflected::Date(
        i128::from(time.timestamp()) * NANOS_PER_SECOND + i128::from(time.timestamp_subsec_nanos()),
    )
}

impl<Tz: TimeZone> Reflect for DateTime<Tz> {
    fn reflect(&self) -> Reflected<'_> {
        instant(self)
    }
}

impl Reflect for NaiveDateTime {
    fn reflect(&self) -> Reflected<'_> {
        instant(&self.and_utc())
    }
}

impl Reflect for Value {
    fn reflect(&self) -> Reflected<'_> {
        match self {
            Value::Null => Reflected::Null,
            Value::Bool(value) => Reflected::Bool(*value),
            Value::Number(number) => match (number.as_i64(), number.as_u64()) {
                (Some(value), _) => Reflected::Number(Number::Int(i128::from(value))),
                (None, Some(value)) => Reflected::Number(Number::UInt(u128::from(value))),
                _ => Reflected::Number(Number::Float(number.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(value) => Reflected::Str(value),
            Value::Array(values) => {
                Reflected::Seq(values.iter().map(|value| value as &dyn Reflect).collect())
            }
            Value::Object(map) => Reflected::Map(
                map.iter()
                    .map(|(key, value)| (key as &dyn Reflect, value as &dyn Reflect))
                    .collect(),
            ),
        }
    }
}

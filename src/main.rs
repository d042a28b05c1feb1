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

use std::fs;
use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde_json::Value;
use tracing_subscriber::EnvFilter;

use reflect_assert::{entries, ComparatorMode, Config, ReflectionComparator};

#[doc(hidden)]
#[macro_export]
macro_rules! handle_error {
    ($code:expr, $msg:expr, $($arg:tt)*) => {
        eprintln!($msg, $($arg)*);
        std::process::exit($code);
    };

    ($code:expr, $msg:expr) => {
        eprintln!($msg);
        std::process::exit($code);
    };
}

#[doc(hidden)]
struct Code;

impl Code {
    const SUCCESS: i32 = 0;
    const INTERNAL_ERROR: i32 = 1;
    const INVALID_ARGUMENT: i32 = 2;
    const JSON_PARSING_ERROR: i32 = 3;
    const DIFFERENCES_FOUND: i32 = 4;
}

#[doc(hidden)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[doc(hidden)]
#[derive(Debug, Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Expected JSON document
    left: PathBuf,

    /// Actual JSON document
    right: PathBuf,

    /// Ignore the order of array elements
    #[clap(long)]
    lenient_order: bool,

    /// Let expected nulls, `false` and zeros match any actual value
    #[clap(long)]
    ignore_defaults: bool,

    /// Only check that dates are both set or both null
    #[clap(long)]
    lenient_dates: bool,

    /// Report every difference instead of stopping at the first one
    #[clap(short, long)]
    all: bool,

    /// Output format of the report
    #[clap(short, long, value_enum, default_value = "text")]
    format: Format,
}

impl Cli {
    fn config(&self) -> Config {
        let mut config = Config::new();
        if self.lenient_order {
            config = config.mode(ComparatorMode::LenientOrder);
        }
        if self.ignore_defaults {
            config = config.mode(ComparatorMode::IgnoreDefaults);
        }
        if self.lenient_dates {
            config = config.mode(ComparatorMode::LenientDates);
        }
        config
    }
}

fn read_json(path: &PathBuf) -> Value {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(err) => {
            handle_error!(
                Code::INVALID_ARGUMENT,
                "Error reading {}: {}",
                path.display(),
                err
            );
        }
    };

    match serde_json::from_str(&content) {
        Ok(value) => value,
        Err(err) => {
            handle_error!(
                Code::JSON_PARSING_ERROR,
                "Error parsing {}: {}",
                path.display(),
                err
            );
        }
    }
}

#[doc(hidden)]
fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let comparator = match ReflectionComparator::new(&cli.config()) {
        Ok(comparator) => comparator,
        Err(err) => {
            handle_error!(Code::INVALID_ARGUMENT, "Error: {}", err);
        }
    };

    let left = read_json(&cli.left);
    let right = read_json(&cli.right);

    let result = if cli.all {
        comparator.get_all_differences(&left, &right)
    } else {
        comparator.get_difference(&left, &right)
    };

    let difference = match result {
        Ok(difference) => difference,
        Err(err) => {
            handle_error!(Code::INTERNAL_ERROR, "Error: {}", err);
        }
    };

    match (cli.format, difference) {
        (Format::Text, None) => {
            println!("Documents are equal.");
            std::process::exit(Code::SUCCESS);
        }
        (Format::Text, Some(difference)) => {
            println!("{}", difference);
            std::process::exit(Code::DIFFERENCES_FOUND);
        }
        (Format::Json, difference) => {
            let entries = difference.as_ref().map(entries).unwrap_or_default();
            match serde_json::to_string_pretty(&entries) {
                Ok(json) => println!("{}", json),
                Err(err) => {
                    handle_error!(Code::INTERNAL_ERROR, "Error: {}", err);
                }
            }

            if entries.is_empty() {
                std::process::exit(Code::SUCCESS);
            }
            std::process::exit(Code::DIFFERENCES_FOUND);
        }
    }
}

/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::io::Write;

use log::debug;

use crate::NumT;
use crate::error::{Error, Result};

/// Values that can be read from a `key=value` pair.
pub trait ConfigValue: Sized {
    fn parse_value(value: &str) -> Option<Self>;
    fn to_value(&self) -> String;
}

macro_rules! impl_config_value {
    ($($type:ty),*) => {
        $(
        impl ConfigValue for $type {
            fn parse_value(value: &str) -> Option<Self> { value.trim().parse::<$type>().ok() }
            fn to_value(&self) -> String { format!("{}", self) }
        }
        )*
    }
}

impl_config_value!(usize, u64, NumT, String);

impl ConfigValue for bool {
    fn parse_value(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" => Some(true),
            "false" | "0" | "no" => Some(false),
            _ => None,
        }
    }
    fn to_value(&self) -> String { format!("{}", self) }
}

/// Single byte delimiters, e.g. `csv_delimiter=;`. The word `tab` is accepted for `\t`.
impl ConfigValue for u8 {
    fn parse_value(value: &str) -> Option<Self> {
        match value {
            "tab" | "\\t" => Some(b'\t'),
            v if v.len() == 1 => Some(v.as_bytes()[0]),
            _ => None,
        }
    }
    fn to_value(&self) -> String { (*self as char).escape_default().to_string() }
}

macro_rules! declare_config {
    ($( $name:ident : $type:ty = $default:expr, $doc:literal; )*) => {
        #[derive(Debug, Clone)]
        pub struct Config {
            $(
                #[doc = $doc]
                pub $name: $type,
            )*
        }

        impl Config {
            pub fn new() -> Config {
                Config {
                    $( $name: $default, )*
                }
            }

            /// Set a single field by name.
            pub fn parse_record(&mut self, name: &str, value: &str) -> Result<()> {
                match name.trim() {
                    $(
                        stringify!($name) => {
                            self.$name = <$type as ConfigValue>::parse_value(value)
                                .ok_or_else(|| Error::Config(format!(
                                    "invalid value '{}' for {} (expected {})",
                                    value, stringify!($name), stringify!($type))))?;
                        }
                    )*
                    _ => return Err(Error::Config(format!("unknown config field '{}'", name))),
                }
                debug!("config {} = {}", name.trim(), value);
                Ok(())
            }

            /// Write a CSV table with one row per config field: name, type, default value and
            /// description.
            pub fn write_doc_csv<W: Write>(writer: W) -> Result<()> {
                let defaults = Config::new();
                let mut csv = csv::Writer::from_writer(writer);
                csv.write_record(&["name", "type", "default", "description"])?;
                $(
                    csv.write_record(&[
                        stringify!($name),
                        stringify!($type),
                        defaults.$name.to_value().as_str(),
                        $doc.trim(),
                    ])?;
                )*
                csv.flush()?;
                Ok(())
            }
        }
    }
}

declare_config! {
    data_path: String = String::from("Preprocessed_Activities_Time.csv"),
        " Path to the call activity CSV file; `.gz` files are decompressed.";
    csv_has_header: bool = true,
        " Whether the first CSV row is a header row.";
    csv_delimiter: u8 = b',',
        " CSV field delimiter.";

    test_fraction: NumT = 0.2,
        " Fraction of the records held out for evaluation, in [0, 1).";
    random_seed: u64 = 1,
        " Seed for shuffling the records before the train/test split.";

    niterations: usize = 100,
        " Number of boosting iterations (trees).";
    learning_rate: NumT = 0.2,
        " Shrinkage applied to the leaf values of every tree.";
    max_nleaves: usize = 20,
        " Maximum number of leaves per tree.";
    min_examples_leaf: usize = 10,
        " Minimum number of training examples in a leaf.";
    max_nbins: usize = 255,
        " Maximum number of bins per feature, at most 255.";
    reg_lambda: NumT = 0.0,
        " L2 regularization of the leaf values.";
    min_gain: NumT = 1e-6,
        " Minimum gain of a split.";

    metrics: String = String::from("binary_loss,binary_error"),
        " Comma separated training metrics: binary_loss, binary_error.";
    metric_frequency: usize = 10,
        " Log training metrics every this many iterations; 0 disables.";
}

impl Default for Config {
    fn default() -> Config { Config::new() }
}

impl Config {
    /// Build a config from `key=value` arguments, starting from the defaults.
    pub fn parse<'a, I>(args: I) -> Result<Config>
    where I: IntoIterator<Item = &'a str>
    {
        let mut config = Config::new();
        for arg in args {
            let mut parts = arg.splitn(2, '=');
            let name = parts.next().unwrap_or("");
            let value = parts.next()
                .ok_or_else(|| Error::Config(format!("expected key=value, got '{}'", arg)))?;
            config.parse_record(name, value)?;
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let fail = |msg: &str| Err(Error::Config(msg.to_string()));

        if !(0.0..1.0).contains(&self.test_fraction) { return fail("test_fraction not in [0, 1)"); }
        if !(self.learning_rate > 0.0) { return fail("learning_rate must be positive"); }
        if self.max_nleaves < 2 { return fail("max_nleaves must be at least 2"); }
        if self.min_examples_leaf == 0 { return fail("min_examples_leaf must be at least 1"); }
        if self.max_nbins == 0 || self.max_nbins > 255 { return fail("max_nbins not in [1, 255]"); }
        if self.reg_lambda < 0.0 { return fail("reg_lambda must be non-negative"); }
        Ok(())
    }
}




// ------------------------------------------------------------------------------------------------

/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A field that could not be interpreted. `record` is 0-based and excludes the header.
    #[error("parse error at record {record}, column {column}: invalid value '{value}'")]
    Parse { record: usize, column: &'static str, value: String },

    #[error("record {record} has {found} columns, expected {expected}")]
    ColumnCount { record: usize, found: usize, expected: usize },

    #[error("config error: {0}")]
    Config(String),

    #[error("invalid input '{value}' for {field}")]
    Input { field: &'static str, value: String },

    #[error("no data: {0}")]
    EmptyData(String),
}

pub type Result<T> = std::result::Result<T, Error>;

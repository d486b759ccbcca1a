/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

/// Checks an invariant that must hold for the model to be usable; unlike `debug_assert!`, this
/// is also checked in release builds.
macro_rules! safety_check {
    ($assertion:expr) => {{
        assert!($assertion, "safety check failed: {}", stringify!($assertion));
    }}
}

pub type NumT = f32;

pub const EPSILON: NumT = 1e-6;
pub const POS_INF: NumT = NumT::INFINITY;
pub const NEG_INF: NumT = NumT::NEG_INFINITY;

pub mod error;
pub mod config;
pub mod record;
pub mod data;
pub mod split;
pub mod binner;
pub mod dataset;
pub mod objective;
pub mod metric;
pub mod tree;
pub mod hist_store;
pub mod tree_learner;
pub mod boost;
pub mod predict;
pub mod report;
pub mod repl;

pub use crate::error::{Error, Result};

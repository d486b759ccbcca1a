/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use log::info;
use rand::SeedableRng;
use rand::rngs::SmallRng;
use rand::seq::SliceRandom;

use crate::NumT;
use crate::data::Data;
use crate::error::{Error, Result};

/// Shuffle the examples with a seeded generator and hold out `round(n * test_fraction)` of them
/// for testing. Returns `(train, test)`.
pub fn train_test_split(data: &Data, test_fraction: NumT, seed: u64) -> Result<(Data, Data)> {
    if !(0.0..1.0).contains(&test_fraction) {
        return Err(Error::Config(format!("test_fraction {} not in [0, 1)", test_fraction)));
    }

    let nexamples = data.nexamples();
    let ntest = (nexamples as NumT * test_fraction).round() as usize;

    let mut rng = SmallRng::seed_from_u64(seed);
    let mut indices: Vec<usize> = (0..nexamples).collect();
    indices.shuffle(&mut rng);

    let (test_idx, train_idx) = indices.split_at(ntest);
    info!("train/test split: {} train, {} test examples", train_idx.len(), test_idx.len());

    Ok((data.select(train_idx), data.select(test_idx)))
}




// ------------------------------------------------------------------------------------------------

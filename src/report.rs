/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::io::Write;

use log::info;

use crate::config::Config;
use crate::data::Data;
use crate::boost::train_model;
use crate::error::Result;
use crate::metric::BinaryClassificationMetrics;
use crate::predict::Model;
use crate::split::train_test_split;

/// Split the data, train on the training part and write the test set evaluation to `out`.
pub fn train_and_report<W: Write>(config: &Config, data: &Data, mut out: W)
    -> Result<(Model, BinaryClassificationMetrics)>
{
    let (train, test) = train_test_split(data, config.test_fraction, config.random_seed)?;

    writeln!(out, "Training the model...")?;
    out.flush()?;
    let model = train_model(config, &train)?;

    let metrics = model.evaluate(&test);
    write_summary(&metrics, &mut out)?;
    info!("test set evaluation\n{}", metrics);

    Ok((model, metrics))
}

/// The accuracy, precision and recall lines; precision and recall are those of the successful
/// calls.
pub fn write_summary<W: Write>(metrics: &BinaryClassificationMetrics, mut out: W) -> Result<()> {
    writeln!(out, "Accuracy: {}", metrics.accuracy)?;
    writeln!(out, "Precision: {}", metrics.positive_precision)?;
    writeln!(out, "Recall: {}", metrics.positive_recall)?;
    out.flush()?;
    Ok(())
}




// ------------------------------------------------------------------------------------------------

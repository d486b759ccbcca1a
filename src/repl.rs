/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::io::{BufRead, Write};

use log::debug;

use crate::NumT;
use crate::error::{Error, Result};
use crate::predict::{Model, PredictionResult};
use crate::record::{FeatureVector, NFEATURES, FEATURE_NAMES};

const PROMPTS: [&str; NFEATURES] = [
    "Enter BranchID:",
    "Enter ClueID:",
    "Enter PersonnelID:",
    "Enter IsAccount (1 for Yes, 0 for No):",
    "Enter HourOfDay:",
    "Enter CreatedYear:",
    "Enter CreatedMonth:",
    "Enter CreatedDay:",
];

const CONTINUE_PROMPT: &str = "Do you want to enter another data? (y to continue, n to exit):";
const GOODBYE: &str = "Exiting the application. Goodbye!";

/// Read-eval-print loop: reads the features of one call, prints the prediction, and asks
/// whether to continue.
pub struct Repl<'m, R, W> {
    model: &'m Model,
    input: R,
    output: W,
    line: String,
}

impl <'m, R, W> Repl<'m, R, W>
where R: BufRead,
      W: Write,
{
    pub fn new(model: &'m Model, input: R, output: W) -> Repl<'m, R, W> {
        Repl {
            model,
            input,
            output,
            line: String::new(),
        }
    }

    /// Run until the user declines to continue or the input ends. Returns the number of
    /// predictions made. Input that is not a number ends the loop with an error.
    pub fn run(mut self) -> Result<usize> {
        let mut npredictions = 0;
        loop {
            let features = match self.read_features()? {
                Some(features) => features,
                None => break,
            };

            let prediction = self.model.predict_one(&features);
            npredictions += 1;
            debug!("prediction {}: {:?} -> {:?}", npredictions, features, prediction);
            self.print_prediction(&prediction)?;

            if !self.ask_continue()? { break; }
        }

        writeln!(self.output, "{}", GOODBYE)?;
        self.output.flush()?;
        Ok(npredictions)
    }

    /// Next input line without line ending, None at the end of the input.
    fn read_line(&mut self) -> Result<Option<&str>> {
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(None);
        }
        Ok(Some(self.line.trim_end_matches(&['\r', '\n'][..])))
    }

    fn read_features(&mut self) -> Result<Option<FeatureVector>> {
        let mut features = [0.0; NFEATURES];
        for (feat_id, prompt) in PROMPTS.iter().enumerate() {
            writeln!(self.output, "{}", prompt)?;
            self.output.flush()?;

            let value = match self.read_line()? {
                Some(line) => line.trim().parse::<NumT>().map_err(|_| Error::Input {
                    field: FEATURE_NAMES[feat_id],
                    value: line.to_string(),
                })?,
                None => return Ok(None),
            };
            features[feat_id] = value;
        }
        Ok(Some(features))
    }

    fn print_prediction(&mut self, prediction: &PredictionResult) -> Result<()> {
        let label = if prediction.predicted_label { "True" } else { "False" };
        writeln!(self.output)?;
        writeln!(self.output, "Prediction Results:")?;
        writeln!(self.output, "Predicted Label (Success?): {}", label)?;
        writeln!(self.output, "Score: {}", prediction.score)?;
        Ok(())
    }

    fn ask_continue(&mut self) -> Result<bool> {
        writeln!(self.output)?;
        writeln!(self.output, "{}", CONTINUE_PROMPT)?;
        self.output.flush()?;
        Ok(match self.read_line()? {
            Some(answer) => answer.trim().to_lowercase() == "y",
            None => false,
        })
    }
}




// ------------------------------------------------------------------------------------------------

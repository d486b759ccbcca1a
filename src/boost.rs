/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::time::Instant;

use log::{debug, info};

use crate::NumT;
use crate::config::Config;
use crate::data::Data;
use crate::dataset::Dataset;
use crate::error::{Error, Result};
use crate::metric::{Metric, metrics_from_names};
use crate::objective::{Objective, Binary};
use crate::predict::Model;
use crate::tree_learner::{TreeLearnerContext, TreeLearner};

macro_rules! time {
    ($($block:tt)*) => {{
        let start = Instant::now();
        let res = {
            $($block)*
        };
        let el = start.elapsed();
        let seconds = el.as_secs() as f32 + el.subsec_micros() as f32 * 1e-6;
        (res, seconds)
    }}
}

pub struct Booster<'a> {
    config: &'a Config,
    data: &'a Data,
    start: Instant,
    objective: &'a mut dyn Objective,
    iter_count: usize,
    metrics: &'a [Box<dyn Metric>],
    predictions: Vec<NumT>,
    ensemble: Model,
}

impl <'a> Booster<'a> {
    pub fn new(config: &'a Config, data: &'a Data,
               objective: &'a mut dyn Objective,
               metrics: &'a [Box<dyn Metric>]) -> Booster<'a>
    {
        Booster {
            config,
            data,
            start: Instant::now(),
            objective,
            iter_count: 0,
            metrics,
            predictions: Vec::new(),
            ensemble: Model::new(),
        }
    }

    pub fn train(mut self) -> Result<Model> {
        assert!(self.iter_count == 0);
        if self.data.is_empty() {
            return Err(Error::EmptyData("cannot train on zero examples".to_string()));
        }

        self.start = Instant::now();
        let target = self.data.get_target();
        let dataset = Dataset::new(self.config, self.data);
        let mut ctx = TreeLearnerContext::new(self.config, &dataset);

        self.objective.initialize(target);
        self.ensemble.set_bias(self.objective.bias());
        self.predictions = vec![self.objective.bias(); self.data.nexamples()];
        info!("training {} trees on {} examples ({} positive), objective {}",
              self.config.niterations, self.data.nexamples(), self.data.npositive(),
              self.objective.name());

        for _ in 0..self.config.niterations {
            self.train_one_iter(&mut ctx);
        }

        let el = self.start.elapsed();
        info!("trained {} trees in {:.3} s", self.ensemble.ntrees(),
              el.as_secs() as f32 + el.subsec_micros() as f32 * 1e-6);
        Ok(self.ensemble)
    }

    fn train_one_iter(&mut self, ctx: &mut TreeLearnerContext) {
        let target = self.data.get_target();
        self.iter_count += 1;
        let (_, ot) = time!(self.objective.update(target, &self.predictions));

        // learn a tree
        let learner = TreeLearner::new(ctx, &*self.objective);
        let (mut tree, tt) = time!(learner.train());
        tree.set_shrinkage(self.config.learning_rate);
        tree.predict_and(self.data, &mut self.predictions, |prediction, accum| {
            *accum += prediction;
        });

        // print updates
        let el = self.start.elapsed();
        let seconds = el.as_secs() as f32 + el.subsec_micros() as f32 * 1e-6;
        debug!("[{:3}] timings: objective {:5.1}, tree {:5.1} ms, total {:.3} s, {} leafs",
               self.iter_count, ot * 1000.0, tt * 1000.0, seconds, tree.nleafs());

        let run_metrics = !self.metrics.is_empty()
            && self.config.metric_frequency > 0
            && self.iter_count % self.config.metric_frequency == 0;
        if run_metrics {
            for m in self.metrics {
                let eval = m.eval(target, &self.predictions);
                info!("[{:3}] eval {:<13} {:10.4e}", self.iter_count, m.name(), eval);
            }
        }

        self.ensemble.push_tree(tree);
    }
}

/// Train a model with the binary objective and the metrics named in the config.
pub fn train_model(config: &Config, data: &Data) -> Result<Model> {
    let metrics = metrics_from_names(&config.metrics)
        .ok_or_else(|| Error::Config(format!("unknown metric in '{}'", config.metrics)))?;
    let mut objective = Binary::new();
    let booster = Booster::new(config, data, &mut objective, &metrics);
    booster.train()
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::metric::BinaryLoss;
    use crate::record::CallRecord;

    /// Success in the afternoon for clients with an account.
    fn data(n: usize) -> Data {
        let records: Vec<CallRecord> = (0..n)
            .map(|i| {
                let hour = (8 + i % 10) as NumT;
                let is_account = ((i / 3) % 2) as NumT;
                let mut r = CallRecord::from_features(&[
                    (i % 4) as NumT, i as NumT, (i % 7) as NumT, is_account,
                    hour, 2023.0, (1 + i % 12) as NumT, (1 + i % 28) as NumT,
                ]);
                r.status = hour >= 13.0 && is_account > 0.5;
                r
            })
            .collect();
        Data::from_records(&records)
    }

    #[test]
    fn boost_learns_rule() {
        let data = data(600);
        let mut config = Config::new();
        config.niterations = 30;
        let model = train_model(&config, &data).unwrap();
        assert_eq!(model.ntrees(), 30);

        let metrics = model.evaluate(&data);
        assert!(metrics.accuracy > 0.99, "accuracy {}", metrics.accuracy);
        assert!(metrics.auc > 0.99);
    }

    #[test]
    fn loss_decreases() {
        let data = data(300);
        let mut config = Config::new();
        let loss = BinaryLoss;

        config.niterations = 2;
        let short = train_model(&config, &data).unwrap();
        config.niterations = 20;
        let long = train_model(&config, &data).unwrap();

        let target = data.get_target();
        assert!(loss.eval(target, &long.predict(&data)) < loss.eval(target, &short.predict(&data)));
    }

    #[test]
    fn nan_rows_predicted_as_fitted() {
        let records: Vec<CallRecord> = (0..120)
            .map(|i| {
                let (hour, status) = match i % 3 {
                    0 => (NumT::NAN, true),
                    1 => (20.0, false),
                    _ => (5.0, true),
                };
                let mut r = CallRecord::from_features(&[1.0, 2.0, 3.0, 1.0, hour, 2023.0, 6.0, 1.0]);
                r.status = status;
                r
            })
            .collect();
        let data = Data::from_records(&records);
        let mut config = Config::new();
        config.niterations = 20;
        let model = train_model(&config, &data).unwrap();

        assert_eq!(model.evaluate(&data).accuracy, 1.0);
        let nan_call = model.predict_record(&records[0]);
        assert!(nan_call.predicted_label, "score {}", nan_call.score);
    }

    #[test]
    fn empty_data() {
        let data = Data::from_records(&[]);
        assert!(matches!(train_model(&Config::new(), &data), Err(Error::EmptyData(_))));
    }

    #[test]
    fn unknown_metric() {
        let mut config = Config::new();
        config.metrics = "rmse".to_string();
        assert!(matches!(train_model(&config, &data(50)), Err(Error::Config(_))));
    }
}

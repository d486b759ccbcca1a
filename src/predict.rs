/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use crate::NumT;
use crate::data::Data;
use crate::metric::BinaryClassificationMetrics;
use crate::objective::probability;
use crate::record::{CallRecord, FeatureVector};
use crate::tree::Tree;

/// Outcome of a single prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    /// Whether the call is predicted to be successful.
    pub predicted_label: bool,
    /// Raw ensemble score; positive means success.
    pub score: NumT,
    pub probability: NumT,
}

impl PredictionResult {
    pub fn from_score(score: NumT) -> PredictionResult {
        PredictionResult {
            predicted_label: score > 0.0,
            score,
            probability: probability(score),
        }
    }
}

/// The trained classifier: a bias plus the sum of the tree outputs.
#[derive(Debug, Clone)]
pub struct Model {
    bias: NumT,
    trees: Vec<Tree>,
}

impl Model {
    pub fn new() -> Model {
        Model {
            bias: 0.0,
            trees: Vec::new(),
        }
    }

    pub fn set_bias(&mut self, bias: NumT) {
        self.bias = bias;
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    pub fn bias(&self) -> NumT { self.bias }
    pub fn ntrees(&self) -> usize { self.trees.len() }
    pub fn trees(&self) -> &[Tree] { &self.trees }

    pub fn predict_buf(&self, data: &Data, predict_buf: &mut [NumT]) {
        predict_buf.iter_mut().for_each(|x| *x = self.bias);
        for tree in &self.trees {
            tree.predict_and(data, predict_buf, |prediction, accum| {
                *accum += prediction;
            });
        }
    }

    /// Raw scores for all examples in `data`.
    pub fn predict(&self, data: &Data) -> Vec<NumT> {
        let mut accum = vec![0.0; data.nexamples()];
        self.predict_buf(data, &mut accum);
        accum
    }

    pub fn predict_score(&self, features: &FeatureVector) -> NumT {
        self.trees.iter().fold(self.bias, |acc, tree| acc + tree.predict_features(features))
    }

    pub fn predict_one(&self, features: &FeatureVector) -> PredictionResult {
        PredictionResult::from_score(self.predict_score(features))
    }

    pub fn predict_record(&self, record: &CallRecord) -> PredictionResult {
        self.predict_one(&record.features())
    }

    pub fn evaluate(&self, data: &Data) -> BinaryClassificationMetrics {
        let scores = self.predict(data);
        BinaryClassificationMetrics::compute(data.get_target(), &scores)
    }
}

impl Default for Model {
    fn default() -> Model { Model::new() }
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::tree::SplitCrit;

    fn model() -> Model {
        let mut tree = Tree::new();
        let (l, r) = tree.split_node(0, SplitCrit { feature_id: 4, split_value: 12.0 });
        tree.set_value(l, -1.0);
        tree.set_value(r, 1.0);
        tree.set_shrinkage(0.5);

        let mut model = Model::new();
        model.set_bias(0.25);
        model.push_tree(tree.clone());
        model.push_tree(tree);
        model
    }

    #[test]
    fn predict_one() {
        let model = model();
        assert_eq!(model.ntrees(), 2);

        let morning = model.predict_one(&[1.0, 2.0, 3.0, 0.0, 9.0, 2023.0, 1.0, 1.0]);
        assert!(!morning.predicted_label);
        assert_eq!(morning.score, -0.75);
        assert!(morning.probability < 0.5);

        let afternoon = model.predict_one(&[1.0, 2.0, 3.0, 0.0, 15.0, 2023.0, 1.0, 1.0]);
        assert!(afternoon.predicted_label);
        assert_eq!(afternoon.score, 1.25);
        assert!(afternoon.probability > 0.5);
    }

    #[test]
    fn predict_data_agrees_with_single() {
        let model = model();
        let mut rec = CallRecord::from_features(&[0.0, 0.0, 0.0, 0.0, 13.0, 0.0, 0.0, 0.0]);
        rec.status = true;
        let data = Data::from_records(&[rec.clone()]);

        assert_eq!(model.predict(&data), vec![model.predict_record(&rec).score]);
        assert_eq!(model.evaluate(&data).accuracy, 1.0);
    }

    #[test]
    fn empty_model_predicts_bias() {
        let mut model = Model::new();
        model.set_bias(-0.1);
        let result = model.predict_one(&[0.0; 8]);
        assert_eq!(result.score, -0.1);
        assert!(!result.predicted_label);
    }
}

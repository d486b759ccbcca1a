/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::cmp::Ordering;
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::{NumT, EPSILON};
use crate::objective::probability;

macro_rules! impl_metric {
    ($type:ty, eval_one: $impl:expr) => {
        impl Metric for $type {
            fn name(&self) -> &'static str { stringify!($type) }
            fn eval(&self, targets: &[NumT], predictions: &[NumT]) -> NumT {
                let mut loss = 0.0;
                let mut count = 0;
                for (&t, &p) in targets.iter().zip(predictions) {
                    loss += $impl(t, p);
                    count += 1;
                }
                if count == 0 { 0.0 } else { loss / count as NumT }
            }
        }
    }
}


/// A metric averaged over the examples. Predictions are raw scores.
pub trait Metric {
    fn name(&self) -> &'static str;
    fn eval(&self, targets: &[NumT], predictions: &[NumT]) -> NumT;
}

pub fn metric_from_name(name: &str) -> Option<Box<dyn Metric>> {
    match name.trim().to_lowercase().as_str() {
        "binaryloss" | "binary_loss" => Some(Box::new(BinaryLoss)),
        "binaryerror" | "binary_error" => Some(Box::new(BinaryError)),
        _ => None
    }
}

/// Parse a comma separated list of metric names.
pub fn metrics_from_names(names: &str) -> Option<Vec<Box<dyn Metric>>> {
    names.split(',')
        .filter(|name| !name.trim().is_empty())
        .map(metric_from_name)
        .collect()
}


// ------------------------------------------------------------------------------------------------

pub struct BinaryLoss;
impl_metric!(BinaryLoss, eval_one: |t: NumT, p: NumT| {
    let y = 2.0 * t - 1.0;
    (1.0 + (-2.0 * y * p).exp()).ln()
});

// ------------------------------------------------------------------------------------------------

pub struct BinaryError;
impl_metric!(BinaryError, eval_one: |t: NumT, p: NumT| {
    if t < 0.5 {             // neg target
        if p <= 0.0 { 0.0 }  // good prediction
        else        { 1.0 }  // wrong prediction
    } else { // pos target
        if p <= 0.0 { 1.0 }  // wrong prediction
        else        { 0.0 }  // good prediction
    }
});




// ------------------------------------------------------------------------------------------------

/// Evaluation of a binary classifier on a labeled data set. A raw score above zero predicts the
/// positive class. Ratios with a zero denominator are reported as 0.
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryClassificationMetrics {
    pub accuracy: NumT,
    pub positive_precision: NumT,
    pub positive_recall: NumT,
    pub negative_precision: NumT,
    pub negative_recall: NumT,
    pub f1_score: NumT,
    pub auc: NumT,
    pub log_loss: NumT,
    pub confusion: ConfusionMatrix,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionMatrix {
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }
}

fn ratio(num: usize, den: usize) -> NumT {
    if den == 0 { 0.0 } else { num as NumT / den as NumT }
}

impl BinaryClassificationMetrics {
    pub fn compute(targets: &[NumT], scores: &[NumT]) -> BinaryClassificationMetrics {
        assert_eq!(targets.len(), scores.len());

        let mut cm = ConfusionMatrix::default();
        let mut log_loss = 0.0;
        for (&t, &s) in targets.iter().zip(scores) {
            let positive = t > 0.5;
            match (positive, s > 0.0) {
                (true, true)   => cm.true_positives += 1,
                (false, true)  => cm.false_positives += 1,
                (false, false) => cm.true_negatives += 1,
                (true, false)  => cm.false_negatives += 1,
            }
            let p = probability(s).max(EPSILON).min(1.0 - EPSILON);
            log_loss -= if positive { p.ln() } else { (1.0 - p).ln() };
        }

        let positive_precision = ratio(cm.true_positives, cm.true_positives + cm.false_positives);
        let positive_recall = ratio(cm.true_positives, cm.true_positives + cm.false_negatives);
        let f1_score = if positive_precision + positive_recall > 0.0 {
            2.0 * positive_precision * positive_recall / (positive_precision + positive_recall)
        } else { 0.0 };

        BinaryClassificationMetrics {
            accuracy: ratio(cm.true_positives + cm.true_negatives, cm.total()),
            positive_precision,
            positive_recall,
            negative_precision: ratio(cm.true_negatives, cm.true_negatives + cm.false_negatives),
            negative_recall: ratio(cm.true_negatives, cm.true_negatives + cm.false_positives),
            f1_score,
            auc: auc(targets, scores),
            log_loss: if targets.is_empty() { 0.0 } else { log_loss / targets.len() as NumT },
            confusion: cm,
        }
    }
}

/// Area under the ROC curve: the probability that a random positive example scores higher than
/// a random negative one, ties count for one half.
pub fn auc(targets: &[NumT], scores: &[NumT]) -> NumT {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&i, &j| scores[i].partial_cmp(&scores[j]).unwrap_or(Ordering::Equal));

    let npos = targets.iter().filter(|&&t| t > 0.5).count();
    let nneg = targets.len() - npos;
    if npos == 0 || nneg == 0 { return 0.0; }

    // sum of the (1-based, tie-averaged) ranks of the positive examples
    let mut pos_rank_sum = 0.0f64;
    let mut lo = 0;
    while lo < order.len() {
        let mut hi = lo + 1;
        while hi < order.len() && scores[order[hi]] == scores[order[lo]] { hi += 1; }
        let avg_rank = (lo + 1 + hi) as f64 / 2.0;
        let npos_tied = order[lo..hi].iter().filter(|&&i| targets[i] > 0.5).count();
        pos_rank_sum += avg_rank * npos_tied as f64;
        lo = hi;
    }

    let npos_f = npos as f64;
    ((pos_rank_sum - npos_f * (npos_f + 1.0) / 2.0) / (npos_f * nneg as f64)) as NumT
}

impl Display for BinaryClassificationMetrics {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let cm = &self.confusion;
        writeln!(f, " | Accuracy            {:.5}", self.accuracy)?;
        writeln!(f, " | AUC                 {:.5}", self.auc)?;
        writeln!(f, " | F1 score            {:.5}", self.f1_score)?;
        writeln!(f, " | Positive precision  {:.5}", self.positive_precision)?;
        writeln!(f, " | Positive recall     {:.5}", self.positive_recall)?;
        writeln!(f, " | Negative precision  {:.5}", self.negative_precision)?;
        writeln!(f, " | Negative recall     {:.5}", self.negative_recall)?;
        writeln!(f, " | Log loss            {:.5}", self.log_loss)?;
        writeln!(f, " | Confusion matrix    {:>8} {:>8}", "pred +", "pred -")?;
        writeln!(f, " |          actual +   {:>8} {:>8}", cm.true_positives, cm.false_negatives)?;
        write!(f,   " |          actual -   {:>8} {:>8}", cm.false_positives, cm.true_negatives)
    }
}




// ------------------------------------------------------------------------------------------------

/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use crate::{NumT, EPSILON};

/// Provides the first and second derivatives the tree learner fits trees to.
pub trait Objective {
    fn name(&self) -> &'static str;
    fn bias(&self) -> NumT;
    fn gradients(&self) -> &[NumT];
    fn hessians(&self) -> &[NumT];

    /// Compute the initial prediction (bias) from the targets.
    fn initialize(&mut self, targets: &[NumT]);

    /// Recompute the gradients and hessians for the current raw predictions.
    fn update(&mut self, targets: &[NumT], predictions: &[NumT]);
}






// - Binary log loss ------------------------------------------------------------------------------

/// Log loss `ln(1 + exp(-2yF))` with labels `y` in {-1, 1} and raw score `F`.
pub struct Binary {
    gradients: Vec<NumT>,
    hessians: Vec<NumT>,
    bias: NumT,
}

impl Binary {
    pub fn new() -> Binary {
        Binary {
            gradients: Vec::new(),
            hessians: Vec::new(),
            bias: 0.0,
        }
    }
}

impl Default for Binary {
    fn default() -> Binary { Binary::new() }
}

impl Objective for Binary {
    fn name(&self) -> &'static str { "Binary" }
    fn bias(&self) -> NumT { self.bias }
    fn gradients(&self) -> &[NumT] { &self.gradients }
    fn hessians(&self) -> &[NumT] { &self.hessians }

    fn initialize(&mut self, targets: &[NumT]) {
        debug_assert!(targets.iter().all(|&t| t == 0.0 || t == 1.0));
        let npos = targets.iter().filter(|&&t| t > 0.5).count();
        let p = (npos as NumT / targets.len().max(1) as NumT).max(EPSILON).min(1.0 - EPSILON);
        self.bias = 0.5 * (p / (1.0 - p)).ln(); // half log-odds
    }

    fn update(&mut self, targets: &[NumT], predictions: &[NumT]) {
        assert_eq!(targets.len(), predictions.len());
        let n = targets.len();
        self.gradients.resize(n, 0.0);
        self.hessians.resize(n, 0.0);

        for i in 0..n {
            let (t, p) = (targets[i], predictions[i]);
            let y = 2.0 * t - 1.0; // 0.0 -> -1.0; 1.0 -> 1.0
            let g = -(2.0 * y) / (1.0 + (2.0 * y * p).exp());
            let gabs = g.abs();
            self.gradients[i] = g;
            self.hessians[i] = (gabs * (2.0 - gabs)).max(EPSILON);
        }
    }
}

/// Probability of the positive class for a raw score of the binary objective.
pub fn probability(score: NumT) -> NumT {
    1.0 / (1.0 + (-2.0 * score).exp())
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn gradients_at_zero() {
        let mut objective = Binary::new();
        objective.update(&[1.0, 0.0], &[0.0, 0.0]);
        assert_eq!(objective.gradients(), &[-1.0, 1.0]);
        assert_eq!(objective.hessians(), &[1.0, 1.0]);
    }

    #[test]
    fn gradients_shrink_when_correct() {
        let mut objective = Binary::new();
        objective.update(&[1.0, 1.0], &[2.0, -2.0]);
        let g = objective.gradients();
        assert!(g[0] < 0.0 && g[0].abs() < 0.1);  // confident and right
        assert!(g[1] < 0.0 && g[1].abs() > 1.9);  // confident and wrong
    }

    #[test]
    fn bias() {
        let mut objective = Binary::new();
        objective.initialize(&[1.0, 0.0, 1.0, 0.0]);
        assert_eq!(objective.bias(), 0.0);

        objective.initialize(&[1.0, 1.0, 1.0, 1.0, 0.0]);
        assert!((objective.bias() - 0.5 * (4.0 as NumT).ln()).abs() < 1e-5);
        assert!((probability(objective.bias()) - 0.8).abs() < 1e-5);

        objective.initialize(&[0.0, 0.0]);
        assert!(objective.bias().is_finite());
        assert!(objective.bias() < 0.0);
    }
}

/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::ops::{Add, Sub};

use log::debug;

use crate::NumT;
use crate::config::Config;
use crate::dataset::Dataset;
use crate::hist_store::HistStore;
use crate::objective::Objective;
use crate::tree::{Tree, SplitCrit};

// ------------------------------------------------------------------------------------------------

#[derive(Debug, Default, Clone, Copy, PartialEq)]
struct HistVal {
    grad_sum: NumT,
    hess_sum: NumT,
    example_count: u32,
}

impl Sub for HistVal {
    type Output = HistVal;
    fn sub(self, other: HistVal) -> HistVal {
        HistVal {
            grad_sum: self.grad_sum - other.grad_sum,
            hess_sum: self.hess_sum - other.hess_sum,
            example_count: self.example_count - other.example_count,
        }
    }
}

impl Add for HistVal {
    type Output = HistVal;
    fn add(self, other: HistVal) -> HistVal {
        HistVal {
            grad_sum: self.grad_sum + other.grad_sum,
            hess_sum: self.hess_sum + other.hess_sum,
            example_count: self.example_count + other.example_count,
        }
    }
}








// ------------------------------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Split {
    split_crit: SplitCrit,
    split_id: usize,
    gain: NumT,
    left: HistVal,
    right: HistVal,
}

/// A leaf of the tree that is being grown. Its examples are `examples[range.0..range.1]` in the
/// learner context.
struct Node2Split {
    node_id: usize,
    range: (usize, usize),
    stats: HistVal,
    split: Option<Split>, // best split of this leaf, None if the leaf cannot be split
}






// ------------------------------------------------------------------------------------------------

/// Resources used by the tree learner that can be reused.
pub struct TreeLearnerContext<'a> {
    config: &'a Config,
    dataset: &'a Dataset<'a>,

    hist_store: HistStore<HistVal>,
    examples: Vec<usize>,
    leafs: Vec<Node2Split>,
}

impl <'a> TreeLearnerContext<'a> {
    pub fn new(config: &'a Config, dataset: &'a Dataset<'a>) -> Self {
        let nbins_iter = (0..dataset.nfeatures())
            .map(|feat_id| dataset.get_nbins(feat_id) as u32);

        TreeLearnerContext {
            config,
            dataset,

            hist_store: HistStore::new(nbins_iter),
            examples: Vec::with_capacity(dataset.nexamples()),
            leafs: Vec::new(),
        }
    }

    fn reset(&mut self) {
        self.hist_store.reset();
        self.examples.clear();
        self.examples.extend(0..self.dataset.nexamples());
        self.leafs.clear();
    }
}






// ------------------------------------------------------------------------------------------------

/// Grows a single tree best-first: the leaf whose best split has the largest gain is split next,
/// until the tree has `max_nleaves` leafs or no leaf can be split anymore.
pub struct TreeLearner<'a, 'b>
where 'a: 'b { // a lives longer than b
    ctx: &'b mut TreeLearnerContext<'a>,
    gradients: &'b [NumT],
    hessians: &'b [NumT],
    tree: Tree,
}

impl <'a, 'b> TreeLearner<'a, 'b>
where 'a: 'b {
    pub fn new(ctx: &'b mut TreeLearnerContext<'a>, objective: &'b dyn Objective)
        -> TreeLearner<'a, 'b>
    {
        ctx.reset();
        assert_eq!(objective.gradients().len(), ctx.dataset.nexamples());
        TreeLearner {
            ctx,
            gradients: objective.gradients(),
            hessians: objective.hessians(),
            tree: Tree::new(),
        }
    }

    pub fn train(mut self) -> Tree {
        let max_nleaves = self.ctx.config.max_nleaves;
        let root_n2s = self.get_root_n2s();
        self.ctx.leafs.push(root_n2s);

        while self.tree.nleafs() < max_nleaves {
            let best_leaf = self.ctx.leafs.iter()
                .enumerate()
                .filter_map(|(i, n2s)| n2s.split.as_ref().map(|s| (i, s.gain)))
                .fold(None, |best: Option<(usize, NumT)>, (i, gain)| match best {
                    Some((_, best_gain)) if best_gain >= gain => best,
                    _ => Some((i, gain)),
                });

            let mut n2s = match best_leaf {
                Some((i, _)) => self.ctx.leafs.swap_remove(i),
                None => break,
            };
            if let Some(split) = n2s.split.take() {
                let (left_n2s, right_n2s) = self.split_leaf(&n2s, split);
                self.ctx.leafs.push(left_n2s);
                self.ctx.leafs.push(right_n2s);
            }
        }

        for i in 0..self.ctx.leafs.len() {
            let (node_id, stats) = (self.ctx.leafs[i].node_id, self.ctx.leafs[i].stats);
            let value = self.get_leaf_value(stats);
            self.tree.set_value(node_id, value);
        }

        self.tree
    }

    fn get_root_n2s(&mut self) -> Node2Split {
        let nexamples = self.ctx.examples.len();
        let mut stats = HistVal::default();
        for &i in &self.ctx.examples {
            stats.grad_sum += self.gradients[i];
            stats.hess_sum += self.hessians[i];
        }
        stats.example_count = nexamples as u32;

        self.ctx.hist_store.alloc_histograms(0);
        self.build_histograms(0, (0, nexamples));
        let split = self.find_best_split(0, stats);
        if split.is_none() { self.ctx.hist_store.free_histograms(0); }

        Node2Split { node_id: 0, range: (0, nexamples), stats, split }
    }

    /// Split the leaf in the tree, distribute its examples over the children, and find the best
    /// splits of the children.
    fn split_leaf(&mut self, parent: &Node2Split, split: Split) -> (Node2Split, Node2Split) {
        let parent_id = parent.node_id;
        debug!("N{:03} split F{:02} < {:.4} gain {:.4} ({} / {} examples)", parent_id,
               split.split_crit.feature_id, split.split_crit.split_value, split.gain,
               split.left.example_count, split.right.example_count);

        let (left_id, right_id) = self.tree.split_node(parent_id, split.split_crit.clone());
        let mid = self.split_examples(parent.range, &split);
        debug_assert_eq!(mid - parent.range.0, split.left.example_count as usize);

        let left_range = (parent.range.0, mid);
        let right_range = (mid, parent.range.1);

        // build the histograms of the smallest child, derive the other from the parent
        let (small, large) = if split.left.example_count <= split.right.example_count {
            ((left_id, left_range), (right_id, right_range))
        } else {
            ((right_id, right_range), (left_id, left_range))
        };
        self.ctx.hist_store.alloc_histograms(small.0);
        self.build_histograms(small.0, small.1);
        self.ctx.hist_store.alloc_histograms(large.0);
        self.ctx.hist_store.hists_subtract(parent_id, small.0, large.0);
        self.ctx.hist_store.free_histograms(parent_id);

        let left_n2s = self.get_child_n2s(left_id, left_range, split.left);
        let right_n2s = self.get_child_n2s(right_id, right_range, split.right);
        (left_n2s, right_n2s)
    }

    fn get_child_n2s(&mut self, node_id: usize, range: (usize, usize), stats: HistVal)
        -> Node2Split
    {
        let split = self.find_best_split(node_id, stats);
        if split.is_none() { self.ctx.hist_store.free_histograms(node_id); }
        Node2Split { node_id, range, stats, split }
    }

    /// Reorder the examples of the range so that the left examples come first. Returns the index
    /// of the first right example.
    fn split_examples(&mut self, range: (usize, usize), split: &Split) -> usize {
        let bins = self.ctx.dataset.get_bins(split.split_crit.feature_id);
        let examples = &mut self.ctx.examples[range.0..range.1];
        let is_left = |i: usize| bins[i] as usize <= split.split_id;

        let mut left_i = 0;               // index first unknown example (left or right)
        let mut right_i = examples.len(); // index first right example

        while left_i != right_i {
            if is_left(examples[left_i]) { left_i += 1; }
            else {
                right_i -= 1;
                examples.swap(left_i, right_i);
            }
        }

        range.0 + left_i
    }

    fn build_histograms(&mut self, node_id: usize, range: (usize, usize)) {
        let ctx = &mut *self.ctx;
        let examples = &ctx.examples[range.0..range.1];

        for feat_id in 0..ctx.dataset.nfeatures() {
            if ctx.dataset.get_nbins(feat_id) <= 1 { continue; } // nothing to split on
            let bins = ctx.dataset.get_bins(feat_id);
            let hist = ctx.hist_store.get_hist_mut(node_id, feat_id);

            for &i in examples {
                let bucket = &mut hist[bins[i] as usize];
                bucket.grad_sum += self.gradients[i];
                bucket.hess_sum += self.hessians[i];
                bucket.example_count += 1;
            }
        }
    }

    fn find_best_split(&self, node_id: usize, stats: HistVal) -> Option<Split> {
        let min_examples = self.ctx.config.min_examples_leaf;
        if (stats.example_count as usize) < min_examples.saturating_mul(2) { return None; }

        let mut best_split = None;
        let mut best_gain = self.ctx.config.min_gain;
        let ploss = self.get_loss(stats);

        // Compute best split based on each feature's histogram.
        for feat_id in 0..self.ctx.dataset.nfeatures() {
            let nbins = self.ctx.dataset.get_nbins(feat_id);
            if nbins <= 1 { continue; }

            let hist = self.ctx.hist_store.get_hist(node_id, feat_id);
            let mut left = HistVal::default();

            for split_id in 0..nbins-1 {
                left = left + hist[split_id];
                let right = stats - left;

                if (left.example_count as usize) < min_examples { continue; }
                if (right.example_count as usize) < min_examples { break; }

                let gain = ploss - self.get_loss(left) - self.get_loss(right);
                if gain > best_gain {
                    best_gain = gain;
                    best_split = Some(Split {
                        split_crit: SplitCrit {
                            feature_id: feat_id,
                            split_value: self.ctx.dataset.get_split_value(feat_id, split_id),
                        },
                        split_id,
                        gain,
                        left,
                        right,
                    });
                }
            }
        }
        best_split
    }

    fn get_loss(&self, stats: HistVal) -> NumT {
        let lambda = self.ctx.config.reg_lambda;
        let hess = stats.hess_sum.max(0.0) + lambda;
        if hess <= 0.0 { return 0.0; }
        -0.5 * ((stats.grad_sum * stats.grad_sum) / hess)
    }

    /// Newton step for the examples in the leaf.
    fn get_leaf_value(&self, stats: HistVal) -> NumT {
        let lambda = self.ctx.config.reg_lambda;
        let hess = stats.hess_sum + lambda;
        if hess <= 0.0 { return 0.0; }
        -stats.grad_sum / hess
    }
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::data::Data;
    use crate::objective::Binary;
    use crate::record::CallRecord;

    /// Label is positive iff hour_of_day >= 12; other features are noise.
    fn data(n: usize) -> Data {
        let records: Vec<CallRecord> = (0..n)
            .map(|i| {
                let hour = (i % 24) as NumT;
                let mut r = CallRecord::from_features(&[
                    (i % 5) as NumT, (i * 7 % 13) as NumT, 3.0, (i % 2) as NumT,
                    hour, 2023.0, (i % 12) as NumT, (i % 28) as NumT,
                ]);
                r.status = hour >= 12.0;
                r
            })
            .collect();
        Data::from_records(&records)
    }

    fn objective(data: &Data) -> Binary {
        let mut objective = Binary::new();
        let target = data.get_target();
        objective.initialize(target);
        let predictions = vec![objective.bias(); target.len()];
        objective.update(target, &predictions);
        objective
    }

    #[test]
    fn separable_split() {
        let data = data(480);
        let mut config = Config::new();
        config.max_nleaves = 2;
        let dataset = Dataset::new(&config, &data);
        let objective = objective(&data);

        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let tree = TreeLearner::new(&mut ctx, &objective).train();

        assert_eq!(tree.nleafs(), 2);
        let crit = tree.split_crit(0).unwrap();
        assert_eq!(crit.feature_id, 4);
        assert_eq!(crit.split_value, 11.5);

        let pred = tree.predict(&data);
        for (&p, &t) in pred.iter().zip(data.get_target()) {
            if t > 0.5 { assert!(p > 0.0); } else { assert!(p < 0.0); }
        }
    }

    #[test]
    fn max_nleaves() {
        let data = data(480);
        let mut config = Config::new();
        config.max_nleaves = 5;
        config.min_gain = -1.0; // accept any split
        let dataset = Dataset::new(&config, &data);
        let objective = objective(&data);

        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let tree = TreeLearner::new(&mut ctx, &objective).train();
        assert_eq!(tree.nleafs(), 5);

        // the context can be reused for the next tree
        let tree = TreeLearner::new(&mut ctx, &objective).train();
        assert_eq!(tree.nleafs(), 5);
    }

    #[test]
    fn min_examples_leaf() {
        let data = data(48);
        let mut config = Config::new();
        config.min_examples_leaf = 25; // more than half of the examples
        let dataset = Dataset::new(&config, &data);
        let objective = objective(&data);

        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let tree = TreeLearner::new(&mut ctx, &objective).train();
        assert_eq!(tree.nleafs(), 1);
        assert!(tree.node_value(0).abs() < 1e-5); // balanced: gradients sum to zero
    }

    #[test]
    fn huge_min_examples_leaf() {
        let data = data(96);
        let mut config = Config::new();
        config.min_examples_leaf = usize::max_value();
        let dataset = Dataset::new(&config, &data);
        let objective = objective(&data);

        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let tree = TreeLearner::new(&mut ctx, &objective).train();
        assert_eq!(tree.nleafs(), 1);

        // does not wrap around to a small leaf size
        config.min_examples_leaf = (u32::max_value() as usize).saturating_add(11);
        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let tree = TreeLearner::new(&mut ctx, &objective).train();
        assert_eq!(tree.nleafs(), 1);
    }

    #[test]
    fn leaf_sizes_respected() {
        let data = data(240);
        let mut config = Config::new();
        config.min_examples_leaf = 30;
        config.min_gain = -1.0;
        let dataset = Dataset::new(&config, &data);
        let objective = objective(&data);

        let mut ctx = TreeLearnerContext::new(&config, &dataset);
        let _tree = TreeLearner::new(&mut ctx, &objective).train();
        for n2s in &ctx.leafs {
            assert!(n2s.stats.example_count >= 30);
            assert_eq!(n2s.range.1 - n2s.range.0, n2s.stats.example_count as usize);
        }
        let total: u32 = ctx.leafs.iter().map(|n2s| n2s.stats.example_count).sum();
        assert_eq!(total, 240);
    }
}

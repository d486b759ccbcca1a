/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::fmt::{Debug, Formatter, Result as FmtResult};

use crate::NumT;
use crate::data::Data;

#[derive(Debug, Clone, PartialEq)]
pub struct SplitCrit {
    pub feature_id: usize,
    /// Values less than the split value go left.
    pub split_value: NumT,
}

#[derive(Debug, Clone)]
struct Node {
    split_crit: Option<SplitCrit>, // None for leafs
    left: usize,
    right: usize,
    value: NumT,
}

impl Node {
    fn leaf(value: NumT) -> Node {
        Node { split_crit: None, left: 0, right: 0, value }
    }
}

/// Binary regression tree with numerical `x < v` tests. Node 0 is the root; children are
/// appended when a leaf is split, so trees of any shape can be grown.
#[derive(Clone)]
pub struct Tree {
    nodes: Vec<Node>,
    shrinkage: NumT,
}

impl Tree {
    pub fn new() -> Tree {
        Tree {
            nodes: vec![Node::leaf(0.0)],
            shrinkage: 1.0,
        }
    }

    pub fn nnodes(&self) -> usize { self.nodes.len() }
    pub fn nleafs(&self) -> usize { (self.nodes.len() + 1) / 2 }
    pub fn ninternal(&self) -> usize { self.nodes.len() / 2 }
    pub fn is_leaf(&self, node_id: usize) -> bool { self.nodes[node_id].split_crit.is_none() }
    pub fn left_child(&self, node_id: usize) -> usize { self.nodes[node_id].left }
    pub fn right_child(&self, node_id: usize) -> usize { self.nodes[node_id].right }
    pub fn split_crit(&self, node_id: usize) -> Option<&SplitCrit> {
        self.nodes[node_id].split_crit.as_ref()
    }
    pub fn node_value(&self, node_id: usize) -> NumT { self.nodes[node_id].value }

    pub fn set_value(&mut self, node_id: usize, value: NumT) {
        safety_check!(value.is_finite());
        self.nodes[node_id].value = value;
    }

    /// Turn a leaf into an internal node, returns the ids of the new (left, right) leafs.
    pub fn split_node(&mut self, node_id: usize, split_crit: SplitCrit) -> (usize, usize) {
        assert!(self.is_leaf(node_id), "splitting internal node {}", node_id);

        let left = self.nodes.len();
        let right = left + 1;
        let value = self.nodes[node_id].value;
        self.nodes.push(Node::leaf(value));
        self.nodes.push(Node::leaf(value));

        let node = &mut self.nodes[node_id];
        node.split_crit = Some(split_crit);
        node.left = left;
        node.right = right;
        (left, right)
    }

    pub fn set_shrinkage(&mut self, scale: NumT) {
        self.shrinkage *= scale;
    }

    /// Find the leaf the example with the given feature accessor sorts into.
    fn predict_leaf_id<F>(&self, feature_value: F) -> usize
    where F: Fn(usize) -> NumT
    {
        let mut node_id = 0;
        while let Some(split_crit) = &self.nodes[node_id].split_crit {
            let node = &self.nodes[node_id];
            node_id = if feature_value(split_crit.feature_id) < split_crit.split_value { node.left }
                      else                                                               { node.right }
        }
        node_id
    }

    pub fn predict_features(&self, features: &[NumT]) -> NumT {
        let leaf_id = self.predict_leaf_id(|feat_id| features[feat_id]);
        self.shrinkage * self.nodes[leaf_id].value
    }

    pub fn predict_single(&self, data: &Data, i: usize) -> NumT {
        let leaf_id = self.predict_leaf_id(|feat_id| data.get_feature(feat_id)[i]);
        self.shrinkage * self.nodes[leaf_id].value
    }

    /// Predict and store the result as defined by `f` in `predict_buf`.
    pub fn predict_and<F>(&self, data: &Data, predict_buf: &mut [NumT], f: F)
    where F: Fn(NumT, &mut NumT) {
        assert_eq!(predict_buf.len(), data.nexamples());
        for (i, buf_elem) in predict_buf.iter_mut().enumerate() {
            f(self.predict_single(data, i), buf_elem);
        }
    }

    pub fn predict(&self, data: &Data) -> Vec<NumT> {
        let mut predictions = vec![0.0; data.nexamples()];
        self.predict_and(data, &mut predictions, |prediction, buf_elem| *buf_elem = prediction);
        predictions
    }
}

impl Default for Tree {
    fn default() -> Tree { Tree::new() }
}

impl Debug for Tree {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let mut stack = vec![(0, 0)];
        while let Some((node_id, depth)) = stack.pop() {
            let indent: String = std::iter::repeat("   ").take(depth).collect();
            let node = &self.nodes[node_id];
            match &node.split_crit {
                Some(crit) => {
                    writeln!(f, "{}[{:<3}] F{:02} < {}", indent, node_id, crit.feature_id,
                             crit.split_value)?;
                    stack.push((self.right_child(node_id), depth + 1));
                    stack.push((self.left_child(node_id), depth + 1));
                },
                None => {
                    writeln!(f, "{}[{:<3}] leaf {:.5}", indent, node_id,
                             self.shrinkage * node.value)?;
                }
            }
        }
        Ok(())
    }
}




// ------------------------------------------------------------------------------------------------

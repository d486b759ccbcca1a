/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::ops::Sub;

use fnv::FnvHashMap as HashMap;

const INITIAL_HIST_STORE_CAPACITY: usize = 4096;

/// Store a bunch of histograms together in one store. `T` is the information to store per
/// histogram bucket (e.g. gradient sum, hessian sum, bucket count).
pub struct HistStore<T> {
    /// Map a node_id to a range into the buffer.
    ranges: HashMap<usize, (u32, u32)>,

    /// Storage for histogram data.
    buffer: Vec<T>,

    /// The layout of the histograms: summed bin counts of the features.
    hist_layout: Vec<u32>,

    /// Ranges of freed histograms, ready for reuse.
    recycle_list: Vec<(u32, u32)>,
}

impl <T> HistStore<T>
where T: Default + Copy {
    pub fn new<I>(bin_size_iter: I) -> HistStore<T>
    where I: Iterator<Item = u32> {
        let mut hist_layout = vec![0];
        let mut accum = 0;
        for bin_size in bin_size_iter {
            accum += bin_size;
            hist_layout.push(accum);
        }

        HistStore {
            ranges: HashMap::default(),
            buffer: Vec::with_capacity(INITIAL_HIST_STORE_CAPACITY),
            hist_layout,
            recycle_list: Vec::new(),
        }
    }

    fn total_bins(&self) -> usize {
        *self.hist_layout.last().unwrap_or(&0) as usize
    }

    pub fn has_histograms_for_node(&self, node_id: usize) -> bool {
        self.ranges.contains_key(&node_id)
    }

    /// Allocate zeroed histograms for all features of the node.
    pub fn alloc_histograms(&mut self, node_id: usize) {
        debug_assert!(!self.has_histograms_for_node(node_id));
        let range = match self.recycle_list.pop() {
            Some(range) => {
                let (lo, hi) = (range.0 as usize, range.1 as usize);
                self.buffer[lo..hi].iter_mut().for_each(|x| *x = T::default());
                range
            },
            None => {
                let old_len = self.buffer.len();
                let new_len = old_len + self.total_bins();
                debug_assert!(new_len < u32::max_value() as usize);
                self.buffer.resize(new_len, T::default());
                (old_len as u32, new_len as u32)
            }
        };
        self.ranges.insert(node_id, range);
    }

    pub fn free_histograms(&mut self, node_id: usize) {
        if let Some(range) = self.ranges.remove(&node_id) {
            self.recycle_list.push(range);
        }
    }

    pub fn reset(&mut self) {
        self.ranges.clear();
        self.recycle_list.clear();
        self.buffer.clear();
    }

    fn get_range(&self, node_id: usize, feat_id: usize) -> (usize, usize) {
        let base = self.ranges[&node_id].0 as usize;
        let lo = self.hist_layout[feat_id] as usize;
        let hi = self.hist_layout[feat_id + 1] as usize;
        (base + lo, base + hi)
    }

    /// Get the histogram for the feature in the given node.
    pub fn get_hist(&self, node_id: usize, feat_id: usize) -> &[T] {
        let (lo, hi) = self.get_range(node_id, feat_id);
        &self.buffer[lo..hi]
    }

    /// Get the mutable histogram for the feature in the given node.
    pub fn get_hist_mut(&mut self, node_id: usize, feat_id: usize) -> &mut [T] {
        let (lo, hi) = self.get_range(node_id, feat_id);
        &mut self.buffer[lo..hi]
    }

    /// Fill the (allocated) histograms of `target` with `parent - sibling`.
    pub fn hists_subtract(&mut self, parent: usize, sibling: usize, target: usize)
    where T: Sub<Output = T> {
        let total = self.total_bins();
        let p = self.ranges[&parent].0 as usize;
        let s = self.ranges[&sibling].0 as usize;
        let t = self.ranges[&target].0 as usize;
        for k in 0..total {
            self.buffer[t + k] = self.buffer[p + k] - self.buffer[s + k];
        }
    }
}

/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::ops::AddAssign;

use crate::NumT;

/// Equal-width bins over a value range. Used to estimate quantiles of a feature without sorting
/// all of its values.
pub struct Binner<'a, BinT> {
    bins: &'a mut [BinT],
    min_value: NumT,
    delta: NumT,
}

impl <'a, BinT> Binner<'a, BinT> {
    pub fn new(bins: &'a mut [BinT], limits: (NumT, NumT)) -> Binner<'a, BinT> {
        safety_check!(limits.0.is_finite() && limits.1.is_finite());
        safety_check!(limits.0 < limits.1);
        safety_check!(!bins.is_empty());

        let delta = (limits.1 - limits.0) / bins.len() as NumT;

        Binner {
            bins,
            min_value: limits.0,
            delta,
        }
    }

    pub fn insert<D, F>(&mut self, value: NumT, data: D, combiner: F)
    where F: Fn(&mut BinT, D) {
        let bin_index = self.get_bin(value);
        combiner(&mut self.bins[bin_index], data);
    }

    /// Iterate over the bins containing the given (ascending) ranks.
    pub fn rank_iter<'b, R, Iter, F>(&'b self, ranks: Iter, extractor: F)
        -> RankIter<'b, R, BinT, Iter, F>
    where R: Copy + Default + PartialOrd + AddAssign,
          Iter: Iterator<Item = R>,
          F: Fn(&BinT) -> R,
    {
        RankIter {
            bins: &self.bins[..],
            ranks,
            extractor,
            accum: R::default(),
            bin_index: 0,
        }
    }

    /// The lower boundary of the bin.
    pub fn bin_representative(&self, bin: usize) -> NumT {
        self.min_value + bin.min(self.bins.len()) as NumT * self.delta
    }

    pub fn get_bin(&self, value: NumT) -> usize {
        let x = (value - self.min_value) / self.delta;
        let i = x.floor() as isize;
        (i.max(0) as usize).min(self.bins.len() - 1)
    }

    pub fn nbins(&self) -> usize { self.bins.len() }
}

pub struct RankIter<'a, R, BinT, Iter, F>
where Iter: Iterator<Item = R>,
      F: Fn(&BinT) -> R,
{
    bins: &'a [BinT],
    ranks: Iter,
    extractor: F,
    accum: R,
    bin_index: usize,
}

impl <'a, R, BinT, Iter, F> Iterator for RankIter<'a, R, BinT, Iter, F>
where R: Copy + PartialOrd + Default + AddAssign,
      Iter: Iterator<Item = R>,
      F: Fn(&BinT) -> R,
{
    type Item = usize;
    fn next(&mut self) -> Option<usize> {
        let rank = self.ranks.next()?;

        while self.accum <= rank && self.bin_index < self.bins.len() {
            self.accum += (self.extractor)(&self.bins[self.bin_index]);
            self.bin_index += 1;
        }

        Some(self.bin_index.max(1) - 1)
    }
}

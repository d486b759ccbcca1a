/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use std::cmp::Ordering;

use log::debug;

use crate::{NumT, POS_INF};
use crate::config::Config;
use crate::data::Data;
use crate::binner::Binner;

pub type BinT = u8;

const QUANTILE_EST_NBINS: usize = 1024;

/// The training data with every feature value replaced by the index of its bin. Bins are
/// separated by split candidates: bin `k` holds the values `x` with
/// `candidates[k-1] <= x < candidates[k]`. NaN sorts after every candidate, as `NaN < v` is
/// false when predicting; a feature with NaN values gets a last candidate at infinity to separate
/// them from the finite values.
pub struct Dataset<'a> {
    data: &'a Data,
    split_candidates: Vec<Vec<NumT>>,
    bins: Vec<Vec<BinT>>,
}

impl <'a> Dataset<'a> {
    pub fn new(config: &Config, data: &'a Data) -> Self {
        let max_nbins = config.max_nbins.min(BinT::MAX as usize + 1);
        let mut split_candidates = Vec::with_capacity(data.nfeatures());
        let mut bins = Vec::with_capacity(data.nfeatures());

        for feat_id in 0..data.nfeatures() {
            let values = data.get_feature(feat_id);
            let candidates = Self::compute_split_candidates(values, max_nbins);
            debug!("feature {:<13} {:3} split candidates", data.feat_name(feat_id),
                   candidates.len());

            bins.push(values.iter().map(|&x| Self::get_bin(&candidates, x)).collect());
            split_candidates.push(candidates);
        }

        Dataset {
            data,
            split_candidates,
            bins,
        }
    }

    fn compute_split_candidates(values: &[NumT], max_nbins: usize) -> Vec<NumT> {
        let has_nan = values.iter().any(|x| x.is_nan());
        let mut candidates = if has_nan {
            Self::compute_finite_split_candidates(values, max_nbins.saturating_sub(1).max(1))
        } else {
            Self::compute_finite_split_candidates(values, max_nbins)
        };

        let has_finite = values.iter().any(|x| x.is_finite());
        if has_nan && has_finite && max_nbins >= 2 {
            candidates.push(POS_INF);
        }
        candidates
    }

    fn compute_finite_split_candidates(values: &[NumT], max_nbins: usize) -> Vec<NumT> {
        let mut distinct: Vec<NumT> = values.iter().cloned().filter(|x| x.is_finite()).collect();
        distinct.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        distinct.dedup();

        if distinct.len() <= 1 { return Vec::new(); } // not a useful feature, only 1 value

        if distinct.len() <= max_nbins {
            // one bin per value, split halfway between consecutive values
            return distinct.windows(2)
                .map(|w| w[0] + 0.5 * (w[1] - w[0]))
                .collect();
        }

        // too many values: approximate quantiles with equal-width bins
        let limits = (distinct[0], distinct[distinct.len() - 1]);
        let mut counts = vec![0u32; QUANTILE_EST_NBINS];
        let mut binner = Binner::new(&mut counts, limits);
        let combiner = |bin: &mut u32, _: ()| *bin += 1;
        let mut nvalues = 0;
        for &x in values.iter().filter(|x| x.is_finite()) {
            binner.insert(x, (), combiner);
            nvalues += 1;
        }

        let rank_step = nvalues as NumT / max_nbins as NumT;
        let ranks = (1..max_nbins).map(|i| (i as NumT * rank_step).round() as u32);
        let qbins = binner.rank_iter(ranks, |&count| count);
        let mut last_bin = usize::max_value();
        let mut split_candidates = Vec::with_capacity(max_nbins - 1);
        for bin in qbins {
            if bin == last_bin || bin + 1 >= binner.nbins() { continue; }
            last_bin = bin;
            split_candidates.push(binner.bin_representative(bin + 1));
        }
        split_candidates
    }

    fn get_bin(candidates: &[NumT], value: NumT) -> BinT {
        if value.is_nan() { return candidates.len() as BinT; }
        candidates.iter().take_while(|&&c| c <= value).count() as BinT
    }

    pub fn nfeatures(&self) -> usize { self.data.nfeatures() }
    pub fn nexamples(&self) -> usize { self.data.nexamples() }
    pub fn get_target(&self) -> &'a [NumT] { self.data.get_target() }

    /// Number of bins actually used by the feature.
    pub fn get_nbins(&self, feat_id: usize) -> usize { self.split_candidates[feat_id].len() + 1 }
    pub fn get_bins(&self, feat_id: usize) -> &[BinT] { &self.bins[feat_id] }

    /// The threshold of the split that sends bins `0..=split_id` left.
    pub fn get_split_value(&self, feat_id: usize, split_id: usize) -> NumT {
        self.split_candidates[feat_id][split_id]
    }
}




// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use crate::record::CallRecord;

    fn data(n: usize) -> Data {
        let records: Vec<CallRecord> = (0..n)
            .map(|i| CallRecord::from_features(&[
                (i % 3) as NumT,    // 3 values
                i as NumT,          // many values
                5.0,                // constant
                (i % 2) as NumT,
                0.0, 0.0, 0.0, 0.0,
            ]))
            .collect();
        Data::from_records(&records)
    }

    #[test]
    fn few_values() {
        let data = data(30);
        let config = Config::new();
        let dataset = Dataset::new(&config, &data);

        assert_eq!(dataset.get_nbins(0), 3);
        assert_eq!(dataset.get_split_value(0, 0), 0.5);
        assert_eq!(dataset.get_split_value(0, 1), 1.5);
        assert_eq!(&dataset.get_bins(0)[0..4], &[0, 1, 2, 0]);

        assert_eq!(dataset.get_nbins(3), 2);
        assert_eq!(dataset.get_split_value(3, 0), 0.5);
    }

    #[test]
    fn constant_feature() {
        let data = data(30);
        let dataset = Dataset::new(&Config::new(), &data);
        assert_eq!(dataset.get_nbins(2), 1);
        assert!(dataset.get_bins(2).iter().all(|&b| b == 0));
    }

    #[test]
    fn nan_values_in_last_bin() {
        let values = [3.0, NumT::NAN, 1.0, 3.0, NumT::NAN, 2.0, POS_INF];
        let records: Vec<CallRecord> = values.iter()
            .map(|&x| CallRecord::from_features(&[0.0, 0.0, 0.0, 0.0, x, 0.0, 0.0, 0.0]))
            .collect();
        let data = Data::from_records(&records);
        let dataset = Dataset::new(&Config::new(), &data);

        assert_eq!(dataset.get_nbins(4), 4);
        assert_eq!(dataset.get_split_value(4, 0), 1.5);
        assert_eq!(dataset.get_split_value(4, 1), 2.5);
        assert_eq!(dataset.get_split_value(4, 2), POS_INF);
        assert_eq!(dataset.get_bins(4), &[2, 3, 0, 2, 3, 1, 3]);

        // bins agree with the `x < v` test used when predicting
        for (&x, &bin) in values.iter().zip(dataset.get_bins(4)) {
            for k in 0..3 {
                assert_eq!((bin as usize) <= k, x < dataset.get_split_value(4, k));
            }
        }
    }

    #[test]
    fn nan_with_single_finite_value() {
        let values = [7.0, NumT::NAN, 7.0];
        let records: Vec<CallRecord> = values.iter()
            .map(|&x| CallRecord::from_features(&[x, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0]))
            .collect();
        let data = Data::from_records(&records);
        let dataset = Dataset::new(&Config::new(), &data);

        assert_eq!(dataset.get_nbins(0), 2);
        assert_eq!(dataset.get_bins(0), &[0, 1, 0]);
    }

    #[test]
    fn many_values() {
        let data = data(1000);
        let mut config = Config::new();
        config.max_nbins = 16;
        let dataset = Dataset::new(&config, &data);

        let nbins = dataset.get_nbins(1);
        assert!(nbins > 8 && nbins <= 16, "nbins = {}", nbins);

        let candidates: Vec<NumT> = (0..nbins-1).map(|k| dataset.get_split_value(1, k)).collect();
        assert!(candidates.windows(2).all(|w| w[0] < w[1]));

        // bins agree with the split thresholds
        let values = data.get_feature(1);
        for (&x, &bin) in values.iter().zip(dataset.get_bins(1)) {
            for k in 0..nbins-1 {
                let goes_left = (bin as usize) <= k;
                assert_eq!(goes_left, x < candidates[k]);
            }
        }
    }
}

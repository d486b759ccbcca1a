/*
 * Copyright 2019 DTAI Research Group - KU Leuven.
 * License: Apache License 2.0
 * Author: Laurens Devos
*/

use crate::{NumT, POS_INF, NEG_INF};
use crate::record::{CallRecord, FeatureVector, FEATURE_NAMES, NFEATURES};

/// Column store of the feature vectors. The last column is the target: 1.0 for a successful
/// call, 0.0 otherwise.
#[derive(Debug, Clone)]
pub struct Data {
    names: Vec<String>,
    nfeatures: usize,
    nexamples: usize,
    features: Vec<Vec<NumT>>,
    limits: Vec<(NumT, NumT)>, // feature min / max value
}

impl Data {
    pub fn from_records(records: &[CallRecord]) -> Data {
        let rows = records.iter().map(|r| (r.features(), if r.label() { 1.0 } else { 0.0 }));
        Self::from_rows(rows)
    }

    /// Data with a single unlabeled example.
    pub fn from_features(features: &FeatureVector) -> Data {
        Self::from_rows(std::iter::once((*features, 0.0)))
    }

    fn from_rows<I>(rows: I) -> Data
    where I: Iterator<Item = (FeatureVector, NumT)>
    {
        let ncolumns = NFEATURES + 1;
        let mut features = vec![Vec::new(); ncolumns];
        let mut limits = vec![(POS_INF, NEG_INF); ncolumns];
        let mut nexamples = 0;

        for (fvec, target) in rows {
            let values = fvec.iter().chain(std::iter::once(&target));
            for (i, &value) in values.enumerate() {
                features[i].push(value);
                limits[i] = { let l = limits[i]; (l.0.min(value), l.1.max(value)) };
            }
            nexamples += 1;
        }

        let names = FEATURE_NAMES.iter()
            .chain(std::iter::once(&"Status"))
            .map(|name| name.to_string())
            .collect();

        Data {
            names,
            nfeatures: NFEATURES,
            nexamples,
            features,
            limits,
        }
    }

    /// A new data set with the examples at `indices`, in that order.
    pub fn select(&self, indices: &[usize]) -> Data {
        let features: Vec<Vec<NumT>> = self.features.iter()
            .map(|column| indices.iter().map(|&i| column[i]).collect())
            .collect();
        let limits = features.iter()
            .map(|column| column.iter().fold((POS_INF, NEG_INF), |l, &v| (l.0.min(v), l.1.max(v))))
            .collect();

        Data {
            names: self.names.clone(),
            nfeatures: self.nfeatures,
            nexamples: indices.len(),
            features,
            limits,
        }
    }

    pub fn nfeatures(&self) -> usize { self.nfeatures }
    pub fn nexamples(&self) -> usize { self.nexamples }
    pub fn is_empty(&self) -> bool { self.nexamples == 0 }
    pub fn feat_name(&self, feat_id: usize) -> &str { &self.names[feat_id] }
    pub fn feat_limits(&self, feat_id: usize) -> (NumT, NumT) { self.limits[feat_id] }
    pub fn target_id(&self) -> usize { self.nfeatures }
    pub fn get_feature(&self, feat_id: usize) -> &[NumT] { &self.features[feat_id] }
    pub fn get_target(&self) -> &[NumT] { &self.features[self.target_id()] }

    /// Number of examples with a positive target.
    pub fn npositive(&self) -> usize {
        self.get_target().iter().filter(|&&t| t > 0.5).count()
    }
}




// ------------------------------------------------------------------------------------------------

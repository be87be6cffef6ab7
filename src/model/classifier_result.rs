use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Output of one inference call on a [`Predictor`](crate::model::Predictor).
///
/// `distributions[step][bucket]` is the likelihood of category `bucket`
/// `step` records ahead. `actual_values[bucket]` is the value the predictor
/// associates with that bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassifierResult {
    pub actual_values: Vec<f64>,
    pub distributions: BTreeMap<usize, Vec<f64>>,
}

impl ClassifierResult {
    /// Distribution for `step`, if the predictor produced one.
    pub fn distribution(&self, step: usize) -> Option<&[f64]> {
        self.distributions.get(&step).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.distributions.is_empty()
    }
}

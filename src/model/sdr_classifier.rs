use std::collections::{BTreeMap, VecDeque};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{ClassifierResult, Predictor};

/// Construction parameters of an [`SdrClassifier`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SdrClassifierParams {
    /// Prediction horizons, in records.
    pub steps: Vec<usize>,
    /// Learning rate of the softmax weights.
    pub alpha: f64,
    /// Smoothing of the per-bucket representative values.
    pub act_value_alpha: f64,
    pub verbosity: u32,
}

impl Default for SdrClassifierParams {
    fn default() -> Self {
        SdrClassifierParams {
            steps: vec![0],
            alpha: 0.001,
            act_value_alpha: 0.3,
            verbosity: 1,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ClassifierError {
    #[error("record {record} does not follow previous record {previous}")]
    RecordOutOfOrder { record: u64, previous: u64 },
    #[error("{buckets} bucket indices but {values} actual values")]
    LabelLengthMismatch { buckets: usize, values: usize },
}

/// Online single-layer softmax regression from active columns to buckets,
/// one weight matrix per horizon.
#[derive(Debug, Clone)]
pub struct SdrClassifier {
    params: SdrClassifierParams,
    history: VecDeque<(u64, Vec<usize>)>,
    /// step -> input bit -> per-bucket weight.
    weights: BTreeMap<usize, Vec<Vec<f64>>>,
    num_buckets: usize,
    actual_values: Vec<Option<f64>>,
    last_record: Option<u64>,
}

impl SdrClassifier {
    pub fn new(params: SdrClassifierParams) -> SdrClassifier {
        let weights = params.steps.iter().map(|&step| (step, Vec::new())).collect();
        SdrClassifier {
            params,
            history: VecDeque::new(),
            weights,
            num_buckets: 0,
            actual_values: Vec::new(),
            last_record: None,
        }
    }

    pub fn params(&self) -> &SdrClassifierParams {
        &self.params
    }

    /// Number of distinct buckets seen so far (highest index + 1).
    pub fn num_buckets(&self) -> usize {
        self.num_buckets
    }

    fn max_steps(&self) -> usize {
        self.params.steps.iter().copied().max().unwrap_or(0)
    }

    fn infer_pattern(&self, step: usize, pattern: &[usize]) -> Vec<f64> {
        let mut sums = vec![0.0; self.num_buckets];
        if let Some(rows) = self.weights.get(&step) {
            for &bit in pattern {
                if let Some(row) = rows.get(bit) {
                    for (sum, w) in sums.iter_mut().zip(row) {
                        *sum += w;
                    }
                }
            }
        }
        softmax(&mut sums);
        sums
    }

    fn update_actual_values(&mut self, bucket_idx: &[usize], act_values: &[f64], categorical: bool) {
        for (&bucket, &value) in bucket_idx.iter().zip(act_values) {
            if bucket >= self.num_buckets {
                self.num_buckets = bucket + 1;
                self.actual_values.resize(self.num_buckets, None);
            }
            let slot = &mut self.actual_values[bucket];
            *slot = match *slot {
                Some(old) if !categorical => {
                    Some((1.0 - self.params.act_value_alpha) * old + self.params.act_value_alpha * value)
                }
                _ => Some(value),
            };
        }
    }

    fn learn_step(&mut self, step: usize, pattern: &[usize], bucket_idx: &[usize]) {
        let predicted = self.infer_pattern(step, pattern);
        let share = 1.0 / bucket_idx.len() as f64;
        let mut error: Vec<f64> = predicted.iter().map(|p| -p).collect();
        for &bucket in bucket_idx {
            error[bucket] += share;
        }

        let alpha = self.params.alpha;
        let num_buckets = self.num_buckets;
        let rows = self.weights.entry(step).or_default();
        for &bit in pattern {
            if bit >= rows.len() {
                rows.resize_with(bit + 1, Vec::new);
            }
            let row = &mut rows[bit];
            row.resize(num_buckets, 0.0);
            for (w, e) in row.iter_mut().zip(&error) {
                *w += alpha * e;
            }
        }
    }
}

impl Predictor for SdrClassifier {
    type Error = ClassifierError;

    fn compute(
        &mut self,
        record: u64,
        active: &[usize],
        bucket_idx: &[usize],
        act_values: &[f64],
        categorical: bool,
        learn: bool,
        infer: bool,
    ) -> Result<ClassifierResult, ClassifierError> {
        if let Some(previous) = self.last_record {
            if record <= previous {
                return Err(ClassifierError::RecordOutOfOrder { record, previous });
            }
        }
        if bucket_idx.len() != act_values.len() {
            return Err(ClassifierError::LabelLengthMismatch {
                buckets: bucket_idx.len(),
                values: act_values.len(),
            });
        }
        self.last_record = Some(record);

        // ── Pattern history ───────────────────────────────────────────────
        self.history.push_back((record, active.to_vec()));
        while self.history.len() > self.max_steps() + 1 {
            self.history.pop_front();
        }

        if learn {
            self.update_actual_values(bucket_idx, act_values, categorical);
        }

        // ── Inference, before this record is learned ──────────────────────
        let mut result = ClassifierResult::default();
        if infer {
            result.actual_values = self.actual_values.iter().map(|v| v.unwrap_or(0.0)).collect();
            for &step in &self.params.steps {
                result.distributions.insert(step, self.infer_pattern(step, active));
            }
        }

        // ── Learn each horizon from the pattern seen `step` records ago ───
        if learn && !bucket_idx.is_empty() {
            for step in self.params.steps.clone() {
                let past = record.checked_sub(step as u64);
                let pattern = self
                    .history
                    .iter()
                    .find(|(r, _)| Some(*r) == past)
                    .map(|(_, p)| p.clone());
                if let Some(pattern) = pattern {
                    self.learn_step(step, &pattern, bucket_idx);
                }
            }
        }

        Ok(result)
    }
}

fn softmax(values: &mut [f64]) {
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut total = 0.0;
    for v in values.iter_mut() {
        *v = (*v - max).exp();
        total += *v;
    }
    for v in values.iter_mut() {
        *v /= total;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier(steps: Vec<usize>, alpha: f64) -> SdrClassifier {
        SdrClassifier::new(SdrClassifierParams {
            steps,
            alpha,
            act_value_alpha: 0.3,
            verbosity: 0,
        })
    }

    fn argmax(v: &[f64]) -> usize {
        v.iter()
            .enumerate()
            .fold((0, f64::NEG_INFINITY), |best, (i, &x)| if x > best.1 { (i, x) } else { best })
            .0
    }

    #[test]
    fn nothing_to_predict_before_learning() {
        let mut c = classifier(vec![0], 0.1);
        let result = c.compute(0, &[1, 2], &[], &[], true, false, true).unwrap();
        assert_eq!(result.distribution(0), Some(&[][..]));
    }

    #[test]
    fn separates_two_patterns() {
        let mut c = classifier(vec![0], 0.5);
        let mut record = 0;
        for _ in 0..30 {
            c.compute(record, &[0, 1, 2], &[3], &[3.0], true, true, false).unwrap();
            c.compute(record + 1, &[7, 8, 9], &[1], &[1.0], true, true, false).unwrap();
            record += 2;
        }

        let a = c.compute(record, &[0, 1, 2], &[], &[], true, false, true).unwrap();
        let b = c.compute(record + 1, &[7, 8, 9], &[], &[], true, false, true).unwrap();
        let a = a.distribution(0).unwrap();
        let b = b.distribution(0).unwrap();

        assert_eq!(a.len(), 4);
        assert_eq!(argmax(a), 3);
        assert_eq!(argmax(b), 1);
        assert!((a.iter().sum::<f64>() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn future_horizon_uses_delayed_pattern() {
        let mut c = classifier(vec![1], 0.5);
        // Pattern [0] is always followed by label 2, pattern [5] by label 0.
        for i in 0..60u64 {
            let (pattern, label) = if i % 2 == 0 { ([0], 0) } else { ([5], 2) };
            c.compute(i, &pattern, &[label], &[label as f64], true, true, false).unwrap();
        }
        let result = c.compute(60, &[0], &[], &[], true, false, true).unwrap();
        assert_eq!(argmax(result.distribution(1).unwrap()), 2);
    }

    #[test]
    fn categorical_values_track_bucket() {
        let mut c = classifier(vec![0], 0.1);
        c.compute(0, &[1], &[4], &[4.0], true, true, false).unwrap();
        let result = c.compute(1, &[1], &[], &[], true, false, true).unwrap();
        assert_eq!(result.actual_values, vec![0.0, 0.0, 0.0, 0.0, 4.0]);
    }

    #[test]
    fn numeric_values_are_smoothed() {
        let mut c = classifier(vec![0], 0.1);
        c.compute(0, &[1], &[0], &[10.0], false, true, false).unwrap();
        c.compute(1, &[1], &[0], &[20.0], false, true, false).unwrap();
        let result = c.compute(2, &[1], &[], &[], false, false, true).unwrap();
        assert!((result.actual_values[0] - 13.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_stale_record_numbers() {
        let mut c = classifier(vec![0], 0.1);
        c.compute(5, &[1], &[], &[], true, false, false).unwrap();
        assert_eq!(
            c.compute(5, &[1], &[], &[], true, false, false),
            Err(ClassifierError::RecordOutOfOrder { record: 5, previous: 5 })
        );
    }

    #[test]
    fn rejects_mismatched_label_lists() {
        let mut c = classifier(vec![0], 0.1);
        assert_eq!(
            c.compute(0, &[1], &[1, 2], &[1.0], true, true, false),
            Err(ClassifierError::LabelLengthMismatch { buckets: 2, values: 1 })
        );
    }

    #[test]
    fn no_learn_no_infer_returns_empty_result() {
        let mut c = classifier(vec![0], 0.1);
        let result = c.compute(0, &[1], &[], &[], true, false, false).unwrap();
        assert!(result.is_empty());
    }
}

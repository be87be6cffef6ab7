//! Contracts of the two models the harness drives, plus one reference
//! implementation of each.

pub mod activation_set;
pub mod classifier_result;
pub mod spatial_pooler;
pub mod sdr_classifier;

pub use activation_set::ActivationSet;
pub use classifier_result::ClassifierResult;
pub use sdr_classifier::{SdrClassifier, SdrClassifierParams};
pub use spatial_pooler::{SpatialPooler, SpatialPoolerParams};

/// Turns a dense binary input into a sparse set of active columns.
pub trait Recognizer {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Length of the input slice accepted by [`compute`](Self::compute).
    fn input_size(&self) -> usize;

    /// Length of the flag slice written by [`compute`](Self::compute).
    fn output_size(&self) -> usize;

    /// Writes one flag per column into `active` (non-zero = active).
    /// When `learn` is true the recognizer may adapt its internal state.
    /// `input` is only borrowed for the duration of the call.
    fn compute(&mut self, input: &[u8], learn: bool, active: &mut [u8]) -> Result<(), Self::Error>;
}

/// Maps activation patterns to per-horizon category distributions.
pub trait Predictor {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Processes record `record`.
    ///
    /// `bucket_idx` and `act_values` carry the label and are empty when not
    /// learning. The result only needs to be populated when `infer` is true.
    #[allow(clippy::too_many_arguments)]
    fn compute(
        &mut self,
        record: u64,
        active: &[usize],
        bucket_idx: &[usize],
        act_values: &[f64],
        categorical: bool,
        learn: bool,
        infer: bool,
    ) -> Result<ClassifierResult, Self::Error>;
}

use serde::{Deserialize, Serialize};

/// Summary of one training phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainStats {
    /// Samples drawn and presented to both models.
    pub iterations: usize,
    /// Record counter value after the phase.
    pub next_record: u64,
    /// Wall-clock duration of the phase in milliseconds.
    pub elapsed_ms: u64,
}

/// Outcome of one evaluation pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub correct: usize,
    pub total: usize,
    /// `correct / total`, in `[0, 1]`.
    pub accuracy: f64,
    pub elapsed_ms: u64,
}

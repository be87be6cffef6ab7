use crate::error::{HarnessError, Result};

/// Running correct/total counts of one evaluation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoreAccumulator {
    correct: usize,
    total: usize,
}

impl ScoreAccumulator {
    pub fn new() -> ScoreAccumulator {
        ScoreAccumulator::default()
    }

    /// Counts one scored sample. `None` means the predictor offered no
    /// category, which scores as a miss.
    pub fn record(&mut self, predicted: Option<usize>, actual: usize) {
        if predicted == Some(actual) {
            self.correct += 1;
        }
        self.total += 1;
    }

    pub fn correct(&self) -> usize {
        self.correct
    }

    pub fn total(&self) -> usize {
        self.total
    }

    /// `correct / total` over `samples` presented samples. A pass that
    /// scored nothing has no accuracy.
    pub fn accuracy(&self, samples: usize) -> Result<f64> {
        if self.total == 0 {
            return Err(HarnessError::NothingScored { samples });
        }
        Ok(self.correct as f64 / self.total as f64)
    }
}

/// Index of the first maximum of `distribution`. NaN entries never win.
pub fn top_category(distribution: &[f64]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &p) in distribution.iter().enumerate() {
        if p.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if p <= top => {}
            _ => best = Some((i, p)),
        }
    }
    best.map(|(i, _)| i)
}

use std::time::Instant;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::info;

use crate::data::{Dataset, RawImage};
use crate::encoding::{encode, encoded_len};
use crate::error::{HarnessError, Result};
use crate::harness::run_stats::{EvalReport, TrainStats};
use crate::harness::score::{top_category, ScoreAccumulator};
use crate::model::{ActivationSet, Predictor, Recognizer};

/// Horizon whose distribution is scored.
const SCORED_STEP: usize = 0;

/// Drives a recognizer and predictor through the online training loop and
/// the evaluation pass.
///
/// The record counter handed to the predictor is shared by both phases and
/// grows by exactly one per predictor call.
pub struct Harness<R, P> {
    recognizer: R,
    predictor: P,
    rng: StdRng,
    next_record: u64,
    log_every: usize,
    verbosity: u32,
    flags: Vec<u8>,
}

impl<R: Recognizer, P: Predictor> Harness<R, P> {
    /// Creates a harness whose training samples are drawn from a generator
    /// seeded with `sampling_seed`.
    pub fn new(recognizer: R, predictor: P, sampling_seed: u64) -> Harness<R, P> {
        let flags = vec![0; recognizer.output_size()];
        Harness {
            recognizer,
            predictor,
            rng: StdRng::seed_from_u64(sampling_seed),
            next_record: 0,
            log_every: 0,
            verbosity: 0,
            flags,
        }
    }

    /// Enables progress logging every `log_every` training iterations
    /// (`0` disables it) and phase announcements when `verbosity > 0`.
    pub fn with_logging(mut self, log_every: usize, verbosity: u32) -> Harness<R, P> {
        self.log_every = log_every;
        self.verbosity = verbosity;
        self
    }

    /// Record number the next predictor call will receive.
    pub fn next_record(&self) -> u64 {
        self.next_record
    }

    pub fn recognizer(&self) -> &R {
        &self.recognizer
    }

    pub fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Fails unless the recognizer accepts the encoding of `dataset`'s images.
    pub fn check_shape(&self, dataset: &Dataset) -> Result<()> {
        let actual = encoded_len(dataset.pixel_count());
        let expected = self.recognizer.input_size();
        if actual != expected {
            return Err(HarnessError::ShapeMismatch { expected, actual });
        }
        Ok(())
    }

    /// Presents `iterations` samples drawn uniformly with replacement from
    /// `dataset`, with learning enabled on both models.
    pub fn train(&mut self, dataset: &Dataset, iterations: usize) -> Result<TrainStats> {
        self.check_shape(dataset)?;
        if iterations > 0 && dataset.is_empty() {
            return Err(HarnessError::EmptyDataset);
        }
        if self.verbosity > 0 {
            info!("Training for {} cycles ...", iterations);
        }

        // ── Sample with replacement and learn ─────────────────────────────
        let t_start = Instant::now();
        for i in 0..iterations {
            let index = self.rng.gen_range(0..dataset.len());
            let label = dataset.label(index) as usize;

            let active = self.recognize(&dataset.image(index), true)?;
            let record = self.take_record();
            self.predictor
                .compute(record, active.as_slice(), &[label], &[label as f64], true, true, false)
                .map_err(|e| HarnessError::Predictor(Box::new(e)))?;

            if self.log_every > 0 && (i + 1) % self.log_every == 0 {
                info!(iteration = i + 1, total = iterations, "training progress");
            }
        }

        let stats = TrainStats {
            iterations,
            next_record: self.next_record,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        if self.verbosity > 0 {
            info!(iterations, elapsed_ms = stats.elapsed_ms, "training done");
        }
        Ok(stats)
    }

    /// Classifies every sample of `dataset` in file order with learning
    /// disabled and scores the zero-step prediction against the label.
    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<EvalReport> {
        self.check_shape(dataset)?;
        if dataset.is_empty() {
            return Err(HarnessError::EmptyTestSet);
        }
        if self.verbosity > 0 {
            info!("Testing for {} cycles ...", dataset.len());
        }

        // ── Classify every test sample in file order ──────────────────────
        let t_start = Instant::now();
        let mut score = ScoreAccumulator::new();
        for (image, label) in dataset.iter() {
            let active = self.recognize(&image, false)?;
            let record = self.take_record();
            let result = self
                .predictor
                .compute(record, active.as_slice(), &[], &[], true, false, true)
                .map_err(|e| HarnessError::Predictor(Box::new(e)))?;

            // Results without a zero-step distribution are not counted.
            if let Some(distribution) = result.distribution(SCORED_STEP) {
                score.record(top_category(distribution), label as usize);
            }
        }

        // ── Report ────────────────────────────────────────────────────────
        let report = EvalReport {
            correct: score.correct(),
            total: score.total(),
            accuracy: score.accuracy(dataset.len())?,
            elapsed_ms: t_start.elapsed().as_millis() as u64,
        };
        if self.verbosity > 0 {
            info!(
                correct = report.correct,
                total = report.total,
                elapsed_ms = report.elapsed_ms,
                "testing done"
            );
        }
        Ok(report)
    }

    fn recognize(&mut self, image: &RawImage<'_>, learn: bool) -> Result<ActivationSet> {
        let input = encode(image);
        self.flags.fill(0);
        self.recognizer
            .compute(input.as_slice(), learn, &mut self.flags)
            .map_err(|e| HarnessError::Recognizer(Box::new(e)))?;
        Ok(ActivationSet::from_flags(&self.flags))
    }

    fn take_record(&mut self) -> u64 {
        let record = self.next_record;
        self.next_record += 1;
        record
    }
}

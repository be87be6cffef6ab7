use tracing::info;

use crate::data::Dataset;
use crate::error::{HarnessError, Result};
use crate::harness::harness::Harness;
use crate::harness::harness_config::HarnessConfig;
use crate::harness::run_stats::EvalReport;
use crate::model::{Predictor, Recognizer, SdrClassifier, SpatialPooler};

/// Builds the reference recognizer and predictor described by `config`.
pub fn reference_models(config: &HarnessConfig) -> Result<(SpatialPooler, SdrClassifier)> {
    let recognizer = SpatialPooler::new(config.recognizer.clone())?;
    let predictor = SdrClassifier::new(config.predictor.clone());
    Ok((recognizer, predictor))
}

/// Runs one full train/test pass and returns the test report.
///
/// Both file pairs are loaded and checked before the first training step,
/// so a bad dataset never costs a training phase.
pub fn run<R: Recognizer, P: Predictor>(
    config: &HarnessConfig,
    recognizer: R,
    predictor: P,
) -> Result<EvalReport> {
    let train = Dataset::load(&config.train.images, &config.train.labels)?;
    let test = Dataset::load(&config.test.images, &config.test.labels)?;
    if test.is_empty() {
        return Err(HarnessError::EmptyTestSet);
    }
    info!(train = train.len(), test = test.len(), "datasets loaded");

    let mut harness = Harness::new(recognizer, predictor, config.sampling_seed)
        .with_logging(config.log_every, config.verbosity);
    harness.check_shape(&train)?;
    harness.check_shape(&test)?;

    harness.train(&train, config.train_iterations)?;
    harness.evaluate(&test)
}

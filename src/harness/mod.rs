pub mod harness;
pub mod harness_config;
pub mod run;
pub mod run_stats;
pub mod score;

pub use harness::Harness;
pub use harness_config::{DatasetPaths, HarnessConfig};
pub use run::{reference_models, run};
pub use run_stats::{EvalReport, TrainStats};
pub use score::{top_category, ScoreAccumulator};

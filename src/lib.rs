pub mod error;
pub mod data;
pub mod encoding;
pub mod model;
pub mod harness;

// Convenience re-exports
pub use error::{DecodeError, HarnessError, Result};
pub use data::{Dataset, RawImage};
pub use encoding::{encode, EncodedInput};
pub use model::{ActivationSet, ClassifierResult, Predictor, Recognizer};
pub use model::{SdrClassifier, SdrClassifierParams, SpatialPooler, SpatialPoolerParams};
pub use harness::{run, EvalReport, Harness, HarnessConfig, TrainStats};

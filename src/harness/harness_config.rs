use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{HarnessError, Result};
use crate::model::{SdrClassifierParams, SpatialPoolerParams};

/// Location of one image/label file pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetPaths {
    pub images: PathBuf,
    pub labels: PathBuf,
}

/// Everything one benchmark run needs.
///
/// # Fields
/// - `train` / `test`       — training and held-out file pairs
/// - `train_iterations`     — number of samples drawn (with replacement)
/// - `sampling_seed`        — seed of the harness's sampling generator
/// - `log_every`            — training progress interval; `0` disables it
/// - `verbosity`            — `0` silences phase announcements
/// - `recognizer` / `predictor` — parameters of the reference models
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub train: DatasetPaths,
    pub test: DatasetPaths,
    pub train_iterations: usize,
    pub sampling_seed: u64,
    pub log_every: usize,
    pub verbosity: u32,
    pub recognizer: SpatialPoolerParams,
    pub predictor: SdrClassifierParams,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        let data = Path::new("./mnist_data");
        HarnessConfig {
            train: DatasetPaths {
                images: data.join("train-images-idx3-ubyte"),
                labels: data.join("train-labels-idx1-ubyte"),
            },
            test: DatasetPaths {
                images: data.join("t10k-images-idx3-ubyte"),
                labels: data.join("t10k-labels-idx1-ubyte"),
            },
            train_iterations: 60_000,
            sampling_seed: 0,
            log_every: 10_000,
            verbosity: 1,
            recognizer: SpatialPoolerParams::default(),
            predictor: SdrClassifierParams::default(),
        }
    }
}

impl HarnessConfig {
    /// Serializes the config to a pretty-printed JSON file.
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file = std::fs::File::create(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let writer = std::io::BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Deserializes a config; missing fields take their default values.
    pub fn load_json(path: impl AsRef<Path>) -> Result<HarnessConfig> {
        let path = path.as_ref();
        let file = std::fs::File::open(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let reader = std::io::BufReader::new(file);
        serde_json::from_reader(reader).map_err(|source| HarnessError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

use std::path::PathBuf;

use thiserror::Error;

/// Boxed error raised inside a recognizer or predictor. The harness never
/// inspects it.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Problems found while decoding the bytes of an IDX file.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("data is compressed or corrupt (magic 0x{found:08X}, expected 0x{expected:08X} in either byte order)")]
    BadMagic { expected: u32, found: u32 },

    #[error("image dimensions are {rows}x{cols}, expected {expected_rows}x{expected_cols}")]
    BadDimensions {
        rows: usize,
        cols: usize,
        expected_rows: usize,
        expected_cols: usize,
    },

    #[error("file truncated: {what} needs {needed} bytes, only {available} available")]
    Truncated {
        what: &'static str,
        needed: usize,
        available: usize,
    },
}

/// Every fatal condition a benchmark run can hit.
#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to open file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: {source}", .path.display())]
    Format {
        path: PathBuf,
        #[source]
        source: DecodeError,
    },

    #[error("image file holds {images} images but label file holds {labels} labels")]
    CountMismatch { images: usize, labels: usize },

    #[error("cannot sample from an empty training set")]
    EmptyDataset,

    #[error("test set is empty, accuracy is undefined")]
    EmptyTestSet,

    #[error("no test samples were scored: predictor returned no step-0 distribution for any of {samples} samples")]
    NothingScored { samples: usize },

    #[error("recognizer expects {expected} inputs but the encoder produces {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("recognizer failed: {0}")]
    Recognizer(#[source] CollaboratorError),

    #[error("predictor failed: {0}")]
    Predictor(#[source] CollaboratorError),

    #[error("invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid parameter `{name}`: {message}")]
    InvalidParameter { name: &'static str, message: String },
}

pub type Result<T> = std::result::Result<T, HarnessError>;

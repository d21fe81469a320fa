//! Custom error types for inpaint-tools.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for the inpaint-tools library.
#[derive(Error, Debug)]
pub enum Error {
    /// A tensor had the wrong rank for the requested operation.
    #[error("expected a rank-{expected} tensor, got rank {actual}")]
    Precondition { expected: usize, actual: usize },

    /// Unknown padding mode.
    #[error("unsupported padding type: {0} (only \"same\" or \"valid\" are supported)")]
    UnsupportedPadding(String),

    /// Unknown masking strategy.
    #[error("unsupported mask type: {0} (only \"hole\" or \"mosaic\" are supported)")]
    UnsupportedMaskType(String),

    /// A random sampling range was empty or inverted.
    #[error("empty sampling range for {name}: [{low}, {high})")]
    Range {
        name: &'static str,
        low: usize,
        high: usize,
    },

    /// Shape mismatch in tensor operations.
    #[error("tensor shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: String, actual: String },

    /// Invalid parameter value.
    #[error("invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Failed to load an image file.
    #[error("failed to load image from {path}: {source}")]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Failed to save an image file.
    #[error("failed to save image to {path}: {source}")]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No images were found where a dataset was expected.
    #[error("no images found under {path}")]
    EmptyDataset { path: PathBuf },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn invalid(name: &str, reason: impl Into<String>) -> Self {
        Self::InvalidParameter {
            name: name.to_string(),
            reason: reason.into(),
        }
    }

    pub(crate) fn shape(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::ShapeMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }
}

/// Result type alias for inpaint-tools operations.
pub type Result<T> = std::result::Result<T, Error>;

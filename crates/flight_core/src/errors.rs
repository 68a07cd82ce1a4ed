//! Error types for the flight core crate

use crate::dataset::DatasetError;
use crate::features::EncodeError;
use crate::gbdt::ModelError;
use thiserror::Error;

/// Errors that can occur while serving insights or predictions
#[derive(Error, Debug)]
pub enum CoreError {
    /// Dataset could not be loaded
    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    /// User selections could not be encoded
    #[error("Encoding error: {0}")]
    Encode(#[from] EncodeError),

    /// Model loading or inference failed
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Feature layout does not fit the loaded model
    #[error("Layout mismatch: {0}")]
    LayoutMismatch(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for flight core operations
pub type Result<T> = std::result::Result<T, CoreError>;

use std::path::PathBuf;
use thiserror::Error;

/// Errors returned by the dataset normalizer.
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("input file '{0}' not found")]
    InputNotFound(PathBuf),

    #[error("'price' column is missing from the dataset")]
    MissingPriceColumn,

    #[error("refusing to overwrite the input file '{0}'")]
    OutputIsInput(PathBuf),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

//! Tree-ensemble price model
//!
//! The serialized artifact is canonical JSON (sorted keys, no whitespace) so
//! that its blake3 hash is stable. The model predicts `ln(price)`; see
//! [`crate::prediction`] for the inverse transform.

use super::tree::Tree;
use crate::features::{EncodeError, FeatureLayout};
use crate::prediction::Regressor;
use crate::serde_canon::{hash_canonical_hex, to_canonical_json, CanonicalError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Model validation failed: {0}")]
    ValidationFailed(String),

    #[error("Model expects {expected} features, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Feature {index} is not finite ({value})")]
    InvalidInput { index: usize, value: f64 },

    #[error("Model produced a non-finite prediction: {0}")]
    NonFiniteOutput(f64),

    #[error("Hash mismatch for {path}: expected {expected}, computed {actual}")]
    HashMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Embedded layout is invalid: {0}")]
    Layout(#[from] EncodeError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Canonical serialization error: {0}")]
    CanonicalError(#[from] CanonicalError),
}

/// Supported artifact format version
pub const MODEL_VERSION: i32 = 1;

/// How per-tree outputs are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    /// Boosting: bias + sum(weight * leaf)
    #[default]
    Sum,
    /// Forest: bias + mean(weight * leaf)
    Mean,
}

/// Regression tree ensemble trained on log price
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Model {
    /// Model format version (always 1 for now)
    pub version: i32,

    /// Width of the input vector the model was trained on
    pub n_features: usize,

    #[serde(default)]
    pub aggregation: Aggregation,

    /// Decision trees in the ensemble
    pub trees: Vec<Tree>,

    /// Constant added to the aggregated tree output
    pub bias: f64,

    /// Category ordering used at training time
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layout: Option<FeatureLayout>,
}

impl Model {
    pub fn new(trees: Vec<Tree>, bias: f64, n_features: usize) -> Self {
        Self {
            version: MODEL_VERSION,
            n_features,
            aggregation: Aggregation::Sum,
            trees,
            bias,
            layout: None,
        }
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Attach the training-time layout; its width becomes the model width
    pub fn with_layout(mut self, layout: FeatureLayout) -> Self {
        self.n_features = layout.width();
        self.layout = Some(layout);
        self
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.version != MODEL_VERSION {
            return Err(ModelError::ValidationFailed(format!(
                "Unsupported model version: {}",
                self.version
            )));
        }

        if self.n_features == 0 {
            return Err(ModelError::ValidationFailed(
                "Model declares zero input features".to_string(),
            ));
        }

        if self.trees.is_empty() {
            return Err(ModelError::ValidationFailed(
                "Model must have at least one tree".to_string(),
            ));
        }

        if !self.bias.is_finite() {
            return Err(ModelError::ValidationFailed(format!(
                "Invalid bias: {}",
                self.bias
            )));
        }

        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.n_features).map_err(|e| {
                ModelError::ValidationFailed(format!("Tree {} validation failed: {}", i, e))
            })?;
        }

        if let Some(layout) = &self.layout {
            layout.validate()?;
            if layout.width() != self.n_features {
                return Err(ModelError::ValidationFailed(format!(
                    "Embedded layout width {} does not match n_features {}",
                    layout.width(),
                    self.n_features
                )));
            }
        }

        Ok(())
    }

    /// Raw ensemble output in log-price space
    pub fn score(&self, features: &[f64]) -> Result<f64, ModelError> {
        if features.len() != self.n_features {
            return Err(ModelError::DimensionMismatch {
                expected: self.n_features,
                actual: features.len(),
            });
        }

        if let Some((index, &value)) = features.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(ModelError::InvalidInput { index, value });
        }

        let total: f64 = self
            .trees
            .iter()
            .map(|tree| tree.evaluate(features) * tree.weight)
            .sum();

        let combined = match self.aggregation {
            Aggregation::Sum => total,
            Aggregation::Mean => total / self.trees.len() as f64,
        };

        Ok(self.bias + combined)
    }

    pub fn to_canonical_json(&self) -> Result<String, ModelError> {
        Ok(to_canonical_json(self)?)
    }

    /// Blake3 hash of the canonical JSON representation as hex
    pub fn hash_hex(&self) -> Result<String, ModelError> {
        Ok(hash_canonical_hex(self)?)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let json = self.to_canonical_json()?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load and validate a model from a JSON file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let model: Model = serde_json::from_str(&json)?;
        model.validate()?;
        info!(
            path = %path.display(),
            trees = model.num_trees(),
            n_features = model.n_features,
            "Loaded price model"
        );
        Ok(model)
    }

    /// Write `<model>.hash` next to the artifact and return the hash
    pub fn write_hash_file<P: AsRef<Path>>(&self, model_path: P) -> Result<String, ModelError> {
        let hash = self.hash_hex()?;
        fs::write(hash_path_for(model_path.as_ref()), &hash)?;
        Ok(hash)
    }

    /// Compare the model's hash against the `<model>.hash` sidecar
    pub fn verify_hash_file<P: AsRef<Path>>(&self, model_path: P) -> Result<(), ModelError> {
        let hash_path = hash_path_for(model_path.as_ref());
        let expected = fs::read_to_string(&hash_path)?.trim().to_lowercase();
        let actual = self.hash_hex()?;
        if expected != actual {
            return Err(ModelError::HashMismatch {
                path: hash_path,
                expected,
                actual,
            });
        }
        debug!(hash = %actual, "Model hash verified");
        Ok(())
    }

    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Regressor for Model {
    fn n_features(&self) -> Option<usize> {
        Some(self.n_features)
    }

    fn predict(&self, features: &[f64]) -> Result<f64, ModelError> {
        self.score(features)
    }
}

/// Location of the hash sidecar for a model artifact
pub fn hash_path_for(model_path: &Path) -> PathBuf {
    model_path.with_extension("hash")
}

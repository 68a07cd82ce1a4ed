//! Flight price insights and prediction core
//!
//! Loads the normalized flight dataset, aggregates mean prices for the
//! insights view, and turns user selections into the exact feature vector a
//! pre-trained log-price model expects.
//!
//! Modules:
//! - `schema`: Canonical column names and derived categories
//! - `dataset`: Normalized CSV loading with price coercion
//! - `insights`: Mean price per category
//! - `features`: Category universes, layouts and one-hot encoding
//! - `gbdt`: Tree-ensemble model artifact and inference
//! - `prediction`: Model capability and log-price inversion
//! - `config`: Dashboard configuration
//! - `session`: Memoized dataset/model/layout for one process

pub mod config;
pub mod dataset;
pub mod errors;
pub mod features;
pub mod gbdt;
pub mod insights;
pub mod prediction;
pub mod schema;
pub mod serde_canon;
pub mod session;

pub use config::DashboardConfig;
pub use dataset::{Dataset, DatasetError};
pub use errors::{CoreError, Result};
pub use features::{
    build_feature_vector, encode_one_hot, CategoryUniverse, EncodeError, FeatureGroup,
    FeatureLayout, FeatureVector, FlightSelection, UnknownCategoryPolicy,
};
pub use gbdt::{Aggregation, Model, ModelError};
pub use insights::{mean_price_by_group, GroupMean, InsightReport, InsightSection};
pub use prediction::{format_currency, predict_price, PricePrediction, Regressor};
pub use schema::{Season, TimeOfDay};
pub use session::{LayoutSource, Session};

/// Crate version string
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

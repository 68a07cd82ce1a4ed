//! Flight dataset normalizer
//!
//! Renames the raw export's columns, coerces prices and derives the
//! categorical columns the dashboard groups by.

pub mod errors;
pub mod normalize;
pub mod table;

pub use errors::NormalizeError;
pub use normalize::{
    days_to_departure, normalize_file, normalize_table, parse_departure_date,
    parse_departure_time, parse_price, NormalizeSummary,
};
pub use table::Table;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

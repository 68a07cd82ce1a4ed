//! Feature encoding for the price model
//!
//! The encoded vector must match, position for position, the layout the
//! model was trained on:
//!
//! ```text
//! [duration, day, month, year,
//!  (dep_hour, dep_min, arr_hour, arr_min)?,   -- only with timing placeholders
//!  one-hot(airline), one-hot(class),
//!  one-hot(departure_city), one-hot(arrival_city)]
//! ```
//!
//! Category order inside each one-hot block comes from a persisted
//! [`FeatureLayout`], not from whatever order the current dataset happens to
//! list values in.

use crate::dataset::Dataset;
use crate::schema;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::warn;

/// Model input vector
pub type FeatureVector = Vec<f64>;

/// Layout format version
pub const LAYOUT_VERSION: u32 = 1;

/// Numeric prefix shared by every layout
pub const NUMERIC_FEATURES: [&str; 4] = ["duration", "day", "month", "year"];

/// Extra prefix columns present only when timing placeholders are enabled
pub const TIMING_PLACEHOLDERS: [&str; 4] = ["dep_hour", "dep_min", "arr_hour", "arr_min"];

/// Cabin classes in the order the shipped model was trained with
pub const DEFAULT_CLASS_ORDER: [&str; 2] = ["economy", "business"];

pub const MIN_DURATION_MINUTES: u32 = 30;
pub const MAX_DURATION_MINUTES: u32 = 360;
pub const DURATION_STEP_MINUTES: u32 = 10;
/// Duration pre-selected when the user does not choose one
pub const DEFAULT_DURATION_MINUTES: u32 = 120;

#[derive(Error, Debug)]
pub enum EncodeError {
    #[error("{group} '{value}' is not part of the model's category list")]
    UnknownCategory { group: FeatureGroup, value: String },

    #[error("duration {0} min is outside 30-360 min in steps of 10")]
    InvalidDuration(u32),

    #[error("Invalid feature layout: {0}")]
    InvalidLayout(String),

    #[error("Failed to read layout: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse layout: {0}")]
    Json(#[from] serde_json::Error),
}

/// Categorical feature groups, in vector order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FeatureGroup {
    Airline,
    Class,
    DepartureCity,
    ArrivalCity,
}

impl FeatureGroup {
    pub const ALL: [FeatureGroup; 4] = [
        FeatureGroup::Airline,
        FeatureGroup::Class,
        FeatureGroup::DepartureCity,
        FeatureGroup::ArrivalCity,
    ];

    /// Dataset column the group's categories are drawn from
    pub fn column(&self) -> &'static str {
        match self {
            FeatureGroup::Airline => schema::AIRLINE,
            FeatureGroup::Class => schema::CLASS,
            FeatureGroup::DepartureCity => schema::DEPARTURE_CITY,
            FeatureGroup::ArrivalCity => schema::ARRIVAL_CITY,
        }
    }
}

impl fmt::Display for FeatureGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeatureGroup::Airline => "airline",
            FeatureGroup::Class => "class",
            FeatureGroup::DepartureCity => "departure city",
            FeatureGroup::ArrivalCity => "arrival city",
        };
        f.write_str(name)
    }
}

/// What to do when a selected value is missing from its category list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownCategoryPolicy {
    /// Emit an all-zero block and log a warning
    #[default]
    ZeroBlock,
    /// Fail the encoding request
    Reject,
}

/// Ordered distinct values of one categorical attribute
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryUniverse(Vec<String>);

impl CategoryUniverse {
    /// Build a universe keeping the first occurrence of every value
    pub fn new<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let mut ordered = Vec::new();
        for value in values {
            let value = value.into();
            if seen.insert(value.clone()) {
                ordered.push(value);
            }
        }
        Self(ordered)
    }

    /// First-seen distinct non-missing values of a dataset column
    pub fn from_dataset(dataset: &Dataset, column: &str) -> Option<Self> {
        let values = dataset.column_values(column)?;
        Some(Self::new(values.flatten()))
    }

    pub fn position(&self, value: &str) -> Option<usize> {
        self.0.iter().position(|c| c == value)
    }

    pub fn contains(&self, value: &str) -> bool {
        self.position(value).is_some()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    fn has_duplicates(&self) -> bool {
        let mut seen = HashSet::new();
        self.0.iter().any(|v| !seen.insert(v))
    }
}

/// One-hot encode `value` against an ordered category list.
///
/// Position `i` is 1.0 iff `value == categories[i]`. A value outside the list
/// yields an all-zero vector of the same length.
pub fn encode_one_hot<S: AsRef<str>>(value: &str, categories: &[S]) -> Vec<f64> {
    categories
        .iter()
        .map(|category| if category.as_ref() == value { 1.0 } else { 0.0 })
        .collect()
}

/// Persisted description of the model's input layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureLayout {
    pub version: u32,
    /// Whether four zero-valued departure/arrival time slots follow the date
    #[serde(default)]
    pub timing_placeholders: bool,
    pub airlines: CategoryUniverse,
    #[serde(default = "default_classes")]
    pub classes: CategoryUniverse,
    pub departure_cities: CategoryUniverse,
    pub arrival_cities: CategoryUniverse,
}

fn default_classes() -> CategoryUniverse {
    CategoryUniverse::new(DEFAULT_CLASS_ORDER)
}

impl FeatureLayout {
    pub fn new(
        airlines: CategoryUniverse,
        departure_cities: CategoryUniverse,
        arrival_cities: CategoryUniverse,
    ) -> Self {
        Self {
            version: LAYOUT_VERSION,
            timing_placeholders: false,
            airlines,
            classes: default_classes(),
            departure_cities,
            arrival_cities,
        }
    }

    /// Derive a layout from the first-seen category order of a dataset.
    ///
    /// Only safe when the dataset is the one the model was trained on, in the
    /// same row order.
    pub fn from_dataset(dataset: &Dataset) -> Result<Self, EncodeError> {
        let universe = |group: FeatureGroup| {
            CategoryUniverse::from_dataset(dataset, group.column()).ok_or_else(|| {
                EncodeError::InvalidLayout(format!("dataset has no '{}' column", group.column()))
            })
        };

        Ok(Self::new(
            universe(FeatureGroup::Airline)?,
            universe(FeatureGroup::DepartureCity)?,
            universe(FeatureGroup::ArrivalCity)?,
        ))
    }

    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, EncodeError> {
        let json = fs::read_to_string(path)?;
        let layout: FeatureLayout = serde_json::from_str(&json)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), EncodeError> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), EncodeError> {
        if self.version != LAYOUT_VERSION {
            return Err(EncodeError::InvalidLayout(format!(
                "unsupported layout version {}",
                self.version
            )));
        }

        for group in FeatureGroup::ALL {
            let universe = self.universe(group);
            if universe.is_empty() {
                return Err(EncodeError::InvalidLayout(format!("{} list is empty", group)));
            }
            if universe.has_duplicates() {
                return Err(EncodeError::InvalidLayout(format!(
                    "{} list contains duplicates",
                    group
                )));
            }
        }

        Ok(())
    }

    pub fn universe(&self, group: FeatureGroup) -> &CategoryUniverse {
        match group {
            FeatureGroup::Airline => &self.airlines,
            FeatureGroup::Class => &self.classes,
            FeatureGroup::DepartureCity => &self.departure_cities,
            FeatureGroup::ArrivalCity => &self.arrival_cities,
        }
    }

    /// Length of the numeric prefix
    pub fn prefix_len(&self) -> usize {
        if self.timing_placeholders {
            NUMERIC_FEATURES.len() + TIMING_PLACEHOLDERS.len()
        } else {
            NUMERIC_FEATURES.len()
        }
    }

    /// Total encoded vector length
    pub fn width(&self) -> usize {
        self.prefix_len()
            + FeatureGroup::ALL
                .iter()
                .map(|g| self.universe(*g).len())
                .sum::<usize>()
    }

    /// Human readable name for every vector position
    pub fn feature_names(&self) -> Vec<String> {
        let mut names: Vec<String> = NUMERIC_FEATURES.iter().map(|n| n.to_string()).collect();
        if self.timing_placeholders {
            names.extend(TIMING_PLACEHOLDERS.iter().map(|n| n.to_string()));
        }
        for group in FeatureGroup::ALL {
            let column = group.column();
            names.extend(
                self.universe(group)
                    .values()
                    .iter()
                    .map(|value| format!("{}={}", column, value)),
            );
        }
        names
    }
}

/// User-chosen flight attributes for one prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlightSelection {
    pub airline: String,
    pub class: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub duration_minutes: u32,
    pub journey_date: NaiveDate,
}

impl FlightSelection {
    /// Check the numeric inputs against the dashboard's slider bounds
    pub fn validate(&self) -> Result<(), EncodeError> {
        let d = self.duration_minutes;
        if !(MIN_DURATION_MINUTES..=MAX_DURATION_MINUTES).contains(&d)
            || (d - MIN_DURATION_MINUTES) % DURATION_STEP_MINUTES != 0
        {
            return Err(EncodeError::InvalidDuration(d));
        }
        Ok(())
    }

    fn value(&self, group: FeatureGroup) -> &str {
        match group {
            FeatureGroup::Airline => &self.airline,
            FeatureGroup::Class => &self.class,
            FeatureGroup::DepartureCity => &self.departure_city,
            FeatureGroup::ArrivalCity => &self.arrival_city,
        }
    }
}

/// Assemble the model input for a selection.
///
/// The result always has exactly `layout.width()` entries.
pub fn build_feature_vector(
    selection: &FlightSelection,
    layout: &FeatureLayout,
    policy: UnknownCategoryPolicy,
) -> Result<FeatureVector, EncodeError> {
    selection.validate()?;

    let date = selection.journey_date;
    let mut features = Vec::with_capacity(layout.width());
    features.extend([
        selection.duration_minutes as f64,
        date.day() as f64,
        date.month() as f64,
        date.year() as f64,
    ]);
    if layout.timing_placeholders {
        features.extend([0.0; TIMING_PLACEHOLDERS.len()]);
    }

    for group in FeatureGroup::ALL {
        let universe = layout.universe(group);
        let value = selection.value(group);
        if !universe.contains(value) {
            match policy {
                UnknownCategoryPolicy::Reject => {
                    return Err(EncodeError::UnknownCategory {
                        group,
                        value: value.to_string(),
                    });
                }
                UnknownCategoryPolicy::ZeroBlock => {
                    warn!(%group, value, "Selected value not in model categories; encoding all-zero block");
                }
            }
        }
        features.extend(encode_one_hot(value, universe.values()));
    }

    debug_assert_eq!(features.len(), layout.width());
    Ok(features)
}

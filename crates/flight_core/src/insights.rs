//! Mean-price aggregations for the insights view
//!
//! A missing grouping column never fails the report; the affected section
//! carries a warning instead.

use crate::dataset::Dataset;
use crate::schema;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::warn;

/// Mean price of one category value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMean {
    pub key: String,
    pub mean_price: f64,
    pub count: usize,
}

/// Mean price per distinct value of `column`.
///
/// Rows with a missing value in `column` are ignored. Groups are ordered by
/// key, numerically when every key is a number. Returns `None` (and logs a
/// warning) if the column is absent.
pub fn mean_price_by_group(dataset: &Dataset, column: &str) -> Option<Vec<GroupMean>> {
    let Some(values) = dataset.column_values(column) else {
        warn!(column, "Grouping column missing from dataset");
        return None;
    };

    let mut sums: HashMap<&str, (f64, usize)> = HashMap::new();
    for (row, value) in values.enumerate() {
        if let Some(key) = value {
            let entry = sums.entry(key).or_insert((0.0, 0));
            entry.0 += dataset.price(row);
            entry.1 += 1;
        }
    }

    let mut groups: Vec<GroupMean> = sums
        .into_iter()
        .map(|(key, (sum, count))| GroupMean {
            key: key.to_string(),
            mean_price: sum / count as f64,
            count,
        })
        .collect();

    let numeric = groups.iter().all(|g| g.key.parse::<f64>().is_ok());
    if numeric {
        groups.sort_by(|a, b| {
            let (x, y) = (parse_key(&a.key), parse_key(&b.key));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        });
    } else {
        groups.sort_by(|a, b| a.key.cmp(&b.key));
    }

    Some(groups)
}

fn parse_key(key: &str) -> f64 {
    key.parse().unwrap_or(f64::NAN)
}

/// Order groups from cheapest to most expensive
pub fn sort_by_mean_price(groups: &mut [GroupMean]) {
    groups.sort_by(|a, b| {
        a.mean_price
            .partial_cmp(&b.mean_price)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.key.cmp(&b.key))
    });
}

/// One chart of the insights view
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsightSpec {
    pub title: &'static str,
    pub column: &'static str,
    pub sort_by_price: bool,
}

/// Sections shown on the insights page, in display order
pub const STANDARD_SECTIONS: [InsightSpec; 5] = [
    InsightSpec {
        title: "Airline Influence on Prices",
        column: schema::AIRLINE,
        sort_by_price: true,
    },
    InsightSpec {
        title: "Class of Service and Pricing",
        column: schema::CLASS,
        sort_by_price: false,
    },
    InsightSpec {
        title: "Pricing based on Departure Time",
        column: schema::TIME_OF_DAY,
        sort_by_price: false,
    },
    InsightSpec {
        title: "Seasonal Price Trends",
        column: schema::SEASON,
        sort_by_price: false,
    },
    InsightSpec {
        title: "Price Trend Based on Days to Departure",
        column: schema::DAYS_TO_DEPARTURE,
        sort_by_price: false,
    },
];

/// Rendered content of one section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightSection {
    pub title: String,
    pub column: String,
    pub groups: Vec<GroupMean>,
    /// Set when the section could not be computed
    pub warning: Option<String>,
}

/// All sections of the insights page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightReport {
    pub total_rows: usize,
    pub sections: Vec<InsightSection>,
}

impl InsightReport {
    pub fn build(dataset: &Dataset) -> Self {
        Self::build_with(dataset, &STANDARD_SECTIONS)
    }

    pub fn build_with(dataset: &Dataset, specs: &[InsightSpec]) -> Self {
        let sections = specs
            .iter()
            .map(|spec| match mean_price_by_group(dataset, spec.column) {
                Some(mut groups) => {
                    if spec.sort_by_price {
                        sort_by_mean_price(&mut groups);
                    }
                    InsightSection {
                        title: spec.title.to_string(),
                        column: spec.column.to_string(),
                        groups,
                        warning: None,
                    }
                }
                None => InsightSection {
                    title: spec.title.to_string(),
                    column: spec.column.to_string(),
                    groups: Vec::new(),
                    warning: Some(format!("Missing '{}' column in data.", spec.column)),
                },
            })
            .collect();

        Self {
            total_rows: dataset.len(),
            sections,
        }
    }
}

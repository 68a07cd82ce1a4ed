//! Normalized dataset loading
//!
//! Reads the CSV written by the normalizer, coerces `price` to a real number
//! and drops every row whose price is missing, unparseable, negative or not
//! finite. All other cells are kept verbatim; empty cells count as missing.

use crate::schema;
use csv::ReaderBuilder;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("Failed to read dataset: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),
}

/// In-memory flight table with a validated price column
#[derive(Clone, Debug)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
    prices: Vec<f64>,
    dropped_rows: usize,
}

impl Dataset {
    /// Load the normalized dataset from a CSV file
    pub fn from_csv<P: AsRef<Path>>(path: P) -> Result<Self, DatasetError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let dataset = Self::from_reader(file)?;
        info!(
            path = %path.display(),
            rows = dataset.len(),
            dropped = dataset.dropped_rows,
            "Loaded flight dataset"
        );
        Ok(dataset)
    }

    /// Load the dataset from any CSV source with a header row
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, DatasetError> {
        let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);
        let columns: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(record.iter().map(str::to_string).collect());
        }

        Self::from_rows(columns, rows)
    }

    /// Build a dataset from already split rows, applying the same price
    /// coercion as the CSV loader
    pub fn from_rows(columns: Vec<String>, rows: Vec<Vec<String>>) -> Result<Self, DatasetError> {
        let price_idx = columns
            .iter()
            .position(|c| c == schema::PRICE)
            .ok_or_else(|| DatasetError::MissingColumn(schema::PRICE.to_string()))?;

        let mut kept = Vec::with_capacity(rows.len());
        let mut prices = Vec::with_capacity(rows.len());
        let mut dropped_rows = 0;

        for (idx, row) in rows.into_iter().enumerate() {
            match row.get(price_idx).and_then(|raw| parse_price(raw)) {
                Some(price) => {
                    prices.push(price);
                    kept.push(row);
                }
                None => {
                    debug!(row = idx + 1, "Dropping row without a usable price");
                    dropped_rows += 1;
                }
            }
        }

        Ok(Self {
            columns,
            rows: kept,
            prices,
            dropped_rows,
        })
    }

    /// Column headers in file order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cell value, `None` when the cell is empty or the row is short
    pub fn value(&self, row: usize, column: usize) -> Option<&str> {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Every cell of a column in row order, or `None` if the column is absent
    pub fn column_values<'a>(
        &'a self,
        name: &str,
    ) -> Option<impl Iterator<Item = Option<&'a str>> + 'a> {
        let column = self.column_index(name)?;
        Some((0..self.rows.len()).map(move |row| self.value(row, column)))
    }

    /// Price of a row (always finite and non-negative)
    pub fn price(&self, row: usize) -> f64 {
        self.prices[row]
    }

    pub fn prices(&self) -> &[f64] {
        &self.prices
    }

    /// Number of rows with a usable price
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows discarded because their price could not be coerced
    pub fn dropped_rows(&self) -> usize {
        self.dropped_rows
    }
}

fn parse_price(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|price| price.is_finite() && *price >= 0.0)
}

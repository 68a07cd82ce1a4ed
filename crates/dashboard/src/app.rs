//! Dashboard actions shared by one-shot commands and the interactive shell

use crate::render::{render_choices, render_report};
use anyhow::{Context, Result};
use chrono::NaiveDate;
use flight_core::features::{
    CategoryUniverse, DEFAULT_CLASS_ORDER, DEFAULT_DURATION_MINUTES, DURATION_STEP_MINUTES,
    MAX_DURATION_MINUTES, MIN_DURATION_MINUTES,
};
use flight_core::gbdt::hash_path_for;
use flight_core::{schema, FlightSelection, Session};
use std::fmt::Write;
use std::path::Path;
use tracing::info;

/// Inputs of the "Price Prediction" section
#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub airline: String,
    pub class: String,
    pub departure_city: String,
    pub arrival_city: String,
    pub duration_minutes: u32,
    /// Defaults to the current date
    pub journey_date: Option<NaiveDate>,
}

impl PredictRequest {
    pub fn into_selection(self, today: NaiveDate) -> FlightSelection {
        FlightSelection {
            airline: self.airline,
            class: self.class,
            departure_city: self.departure_city,
            arrival_city: self.arrival_city,
            duration_minutes: self.duration_minutes,
            journey_date: self.journey_date.unwrap_or(today),
        }
    }
}

pub struct App {
    session: Session,
}

impl App {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    /// Load dataset, model and layout eagerly
    pub fn preload(&self) -> Result<()> {
        let dataset = self.session.dataset().context("Failed to load dataset")?;
        let layout = self.session.layout().context("Failed to load model")?;
        let source = self.session.layout_source()?;
        info!(
            rows = dataset.len(),
            features = layout.width(),
            source = ?source,
            "Session ready"
        );
        Ok(())
    }

    /// "Insights" section
    pub fn insights(&self) -> Result<String> {
        let report = self.session.insights().context("Failed to build insights")?;
        Ok(render_report(
            &report,
            &self.session.config().display.currency_symbol,
        ))
    }

    pub fn insights_json(&self) -> Result<String> {
        let report = self.session.insights().context("Failed to build insights")?;
        Ok(serde_json::to_string_pretty(&report)?)
    }

    /// Values offered for each prediction input, as listed in the dataset
    pub fn options(&self) -> Result<String> {
        let dataset = self.session.dataset()?;
        let mut out = String::new();

        for (label, column) in [
            ("Airline", schema::AIRLINE),
            ("Departure Location", schema::DEPARTURE_CITY),
            ("Destination Location", schema::ARRIVAL_CITY),
        ] {
            let universe = CategoryUniverse::from_dataset(dataset, column)
                .with_context(|| format!("Dataset has no '{}' column", column))?;
            out.push_str(&render_choices(label, universe.values()));
        }

        let classes: Vec<String> = DEFAULT_CLASS_ORDER.iter().map(|c| c.to_string()).collect();
        out.push_str(&render_choices("Class", &classes));
        let _ = writeln!(
            out,
            "Duration (in minutes): {}-{}, step {}, default {}",
            MIN_DURATION_MINUTES, MAX_DURATION_MINUTES, DURATION_STEP_MINUTES, DEFAULT_DURATION_MINUTES
        );
        Ok(out)
    }

    /// "Price Prediction" section
    pub fn predict(&self, request: PredictRequest, today: NaiveDate) -> Result<String> {
        let selection = request.into_selection(today);
        let prediction = self
            .session
            .predict(&selection)
            .context("Prediction failed")?;
        Ok(format!(
            "Predicted Flight Price: {}",
            self.session.format_price(&prediction)
        ))
    }

    /// Persist the dataset-derived category order as a layout file
    pub fn export_layout(&self, output: &Path, show_names: bool) -> Result<String> {
        let layout = self.session.derive_layout()?;
        layout
            .save_json(output)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!(path = %output.display(), width = layout.width(), "Layout written");

        let mut out = format!(
            "Wrote layout with {} features to {}",
            layout.width(),
            output.display()
        );
        if show_names {
            for (i, name) in layout.feature_names().iter().enumerate() {
                let _ = write!(out, "\n  {:>3}  {}", i, name);
            }
        }
        Ok(out)
    }

    /// Print, write or verify the model's blake3 hash sidecar
    pub fn model_hash(&self, write: bool, verify: bool) -> Result<String> {
        let model = self.session.model()?;
        let path = &self.session.config().model.model_path;
        if verify {
            model.verify_hash_file(path)?;
            return Ok(format!("{} OK", hash_path_for(path).display()));
        }
        if write {
            let hash = model.write_hash_file(path)?;
            return Ok(format!(
                "{} (written to {})",
                hash,
                hash_path_for(path).display()
            ));
        }
        Ok(model.hash_hex()?)
    }
}

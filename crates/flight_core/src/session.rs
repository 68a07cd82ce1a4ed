//! Per-process dashboard session
//!
//! The dataset, model and feature layout are loaded on first use and then
//! reused read-only for every later interaction. Changing the files on disk
//! has no effect until a new session is created.

use crate::config::DashboardConfig;
use crate::dataset::Dataset;
use crate::errors::{CoreError, Result};
use crate::features::{build_feature_vector, FeatureLayout, FlightSelection};
use crate::gbdt::Model;
use crate::insights::InsightReport;
use crate::prediction::{predict_price, PricePrediction, Regressor};
use once_cell::unsync::OnceCell;
use tracing::{debug, info, warn};

/// Where the active feature layout came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutSource {
    /// `model.layout_path`
    File,
    /// Embedded in the model artifact
    Model,
    /// First-seen order of the loaded dataset
    Dataset,
}

pub struct Session {
    config: DashboardConfig,
    dataset: OnceCell<Dataset>,
    model: OnceCell<Model>,
    layout: OnceCell<(FeatureLayout, LayoutSource)>,
}

impl Session {
    pub fn new(config: DashboardConfig) -> Self {
        Self {
            config,
            dataset: OnceCell::new(),
            model: OnceCell::new(),
            layout: OnceCell::new(),
        }
    }

    /// Session with artifacts supplied directly instead of read from disk
    pub fn with_artifacts(config: DashboardConfig, dataset: Dataset, model: Model) -> Self {
        Self {
            config,
            dataset: OnceCell::with_value(dataset),
            model: OnceCell::with_value(model),
            layout: OnceCell::new(),
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub fn dataset(&self) -> Result<&Dataset> {
        self.dataset.get_or_try_init(|| {
            let path = &self.config.data.dataset_path;
            debug!(path = %path.display(), "Loading dataset");
            Ok(Dataset::from_csv(path)?)
        })
    }

    pub fn model(&self) -> Result<&Model> {
        self.model.get_or_try_init(|| {
            let path = &self.config.model.model_path;
            let model = Model::load_json(path)?;
            if self.config.model.verify_hash {
                model.verify_hash_file(path)?;
            }
            Ok(model)
        })
    }

    /// Feature layout checked against the model's input width
    pub fn layout(&self) -> Result<&FeatureLayout> {
        let (layout, _) = self.layout.get_or_try_init(|| self.resolve_layout())?;
        Ok(layout)
    }

    pub fn layout_source(&self) -> Result<LayoutSource> {
        let (_, source) = self.layout.get_or_try_init(|| self.resolve_layout())?;
        Ok(*source)
    }

    fn resolve_layout(&self) -> Result<(FeatureLayout, LayoutSource)> {
        let model = self.model()?;

        let (layout, source) = if let Some(path) = &self.config.model.layout_path {
            info!(path = %path.display(), "Loading feature layout");
            (FeatureLayout::load_json(path)?, LayoutSource::File)
        } else if let Some(layout) = &model.layout {
            (layout.clone(), LayoutSource::Model)
        } else {
            warn!("No persisted feature layout; deriving category order from the dataset");
            (self.derive_layout()?, LayoutSource::Dataset)
        };

        if let Some(expected) = Regressor::n_features(model) {
            if layout.width() != expected {
                return Err(CoreError::LayoutMismatch(format!(
                    "layout encodes {} features but the model expects {}",
                    layout.width(),
                    expected
                )));
            }
        }

        Ok((layout, source))
    }

    /// Layout from the dataset's first-seen category order
    pub fn derive_layout(&self) -> Result<FeatureLayout> {
        Ok(FeatureLayout::from_dataset(self.dataset()?)?)
    }

    pub fn insights(&self) -> Result<InsightReport> {
        Ok(InsightReport::build(self.dataset()?))
    }

    /// Encode a selection and run it through the model
    pub fn predict(&self, selection: &FlightSelection) -> Result<PricePrediction> {
        let layout = self.layout()?;
        let features =
            build_feature_vector(selection, layout, self.config.encoding.unknown_category)?;
        let prediction = predict_price(&features, self.model()?)?;
        debug!(
            log_price = prediction.log_price,
            price = prediction.price,
            "Prediction complete"
        );
        Ok(prediction)
    }

    /// Formatted currency string for a prediction
    pub fn format_price(&self, prediction: &PricePrediction) -> String {
        prediction.formatted(&self.config.display.currency_symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::{CategoryUniverse, UnknownCategoryPolicy};
    use crate::gbdt::{Node, Tree};
    use chrono::NaiveDate;

    fn dataset() -> Dataset {
        let csv = "airline,class,departure_city,arrival_city,price\n\
                   IndiGo,economy,Delhi,Mumbai,5000\n\
                   Vistara,business,Mumbai,Delhi,20000\n";
        Dataset::from_reader(csv.as_bytes()).unwrap()
    }

    // Width 4 + 2 + 2 + 2 + 2 = 12; splits on the business position (index 7)
    fn model() -> Model {
        let tree = Tree::new(
            vec![
                Node::internal(0, 7, 0.5, 1, 2),
                Node::leaf(1, f64::ln(5000.0)),
                Node::leaf(2, f64::ln(20000.0)),
            ],
            1.0,
        );
        Model::new(vec![tree], 0.0, 12)
    }

    fn selection(class: &str) -> FlightSelection {
        FlightSelection {
            airline: "IndiGo".into(),
            class: class.into(),
            departure_city: "Delhi".into(),
            arrival_city: "Mumbai".into(),
            duration_minutes: 130,
            journey_date: NaiveDate::from_ymd_opt(2024, 12, 1).unwrap(),
        }
    }

    #[test]
    fn test_layout_derived_from_dataset() {
        let session = Session::with_artifacts(DashboardConfig::default(), dataset(), model());
        let layout = session.layout().unwrap();
        assert_eq!(layout.airlines.values(), &["IndiGo", "Vistara"]);
        assert_eq!(session.layout_source().unwrap(), LayoutSource::Dataset);
    }

    #[test]
    fn test_embedded_layout_wins_over_dataset() {
        let embedded = FeatureLayout::new(
            CategoryUniverse::new(["Vistara", "IndiGo"]),
            CategoryUniverse::new(["Mumbai", "Delhi"]),
            CategoryUniverse::new(["Delhi", "Mumbai"]),
        );
        let model = model().with_layout(embedded.clone());
        let session = Session::with_artifacts(DashboardConfig::default(), dataset(), model);
        assert_eq!(session.layout().unwrap(), &embedded);
        assert_eq!(session.layout_source().unwrap(), LayoutSource::Model);
    }

    #[test]
    fn test_predict_round_trip() {
        let session = Session::with_artifacts(DashboardConfig::default(), dataset(), model());

        let economy = session.predict(&selection("economy")).unwrap();
        assert!((economy.price - 5000.0).abs() < 1e-6);

        let business = session.predict(&selection("business")).unwrap();
        assert!((business.price - 20000.0).abs() < 1e-6);
        assert_eq!(session.format_price(&business), "₹20,000.00");
    }

    #[test]
    fn test_prediction_failure_does_not_poison_session() {
        let mut config = DashboardConfig::default();
        config.encoding.unknown_category = UnknownCategoryPolicy::Reject;
        let session = Session::with_artifacts(config, dataset(), model());

        let mut bad = selection("economy");
        bad.airline = "Unknown".into();
        assert!(matches!(session.predict(&bad), Err(CoreError::Encode(_))));

        assert!(session.predict(&selection("economy")).is_ok());
    }

    #[test]
    fn test_layout_width_mismatch() {
        let mut narrow = model();
        narrow.n_features = 8;
        let session = Session::with_artifacts(DashboardConfig::default(), dataset(), narrow);
        assert!(matches!(session.layout(), Err(CoreError::LayoutMismatch(_))));
    }

    #[test]
    fn test_missing_dataset_file() {
        let mut config = DashboardConfig::default();
        config.data.dataset_path = "/nonexistent/flights.csv".into();
        let session = Session::new(config);
        assert!(matches!(session.dataset(), Err(CoreError::Dataset(_))));
    }
}

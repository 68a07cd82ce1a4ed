//! End-to-end tests: artifacts on disk -> session -> insights and predictions

use anyhow::Result;
use chrono::NaiveDate;
use flight_core::gbdt::{Node, Tree};
use flight_core::session::LayoutSource;
use flight_core::{
    CategoryUniverse, CoreError, DashboardConfig, FeatureLayout, FlightSelection, Model,
    ModelError, Session,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const DATASET: &str = "\
airline,class,departure_city,arrival_city,price,departure_date,Season,Departure_Time,route
SpiceJet,economy,Delhi,Mumbai,5953.0,2024-06-15,Summer,Morning,Delhi-Mumbai
Vistara,business,Delhi,Mumbai,32000.0,2024-06-16,Summer,Evening,Delhi-Mumbai
AirAsia,economy,Mumbai,Delhi,4100.0,2024-12-01,Winter,Night,Mumbai-Delhi
SpiceJet,economy,Mumbai,Bangalore,,2024-12-02,Winter,Morning,Mumbai-Bangalore
Vistara,economy,Delhi,Bangalore,7050.0,2024-03-10,Spring,Afternoon,Delhi-Bangalore
";

fn layout() -> FeatureLayout {
    FeatureLayout::new(
        CategoryUniverse::new(["SpiceJet", "Vistara", "AirAsia"]),
        CategoryUniverse::new(["Delhi", "Mumbai"]),
        CategoryUniverse::new(["Mumbai", "Delhi", "Bangalore"]),
    )
}

/// Prices business (feature 8) at ~30k, long economy flights at ~7k,
/// everything else at ~5k
fn model() -> Model {
    let class_tree = Tree::new(
        vec![
            Node::internal(0, 8, 0.5, 1, 2),
            Node::leaf(1, 0.0),
            Node::leaf(2, f64::ln(6.0)),
        ],
        1.0,
    );
    let duration_tree = Tree::new(
        vec![
            Node::internal(0, 0, 150.0, 1, 2),
            Node::leaf(1, 0.0),
            Node::leaf(2, f64::ln(1.4)),
        ],
        1.0,
    );
    Model::new(vec![class_tree, duration_tree], f64::ln(5000.0), 0).with_layout(layout())
}

struct Fixture {
    _dir: TempDir,
    config: DashboardConfig,
}

fn write_fixture(model: &Model, with_hash: bool) -> Result<Fixture> {
    let dir = TempDir::new()?;
    let dataset_path = dir.path().join("flights.csv");
    let model_path = dir.path().join("model.json");

    fs::write(&dataset_path, DATASET)?;
    model.save_json(&model_path)?;
    if with_hash {
        model.write_hash_file(&model_path)?;
    }

    let mut config = DashboardConfig::default();
    config.data.dataset_path = dataset_path;
    config.model.model_path = model_path;
    config.model.verify_hash = with_hash;

    Ok(Fixture { _dir: dir, config })
}

fn selection(airline: &str, class: &str, duration: u32) -> FlightSelection {
    FlightSelection {
        airline: airline.to_string(),
        class: class.to_string(),
        departure_city: "Delhi".to_string(),
        arrival_city: "Mumbai".to_string(),
        duration_minutes: duration,
        journey_date: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
    }
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-6 * expected,
        "{} != {}",
        actual,
        expected
    );
}

#[test]
fn test_predictions_from_disk_artifacts() -> Result<()> {
    let fixture = write_fixture(&model(), true)?;
    let session = Session::new(fixture.config.clone());

    assert_eq!(session.layout_source()?, LayoutSource::Model);

    let economy = session.predict(&selection("SpiceJet", "economy", 120))?;
    assert_close(economy.price, 5000.0);
    assert_eq!(session.format_price(&economy), "₹5,000.00");

    let business = session.predict(&selection("Vistara", "business", 120))?;
    assert_close(business.price, 30000.0);

    let long_haul = session.predict(&selection("AirAsia", "economy", 240))?;
    assert_close(long_haul.price, 7000.0);
    Ok(())
}

#[test]
fn test_insights_from_disk_dataset() -> Result<()> {
    let fixture = write_fixture(&model(), false)?;
    let session = Session::new(fixture.config.clone());

    let report = session.insights()?;
    // The row without a price is dropped at load time
    assert_eq!(report.total_rows, 4);

    let airlines = &report.sections[0];
    let keys: Vec<&str> = airlines.groups.iter().map(|g| g.key.as_str()).collect();
    assert_eq!(keys, vec!["AirAsia", "SpiceJet", "Vistara"]);
    assert_close(airlines.groups[2].mean_price, (32000.0 + 7050.0) / 2.0);

    // Days_To_Departure was not shipped in this file
    let days = report.sections.last().unwrap();
    assert!(days.warning.is_some());
    Ok(())
}

#[test]
fn test_tampered_model_fails_hash_check() -> Result<()> {
    let fixture = write_fixture(&model(), true)?;
    let mut tampered = model();
    tampered.bias += 1.0;
    tampered.save_json(&fixture.config.model.model_path)?;

    let session = Session::new(fixture.config.clone());
    let err = session.model().unwrap_err();
    assert!(matches!(err, CoreError::Model(ModelError::HashMismatch { .. })));
    Ok(())
}

#[test]
fn test_external_layout_file_takes_precedence() -> Result<()> {
    let fixture = write_fixture(&model(), false)?;
    let layout_path = Path::new(&fixture.config.model.model_path).with_file_name("layout.json");

    let mut reordered = layout();
    reordered.classes = CategoryUniverse::new(["business", "economy"]);
    reordered.save_json(&layout_path)?;

    let mut config = fixture.config.clone();
    config.model.layout_path = Some(layout_path);
    let session = Session::new(config);

    assert_eq!(session.layout_source()?, LayoutSource::File);
    // Economy now lands on the position the model reads as business
    let economy = session.predict(&selection("SpiceJet", "economy", 120))?;
    assert_close(economy.price, 30000.0);
    Ok(())
}

#[test]
fn test_dimension_mismatch_is_reported_per_request() -> Result<()> {
    let mut narrow = model();
    narrow.layout = None;
    narrow.n_features = 9;
    let fixture = write_fixture(&narrow, false)?;

    // Dataset-derived layout has 4 + 3 + 2 + 2 + 3 = 14 columns
    let session = Session::new(fixture.config.clone());
    let err = session.predict(&selection("SpiceJet", "economy", 120)).unwrap_err();
    assert!(matches!(err, CoreError::LayoutMismatch(_)));

    // Insights remain available
    assert!(session.insights().is_ok());
    Ok(())
}

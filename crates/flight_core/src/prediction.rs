//! Price prediction from an encoded feature vector
//!
//! Models are trained on `ln(price)`, so the raw output is mapped back with
//! `exp` before display.

use crate::gbdt::ModelError;
use serde::{Deserialize, Serialize};

/// Default currency symbol for formatted prices
pub const DEFAULT_CURRENCY_SYMBOL: &str = "₹";

/// A regression model consumed as a black box
pub trait Regressor {
    /// Input width the model accepts, if it declares one
    fn n_features(&self) -> Option<usize>;

    /// Estimate for one feature vector, in the model's target space
    fn predict(&self, features: &[f64]) -> Result<f64, ModelError>;
}

/// Result of a single price prediction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePrediction {
    /// Raw model output
    pub log_price: f64,
    /// `exp(log_price)`
    pub price: f64,
}

impl PricePrediction {
    pub fn formatted(&self, currency_symbol: &str) -> String {
        format_currency(self.price, currency_symbol)
    }
}

/// Run the model and invert the log-price target transform
pub fn predict_price<R>(features: &[f64], model: &R) -> Result<PricePrediction, ModelError>
where
    R: Regressor + ?Sized,
{
    if let Some(expected) = model.n_features() {
        if features.len() != expected {
            return Err(ModelError::DimensionMismatch {
                expected,
                actual: features.len(),
            });
        }
    }

    let log_price = model.predict(features)?;
    let price = log_price.exp();
    if !price.is_finite() {
        return Err(ModelError::NonFiniteOutput(log_price));
    }
    Ok(PricePrediction { log_price, price })
}

/// Format an amount with two decimals and comma thousands separators,
/// e.g. `₹12,345.68`
pub fn format_currency(amount: f64, currency_symbol: &str) -> String {
    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{}{}{}.{}", sign, currency_symbol, grouped, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedOutput(f64);

    impl Regressor for FixedOutput {
        fn n_features(&self) -> Option<usize> {
            None
        }

        fn predict(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(self.0)
        }
    }

    struct Failing;

    impl Regressor for Failing {
        fn n_features(&self) -> Option<usize> {
            None
        }

        fn predict(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Err(ModelError::ValidationFailed("not loaded".to_string()))
        }
    }

    struct ThreeWide;

    impl Regressor for ThreeWide {
        fn n_features(&self) -> Option<usize> {
            Some(3)
        }

        fn predict(&self, _features: &[f64]) -> Result<f64, ModelError> {
            Ok(0.0)
        }
    }

    #[test]
    fn test_exp_inverts_log_transform() {
        for price in [1.0, 49.99, 5_953.0, 12_345.0, 250_000.0] {
            let prediction = predict_price(&[], &FixedOutput(f64::ln(price))).unwrap();
            assert!(
                (prediction.price - price).abs() <= price * 1e-12,
                "{} != {}",
                prediction.price,
                price
            );
        }
    }

    #[test]
    fn test_model_failure_propagates() {
        let err = predict_price(&[1.0], &Failing).unwrap_err();
        assert!(matches!(err, ModelError::ValidationFailed(_)));
    }

    #[test]
    fn test_declared_width_checked_before_predict() {
        let err = predict_price(&[1.0], &ThreeWide).unwrap_err();
        assert!(matches!(err, ModelError::DimensionMismatch { expected: 3, actual: 1 }));
        assert_eq!(predict_price(&[1.0, 2.0, 3.0], &ThreeWide).unwrap().price, 1.0);
    }

    #[test]
    fn test_overflowing_prediction_rejected() {
        let err = predict_price(&[], &FixedOutput(1e6)).unwrap_err();
        assert!(matches!(err, ModelError::NonFiniteOutput(_)));
    }

    #[test]
    fn test_dyn_regressor() {
        let model: Box<dyn Regressor> = Box::new(FixedOutput(0.0));
        assert_eq!(predict_price(&[], model.as_ref()).unwrap().price, 1.0);
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "₹"), "₹0.00");
        assert_eq!(format_currency(999.999, "₹"), "₹1,000.00");
        assert_eq!(format_currency(12_345.0, "₹"), "₹12,345.00");
        assert_eq!(format_currency(1_234_567.891, "$"), "$1,234,567.89");
        assert_eq!(format_currency(100.5, ""), "100.50");
        assert_eq!(format_currency(-4_200.0, "₹"), "-₹4,200.00");
    }

    #[test]
    fn test_prediction_formatted() {
        let prediction = PricePrediction {
            log_price: f64::ln(5953.0),
            price: 5953.0,
        };
        assert_eq!(prediction.formatted("₹"), "₹5,953.00");
    }
}

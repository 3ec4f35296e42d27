use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::pricing::{ExchangeRate, ExchangeRates};
use crate::supplier::AvailabilityCandidate;
use crate::validation::ValidationRules;

// Transformer configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformerConfig {
    /// Percentage added to every net price.
    pub markup_percentage: f64,
    pub exchange_rates: ExchangeRates,
    pub rules: ValidationRules,
    /// Priced by `process_request` when the caller supplies no candidates.
    pub default_candidates: Vec<AvailabilityCandidate>,
}

impl Default for TransformerConfig {
    fn default() -> Self {
        Self {
            markup_percentage: 3.2,
            exchange_rates: ExchangeRates::new(vec![
                ExchangeRate::new("USD", "EUR", 0.92),
                ExchangeRate::new("USD", "GBP", 0.79),
                ExchangeRate::new("USD", "CHF", 0.88),
                ExchangeRate::new("USD", "JPY", 149.5),
                ExchangeRate::new("USD", "CAD", 1.36),
                ExchangeRate::new("USD", "AUD", 1.52),
            ]),
            rules: ValidationRules::default(),
            default_candidates: vec![AvailabilityCandidate::new("39971881", 132.42, "USD")],
        }
    }
}

impl TransformerConfig {
    /// Reads a JSON config; absent keys keep their default values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: TransformerConfig =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if !self.markup_percentage.is_finite() || self.markup_percentage < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "markup_percentage must be a non-negative number, got {}",
                self.markup_percentage
            )));
        }
        self.exchange_rates.check()?;
        self.rules.check()
    }
}

// Price stage: markup and currency conversion
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    #[serde(rename = "minimumSellingPrice")]
    pub minimum_selling_price: Option<f64>,
    pub currency: String,
    pub net: f64,
    pub selling_price: f64,
    pub selling_currency: String,
    pub markup: f64,
    pub exchange_rate: f64,
}

impl PriceQuote {
    pub fn new(
        net: f64,
        currency: &str,
        selling_currency: &str,
        markup: f64,
        exchange_rate: f64,
        minimum_selling_price: Option<f64>,
    ) -> Self {
        Self {
            minimum_selling_price,
            currency: currency.to_string(),
            net,
            selling_price: selling_price(net, markup, exchange_rate),
            selling_currency: selling_currency.to_string(),
            markup,
            exchange_rate,
        }
    }
}

/// `net * (1 + markup / 100) * exchange_rate`, rounded to cents.
pub fn selling_price(net: f64, markup: f64, exchange_rate: f64) -> f64 {
    round_to_cents(net * (1.0 + markup / 100.0) * exchange_rate)
}

pub fn round_to_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRate {
    pub from: String,
    pub to: String,
    pub rate: f64,
}

impl ExchangeRate {
    pub fn new(from: &str, to: &str, rate: f64) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            rate,
        }
    }
}

// Currency pair table; the reverse of a listed pair is derived from it
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExchangeRates {
    rates: Vec<ExchangeRate>,
}

impl ExchangeRates {
    pub fn new(rates: Vec<ExchangeRate>) -> Self {
        Self { rates }
    }

    pub fn rate(&self, from: &str, to: &str) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }
        if let Some(direct) = self.rates.iter().find(|r| r.from == from && r.to == to) {
            return Some(direct.rate);
        }
        self.rates
            .iter()
            .find(|r| r.from == to && r.to == from)
            .map(|reverse| 1.0 / reverse.rate)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        match self
            .rates
            .iter()
            .find(|r| !r.rate.is_finite() || r.rate <= 0.0)
        {
            Some(bad) => Err(ConfigError::Invalid(format!(
                "exchange rate {} -> {} must be a positive number, got {}",
                bad.from, bad.to, bad.rate
            ))),
            None => Ok(()),
        }
    }
}

// Request transformer: parse -> extract -> validate -> price -> assemble
use tracing::{debug, info, warn};

use crate::config::TransformerConfig;
use crate::error::{ConfigError, TransformError};
use crate::identifier::{Clock, IdGenerator, RandomSuffix, SuffixSource, SystemClock};
use crate::pricing::PriceQuote;
use crate::request::{extract, AvailRequest};
use crate::response::{to_json, AvailabilityResult};
use crate::supplier::AvailabilityCandidate;
use crate::validation::validate;
use crate::xml_request::parse_avail_request;

/// Turns `AvailRQ` documents into priced availability results.
///
/// Holds no per-call state: the clock and the suffix source are only read.
pub struct RequestTransformer<C = SystemClock, S = RandomSuffix> {
    config: TransformerConfig,
    clock: C,
    suffixes: S,
}

impl RequestTransformer {
    pub fn new(config: TransformerConfig) -> Result<Self, ConfigError> {
        Self::with_sources(config, SystemClock, RandomSuffix)
    }
}

impl<C: Clock, S: SuffixSource> RequestTransformer<C, S> {
    pub fn with_sources(
        config: TransformerConfig,
        clock: C,
        suffixes: S,
    ) -> Result<Self, ConfigError> {
        config.check()?;
        Ok(Self {
            config,
            clock,
            suffixes,
        })
    }

    pub fn config(&self) -> &TransformerConfig {
        &self.config
    }

    /// Parses, extracts and validates a request without pricing it.
    pub fn parse_request(&self, xml: &str) -> Result<AvailRequest, TransformError> {
        let document = parse_avail_request(xml)?;
        let extracted = extract(document)?;
        debug!(
            currency = %extracted.currency,
            nationality = %extracted.nationality,
            rooms = extracted.rooms.len(),
            "extracted availability request"
        );
        validate(extracted, &self.config.rules, self.clock.now().date())
    }

    pub fn transform(&self, xml: &str) -> Result<Vec<AvailabilityResult>, TransformError> {
        self.transform_with_candidates(xml, &self.config.default_candidates)
    }

    /// Builds one result per candidate, in candidate order. Any failure
    /// rejects the whole request.
    pub fn transform_with_candidates(
        &self,
        xml: &str,
        candidates: &[AvailabilityCandidate],
    ) -> Result<Vec<AvailabilityResult>, TransformError> {
        let outcome = self
            .parse_request(xml)
            .and_then(|request| self.assemble(&request, candidates));

        match &outcome {
            Ok(results) => info!(results = results.len(), "availability request processed"),
            Err(e) => warn!(error = %e, "availability request rejected"),
        }
        outcome
    }

    pub fn process_request(&self, xml: &str) -> Result<String, TransformError> {
        to_json(&self.transform(xml)?)
    }

    pub fn process_request_with_candidates(
        &self,
        xml: &str,
        candidates: &[AvailabilityCandidate],
    ) -> Result<String, TransformError> {
        to_json(&self.transform_with_candidates(xml, candidates)?)
    }

    fn assemble(
        &self,
        request: &AvailRequest,
        candidates: &[AvailabilityCandidate],
    ) -> Result<Vec<AvailabilityResult>, TransformError> {
        let mut ids = IdGenerator::new(&self.clock, &self.suffixes);

        candidates
            .iter()
            .map(|candidate| -> Result<AvailabilityResult, TransformError> {
                let price = self.price(request, candidate)?;
                Ok(AvailabilityResult {
                    id: ids.next_id(),
                    hotel_code_supplier: candidate.hotel_code_supplier.clone(),
                    market: request.nationality.clone(),
                    price,
                    rooms: request.rooms.clone(),
                })
            })
            .collect()
    }

    fn price(
        &self,
        request: &AvailRequest,
        candidate: &AvailabilityCandidate,
    ) -> Result<PriceQuote, TransformError> {
        candidate.check()?;

        let exchange_rate = self
            .config
            .exchange_rates
            .rate(&candidate.currency, &request.currency)
            .ok_or_else(|| {
                TransformError::validation(
                    "Currency",
                    format!(
                        "No exchange rate configured from {} to {}",
                        candidate.currency, request.currency
                    ),
                )
            })?;

        debug!(
            hotel = %candidate.hotel_code_supplier,
            net = candidate.net,
            exchange_rate,
            "pricing candidate"
        );

        let quote = PriceQuote::new(
            candidate.net,
            &candidate.currency,
            &request.currency,
            self.config.markup_percentage,
            exchange_rate,
            candidate.minimum_selling_price,
        );
        if !quote.selling_price.is_finite() {
            return Err(TransformError::Supplier(format!(
                "selling price for hotel {} is out of range",
                candidate.hotel_code_supplier
            )));
        }
        Ok(quote)
    }
}

/// Processes a request with the default configuration and candidate set.
pub fn process_request(xml: &str) -> Result<String, TransformError> {
    RequestTransformer::new(TransformerConfig::default())?.process_request(xml)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identifier::{FixedClock, SequentialSuffix};
    use crate::pricing::selling_price;
    use crate::supplier::candidates_from_json;
    use crate::validation::ValidationRules;
    use chrono::NaiveDate;
    use std::collections::HashSet;
    use test_case::test_case;

    const SAMPLE_REQUEST: &str = include_str!("../samples/avail_request.xml");
    const SAMPLE_REQUEST_ROOMS: &str = include_str!("../samples/avail_request_rooms.xml");
    const SAMPLE_SUPPLIER_JSON: &str = include_str!("../samples/supplier_response.json");

    fn fixed_clock() -> FixedClock {
        FixedClock(
            NaiveDate::from_ymd_opt(2025, 2, 18)
                .unwrap()
                .and_hms_opt(9, 30, 5)
                .unwrap(),
        )
    }

    fn transformer(config: TransformerConfig) -> RequestTransformer<FixedClock, SequentialSuffix> {
        RequestTransformer::with_sources(config, fixed_clock(), SequentialSuffix::new()).unwrap()
    }

    #[test]
    fn test_sample_request_round_trip() {
        let transformer = transformer(TransformerConfig::default());
        let json = transformer.process_request(SAMPLE_REQUEST).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(
            value,
            serde_json::json!([{
                "id": "A#20250218093005-00000001",
                "hotelCodeSupplier": "39971881",
                "market": "US",
                "price": {
                    "minimumSellingPrice": null,
                    "currency": "USD",
                    "net": 132.42,
                    "selling_price": 136.66,
                    "selling_currency": "USD",
                    "markup": 3.2,
                    "exchange_rate": 1.0
                }
            }])
        );
    }

    #[test]
    fn test_default_entry_point() {
        let json = process_request(SAMPLE_REQUEST).unwrap();
        let results: Vec<AvailabilityResult> = serde_json::from_str(&json).unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].price.selling_price, 136.66);
        assert_eq!(results[0].price.selling_currency, "USD");
        assert!(results[0].id.starts_with("A#"));
    }

    #[test]
    fn test_supplier_feed_prices_every_rate() {
        let transformer = transformer(TransformerConfig::default());
        let candidates = candidates_from_json(SAMPLE_SUPPLIER_JSON).unwrap();
        let results = transformer
            .transform_with_candidates(SAMPLE_REQUEST, &candidates)
            .unwrap();

        assert_eq!(results.len(), candidates.len());
        for (result, candidate) in results.iter().zip(&candidates) {
            assert_eq!(result.hotel_code_supplier, candidate.hotel_code_supplier);
            assert_eq!(result.price.net, candidate.net);
            assert_eq!(
                result.price.selling_price,
                selling_price(candidate.net, 3.2, result.price.exchange_rate)
            );
        }
        assert_eq!(results[1].price.minimum_selling_price, Some(155.0));

        let ids: HashSet<&String> = results.iter().map(|r| &r.id).collect();
        assert_eq!(ids.len(), results.len());
        assert_eq!(results[2].id, "A#20250218093005-00000003");
    }

    #[test]
    fn test_random_ids_are_unique_within_a_call() {
        let transformer = RequestTransformer::new(TransformerConfig::default()).unwrap();
        let candidates: Vec<AvailabilityCandidate> = (0..200)
            .map(|i| AvailabilityCandidate::new(&format!("H{}", i), 100.0 + i as f64, "USD"))
            .collect();
        let results = transformer
            .transform_with_candidates(SAMPLE_REQUEST, &candidates)
            .unwrap();

        let ids: HashSet<&String> = results.iter().map(|r| &r.id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_currency_conversion() {
        let transformer = transformer(TransformerConfig::default());
        let xml = SAMPLE_REQUEST.replace("<Currency>USD</Currency>", "<Currency>EUR</Currency>");
        let results = transformer.transform(&xml).unwrap();
        let price = &results[0].price;

        assert_eq!(price.currency, "USD");
        assert_eq!(price.selling_currency, "EUR");
        assert_eq!(price.exchange_rate, 0.92);
        assert_eq!(price.selling_price, 125.72);
    }

    #[test]
    fn test_missing_exchange_rate_rejects_request() {
        let transformer = transformer(TransformerConfig::default());
        let candidates = vec![AvailabilityCandidate::new("39971881", 100.0, "EUR")];
        let xml = SAMPLE_REQUEST.replace("<Currency>USD</Currency>", "<Currency>GBP</Currency>");

        let err = transformer
            .transform_with_candidates(&xml, &candidates)
            .unwrap_err();
        assert_eq!(err.field(), Some("Currency"));
    }

    #[test]
    fn test_bad_candidate_rejects_whole_request() {
        let transformer = transformer(TransformerConfig::default());
        let candidates = vec![
            AvailabilityCandidate::new("1", 100.0, "USD"),
            AvailabilityCandidate::new("2", -5.0, "USD"),
        ];

        let result = transformer.transform_with_candidates(SAMPLE_REQUEST, &candidates);
        assert!(matches!(result, Err(TransformError::Supplier(_))));
    }

    #[test]
    fn test_overflowing_selling_price_is_rejected() {
        let transformer = transformer(TransformerConfig::default());
        let candidates = vec![AvailabilityCandidate::new("1", 1.7e308, "USD")];

        let result = transformer.transform_with_candidates(SAMPLE_REQUEST, &candidates);
        assert!(matches!(result, Err(TransformError::Supplier(_))));
    }

    #[test]
    fn test_no_candidates_gives_empty_array() {
        let transformer = transformer(TransformerConfig::default());
        let json = transformer
            .process_request_with_candidates(SAMPLE_REQUEST, &[])
            .unwrap();
        assert_eq!(json, "[]");
    }

    #[test]
    fn test_rooms_are_echoed_in_results() {
        let transformer = transformer(TransformerConfig::default());
        let results = transformer.transform(SAMPLE_REQUEST_ROOMS).unwrap();
        let value = serde_json::to_value(&results).unwrap();

        assert_eq!(
            value[0]["rooms"],
            serde_json::json!([
                { "adults": 1, "children": 1, "childAges": [4] },
                { "adults": 1, "children": 2, "childAges": [2, 1] }
            ])
        );
    }

    #[test]
    fn test_parse_request() {
        let transformer = transformer(TransformerConfig::default());
        let request = transformer.parse_request(SAMPLE_REQUEST).unwrap();

        assert_eq!(request.timeout_milliseconds, Some(25000));
        assert_eq!(request.language_code, "en");
        assert_eq!(request.options_quota, 20);
        assert_eq!(request.credentials.company_id, "123456");
        assert!(request.rooms.is_empty());
    }

    #[test_case("<StartDate>23/02/2025</StartDate>", "<StartDate>28/02/2025</StartDate>", "EndDate"; "#1 start after end")]
    #[test_case("<Currency>USD</Currency>", "<Currency>XYZ</Currency>", "Currency"; "#2 unknown currency")]
    #[test_case("<Nationality>US</Nationality>", "<Nationality>XX</Nationality>", "Nationality"; "#3 unknown nationality")]
    #[test_case("<SearchType>Multiple</SearchType>", "<SearchType>All</SearchType>", "SearchType"; "#4 unknown search type")]
    #[test_case("<Nationality>US</Nationality>", r#"<Nationality>US</Nationality><Paxes adults="0" children="0"/>"#, "Paxes[1]"; "#5 room without adults")]
    fn test_validation_errors(from: &str, to: &str, field: &str) {
        let transformer = transformer(TransformerConfig::default());
        let xml = SAMPLE_REQUEST.replace(from, to);

        let err = transformer.process_request(&xml).unwrap_err();
        assert!(
            matches!(err, TransformError::Validation { .. }),
            "expected validation error, got {:?}",
            err
        );
        assert_eq!(err.field(), Some(field));
    }

    #[test]
    fn test_malformed_xml_is_parse_error() {
        let transformer = transformer(TransformerConfig::default());
        let xml = SAMPLE_REQUEST.replace("</Currency>", "");

        let result = transformer.process_request(&xml);
        assert!(matches!(result, Err(TransformError::Parse(_))));
    }

    #[test]
    fn test_missing_password_is_missing_field() {
        let transformer = transformer(TransformerConfig::default());
        let xml = SAMPLE_REQUEST.replace(r#"password="XXXXXXXXXX" "#, "");

        let result = transformer.process_request(&xml);
        assert_eq!(
            result,
            Err(TransformError::MissingField("Parameter@password".to_string()))
        );
    }

    #[test]
    fn test_strict_rules_use_injected_clock() {
        let config = TransformerConfig {
            rules: ValidationRules::strict(),
            ..TransformerConfig::default()
        };
        // 2025-02-18 + 2 days <= 23/02/2025, and the stay is 4 nights
        assert!(transformer(config.clone()).transform(SAMPLE_REQUEST).is_ok());

        let late_clock = FixedClock(
            NaiveDate::from_ymd_opt(2025, 2, 22)
                .unwrap()
                .and_hms_opt(12, 0, 0)
                .unwrap(),
        );
        let transformer =
            RequestTransformer::with_sources(config, late_clock, SequentialSuffix::new()).unwrap();
        let err = transformer.transform(SAMPLE_REQUEST).unwrap_err();
        assert_eq!(err.field(), Some("StartDate"));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let config = TransformerConfig {
            markup_percentage: -3.0,
            ..TransformerConfig::default()
        };
        assert!(RequestTransformer::new(config).is_err());
    }
}

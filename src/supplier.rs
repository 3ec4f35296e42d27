use serde::{Deserialize, Serialize};

use crate::error::TransformError;

/// One priced availability entry coming from supply, turned into one result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityCandidate {
    pub hotel_code_supplier: String,
    pub net: f64,
    pub currency: String,
    #[serde(default)]
    pub minimum_selling_price: Option<f64>,
}

impl AvailabilityCandidate {
    pub fn new(hotel_code_supplier: &str, net: f64, currency: &str) -> Self {
        Self {
            hotel_code_supplier: hotel_code_supplier.to_string(),
            net,
            currency: currency.to_string(),
            minimum_selling_price: None,
        }
    }

    pub fn check(&self) -> Result<(), TransformError> {
        if self.hotel_code_supplier.trim().is_empty() {
            return Err(TransformError::Supplier(
                "candidate without a supplier hotel code".to_string(),
            ));
        }
        if !self.net.is_finite() || self.net < 0.0 {
            return Err(TransformError::Supplier(format!(
                "hotel {}: net price must be a non-negative amount, got {}",
                self.hotel_code_supplier, self.net
            )));
        }
        if self.currency.trim().is_empty() {
            return Err(TransformError::Supplier(format!(
                "hotel {}: net price has no currency",
                self.hotel_code_supplier
            )));
        }
        Ok(())
    }
}

// Data structures for supplier JSON response
#[derive(Debug, Deserialize, Serialize)]
pub struct SupplierResponse {
    pub hotels: Vec<SupplierHotel>,
    pub currency: String,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SupplierHotel {
    pub hotel_id: String,
    pub rooms: Vec<SupplierRoom>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SupplierRoom {
    pub rates: Vec<SupplierRate>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SupplierRate {
    pub price: f64,
    #[serde(default)]
    pub minimum_selling_price: Option<f64>,
}

impl From<SupplierResponse> for Vec<AvailabilityCandidate> {
    fn from(item: SupplierResponse) -> Self {
        let mut candidates = Vec::new();
        for hotel in item.hotels {
            for room in hotel.rooms {
                for rate in room.rates {
                    candidates.push(AvailabilityCandidate {
                        hotel_code_supplier: hotel.hotel_id.clone(),
                        net: rate.price,
                        currency: item.currency.clone(),
                        minimum_selling_price: rate.minimum_selling_price,
                    });
                }
            }
        }
        candidates
    }
}

/// Reads a supplier availability feed, one candidate per rate in document order.
pub fn candidates_from_json(json: &str) -> Result<Vec<AvailabilityCandidate>, TransformError> {
    let response: SupplierResponse =
        serde_json::from_str(json).map_err(|e| TransformError::Supplier(e.to_string()))?;
    Ok(response.into())
}

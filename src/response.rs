// Assemble stage: result records and their JSON form
use serde::{Deserialize, Serialize};

use crate::error::TransformError;
use crate::pricing::PriceQuote;
use crate::request::RoomRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResult {
    pub id: String,
    pub hotel_code_supplier: String,
    pub market: String,
    pub price: PriceQuote,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rooms: Vec<RoomRequest>,
}

/// Serializes results as a pretty-printed JSON array, keeping their order.
pub fn to_json(results: &[AvailabilityResult]) -> Result<String, TransformError> {
    serde_json::to_string_pretty(results).map_err(|e| TransformError::Serialization(e.to_string()))
}

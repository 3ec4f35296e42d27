// Extract stage: required fields and the typed availability request
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::TransformError;
use crate::xml_request::{XmlAvailRequest, XmlPaxes};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    pub username: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub company_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchType {
    Single,
    Multiple,
}

impl FromStr for SearchType {
    type Err = TransformError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Single" => Ok(SearchType::Single),
            "Multiple" => Ok(SearchType::Multiple),
            other => Err(TransformError::validation(
                "SearchType",
                format!("Invalid search type: {} (expected Single or Multiple)", other),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomRequest {
    pub adults: u32,
    pub children: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub child_ages: Option<Vec<u32>>,
}

/// A request that passed extraction and validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailRequest {
    pub timeout_milliseconds: Option<u64>,
    pub language_code: String,
    pub options_quota: u32,
    pub credentials: Credentials,
    pub search_type: Option<SearchType>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub currency: String,
    pub nationality: String,
    pub rooms: Vec<RoomRequest>,
}

// Raw values pulled out of the document, before any domain rule is applied
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedRequest {
    pub timeout_milliseconds: Option<String>,
    pub language_code: Option<String>,
    pub options_quota: Option<String>,
    pub credentials: Credentials,
    pub search_type: Option<String>,
    pub start_date: String,
    pub end_date: String,
    pub currency: String,
    pub nationality: String,
    pub rooms: Vec<ExtractedRoom>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ExtractedRoom {
    pub declared_adults: Option<String>,
    pub declared_children: Option<String>,
    pub pax_ages: Vec<String>,
}

/// Pulls every field out of the parsed document, failing with
/// [`TransformError::MissingField`] on the first required field that is absent.
pub fn extract(document: XmlAvailRequest) -> Result<ExtractedRequest, TransformError> {
    let parameter = document
        .configuration
        .and_then(|c| c.parameters)
        .and_then(|p| p.parameters.into_iter().next())
        .ok_or_else(|| {
            TransformError::MissingField("Configuration/Parameters/Parameter".to_string())
        })?;

    // Credentials are checked before rooms and stay data
    let credentials = Credentials {
        password: required(parameter.password, "Parameter@password")?,
        username: required(parameter.username, "Parameter@username")?,
        company_id: required(parameter.company_id, "Parameter@CompanyID")?,
    };

    let rooms = document
        .rooms
        .into_iter()
        .map(extract_room)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExtractedRequest {
        timeout_milliseconds: optional(document.timeout_milliseconds),
        language_code: optional(document.source.and_then(|s| s.language_code)),
        options_quota: optional(document.options_quota),
        credentials,
        search_type: optional(document.search_type),
        start_date: required(document.start_date, "StartDate")?,
        end_date: required(document.end_date, "EndDate")?,
        currency: required(document.currency, "Currency")?,
        nationality: required(document.nationality, "Nationality")?,
        rooms,
    })
}

fn extract_room(paxes: XmlPaxes) -> Result<ExtractedRoom, TransformError> {
    let pax_ages = paxes
        .paxes
        .into_iter()
        .map(|pax| required(pax.age, "Pax@age"))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(ExtractedRoom {
        declared_adults: optional(paxes.adults),
        declared_children: optional(paxes.children),
        pax_ages,
    })
}

// Blank text counts as absent
fn optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String, TransformError> {
    optional(value).ok_or_else(|| TransformError::MissingField(field.to_string()))
}

// Validate stage: domain rules for an extracted availability request
use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, TransformError};
use crate::request::{AvailRequest, ExtractedRequest, ExtractedRoom, RoomRequest, SearchType};

pub const DATE_FORMAT: &str = "%d/%m/%Y";

const DEFAULT_CURRENCIES: &[&str] = &["USD", "EUR", "GBP", "CHF", "JPY", "CAD", "AUD"];

const DEFAULT_NATIONALITIES: &[&str] = &[
    "US", "GB", "IE", "FR", "DE", "ES", "PT", "IT", "NL", "BE", "LU", "CH", "AT", "DK", "SE",
    "NO", "FI", "IS", "PL", "CZ", "SK", "HU", "RO", "BG", "GR", "HR", "SI", "EE", "LV", "LT",
    "CY", "MT", "TR", "RU", "UA", "IL", "AE", "SA", "QA", "EG", "MA", "ZA", "NG", "KE", "IN",
    "CN", "JP", "KR", "SG", "TH", "MY", "ID", "PH", "VN", "AU", "NZ", "CA", "MX", "BR", "AR",
    "CL", "CO", "PE",
];

const DEFAULT_LANGUAGES: &[&str] = &["en", "fr", "de", "es", "it", "pt", "nl"];

pub const MAX_LEAD_DAYS: i64 = 3650;

// Rules applied to every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationRules {
    pub currencies: Vec<String>,
    pub nationalities: Vec<String>,
    pub languages: Vec<String>,
    pub default_language: String,
    pub default_options_quota: u32,
    pub max_options_quota: u32,
    /// Guests up to and including this age count as children.
    pub child_age_limit: u32,
    pub max_children_per_room: u32,
    pub max_guests_per_room: u32,
    /// Minimum days between today and the start date, when set.
    pub min_lead_days: Option<i64>,
    pub min_stay_nights: i64,
}

impl Default for ValidationRules {
    fn default() -> Self {
        Self {
            currencies: to_strings(DEFAULT_CURRENCIES),
            nationalities: to_strings(DEFAULT_NATIONALITIES),
            languages: to_strings(DEFAULT_LANGUAGES),
            default_language: "en".to_string(),
            default_options_quota: 20,
            max_options_quota: 50,
            child_age_limit: 17,
            max_children_per_room: 2,
            max_guests_per_room: 4,
            min_lead_days: None,
            min_stay_nights: 0,
        }
    }
}

impl ValidationRules {
    /// Default rules plus the booking-window checks: the stay starts at least
    /// two days from today and lasts at least three nights.
    pub fn strict() -> Self {
        Self {
            min_lead_days: Some(2),
            min_stay_nights: 3,
            ..Self::default()
        }
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.max_options_quota == 0 {
            return Err(ConfigError::Invalid(
                "max_options_quota must be positive".to_string(),
            ));
        }
        if self.default_options_quota == 0 || self.default_options_quota > self.max_options_quota
        {
            return Err(ConfigError::Invalid(format!(
                "default_options_quota must be between 1 and {}",
                self.max_options_quota
            )));
        }
        if self.max_guests_per_room == 0 {
            return Err(ConfigError::Invalid(
                "max_guests_per_room must be positive".to_string(),
            ));
        }
        if self.min_stay_nights < 0 || self.min_lead_days.is_some_and(|days| days < 0) {
            return Err(ConfigError::Invalid(
                "booking window limits must not be negative".to_string(),
            ));
        }
        if self.min_lead_days.is_some_and(|days| days > MAX_LEAD_DAYS) {
            return Err(ConfigError::Invalid(format!(
                "min_lead_days must not exceed {}",
                MAX_LEAD_DAYS
            )));
        }
        if !self.languages.contains(&self.default_language) {
            return Err(ConfigError::Invalid(format!(
                "default_language {} is not an allowed language",
                self.default_language
            )));
        }
        Ok(())
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Applies every rule in order and returns the typed request.
///
/// `today` anchors the optional lead-time rule.
pub fn validate(
    request: ExtractedRequest,
    rules: &ValidationRules,
    today: NaiveDate,
) -> Result<AvailRequest, TransformError> {
    let (start_date, end_date) =
        validate_dates(&request.start_date, &request.end_date, rules, today)?;
    let currency = validate_code(&request.currency, 3, &rules.currencies, "Currency", "currency")?;
    let nationality = validate_code(
        &request.nationality,
        2,
        &rules.nationalities,
        "Nationality",
        "nationality",
    )?;

    let rooms = request
        .rooms
        .iter()
        .enumerate()
        .map(|(index, room)| validate_room(index, room, rules))
        .collect::<Result<Vec<_>, _>>()?;

    let search_type = request
        .search_type
        .as_deref()
        .map(str::parse::<SearchType>)
        .transpose()?;

    let language_code = request
        .language_code
        .unwrap_or_else(|| rules.default_language.clone());
    if !rules.languages.contains(&language_code) {
        return Err(TransformError::validation(
            "languageCode",
            format!("Invalid language: {}", language_code),
        ));
    }

    let options_quota = match request.options_quota.as_deref() {
        Some(raw) => parse_positive::<u32>(raw, "optionsQuota")?,
        None => rules.default_options_quota,
    };
    if options_quota > rules.max_options_quota {
        return Err(TransformError::validation(
            "optionsQuota",
            format!(
                "optionsQuota cannot be greater than {}",
                rules.max_options_quota
            ),
        ));
    }

    let timeout_milliseconds = request
        .timeout_milliseconds
        .as_deref()
        .map(|raw| parse_positive::<u64>(raw, "timeoutMilliseconds"))
        .transpose()?;

    Ok(AvailRequest {
        timeout_milliseconds,
        language_code,
        options_quota,
        credentials: request.credentials,
        search_type,
        start_date,
        end_date,
        currency,
        nationality,
        rooms,
    })
}

pub fn parse_date(value: &str, field: &str) -> Result<NaiveDate, TransformError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT).map_err(|_| {
        TransformError::validation(
            field,
            format!("'{}' is not a valid DD/MM/YYYY date", value),
        )
    })
}

fn validate_dates(
    start: &str,
    end: &str,
    rules: &ValidationRules,
    today: NaiveDate,
) -> Result<(NaiveDate, NaiveDate), TransformError> {
    let start_date = parse_date(start, "StartDate")?;
    let end_date = parse_date(end, "EndDate")?;

    if start_date > end_date {
        return Err(TransformError::validation(
            "EndDate",
            format!("EndDate {} precedes StartDate {}", end, start),
        ));
    }

    if let Some(lead_days) = rules.min_lead_days {
        // An earliest start beyond the calendar can never be met
        let earliest_start = u64::try_from(lead_days)
            .ok()
            .and_then(|days| today.checked_add_days(Days::new(days)));
        if earliest_start.map_or(true, |earliest| start_date < earliest) {
            return Err(TransformError::validation(
                "StartDate",
                format!("StartDate must be at least {} days from today", lead_days),
            ));
        }
    }

    if (end_date - start_date).num_days() < rules.min_stay_nights {
        return Err(TransformError::validation(
            "EndDate",
            format!(
                "Stay duration must be at least {} nights",
                rules.min_stay_nights
            ),
        ));
    }

    Ok((start_date, end_date))
}

// ISO shape check first, then the allow-list
fn validate_code(
    value: &str,
    len: usize,
    allowed: &[String],
    field: &str,
    label: &str,
) -> Result<String, TransformError> {
    let well_formed = value.len() == len && value.bytes().all(|b| b.is_ascii_uppercase());
    if !well_formed || !allowed.iter().any(|code| code == value) {
        return Err(TransformError::validation(
            field,
            format!("Invalid {}: {}", label, value),
        ));
    }
    Ok(value.to_string())
}

fn validate_room(
    index: usize,
    room: &ExtractedRoom,
    rules: &ValidationRules,
) -> Result<RoomRequest, TransformError> {
    let field = format!("Paxes[{}]", index + 1);

    let room = match room.declared_adults.as_deref() {
        Some(adults) => {
            let adults = parse_count(adults, &field, "adults")?;
            let children = match room.declared_children.as_deref() {
                Some(children) => parse_count(children, &field, "children")?,
                None => 0,
            };
            let child_ages = if room.pax_ages.is_empty() {
                None
            } else {
                Some(parse_ages(&room.pax_ages, &field)?)
            };
            RoomRequest {
                adults,
                children,
                child_ages,
            }
        }
        None if room.declared_children.is_some() => {
            return Err(TransformError::validation(
                field,
                "children declared without an adults count",
            ));
        }
        None => {
            let ages = parse_ages(&room.pax_ages, &field)?;
            let (child_ages, adult_ages): (Vec<u32>, Vec<u32>) = ages
                .into_iter()
                .partition(|age| *age <= rules.child_age_limit);
            RoomRequest {
                adults: adult_ages.len() as u32,
                children: child_ages.len() as u32,
                child_ages: Some(child_ages),
            }
        }
    };

    if room.children > rules.max_children_per_room {
        return Err(TransformError::validation(
            field,
            "Exceeded maximum allowed children per room",
        ));
    }
    let guests = room.adults.checked_add(room.children);
    if guests.map_or(true, |guests| guests > rules.max_guests_per_room) {
        return Err(TransformError::validation(
            field,
            "Exceeded maximum allowed guests per room",
        ));
    }
    if room.adults == 0 {
        let reason = if room.children > 0 {
            "A child must have at least one accompanying adult in the same room"
        } else {
            "Each room requires at least one adult"
        };
        return Err(TransformError::validation(field, reason));
    }
    if let Some(ages) = &room.child_ages {
        if ages.len() as u32 != room.children {
            return Err(TransformError::validation(
                field,
                format!(
                    "{} child ages supplied for {} children",
                    ages.len(),
                    room.children
                ),
            ));
        }
    }

    Ok(room)
}

fn parse_count(value: &str, field: &str, label: &str) -> Result<u32, TransformError> {
    value.parse::<u32>().map_err(|_| {
        TransformError::validation(
            field,
            format!("{} must be a non-negative integer, got '{}'", label, value),
        )
    })
}

fn parse_ages(values: &[String], field: &str) -> Result<Vec<u32>, TransformError> {
    values
        .iter()
        .map(|age| parse_count(age, field, "age"))
        .collect()
}

fn parse_positive<T>(value: &str, field: &str) -> Result<T, TransformError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    match value.parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(parsed),
        _ => Err(TransformError::validation(
            field,
            format!("{} must be a positive integer, got '{}'", field, value),
        )),
    }
}

// Parse stage: well-formedness check and deserialization of the AvailRQ document
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;
use serde::{Deserialize, Serialize};

use crate::error::TransformError;

pub const ROOT_ELEMENT: &str = "AvailRQ";

// Structures for XML deserialization
#[derive(Debug, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "AvailRQ")]
pub struct XmlAvailRequest {
    #[serde(rename = "timeoutMilliseconds")]
    pub timeout_milliseconds: Option<String>,
    #[serde(rename = "source")]
    pub source: Option<XmlSource>,
    #[serde(rename = "optionsQuota")]
    pub options_quota: Option<String>,
    pub configuration: Option<XmlConfiguration>,
    pub search_type: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub currency: Option<String>,
    pub nationality: Option<String>,
    #[serde(rename = "Paxes")]
    pub rooms: Vec<XmlPaxes>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct XmlSource {
    #[serde(rename = "languageCode")]
    pub language_code: Option<String>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlConfiguration {
    pub parameters: Option<XmlParameters>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlParameters {
    #[serde(rename = "Parameter")]
    pub parameters: Vec<XmlParameter>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct XmlParameter {
    #[serde(rename = "@password")]
    pub password: Option<String>,
    #[serde(rename = "@username")]
    pub username: Option<String>,
    #[serde(rename = "@CompanyID")]
    pub company_id: Option<String>,
}

// One <Paxes> element is one room
#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct XmlPaxes {
    #[serde(rename = "@adults")]
    pub adults: Option<String>,
    #[serde(rename = "@children")]
    pub children: Option<String>,
    #[serde(rename = "Pax")]
    pub paxes: Vec<XmlPax>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default)]
pub struct XmlPax {
    #[serde(rename = "@age")]
    pub age: Option<String>,
}

/// Parses an availability request document.
///
/// The document is first walked with the event reader so that unclosed tags,
/// mismatched end tags and a wrong root element surface as
/// [`TransformError::Parse`] before any field is read.
pub fn parse_avail_request(xml: &str) -> Result<XmlAvailRequest, TransformError> {
    check_document(xml)?;
    from_str(xml).map_err(|e| TransformError::Parse(e.to_string()))
}

fn check_document(xml: &str) -> Result<(), TransformError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut depth = 0usize;
    let mut root: Option<String> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                if depth == 0 {
                    record_root(&mut root, e.local_name().as_ref())?;
                }
                depth += 1;
            }
            Ok(Event::Empty(e)) if depth == 0 => {
                record_root(&mut root, e.local_name().as_ref())?;
            }
            Ok(Event::End(e)) => {
                if depth == 0 {
                    return Err(TransformError::Parse(format!(
                        "unexpected end tag </{}>",
                        String::from_utf8_lossy(e.local_name().as_ref())
                    )));
                }
                depth -= 1;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(TransformError::Parse(format!(
                    "error at position {}: {}",
                    reader.error_position(),
                    e
                )))
            }
            _ => (),
        }
    }

    if depth != 0 {
        return Err(TransformError::Parse(format!(
            "unexpected end of document, {} element(s) left open",
            depth
        )));
    }

    match root {
        None => Err(TransformError::Parse(
            "document has no root element".to_string(),
        )),
        Some(name) if name != ROOT_ELEMENT => Err(TransformError::Parse(format!(
            "expected root element <{}>, found <{}>",
            ROOT_ELEMENT, name
        ))),
        Some(_) => Ok(()),
    }
}

fn record_root(root: &mut Option<String>, name: &[u8]) -> Result<(), TransformError> {
    if root.is_some() {
        return Err(TransformError::Parse(
            "document has more than one root element".to_string(),
        ));
    }
    *root = Some(String::from_utf8_lossy(name).into_owned());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    const FULL_REQUEST: &str = r#"
<AvailRQ xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"
    xmlns:xsd="http://www.w3.org/2001/XMLSchema">
    <timeoutMilliseconds>25000</timeoutMilliseconds>
    <source>
        <languageCode>en</languageCode>
    </source>
    <optionsQuota>20</optionsQuota>
    <Configuration>
        <Parameters>
            <Parameter password="XXXXXXXXXX" username="YYYYYYYYY" CompanyID="123456"/>
        </Parameters>
    </Configuration>
    <SearchType>Multiple</SearchType>
    <StartDate>23/02/2025</StartDate>
    <EndDate>27/02/2025</EndDate>
    <Currency>USD</Currency>
    <Nationality>US</Nationality>
    <AvailDestinations>
        <Destination>New York</Destination>
    </AvailDestinations>
    <Paxes>
        <Pax age="4"/>
        <Pax age="30"/>
    </Paxes>
    <Paxes adults="2" children="1">
        <Pax age="7"/>
    </Paxes>
</AvailRQ>
"#;

    #[test]
    fn test_parse_full_request() {
        let request = parse_avail_request(FULL_REQUEST).unwrap();

        assert_eq!(request.timeout_milliseconds.as_deref(), Some("25000"));
        assert_eq!(
            request.source.unwrap().language_code.as_deref(),
            Some("en")
        );
        assert_eq!(request.options_quota.as_deref(), Some("20"));
        assert_eq!(request.search_type.as_deref(), Some("Multiple"));
        assert_eq!(request.start_date.as_deref(), Some("23/02/2025"));
        assert_eq!(request.end_date.as_deref(), Some("27/02/2025"));
        assert_eq!(request.currency.as_deref(), Some("USD"));
        assert_eq!(request.nationality.as_deref(), Some("US"));

        let parameters = request.configuration.unwrap().parameters.unwrap();
        assert_eq!(parameters.parameters.len(), 1);
        let parameter = &parameters.parameters[0];
        assert_eq!(parameter.password.as_deref(), Some("XXXXXXXXXX"));
        assert_eq!(parameter.username.as_deref(), Some("YYYYYYYYY"));
        assert_eq!(parameter.company_id.as_deref(), Some("123456"));

        assert_eq!(request.rooms.len(), 2);
        assert_eq!(request.rooms[0].paxes.len(), 2);
        assert_eq!(request.rooms[0].paxes[0].age.as_deref(), Some("4"));
        assert_eq!(request.rooms[0].adults, None);
        assert_eq!(request.rooms[1].adults.as_deref(), Some("2"));
        assert_eq!(request.rooms[1].children.as_deref(), Some("1"));
        assert_eq!(request.rooms[1].paxes[0].age.as_deref(), Some("7"));
    }

    #[test]
    fn test_absent_elements_stay_empty() {
        let request = parse_avail_request("<AvailRQ><Currency>GBP</Currency></AvailRQ>").unwrap();

        assert_eq!(request.currency.as_deref(), Some("GBP"));
        assert_eq!(request.start_date, None);
        assert_eq!(request.configuration, None);
        assert!(request.rooms.is_empty());
    }

    #[test_case("<AvailRQ><Currency>USD</Currency>"; "#1 unclosed root")]
    #[test_case("<AvailRQ><Currency>USD</Nationality></AvailRQ>"; "#2 mismatched end tag")]
    #[test_case(""; "#3 empty document")]
    #[test_case("<AvailRS></AvailRS>"; "#4 wrong root element")]
    #[test_case("<AvailRQ/><AvailRQ/>"; "#5 two root elements")]
    #[test_case("<AvailRQ><Currency>USD</Currency></AvailRQ></AvailRQ>"; "#6 stray end tag")]
    fn test_malformed_documents(xml: &str) {
        let result = parse_avail_request(xml);
        assert!(
            matches!(result, Err(TransformError::Parse(_))),
            "expected parse error, got {:?}",
            result
        );
    }
}

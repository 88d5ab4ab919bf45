//! Raw Airtable record envelope and shared field types.
//!
//! Every Airtable list/get response wraps table-specific fields in the same
//! `{ id, createdTime, fields }` envelope. Each table module defines its own
//! fields struct and converts the envelope into a domain model at the API
//! boundary, so the rest of the crate never sees raw Airtable shapes.

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One record as returned by the Airtable REST API.
///
/// Airtable omits the `fields` object entirely for records with no set
/// fields, so it defaults.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "F: serde::Deserialize<'de> + Default"))]
pub struct AirtableRecord<F> {
    pub id: String,
    #[serde(rename = "createdTime")]
    pub created_time: DateTime<Utc>,
    #[serde(default)]
    pub fields: F,
}

/// A page of records from a list endpoint. `offset` is present when more
/// pages remain.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "F: serde::Deserialize<'de> + Default"))]
pub struct RecordPage<F> {
    #[serde(default)]
    pub records: Vec<AirtableRecord<F>>,
    pub offset: Option<String>,
}

/// An Airtable attachment (image, video, audio file).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attachment {
    #[serde(default)]
    pub id: String,
    pub url: String,
    pub filename: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    pub size: Option<u64>,
}

/// Parse a date value from an Airtable field.
///
/// Airtable date fields come back either as full RFC 3339 timestamps or as
/// bare `YYYY-MM-DD` strings depending on the field's "include time"
/// setting. Anything unparseable is treated as absent.
pub fn parse_field_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Utc
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .single();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_field_date_rfc3339() {
        let parsed = parse_field_date("2024-03-15T10:30:00.000Z").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-15T10:30:00+00:00");
    }

    #[test]
    fn test_parse_field_date_date_only() {
        let parsed = parse_field_date("2024-03-15").unwrap();
        assert_eq!(parsed.format("%Y-%m-%d").to_string(), "2024-03-15");
    }

    #[test]
    fn test_parse_field_date_garbage() {
        assert!(parse_field_date("not a date").is_none());
        assert!(parse_field_date("").is_none());
    }

    #[test]
    fn test_record_missing_fields_defaults() {
        #[derive(Debug, Default, Deserialize)]
        struct Empty {}

        let json = r#"{"id": "rec123", "createdTime": "2024-01-01T00:00:00.000Z"}"#;
        let record: AirtableRecord<Empty> = serde_json::from_str(json).unwrap();
        assert_eq!(record.id, "rec123");
    }
}

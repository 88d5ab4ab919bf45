use serde::{Deserialize, Serialize};

use super::record::AirtableRecord;

/// A pull quote extracted from an interview or story.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quote {
    pub id: String,
    pub text: String,
    pub attribution: Option<String>,
    pub theme_id: Option<String>,
    pub media_id: Option<String>,
    pub story_id: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct QuoteFields {
    #[serde(rename = "Quote Text", default)]
    pub text: Option<String>,
    #[serde(rename = "Attribution", default)]
    pub attribution: Option<String>,
    #[serde(rename = "Theme", default)]
    pub themes: Vec<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<String>,
    #[serde(rename = "Story", default)]
    pub stories: Vec<String>,
}

impl From<AirtableRecord<QuoteFields>> for Quote {
    fn from(record: AirtableRecord<QuoteFields>) -> Self {
        let f = record.fields;
        Quote {
            id: record.id,
            text: f.text.unwrap_or_default(),
            attribution: f.attribution,
            theme_id: f.themes.into_iter().next(),
            media_id: f.media.into_iter().next(),
            story_id: f.stories.into_iter().next(),
        }
    }
}

/// Partial fields for creating or updating a quote.
#[derive(Debug, Default, Clone, Serialize)]
pub struct QuotePatch {
    #[serde(rename = "Quote Text", skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(rename = "Attribution", skip_serializing_if = "Option::is_none")]
    pub attribution: Option<String>,
    #[serde(rename = "Theme", skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    #[serde(rename = "Story", skip_serializing_if = "Option::is_none")]
    pub stories: Option<Vec<String>>,
}

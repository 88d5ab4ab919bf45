use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{AirtableRecord, Attachment};

/// Broad media categories used for filtering and gallery grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Interview,
    #[serde(other)]
    Other,
}

impl MediaKind {
    /// Parse the Airtable "Type" single-select leniently. Unknown or
    /// missing values become `Other`.
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            Some(v) => {
                let lower = v.to_lowercase();
                if lower.contains("image") || lower.contains("photo") {
                    MediaKind::Image
                } else if lower.contains("interview") {
                    MediaKind::Interview
                } else if lower.contains("video") {
                    MediaKind::Video
                } else {
                    MediaKind::Other
                }
            }
            None => MediaKind::Other,
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Image => write!(f, "Image"),
            MediaKind::Video => write!(f, "Video"),
            MediaKind::Interview => write!(f, "Interview"),
            MediaKind::Other => write!(f, "Other"),
        }
    }
}

/// A media item: a photo, video, or interview recording, usually linked to
/// one story and one or more storytellers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Media {
    pub id: String,
    pub file_name: String,
    pub kind: MediaKind,
    pub story_id: Option<String>,
    #[serde(default)]
    pub storyteller_ids: Vec<String>,
    #[serde(default)]
    pub theme_ids: Vec<String>,
    #[serde(default)]
    pub quote_ids: Vec<String>,
    pub location: Option<String>,
    pub shift_id: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct MediaFields {
    #[serde(rename = "File Name", default)]
    pub file_name: Option<String>,
    #[serde(rename = "Type", default)]
    pub kind: Option<String>,
    // Single-record link fields still arrive as arrays from Airtable.
    #[serde(rename = "Story", default)]
    pub stories: Vec<String>,
    #[serde(rename = "Storytellers", default)]
    pub storytellers: Vec<String>,
    #[serde(rename = "Themes", default)]
    pub themes: Vec<String>,
    #[serde(rename = "Quotes", default)]
    pub quotes: Vec<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Shift", default)]
    pub shifts: Vec<String>,
    #[serde(rename = "Attachments", default)]
    pub attachments: Vec<Attachment>,
}

impl From<AirtableRecord<MediaFields>> for Media {
    fn from(record: AirtableRecord<MediaFields>) -> Self {
        let f = record.fields;
        Media {
            id: record.id,
            file_name: f.file_name.unwrap_or_default(),
            kind: MediaKind::parse(f.kind.as_deref()),
            story_id: f.stories.into_iter().next(),
            storyteller_ids: f.storytellers,
            theme_ids: f.themes,
            quote_ids: f.quotes,
            location: f.location,
            shift_id: f.shifts.into_iter().next(),
            created_at: record.created_time,
            attachments: f.attachments,
        }
    }
}

/// Partial fields for creating or updating a media item.
#[derive(Debug, Default, Clone, Serialize)]
pub struct MediaPatch {
    #[serde(rename = "File Name", skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    #[serde(rename = "Type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(rename = "Story", skip_serializing_if = "Option::is_none")]
    pub stories: Option<Vec<String>>,
    #[serde(rename = "Storytellers", skip_serializing_if = "Option::is_none")]
    pub storytellers: Option<Vec<String>>,
    #[serde(rename = "Themes", skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(rename = "Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_kind_parse() {
        assert_eq!(MediaKind::parse(Some("Profile Image")), MediaKind::Image);
        assert_eq!(MediaKind::parse(Some("video")), MediaKind::Video);
        assert_eq!(MediaKind::parse(Some("Video Interview")), MediaKind::Interview);
        assert_eq!(MediaKind::parse(Some("something else")), MediaKind::Other);
        assert_eq!(MediaKind::parse(None), MediaKind::Other);
    }

    #[test]
    fn test_media_single_link_takes_first() {
        let json = r#"{
            "id": "recM1",
            "createdTime": "2024-01-10T08:00:00.000Z",
            "fields": {"File Name": "beach.jpg", "Story": ["recS1", "recS2"]}
        }"#;
        let record: AirtableRecord<MediaFields> = serde_json::from_str(json).unwrap();
        let m: Media = record.into();
        assert_eq!(m.story_id.as_deref(), Some("recS1"));
    }
}

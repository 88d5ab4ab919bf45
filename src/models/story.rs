use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::record::{parse_field_date, AirtableRecord};

/// A story from the archive.
///
/// Link fields hold record ids into other tables. Referential integrity is
/// not guaranteed by the base - a dangling id is filtered out by consumers,
/// never treated as an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Story {
    pub id: String,
    pub title: String,
    pub story_copy: Option<String>,
    pub transcript: Option<String>,
    pub created_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub theme_ids: Vec<String>,
    #[serde(default)]
    pub storyteller_ids: Vec<String>,
    #[serde(default)]
    pub media_ids: Vec<String>,
    #[serde(default)]
    pub tag_ids: Vec<String>,
    /// Location strings, rolled up from linked media by the base.
    #[serde(default)]
    pub locations: Vec<String>,
    pub project: Option<String>,
}

impl Story {
    /// The display body: the edited copy when present, otherwise the raw
    /// interview transcript.
    pub fn body(&self) -> Option<&str> {
        self.story_copy
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.transcript.as_deref().filter(|s| !s.trim().is_empty()))
    }

    /// Whether this story belongs to the configured flagship project.
    /// Matches the Project field against the configured name,
    /// case-insensitively.
    pub fn is_flagship(&self, flagship_project: &str) -> bool {
        self.project
            .as_deref()
            .map(|p| p.trim().eq_ignore_ascii_case(flagship_project.trim()))
            .unwrap_or(false)
    }

    /// The date used for timeline placement: publication date when set,
    /// otherwise record creation.
    pub fn display_date(&self) -> DateTime<Utc> {
        self.published_at.unwrap_or(self.created_at)
    }
}

// Raw Airtable field names for the Stories table.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StoryFields {
    #[serde(rename = "Title", default)]
    pub title: Option<String>,
    #[serde(rename = "Story copy", default)]
    pub story_copy: Option<String>,
    #[serde(rename = "Story Transcript", default)]
    pub transcript: Option<String>,
    #[serde(rename = "Publication date", default)]
    pub publication_date: Option<String>,
    #[serde(rename = "Themes", default)]
    pub themes: Vec<String>,
    #[serde(rename = "Storytellers", default)]
    pub storytellers: Vec<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<String>,
    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,
    #[serde(rename = "Location (from Media)", default)]
    pub locations: Vec<String>,
    #[serde(rename = "Project", default)]
    pub project: Option<String>,
}

impl From<AirtableRecord<StoryFields>> for Story {
    fn from(record: AirtableRecord<StoryFields>) -> Self {
        let f = record.fields;
        Story {
            id: record.id,
            title: f.title.unwrap_or_default(),
            story_copy: f.story_copy,
            transcript: f.transcript,
            created_at: record.created_time,
            published_at: f.publication_date.as_deref().and_then(parse_field_date),
            theme_ids: f.themes,
            storyteller_ids: f.storytellers,
            media_ids: f.media,
            tag_ids: f.tags,
            locations: f.locations,
            project: f.project,
        }
    }
}

/// Partial fields for creating or updating a story.
/// Only set fields are sent to the API.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StoryPatch {
    #[serde(rename = "Title", skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "Story copy", skip_serializing_if = "Option::is_none")]
    pub story_copy: Option<String>,
    #[serde(rename = "Story Transcript", skip_serializing_if = "Option::is_none")]
    pub transcript: Option<String>,
    #[serde(rename = "Publication date", skip_serializing_if = "Option::is_none")]
    pub publication_date: Option<String>,
    #[serde(rename = "Themes", skip_serializing_if = "Option::is_none")]
    pub themes: Option<Vec<String>>,
    #[serde(rename = "Storytellers", skip_serializing_if = "Option::is_none")]
    pub storytellers: Option<Vec<String>>,
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
    #[serde(rename = "Tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(rename = "Project", skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(copy: Option<&str>, transcript: Option<&str>) -> Story {
        Story {
            id: "rec1".to_string(),
            title: "A story".to_string(),
            story_copy: copy.map(String::from),
            transcript: transcript.map(String::from),
            created_at: Utc::now(),
            published_at: None,
            theme_ids: vec![],
            storyteller_ids: vec![],
            media_ids: vec![],
            tag_ids: vec![],
            locations: vec![],
            project: None,
        }
    }

    #[test]
    fn test_body_prefers_story_copy() {
        let s = story(Some("edited"), Some("raw"));
        assert_eq!(s.body(), Some("edited"));
    }

    #[test]
    fn test_body_falls_back_to_transcript() {
        let s = story(Some("   "), Some("raw"));
        assert_eq!(s.body(), Some("raw"));
        let s = story(None, None);
        assert_eq!(s.body(), None);
    }

    #[test]
    fn test_is_flagship_case_insensitive() {
        let mut s = story(None, None);
        s.project = Some("Orange Sky".to_string());
        assert!(s.is_flagship("orange sky"));
        assert!(!s.is_flagship("Other Project"));

        s.project = None;
        assert!(!s.is_flagship("orange sky"));
    }

    #[test]
    fn test_record_conversion_missing_links() {
        let json = r#"{
            "id": "recStory1",
            "createdTime": "2024-01-10T08:00:00.000Z",
            "fields": {"Title": "Hello", "Publication date": "2024-02-01"}
        }"#;
        let record: AirtableRecord<StoryFields> = serde_json::from_str(json).unwrap();
        let s: Story = record.into();
        assert_eq!(s.title, "Hello");
        assert!(s.theme_ids.is_empty());
        assert!(s.published_at.is_some());
    }
}

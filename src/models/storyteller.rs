use serde::{Deserialize, Serialize};

use super::record::{AirtableRecord, Attachment};

/// A storyteller: the person whose story and media the archive holds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Storyteller {
    pub id: String,
    pub name: String,
    pub project: Option<String>,
    pub location: Option<String>,
    pub role: Option<String>,
    pub summary: Option<String>,
    pub bio: Option<String>,
    #[serde(default)]
    pub media_ids: Vec<String>,
    #[serde(default)]
    pub profile_image: Vec<Attachment>,
}

impl Storyteller {
    /// URL of the first profile image attachment, if any.
    pub fn profile_image_url(&self) -> Option<&str> {
        self.profile_image.first().map(|a| a.url.as_str())
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct StorytellerFields {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Project", default)]
    pub project: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Role", default)]
    pub role: Option<String>,
    #[serde(rename = "Summary (from Media)", default)]
    pub summary: Option<String>,
    #[serde(rename = "Bio", default)]
    pub bio: Option<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<String>,
    #[serde(rename = "File Profile Image", default)]
    pub profile_image: Vec<Attachment>,
}

impl From<AirtableRecord<StorytellerFields>> for Storyteller {
    fn from(record: AirtableRecord<StorytellerFields>) -> Self {
        let f = record.fields;
        Storyteller {
            id: record.id,
            name: f.name.unwrap_or_default(),
            project: f.project,
            location: f.location,
            role: f.role,
            summary: f.summary,
            bio: f.bio,
            media_ids: f.media,
            profile_image: f.profile_image,
        }
    }
}

/// Partial fields for creating or updating a storyteller.
#[derive(Debug, Default, Clone, Serialize)]
pub struct StorytellerPatch {
    #[serde(rename = "Name", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "Project", skip_serializing_if = "Option::is_none")]
    pub project: Option<String>,
    #[serde(rename = "Location", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(rename = "Role", skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(rename = "Bio", skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(rename = "Media", skip_serializing_if = "Option::is_none")]
    pub media: Option<Vec<String>>,
}

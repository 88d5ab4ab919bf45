//! Small grouping tables: tags, shifts, and galleries.
//!
//! These carry just enough structure for filtering and grouping; they have
//! no detail pages of their own.

use serde::{Deserialize, Serialize};

use super::record::AirtableRecord;

/// A free-form tag applied to stories.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tag {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub story_ids: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct TagFields {
    #[serde(rename = "Tag Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Stories", default)]
    pub stories: Vec<String>,
}

impl From<AirtableRecord<TagFields>> for Tag {
    fn from(record: AirtableRecord<TagFields>) -> Self {
        let f = record.fields;
        Tag {
            id: record.id,
            name: f.name.unwrap_or_default(),
            story_ids: f.stories,
        }
    }
}

/// A service shift that media was captured on.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    pub id: String,
    pub name: String,
    pub location: Option<String>,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ShiftFields {
    #[serde(rename = "Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Location", default)]
    pub location: Option<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<String>,
}

impl From<AirtableRecord<ShiftFields>> for Shift {
    fn from(record: AirtableRecord<ShiftFields>) -> Self {
        let f = record.fields;
        Shift {
            id: record.id,
            name: f.name.unwrap_or_default(),
            location: f.location,
            media_ids: f.media,
        }
    }
}

/// A curated gallery of media items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Gallery {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub media_ids: Vec<String>,
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct GalleryFields {
    #[serde(rename = "Gallery Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Media", default)]
    pub media: Vec<String>,
}

impl From<AirtableRecord<GalleryFields>> for Gallery {
    fn from(record: AirtableRecord<GalleryFields>) -> Self {
        let f = record.fields;
        Gallery {
            id: record.id,
            name: f.name.unwrap_or_default(),
            description: f.description,
            media_ids: f.media,
        }
    }
}

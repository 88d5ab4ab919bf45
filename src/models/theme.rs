use serde::{Deserialize, Serialize};

use super::record::AirtableRecord;

/// A theme: a recurring topic that stories and quotes are tagged with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    #[serde(default)]
    pub story_ids: Vec<String>,
    #[serde(default)]
    pub quote_ids: Vec<String>,
}

impl Theme {
    pub fn story_count(&self) -> usize {
        self.story_ids.len()
    }

    pub fn quote_count(&self) -> usize {
        self.quote_ids.len()
    }
}

#[derive(Debug, Default, Clone, Deserialize)]
pub struct ThemeFields {
    #[serde(rename = "Theme Name", default)]
    pub name: Option<String>,
    #[serde(rename = "Description", default)]
    pub description: Option<String>,
    #[serde(rename = "Stories", default)]
    pub stories: Vec<String>,
    #[serde(rename = "Quotes", default)]
    pub quotes: Vec<String>,
}

impl From<AirtableRecord<ThemeFields>> for Theme {
    fn from(record: AirtableRecord<ThemeFields>) -> Self {
        let f = record.fields;
        Theme {
            id: record.id,
            name: f.name.unwrap_or_default(),
            description: f.description,
            story_ids: f.stories,
            quote_ids: f.quotes,
        }
    }
}

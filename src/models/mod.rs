//! Data models for Empathy Ledger entities.
//!
//! This module contains the typed records for every table in the Airtable
//! base:
//!
//! - `Story`: archive stories with theme/storyteller/media/tag links
//! - `Storyteller`: people whose stories are held in the archive
//! - `Media`, `MediaKind`: photos, videos, and interview recordings
//! - `Theme`, `Quote`: topical groupings and pull quotes
//! - `Tag`, `Shift`, `Gallery`: grouping tables used for filtering
//!
//! Each table module pairs a domain struct with a raw Airtable fields
//! struct; conversion happens once, at the API boundary, so dynamic
//! Airtable shapes never leak past `api`.

pub mod collections;
pub mod media;
pub mod quote;
pub mod record;
pub mod story;
pub mod storyteller;
pub mod theme;

pub use collections::{Gallery, GalleryFields, Shift, ShiftFields, Tag, TagFields};
pub use media::{Media, MediaFields, MediaKind, MediaPatch};
pub use quote::{Quote, QuoteFields, QuotePatch};
pub use record::{AirtableRecord, Attachment, RecordPage};
pub use story::{Story, StoryFields, StoryPatch};
pub use storyteller::{Storyteller, StorytellerFields, StorytellerPatch};
pub use theme::{Theme, ThemeFields};

/// The tables of the Empathy Ledger base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Stories,
    Storytellers,
    Media,
    Themes,
    Quotes,
    Tags,
    Shifts,
    Galleries,
}

impl Table {
    /// All tables, in the order `fetch_all` requests them.
    pub const ALL: [Table; 8] = [
        Table::Stories,
        Table::Storytellers,
        Table::Media,
        Table::Themes,
        Table::Quotes,
        Table::Tags,
        Table::Shifts,
        Table::Galleries,
    ];

    /// The table name as it appears in Airtable API paths.
    pub fn name(&self) -> &'static str {
        match self {
            Table::Stories => "Stories",
            Table::Storytellers => "Storytellers",
            Table::Media => "Media",
            Table::Themes => "Themes",
            Table::Quotes => "Quotes",
            Table::Tags => "Tags",
            Table::Shifts => "Shifts",
            Table::Galleries => "Galleries",
        }
    }

    /// The cache key for this table's full collection.
    pub fn cache_key(&self) -> String {
        format!("{}:all", self.name().to_lowercase())
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

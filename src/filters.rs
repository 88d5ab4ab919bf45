//! Filter state store: the user's active filter selection, persisted
//! across sessions.
//!
//! One mutable document per session. Every change is written through to
//! the storage port under a fixed key and restored on construction, so a
//! reload lands on the same filtered view. Persistence failures degrade to
//! in-memory state, never to errors.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::cache::StoragePort;
use crate::models::{MediaKind, Story};

/// Fixed storage key for the persisted filter selection.
const FILTER_STATE_KEY: &str = "empathy-ledger:filters";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateRange {
    pub fn is_empty(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    CreatedAt,
    PublishedAt,
    Title,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Descending,
    Ascending,
}

/// One filter dimension, for targeted resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    SearchTerm,
    Themes,
    Storytellers,
    Locations,
    Tags,
    MediaTypes,
    DateRange,
    Sort,
    FlagshipOnly,
}

/// The active filter selection. `Default` is the empty selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterState {
    pub search_term: String,
    pub themes: Vec<String>,
    pub storytellers: Vec<String>,
    pub locations: Vec<String>,
    pub tags: Vec<String>,
    pub media_types: Vec<MediaKind>,
    pub date_range: DateRange,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub flagship_only: bool,
}

impl FilterState {
    /// How many filter dimensions are non-default. Arrays and free text
    /// count 1 when non-empty, the date range and the flagship flag count
    /// at most 1 each; sort settings never count.
    pub fn active_count(&self) -> usize {
        let mut count = 0;
        if !self.search_term.trim().is_empty() {
            count += 1;
        }
        for non_empty in [
            !self.themes.is_empty(),
            !self.storytellers.is_empty(),
            !self.locations.is_empty(),
            !self.tags.is_empty(),
            !self.media_types.is_empty(),
        ] {
            if non_empty {
                count += 1;
            }
        }
        if !self.date_range.is_empty() {
            count += 1;
        }
        if self.flagship_only {
            count += 1;
        }
        count
    }

    /// Whether a story passes every active filter dimension.
    /// `flagship_project` is the configured flagship project name.
    pub fn matches_story(&self, story: &Story, flagship_project: &str) -> bool {
        let term = self.search_term.trim().to_lowercase();
        if !term.is_empty() {
            let in_title = story.title.to_lowercase().contains(&term);
            let in_body = story
                .body()
                .map(|b| b.to_lowercase().contains(&term))
                .unwrap_or(false);
            if !in_title && !in_body {
                return false;
            }
        }
        if !self.themes.is_empty() && !story.theme_ids.iter().any(|id| self.themes.contains(id)) {
            return false;
        }
        if !self.storytellers.is_empty()
            && !story
                .storyteller_ids
                .iter()
                .any(|id| self.storytellers.contains(id))
        {
            return false;
        }
        if !self.locations.is_empty()
            && !story.locations.iter().any(|l| self.locations.contains(l))
        {
            return false;
        }
        if !self.tags.is_empty() && !story.tag_ids.iter().any(|id| self.tags.contains(id)) {
            return false;
        }
        if !self.date_range.is_empty() && !self.date_range.contains(story.display_date()) {
            return false;
        }
        if self.flagship_only && !story.is_flagship(flagship_project) {
            return false;
        }
        true
    }
}

/// A partial update: only set fields are applied.
#[derive(Debug, Clone, Default)]
pub struct FilterPatch {
    pub search_term: Option<String>,
    pub themes: Option<Vec<String>>,
    pub storytellers: Option<Vec<String>>,
    pub locations: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
    pub media_types: Option<Vec<MediaKind>>,
    pub date_range: Option<DateRange>,
    pub sort_field: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
    pub flagship_only: Option<bool>,
}

/// Holds the session's filter selection and persists it on every change.
pub struct FilterStore {
    state: Mutex<FilterState>,
    storage: Arc<dyn StoragePort>,
}

impl FilterStore {
    /// Restore the persisted selection, or start from defaults when
    /// nothing valid is stored.
    pub fn new(storage: Arc<dyn StoragePort>) -> Self {
        let state = match storage.get(FILTER_STATE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(state) => state,
                Err(e) => {
                    warn!(error = %e, "Corrupt persisted filter state, starting fresh");
                    let _ = storage.remove(FILTER_STATE_KEY);
                    FilterState::default()
                }
            },
            Ok(None) => FilterState::default(),
            Err(e) => {
                warn!(error = %e, "Could not read persisted filter state");
                FilterState::default()
            }
        };

        Self {
            state: Mutex::new(state),
            storage,
        }
    }

    pub fn snapshot(&self) -> FilterState {
        self.state.lock().unwrap().clone()
    }

    pub fn active_count(&self) -> usize {
        self.state.lock().unwrap().active_count()
    }

    /// Replace the whole selection.
    pub fn set(&self, new_state: FilterState) {
        let mut state = self.state.lock().unwrap();
        *state = new_state;
        self.persist(&state);
    }

    /// Apply a partial update (one or several fields at once).
    pub fn apply(&self, patch: FilterPatch) {
        let mut state = self.state.lock().unwrap();
        if let Some(v) = patch.search_term {
            state.search_term = v;
        }
        if let Some(v) = patch.themes {
            state.themes = v;
        }
        if let Some(v) = patch.storytellers {
            state.storytellers = v;
        }
        if let Some(v) = patch.locations {
            state.locations = v;
        }
        if let Some(v) = patch.tags {
            state.tags = v;
        }
        if let Some(v) = patch.media_types {
            state.media_types = v;
        }
        if let Some(v) = patch.date_range {
            state.date_range = v;
        }
        if let Some(v) = patch.sort_field {
            state.sort_field = v;
        }
        if let Some(v) = patch.sort_direction {
            state.sort_direction = v;
        }
        if let Some(v) = patch.flagship_only {
            state.flagship_only = v;
        }
        self.persist(&state);
    }

    /// Reset one dimension to its default.
    pub fn reset_field(&self, field: FilterField) {
        let mut state = self.state.lock().unwrap();
        match field {
            FilterField::SearchTerm => state.search_term.clear(),
            FilterField::Themes => state.themes.clear(),
            FilterField::Storytellers => state.storytellers.clear(),
            FilterField::Locations => state.locations.clear(),
            FilterField::Tags => state.tags.clear(),
            FilterField::MediaTypes => state.media_types.clear(),
            FilterField::DateRange => state.date_range = DateRange::default(),
            FilterField::Sort => {
                state.sort_field = SortField::default();
                state.sort_direction = SortDirection::default();
            }
            FilterField::FlagshipOnly => state.flagship_only = false,
        }
        self.persist(&state);
    }

    pub fn reset_all(&self) {
        let mut state = self.state.lock().unwrap();
        *state = FilterState::default();
        self.persist(&state);
    }

    fn persist(&self, state: &FilterState) {
        let raw = match serde_json::to_string(state) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Failed to serialize filter state");
                return;
            }
        };
        if let Err(e) = self.storage.set(FILTER_STATE_KEY, &raw) {
            warn!(error = %e, "Failed to persist filter state");
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use crate::cache::MemoryStorage;

    use super::*;

    #[test]
    fn test_active_count_themes_plus_flagship() {
        let state = FilterState {
            themes: vec!["t1".to_string()],
            flagship_only: true,
            ..Default::default()
        };
        assert_eq!(state.active_count(), 2);
    }

    #[test]
    fn test_active_count_ignores_sort() {
        let state = FilterState {
            sort_field: SortField::Title,
            sort_direction: SortDirection::Ascending,
            ..Default::default()
        };
        assert_eq!(state.active_count(), 0);
    }

    #[test]
    fn test_date_range_counts_once() {
        let state = FilterState {
            date_range: DateRange {
                start: Some(Utc::now() - Duration::days(30)),
                end: Some(Utc::now()),
            },
            ..Default::default()
        };
        assert_eq!(state.active_count(), 1);
    }

    #[test]
    fn test_apply_persists_and_restores() {
        let storage = Arc::new(MemoryStorage::new());
        let store = FilterStore::new(storage.clone());
        store.apply(FilterPatch {
            search_term: Some("kindness".to_string()),
            themes: Some(vec!["recT1".to_string()]),
            date_range: Some(DateRange {
                start: Some(Utc::now() - Duration::days(7)),
                end: None,
            }),
            ..Default::default()
        });

        // A second store over the same storage restores the selection,
        // dates included.
        let restored = FilterStore::new(storage);
        let state = restored.snapshot();
        assert_eq!(state.search_term, "kindness");
        assert_eq!(state.themes, vec!["recT1".to_string()]);
        assert!(state.date_range.start.is_some());
    }

    #[test]
    fn test_corrupt_persisted_state_degrades_to_default() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set(FILTER_STATE_KEY, "{{{ not json").unwrap();
        let store = FilterStore::new(storage.clone());
        assert_eq!(store.snapshot(), FilterState::default());
        assert_eq!(storage.get(FILTER_STATE_KEY).unwrap(), None);
    }

    #[test]
    fn test_reset_field_and_all() {
        let store = FilterStore::new(Arc::new(MemoryStorage::new()));
        store.apply(FilterPatch {
            themes: Some(vec!["t1".to_string()]),
            flagship_only: Some(true),
            ..Default::default()
        });
        assert_eq!(store.active_count(), 2);

        store.reset_field(FilterField::Themes);
        assert_eq!(store.active_count(), 1);

        store.reset_all();
        assert_eq!(store.active_count(), 0);
    }

    #[test]
    fn test_matches_story_flagship_and_search() {
        let story = Story {
            id: "rec1".to_string(),
            title: "A quiet morning".to_string(),
            story_copy: Some("Coffee and conversation".to_string()),
            transcript: None,
            created_at: Utc::now(),
            published_at: None,
            theme_ids: vec!["t1".to_string()],
            storyteller_ids: vec![],
            media_ids: vec![],
            tag_ids: vec![],
            locations: vec![],
            project: Some("Orange Sky".to_string()),
        };

        let mut state = FilterState {
            search_term: "conversation".to_string(),
            flagship_only: true,
            ..Default::default()
        };
        assert!(state.matches_story(&story, "Orange Sky"));

        state.search_term = "absent words".to_string();
        assert!(!state.matches_story(&story, "Orange Sky"));

        state.search_term.clear();
        state.themes = vec!["t2".to_string()];
        assert!(!state.matches_story(&story, "Orange Sky"));
    }
}

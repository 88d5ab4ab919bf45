//! Contextual filter suggestions.
//!
//! Given the full dataset, the active filter selection, and optionally the
//! current page path, produce a ranked list of filter refinements. Each
//! suggestion carries a relevance score in [0, 1]; a suggestion whose exact
//! value is already active for that filter kind is suppressed.

use chrono::{Duration, Utc};

use crate::data::ArchiveSnapshot;
use crate::filters::FilterState;
use crate::models::{MediaKind, Storyteller, Theme};

use super::recommendations::related_themes;

// Relevance weights per suggestion family. Fixed constants, not tuned
// values; path-contextual suggestions outrank the generic ones.
const CONTEXTUAL_THEME_RELEVANCE: f64 = 0.95;
const POPULAR_THEME_RELEVANCE: f64 = 0.9;
const ACTIVE_STORYTELLER_RELEVANCE: f64 = 0.8;
const COMPLEMENTARY_RELEVANCE: f64 = 0.7;
const TOP_LOCATION_RELEVANCE: f64 = 0.6;
const RECENT_RANGE_RELEVANCE: f64 = 0.55;
const DOMINANT_MEDIA_RELEVANCE: f64 = 0.5;

/// How many suggestions each family contributes before ranking.
const PER_FAMILY_LIMIT: usize = 3;

/// A media type must pass this count to be suggested as dominant.
const DOMINANT_MEDIA_MIN_COUNT: usize = 5;

/// Window for "recent" activity.
const RECENT_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuggestionKind {
    Theme,
    Storyteller,
    Location,
    MediaType,
    DateRange,
}

#[derive(Debug, Clone)]
pub struct FilterSuggestion {
    pub kind: SuggestionKind,
    /// The filter value to apply: a record id for themes/storytellers, a
    /// location string, a media type name, or a named range.
    pub value: String,
    pub label: String,
    pub reason: String,
    pub relevance: f64,
}

/// Produce up to `limit` ranked filter suggestions.
pub fn suggest_filters(
    snapshot: &ArchiveSnapshot,
    filters: &FilterState,
    current_path: Option<&str>,
    limit: usize,
) -> Vec<FilterSuggestion> {
    let mut suggestions = Vec::new();

    contextual_themes(snapshot, current_path, &mut suggestions);
    popular_themes(snapshot, &mut suggestions);
    active_storytellers(snapshot, &mut suggestions);
    complementary(snapshot, filters, &mut suggestions);
    top_location(snapshot, &mut suggestions);
    recent_range(snapshot, &mut suggestions);
    dominant_media_type(snapshot, &mut suggestions);

    // Suppress anything already active with the exact same value, then
    // dedupe by (kind, value) keeping the highest relevance.
    suggestions.retain(|s| !is_already_active(s, filters));
    let mut ranked: Vec<FilterSuggestion> = Vec::new();
    for s in suggestions {
        match ranked
            .iter_mut()
            .find(|r| r.kind == s.kind && r.value == s.value)
        {
            Some(existing) => {
                if s.relevance > existing.relevance {
                    *existing = s;
                }
            }
            None => ranked.push(s),
        }
    }

    ranked.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
    ranked.truncate(limit);
    ranked
}

fn is_already_active(suggestion: &FilterSuggestion, filters: &FilterState) -> bool {
    match suggestion.kind {
        SuggestionKind::Theme => filters.themes.contains(&suggestion.value),
        SuggestionKind::Storyteller => filters.storytellers.contains(&suggestion.value),
        SuggestionKind::Location => filters.locations.contains(&suggestion.value),
        SuggestionKind::MediaType => filters
            .media_types
            .iter()
            .any(|k| k.to_string().eq_ignore_ascii_case(&suggestion.value)),
        // The range suggestion is "last 30 days"; it is redundant only when
        // the active range already starts at the same day.
        SuggestionKind::DateRange => filters
            .date_range
            .start
            .map(|start| start.date_naive() == (Utc::now() - Duration::days(RECENT_DAYS)).date_naive())
            .unwrap_or(false),
    }
}

fn clamp(relevance: f64) -> f64 {
    relevance.clamp(0.0, 1.0)
}

fn theme_suggestion(theme: &Theme, relevance: f64, reason: String) -> FilterSuggestion {
    FilterSuggestion {
        kind: SuggestionKind::Theme,
        value: theme.id.clone(),
        label: theme.name.clone(),
        reason,
        relevance: clamp(relevance),
    }
}

fn storyteller_suggestion(
    storyteller: &Storyteller,
    relevance: f64,
    reason: String,
) -> FilterSuggestion {
    FilterSuggestion {
        kind: SuggestionKind::Storyteller,
        value: storyteller.id.clone(),
        label: storyteller.name.clone(),
        reason,
        relevance: clamp(relevance),
    }
}

/// On a theme page, suggest the themes that co-occur with the one being
/// viewed.
fn contextual_themes(
    snapshot: &ArchiveSnapshot,
    current_path: Option<&str>,
    out: &mut Vec<FilterSuggestion>,
) {
    let Some(path) = current_path else { return };
    let Some(theme_id) = path
        .strip_prefix("/themes/")
        .map(|rest| rest.split('/').next().unwrap_or(rest))
        .filter(|id| !id.is_empty())
    else {
        return;
    };
    let Some(theme) = snapshot.theme(theme_id) else {
        return;
    };

    for related in related_themes(theme, &snapshot.stories, &snapshot.themes)
        .iter()
        .take(PER_FAMILY_LIMIT)
    {
        out.push(theme_suggestion(
            related,
            CONTEXTUAL_THEME_RELEVANCE,
            format!("Often appears alongside {}", theme.name),
        ));
    }
}

/// The themes with the most stories across the whole archive.
fn popular_themes(snapshot: &ArchiveSnapshot, out: &mut Vec<FilterSuggestion>) {
    let counts: Vec<(usize, &Theme)> = snapshot
        .themes
        .iter()
        .map(|t| {
            let count = snapshot
                .stories
                .iter()
                .filter(|s| s.theme_ids.iter().any(|id| id == &t.id))
                .count();
            (count, t)
        })
        .collect();
    let max = counts.iter().map(|(c, _)| *c).max().unwrap_or(0);
    if max == 0 {
        return;
    }

    let mut counts = counts;
    counts.sort_by(|a, b| b.0.cmp(&a.0));
    for (count, theme) in counts.into_iter().take(PER_FAMILY_LIMIT) {
        if count == 0 {
            break;
        }
        out.push(theme_suggestion(
            theme,
            POPULAR_THEME_RELEVANCE * count as f64 / max as f64,
            format!("Appears in {} stories", count),
        ));
    }
}

/// Storytellers whose stories landed within the last 30 days.
fn active_storytellers(snapshot: &ArchiveSnapshot, out: &mut Vec<FilterSuggestion>) {
    let cutoff = Utc::now() - Duration::days(RECENT_DAYS);
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for story in snapshot.stories.iter().filter(|s| s.display_date() >= cutoff) {
        for id in story.storyteller_ids.iter().map(String::as_str) {
            match counts.iter_mut().find(|(c, _)| *c == id) {
                Some((_, n)) => *n += 1,
                None => counts.push((id, 1)),
            }
        }
    }
    if counts.is_empty() {
        return;
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    let max = counts[0].1;
    for (id, count) in counts.into_iter().take(PER_FAMILY_LIMIT) {
        // Dangling storyteller ids contribute nothing
        if let Some(storyteller) = snapshot.storyteller(id) {
            out.push(storyteller_suggestion(
                storyteller,
                ACTIVE_STORYTELLER_RELEVANCE * count as f64 / max as f64,
                "Shared a story in the last 30 days".to_string(),
            ));
        }
    }
}

/// Cross-suggestions: selected themes suggest the storytellers working
/// within them, and selected storytellers suggest their themes.
fn complementary(
    snapshot: &ArchiveSnapshot,
    filters: &FilterState,
    out: &mut Vec<FilterSuggestion>,
) {
    if !filters.themes.is_empty() {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for story in snapshot
            .stories
            .iter()
            .filter(|s| s.theme_ids.iter().any(|id| filters.themes.contains(id)))
        {
            for id in story.storyteller_ids.iter().map(String::as_str) {
                match counts.iter_mut().find(|(c, _)| *c == id) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((id, 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        for (id, _) in counts.into_iter().take(PER_FAMILY_LIMIT) {
            if let Some(storyteller) = snapshot.storyteller(id) {
                out.push(storyteller_suggestion(
                    storyteller,
                    COMPLEMENTARY_RELEVANCE,
                    "Tells stories within your selected themes".to_string(),
                ));
            }
        }
    }

    if !filters.storytellers.is_empty() {
        let mut counts: Vec<(&str, usize)> = Vec::new();
        for story in snapshot.stories.iter().filter(|s| {
            s.storyteller_ids
                .iter()
                .any(|id| filters.storytellers.contains(id))
        }) {
            for id in story.theme_ids.iter().map(String::as_str) {
                match counts.iter_mut().find(|(c, _)| *c == id) {
                    Some((_, n)) => *n += 1,
                    None => counts.push((id, 1)),
                }
            }
        }
        counts.sort_by(|a, b| b.1.cmp(&a.1));
        for (id, _) in counts.into_iter().take(PER_FAMILY_LIMIT) {
            if let Some(theme) = snapshot.theme(id) {
                out.push(theme_suggestion(
                    theme,
                    COMPLEMENTARY_RELEVANCE,
                    "Theme of your selected storytellers".to_string(),
                ));
            }
        }
    }
}

/// The single most common story location.
fn top_location(snapshot: &ArchiveSnapshot, out: &mut Vec<FilterSuggestion>) {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for location in snapshot
        .stories
        .iter()
        .flat_map(|s| s.locations.iter().map(String::as_str))
    {
        match counts.iter_mut().find(|(c, _)| *c == location) {
            Some((_, n)) => *n += 1,
            None => counts.push((location, 1)),
        }
    }
    let Some((location, count)) = counts.into_iter().max_by_key(|(_, n)| *n) else {
        return;
    };

    out.push(FilterSuggestion {
        kind: SuggestionKind::Location,
        value: location.to_string(),
        label: location.to_string(),
        reason: format!("{} stories from this location", count),
        relevance: TOP_LOCATION_RELEVANCE,
    });
}

/// Suggest the last-30-days range when any stories fall inside it.
fn recent_range(snapshot: &ArchiveSnapshot, out: &mut Vec<FilterSuggestion>) {
    let cutoff = Utc::now() - Duration::days(RECENT_DAYS);
    let recent = snapshot
        .stories
        .iter()
        .filter(|s| s.display_date() >= cutoff)
        .count();
    if recent == 0 {
        return;
    }

    out.push(FilterSuggestion {
        kind: SuggestionKind::DateRange,
        value: "last-30-days".to_string(),
        label: "Last 30 days".to_string(),
        reason: format!("{} stories shared recently", recent),
        relevance: RECENT_RANGE_RELEVANCE,
    });
}

/// Suggest the dominant media type once it clearly dominates.
fn dominant_media_type(snapshot: &ArchiveSnapshot, out: &mut Vec<FilterSuggestion>) {
    let mut counts: Vec<(MediaKind, usize)> = Vec::new();
    for media in &snapshot.media {
        match counts.iter_mut().find(|(k, _)| *k == media.kind) {
            Some((_, n)) => *n += 1,
            None => counts.push((media.kind, 1)),
        }
    }
    let Some((kind, count)) = counts.into_iter().max_by_key(|(_, n)| *n) else {
        return;
    };
    if count <= DOMINANT_MEDIA_MIN_COUNT {
        return;
    }

    out.push(FilterSuggestion {
        kind: SuggestionKind::MediaType,
        value: kind.to_string().to_lowercase(),
        label: format!("{} media", kind),
        reason: format!("{} items of this type", count),
        relevance: DOMINANT_MEDIA_RELEVANCE,
    });
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::{Story, Theme};

    use super::*;

    fn story(id: &str, themes: &[&str], storytellers: &[&str]) -> Story {
        Story {
            id: id.to_string(),
            title: format!("Story {}", id),
            story_copy: None,
            transcript: None,
            created_at: Utc::now(),
            published_at: None,
            theme_ids: themes.iter().map(|s| s.to_string()).collect(),
            storyteller_ids: storytellers.iter().map(|s| s.to_string()).collect(),
            media_ids: vec![],
            tag_ids: vec![],
            locations: vec![],
            project: None,
        }
    }

    fn theme(id: &str, name: &str) -> Theme {
        Theme {
            id: id.to_string(),
            name: name.to_string(),
            description: None,
            story_ids: vec![],
            quote_ids: vec![],
        }
    }

    fn snapshot() -> ArchiveSnapshot {
        // t1 appears in three stories, t2 in two, so popularity ranks t1
        // strictly ahead.
        ArchiveSnapshot {
            stories: vec![
                story("s1", &["t1", "t2"], &["p1"]),
                story("s2", &["t1"], &["p1"]),
                story("s3", &["t2"], &["p2"]),
                story("s4", &["t1"], &[]),
            ],
            themes: vec![theme("t1", "Belonging"), theme("t2", "Home")],
            storytellers: vec![],
            media: vec![],
            quotes: vec![],
            tags: vec![],
            shifts: vec![],
            galleries: vec![],
        }
    }

    #[test]
    fn test_popular_themes_ranked_by_story_count() {
        let suggestions = suggest_filters(&snapshot(), &FilterState::default(), None, 10);
        let themes: Vec<&FilterSuggestion> = suggestions
            .iter()
            .filter(|s| s.kind == SuggestionKind::Theme)
            .collect();
        assert!(!themes.is_empty());
        assert_eq!(themes[0].value, "t1");
        assert!(themes[0].relevance > themes[1].relevance);
    }

    #[test]
    fn test_active_theme_value_suppressed() {
        let filters = FilterState {
            themes: vec!["t1".to_string()],
            ..Default::default()
        };
        let suggestions = suggest_filters(&snapshot(), &filters, None, 10);
        assert!(suggestions
            .iter()
            .all(|s| !(s.kind == SuggestionKind::Theme && s.value == "t1")));
        // The other theme is still allowed: non-empty is not suppression
        assert!(suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::Theme && s.value == "t2"));
    }

    #[test]
    fn test_relevance_bounds_and_order() {
        let suggestions = suggest_filters(&snapshot(), &FilterState::default(), None, 10);
        assert!(suggestions
            .iter()
            .all(|s| (0.0..=1.0).contains(&s.relevance)));
        assert!(suggestions
            .windows(2)
            .all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn test_limit_truncates() {
        let suggestions = suggest_filters(&snapshot(), &FilterState::default(), None, 2);
        assert!(suggestions.len() <= 2);
    }

    #[test]
    fn test_contextual_theme_page() {
        let suggestions = suggest_filters(
            &snapshot(),
            &FilterState::default(),
            Some("/themes/t1"),
            10,
        );
        // t2 co-occurs with t1 in s1, so it leads with contextual relevance
        assert_eq!(suggestions[0].kind, SuggestionKind::Theme);
        assert_eq!(suggestions[0].value, "t2");
        assert!((suggestions[0].relevance - CONTEXTUAL_THEME_RELEVANCE).abs() < 1e-9);
    }

    #[test]
    fn test_empty_snapshot_is_empty() {
        let suggestions =
            suggest_filters(&ArchiveSnapshot::default(), &FilterState::default(), None, 10);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_complementary_storytellers_from_selected_themes() {
        let mut snap = snapshot();
        snap.storytellers = vec![Storyteller {
            id: "p1".to_string(),
            name: "Avery".to_string(),
            project: None,
            location: None,
            role: None,
            summary: None,
            bio: None,
            media_ids: vec![],
            profile_image: vec![],
        }];
        let filters = FilterState {
            themes: vec!["t1".to_string()],
            ..Default::default()
        };
        let suggestions = suggest_filters(&snap, &filters, None, 10);
        assert!(suggestions
            .iter()
            .any(|s| s.kind == SuggestionKind::Storyteller && s.value == "p1"));
    }
}

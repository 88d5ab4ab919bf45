//! Related-content recommendations by shared links.
//!
//! Pure functions over fetched collections. Scoring is deliberately
//! simple: shared link counts, stable-sorted so ties keep the source
//! collection's order. Dangling ids contribute nothing.

use crate::models::{Media, Story, Storyteller, Theme};

/// Cap on every recommendation list.
const MAX_RECOMMENDATIONS: usize = 5;

fn shared_count(a: &[String], b: &[String]) -> usize {
    a.iter().filter(|id| b.contains(id)).count()
}

/// Stories related to `target`: every other story scored by
/// `shared themes + shared storytellers`, zero scores dropped, top 5.
pub fn related_stories(target: &Story, stories: &[Story]) -> Vec<Story> {
    let mut scored: Vec<(usize, &Story)> = stories
        .iter()
        .filter(|s| s.id != target.id)
        .map(|s| {
            let score = shared_count(&target.theme_ids, &s.theme_ids)
                + shared_count(&target.storyteller_ids, &s.storyteller_ids);
            (score, s)
        })
        .filter(|(score, _)| *score > 0)
        .collect();

    // Stable sort: ties keep collection order.
    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored
        .into_iter()
        .take(MAX_RECOMMENDATIONS)
        .map(|(_, s)| s.clone())
        .collect()
}

/// Tally `ids` into `counts`, preserving first-seen order so the final
/// sort breaks count ties deterministically.
fn tally<'a>(counts: &mut Vec<(&'a str, usize)>, ids: impl Iterator<Item = &'a str>) {
    for id in ids {
        match counts.iter_mut().find(|(c, _)| *c == id) {
            Some((_, n)) => *n += 1,
            None => counts.push((id, 1)),
        }
    }
}

/// Themes that co-occur with `target` across the story collection.
/// Ids not present in the theme table are dropped, never errored.
pub fn related_themes(target: &Theme, stories: &[Story], themes: &[Theme]) -> Vec<Theme> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for story in stories.iter().filter(|s| s.theme_ids.iter().any(|id| id == &target.id)) {
        tally(
            &mut counts,
            story
                .theme_ids
                .iter()
                .map(String::as_str)
                .filter(|id| *id != target.id),
        );
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .filter_map(|(id, _)| themes.iter().find(|t| t.id == id).cloned())
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

/// Storytellers who appear on stories alongside `target`.
pub fn related_storytellers(
    target: &Storyteller,
    stories: &[Story],
    storytellers: &[Storyteller],
) -> Vec<Storyteller> {
    let mut counts: Vec<(&str, usize)> = Vec::new();
    for story in stories
        .iter()
        .filter(|s| s.storyteller_ids.iter().any(|id| id == &target.id))
    {
        tally(
            &mut counts,
            story
                .storyteller_ids
                .iter()
                .map(String::as_str)
                .filter(|id| *id != target.id),
        );
    }

    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
        .into_iter()
        .filter_map(|(id, _)| storytellers.iter().find(|s| s.id == id).cloned())
        .take(MAX_RECOMMENDATIONS)
        .collect()
}

/// Other media items from the same story as `target`. Empty when the item
/// has no linked story.
pub fn related_media(target: &Media, media: &[Media]) -> Vec<Media> {
    let Some(ref story_id) = target.story_id else {
        return Vec::new();
    };
    media
        .iter()
        .filter(|m| m.id != target.id && m.story_id.as_ref() == Some(story_id))
        .take(MAX_RECOMMENDATIONS)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::MediaKind;

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

    #[test]
    fn test_related_stories_scores_shared_links() {
        // A shares one theme and one storyteller with B: score 2.
        let a = story("A", &["T1", "T2"], &["S1"]);
        let b = story("B", &["T1"], &["S1"]);
        let c = story("C", &["T9"], &["S9"]);
        let all = vec![a.clone(), b.clone(), c];

        let recs = related_stories(&a, &all);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "B");
    }

    #[test]
    fn test_related_stories_never_includes_target() {
        let a = story("A", &["T1"], &[]);
        let all = vec![a.clone(), a.clone()];
        // Even a duplicate-id record is excluded by id
        assert!(related_stories(&a, &all).is_empty());
    }

    #[test]
    fn test_related_stories_truncates_to_five() {
        let target = story("A", &["T1"], &[]);
        let mut all = vec![target.clone()];
        for i in 0..8 {
            all.push(story(&format!("B{}", i), &["T1"], &[]));
        }
        let recs = related_stories(&target, &all);
        assert_eq!(recs.len(), 5);
        // Ties keep collection order
        assert_eq!(recs[0].id, "B0");
    }

    #[test]
    fn test_related_themes_cooccurrence() {
        // Two stories link the seed theme and both carry t9; t9 must rank
        // above the once-seen t2.
        let seed = theme("t1", "Belonging");
        let stories = vec![
            story("A", &["t1", "t9", "t2"], &[]),
            story("B", &["t1", "t9"], &[]),
            story("C", &["t9"], &[]),
        ];
        let themes = vec![seed.clone(), theme("t2", "Home"), theme("t9", "Dignity")];

        let recs = related_themes(&seed, &stories, &themes);
        assert_eq!(recs[0].id, "t9");
        assert_eq!(recs[1].id, "t2");
        // Never the seed itself
        assert!(recs.iter().all(|t| t.id != "t1"));
    }

    #[test]
    fn test_related_themes_drops_dangling_ids() {
        let seed = theme("t1", "Belonging");
        let stories = vec![story("A", &["t1", "tMissing"], &[])];
        let themes = vec![seed.clone()];
        assert!(related_themes(&seed, &stories, &themes).is_empty());
    }

    #[test]
    fn test_related_storytellers() {
        let target = Storyteller {
            id: "s1".to_string(),
            name: "Avery".to_string(),
            project: None,
            location: None,
            role: None,
            summary: None,
            bio: None,
            media_ids: vec![],
            profile_image: vec![],
        };
        let mut other = target.clone();
        other.id = "s2".to_string();
        other.name = "Sam".to_string();

        let stories = vec![
            story("A", &[], &["s1", "s2"]),
            story("B", &[], &["s1", "s2"]),
        ];
        let recs = related_storytellers(&target, &stories, &[target.clone(), other]);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "s2");
    }

    fn media(id: &str, story_id: Option<&str>) -> Media {
        Media {
            id: id.to_string(),
            file_name: format!("{}.jpg", id),
            kind: MediaKind::Image,
            story_id: story_id.map(String::from),
            storyteller_ids: vec![],
            theme_ids: vec![],
            quote_ids: vec![],
            location: None,
            shift_id: None,
            created_at: Utc::now(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_related_media_same_story() {
        let target = media("m1", Some("recS"));
        let all = vec![
            target.clone(),
            media("m2", Some("recS")),
            media("m3", Some("other")),
            media("m4", None),
        ];
        let recs = related_media(&target, &all);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].id, "m2");
    }

    #[test]
    fn test_related_media_no_story_is_empty() {
        let target = media("m1", None);
        let all = vec![target.clone(), media("m2", None)];
        assert!(related_media(&target, &all).is_empty());
    }

    #[test]
    fn test_empty_inputs_produce_empty_outputs() {
        let a = story("A", &["T1"], &["S1"]);
        assert!(related_stories(&a, &[]).is_empty());
        assert!(related_themes(&theme("t", "T"), &[], &[]).is_empty());
    }
}

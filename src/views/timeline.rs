//! Timeline buckets for the story timeline view.
//!
//! Stories are placed by publication date, falling back to record
//! creation. Buckets are emitted in ascending chronological order.

use chrono::{DateTime, Datelike, TimeZone, Utc};
use serde::Serialize;

use crate::models::Story;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeBucket {
    Month,
    Quarter,
    Year,
}

#[derive(Debug, Clone, Serialize)]
pub struct TimelineBucket {
    pub label: String,
    pub start: DateTime<Utc>,
    pub story_ids: Vec<String>,
}

impl TimelineBucket {
    pub fn count(&self) -> usize {
        self.story_ids.len()
    }
}

fn bucket_start(date: DateTime<Utc>, bucket: TimeBucket) -> DateTime<Utc> {
    let month = match bucket {
        TimeBucket::Month => date.month(),
        TimeBucket::Quarter => ((date.month() - 1) / 3) * 3 + 1,
        TimeBucket::Year => 1,
    };
    // Truncation to the first of the month can never produce an invalid date
    Utc.with_ymd_and_hms(date.year(), month, 1, 0, 0, 0)
        .single()
        .unwrap_or(date)
}

fn bucket_label(start: DateTime<Utc>, bucket: TimeBucket) -> String {
    match bucket {
        TimeBucket::Month => start.format("%b %Y").to_string(),
        TimeBucket::Quarter => format!("Q{} {}", (start.month() - 1) / 3 + 1, start.year()),
        TimeBucket::Year => start.format("%Y").to_string(),
    }
}

/// Group stories into chronological buckets.
pub fn story_timeline(stories: &[Story], bucket: TimeBucket) -> Vec<TimelineBucket> {
    let mut buckets: Vec<TimelineBucket> = Vec::new();
    for story in stories {
        let start = bucket_start(story.display_date(), bucket);
        match buckets.iter_mut().find(|b| b.start == start) {
            Some(b) => b.story_ids.push(story.id.clone()),
            None => buckets.push(TimelineBucket {
                label: bucket_label(start, bucket),
                start,
                story_ids: vec![story.id.clone()],
            }),
        }
    }
    buckets.sort_by_key(|b| b.start);
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story_at(id: &str, date: &str) -> Story {
        Story {
            id: id.to_string(),
            title: String::new(),
            story_copy: None,
            transcript: None,
            created_at: Utc::now(),
            published_at: Some(
                DateTime::parse_from_rfc3339(date)
                    .unwrap()
                    .with_timezone(&Utc),
            ),
            theme_ids: vec![],
            storyteller_ids: vec![],
            media_ids: vec![],
            tag_ids: vec![],
            locations: vec![],
            project: None,
        }
    }

    #[test]
    fn test_month_buckets_in_order() {
        let stories = vec![
            story_at("a", "2024-03-15T00:00:00Z"),
            story_at("b", "2024-01-20T00:00:00Z"),
            story_at("c", "2024-03-02T00:00:00Z"),
        ];
        let buckets = story_timeline(&stories, TimeBucket::Month);
        assert_eq!(buckets.len(), 2);
        assert_eq!(buckets[0].label, "Jan 2024");
        assert_eq!(buckets[1].label, "Mar 2024");
        assert_eq!(buckets[1].count(), 2);
    }

    #[test]
    fn test_quarter_labels() {
        let stories = vec![
            story_at("a", "2024-02-01T00:00:00Z"),
            story_at("b", "2024-11-01T00:00:00Z"),
        ];
        let buckets = story_timeline(&stories, TimeBucket::Quarter);
        assert_eq!(buckets[0].label, "Q1 2024");
        assert_eq!(buckets[1].label, "Q4 2024");
    }

    #[test]
    fn test_unpublished_story_uses_creation_date() {
        let mut s = story_at("a", "2024-01-01T00:00:00Z");
        s.published_at = None;
        let buckets = story_timeline(&[s], TimeBucket::Year);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].label, Utc::now().format("%Y").to_string());
    }

    #[test]
    fn test_empty_input() {
        assert!(story_timeline(&[], TimeBucket::Month).is_empty());
    }
}

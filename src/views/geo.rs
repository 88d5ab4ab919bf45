//! Per-location clusters for the map view.

use serde::Serialize;

use crate::models::{Media, Story};

#[derive(Debug, Clone, Serialize)]
pub struct LocationCluster {
    pub location: String,
    pub story_count: usize,
    pub media_count: usize,
}

impl LocationCluster {
    pub fn total(&self) -> usize {
        self.story_count + self.media_count
    }
}

/// Group stories and media by their location strings, largest cluster
/// first. Items without a location contribute nothing.
pub fn location_clusters(stories: &[Story], media: &[Media]) -> Vec<LocationCluster> {
    let mut clusters: Vec<LocationCluster> = Vec::new();

    let bump = |location: &str, is_story: bool, clusters: &mut Vec<LocationCluster>| {
        let location = location.trim();
        if location.is_empty() {
            return;
        }
        match clusters.iter_mut().find(|c| c.location == location) {
            Some(c) => {
                if is_story {
                    c.story_count += 1;
                } else {
                    c.media_count += 1;
                }
            }
            None => clusters.push(LocationCluster {
                location: location.to_string(),
                story_count: usize::from(is_story),
                media_count: usize::from(!is_story),
            }),
        }
    };

    for story in stories {
        for location in &story.locations {
            bump(location, true, &mut clusters);
        }
    }
    for item in media {
        if let Some(ref location) = item.location {
            bump(location, false, &mut clusters);
        }
    }

    clusters.sort_by(|a, b| b.total().cmp(&a.total()));
    clusters
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use crate::models::MediaKind;

    use super::*;

    fn story_in(id: &str, locations: &[&str]) -> Story {
        Story {
            id: id.to_string(),
            title: String::new(),
            story_copy: None,
            transcript: None,
            created_at: Utc::now(),
            published_at: None,
            theme_ids: vec![],
            storyteller_ids: vec![],
            media_ids: vec![],
            tag_ids: vec![],
            locations: locations.iter().map(|s| s.to_string()).collect(),
            project: None,
        }
    }

    fn media_in(id: &str, location: Option<&str>) -> Media {
        Media {
            id: id.to_string(),
            file_name: String::new(),
            kind: MediaKind::Image,
            story_id: None,
            storyteller_ids: vec![],
            theme_ids: vec![],
            quote_ids: vec![],
            location: location.map(String::from),
            shift_id: None,
            created_at: Utc::now(),
            attachments: vec![],
        }
    }

    #[test]
    fn test_clusters_ordered_by_size() {
        let stories = vec![
            story_in("a", &["Brisbane"]),
            story_in("b", &["Brisbane"]),
            story_in("c", &["Perth"]),
        ];
        let media = vec![media_in("m1", Some("Brisbane")), media_in("m2", None)];

        let clusters = location_clusters(&stories, &media);
        assert_eq!(clusters[0].location, "Brisbane");
        assert_eq!(clusters[0].story_count, 2);
        assert_eq!(clusters[0].media_count, 1);
        assert_eq!(clusters[1].location, "Perth");
    }

    #[test]
    fn test_blank_locations_skipped() {
        let stories = vec![story_in("a", &["  "])];
        assert!(location_clusters(&stories, &[]).is_empty());
    }
}

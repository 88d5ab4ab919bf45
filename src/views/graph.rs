//! Theme co-occurrence graph for the network visualization.
//!
//! Nodes are themes weighted by story count; an edge joins two themes each
//! time a story carries both. The physics layout itself belongs to the
//! presentation layer - this only shapes the data.

use serde::Serialize;

use crate::models::{Story, Theme};

#[derive(Debug, Clone, Serialize)]
pub struct ThemeNode {
    pub id: String,
    pub name: String,
    pub story_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ThemeEdge {
    pub source: String,
    pub target: String,
    /// Number of stories carrying both themes.
    pub weight: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ThemeGraph {
    pub nodes: Vec<ThemeNode>,
    pub edges: Vec<ThemeEdge>,
}

/// Build the co-occurrence graph. Theme ids on stories that are missing
/// from the theme table are ignored.
pub fn theme_graph(stories: &[Story], themes: &[Theme]) -> ThemeGraph {
    let nodes: Vec<ThemeNode> = themes
        .iter()
        .map(|t| ThemeNode {
            id: t.id.clone(),
            name: t.name.clone(),
            story_count: stories
                .iter()
                .filter(|s| s.theme_ids.iter().any(|id| id == &t.id))
                .count(),
        })
        .collect();

    let known = |id: &str| themes.iter().any(|t| t.id == id);

    let mut edges: Vec<ThemeEdge> = Vec::new();
    for story in stories {
        let ids: Vec<&str> = story
            .theme_ids
            .iter()
            .map(String::as_str)
            .filter(|id| known(id))
            .collect();
        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                // Normalize pair order so (a, b) and (b, a) share an edge
                let (a, b) = if ids[i] <= ids[j] {
                    (ids[i], ids[j])
                } else {
                    (ids[j], ids[i])
                };
                if a == b {
                    continue;
                }
                match edges.iter_mut().find(|e| e.source == a && e.target == b) {
                    Some(edge) => edge.weight += 1,
                    None => edges.push(ThemeEdge {
                        source: a.to_string(),
                        target: b.to_string(),
                        weight: 1,
                    }),
                }
            }
        }
    }

    ThemeGraph { nodes, edges }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn story(id: &str, themes: &[&str]) -> Story {
        Story {
            id: id.to_string(),
            title: String::new(),
            story_copy: None,
            transcript: None,
            created_at: Utc::now(),
            published_at: None,
            theme_ids: themes.iter().map(|s| s.to_string()).collect(),
            storyteller_ids: vec![],
            media_ids: vec![],
            tag_ids: vec![],
            locations: vec![],
            project: None,
        }
    }

    fn theme(id: &str) -> Theme {
        Theme {
            id: id.to_string(),
            name: id.to_string(),
            description: None,
            story_ids: vec![],
            quote_ids: vec![],
        }
    }

    #[test]
    fn test_edges_accumulate_weight() {
        let themes = vec![theme("a"), theme("b"), theme("c")];
        let stories = vec![
            story("s1", &["a", "b"]),
            story("s2", &["b", "a"]),
            story("s3", &["a", "c"]),
        ];
        let graph = theme_graph(&stories, &themes);

        let ab = graph
            .edges
            .iter()
            .find(|e| e.source == "a" && e.target == "b")
            .unwrap();
        assert_eq!(ab.weight, 2);
        assert_eq!(graph.edges.len(), 2);

        let a = graph.nodes.iter().find(|n| n.id == "a").unwrap();
        assert_eq!(a.story_count, 3);
    }

    #[test]
    fn test_dangling_theme_ids_ignored() {
        let themes = vec![theme("a")];
        let stories = vec![story("s1", &["a", "missing"])];
        let graph = theme_graph(&stories, &themes);
        assert!(graph.edges.is_empty());
        assert_eq!(graph.nodes.len(), 1);
    }

    #[test]
    fn test_empty_inputs() {
        let graph = theme_graph(&[], &[]);
        assert!(graph.nodes.is_empty());
        assert!(graph.edges.is_empty());
    }
}

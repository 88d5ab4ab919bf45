//! Derived views computed from fetched collections.
//!
//! Pure functions with no I/O of their own: recommendations by shared
//! links, contextual filter suggestions, the theme co-occurrence graph,
//! timeline buckets, and location clusters. Missing optional fields and
//! dangling link ids contribute nothing; empty input yields empty output.

pub mod geo;
pub mod graph;
pub mod recommendations;
pub mod suggestions;
pub mod timeline;

pub use geo::{location_clusters, LocationCluster};
pub use graph::{theme_graph, ThemeEdge, ThemeGraph, ThemeNode};
pub use recommendations::{related_media, related_stories, related_storytellers, related_themes};
pub use suggestions::{suggest_filters, FilterSuggestion, SuggestionKind};
pub use timeline::{story_timeline, TimeBucket, TimelineBucket};

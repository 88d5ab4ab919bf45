//! Empathy Ledger data layer.
//!
//! The client-side data layer for the Empathy Ledger storytelling archive:
//! an Airtable-backed collection of stories, storytellers, media, themes,
//! quotes, tags, shifts, and galleries.
//!
//! The crate owns:
//!
//! - the Airtable REST client (`api`)
//! - typed records per table (`models`)
//! - the two-tier cache with strategy execution and in-flight request
//!   collapsing (`cache`)
//! - the aggregated-data accessor pages fetch through (`data`)
//! - derived views: recommendations, filter suggestions, the theme graph,
//!   timelines, and location clusters (`views`)
//! - the persisted filter selection (`filters`)
//!
//! Presentation - cards, galleries, charts, the force-directed graph
//! layout - is built on top of this crate and stays out of it.

pub mod api;
pub mod cache;
pub mod config;
pub mod data;
pub mod filters;
pub mod models;
pub mod views;

pub use api::{AirtableClient, ApiError};
pub use cache::{CachePolicy, CacheStore, DataSource, Fetched, FetchStrategy};
pub use config::Config;
pub use data::{ArchiveSnapshot, DataService};
pub use filters::{FilterPatch, FilterState, FilterStore};

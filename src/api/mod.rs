//! REST API client module for the Airtable base.
//!
//! This module provides the `AirtableClient` for fetching and mutating
//! Empathy Ledger records (stories, storytellers, media, themes, quotes,
//! tags, shifts, galleries).
//!
//! The API uses bearer token authentication with a personal access token.

pub mod client;
pub mod error;

pub use client::AirtableClient;
pub use error::ApiError;

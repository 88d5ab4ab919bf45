//! API client for communicating with the Airtable REST API.
//!
//! This module provides the `AirtableClient` struct for fetching and
//! mutating Empathy Ledger records. List calls follow Airtable's `offset`
//! pagination until the table is exhausted; all calls retry politely on
//! rate limiting.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{header, Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::{debug, warn};

use crate::models::{
    AirtableRecord, Gallery, GalleryFields, Media, MediaFields, MediaPatch, Quote, QuoteFields,
    QuotePatch, RecordPage, Shift, ShiftFields, Story, StoryFields, StoryPatch, Storyteller,
    StorytellerFields, StorytellerPatch, Table, Tag, TagFields, Theme, ThemeFields,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Base URL for the Airtable REST API
const API_BASE_URL: &str = "https://api.airtable.com/v0";

/// HTTP request timeout in seconds.
/// 30s allows for slow responses while failing fast enough for good UX.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Records requested per list page. 100 is Airtable's maximum.
const PAGE_SIZE: u32 = 100;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
/// Airtable enforces 5 requests/second per base; 1s clears the window.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Request body for record creation: `{ "fields": { ... } }`.
#[derive(Debug, Serialize)]
struct FieldsEnvelope<P> {
    fields: P,
}

#[derive(Debug, Deserialize)]
struct DeleteResponse {
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    id: String,
}

/// API client for the Empathy Ledger Airtable base.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    api_key: String,
    base_id: String,
}

impl AirtableClient {
    /// Create a new API client for the given base.
    pub fn new(api_key: impl Into<String>, base_id: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_id: base_id.into(),
        })
    }

    fn table_url(&self, table: Table) -> String {
        format!("{}/{}/{}", API_BASE_URL, self.base_id, table.name())
    }

    fn record_url(&self, table: Table, record_id: &str) -> String {
        format!("{}/{}", self.table_url(table), record_id)
    }

    fn auth_headers(&self) -> Result<header::HeaderMap> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&format!("Bearer {}", self.api_key))?,
        );
        Ok(headers)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(Some(response)) for success, Ok(None) for rate limit
    /// (should retry), or Err for other errors.
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            // Rate limited - signal to retry
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send one request with rate-limit retry and parse the JSON response.
    async fn request<T: DeserializeOwned, B: Serialize>(
        &self,
        method: Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let mut request = self
                .client
                .request(method.clone(), url)
                .headers(self.auth_headers()?)
                .query(query);
            if let Some(body) = body {
                request = request.json(body);
            }

            let response = request
                .send()
                .await
                .with_context(|| format!("Failed to send {} request to {}", method, url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url = url, retry = retries, backoff_ms = backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2; // Exponential backoff
                }
            }
        }
    }

    /// Fetch every record in a table, following pagination, and convert to
    /// the domain model.
    async fn list_all<F, T>(&self, table: Table) -> Result<Vec<T>>
    where
        F: DeserializeOwned + Default,
        T: From<AirtableRecord<F>>,
    {
        let url = self.table_url(table);
        let mut records: Vec<T> = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let mut query = vec![("pageSize", PAGE_SIZE.to_string())];
            if let Some(ref o) = offset {
                query.push(("offset", o.clone()));
            }

            let page: RecordPage<F> = self
                .request::<_, serde_json::Value>(Method::GET, &url, &query, None)
                .await
                .with_context(|| format!("Failed to list {} records", table))?;

            records.extend(page.records.into_iter().map(T::from));

            match page.offset {
                Some(o) => offset = Some(o),
                None => break,
            }
        }

        debug!(table = %table, count = records.len(), "Fetched table");
        Ok(records)
    }

    async fn create_record<P, F, T>(&self, table: Table, fields: P) -> Result<T>
    where
        P: Serialize,
        F: DeserializeOwned + Default,
        T: From<AirtableRecord<F>>,
    {
        let url = self.table_url(table);
        let record: AirtableRecord<F> = self
            .request(Method::POST, &url, &[], Some(&FieldsEnvelope { fields }))
            .await
            .with_context(|| format!("Failed to create {} record", table))?;
        Ok(record.into())
    }

    async fn update_record<P, F, T>(&self, table: Table, record_id: &str, fields: P) -> Result<T>
    where
        P: Serialize,
        F: DeserializeOwned + Default,
        T: From<AirtableRecord<F>>,
    {
        let url = self.record_url(table, record_id);
        let record: AirtableRecord<F> = self
            .request(Method::PATCH, &url, &[], Some(&FieldsEnvelope { fields }))
            .await
            .with_context(|| format!("Failed to update {} record {}", table, record_id))?;
        Ok(record.into())
    }

    async fn delete_record(&self, table: Table, record_id: &str) -> Result<()> {
        let url = self.record_url(table, record_id);
        let response: DeleteResponse = self
            .request::<_, serde_json::Value>(Method::DELETE, &url, &[], None)
            .await
            .with_context(|| format!("Failed to delete {} record {}", table, record_id))?;

        if !response.deleted {
            return Err(ApiError::InvalidResponse(format!(
                "Delete of {} not confirmed by Airtable",
                response.id
            ))
            .into());
        }
        Ok(())
    }

    // ===== Read: one fetch per table =====

    pub async fn fetch_stories(&self) -> Result<Vec<Story>> {
        self.list_all::<StoryFields, Story>(Table::Stories).await
    }

    pub async fn fetch_storytellers(&self) -> Result<Vec<Storyteller>> {
        self.list_all::<StorytellerFields, Storyteller>(Table::Storytellers)
            .await
    }

    pub async fn fetch_media(&self) -> Result<Vec<Media>> {
        self.list_all::<MediaFields, Media>(Table::Media).await
    }

    pub async fn fetch_themes(&self) -> Result<Vec<Theme>> {
        self.list_all::<ThemeFields, Theme>(Table::Themes).await
    }

    pub async fn fetch_quotes(&self) -> Result<Vec<Quote>> {
        self.list_all::<QuoteFields, Quote>(Table::Quotes).await
    }

    pub async fn fetch_tags(&self) -> Result<Vec<Tag>> {
        self.list_all::<TagFields, Tag>(Table::Tags).await
    }

    pub async fn fetch_shifts(&self) -> Result<Vec<Shift>> {
        self.list_all::<ShiftFields, Shift>(Table::Shifts).await
    }

    pub async fn fetch_galleries(&self) -> Result<Vec<Gallery>> {
        self.list_all::<GalleryFields, Gallery>(Table::Galleries)
            .await
    }

    // ===== Write: create/update/delete for the mutable tables =====

    pub async fn create_story(&self, patch: StoryPatch) -> Result<Story> {
        self.create_record::<_, StoryFields, Story>(Table::Stories, patch)
            .await
    }

    pub async fn update_story(&self, record_id: &str, patch: StoryPatch) -> Result<Story> {
        self.update_record::<_, StoryFields, Story>(Table::Stories, record_id, patch)
            .await
    }

    pub async fn delete_story(&self, record_id: &str) -> Result<()> {
        self.delete_record(Table::Stories, record_id).await
    }

    pub async fn create_storyteller(&self, patch: StorytellerPatch) -> Result<Storyteller> {
        self.create_record::<_, StorytellerFields, Storyteller>(Table::Storytellers, patch)
            .await
    }

    pub async fn update_storyteller(
        &self,
        record_id: &str,
        patch: StorytellerPatch,
    ) -> Result<Storyteller> {
        self.update_record::<_, StorytellerFields, Storyteller>(Table::Storytellers, record_id, patch)
            .await
    }

    pub async fn delete_storyteller(&self, record_id: &str) -> Result<()> {
        self.delete_record(Table::Storytellers, record_id).await
    }

    pub async fn create_media(&self, patch: MediaPatch) -> Result<Media> {
        self.create_record::<_, MediaFields, Media>(Table::Media, patch)
            .await
    }

    pub async fn update_media(&self, record_id: &str, patch: MediaPatch) -> Result<Media> {
        self.update_record::<_, MediaFields, Media>(Table::Media, record_id, patch)
            .await
    }

    pub async fn delete_media(&self, record_id: &str) -> Result<()> {
        self.delete_record(Table::Media, record_id).await
    }

    pub async fn create_quote(&self, patch: QuotePatch) -> Result<Quote> {
        self.create_record::<_, QuoteFields, Quote>(Table::Quotes, patch)
            .await
    }

    pub async fn update_quote(&self, record_id: &str, patch: QuotePatch) -> Result<Quote> {
        self.update_record::<_, QuoteFields, Quote>(Table::Quotes, record_id, patch)
            .await
    }

    pub async fn delete_quote(&self, record_id: &str) -> Result<()> {
        self.delete_record(Table::Quotes, record_id).await
    }
}

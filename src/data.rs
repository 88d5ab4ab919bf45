//! Aggregated data access: one call per table, plus a fan-out fetch.
//!
//! `DataService` composes the Airtable client with the caching layer. Each
//! per-table call builds a cache key from the table name and delegates to
//! the policy executor with that table's fetch function; `fetch_all` fans
//! out to every table concurrently and fails fast if any one fails.
//!
//! The service is constructed explicitly and passed to whatever composes
//! the page layer - there is no import-time global state.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::AirtableClient;
use crate::cache::{CachePolicy, CacheStore, Fetched, FetchStrategy, FileStorage, StoragePort};
use crate::config::Config;
use crate::models::{
    Gallery, Media, MediaPatch, Quote, QuotePatch, Shift, Story, StoryPatch, Storyteller,
    StorytellerPatch, Table, Tag, Theme,
};

/// Namespace prefix for every key this crate writes to shared storage.
pub const STORAGE_NAMESPACE: &str = "empathy-ledger";

/// Every table's full collection, fetched in one batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveSnapshot {
    pub stories: Vec<Story>,
    pub storytellers: Vec<Storyteller>,
    pub media: Vec<Media>,
    pub themes: Vec<Theme>,
    pub quotes: Vec<Quote>,
    pub tags: Vec<Tag>,
    pub shifts: Vec<Shift>,
    pub galleries: Vec<Gallery>,
}

impl ArchiveSnapshot {
    pub fn theme(&self, id: &str) -> Option<&Theme> {
        self.themes.iter().find(|t| t.id == id)
    }

    pub fn story(&self, id: &str) -> Option<&Story> {
        self.stories.iter().find(|s| s.id == id)
    }

    pub fn storyteller(&self, id: &str) -> Option<&Storyteller> {
        self.storytellers.iter().find(|s| s.id == id)
    }
}

/// Aggregated-data accessor over the Airtable client and the cache.
pub struct DataService {
    client: AirtableClient,
    store: Arc<CacheStore>,
    policy: CachePolicy,
    max_age: Duration,
    strategy: FetchStrategy,
}

impl DataService {
    /// Build a service from explicit parts.
    pub fn new(
        client: AirtableClient,
        storage: Arc<dyn StoragePort>,
        max_age: Duration,
        prefetch: bool,
    ) -> Self {
        let store = Arc::new(CacheStore::new(storage, STORAGE_NAMESPACE, max_age));
        let policy = CachePolicy::new(store.clone(), prefetch);
        Self {
            client,
            store,
            policy,
            max_age,
            strategy: FetchStrategy::default(),
        }
    }

    /// Build a service from the application config: Airtable client from
    /// the configured credentials, file-backed cache under the cache dir.
    pub fn from_config(config: &Config) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .context("AIRTABLE_API_KEY is not set")?;
        let base_id = config
            .base_id
            .clone()
            .context("Airtable base id is not configured")?;
        let client = AirtableClient::new(api_key, base_id)?;
        let storage = Arc::new(FileStorage::new(config.cache_dir()?)?);
        Ok(Self::new(client, storage, config.cache_ttl(), config.prefetch))
    }

    /// Change the default strategy used by the plain per-table calls.
    pub fn with_strategy(mut self, strategy: FetchStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn cache(&self) -> &CacheStore {
        &self.store
    }

    // ===== Per-table reads =====

    pub async fn stories(&self) -> Result<Vec<Story>> {
        Ok(self.stories_with(self.strategy).await?.data)
    }

    pub async fn stories_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Story>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Stories.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_stories().await
            })
            .await
    }

    pub async fn storytellers(&self) -> Result<Vec<Storyteller>> {
        Ok(self.storytellers_with(self.strategy).await?.data)
    }

    pub async fn storytellers_with(
        &self,
        strategy: FetchStrategy,
    ) -> Result<Fetched<Vec<Storyteller>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Storytellers.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_storytellers().await
            })
            .await
    }

    pub async fn media(&self) -> Result<Vec<Media>> {
        Ok(self.media_with(self.strategy).await?.data)
    }

    pub async fn media_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Media>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Media.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_media().await
            })
            .await
    }

    pub async fn themes(&self) -> Result<Vec<Theme>> {
        Ok(self.themes_with(self.strategy).await?.data)
    }

    pub async fn themes_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Theme>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Themes.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_themes().await
            })
            .await
    }

    pub async fn quotes(&self) -> Result<Vec<Quote>> {
        Ok(self.quotes_with(self.strategy).await?.data)
    }

    pub async fn quotes_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Quote>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Quotes.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_quotes().await
            })
            .await
    }

    pub async fn tags(&self) -> Result<Vec<Tag>> {
        Ok(self.tags_with(self.strategy).await?.data)
    }

    pub async fn tags_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Tag>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Tags.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_tags().await
            })
            .await
    }

    pub async fn shifts(&self) -> Result<Vec<Shift>> {
        Ok(self.shifts_with(self.strategy).await?.data)
    }

    pub async fn shifts_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Shift>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Shifts.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_shifts().await
            })
            .await
    }

    pub async fn galleries(&self) -> Result<Vec<Gallery>> {
        Ok(self.galleries_with(self.strategy).await?.data)
    }

    pub async fn galleries_with(&self, strategy: FetchStrategy) -> Result<Fetched<Vec<Gallery>>> {
        let client = self.client.clone();
        self.policy
            .fetch_with(&Table::Galleries.cache_key(), strategy, self.max_age, move || async move {
                client.fetch_galleries().await
            })
            .await
    }

    /// Fetch every table concurrently. Fails fast: if any one table's fetch
    /// fails the whole batch fails, and callers retry the batch rather than
    /// patching in partial results.
    pub async fn fetch_all(&self) -> Result<ArchiveSnapshot> {
        let (stories, storytellers, media, themes, quotes, tags, shifts, galleries) = tokio::try_join!(
            self.stories(),
            self.storytellers(),
            self.media(),
            self.themes(),
            self.quotes(),
            self.tags(),
            self.shifts(),
            self.galleries(),
        )?;

        debug!(
            stories = stories.len(),
            storytellers = storytellers.len(),
            media = media.len(),
            "Fetched full archive"
        );

        Ok(ArchiveSnapshot {
            stories,
            storytellers,
            media,
            themes,
            quotes,
            tags,
            shifts,
            galleries,
        })
    }

    // ===== Cache invalidation =====

    pub fn invalidate(&self, table: Table) {
        self.store.remove(&table.cache_key());
    }

    pub fn invalidate_all(&self) {
        self.store.clear();
    }

    // ===== Write-through for the mutable tables =====
    //
    // Each write goes straight to Airtable, then drops that table's cached
    // collection so the next read refetches.

    pub async fn create_story(&self, patch: StoryPatch) -> Result<Story> {
        let story = self.client.create_story(patch).await?;
        self.invalidate(Table::Stories);
        Ok(story)
    }

    pub async fn update_story(&self, id: &str, patch: StoryPatch) -> Result<Story> {
        let story = self.client.update_story(id, patch).await?;
        self.invalidate(Table::Stories);
        Ok(story)
    }

    pub async fn delete_story(&self, id: &str) -> Result<()> {
        self.client.delete_story(id).await?;
        self.invalidate(Table::Stories);
        Ok(())
    }

    pub async fn create_storyteller(&self, patch: StorytellerPatch) -> Result<Storyteller> {
        let storyteller = self.client.create_storyteller(patch).await?;
        self.invalidate(Table::Storytellers);
        Ok(storyteller)
    }

    pub async fn update_storyteller(
        &self,
        id: &str,
        patch: StorytellerPatch,
    ) -> Result<Storyteller> {
        let storyteller = self.client.update_storyteller(id, patch).await?;
        self.invalidate(Table::Storytellers);
        Ok(storyteller)
    }

    pub async fn delete_storyteller(&self, id: &str) -> Result<()> {
        self.client.delete_storyteller(id).await?;
        self.invalidate(Table::Storytellers);
        Ok(())
    }

    pub async fn create_media(&self, patch: MediaPatch) -> Result<Media> {
        let media = self.client.create_media(patch).await?;
        self.invalidate(Table::Media);
        Ok(media)
    }

    pub async fn update_media(&self, id: &str, patch: MediaPatch) -> Result<Media> {
        let media = self.client.update_media(id, patch).await?;
        self.invalidate(Table::Media);
        Ok(media)
    }

    pub async fn delete_media(&self, id: &str) -> Result<()> {
        self.client.delete_media(id).await?;
        self.invalidate(Table::Media);
        Ok(())
    }

    pub async fn create_quote(&self, patch: QuotePatch) -> Result<Quote> {
        let quote = self.client.create_quote(patch).await?;
        self.invalidate(Table::Quotes);
        Ok(quote)
    }

    pub async fn update_quote(&self, id: &str, patch: QuotePatch) -> Result<Quote> {
        let quote = self.client.update_quote(id, patch).await?;
        self.invalidate(Table::Quotes);
        Ok(quote)
    }

    pub async fn delete_quote(&self, id: &str) -> Result<()> {
        self.client.delete_quote(id).await?;
        self.invalidate(Table::Quotes);
        Ok(())
    }
}

//! Cache policy executor: strategy selection plus in-flight request
//! collapsing.
//!
//! Given a cache key, a fetch function, and a strategy, decide what to
//! return and when the fetch function actually runs. Concurrent requests
//! for the same key collapse into a single fetch: later callers await the
//! same shared future and observe the same value or the same failure.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex};

use anyhow::{anyhow, Context, Result};
use chrono::Duration;
use futures::future::{BoxFuture, FutureExt, Shared};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::store::CacheStore;

/// How a request should combine the cache and the network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchStrategy {
    /// Serve a valid cache entry when one exists, fetching only on a miss.
    /// With prefetch enabled, a hit also starts a background refresh.
    #[default]
    CacheFirst,
    /// Fetch first; fall back to a stale cache entry only when the fetch
    /// fails.
    NetworkFirst,
    /// Serve whatever the cache holds, however stale; never fetch.
    CacheOnly,
    /// Always fetch, ignoring any cached entry.
    NetworkOnly,
}

/// Where a fetched collection came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Cache,
    Network,
    /// Cache entry older than the requested max age, served because the
    /// network failed.
    StaleCache,
    /// Cache-only request with nothing cached.
    Empty,
}

/// A resolved request plus, for prefetching cache-first hits, a handle to
/// the background refresh. Callers may await the handle for deterministic
/// completion or drop it to let the refresh finish on its own.
#[derive(Debug)]
pub struct Fetched<T> {
    pub data: T,
    pub source: DataSource,
    pub refresh: Option<JoinHandle<Result<()>>>,
}

type SharedFetch = Shared<BoxFuture<'static, Result<Value, Arc<anyhow::Error>>>>;
type InFlightMap = Mutex<HashMap<String, SharedFetch>>;

/// Executes fetches through the cache according to a strategy.
pub struct CachePolicy {
    store: Arc<CacheStore>,
    in_flight: Arc<InFlightMap>,
    /// Refresh cache-first hits in the background.
    prefetch: bool,
}

impl CachePolicy {
    pub fn new(store: Arc<CacheStore>, prefetch: bool) -> Self {
        Self {
            store,
            in_flight: Arc::new(Mutex::new(HashMap::new())),
            prefetch,
        }
    }

    /// Resolve `key` under `strategy`, calling `fetch` only when the
    /// strategy requires the network.
    pub async fn fetch_with<T, F, Fut>(
        &self,
        key: &str,
        strategy: FetchStrategy,
        max_age: Duration,
        fetch: F,
    ) -> Result<Fetched<T>>
    where
        T: Serialize + DeserializeOwned + Default + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        match strategy {
            FetchStrategy::CacheFirst => {
                if let Some(value) = self.store.get(key, max_age) {
                    if let Some(data) = self.decode_cached(key, value) {
                        let refresh = if self.prefetch {
                            Some(self.spawn_refresh(key, fetch))
                        } else {
                            None
                        };
                        return Ok(Fetched {
                            data,
                            source: DataSource::Cache,
                            refresh,
                        });
                    }
                }
                let value =
                    run_fetch(self.store.clone(), self.in_flight.clone(), key.to_string(), fetch)
                        .await?;
                Ok(Fetched {
                    data: decode(key, value)?,
                    source: DataSource::Network,
                    refresh: None,
                })
            }
            FetchStrategy::NetworkFirst => {
                let result =
                    run_fetch(self.store.clone(), self.in_flight.clone(), key.to_string(), fetch)
                        .await;
                match result {
                    Ok(value) => Ok(Fetched {
                        data: decode(key, value)?,
                        source: DataSource::Network,
                        refresh: None,
                    }),
                    Err(err) => {
                        match self.store.get_stale(key).and_then(|v| self.decode_cached(key, v)) {
                            Some(data) => {
                                warn!(key = key, error = %err, "Fetch failed, serving stale cache");
                                Ok(Fetched {
                                    data,
                                    source: DataSource::StaleCache,
                                    refresh: None,
                                })
                            }
                            None => Err(err),
                        }
                    }
                }
            }
            FetchStrategy::CacheOnly => {
                match self.store.get_stale(key).and_then(|v| self.decode_cached(key, v)) {
                    Some(data) => Ok(Fetched {
                        data,
                        source: DataSource::Cache,
                        refresh: None,
                    }),
                    None => Ok(Fetched {
                        data: T::default(),
                        source: DataSource::Empty,
                        refresh: None,
                    }),
                }
            }
            FetchStrategy::NetworkOnly => {
                let value =
                    run_fetch(self.store.clone(), self.in_flight.clone(), key.to_string(), fetch)
                        .await?;
                Ok(Fetched {
                    data: decode(key, value)?,
                    source: DataSource::Network,
                    refresh: None,
                })
            }
        }
    }

    /// Start a background refresh for `key`. The fetch still participates
    /// in in-flight collapsing, so a foreground request arriving during the
    /// refresh shares it.
    fn spawn_refresh<T, F, Fut>(&self, key: &str, fetch: F) -> JoinHandle<Result<()>>
    where
        T: Serialize + Send + 'static,
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let store = self.store.clone();
        let in_flight = self.in_flight.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            debug!(key = %key, "Background refresh started");
            run_fetch(store, in_flight, key, fetch).await.map(|_| ())
        })
    }

    /// Decode a cached value into the requested type. An entry whose shape
    /// no longer matches is removed and treated as a cache miss.
    fn decode_cached<T: DeserializeOwned>(&self, key: &str, value: Value) -> Option<T> {
        match serde_json::from_value(value) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key = key, error = %e, "Cached value has the wrong shape, discarding");
                self.store.remove(key);
                None
            }
        }
    }
}

/// Decode a freshly fetched value. Unlike the cached path this propagates:
/// the value was serialized from the fetch result moments ago, so a
/// mismatch is a bug rather than stale data.
fn decode<T: DeserializeOwned>(key: &str, value: Value) -> Result<T> {
    serde_json::from_value(value)
        .with_context(|| format!("Fetched value for '{}' does not match the expected shape", key))
}

/// Run one collapsed fetch for `key`: reuse the in-flight future when one
/// exists, otherwise invoke `fetch`, cache the result, and share it with
/// every waiter.
async fn run_fetch<T, F, Fut>(
    store: Arc<CacheStore>,
    in_flight: Arc<InFlightMap>,
    key: String,
    fetch: F,
) -> Result<Value>
where
    T: Serialize + Send + 'static,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let shared = {
        let mut guard = in_flight.lock().unwrap();
        match guard.get(&key) {
            Some(existing) => existing.clone(),
            None => {
                // Only the first caller reaches this branch, so `fetch` is
                // invoked exactly once per collapsed request.
                let fut = fetch();
                let store = store.clone();
                let cache_key = key.clone();
                let shared = async move {
                    let data = fut.await.map_err(Arc::new)?;
                    let value = serde_json::to_value(&data)
                        .context("Failed to serialize fetched collection")
                        .map_err(Arc::new)?;
                    store.set(&cache_key, &value);
                    Ok(value)
                }
                .boxed()
                .shared();
                guard.insert(key.clone(), shared.clone());
                shared
            }
        }
    };

    let result = shared.await;
    // Whichever waiter finishes first clears the slot; removal is
    // idempotent for the rest.
    in_flight.lock().unwrap().remove(&key);

    result.map_err(|e| anyhow!("{:#}", e))
}

//! Caching layer for fetched collections.
//!
//! Three pieces, composed bottom-up:
//!
//! - `storage`: the `StoragePort` trait plus in-memory and file-backed
//!   implementations
//! - `store`: the two-tier `CacheStore` (memory map mirrored to a
//!   persistent port), entries stamped with write time and format version
//! - `policy`: the `CachePolicy` executor implementing the cache-first /
//!   network-first / cache-only / network-only strategies with per-key
//!   in-flight request collapsing

pub mod policy;
pub mod storage;
pub mod store;

pub use policy::{CachePolicy, DataSource, Fetched, FetchStrategy};
pub use storage::{FileStorage, MemoryStorage, StorageError, StoragePort};
pub use store::{CacheStore, CACHE_FORMAT_VERSION};

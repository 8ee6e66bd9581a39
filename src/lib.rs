//! tally-cache - instrumented value cache
//!
//! Stores scalar values in Redis under random keys and reads them back with
//! optional conversion. Every `store` call is counted and its input/output
//! recorded in the store, so the call history can be replayed later.
//!
//! ```ignore
//! let cache = Cache::connect(&config.store).await?;
//! let key = cache.store("hello").await?;
//! assert_eq!(cache.get_str(&key).await?, Some("hello".to_string()));
//! replay(&cache, &Cache::STORE).await?;
//! ```

pub mod advice;
pub mod cache;
pub mod codec;
pub mod config;
pub mod interfaces;
pub mod replay;
pub mod storage;
pub mod utils;

pub use advice::OperationName;
pub use cache::{Cache, CacheError, Key, Result};
pub use codec::{ConversionError, StoredValue};
pub use interfaces::{StoreClient, StoreError};
pub use replay::{replay, replay_to, Replay};

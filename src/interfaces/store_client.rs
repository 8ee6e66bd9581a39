//! Key-value store interface.

use async_trait::async_trait;

/// Errors raised by a store client.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Operation against a key holding the wrong kind of value: {key}")]
    WrongType { key: String },

    #[error("Value at {key} is not an integer")]
    NotAnInteger { key: String },

    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Interface to the external key-value service.
///
/// Only the primitives the cache and its advice need are exposed. Atomicity
/// of `incr` and `rpush` is the store's responsibility; callers never lock.
///
/// Implementations:
/// - `RedisStoreClient`: Redis via a multiplexed connection manager
/// - `MockStoreClient`: in-memory store for tests
#[async_trait]
pub trait StoreClient: Send + Sync {
    /// Upsert a scalar value.
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Read a scalar value.
    ///
    /// Returns `None` if the key does not exist.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Atomically increment the integer at `key` by one, creating it at zero
    /// first if absent. Returns the new value.
    async fn incr(&self, key: &str) -> Result<i64>;

    /// Append to the end of the list at `key`, creating it if absent.
    /// Returns the list length after the push.
    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize>;

    /// Read list elements between `start` and `stop`, both inclusive.
    ///
    /// Negative indices count from the end (`-1` is the last element).
    /// A missing key reads as an empty list.
    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>>;

    /// Whether `key` exists.
    async fn exists(&self, key: &str) -> Result<bool>;

    /// Remove every key in the connected namespace.
    async fn flushdb(&self) -> Result<()>;

    /// Whether the store can currently be reached.
    ///
    /// Advice and replay check this before touching instrumentation state and
    /// skip silently when it is false.
    async fn is_connected(&self) -> bool;
}

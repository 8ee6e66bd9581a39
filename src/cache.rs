//! Cache facade.
//!
//! Stores scalar values under freshly generated keys and reads them back with
//! optional conversion. The `store` path runs through call history and call
//! counting advice; reads are not instrumented.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};
use uuid::Uuid;

use crate::advice::{CountCalls, Operation, OperationExt, OperationName, RecordCalls};
use crate::codec::{self, ConversionError, StoredValue};
use crate::interfaces::{self, StoreClient, StoreError};

/// Errors surfaced by the cache and replay.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Conversion error: {0}")]
    Conversion(#[from] ConversionError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CacheError>;

/// Identifier of a stored value.
///
/// Generated by [`Cache::store`] as the text of a random UUID. Any string can
/// be wrapped to look up a key obtained elsewhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Key(String);

impl Key {
    /// A fresh random key.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The bare `store` operation: write a value under a new key.
pub struct StoreValue {
    name: OperationName,
    client: Arc<dyn StoreClient>,
}

impl StoreValue {
    pub fn new(client: Arc<dyn StoreClient>) -> Self {
        Self {
            name: Cache::STORE,
            client,
        }
    }
}

#[async_trait]
impl Operation for StoreValue {
    type Input = StoredValue;
    type Output = Key;

    fn name(&self) -> &OperationName {
        &self.name
    }

    async fn call(&self, input: StoredValue) -> interfaces::Result<Key> {
        let key = Key::generate();
        self.client.set(key.as_str(), &input.to_bytes()).await?;

        debug!(key = %key, "Stored value");
        Ok(key)
    }
}

/// Value cache over a key-value store.
///
/// Owns one store client handle. Construction flushes the whole connected
/// database: a `Cache` assumes an exclusive, freshly reset namespace, and
/// creating one while another is active on the same database wipes the other's
/// values, counters and history.
pub struct Cache {
    client: Arc<dyn StoreClient>,
    store_op: RecordCalls<CountCalls<StoreValue>>,
}

impl Cache {
    /// Name under which `store` calls are counted and recorded.
    pub const STORE: OperationName = OperationName::from_static("Cache.store");

    /// Create a cache over `client`, flushing the store first.
    pub async fn new(client: Arc<dyn StoreClient>) -> Result<Self> {
        client.flushdb().await?;
        info!("Cache initialized on flushed store");

        let store_op = StoreValue::new(client.clone())
            .counted(client.clone())
            .recorded(client.clone());

        Ok(Self { client, store_op })
    }

    /// Connect to Redis as configured and create a cache over it.
    #[cfg(feature = "redis")]
    pub async fn connect(config: &crate::config::StoreConfig) -> Result<Self> {
        use crate::storage::RedisStoreClient;
        use crate::utils::bootstrap::connect_with_retry;

        let uri = config.uri.as_str();
        let client = connect_with_retry("redis", uri, config.connect_retries, move || {
            RedisStoreClient::new(uri)
        })
        .await?;

        Self::new(Arc::new(client)).await
    }

    /// The store client this cache owns.
    pub fn client(&self) -> &Arc<dyn StoreClient> {
        &self.client
    }

    /// Store a value under a fresh random key and return the key.
    pub async fn store(&self, value: impl Into<StoredValue>) -> Result<Key> {
        Ok(self.store_op.call(value.into()).await?)
    }

    /// Read the raw bytes stored under `key`.
    ///
    /// Returns `None` if the key does not exist.
    pub async fn get(&self, key: &Key) -> Result<Option<Vec<u8>>> {
        Ok(self.client.get(key.as_str()).await?)
    }

    /// Read the value under `key` and convert it.
    ///
    /// The converter only runs on a present value; an absent key yields
    /// `None`. Converter failures propagate as [`CacheError::Conversion`].
    pub async fn get_with<T, F>(&self, key: &Key, converter: F) -> Result<Option<T>>
    where
        F: FnOnce(Vec<u8>) -> std::result::Result<T, ConversionError>,
    {
        match self.get(key).await? {
            Some(raw) => Ok(Some(converter(raw)?)),
            None => Ok(None),
        }
    }

    /// Read the value under `key` as UTF-8 text.
    pub async fn get_str(&self, key: &Key) -> Result<Option<String>> {
        self.get_with(key, codec::decode_str).await
    }

    /// Read the value under `key` as a base-10 integer.
    pub async fn get_int(&self, key: &Key) -> Result<Option<i64>> {
        self.get_with(key, codec::decode_int).await
    }

    /// Read the value under `key` as a floating-point number.
    pub async fn get_float(&self, key: &Key) -> Result<Option<f64>> {
        self.get_with(key, codec::decode_float).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MockStoreClient;

    async fn cache() -> (Cache, Arc<MockStoreClient>) {
        let store = Arc::new(MockStoreClient::new());
        let cache = Cache::new(store.clone()).await.unwrap();
        (cache, store)
    }

    #[tokio::test]
    async fn test_new_flushes_store() {
        let store = Arc::new(MockStoreClient::new());
        store.set("leftover", b"1").await.unwrap();

        let _cache = Cache::new(store.clone()).await.unwrap();

        assert_eq!(store.key_count().await, 0);
    }

    #[tokio::test]
    async fn test_new_fails_when_store_unavailable() {
        let store = Arc::new(MockStoreClient::new());
        store.set_connected(false).await;

        let result = Cache::new(store).await;
        assert!(matches!(
            result,
            Err(CacheError::Store(StoreError::Unavailable(_)))
        ));
    }

    #[tokio::test]
    async fn test_store_and_get_raw_bytes() {
        let (cache, _) = cache().await;

        let values = [
            StoredValue::from("text"),
            StoredValue::from(vec![0u8, 1, 2, 255]),
            StoredValue::from(-12),
            StoredValue::from(0.5),
        ];
        for value in values {
            let key = cache.store(value.clone()).await.unwrap();
            assert_eq!(cache.get(&key).await.unwrap(), Some(value.to_bytes()));
        }
    }

    #[tokio::test]
    async fn test_store_returns_distinct_uuid_keys() {
        let (cache, _) = cache().await;

        let a = cache.store("same").await.unwrap();
        let b = cache.store("same").await.unwrap();

        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[tokio::test]
    async fn test_get_str() {
        let (cache, _) = cache().await;
        let key = cache.store("hello").await.unwrap();
        assert_eq!(cache.get_str(&key).await.unwrap(), Some("hello".to_string()));
    }

    #[tokio::test]
    async fn test_get_int() {
        let (cache, _) = cache().await;
        let key = cache.store(42).await.unwrap();
        assert_eq!(cache.get_int(&key).await.unwrap(), Some(42));
    }

    #[tokio::test]
    async fn test_get_float() {
        let (cache, _) = cache().await;
        let key = cache.store(3.5).await.unwrap();
        assert_eq!(cache.get_float(&key).await.unwrap(), Some(3.5));
    }

    #[tokio::test]
    async fn test_get_with_custom_converter() {
        let (cache, _) = cache().await;
        let key = cache.store("abc").await.unwrap();

        let len = cache
            .get_with(&key, |raw| Ok(raw.len()))
            .await
            .unwrap();
        assert_eq!(len, Some(3));
    }

    #[tokio::test]
    async fn test_get_missing_key_is_none() {
        let (cache, _) = cache().await;
        let key = Key::generate();

        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert_eq!(cache.get_int(&key).await.unwrap(), None);
        assert_eq!(cache.get_str(&key).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_get_int_on_text_is_conversion_error() {
        let (cache, _) = cache().await;
        let key = cache.store("not a number").await.unwrap();

        let result = cache.get_int(&key).await;
        assert!(matches!(
            result,
            Err(CacheError::Conversion(ConversionError::InvalidInteger { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_str_on_invalid_utf8_is_conversion_error() {
        let (cache, _) = cache().await;
        let key = cache.store(vec![0xffu8, 0xfe]).await.unwrap();

        let result = cache.get_str(&key).await;
        assert!(matches!(
            result,
            Err(CacheError::Conversion(ConversionError::InvalidUtf8(_)))
        ));
    }

    #[tokio::test]
    async fn test_store_counts_calls() {
        let (cache, store) = cache().await;

        for i in 0..5 {
            cache.store(i).await.unwrap();
        }

        assert_eq!(store.get("Cache.store").await.unwrap(), Some(b"5".to_vec()));
    }

    #[tokio::test]
    async fn test_store_records_history_in_order() {
        let (cache, store) = cache().await;

        let first = cache.store("first").await.unwrap();
        let second = cache.store(2).await.unwrap();

        let inputs = store.lrange("Cache.store:inputs", 0, -1).await.unwrap();
        let outputs = store.lrange("Cache.store:outputs", 0, -1).await.unwrap();

        assert_eq!(inputs, vec![b"('first',)".to_vec(), b"(2,)".to_vec()]);
        assert_eq!(
            outputs,
            vec![
                first.as_str().as_bytes().to_vec(),
                second.as_str().as_bytes().to_vec()
            ]
        );
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let (cache, store) = cache().await;
        store.set_fail_on_set(true).await;

        let result = cache.store("x").await;
        assert!(matches!(result, Err(CacheError::Store(_))));
    }

    #[tokio::test]
    async fn test_second_cache_clears_first() {
        let store = Arc::new(MockStoreClient::new());
        let first = Cache::new(store.clone()).await.unwrap();
        let key = first.store("value").await.unwrap();

        let _second = Cache::new(store.clone()).await.unwrap();

        assert_eq!(first.get(&key).await.unwrap(), None);
        assert!(!store.exists("Cache.store").await.unwrap());
        assert!(!store.exists("Cache.store:inputs").await.unwrap());
    }
}

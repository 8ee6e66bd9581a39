//! Mock store client for testing.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::interfaces::{Result, StoreClient, StoreError};

/// A stored entry: either a scalar value or a list.
#[derive(Debug, Clone)]
enum Entry {
    Value(Vec<u8>),
    List(Vec<Vec<u8>>),
}

/// Mock store client that keeps keys in memory.
///
/// Mirrors the Redis semantics the cache relies on: `incr` creates at zero,
/// `rpush` creates the list, `lrange` accepts negative indices, and list
/// commands against scalar keys fail with [`StoreError::WrongType`].
#[derive(Default)]
pub struct MockStoreClient {
    entries: RwLock<HashMap<String, Entry>>,
    disconnected: RwLock<bool>,
    fail_on_set: RwLock<bool>,
    fail_on_incr: RwLock<bool>,
    fail_on_rpush: RwLock<bool>,
}

impl MockStoreClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate losing or regaining the connection.
    ///
    /// While disconnected `is_connected` reports false and every command
    /// fails with [`StoreError::Unavailable`].
    pub async fn set_connected(&self, connected: bool) {
        *self.disconnected.write().await = !connected;
    }

    pub async fn set_fail_on_set(&self, fail: bool) {
        *self.fail_on_set.write().await = fail;
    }

    pub async fn set_fail_on_incr(&self, fail: bool) {
        *self.fail_on_incr.write().await = fail;
    }

    pub async fn set_fail_on_rpush(&self, fail: bool) {
        *self.fail_on_rpush.write().await = fail;
    }

    /// Number of keys currently held.
    pub async fn key_count(&self) -> usize {
        self.entries.read().await.len()
    }

    async fn ensure_connected(&self) -> Result<()> {
        if *self.disconnected.read().await {
            return Err(StoreError::Unavailable("mock store disconnected".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl StoreClient for MockStoreClient {
    async fn set(&self, key: &str, value: &[u8]) -> Result<()> {
        self.ensure_connected().await?;
        if *self.fail_on_set.read().await {
            return Err(StoreError::Unavailable("set failed".to_string()));
        }
        self.entries
            .write()
            .await
            .insert(key.to_string(), Entry::Value(value.to_vec()));
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        self.ensure_connected().await?;
        match self.entries.read().await.get(key) {
            Some(Entry::Value(v)) => Ok(Some(v.clone())),
            Some(Entry::List(_)) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
            None => Ok(None),
        }
    }

    async fn incr(&self, key: &str) -> Result<i64> {
        self.ensure_connected().await?;
        if *self.fail_on_incr.read().await {
            return Err(StoreError::Unavailable("incr failed".to_string()));
        }
        let mut entries = self.entries.write().await;
        let current = match entries.get(key) {
            None => 0,
            Some(Entry::Value(v)) => std::str::from_utf8(v)
                .ok()
                .and_then(|s| s.parse::<i64>().ok())
                .ok_or_else(|| StoreError::NotAnInteger {
                    key: key.to_string(),
                })?,
            Some(Entry::List(_)) => {
                return Err(StoreError::WrongType {
                    key: key.to_string(),
                })
            }
        };
        let next = current + 1;
        entries.insert(key.to_string(), Entry::Value(next.to_string().into_bytes()));
        Ok(next)
    }

    async fn rpush(&self, key: &str, value: &[u8]) -> Result<usize> {
        self.ensure_connected().await?;
        if *self.fail_on_rpush.read().await {
            return Err(StoreError::Unavailable("rpush failed".to_string()));
        }
        let mut entries = self.entries.write().await;
        match entries
            .entry(key.to_string())
            .or_insert_with(|| Entry::List(Vec::new()))
        {
            Entry::List(items) => {
                items.push(value.to_vec());
                Ok(items.len())
            }
            Entry::Value(_) => Err(StoreError::WrongType {
                key: key.to_string(),
            }),
        }
    }

    async fn lrange(&self, key: &str, start: isize, stop: isize) -> Result<Vec<Vec<u8>>> {
        self.ensure_connected().await?;
        let entries = self.entries.read().await;
        let items = match entries.get(key) {
            None => return Ok(Vec::new()),
            Some(Entry::List(items)) => items,
            Some(Entry::Value(_)) => {
                return Err(StoreError::WrongType {
                    key: key.to_string(),
                })
            }
        };

        let len = items.len() as isize;
        let start = if start < 0 { (start + len).max(0) } else { start };
        let stop = if stop < 0 { stop + len } else { stop.min(len - 1) };
        if start > stop || start >= len {
            return Ok(Vec::new());
        }
        Ok(items[start as usize..=stop as usize].to_vec())
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        self.ensure_connected().await?;
        Ok(self.entries.read().await.contains_key(key))
    }

    async fn flushdb(&self) -> Result<()> {
        self.ensure_connected().await?;
        self.entries.write().await.clear();
        Ok(())
    }

    async fn is_connected(&self) -> bool {
        !*self.disconnected.read().await
    }
}

//! Redis store client.

mod store_client;

pub use store_client::RedisStoreClient;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::StoreClient;

    // Integration tests require Redis running
    // Run with: cargo test -- --ignored

    #[tokio::test]
    #[ignore]
    async fn test_redis_store_client() {
        let client = RedisStoreClient::new("redis://localhost:6379")
            .await
            .expect("Failed to connect to Redis");

        assert!(client.is_connected().await);

        let key = format!("test:{}", uuid::Uuid::new_v4());
        client.set(&key, b"value").await.expect("Failed to set");
        assert_eq!(
            client.get(&key).await.expect("Failed to get"),
            Some(b"value".to_vec())
        );
        assert!(client.exists(&key).await.expect("Failed to check key"));
    }
}

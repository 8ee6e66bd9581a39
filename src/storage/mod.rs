//! Store client implementations.

#[cfg(feature = "redis")]
pub mod redis;

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;

#[cfg(feature = "redis")]
pub use self::redis::RedisStoreClient;

#[cfg(any(test, feature = "test-utils"))]
pub use mock::MockStoreClient;

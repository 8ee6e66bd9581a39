//! Abstract interfaces for tally-cache components.
//!
//! These traits define the contracts for:
//! - The external key-value store (counters, lists, scalar values)

pub mod store_client;

pub use store_client::{Result, StoreClient, StoreError};

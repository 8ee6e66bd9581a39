//! Call counting advice.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{Operation, OperationName};
use crate::interfaces::{Result, StoreClient};

/// Wrapper that counts every call of an operation in the store.
///
/// The counter lives at the operation's [`OperationName::counter_key`] and is
/// incremented before the wrapped operation runs. An unreachable store or a
/// failed increment never reaches the caller; the call goes ahead uncounted.
///
/// # Example
///
/// ```ignore
/// let op = CountCalls::new(StoreValue::new(client.clone()), client);
/// ```
pub struct CountCalls<O> {
    inner: O,
    client: Arc<dyn StoreClient>,
}

impl<O> CountCalls<O> {
    /// Wrap an operation with call counting.
    ///
    /// # Arguments
    /// * `inner` - The operation to wrap
    /// * `client` - Store holding the counter
    pub fn new(inner: O, client: Arc<dyn StoreClient>) -> Self {
        Self { inner, client }
    }
}

#[async_trait]
impl<O: Operation> Operation for CountCalls<O> {
    type Input = O::Input;
    type Output = O::Output;

    fn name(&self) -> &OperationName {
        self.inner.name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let name = self.inner.name();

        if self.client.is_connected().await {
            match self.client.incr(name.counter_key()).await {
                Ok(count) => debug!(operation = %name, count = count, "Counted call"),
                Err(e) => warn!(operation = %name, error = %e, "Failed to count call"),
            }
        } else {
            debug!(operation = %name, "Store unavailable, call not counted");
        }

        self.inner.call(input).await
    }
}

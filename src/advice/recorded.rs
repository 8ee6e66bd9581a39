//! Call history advice.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::{CallArgs, Operation, OperationName};
use crate::interfaces::{Result, StoreClient};

/// Wrapper that records every call's inputs and outputs in the store.
///
/// Before delegating, the rendered argument tuple is appended to
/// `<name>:inputs`; after the wrapped operation returns, the `Display` of its
/// result is appended to `<name>:outputs`. A failed call leaves its input
/// without a matching output. Recording is skipped entirely when the store is
/// unreachable or the input cannot be appended.
///
/// Stack this outside [`CountCalls`](super::CountCalls) so one logical call
/// yields one increment and one input/output pair, in invocation order.
pub struct RecordCalls<O> {
    inner: O,
    client: Arc<dyn StoreClient>,
}

impl<O> RecordCalls<O> {
    /// Wrap an operation with call history recording.
    ///
    /// # Arguments
    /// * `inner` - The operation to wrap
    /// * `client` - Store holding the history lists
    pub fn new(inner: O, client: Arc<dyn StoreClient>) -> Self {
        Self { inner, client }
    }
}

#[async_trait]
impl<O: Operation> Operation for RecordCalls<O> {
    type Input = O::Input;
    type Output = O::Output;

    fn name(&self) -> &OperationName {
        self.inner.name()
    }

    async fn call(&self, input: Self::Input) -> Result<Self::Output> {
        let name = self.inner.name();

        if !self.client.is_connected().await {
            debug!(operation = %name, "Store unavailable, call not recorded");
            return self.inner.call(input).await;
        }

        let rendered = input.render();
        if let Err(e) = self
            .client
            .rpush(&name.inputs_key(), rendered.as_bytes())
            .await
        {
            warn!(operation = %name, error = %e, "Failed to record call input");
            return self.inner.call(input).await;
        }

        let output = self.inner.call(input).await?;

        let rendered_output = output.to_string();
        match self
            .client
            .rpush(&name.outputs_key(), rendered_output.as_bytes())
            .await
        {
            Ok(len) => debug!(operation = %name, calls = len, "Recorded call"),
            Err(e) => warn!(operation = %name, error = %e, "Failed to record call output"),
        }

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advice::test_ops::Echo;
    use crate::advice::OperationExt;
    use crate::codec::StoredValue;
    use crate::storage::MockStoreClient;

    #[tokio::test]
    async fn test_recorded_appends_inputs_and_outputs() {
        let store = Arc::new(MockStoreClient::new());
        let op = RecordCalls::new(Echo::new("Echo.call"), store.clone());

        op.call(StoredValue::from("a")).await.unwrap();
        op.call(StoredValue::from(7)).await.unwrap();

        let inputs = store.lrange("Echo.call:inputs", 0, -1).await.unwrap();
        let outputs = store.lrange("Echo.call:outputs", 0, -1).await.unwrap();
        assert_eq!(inputs, vec![b"('a',)".to_vec(), b"(7,)".to_vec()]);
        assert_eq!(outputs, vec![b"echo:'a'".to_vec(), b"echo:7".to_vec()]);
    }

    #[tokio::test]
    async fn test_recorded_skips_when_disconnected() {
        let store = Arc::new(MockStoreClient::new());
        store.set_connected(false).await;
        let op = RecordCalls::new(Echo::new("Echo.call"), store.clone());

        assert_eq!(op.call(StoredValue::from(1)).await.unwrap(), "echo:1");

        store.set_connected(true).await;
        assert_eq!(store.key_count().await, 0);
    }

    #[tokio::test]
    async fn test_recorded_failed_call_leaves_unmatched_input() {
        let store = Arc::new(MockStoreClient::new());
        let op = RecordCalls::new(Echo::failing("Echo.call"), store.clone());

        assert!(op.call(StoredValue::from(1)).await.is_err());

        assert_eq!(store.lrange("Echo.call:inputs", 0, -1).await.unwrap().len(), 1);
        assert!(!store.exists("Echo.call:outputs").await.unwrap());
    }

    #[tokio::test]
    async fn test_recorded_skips_when_input_push_fails() {
        let store = Arc::new(MockStoreClient::new());
        store.set_fail_on_rpush(true).await;
        let op = RecordCalls::new(Echo::new("Echo.call"), store.clone());

        assert_eq!(op.call(StoredValue::from(1)).await.unwrap(), "echo:1");
        assert_eq!(store.key_count().await, 0);
    }

    #[tokio::test]
    async fn test_recorder_outside_counter() {
        let store = Arc::new(MockStoreClient::new());
        let op = Echo::new("Echo.call")
            .counted(store.clone())
            .recorded(store.clone());

        for v in ["x", "y", "z"] {
            op.call(StoredValue::from(v)).await.unwrap();
        }

        assert_eq!(op.name().as_str(), "Echo.call");
        assert_eq!(store.get("Echo.call").await.unwrap(), Some(b"3".to_vec()));
        assert_eq!(store.lrange("Echo.call:inputs", 0, -1).await.unwrap().len(), 3);
        assert_eq!(store.lrange("Echo.call:outputs", 0, -1).await.unwrap().len(), 3);
    }
}

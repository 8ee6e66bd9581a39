//! Named operations and their argument rendering.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use super::{CountCalls, RecordCalls};
use crate::codec::StoredValue;
use crate::interfaces::{Result, StoreClient};

/// Qualified name of a wrapped operation, e.g. `Cache.store`.
///
/// Used as the key prefix for the operation's counter and history lists, so
/// it must stay stable across calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OperationName(Cow<'static, str>);

impl OperationName {
    pub const fn from_static(name: &'static str) -> Self {
        Self(Cow::Borrowed(name))
    }

    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key of the call counter.
    pub fn counter_key(&self) -> &str {
        &self.0
    }

    /// Key of the list of rendered inputs.
    pub fn inputs_key(&self) -> String {
        format!("{}:inputs", self.0)
    }

    /// Key of the list of rendered outputs.
    pub fn outputs_key(&self) -> String {
        format!("{}:outputs", self.0)
    }
}

impl fmt::Display for OperationName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Positional arguments of a call, as written to call history.
pub trait CallArgs {
    /// One rendered entry per positional argument.
    fn args(&self) -> Vec<String>;

    /// The arguments as a tuple literal, e.g. `('hello',)`.
    fn render(&self) -> String {
        render_tuple(&self.args())
    }
}

impl CallArgs for StoredValue {
    fn args(&self) -> Vec<String> {
        vec![self.repr()]
    }
}

impl CallArgs for () {
    fn args(&self) -> Vec<String> {
        Vec::new()
    }
}

/// Render items as a tuple literal: `()`, `(a,)`, `(a, b)`.
pub fn render_tuple(items: &[String]) -> String {
    match items {
        [] => "()".to_string(),
        [only] => format!("({only},)"),
        many => format!("({})", many.join(", ")),
    }
}

/// A named storage operation that advice can wrap.
///
/// Wrappers implement this trait themselves, so advice layers stack by plain
/// composition and the outermost layer is called like the bare operation.
#[async_trait]
pub trait Operation: Send + Sync {
    type Input: CallArgs + Send + 'static;
    type Output: fmt::Display + Send + 'static;

    fn name(&self) -> &OperationName;

    async fn call(&self, input: Self::Input) -> Result<Self::Output>;
}

/// Builder methods for stacking advice on an [`Operation`].
pub trait OperationExt: Operation + Sized {
    /// Count every call in the store.
    fn counted(self, client: Arc<dyn StoreClient>) -> CountCalls<Self> {
        CountCalls::new(self, client)
    }

    /// Record every call's inputs and outputs in the store.
    fn recorded(self, client: Arc<dyn StoreClient>) -> RecordCalls<Self> {
        RecordCalls::new(self, client)
    }
}

impl<O: Operation> OperationExt for O {}

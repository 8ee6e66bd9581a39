//! Aspect-oriented advice for cross-cutting concerns.
//!
//! This module provides wrapper types that add orthogonal behavior
//! (call counting, call history) without polluting the wrapped operation.
//!
//! # Architecture
//!
//! Advice is applied at composition time, not in implementations:
//!
//! ```ignore
//! // Core operation - pure storage logic
//! let op = StoreValue::new(client.clone());
//!
//! // Apply advice layers; the recorder must sit outside the counter
//! let op = op.counted(client.clone()).recorded(client);
//!
//! // Use as normal - instrumentation is transparent
//! let key = op.call(StoredValue::from("hello")).await?;
//! ```
//!
//! Both layers keep their state in the store under keys derived from the
//! [`OperationName`]: the counter at `<name>`, history at `<name>:inputs` and
//! `<name>:outputs`. When the store is unreachable they step aside and the
//! wrapped operation runs uninstrumented.
//!
//! # Available Advice
//!
//! - [`CountCalls`] - Increments a per-operation call counter
//! - [`RecordCalls`] - Appends rendered inputs and outputs to history lists

mod counted;
mod operation;
mod recorded;

pub use counted::CountCalls;
pub use operation::{render_tuple, CallArgs, Operation, OperationExt, OperationName};
pub use recorded::RecordCalls;

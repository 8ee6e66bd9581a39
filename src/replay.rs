//! Call history replay.
//!
//! Reads back the counter and history lists that the advice layers keep for
//! an operation and renders them as:
//!
//! ```text
//! Cache.store was called 2 times:
//! Cache.store(*('foo',)) -> 4c1d…
//! Cache.store(*(42,)) -> 9a07…
//! ```

use std::fmt;
use std::io::Write;

use tracing::debug;

use crate::advice::OperationName;
use crate::cache::{Cache, Result};
use crate::codec;

/// Snapshot of an operation's call count and input/output history.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Replay {
    name: OperationName,
    count: i64,
    calls: Vec<(String, String)>,
}

impl Replay {
    /// Load the history of `name` from the cache's store.
    ///
    /// Returns `None` when the store is unreachable. A missing counter reads
    /// as zero. Inputs and outputs are paired by position; entries beyond the
    /// shorter list are dropped.
    pub async fn load(cache: &Cache, name: &OperationName) -> Result<Option<Self>> {
        let client = cache.client();
        if !client.is_connected().await {
            debug!(operation = %name, "Store unavailable, nothing to replay");
            return Ok(None);
        }

        let count = if client.exists(name.counter_key()).await? {
            match client.get(name.counter_key()).await? {
                Some(raw) => codec::decode_int(raw)?,
                None => 0,
            }
        } else {
            0
        };

        let inputs = client.lrange(&name.inputs_key(), 0, -1).await?;
        let outputs = client.lrange(&name.outputs_key(), 0, -1).await?;

        let calls = inputs
            .iter()
            .zip(outputs.iter())
            .map(|(input, output)| {
                (
                    String::from_utf8_lossy(input).into_owned(),
                    String::from_utf8_lossy(output).into_owned(),
                )
            })
            .collect();

        Ok(Some(Self {
            name: name.clone(),
            count,
            calls,
        }))
    }

    pub fn name(&self) -> &OperationName {
        &self.name
    }

    /// Value of the call counter.
    pub fn count(&self) -> i64 {
        self.count
    }

    /// Recorded `(input, output)` pairs in call order.
    pub fn calls(&self) -> &[(String, String)] {
        &self.calls
    }
}

impl fmt::Display for Replay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} was called {} times:", self.name, self.count)?;
        for (input, output) in &self.calls {
            write!(f, "\n{}(*{}) -> {}", self.name, input, output)?;
        }
        Ok(())
    }
}

/// Write the replay of `name` to `out`, one line per entry.
///
/// Writes nothing when the store is unreachable.
pub async fn replay_to<W: Write>(cache: &Cache, name: &OperationName, out: &mut W) -> Result<()> {
    if let Some(replay) = Replay::load(cache, name).await? {
        writeln!(out, "{replay}")?;
    }
    Ok(())
}

/// Print the replay of `name` to stdout.
pub async fn replay(cache: &Cache, name: &OperationName) -> Result<()> {
    if let Some(replay) = Replay::load(cache, name).await? {
        println!("{replay}");
    }
    Ok(())
}

//! tally-cache: store values and replay the call history
//!
//! Stores each command-line argument in the cache, prints the generated key
//! with the value read back, then prints the replay of `Cache.store`.
//!
//! Arguments that parse as integers are stored as integers, then floats,
//! otherwise text.
//!
//! ## Configuration
//! - TALLY_CONFIG: Path to a YAML config file (optional)
//! - TALLY__STORE__URI: Redis URI (default: redis://127.0.0.1:6379)
//! - TALLY_LOG: Log filter (default: info)
//!
//! The configured Redis database is flushed on startup.

use tracing::info;

use tally_cache::config::Config;
use tally_cache::utils::bootstrap::init_tracing;
use tally_cache::{replay, Cache, Key, StoredValue};

fn parse_value(arg: &str) -> StoredValue {
    if let Ok(i) = arg.parse::<i64>() {
        StoredValue::Integer(i)
    } else if let Ok(f) = arg.parse::<f64>() {
        StoredValue::Float(f)
    } else {
        StoredValue::Text(arg.to_string())
    }
}

async fn read_back(cache: &Cache, key: &Key, value: &StoredValue) -> tally_cache::Result<String> {
    let text = match value {
        StoredValue::Integer(_) => cache.get_int(key).await?.map(|i| i.to_string()),
        StoredValue::Float(_) => cache.get_float(key).await?.map(|f| f.to_string()),
        _ => cache.get_str(key).await?,
    };
    Ok(text.unwrap_or_else(|| "<absent>".to_string()))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let config = Config::load(None)?;
    let cache = Cache::connect(&config.store).await?;

    info!(uri = %config.store.uri, "tally-cache started");

    for arg in std::env::args().skip(1) {
        let value = parse_value(&arg);
        let key = cache.store(value.clone()).await?;
        println!("{key} = {}", read_back(&cache, &key, &value).await?);
    }

    replay(&cache, &Cache::STORE).await?;

    Ok(())
}

//! Local key-value storage abstraction

use anyhow::Result;

/// Byte-oriented key-value storage. Writes replace the whole value.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put(&self, key: &str, value: &[u8]) -> Result<()>;
}

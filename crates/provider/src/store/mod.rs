mod fs;

use std::collections::BTreeSet;

pub use self::fs::FileKeyValueStore;
use crate::Result;

/// A crash-safe key-value store private to one provider.
pub trait KeyValueStore: Send {
    fn get_string_set(&self, key: &str) -> Result<Option<BTreeSet<String>>>;

    /// Replaces the value of `key` and persists it before returning.
    fn put_string_set(&mut self, key: &str, values: &BTreeSet<String>) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;

    /// Picks up changes written by other processes.
    ///
    /// Returns `true` if the stored values may differ from what was seen before.
    fn reload(&mut self) -> Result<bool> { Ok(false) }
}

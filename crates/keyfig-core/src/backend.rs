//! Backing store trait for the settings façade
//!
//! The `SettingsBackend` trait provides an abstraction over the backing
//! key-value store, allowing different implementations for in-process
//! (memory-backed) and remote (Redis-backed) deployments.

use async_trait::async_trait;
use std::collections::HashMap;

use crate::Result;

/// A settings snapshot: a mapping from key to value. Insertion order is
/// irrelevant; keys are unique within a namespace.
pub type Settings = HashMap<String, String>;

/// Backing key-value store trait
///
/// Implementations:
/// - `MemoryBackend`: in-process HashMap (always available, used by tests)
/// - `RedisBackend`: Redis-backed store, namespace bound at connect time
///
/// All values are flat strings; callers serialize structured values before
/// writing and deserialize after reading.
#[async_trait]
pub trait SettingsBackend: Send + Sync {
    /// Read one key.
    ///
    /// # Returns
    /// `Ok(None)` if the key does not exist; a missing key is never an error.
    ///
    /// # Errors
    /// - `Error::KeyOperation` if the round trip fails
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write `key = value`, replacing any existing value.
    ///
    /// # Errors
    /// - `Error::KeyOperation` if the round trip fails
    async fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Write `key = value` only if the key does not exist yet.
    ///
    /// # Returns
    /// `true` if the value was written, `false` if the key already existed
    /// and was left untouched.
    ///
    /// # Errors
    /// - `Error::KeyOperation` if the round trip fails
    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool>;

    /// Enumerate keys matching `pattern` in the bound namespace.
    ///
    /// Pattern `*` means every key. Order is unspecified.
    ///
    /// # Errors
    /// - `Error::Connection` if enumeration fails
    async fn keys(&self, pattern: &str) -> Result<Vec<String>>;
}

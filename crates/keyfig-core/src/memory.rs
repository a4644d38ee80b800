//! In-process SettingsBackend implementation
//!
//! `MemoryBackend` keeps the namespace in a mutexed HashMap. It is the
//! always-available backend: tests run against it without any external
//! store, and embedders can use it when durability is not needed.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::{Result, backend::SettingsBackend};

/// HashMap-backed settings store
#[derive(Debug, Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the backend directly, bypassing the façade. Used by tests to
    /// model state written by a prior run or another process.
    pub fn insert_raw(&self, key: impl Into<String>, value: impl Into<String>) {
        self.entries
            .lock()
            .expect("memory backend lock poisoned")
            .insert(key.into(), value.into());
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .expect("memory backend lock poisoned")
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Minimal glob matching: `*` matches everything, a trailing `*` matches by
/// prefix, anything else is an exact match.
fn matches_pattern(pattern: &str, key: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    match pattern.strip_suffix('*') {
        Some(prefix) => key.starts_with(prefix),
        None => key == pattern,
    }
}

#[async_trait]
impl SettingsBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.lock().expect("memory backend lock poisoned");
        Ok(entries.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.entries.lock().expect("memory backend lock poisoned");
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn set_if_absent(&self, key: &str, value: &str) -> Result<bool> {
        let mut entries = self.entries.lock().expect("memory backend lock poisoned");
        if entries.contains_key(key) {
            return Ok(false);
        }
        entries.insert(key.to_string(), value.to_string());
        Ok(true)
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>> {
        let entries = self.entries.lock().expect("memory backend lock poisoned");
        Ok(entries
            .keys()
            .filter(|k| matches_pattern(pattern, k))
            .cloned()
            .collect())
    }
}

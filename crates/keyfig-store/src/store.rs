//! SettingsStore - the configuration store façade
//!
//! Seeds, reads, and mutates string-valued settings in one namespace of a
//! backing key-value store. Bulk operations fan out one request per key and
//! join on all of them before completing; per-key failures are collected and
//! surfaced as an aggregate error rather than dropped. Every mutation also
//! publishes a completion event for multi-listener callers.

use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, error};

use keyfig_core::{Error, EventStream, KeyFailure, Result, Settings, SettingsBackend, StoreEvent};

use crate::event_bus::EventBus;

/// Settings store façade over a `SettingsBackend`
///
/// The store holds no mutable state beyond the backend handle and the
/// subscriber list: it is not a cache, and every read consults the backing
/// store directly.
pub struct SettingsStore {
    backend: Arc<dyn SettingsBackend>,
    events: EventBus,
}

fn key_failure(key: &str, err: Error) -> KeyFailure {
    // Unwrap the per-key variant so the aggregate message doesn't nest
    // "failed for 'k'" twice.
    let message = match err {
        Error::KeyOperation { message, .. } => message,
        other => other.to_string(),
    };
    KeyFailure {
        key: key.to_string(),
        message,
    }
}

impl SettingsStore {
    /// Wrap a backend. The backend is already bound to its namespace.
    pub fn new(backend: Arc<dyn SettingsBackend>) -> Self {
        Self {
            backend,
            events: EventBus::new(),
        }
    }

    /// Subscribe to completion events (`initialized`, `set:<key>`, `mset`).
    ///
    /// Every subscriber receives every event published after the call.
    /// Mutation methods also return their outcome directly, so subscribing
    /// is only needed for the multi-listener style.
    pub fn subscribe(&self) -> EventStream {
        self.events.subscribe()
    }

    /// Seed the namespace with default settings.
    ///
    /// Each key is written only if it is absent from the store; a key that
    /// already exists keeps its current value, whatever the snapshot says.
    /// All keys are processed concurrently and the call completes only after
    /// every key has been handled. On completion a single `initialized`
    /// event is published carrying the input snapshot.
    ///
    /// # Errors
    /// - `Error::Bulk` if any per-key operation failed; writes that did
    ///   succeed stay applied (no rollback)
    pub async fn init(&self, settings: Settings) -> Result<Settings> {
        debug!(keys = settings.len(), "Seeding settings");
        let failures = self.write_all(&settings, false).await;
        self.finish_bulk(failures, settings, |settings, error| {
            StoreEvent::Initialized { settings, error }
        })
    }

    /// Unconditionally write `key = value`, replacing any existing value.
    ///
    /// Always publishes a `set:<key>` event once the write completes; the
    /// event's error field is `None` on success so subscribers can tell the
    /// outcomes apart without a second channel.
    pub async fn set(&self, key: &str, value: &str) -> Result<()> {
        let result = self.backend.set(key, value).await;
        if let Err(e) = &result {
            error!(key, error = %e, "Set failed");
        }
        self.events.publish(StoreEvent::Set {
            key: key.to_string(),
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }

    /// Unconditionally write every key in `changes`, concurrently, replacing
    /// existing values. Publishes a single `mset` event once every key has
    /// been written.
    ///
    /// # Errors
    /// - `Error::Bulk` if any per-key write failed; the rest stay applied
    pub async fn multi_set(&self, changes: Settings) -> Result<Settings> {
        debug!(keys = changes.len(), "Bulk-writing settings");
        let failures = self.write_all(&changes, true).await;
        self.finish_bulk(failures, changes, |applied, error| StoreEvent::MultiSet {
            applied,
            error,
        })
    }

    /// Read one key.
    ///
    /// Resolves to `Ok(None)` if the key does not exist; a missing key is
    /// never an error.
    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.backend.get(key).await
    }

    /// Read one key, additionally delivering the outcome to a completion
    /// callback in the `(error, value)` convention.
    ///
    /// The callback fires exactly once, with the same outcome the returned
    /// future resolves to.
    pub async fn get_with<F>(&self, key: &str, callback: F) -> Result<Option<String>>
    where
        F: FnOnce(Option<&Error>, Option<&str>),
    {
        let result = self.get(key).await;
        match &result {
            Ok(value) => callback(None, value.as_deref()),
            Err(err) => callback(Some(err), None),
        }
        result
    }

    /// Read every key currently in the namespace into a snapshot.
    ///
    /// Enumerates keys, then reads each one concurrently. A key that
    /// disappears between enumeration and read is simply absent from the
    /// snapshot.
    ///
    /// # Errors
    /// - `Error::Connection` if key enumeration fails
    /// - `Error::Bulk` if any per-key read failed
    pub async fn get_all(&self) -> Result<Settings> {
        let keys = self.backend.keys("*").await?;
        debug!(keys = keys.len(), "Reading all settings");

        let reads: Vec<_> = keys
            .into_iter()
            .map(|key| {
                let backend = Arc::clone(&self.backend);
                async move {
                    let result = backend.get(&key).await;
                    (key, result)
                }
            })
            .collect();

        let mut snapshot = Settings::new();
        let mut failures = Vec::new();
        for (key, result) in join_all(reads).await {
            match result {
                Ok(Some(value)) => {
                    snapshot.insert(key, value);
                }
                Ok(None) => {}
                Err(e) => failures.push(key_failure(&key, e)),
            }
        }

        if failures.is_empty() {
            Ok(snapshot)
        } else {
            Err(Error::Bulk { failures })
        }
    }

    /// `get_all` with an additional `(error, snapshot)` completion callback,
    /// mirroring `get_with`.
    pub async fn get_all_with<F>(&self, callback: F) -> Result<Settings>
    where
        F: FnOnce(Option<&Error>, Option<&Settings>),
    {
        let result = self.get_all().await;
        match &result {
            Ok(snapshot) => callback(None, Some(snapshot)),
            Err(err) => callback(Some(err), None),
        }
        result
    }

    /// Fan out one write per key and join on all of them, collecting
    /// per-key failures. `overwrite` selects plain set vs. set-if-absent.
    async fn write_all(&self, snapshot: &Settings, overwrite: bool) -> Vec<KeyFailure> {
        let writes: Vec<_> = snapshot
            .iter()
            .map(|(key, value)| {
                let backend = Arc::clone(&self.backend);
                async move {
                    let result = if overwrite {
                        backend.set(key, value).await
                    } else {
                        backend.set_if_absent(key, value).await.map(|_| ())
                    };
                    result.err().map(|e| key_failure(key, e))
                }
            })
            .collect();

        join_all(writes).await.into_iter().flatten().collect()
    }

    /// Shared completion path for bulk mutations: publish exactly one event
    /// (with an error indicator when anything failed) and translate the
    /// collected failures into the aggregate result.
    fn finish_bulk<F>(
        &self,
        failures: Vec<KeyFailure>,
        snapshot: Settings,
        make_event: F,
    ) -> Result<Settings>
    where
        F: FnOnce(Settings, Option<String>) -> StoreEvent,
    {
        if failures.is_empty() {
            self.events.publish(make_event(snapshot.clone(), None));
            Ok(snapshot)
        } else {
            error!(failed = failures.len(), "Bulk operation failed");
            let err = Error::Bulk { failures };
            self.events
                .publish(make_event(snapshot, Some(err.to_string())));
            Err(err)
        }
    }
}

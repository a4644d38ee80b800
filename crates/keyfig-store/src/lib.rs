//! Keyfig Store - the settings store façade
//!
//! `SettingsStore` presents a namespace of string-valued settings held in a
//! backing key-value store: seed-initialization, per-key and bulk mutation,
//! single-key and enumerate-all reads, and a subscribable completion-event
//! channel. The store holds no cache; every read is a backing-store round
//! trip, so a read always reflects the latest completed write visible on the
//! connection.

mod event_bus;
mod store;

pub use store::SettingsStore;

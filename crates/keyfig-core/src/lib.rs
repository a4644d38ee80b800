//! Keyfig Core Types and Traits
//!
//! This crate provides the fundamental types and traits used throughout Keyfig:
//! - The `SettingsBackend` trait abstracting the backing key-value store
//! - Settings snapshot and event payload types
//! - Core error types

pub mod backend;
pub mod error;
pub mod events;
pub mod memory;

pub use backend::{Settings, SettingsBackend};
pub use error::{Error, KeyFailure, Result};
pub use events::{EventStream, StoreEvent};
pub use memory::MemoryBackend;

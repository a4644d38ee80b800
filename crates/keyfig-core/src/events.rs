//! Completion event types for store operations

use futures::stream::BoxStream;
use serde::{Deserialize, Serialize};

use crate::backend::Settings;

/// Type alias for store event streams
pub type EventStream = BoxStream<'static, StoreEvent>;

/// Completion notification for a store operation
///
/// Every mutation publishes exactly one event once all of its writes have
/// completed. Bulk events fire only after the fan-in barrier: no subscriber
/// ever observes the notification while some of the keys are still pending.
/// `error` is `None` on full success and carries the aggregate failure
/// message otherwise, so a failed bulk operation never looks like a success.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StoreEvent {
    /// Seeding completed; carries the input snapshot as supplied by the
    /// caller, not the post-merge store contents.
    Initialized {
        settings: Settings,
        error: Option<String>,
    },

    /// A single-key write completed.
    Set { key: String, error: Option<String> },

    /// A bulk write completed; carries the snapshot that was applied.
    MultiSet {
        applied: Settings,
        error: Option<String>,
    },
}

impl StoreEvent {
    /// The wire-style event name: `initialized`, `set:<key>`, or `mset`.
    pub fn name(&self) -> String {
        match self {
            Self::Initialized { .. } => "initialized".to_string(),
            Self::Set { key, .. } => format!("set:{}", key),
            Self::MultiSet { .. } => "mset".to_string(),
        }
    }

    /// Whether the operation completed without any failure.
    pub fn is_success(&self) -> bool {
        match self {
            Self::Initialized { error, .. } => error.is_none(),
            Self::Set { error, .. } => error.is_none(),
            Self::MultiSet { error, .. } => error.is_none(),
        }
    }
}

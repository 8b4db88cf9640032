//! Notifications emitted by the tab manager.
//!
//! The shell around the tab area (sidebar highlighting, window chrome,
//! external automation sinks) subscribes to these via
//! [`crate::tab::TabManager::on_event`]. The enum is serde-tagged so sinks
//! that forward events out of process can serialize them as JSON directly.

use crate::tab::TabId;
use serde::{Deserialize, Serialize};

/// A tab lifecycle notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TabEvent {
    /// A tab became the active tab.
    Activated {
        /// Id of the newly active tab.
        id: TabId,
        /// Display title of the newly active tab.
        title: String,
    },
    /// A tab was closed (user action or LRU eviction).
    Closed {
        /// Id of the closed tab.
        id: TabId,
    },
}

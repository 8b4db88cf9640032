//! Tab lifecycle for the workspace shell.
//!
//! This module provides the core tab infrastructure:
//! - `Tab`: one open workspace bound to a route, with its load state
//! - `TabRegistry`: display-ordered bookkeeping plus the recency ledger
//! - `TabManager`: coordinates open/close/activate/evict and content loads
//! - `TabId`: stable identifier of the underlying route/menu entry

mod manager;
mod registry;

pub use manager::TabManager;
pub use registry::TabRegistry;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;

/// Stable identifier of a tab, unique across open tabs.
///
/// Ids come from the menu/route catalog the shell navigates, not from a
/// counter: reopening the same menu entry reuses the same id, which is what
/// makes `open` idempotent per entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(String);

impl TabId {
    /// The id as a plain string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TabId {
    fn from(value: &str) -> Self {
        TabId(value.to_string())
    }
}

impl From<String> for TabId {
    fn from(value: String) -> Self {
        TabId(value)
    }
}

/// Content state of an open tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LoadState {
    /// The fragment fetch is still in flight; the panel shows a placeholder.
    #[default]
    Loading,
    /// The fragment arrived and its scripts were activated.
    Ready,
    /// The fragment fetch failed; the panel shows an inline error.
    ///
    /// Failed tabs stay open and activatable. They are never auto-closed,
    /// and plain activation does not re-fetch.
    Failed,
}

/// One open workspace.
///
/// Owned exclusively by the registry; the manager mutates it only through
/// registry lookups. `title` and `route` are fixed at open time
/// (first-write-wins), only the load fields change afterwards.
#[derive(Debug, Clone)]
pub struct Tab {
    /// Stable route/menu identifier.
    pub id: TabId,
    /// Display title, shown in the strip entry and the header.
    pub title: String,
    /// Fragment URL path this tab loads its content from.
    pub route: String,
    /// When the tab was opened. Informational only.
    pub opened_at: Instant,
    /// Current content state.
    pub load_state: LoadState,
    /// Processed fragment markup once `Ready`.
    pub content: Option<String>,
    /// Failure description once `Failed`.
    pub load_error: Option<String>,
    /// Token for the load issued at open time. A load result is applied
    /// only while the open tab still carries the matching token, which is
    /// what keeps a late result from a previous incarnation of the same id
    /// from writing into a reopened tab.
    pub(crate) generation: u64,
}

impl Tab {
    /// Create a freshly opened tab in the `Loading` state.
    pub fn new(id: TabId, title: &str, route: &str, generation: u64) -> Self {
        Self {
            id,
            title: title.to_string(),
            route: route.to_string(),
            opened_at: Instant::now(),
            load_state: LoadState::Loading,
            content: None,
            load_error: None,
            generation,
        }
    }

    /// Whether the fragment fetch is still in flight.
    pub fn is_loading(&self) -> bool {
        self.load_state == LoadState::Loading
    }

    /// Whether the tab's content settled successfully.
    pub fn is_ready(&self) -> bool {
        self.load_state == LoadState::Ready
    }

    /// Whether the tab's load failed.
    pub fn is_failed(&self) -> bool {
        self.load_state == LoadState::Failed
    }
}

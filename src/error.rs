//! Typed error types for the workspace shell.
//!
//! This module covers the tab lifecycle errors that callers at the crate
//! boundary may want to match on. Fragment loading has its own taxonomy in
//! [`crate::fragment::FragmentError`] because load failures are recovered
//! locally into the failing panel and never escalate through these variants.

use crate::tab::TabId;
use thiserror::Error;

/// Top-level error type for tab lifecycle operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ShellError {
    /// A tab with this id is already registered.
    ///
    /// The manager's open-idempotence rule means this should never surface;
    /// the registry still defends the invariant on direct insertion.
    #[error("tab '{id}' is already open")]
    DuplicateId {
        /// Id of the already-open tab.
        id: TabId,
    },

    /// The caller referenced a tab id that is not currently open.
    ///
    /// Recoverable. Bulk close operations and event-driven callers treat
    /// this as a no-op.
    #[error("tab '{id}' is not open")]
    NotOpen {
        /// Id the caller referenced.
        id: TabId,
    },

    /// The configured tab capacity is zero, so no tab can ever be opened.
    ///
    /// A configuration error, not a runtime condition to recover from.
    #[error("tab capacity is zero; no tab can be opened")]
    CapacityUnavailable,
}

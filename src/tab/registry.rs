//! Pure bookkeeping for open tabs: display order plus the recency ledger.
//!
//! The registry does no I/O and never touches the view projection. It owns
//! two orders over the same id set:
//! - display order: insertion order of the tab list, what the user sees
//!   left to right in the strip
//! - recency order: the ledger, least recently activated first
//!
//! Eviction consults recency order; "close to the right" consults display
//! order. The two are independent and must not be conflated.

use super::{Tab, TabId};
use crate::error::ShellError;

/// Display-ordered tab records plus the recency ledger.
///
/// Invariant: the ledger's id set equals the open-tab id set, with no
/// duplicates. Every mutation maintains it; [`TabRegistry::assert_consistent`]
/// checks it.
#[derive(Debug, Default)]
pub struct TabRegistry {
    /// Open tabs in display order.
    tabs: Vec<Tab>,
    /// Open tab ids ordered by last activation, most recent last.
    ledger: Vec<TabId>,
}

impl TabRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open tabs.
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Whether no tabs are open.
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }

    /// Whether a tab with this id is open.
    pub fn has(&self, id: &TabId) -> bool {
        self.tabs.iter().any(|t| &t.id == id)
    }

    /// Get an open tab by id.
    pub fn get(&self, id: &TabId) -> Option<&Tab> {
        self.tabs.iter().find(|t| &t.id == id)
    }

    /// Get a mutable reference to an open tab by id.
    pub fn get_mut(&mut self, id: &TabId) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| &t.id == id)
    }

    /// Iterate the open tabs in display order.
    pub fn iter(&self) -> impl Iterator<Item = &Tab> {
        self.tabs.iter()
    }

    /// Register a new tab at the end of the display order.
    ///
    /// The id also enters the ledger at the most-recently-used end, so the
    /// ledger and the tab set stay equal even before the first activation.
    pub fn insert(&mut self, tab: Tab) -> Result<(), ShellError> {
        if self.has(&tab.id) {
            return Err(ShellError::DuplicateId { id: tab.id.clone() });
        }
        self.ledger.push(tab.id.clone());
        self.tabs.push(tab);
        self.assert_consistent();
        Ok(())
    }

    /// Remove a tab, returning its record.
    pub fn remove(&mut self, id: &TabId) -> Option<Tab> {
        let idx = self.tabs.iter().position(|t| &t.id == id)?;
        let tab = self.tabs.remove(idx);
        self.ledger.retain(|entry| entry != id);
        self.assert_consistent();
        Some(tab)
    }

    /// Move an id to the most-recently-used end of the ledger.
    pub fn touch(&mut self, id: &TabId) -> Result<(), ShellError> {
        if !self.has(id) {
            return Err(ShellError::NotOpen { id: id.clone() });
        }
        self.ledger.retain(|entry| entry != id);
        self.ledger.push(id.clone());
        self.assert_consistent();
        Ok(())
    }

    /// The least recently used id, skipping `excluding` (the active tab is
    /// never the preferred eviction victim).
    ///
    /// When the excluded id is the only one open, it is returned anyway as
    /// the full-eviction fallback.
    pub fn least_recently_used(&self, excluding: Option<&TabId>) -> Option<TabId> {
        self.ledger
            .iter()
            .find(|id| Some(*id) != excluding)
            .or_else(|| self.ledger.first())
            .cloned()
    }

    /// The most recently activated id.
    pub fn most_recently_used(&self) -> Option<TabId> {
        self.ledger.last().cloned()
    }

    /// Open tab ids in display order.
    pub fn display_order(&self) -> Vec<TabId> {
        self.tabs.iter().map(|t| t.id.clone()).collect()
    }

    /// Ids positioned after `id` in display order.
    ///
    /// Returns an empty list when `id` is not open.
    pub fn ids_after(&self, id: &TabId) -> Vec<TabId> {
        self.tabs
            .iter()
            .skip_while(|t| &t.id != id)
            .skip(1)
            .map(|t| t.id.clone())
            .collect()
    }

    /// Open tab ids in recency order, least recently used first.
    pub fn recency_order(&self) -> Vec<TabId> {
        self.ledger.clone()
    }

    /// Check the ledger/tab-set invariant.
    ///
    /// An inconsistency is a programming error: panics under
    /// `debug_assertions`, logs and rebuilds the ledger from display order
    /// in release builds.
    pub fn assert_consistent(&mut self) {
        let consistent = self.ledger.len() == self.tabs.len()
            && self.tabs.iter().all(|t| self.ledger.contains(&t.id))
            && self
                .ledger
                .iter()
                .enumerate()
                .all(|(i, id)| !self.ledger[..i].contains(id));
        if consistent {
            return;
        }
        debug_assert!(
            false,
            "tab registry ledger diverged: tabs={:?} ledger={:?}",
            self.display_order(),
            self.ledger
        );
        log::error!(
            "tab registry ledger diverged ({} tabs, {} ledger entries); rebuilding from display order",
            self.tabs.len(),
            self.ledger.len()
        );
        self.ledger = self.tabs.iter().map(|t| t.id.clone()).collect();
    }
}

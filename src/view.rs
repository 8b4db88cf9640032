//! The shell's tab strip / content panel projection.
//!
//! [`ShellView`] is a derived cache of registry state: one strip entry and
//! one content panel per open tab, at most one of each marked active, plus
//! the header title. The registry stays authoritative; whenever the
//! projection could have drifted it can be thrown away and rebuilt via
//! [`crate::tab::TabManager::rebuild_view`].

use crate::i18n::Translator;
use crate::markup::escape_html;
use crate::tab::TabId;

/// One entry in the tab strip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripEntry {
    /// Id of the tab this entry belongs to.
    pub id: TabId,
    /// Label shown in the strip.
    pub title: String,
    /// Whether this entry carries the active marker.
    pub active: bool,
}

/// One content panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Panel {
    /// Id of the tab this panel belongs to.
    pub id: TabId,
    /// Current panel markup: loading placeholder, activated fragment, or
    /// inline error.
    pub markup: String,
    /// Whether this panel carries the active marker.
    pub active: bool,
}

/// Tab strip, content panels, and header title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellView {
    strip: Vec<StripEntry>,
    panels: Vec<Panel>,
    header_title: String,
}

impl ShellView {
    /// Create an empty view showing `header_title`.
    pub fn new(header_title: &str) -> Self {
        Self {
            strip: Vec::new(),
            panels: Vec::new(),
            header_title: header_title.to_string(),
        }
    }

    /// Append a strip entry and a panel for a newly opened tab.
    ///
    /// Neither is marked active; activation moves the markers separately.
    pub fn insert_tab(&mut self, id: &TabId, title: &str, markup: &str) {
        self.strip.push(StripEntry {
            id: id.clone(),
            title: title.to_string(),
            active: false,
        });
        self.panels.push(Panel {
            id: id.clone(),
            markup: markup.to_string(),
            active: false,
        });
    }

    /// Remove the strip entry and panel for a closed tab.
    pub fn remove_tab(&mut self, id: &TabId) {
        self.strip.retain(|entry| &entry.id != id);
        self.panels.retain(|panel| &panel.id != id);
    }

    /// Move the active markers to `id`, clearing them everywhere else.
    pub fn set_active(&mut self, id: &TabId) {
        for entry in &mut self.strip {
            entry.active = &entry.id == id;
        }
        for panel in &mut self.panels {
            panel.active = &panel.id == id;
        }
    }

    /// Replace a panel's markup.
    ///
    /// Returns `false` when no panel with this id exists, which is how a
    /// late load result observes that its tab is gone.
    pub fn set_panel_markup(&mut self, id: &TabId, markup: &str) -> bool {
        match self.panels.iter_mut().find(|panel| &panel.id == id) {
            Some(panel) => {
                panel.markup = markup.to_string();
                true
            }
            None => false,
        }
    }

    /// The externally visible page title.
    pub fn header_title(&self) -> &str {
        &self.header_title
    }

    /// Set the externally visible page title.
    pub fn set_header_title(&mut self, title: &str) {
        self.header_title = title.to_string();
    }

    /// Strip entries in display order.
    pub fn strip(&self) -> &[StripEntry] {
        &self.strip
    }

    /// Content panels in display order.
    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    /// Look up a panel by tab id.
    pub fn panel(&self, id: &TabId) -> Option<&Panel> {
        self.panels.iter().find(|panel| &panel.id == id)
    }

    /// Look up a strip entry by tab id.
    pub fn strip_entry(&self, id: &TabId) -> Option<&StripEntry> {
        self.strip.iter().find(|entry| &entry.id == id)
    }

    /// Id of the entry carrying the active marker, if any.
    pub fn active_id(&self) -> Option<&TabId> {
        self.strip.iter().find(|entry| entry.active).map(|e| &e.id)
    }

    /// Number of open tabs in the projection.
    pub fn len(&self) -> usize {
        self.strip.len()
    }

    /// Whether the projection is empty.
    pub fn is_empty(&self) -> bool {
        self.strip.is_empty()
    }
}

/// Placeholder markup shown while a tab's fragment is in flight.
pub fn loading_markup(translator: &dyn Translator) -> String {
    format!(
        r#"<div class="tab-panel-loading">{}</div>"#,
        escape_html(&translator.t("common.loading"))
    )
}

/// Inline error markup shown when a tab's fragment load fails.
///
/// Rendered inside the failing panel only; other open tabs stay usable.
pub fn error_markup(translator: &dyn Translator, reason: &str) -> String {
    format!(
        r#"<div class="tab-panel-error"><p class="tab-panel-error-title">{}</p><p class="tab-panel-error-detail">{}</p></div>"#,
        escape_html(&translator.t("tab.loadError")),
        escape_html(reason)
    )
}

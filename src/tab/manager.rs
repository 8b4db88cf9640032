//! Tab manager coordinating the workspace shell's open tabs.
//!
//! The manager is the single writer over three structures that must stay
//! consistent: the registry (authoritative), the recency ledger inside it,
//! and the view projection. All of its operations mutate synchronously;
//! the only asynchronous work is the fragment fetch, which communicates
//! back exclusively through an outcome channel drained by
//! [`TabManager::process_load_outcomes`] or [`TabManager::wait_for_loads`],
//! so no load result is ever applied in the middle of another operation.

use super::{LoadState, Tab, TabId, TabRegistry};
use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::event::TabEvent;
use crate::fragment::{FragmentError, FragmentLoader};
use crate::i18n::{NullTranslator, Translator};
use crate::permission::{AllowAllPermissions, PermissionFilter};
use crate::script::{self, NullScriptHost, ScriptHost};
use crate::view::{self, ShellView};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// Result of one fragment fetch, keyed by the tab's id and the generation
/// token issued at open time.
struct LoadOutcome {
    id: TabId,
    generation: u64,
    result: Result<String, FragmentError>,
}

/// Coordinates the open tabs of one shell instance.
///
/// Nothing here is process-global: embedders (and tests) construct as many
/// independent managers as they need.
pub struct TabManager {
    config: ShellConfig,
    registry: TabRegistry,
    active: Option<TabId>,
    view: ShellView,
    runtime: Arc<Runtime>,
    loader: Arc<dyn FragmentLoader>,
    translator: Arc<dyn Translator>,
    permissions: Arc<dyn PermissionFilter>,
    script_host: Arc<dyn ScriptHost>,
    listeners: Vec<Box<dyn Fn(&TabEvent) + Send>>,
    outcome_tx: UnboundedSender<LoadOutcome>,
    outcome_rx: UnboundedReceiver<LoadOutcome>,
    /// Fetches spawned but not yet applied (or discarded) by a drain.
    in_flight: usize,
    /// Monotonic source for per-open generation tokens.
    next_generation: u64,
}

impl TabManager {
    /// Create a manager with no tabs open.
    ///
    /// # Arguments
    /// * `config` - Shell configuration (tab capacity, header title)
    /// * `runtime` - Tokio runtime fragment fetches are spawned on
    /// * `loader` - Fragment loader for tab content
    pub fn new(config: ShellConfig, runtime: Arc<Runtime>, loader: Arc<dyn FragmentLoader>) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        let view = ShellView::new(&config.app_title);
        Self {
            config,
            registry: TabRegistry::new(),
            active: None,
            view,
            runtime,
            loader,
            translator: Arc::new(NullTranslator),
            permissions: Arc::new(AllowAllPermissions),
            script_host: Arc::new(NullScriptHost),
            listeners: Vec::new(),
            outcome_tx,
            outcome_rx,
            in_flight: 0,
            next_generation: 1,
        }
    }

    /// Replace the translator applied to loaded fragments and shell text.
    pub fn set_translator(&mut self, translator: Arc<dyn Translator>) {
        self.translator = translator;
    }

    /// Replace the permission filter applied to loaded fragments.
    pub fn set_permission_filter(&mut self, permissions: Arc<dyn PermissionFilter>) {
        self.permissions = permissions;
    }

    /// Replace the host that executes activated scripts.
    pub fn set_script_host(&mut self, script_host: Arc<dyn ScriptHost>) {
        self.script_host = script_host;
    }

    /// Subscribe to tab notifications.
    ///
    /// Listeners receive [`TabEvent::Activated`] and [`TabEvent::Closed`].
    /// The shared-borrow signature keeps a listener from calling back into
    /// an in-progress transition.
    pub fn on_event(&mut self, listener: impl Fn(&TabEvent) + Send + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// Open a new tab, or activate it when the id is already open.
    ///
    /// Re-opening an open id never overwrites its title or route and never
    /// re-issues the fragment fetch (first-write-wins); it only activates.
    /// At capacity, the least recently used tab other than the active one
    /// is evicted before the new tab is created, so the capacity bound
    /// holds at every step.
    pub fn open(
        &mut self,
        id: impl Into<TabId>,
        title: &str,
        route: &str,
    ) -> Result<(), ShellError> {
        let id = id.into();
        if self.registry.has(&id) {
            log::debug!("Tab {id} already open, activating");
            return self.activate(&id);
        }

        if self.config.max_tabs == 0 {
            return Err(ShellError::CapacityUnavailable);
        }
        if self.registry.len() >= self.config.max_tabs {
            if let Some(victim) = self.registry.least_recently_used(self.active.as_ref()) {
                log::info!(
                    "Tab limit {} reached, evicting {victim}",
                    self.config.max_tabs
                );
                self.close(&victim)?;
            }
        }

        let generation = self.next_generation;
        self.next_generation += 1;

        self.view.insert_tab(
            &id,
            title,
            &view::loading_markup(self.translator.as_ref()),
        );
        self.registry
            .insert(Tab::new(id.clone(), title, route, generation))?;
        log::info!("Opened tab {id} -> {route} ({} open)", self.registry.len());

        self.spawn_load(id.clone(), route.to_string(), generation);
        self.activate(&id)
    }

    /// Close a tab.
    ///
    /// Closing the active tab activates the most recently used remaining
    /// tab, or resets the header title when none remain. Closing does not
    /// cancel an in-flight fetch; its result is discarded by the
    /// open-and-generation gate when it arrives.
    pub fn close(&mut self, id: &TabId) -> Result<(), ShellError> {
        if !self.registry.has(id) {
            log::debug!("close: tab {id} is not open");
            return Err(ShellError::NotOpen { id: id.clone() });
        }

        self.view.remove_tab(id);
        self.registry.remove(id);

        if self.active.as_ref() == Some(id) {
            self.active = None;
            if let Some(next) = self.registry.most_recently_used() {
                self.activate(&next)?;
            } else {
                self.view.set_header_title(&self.config.app_title);
            }
        }

        log::info!("Closed tab {id} ({} open)", self.registry.len());
        self.emit(&TabEvent::Closed { id: id.clone() });
        Ok(())
    }

    /// Make a tab the active one.
    ///
    /// Moves the active markers, refreshes the recency ledger and the
    /// header title, and notifies listeners. Never triggers loading.
    pub fn activate(&mut self, id: &TabId) -> Result<(), ShellError> {
        let title = match self.registry.get(id) {
            Some(tab) => tab.title.clone(),
            None => {
                log::debug!("activate: tab {id} is not open");
                return Err(ShellError::NotOpen { id: id.clone() });
            }
        };

        self.view.set_active(id);
        self.active = Some(id.clone());
        self.registry.touch(id)?;
        self.view.set_header_title(&title);
        log::debug!("Activated tab {id}");

        self.emit(&TabEvent::Activated {
            id: id.clone(),
            title,
        });
        Ok(())
    }

    /// Close every open tab except `id`.
    pub fn close_others(&mut self, id: &TabId) {
        for other in self.registry.display_order() {
            if &other != id {
                let _ = self.close(&other);
            }
        }
    }

    /// Close every open tab.
    pub fn close_all(&mut self) {
        for id in self.registry.display_order() {
            let _ = self.close(&id);
        }
    }

    /// Close every tab positioned after `id` in display order.
    ///
    /// Display order is what the user sees left to right in the strip; it
    /// is independent of the recency ledger the evictor consults.
    pub fn close_right(&mut self, id: &TabId) {
        for right in self.registry.ids_after(id) {
            let _ = self.close(&right);
        }
    }

    /// The currently active tab id, if any.
    pub fn get_active(&self) -> Option<&TabId> {
        self.active.as_ref()
    }

    /// Whether a tab with this id is currently open.
    pub fn is_open(&self, id: &TabId) -> bool {
        self.registry.has(id)
    }

    /// Number of open tabs.
    pub fn open_count(&self) -> usize {
        self.registry.len()
    }

    /// Look up an open tab's record.
    pub fn get_tab(&self, id: &TabId) -> Option<&Tab> {
        self.registry.get(id)
    }

    /// Iterate the open tabs in display order.
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> {
        self.registry.iter()
    }

    /// Open tab ids in display order.
    pub fn display_order(&self) -> Vec<TabId> {
        self.registry.display_order()
    }

    /// Open tab ids in recency order, least recently used first.
    pub fn recency_order(&self) -> Vec<TabId> {
        self.registry.recency_order()
    }

    /// The current view projection.
    pub fn view(&self) -> &ShellView {
        &self.view
    }

    /// The shell configuration this manager runs with.
    pub fn config(&self) -> &ShellConfig {
        &self.config
    }

    /// Fetches spawned but not yet applied or discarded.
    pub fn pending_loads(&self) -> usize {
        self.in_flight
    }

    /// Apply every load result that has arrived, without blocking.
    ///
    /// Returns the number of results processed (including stale ones that
    /// were discarded by the gate).
    pub fn process_load_outcomes(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
            processed += 1;
        }
        processed
    }

    /// Drain load results until none are in flight or `timeout` elapses.
    ///
    /// For synchronous embedders and tests; do not call from async code.
    pub fn wait_for_loads(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut processed = 0;
        while self.in_flight > 0 {
            match self.outcome_rx.try_recv() {
                Ok(outcome) => {
                    self.apply_outcome(outcome);
                    processed += 1;
                }
                Err(_) => {
                    if Instant::now() >= deadline {
                        log::warn!(
                            "Timed out waiting for {} in-flight fragment load(s)",
                            self.in_flight
                        );
                        break;
                    }
                    std::thread::sleep(Duration::from_millis(2));
                }
            }
        }
        processed
    }

    /// Throw the projection away and rebuild it from registry state.
    ///
    /// The registry is authoritative; this reconstructs the strip, the
    /// panels (placeholder, settled content, or inline error per load
    /// state), the active markers, and the header title.
    pub fn rebuild_view(&mut self) {
        let mut view = ShellView::new(&self.config.app_title);
        for tab in self.registry.iter() {
            let markup = match tab.load_state {
                LoadState::Loading => view::loading_markup(self.translator.as_ref()),
                LoadState::Ready => tab.content.clone().unwrap_or_default(),
                LoadState::Failed => view::error_markup(
                    self.translator.as_ref(),
                    tab.load_error.as_deref().unwrap_or(""),
                ),
            };
            view.insert_tab(&tab.id, &tab.title, &markup);
        }
        if let Some(active) = &self.active {
            view.set_active(active);
            if let Some(tab) = self.registry.get(active) {
                view.set_header_title(&tab.title);
            }
        }
        self.view = view;
        log::debug!("Rebuilt view projection ({} tabs)", self.registry.len());
    }

    /// Spawn the fragment fetch for a freshly opened tab on the runtime's
    /// blocking pool. `open` does not await it; the result comes back
    /// through the outcome channel.
    fn spawn_load(&mut self, id: TabId, route: String, generation: u64) {
        let loader = Arc::clone(&self.loader);
        let tx = self.outcome_tx.clone();
        self.in_flight += 1;
        self.runtime.spawn_blocking(move || {
            let result = loader.fetch(&route);
            // A send failure means the manager is gone; nothing to deliver to.
            let _ = tx.send(LoadOutcome {
                id,
                generation,
                result,
            });
        });
    }

    /// Apply one load result, gated on the tab still being open with the
    /// matching generation token. A result that fails the gate is dropped
    /// without touching the registry or the view: content writes must never
    /// resurrect a closed tab or leak into a reopened one.
    fn apply_outcome(&mut self, outcome: LoadOutcome) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let LoadOutcome {
            id,
            generation,
            result,
        } = outcome;

        match self.registry.get(&id) {
            None => {
                log::debug!("Dropping load result for {id}: closed before the fetch resolved");
                return;
            }
            Some(tab) if tab.generation != generation => {
                log::debug!(
                    "Dropping stale load result for {id} (generation {generation}, current {})",
                    tab.generation
                );
                return;
            }
            Some(_) => {}
        }

        match result {
            Ok(fragment) => {
                let translated = self.translator.translate(&fragment);
                let filtered = self.permissions.apply(&translated, id.as_str());
                let (markup, scripts) = script::activate(&filtered);

                if let Some(tab) = self.registry.get_mut(&id) {
                    tab.load_state = LoadState::Ready;
                    tab.content = Some(markup.clone());
                    tab.load_error = None;
                }
                if !self.view.set_panel_markup(&id, &markup) {
                    log::error!("Panel for {id} missing from view; rebuilding projection");
                    self.rebuild_view();
                }
                for script in &scripts {
                    self.script_host.execute(script);
                }
                log::info!("Loaded tab {id} ({} script(s) activated)", scripts.len());
            }
            Err(err) => {
                let reason = err.to_string();
                log::error!("Failed to load content for {id}: {reason}");
                let markup = view::error_markup(self.translator.as_ref(), &reason);

                if let Some(tab) = self.registry.get_mut(&id) {
                    tab.load_state = LoadState::Failed;
                    tab.content = None;
                    tab.load_error = Some(reason);
                }
                if !self.view.set_panel_markup(&id, &markup) {
                    log::error!("Panel for {id} missing from view; rebuilding projection");
                    self.rebuild_view();
                }
            }
        }
    }

    fn emit(&self, event: &TabEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }
}

//! Shared integration test helpers for webdeck.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{gated_loader, new_manager, static_loader};
//! ```
//!
//! Note: Rust integration tests use `mod common;` (not `use`) to bring in
//! helpers from `tests/common/mod.rs`. The `#![allow(dead_code)]` attribute
//! suppresses warnings when only a subset of helpers are used per file.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};
use tokio::runtime::Runtime;
use webdeck::fragment::{FragmentError, FragmentLoader};
use webdeck::{ShellConfig, TabEvent, TabId, TabManager};

/// Loader that serves canned markup per route. Unknown routes answer
/// HTTP 404.
pub struct StaticLoader {
    fragments: HashMap<String, String>,
}

impl FragmentLoader for StaticLoader {
    fn fetch(&self, route: &str) -> Result<String, FragmentError> {
        self.fragments
            .get(route)
            .cloned()
            .ok_or_else(|| FragmentError::Status {
                route: route.to_string(),
                status: 404,
            })
    }
}

/// Build a loader from (route, markup) pairs.
pub fn static_loader(fragments: &[(&str, &str)]) -> Arc<StaticLoader> {
    Arc::new(StaticLoader {
        fragments: fragments
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
    })
}

struct GateInner {
    results: Mutex<HashMap<String, Result<String, String>>>,
    cvar: Condvar,
}

/// Loader whose fetches block until the test releases each route, so tests
/// control exactly when a load resolves relative to tab operations.
pub struct GatedLoader {
    inner: Arc<GateInner>,
}

/// Test-side handle that releases gated fetches.
#[derive(Clone)]
pub struct GateHandle {
    inner: Arc<GateInner>,
}

impl GateHandle {
    /// Let one pending (or future) fetch of `route` resolve.
    pub fn release(&self, route: &str, result: Result<&str, &str>) {
        let mut results = self.inner.results.lock().expect("gate lock");
        results.insert(
            route.to_string(),
            result.map(str::to_string).map_err(str::to_string),
        );
        self.inner.cvar.notify_all();
    }
}

impl FragmentLoader for GatedLoader {
    fn fetch(&self, route: &str) -> Result<String, FragmentError> {
        let mut results = self.inner.results.lock().expect("gate lock");
        loop {
            if let Some(result) = results.remove(route) {
                return result.map_err(|message| FragmentError::Transport {
                    route: route.to_string(),
                    message,
                });
            }
            results = self.inner.cvar.wait(results).expect("gate wait");
        }
    }
}

/// Build a gated loader and its release handle.
pub fn gated_loader() -> (Arc<GatedLoader>, GateHandle) {
    let inner = Arc::new(GateInner {
        results: Mutex::new(HashMap::new()),
        cvar: Condvar::new(),
    });
    (
        Arc::new(GatedLoader {
            inner: Arc::clone(&inner),
        }),
        GateHandle { inner },
    )
}

/// Build a manager with the given capacity over the given loader.
///
/// The returned `Runtime` must be kept alive for the duration of the test.
pub fn new_manager(
    max_tabs: usize,
    loader: Arc<dyn FragmentLoader>,
) -> (Arc<Runtime>, TabManager) {
    let runtime = Arc::new(Runtime::new().expect("tokio runtime"));
    let config = ShellConfig {
        max_tabs,
        ..ShellConfig::default()
    };
    let manager = TabManager::new(config, Arc::clone(&runtime), loader);
    (runtime, manager)
}

/// Attach an event recorder and return the shared log of received events.
pub fn record_events(manager: &mut TabManager) -> Arc<Mutex<Vec<TabEvent>>> {
    let seen: Arc<Mutex<Vec<TabEvent>>> = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    manager.on_event(move |event| {
        if let Ok(mut events) = sink.lock() {
            events.push(event.clone());
        }
    });
    seen
}

/// Process load outcomes until `count` have been handled or `timeout`
/// elapses. Returns the number actually handled.
pub fn pump(manager: &mut TabManager, count: usize, timeout: Duration) -> usize {
    let deadline = Instant::now() + timeout;
    let mut processed = 0;
    while processed < count && Instant::now() < deadline {
        processed += manager.process_load_outcomes();
        if processed < count {
            std::thread::sleep(Duration::from_millis(2));
        }
    }
    processed
}

/// Shorthand for building tab ids in assertions.
pub fn id(s: &str) -> TabId {
    TabId::from(s)
}

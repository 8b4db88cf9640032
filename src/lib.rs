//! Workspace shell core for server-rendered admin consoles.
//!
//! `webdeck` owns the tab lifecycle of a multi-tab shell page:
//! - [`tab::TabRegistry`]: display-ordered tab records plus a recency ledger
//! - [`tab::TabManager`]: open/close/activate with LRU eviction at capacity,
//!   asynchronous fragment loading, and race-gated content delivery
//! - [`view::ShellView`]: the tab strip / content panel projection, a derived
//!   cache that can always be rebuilt from registry state
//! - [`script`]: activation of `<script>` tags that arrive via markup
//!   injection and are therefore inert until respliced
//!
//! Fragments are server-rendered HTML loaded per tab route. Translation and
//! permission filtering run over each fragment before its scripts are
//! activated; the shell around this crate supplies those collaborators via
//! the [`i18n::Translator`] and [`permission::PermissionFilter`] traits.

/// Crate version, for embedders that report it in diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod config;
pub mod error;
pub mod event;
pub mod fragment;
pub mod i18n;
pub mod markup;
pub mod permission;
pub mod script;
pub mod tab;
pub mod view;

pub use config::ShellConfig;
pub use error::ShellError;
pub use event::TabEvent;
pub use fragment::{FragmentError, FragmentLoader, HttpFragmentLoader};
pub use tab::{LoadState, Tab, TabId, TabManager, TabRegistry};
pub use view::ShellView;

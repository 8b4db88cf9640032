//! Message lookup and fragment translation.
//!
//! The tab manager needs two things from the surrounding shell's i18n
//! engine: resolve a message key for the text it renders itself (loading
//! placeholder, inline load errors), and rewrite the text of
//! `data-i18n`-tagged elements inside a freshly loaded fragment. Both are
//! idempotent and safe to run before or after script activation.

use crate::markup::{escape_html, find_attr};
use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Translation contract consumed by the tab manager.
pub trait Translator: Send + Sync {
    /// Resolve a message key. Unresolved keys echo back unchanged.
    fn t(&self, key: &str) -> String {
        key.to_string()
    }

    /// Rewrite the text of tagged elements in fragment markup.
    fn translate(&self, markup: &str) -> String {
        markup.to_string()
    }
}

/// Identity translator: keys echo back, markup passes through.
pub struct NullTranslator;

impl Translator for NullTranslator {}

/// Translator backed by per-language JSON message bundles.
///
/// Keys are dot paths (`"tab.loadError"`) resolved through nested bundle
/// objects. Lookup tries the current language, then the fallback language,
/// then echoes the key.
pub struct BundleTranslator {
    language: String,
    fallback: String,
    bundles: HashMap<String, Value>,
}

impl BundleTranslator {
    /// Create a translator with no bundles loaded yet.
    pub fn new(language: &str, fallback: &str) -> Self {
        Self {
            language: language.to_string(),
            fallback: fallback.to_string(),
            bundles: HashMap::new(),
        }
    }

    /// Register an in-memory bundle for a language.
    pub fn add_bundle(&mut self, language: &str, bundle: Value) {
        self.bundles.insert(language.to_string(), bundle);
    }

    /// Load a language's bundle from a JSON file.
    pub fn load_bundle(&mut self, language: &str, path: &Path) -> Result<()> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read message bundle {}", path.display()))?;
        let bundle: Value = serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse message bundle {}", path.display()))?;
        log::info!("Loaded '{language}' message bundle from {}", path.display());
        self.add_bundle(language, bundle);
        Ok(())
    }

    /// The currently selected language.
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Switch the current language. Only languages with a registered bundle
    /// are accepted; returns whether the switch happened.
    pub fn set_language(&mut self, language: &str) -> bool {
        if self.bundles.contains_key(language) {
            self.language = language.to_string();
            true
        } else {
            log::warn!("Ignoring switch to language '{language}' with no registered bundle");
            false
        }
    }

    fn resolve<'a>(bundle: &'a Value, key: &str) -> Option<&'a str> {
        key.split('.')
            .try_fold(bundle, |node, part| node.get(part))?
            .as_str()
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.bundles
            .get(&self.language)
            .and_then(|b| Self::resolve(b, key))
            .or_else(|| {
                self.bundles
                    .get(&self.fallback)
                    .and_then(|b| Self::resolve(b, key))
            })
    }
}

impl Translator for BundleTranslator {
    fn t(&self, key: &str) -> String {
        self.lookup(key).map_or_else(|| key.to_string(), str::to_string)
    }

    /// Rewrite the text content of every `data-i18n`-tagged element whose
    /// key resolves. Elements with unresolved keys keep their server-side
    /// text, mirroring the key-echo rule of [`Translator::t`].
    fn translate(&self, markup: &str) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut pos = 0;

        while let Some(hit) = find_attr(markup, pos, "data-i18n") {
            let Some(resolved) = self.lookup(&hit.value) else {
                out.push_str(&markup[pos..hit.after_value]);
                pos = hit.after_value;
                continue;
            };

            // Void/self-closing elements carry no text run to rewrite.
            if markup[..hit.tag_end].ends_with('/') {
                out.push_str(&markup[pos..=hit.tag_end]);
                pos = hit.tag_end + 1;
                continue;
            }

            // Emit through the end of the opening tag, then swap the text
            // run that follows it for the resolved message.
            out.push_str(&markup[pos..=hit.tag_end]);
            let text_start = hit.tag_end + 1;
            let text_len = markup[text_start..]
                .find('<')
                .unwrap_or(markup.len() - text_start);
            out.push_str(&escape_html(resolved));
            pos = text_start + text_len;
        }

        out.push_str(&markup[pos..]);
        out
    }
}

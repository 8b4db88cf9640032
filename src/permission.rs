//! Permission-based visibility filtering for fragment markup.
//!
//! Server-rendered fragments tag write-gated controls with
//! `data-permission="W"` and read-gated ones with `data-permission="R"`.
//! Before a fragment is shown, the filter hides every tagged element the
//! session's authorities do not cover. Hiding is synchronous and
//! idempotent: applying the filter twice yields the same markup.

use crate::markup::find_attr;
use std::collections::HashSet;

/// Visibility contract consumed by the tab manager.
pub trait PermissionFilter: Send + Sync {
    /// Whether the session may modify the resource.
    fn can_write(&self, resource: &str) -> bool;

    /// Whether the session may at least view the resource.
    fn can_read(&self, resource: &str) -> bool;

    /// Hide tagged elements the session's access to `resource` does not
    /// cover.
    fn apply(&self, markup: &str, resource: &str) -> String {
        let hide_write = !self.can_write(resource);
        let hide_read = !self.can_read(resource);
        if !hide_write && !hide_read {
            return markup.to_string();
        }
        hide_gated(markup, hide_write, hide_read)
    }
}

/// Grants every permission; tagged elements are never hidden.
pub struct AllowAllPermissions;

impl PermissionFilter for AllowAllPermissions {
    fn can_write(&self, _resource: &str) -> bool {
        true
    }

    fn can_read(&self, _resource: &str) -> bool {
        true
    }
}

/// Filter over session authority strings of the form `resource:LEVEL`,
/// where the level is `W` (write) or `R` (read) and write implies read.
pub struct AuthorityPermissionFilter {
    authorities: HashSet<String>,
}

impl AuthorityPermissionFilter {
    /// Build a filter from the session's authority strings.
    pub fn new(authorities: impl IntoIterator<Item = String>) -> Self {
        Self {
            authorities: authorities.into_iter().collect(),
        }
    }

    fn has(&self, resource: &str, level: char) -> bool {
        self.authorities.contains(&format!("{resource}:{level}"))
    }
}

impl PermissionFilter for AuthorityPermissionFilter {
    fn can_write(&self, resource: &str) -> bool {
        self.has(resource, 'W')
    }

    fn can_read(&self, resource: &str) -> bool {
        self.has(resource, 'W') || self.has(resource, 'R')
    }
}

/// Insert the `hidden` attribute into every tagged opening tag whose gate
/// level is being hidden. Tags that already carry `hidden` are left alone.
fn hide_gated(markup: &str, hide_write: bool, hide_read: bool) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut pos = 0;

    while let Some(hit) = find_attr(markup, pos, "data-permission") {
        let hide = match hit.value.as_str() {
            "W" => hide_write,
            "R" => hide_read,
            other => {
                log::warn!("Unknown data-permission level '{other}'; leaving element visible");
                false
            }
        };

        let tag = &markup[hit.tag_start..hit.tag_end];
        if hide && !tag.contains(" hidden") {
            out.push_str(&markup[pos..hit.tag_end]);
            out.push_str(" hidden");
            out.push('>');
        } else {
            out.push_str(&markup[pos..=hit.tag_end]);
        }
        pos = hit.tag_end + 1;
    }

    out.push_str(&markup[pos..]);
    out
}

//! Activation of `<script>` tags delivered inside fragment markup.
//!
//! Script elements that arrive via markup injection are inert: replacing a
//! panel's content does not execute them. Activation walks the fragment in
//! document order and splices a freshly built script element over each
//! inert original, then hands the ordered nodes to the embedder's
//! [`ScriptHost`] for execution.
//!
//! A script that mutates later siblings before they are activated is an
//! accepted edge case, not guarded against.

use crate::markup::escape_html;
use serde::Serialize;

/// A freshly built, executable script element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptNode {
    /// External source URL, when the original carried a `src` attribute.
    /// External scripts carry no inline text.
    pub src: Option<String>,
    /// Non-`src` attributes in their original order, as (name, value).
    /// Bare attributes (`defer`, `async`) carry an empty value.
    pub attrs: Vec<(String, String)>,
    /// Inline script text, verbatim. Empty for external scripts.
    pub text: String,
}

impl ScriptNode {
    /// Render this node back to markup, `src` first when present.
    fn render(&self) -> String {
        let mut out = String::from("<script");
        if let Some(src) = &self.src {
            out.push_str(" src=\"");
            out.push_str(&escape_html(src));
            out.push('"');
        }
        for (name, value) in &self.attrs {
            out.push(' ');
            out.push_str(name);
            if !value.is_empty() {
                out.push_str("=\"");
                out.push_str(&escape_html(value));
                out.push('"');
            }
        }
        out.push('>');
        out.push_str(&self.text);
        out.push_str("</script>");
        out
    }
}

/// Executes activated scripts in document order.
///
/// The shell decides what execution means: an embedded engine, a message to
/// the hosting page, or a recorder in tests.
pub trait ScriptHost: Send + Sync {
    /// Execute one activated script.
    fn execute(&self, script: &ScriptNode);
}

/// Discards every script. The default host.
pub struct NullScriptHost;

impl ScriptHost for NullScriptHost {
    fn execute(&self, _script: &ScriptNode) {}
}

/// Find every `<script>` element in `markup` in document order, splice a
/// fresh executable element over each inert original, and return the
/// rewritten markup together with the ordered nodes.
///
/// The `src` special case: when present, only `src` plus the non-`src`
/// attributes are carried and any inline body is dropped; otherwise the
/// inline text is carried verbatim.
pub fn activate(markup: &str) -> (String, Vec<ScriptNode>) {
    let mut out = String::with_capacity(markup.len());
    let mut nodes = Vec::new();
    let mut pos = 0;

    while let Some((open_at, attrs_at)) = find_script_open(markup, pos) {
        out.push_str(&markup[pos..open_at]);

        let (raw_attrs, self_closed, body_at) = parse_attrs(markup, attrs_at);
        let (text, next) = if self_closed {
            (String::new(), body_at)
        } else {
            script_body(markup, body_at)
        };

        let mut src = None;
        let mut attrs = Vec::new();
        for (name, value) in raw_attrs {
            if name.eq_ignore_ascii_case("src") && src.is_none() {
                src = Some(value);
            } else {
                attrs.push((name, value));
            }
        }
        let text = if src.is_some() { String::new() } else { text };

        let node = ScriptNode { src, attrs, text };
        out.push_str(&node.render());
        nodes.push(node);
        pos = next;
    }

    out.push_str(&markup[pos..]);
    (out, nodes)
}

/// Locate the next `<script` tag open at or after `from`.
///
/// Returns the offset of the `<` and the offset where attribute parsing
/// starts. The match must be followed by whitespace, `>`, or `/` so that
/// tags like `<scripted>` are not mistaken for script elements.
fn find_script_open(markup: &str, from: usize) -> Option<(usize, usize)> {
    let bytes = markup.as_bytes();
    let mut search = from;
    loop {
        let rel = markup.get(search..)?.to_ascii_lowercase().find("<script")?;
        let open_at = search + rel;
        let after = open_at + "<script".len();
        match bytes.get(after) {
            Some(b) if b.is_ascii_whitespace() || *b == b'>' || *b == b'/' => {
                return Some((open_at, after));
            }
            Some(_) => search = after,
            None => return None,
        }
    }
}

/// Parse attributes from `from` up to the tag-closing `>`.
///
/// Returns the attributes, whether the tag was self-closing, and the offset
/// just past the `>`.
fn parse_attrs(markup: &str, from: usize) -> (Vec<(String, String)>, bool, usize) {
    let bytes = markup.as_bytes();
    let mut attrs = Vec::new();
    let mut i = from;

    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i) {
            None => return (attrs, false, i),
            Some(b'>') => return (attrs, false, i + 1),
            Some(b'/') if bytes.get(i + 1) == Some(&b'>') => return (attrs, true, i + 2),
            Some(_) => {}
        }

        let name_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && bytes[i] != b'='
            && bytes[i] != b'>'
            && bytes[i] != b'/'
        {
            i += 1;
        }
        let name = markup[name_start..i].to_string();
        if name.is_empty() {
            // Stray character; skip it rather than loop forever.
            i += 1;
            continue;
        }

        if bytes.get(i) != Some(&b'=') {
            attrs.push((name, String::new()));
            continue;
        }
        i += 1;

        let value = match bytes.get(i) {
            Some(&q) if q == b'"' || q == b'\'' => {
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != q {
                    i += 1;
                }
                let value = markup[value_start..i].to_string();
                if i < bytes.len() {
                    i += 1;
                }
                value
            }
            _ => {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>' {
                    i += 1;
                }
                markup[value_start..i].to_string()
            }
        };
        attrs.push((name, value));
    }
}

/// Read the inline body from `from` up to the matching `</script>` close.
///
/// Returns the body text and the offset just past the close tag. An
/// unterminated script consumes the rest of the markup; the respliced
/// element regains a proper close tag.
fn script_body(markup: &str, from: usize) -> (String, usize) {
    let lower = markup[from..].to_ascii_lowercase();
    match lower.find("</script") {
        Some(rel) => {
            let body_end = from + rel;
            let close_end = markup[body_end..]
                .find('>')
                .map(|g| body_end + g + 1)
                .unwrap_or(markup.len());
            (markup[from..body_end].to_string(), close_end)
        }
        None => (markup[from..].to_string(), markup.len()),
    }
}

//! Cross-document substitution and reference registry.
//!
//! Substitution definitions and resolved references are scattered across the
//! pages of a bundle, but consumers need them in one place. This crate
//! harvests both from converted document trees, merges them across runs, and
//! round-trips the result through a small JavaScript module so incremental
//! conversions can build on earlier output.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use mdxport_mdast::{components, Node};
use regex::Regex;

/// Longest value stored in the rendered artifact, in characters.
const MAX_VALUE_CHARS: usize = 1000;

/// Matches the body of the `substitutions` table in a rendered artifact.
static SUBSTITUTIONS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)export const substitutions = \{(.*?)\};").unwrap());

/// Matches the body of the `refs` table in a rendered artifact.
static REFS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)export const refs = \{(.*?)\};").unwrap());

/// Matches one `"name": "value"` entry.
static SUBSTITUTION_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^\s*"((?:[^"\\]|\\.)*)":\s*"((?:[^"\\]|\\.)*)",?\s*$"#).unwrap()
});

/// Matches one `"url": { "title": ..., "url": ... }` entry.
static REF_ENTRY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"(?m)^\s*"((?:[^"\\]|\\.)*)":\s*\{ "title": "((?:[^"\\]|\\.)*)", "url": "((?:[^"\\]|\\.)*)" \},?\s*$"#,
    )
    .unwrap()
});

/// A page location a reference points at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RefTarget {
    /// Human-readable link text.
    pub title: String,
    /// Destination URL or site-relative path.
    pub url: String,
}

/// Accumulated substitutions and reference targets.
///
/// Both tables key on strings: substitutions by name, references by URL.
/// Ordering is stable, so a registry renders to the same bytes every time.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registry {
    pub substitutions: BTreeMap<String, String>,
    pub refs: BTreeMap<String, RefTarget>,
}

impl Registry {
    /// Harvests definitions and references from one converted document tree.
    #[must_use]
    pub fn collect(tree: &Node) -> Self {
        let mut registry = Self::default();
        registry.collect_into(tree);
        registry
    }

    /// Harvests into an existing registry. Later collections win on key
    /// collision.
    pub fn collect_into(&mut self, tree: &Node) {
        match tree {
            Node::FlowElement(el) if el.name == components::SUBSTITUTION_DEF => {
                if let Some(name) = el.attr_str("name") {
                    if !name.is_empty() {
                        let replacement: String =
                            el.children.iter().map(Node::text_content).collect();
                        self.substitutions.insert(name.to_owned(), replacement);
                    }
                }
            }
            Node::TextElement(el) if el.name == components::REF => {
                if let Some(url) = el.attr_str("url") {
                    let title: String = el.children.iter().map(Node::text_content).collect();
                    if !url.is_empty() && !title.is_empty() {
                        self.refs.insert(
                            url.to_owned(),
                            RefTarget {
                                title,
                                url: url.to_owned(),
                            },
                        );
                    }
                }
            }
            _ => {}
        }
        if let Some(children) = tree.children() {
            for child in children {
                self.collect_into(child);
            }
        }
    }

    /// Folds another registry into this one. Incoming entries win on key
    /// collision.
    pub fn merge(&mut self, incoming: Registry) {
        self.substitutions.extend(incoming.substitutions);
        self.refs.extend(incoming.refs);
    }

    /// Whether both tables are empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.substitutions.is_empty() && self.refs.is_empty()
    }

    /// Renders the registry as a JavaScript module.
    ///
    /// Entries are sorted by key and values are escaped and capped, so equal
    /// registries render byte-for-byte identically.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        out.push_str("// Shared substitution and reference tables. Regenerated on every run.\n\n");

        out.push_str("export const substitutions = {");
        if self.substitutions.is_empty() {
            out.push_str("};\n\n");
        } else {
            out.push('\n');
            for (name, value) in &self.substitutions {
                out.push_str(&format!(
                    "  \"{}\": \"{}\",\n",
                    js_string(name),
                    js_string(value)
                ));
            }
            out.push_str("};\n\n");
        }

        out.push_str("export const refs = {");
        if self.refs.is_empty() {
            out.push_str("};\n\n");
        } else {
            out.push('\n');
            for (url, target) in &self.refs {
                out.push_str(&format!(
                    "  \"{}\": {{ \"title\": \"{}\", \"url\": \"{}\" }},\n",
                    js_string(url),
                    js_string(&target.title),
                    js_string(&target.url)
                ));
            }
            out.push_str("};\n\n");
        }

        out.push_str("export default { substitutions, refs };\n");
        out
    }

    /// Re-reads a registry from a previously rendered artifact.
    ///
    /// Never fails: entries that do not match the expected shape are ignored,
    /// and unrecognizable input yields an empty registry.
    #[must_use]
    pub fn parse(text: &str) -> Self {
        let mut registry = Self::default();
        if let Some(section) = SUBSTITUTIONS_RE.captures(text).and_then(|c| c.get(1)) {
            for entry in SUBSTITUTION_ENTRY_RE.captures_iter(section.as_str()) {
                registry
                    .substitutions
                    .insert(js_unstring(&entry[1]), js_unstring(&entry[2]));
            }
        }
        if let Some(section) = REFS_RE.captures(text).and_then(|c| c.get(1)) {
            for entry in REF_ENTRY_RE.captures_iter(section.as_str()) {
                registry.refs.insert(
                    js_unstring(&entry[1]),
                    RefTarget {
                        title: js_unstring(&entry[2]),
                        url: js_unstring(&entry[3]),
                    },
                );
            }
        }
        registry
    }
}

/// Names of substitutions a document tree actually uses.
#[must_use]
pub fn referenced_substitutions(tree: &Node) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    collect_referenced(tree, &mut names);
    names
}

fn collect_referenced(node: &Node, names: &mut BTreeSet<String>) {
    if let Node::TextElement(el) = node {
        if el.name == components::SUB {
            if let Some(name) = el.attr_str("name") {
                names.insert(name.to_owned());
            }
        }
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_referenced(child, names);
        }
    }
}

/// Caps a value at [`MAX_VALUE_CHARS`] characters and escapes it for a
/// double-quoted JavaScript string.
fn js_string(value: &str) -> String {
    let capped: String = if value.chars().count() > MAX_VALUE_CHARS {
        value.chars().take(MAX_VALUE_CHARS).chain(['…']).collect()
    } else {
        value.to_owned()
    };
    let mut out = String::with_capacity(capped.len());
    for c in capped.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\r' => out.push_str("\\r"),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`js_string`] escaping. Unknown escapes keep the escaped
/// character.
fn js_unstring(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

//! Source documentation AST model.
//!
//! Pages arrive as JSON trees produced by an upstream documentation parser.
//! The grammar is open-ended: every node carries a string `type`
//! discriminator, and producers routinely attach fields this crate has never
//! heard of. Known fields get typed accessors; everything else lands in
//! [`Node::extra`] untouched, so decoding only fails on structurally invalid
//! JSON, never on an unfamiliar node kind.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One node of the source documentation tree.
///
/// All fields except `kind` are optional on the wire. Directive-style nodes
/// additionally carry a `name`, an `argument` and an `options` map; inline
/// reference nodes carry some combination of `refuri`, `url`, `target` and
/// `name` depending on the producer's vintage.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Node {
    /// Type discriminator, e.g. `"paragraph"` or `"directive"`.
    #[serde(rename = "type", default)]
    pub kind: String,
    /// Ordered child nodes.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    /// Scalar payload of leaf kinds such as `text` and `code`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    /// Directive or role name (`"note"`, `"include"`, `"guilabel"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Positional directive argument, either raw text or inline nodes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argument: Option<Argument>,
    /// Directive options as written in the source.
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub options: Map<String, Value>,
    /// Resolved link destination.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refuri: Option<String>,
    /// Alternate link destination used by newer producers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Unresolved cross-reference target label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// Single anchor or footnote identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Anchor identifiers attached by the producer.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ids: Vec<String>,
    /// Code block language, preferred spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
    /// Code block language, legacy spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Marks a generic `list` node as ordered.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ordered: Option<bool>,
    /// Enumeration style of a generic `list` node (`"ordered"`, `"arabic"`,
    /// `"unordered"`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enumtype: Option<String>,
    /// First index of an ordered list, preferred spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub startat: Option<i64>,
    /// First index of an ordered list, legacy spelling.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<i64>,
    /// Display label of a field or footnote.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Everything the producer sent that this model does not name.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A directive argument as it appears on the wire.
///
/// Older producers serialize the argument as a single string; newer ones as
/// a list of inline nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Argument {
    /// Raw argument text.
    Text(String),
    /// Parsed inline nodes.
    Nodes(Vec<Node>),
}

impl Node {
    /// Creates a node of the given kind with no payload.
    #[must_use]
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Creates a `text` leaf with the given value.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self {
            kind: "text".to_owned(),
            value: Some(value.into()),
            ..Self::default()
        }
    }

    /// Replaces the node's children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Replaces the node's scalar value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Replaces the node's directive name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Concatenates the scalar values of this node and all descendants in
    /// document order.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        if let Some(value) = &self.value {
            out.push_str(value);
        }
        for child in &self.children {
            child.collect_text(out);
        }
    }

    /// Returns the directive argument flattened to text, or `None` when the
    /// argument is absent or blank.
    #[must_use]
    pub fn argument_text(&self) -> Option<String> {
        let text = match self.argument.as_ref()? {
            Argument::Text(text) => text.clone(),
            Argument::Nodes(nodes) => {
                let mut out = String::new();
                for node in nodes {
                    node.collect_text(&mut out);
                }
                out
            }
        };
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_owned())
        }
    }

    /// Looks up a directive option as a string slice.
    #[must_use]
    pub fn option_str(&self, key: &str) -> Option<&str> {
        self.options.get(key).and_then(Value::as_str)
    }

    /// Resolves the node's identifier, trying `id`, then `name`, then the
    /// first entry of `ids`.
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.id
            .as_deref()
            .or(self.name.as_deref())
            .or_else(|| self.ids.first().map(String::as_str))
            .filter(|id| !id.is_empty())
    }
}

/// Top-level payload of one document in a bundle.
///
/// The `assets` manifest maps bundle storage keys to destination paths
/// relative to the output root.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Root of the page's AST. Absent in placeholder documents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ast: Option<Node>,
    /// Storage key to destination path manifest for static assets.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub assets: BTreeMap<String, String>,
    /// Producer metadata this model does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

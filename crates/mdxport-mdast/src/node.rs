//! Node definitions for the output document tree.

/// Well-known JSX component names shared between the converter and the
/// cross-document registry.
pub mod components {
    /// Inline cross-reference with a resolved `url` or unresolved `target`.
    pub const REF: &str = "Ref";
    /// Inline reference to another document.
    pub const DOC_REF: &str = "DocRef";
    /// Inline substitution placeholder.
    pub const SUB: &str = "Sub";
    /// Flow marker carrying a substitution's name and replacement content.
    pub const SUBSTITUTION_DEF: &str = "SubstitutionDef";
    /// Imported image rendered through a component.
    pub const IMAGE: &str = "Image";
    /// Placeholder for input kinds the converter does not recognize.
    pub const UNSUPPORTED: &str = "Unsupported";
}

/// One node of the output document tree.
///
/// The variant split follows mdast: `Root`, flow content, inline content.
/// JSX elements come in a flow and a text flavor so the serializer knows
/// whether to lay children out as blocks or inline.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    /// Document root.
    Root { children: Vec<Node> },
    /// ATX heading, depth 1 through 6.
    Heading { depth: u8, children: Vec<Node> },
    /// Paragraph of inline content.
    Paragraph { children: Vec<Node> },
    /// Plain text.
    Text { value: String },
    /// Emphasized inline span.
    Emphasis { children: Vec<Node> },
    /// Strong inline span.
    Strong { children: Vec<Node> },
    /// Subscript inline span.
    Subscript { children: Vec<Node> },
    /// Superscript inline span.
    Superscript { children: Vec<Node> },
    /// Inline code span.
    InlineCode { value: String },
    /// Fenced code block.
    Code { lang: Option<String>, value: String },
    /// Ordered or bullet list.
    List {
        ordered: bool,
        start: Option<u32>,
        children: Vec<Node>,
    },
    /// One list item.
    ListItem { children: Vec<Node> },
    /// Inline link.
    Link { url: String, children: Vec<Node> },
    /// Hard line break.
    Break,
    /// Thematic break.
    ThematicBreak,
    /// YAML frontmatter. The value carries no fence markers.
    Yaml { value: String },
    /// ESM block, typically a run of import statements.
    Esm { value: String },
    /// Footnote body.
    FootnoteDefinition {
        identifier: String,
        children: Vec<Node>,
    },
    /// Footnote marker.
    FootnoteReference { identifier: String },
    /// JSX element laid out as a block.
    FlowElement(JsxElement),
    /// JSX element laid out inline.
    TextElement(JsxElement),
}

/// A JSX element with its attribute list.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct JsxElement {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Node>,
}

/// One JSX attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: AttrValue,
}

/// A JSX attribute value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrValue {
    /// Serialized as a quoted string, `name="value"`.
    Literal(String),
    /// Serialized as an expression, `name={value}`.
    Expression(String),
}

impl Node {
    /// Creates a root node.
    #[must_use]
    pub fn root(children: Vec<Node>) -> Self {
        Node::Root { children }
    }

    /// Creates a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Node::Text {
            value: value.into(),
        }
    }

    /// Creates a paragraph.
    #[must_use]
    pub fn paragraph(children: Vec<Node>) -> Self {
        Node::Paragraph { children }
    }

    /// Creates a heading at the given depth.
    #[must_use]
    pub fn heading(depth: u8, children: Vec<Node>) -> Self {
        Node::Heading { depth, children }
    }

    /// Creates an inline code span.
    #[must_use]
    pub fn inline_code(value: impl Into<String>) -> Self {
        Node::InlineCode {
            value: value.into(),
        }
    }

    /// Creates a fenced code block.
    #[must_use]
    pub fn code(lang: Option<String>, value: impl Into<String>) -> Self {
        Node::Code {
            lang,
            value: value.into(),
        }
    }

    /// Creates a list.
    #[must_use]
    pub fn list(ordered: bool, start: Option<u32>, children: Vec<Node>) -> Self {
        Node::List {
            ordered,
            start,
            children,
        }
    }

    /// Creates a list item.
    #[must_use]
    pub fn list_item(children: Vec<Node>) -> Self {
        Node::ListItem { children }
    }

    /// Creates an inline link.
    #[must_use]
    pub fn link(url: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Link {
            url: url.into(),
            children,
        }
    }

    /// Creates a YAML frontmatter node.
    #[must_use]
    pub fn yaml(value: impl Into<String>) -> Self {
        Node::Yaml {
            value: value.into(),
        }
    }

    /// Creates an ESM block.
    #[must_use]
    pub fn esm(value: impl Into<String>) -> Self {
        Node::Esm {
            value: value.into(),
        }
    }

    /// Whether this node is inline (phrasing) content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Node::Text { .. }
                | Node::Emphasis { .. }
                | Node::Strong { .. }
                | Node::Subscript { .. }
                | Node::Superscript { .. }
                | Node::InlineCode { .. }
                | Node::Link { .. }
                | Node::Break
                | Node::FootnoteReference { .. }
                | Node::TextElement(_)
        )
    }

    /// Returns the node's children, if the variant has any.
    #[must_use]
    pub fn children(&self) -> Option<&[Node]> {
        match self {
            Node::Root { children }
            | Node::Heading { children, .. }
            | Node::Paragraph { children }
            | Node::Emphasis { children }
            | Node::Strong { children }
            | Node::Subscript { children }
            | Node::Superscript { children }
            | Node::List { children, .. }
            | Node::ListItem { children }
            | Node::Link { children, .. }
            | Node::FootnoteDefinition { children, .. } => Some(children),
            Node::FlowElement(el) | Node::TextElement(el) => Some(&el.children),
            _ => None,
        }
    }

    /// Concatenates the text carried by this node and its descendants.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text { value } | Node::InlineCode { value } | Node::Code { value, .. } => {
                out.push_str(value);
            }
            _ => {
                if let Some(children) = self.children() {
                    for child in children {
                        child.collect_text(out);
                    }
                }
            }
        }
    }
}

impl JsxElement {
    /// Creates an element with no attributes or children.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Appends a string-valued attribute.
    #[must_use]
    pub fn with_literal_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: AttrValue::Literal(value.into()),
        });
        self
    }

    /// Appends an expression-valued attribute.
    #[must_use]
    pub fn with_expression_attr(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.attributes.push(Attribute {
            name: name.into(),
            value: AttrValue::Expression(value.into()),
        });
        self
    }

    /// Replaces the element's children.
    #[must_use]
    pub fn with_children(mut self, children: Vec<Node>) -> Self {
        self.children = children;
        self
    }

    /// Looks up an attribute by name.
    #[must_use]
    pub fn attr(&self, name: &str) -> Option<&AttrValue> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }

    /// Looks up a string-valued attribute by name.
    #[must_use]
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        match self.attr(name) {
            Some(AttrValue::Literal(value)) => Some(value),
            _ => None,
        }
    }

    /// Wraps the element as block-level flow content.
    #[must_use]
    pub fn into_flow(self) -> Node {
        Node::FlowElement(self)
    }

    /// Wraps the element as inline content.
    #[must_use]
    pub fn into_text(self) -> Node {
        Node::TextElement(self)
    }
}

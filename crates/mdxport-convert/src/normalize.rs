//! Inline-run normalization.
//!
//! The dispatcher splices converted children straight into their parent, so
//! flow containers can end up holding bare inline runs. Normalization wraps
//! each maximal run in a paragraph, everywhere in the tree, and leaves
//! already-wrapped content alone.

use mdxport_mdast::{JsxElement, Node};

/// Wraps maximal runs of inline nodes in paragraphs within a block context.
///
/// Applying it twice yields the same tree as applying it once.
#[must_use]
pub fn normalize_children(children: Vec<Node>) -> Vec<Node> {
    let mut out = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        let child = normalize_node(child);
        if child.is_inline() {
            run.push(child);
        } else {
            flush_run(&mut run, &mut out);
            out.push(child);
        }
    }
    flush_run(&mut run, &mut out);
    out
}

fn flush_run(run: &mut Vec<Node>, out: &mut Vec<Node>) {
    if !run.is_empty() {
        out.push(Node::paragraph(std::mem::take(run)));
    }
}

fn normalize_node(node: Node) -> Node {
    match node {
        // Flow containers: children form a block context.
        Node::Root { children } => Node::Root {
            children: normalize_children(children),
        },
        Node::List {
            ordered,
            start,
            children,
        } => Node::List {
            ordered,
            start,
            children: normalize_children(children),
        },
        Node::ListItem { children } => Node::ListItem {
            children: normalize_children(children),
        },
        Node::FootnoteDefinition {
            identifier,
            children,
        } => Node::FootnoteDefinition {
            identifier,
            children: normalize_children(children),
        },
        Node::FlowElement(el) => Node::FlowElement(JsxElement {
            name: el.name,
            attributes: el.attributes,
            children: normalize_children(el.children),
        }),
        // Inline containers keep their shape; only descendants are visited.
        Node::Paragraph { children } => Node::Paragraph {
            children: normalize_inline(children),
        },
        Node::Heading { depth, children } => Node::Heading {
            depth,
            children: normalize_inline(children),
        },
        Node::Emphasis { children } => Node::Emphasis {
            children: normalize_inline(children),
        },
        Node::Strong { children } => Node::Strong {
            children: normalize_inline(children),
        },
        Node::Subscript { children } => Node::Subscript {
            children: normalize_inline(children),
        },
        Node::Superscript { children } => Node::Superscript {
            children: normalize_inline(children),
        },
        Node::Link { url, children } => Node::Link {
            url,
            children: normalize_inline(children),
        },
        Node::TextElement(el) => Node::TextElement(JsxElement {
            name: el.name,
            attributes: el.attributes,
            children: normalize_inline(el.children),
        }),
        leaf => leaf,
    }
}

fn normalize_inline(children: Vec<Node>) -> Vec<Node> {
    children.into_iter().map(normalize_node).collect()
}

//! Document tree to MDX serialization.
//!
//! Pure rendering logic, no I/O. Blocks are separated by blank lines, list
//! continuation lines are indented under their marker, and JSX children of
//! flow elements are laid out as blocks between the tags. Output is
//! deterministic for a given tree.

use crate::escape::{calculate_fence_length, calculate_inline_code_ticks, escape_text};
use crate::node::{AttrValue, Attribute, JsxElement, Node};

/// Serializes a document tree to MDX text.
///
/// The root's blocks are joined by blank lines and the output ends with a
/// single newline. Stray inline nodes at block level are grouped into an
/// implicit paragraph rather than dropped.
#[must_use]
pub fn to_mdx(root: &Node) -> String {
    let blocks = match root {
        Node::Root { children } => render_blocks(children),
        other => render_blocks(std::slice::from_ref(other)),
    };
    let mut out = blocks.join("\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

/// Renders a block sequence, grouping runs of inline nodes into one block.
fn render_blocks(nodes: &[Node]) -> Vec<String> {
    let mut blocks = Vec::new();
    let mut run: Vec<&Node> = Vec::new();
    for node in nodes {
        if node.is_inline() {
            run.push(node);
        } else {
            flush_inline_run(&mut run, &mut blocks);
            blocks.push(render_block(node));
        }
    }
    flush_inline_run(&mut run, &mut blocks);
    blocks
}

fn flush_inline_run(run: &mut Vec<&Node>, blocks: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let text: String = run.drain(..).map(render_inline).collect();
    blocks.push(text);
}

fn render_block(node: &Node) -> String {
    match node {
        Node::Root { children } => render_blocks(children).join("\n\n"),
        Node::Heading { depth, children } => {
            let level = usize::from((*depth).clamp(1, 6));
            format!("{} {}", "#".repeat(level), render_inlines(children))
        }
        Node::Paragraph { children } => render_inlines(children),
        Node::Code { lang, value } => {
            let fence = "`".repeat(calculate_fence_length(value, '`'));
            let info = lang.as_deref().unwrap_or_default();
            format!("{fence}{info}\n{value}\n{fence}")
        }
        Node::List {
            ordered,
            start,
            children,
        } => render_list(*ordered, *start, children),
        Node::ListItem { children } => render_blocks(children).join("\n\n"),
        Node::ThematicBreak => "---".to_owned(),
        Node::Yaml { value } => format!("---\n{value}\n---"),
        Node::Esm { value } => value.clone(),
        Node::FootnoteDefinition {
            identifier,
            children,
        } => {
            let marker = format!("[^{identifier}]: ");
            hang(&marker, &render_blocks(children).join("\n\n"))
        }
        Node::FlowElement(el) => render_flow_element(el),
        inline => render_inline(inline),
    }
}

fn render_list(ordered: bool, start: Option<u32>, items: &[Node]) -> String {
    let mut rendered = Vec::with_capacity(items.len());
    let mut index = start.unwrap_or(1);
    let mut loose = false;
    for item in items {
        let body = match item {
            Node::ListItem { children } => render_blocks(children).join("\n\n"),
            other => render_block(other),
        };
        loose = loose || body.contains("\n\n");
        let marker = if ordered {
            format!("{index}. ")
        } else {
            "- ".to_owned()
        };
        rendered.push(hang(&marker, &body));
        index = index.saturating_add(1);
    }
    rendered.join(if loose { "\n\n" } else { "\n" })
}

/// Prefixes the first line with `marker` and continuation lines with
/// matching indentation. Blank lines stay blank.
fn hang(marker: &str, body: &str) -> String {
    let indent = " ".repeat(marker.chars().count());
    let mut out = String::with_capacity(marker.len() + body.len());
    for (i, line) in body.split('\n').enumerate() {
        if i == 0 {
            out.push_str(marker);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(&indent);
            }
        }
        out.push_str(line);
    }
    out
}

fn render_flow_element(el: &JsxElement) -> String {
    if el.children.is_empty() {
        return format!("<{}{} />", el.name, render_attrs(&el.attributes));
    }
    let body = render_blocks(&el.children).join("\n\n");
    format!(
        "<{}{}>\n\n{}\n\n</{}>",
        el.name,
        render_attrs(&el.attributes),
        body,
        el.name
    )
}

fn render_inlines(nodes: &[Node]) -> String {
    nodes.iter().map(render_inline).collect()
}

fn render_inline(node: &Node) -> String {
    match node {
        Node::Text { value } => escape_text(value),
        Node::Emphasis { children } => format!("*{}*", render_inlines(children)),
        Node::Strong { children } => format!("**{}**", render_inlines(children)),
        Node::Subscript { children } => format!("<sub>{}</sub>", render_inlines(children)),
        Node::Superscript { children } => format!("<sup>{}</sup>", render_inlines(children)),
        Node::InlineCode { value } => render_inline_code(value),
        Node::Link { url, children } => {
            format!("[{}]({})", render_inlines(children), link_destination(url))
        }
        Node::Break => "\\\n".to_owned(),
        Node::FootnoteReference { identifier } => format!("[^{identifier}]"),
        Node::TextElement(el) => {
            if el.children.is_empty() {
                format!("<{}{} />", el.name, render_attrs(&el.attributes))
            } else {
                format!(
                    "<{}{}>{}</{}>",
                    el.name,
                    render_attrs(&el.attributes),
                    render_inlines(&el.children),
                    el.name
                )
            }
        }
        block => render_block(block),
    }
}

fn render_inline_code(value: &str) -> String {
    let ticks = "`".repeat(calculate_inline_code_ticks(value));
    if value.starts_with('`') || value.ends_with('`') {
        format!("{ticks} {value} {ticks}")
    } else {
        format!("{ticks}{value}{ticks}")
    }
}

fn link_destination(url: &str) -> String {
    let needs_brackets =
        url.is_empty() || url.chars().any(|c| c.is_whitespace() || c == '(' || c == ')');
    if needs_brackets {
        format!("<{url}>")
    } else {
        url.to_owned()
    }
}

fn render_attrs(attributes: &[Attribute]) -> String {
    let mut out = String::new();
    for attr in attributes {
        out.push(' ');
        match &attr.value {
            AttrValue::Literal(value) => {
                out.push_str(&attr.name);
                out.push_str("=\"");
                out.push_str(&escape_attr_value(value));
                out.push('"');
            }
            AttrValue::Expression(value) => {
                out.push_str(&attr.name);
                out.push_str("={");
                out.push_str(value);
                out.push('}');
            }
        }
    }
    out
}

fn escape_attr_value(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

//! Node dispatch: one input kind at a time.
//!
//! `convert_node` maps a source node to zero or more output nodes, recursing
//! through children with an explicit section depth. Unrecognized structure
//! degrades instead of failing: wrappers splice their children, childless
//! strangers become a placeholder element, and every degradation is recorded
//! as a warning on the context.

use mdxport_ast as ast;
use mdxport_ast::Argument;
use mdxport_mdast as md;
use mdxport_mdast::{components, JsxElement};
use serde_json::Value;

use crate::assemble;
use crate::context::Context;
use crate::paths::{
    asset_identifier, asset_location, component_name, fragment_path, import_specifier,
};

/// Converts one source node at the given section depth.
pub fn convert_node(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    match node.kind.as_str() {
        "text" => vec![md::Node::text(node.value.clone().unwrap_or_default())],
        "paragraph" => vec![md::Node::paragraph(convert_children(
            &node.children,
            depth,
            ctx,
        ))],
        "emphasis" => vec![md::Node::Emphasis {
            children: convert_children(&node.children, depth, ctx),
        }],
        "strong" => vec![md::Node::Strong {
            children: convert_children(&node.children, depth, ctx),
        }],
        "subscript" => vec![md::Node::Subscript {
            children: convert_children(&node.children, depth, ctx),
        }],
        "superscript" => vec![md::Node::Superscript {
            children: convert_children(&node.children, depth, ctx),
        }],
        "literal" => vec![md::Node::inline_code(scalar_or_children(node))],
        "code" => {
            let lang = node
                .lang
                .clone()
                .filter(|l| !l.is_empty())
                .or_else(|| node.language.clone().filter(|l| !l.is_empty()));
            vec![md::Node::code(lang, scalar_or_children(node))]
        }
        "section" => section(node, depth, ctx),
        "title" | "heading" => vec![heading(node, depth, ctx)],
        "bullet_list" => vec![md::Node::list(
            false,
            None,
            convert_children(&node.children, depth, ctx),
        )],
        "enumerated_list" => vec![md::Node::list(
            true,
            Some(start_index(node)),
            convert_children(&node.children, depth, ctx),
        )],
        "list" => {
            let ordered = match node.enumtype.as_deref() {
                Some("unordered" | "bullet") => false,
                Some(_) => true,
                None => node.ordered.unwrap_or(false),
            };
            let start = if ordered { Some(start_index(node)) } else { None };
            vec![md::Node::list(
                ordered,
                start,
                convert_children(&node.children, depth, ctx),
            )]
        }
        "list_item" | "listItem" => vec![md::Node::list_item(convert_children(
            &node.children,
            depth,
            ctx,
        ))],
        "line_break" => vec![md::Node::Break],
        "transition" => vec![md::Node::ThematicBreak],
        "reference" => {
            let children = convert_children(&node.children, depth, ctx);
            match link_url(node) {
                Some(url) => vec![md::Node::link(url, children)],
                None => children,
            }
        }
        "ref_role" => cross_reference(node, components::REF, depth, ctx),
        "doc" => cross_reference(node, components::DOC_REF, depth, ctx),
        "role" => match node.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) => cross_reference(node, &component_name(name), depth, ctx),
            None => convert_children(&node.children, depth, ctx),
        },
        "substitution_reference" | "substitution" => substitution_reference(node),
        "substitution_definition" => substitution_definition(node, depth, ctx),
        "target" => anchors(node),
        "directive" => directive(node, depth, ctx),
        "image" => figure(node, ctx),
        "footnote" => {
            let children = convert_children(&node.children, depth, ctx);
            match node.identifier() {
                Some(id) => vec![md::Node::FootnoteDefinition {
                    identifier: id.to_owned(),
                    children,
                }],
                None => children,
            }
        }
        "footnote_reference" => match node.identifier() {
            Some(id) => vec![md::Node::FootnoteReference {
                identifier: id.to_owned(),
            }],
            None => Vec::new(),
        },
        "field" => {
            let mut el = JsxElement::new("Field");
            if let Some(name) = field_name(node) {
                el = el.with_literal_attr("name", name);
            }
            vec![el
                .with_children(convert_children(&node.children, depth, ctx))
                .into_flow()]
        }
        kind @ ("definitionList" | "definition_list" | "definitionListItem"
        | "definition_list_item" | "term" | "definition" | "field_list" | "table" | "tgroup"
        | "thead" | "tbody" | "row" | "entry" | "block_quote") => {
            vec![JsxElement::new(component_name(kind))
                .with_children(convert_children(&node.children, depth, ctx))
                .into_flow()]
        }
        "comment" | "named_reference" | "colspec" => Vec::new(),
        "root" => convert_children(&node.children, depth, ctx),
        kind => {
            if node.children.is_empty() {
                ctx.warn(format!("unhandled node kind: {kind}"));
                vec![JsxElement::new(components::UNSUPPORTED)
                    .with_literal_attr("kind", kind)
                    .into_flow()]
            } else {
                ctx.warn(format!("unhandled node kind: {kind}, keeping children"));
                convert_children(&node.children, depth, ctx)
            }
        }
    }
}

/// Converts a child sequence, splicing each node's output in order.
pub(crate) fn convert_children(
    nodes: &[ast::Node],
    depth: u8,
    ctx: &mut Context<'_>,
) -> Vec<md::Node> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        out.extend(convert_node(node, depth, ctx));
    }
    out
}

/// Scalar value of a leaf, falling back to its children's concatenated text.
fn scalar_or_children(node: &ast::Node) -> String {
    match node.value.as_deref() {
        Some(value) if !value.is_empty() => value.to_owned(),
        _ => node.children.iter().map(ast::Node::text_content).collect(),
    }
}

fn link_url(node: &ast::Node) -> Option<&str> {
    node.refuri
        .as_deref()
        .or(node.url.as_deref())
        .filter(|url| !url.is_empty())
}

fn start_index(node: &ast::Node) -> u32 {
    let raw = node.startat.or(node.start).unwrap_or(1);
    u32::try_from(raw.max(1)).unwrap_or(1)
}

fn field_name(node: &ast::Node) -> Option<&str> {
    node.label
        .as_deref()
        .or(node.name.as_deref())
        .filter(|name| !name.is_empty())
}

/// Folds a section: its first title becomes a heading at the current depth,
/// everything else converts one level deeper.
fn section(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let title_idx = node
        .children
        .iter()
        .position(|child| child.kind == "title")
        .or_else(|| node.children.iter().position(|child| child.kind == "heading"));

    let mut out = Vec::new();
    if let Some(idx) = title_idx {
        out.push(heading(&node.children[idx], depth, ctx));
    }
    let child_depth = depth.saturating_add(1);
    for (idx, child) in node.children.iter().enumerate() {
        if Some(idx) == title_idx {
            continue;
        }
        out.extend(convert_node(child, child_depth, ctx));
    }
    out
}

fn heading(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> md::Node {
    let mut children = convert_children(&node.children, depth, ctx);
    if children.is_empty() {
        if let Some(value) = &node.value {
            children.push(md::Node::text(value.clone()));
        }
    }
    md::Node::heading(depth.min(6), children)
}

/// Inline cross-reference rendered as a component.
///
/// A resolved URL wins over an unresolved target label; with neither, the
/// children stand on their own.
fn cross_reference(
    node: &ast::Node,
    component: &str,
    depth: u8,
    ctx: &mut Context<'_>,
) -> Vec<md::Node> {
    let mut children = convert_children(&node.children, depth, ctx);
    if children.is_empty() {
        if let Some(value) = node.value.clone().filter(|v| !v.is_empty()) {
            children.push(md::Node::text(value));
        }
    }
    if let Some(url) = link_url(node) {
        return vec![JsxElement::new(component)
            .with_literal_attr("url", url)
            .with_children(children)
            .into_text()];
    }
    if let Some(target) = node.target.as_deref().filter(|t| !t.is_empty()) {
        return vec![JsxElement::new(component)
            .with_literal_attr("target", target)
            .with_children(children)
            .into_text()];
    }
    children
}

fn substitution_reference(node: &ast::Node) -> Vec<md::Node> {
    let name = node
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .or_else(|| node.value.as_deref().filter(|v| !v.is_empty()));
    match name {
        Some(name) => vec![JsxElement::new(components::SUB)
            .with_literal_attr("name", name)
            .into_text()],
        None => Vec::new(),
    }
}

fn substitution_definition(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let name = node
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .or_else(|| node.argument_text());
    match name {
        Some(name) => vec![JsxElement::new(components::SUBSTITUTION_DEF)
            .with_literal_attr("name", name)
            .with_children(convert_children(&node.children, depth, ctx))
            .into_flow()],
        None => {
            ctx.warn("substitution definition without a name");
            Vec::new()
        }
    }
}

/// One span anchor per distinct id. Nodes without ids vanish.
fn anchors(node: &ast::Node) -> Vec<md::Node> {
    let mut seen: Vec<&str> = Vec::new();
    for id in node.id.iter().chain(node.ids.iter()) {
        if !id.is_empty() && !seen.contains(&id.as_str()) {
            seen.push(id);
        }
    }
    seen.into_iter()
        .map(|id| {
            JsxElement::new("span")
                .with_literal_attr("id", id)
                .into_text()
        })
        .collect()
}

fn directive(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let name = node.name.as_deref().unwrap_or_default();
    match name {
        "meta" => {
            ctx.merge_frontmatter(&node.options);
            Vec::new()
        }
        "figure" | "image" => figure(node, ctx),
        "literalinclude" => literal_include(node),
        "include" | "sharedinclude" => include(node, ctx),
        "only" | "cond" => conditional(node, depth, ctx),
        "contents" | "index" | "seealso"
            if node.children.is_empty() && node.options.is_empty() =>
        {
            Vec::new()
        }
        "" => {
            ctx.warn("directive without a name");
            convert_children(&node.children, depth, ctx)
        }
        _ => generic_directive(node, depth, ctx),
    }
}

/// Fallback for directives with no dedicated handling: a flow component
/// named after the directive, options as attributes, argument and children
/// as content.
fn generic_directive(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let name = node.name.as_deref().unwrap_or_default();
    let mut el = JsxElement::new(component_name(name));
    for (key, value) in &node.options {
        el = match value {
            Value::String(s) => el.with_literal_attr(key, s),
            other => el.with_expression_attr(key, other.to_string()),
        };
    }
    let mut children = Vec::new();
    match &node.argument {
        Some(Argument::Text(text)) if !text.trim().is_empty() => {
            children.push(md::Node::text(text.trim()));
        }
        Some(Argument::Nodes(nodes)) => {
            children.extend(convert_children(nodes, depth, ctx));
        }
        _ => {}
    }
    children.extend(convert_children(&node.children, depth, ctx));
    vec![el.with_children(children).into_flow()]
}

fn conditional(node: &ast::Node, depth: u8, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let name = node.name.as_deref().unwrap_or_default();
    let mut el = JsxElement::new(component_name(name));
    if let Some(expr) = node.argument_text() {
        el = el.with_literal_attr("expr", expr);
    }
    vec![el
        .with_children(convert_children(&node.children, depth, ctx))
        .into_flow()]
}

/// Figures become an imported image component. The asset is anchored under
/// the emitted file's top-level directory and imported relative to it.
fn figure(node: &ast::Node, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let Some(source) = image_source(node) else {
        ctx.warn("figure without an image path");
        return Vec::new();
    };
    let location = asset_location(ctx.output_path(), &source);
    let file_name = location.rsplit('/').next().unwrap_or(&location);
    let identifier = asset_identifier(file_name);
    let import_path = import_specifier(ctx.output_path(), &location);
    ctx.register_import(identifier.clone(), import_path, true);

    let mut el = JsxElement::new(components::IMAGE).with_expression_attr("src", identifier);
    if let Some(alt) = node.option_str("alt") {
        el = el.with_literal_attr("alt", alt);
    }
    el = dimension_attr(el, node, "width");
    el = dimension_attr(el, node, "height");
    vec![el.into_flow()]
}

fn image_source(node: &ast::Node) -> Option<String> {
    if let Some(argument) = node.argument_text() {
        return Some(argument);
    }
    node.children.iter().find_map(|child| {
        if child.kind != "image" {
            return None;
        }
        child
            .argument_text()
            .or_else(|| child.refuri.clone())
            .or_else(|| child.value.clone())
    })
}

/// Width and height attach as numbers when they parse as numbers, otherwise
/// as literal strings.
fn dimension_attr(el: JsxElement, node: &ast::Node, key: &str) -> JsxElement {
    match node.options.get(key) {
        Some(Value::Number(n)) => el.with_expression_attr(key, n.to_string()),
        Some(Value::String(s)) => {
            let trimmed = s.trim();
            if trimmed.parse::<f64>().is_ok() {
                el.with_expression_attr(key, trimmed)
            } else {
                el.with_literal_attr(key, s.as_str())
            }
        }
        Some(other) => el.with_expression_attr(key, other.to_string()),
        None => el,
    }
}

/// Literal includes keep their shape as a code block; file contents are not
/// available at conversion time.
fn literal_include(node: &ast::Node) -> Vec<md::Node> {
    let lang = node.option_str("language").map(str::to_owned);
    let value = match node.argument_text() {
        Some(path) => format!("# source: {path}\n# content not available"),
        None => "# content not available".to_owned(),
    };
    vec![md::Node::code(lang, value)]
}

/// Includes split off a fragment document and leave a component reference.
///
/// The fragment converts with its own frontmatter, imports and output path,
/// is handed to the emission callback, and the including file imports the
/// fragment's component. A path already on the include stack is not
/// re-converted; the reference is still emitted.
fn include(node: &ast::Node, ctx: &mut Context<'_>) -> Vec<md::Node> {
    let Some(argument) = node.argument_text() else {
        ctx.warn("include without a path");
        return Vec::new();
    };
    let fragment = fragment_path(&argument);
    let base = fragment.rsplit('/').next().unwrap_or(&fragment);
    let stem = base.rsplit_once('.').map_or(base, |(stem, _)| stem);
    let component = component_name(stem);
    if component.is_empty() {
        ctx.warn(format!("include path yields no component name: {argument}"));
        return Vec::new();
    }

    if ctx.include_active(&fragment) {
        ctx.warn(format!("include cycle detected: {fragment}"));
    } else {
        ctx.push_include(fragment.clone());
        let suspended = ctx.swap_page(fragment.clone());
        let children = convert_children(fragment_content(&node.children), 1, ctx);
        let root = assemble::finish_root(ctx, children);
        ctx.restore_page(suspended);
        ctx.pop_include();
        ctx.emit_fragment(&fragment, &root);
    }

    let import_path = import_specifier(ctx.output_path(), &fragment);
    ctx.register_import(component.clone(), import_path, false);
    vec![JsxElement::new(component).into_flow()]
}

/// A sole `extract` child is a wrapper around the content the producer
/// selected; unwrap it.
fn fragment_content(children: &[ast::Node]) -> &[ast::Node] {
    match children {
        [only] if only.kind == "directive" && only.name.as_deref() == Some("extract") => {
            &only.children
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use mdxport_mdast::AttrValue;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    fn convert(node: &ast::Node) -> Vec<md::Node> {
        let mut emit = |_: &str, _: &md::Node| -> std::io::Result<()> { Ok(()) };
        let mut ctx = Context::new("guide/page.mdx", &mut emit);
        convert_node(node, 1, &mut ctx)
    }

    fn convert_with_warnings(node: &ast::Node) -> (Vec<md::Node>, Vec<String>) {
        let mut emit = |_: &str, _: &md::Node| -> std::io::Result<()> { Ok(()) };
        let mut ctx = Context::new("guide/page.mdx", &mut emit);
        let out = convert_node(node, 1, &mut ctx);
        (out, ctx.take_warnings())
    }

    fn directive_node(name: &str) -> ast::Node {
        ast::Node::new("directive").with_name(name)
    }

    #[test]
    fn test_text_and_inline_wrappers() {
        assert_eq!(convert(&ast::Node::text("hi")), vec![md::Node::text("hi")]);

        let strong = ast::Node::new("strong").with_children(vec![ast::Node::text("bold")]);
        assert_eq!(
            convert(&strong),
            vec![md::Node::Strong {
                children: vec![md::Node::text("bold")]
            }]
        );
    }

    #[test]
    fn test_literal_prefers_value_over_children() {
        let node = ast::Node::new("literal")
            .with_value("x + y")
            .with_children(vec![ast::Node::text("ignored")]);
        assert_eq!(convert(&node), vec![md::Node::inline_code("x + y")]);

        let fallback = ast::Node::new("literal").with_children(vec![ast::Node::text("get()")]);
        assert_eq!(convert(&fallback), vec![md::Node::inline_code("get()")]);
    }

    #[test]
    fn test_code_language_preference() {
        let mut node = ast::Node::new("code").with_value("print(1)");
        node.language = Some("python".to_owned());
        assert_eq!(
            convert(&node),
            vec![md::Node::code(Some("python".to_owned()), "print(1)")]
        );

        node.lang = Some("py".to_owned());
        assert_eq!(
            convert(&node),
            vec![md::Node::code(Some("py".to_owned()), "print(1)")]
        );
    }

    #[test]
    fn test_code_value_falls_back_to_children() {
        let node = ast::Node::new("code")
            .with_children(vec![ast::Node::text("a\n"), ast::Node::text("b")]);
        assert_eq!(convert(&node), vec![md::Node::code(None, "a\nb")]);
    }

    #[test]
    fn test_section_folds_title_and_descends() {
        let section = ast::Node::new("section").with_children(vec![
            ast::Node::new("title").with_children(vec![ast::Node::text("Top")]),
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("body")]),
            ast::Node::new("section").with_children(vec![
                ast::Node::new("title").with_children(vec![ast::Node::text("Nested")]),
            ]),
        ]);
        assert_eq!(
            convert(&section),
            vec![
                md::Node::heading(1, vec![md::Node::text("Top")]),
                md::Node::paragraph(vec![md::Node::text("body")]),
                md::Node::heading(2, vec![md::Node::text("Nested")]),
            ]
        );
    }

    #[test]
    fn test_heading_depth_clamps_at_six() {
        let mut node = ast::Node::new("section").with_children(vec![
            ast::Node::new("title").with_children(vec![ast::Node::text("deep")]),
        ]);
        for _ in 0..7 {
            node = ast::Node::new("section").with_children(vec![node]);
        }
        let out = convert(&node);
        assert_eq!(
            out,
            vec![md::Node::heading(6, vec![md::Node::text("deep")])]
        );
    }

    #[test]
    fn test_section_accepts_heading_kind_title() {
        let section = ast::Node::new("section").with_children(vec![
            ast::Node::new("heading").with_value("Raw"),
        ]);
        assert_eq!(
            convert(&section),
            vec![md::Node::heading(1, vec![md::Node::text("Raw")])]
        );
    }

    #[test]
    fn test_generic_list_disambiguation() {
        let mut ordered = ast::Node::new("list")
            .with_children(vec![ast::Node::new("listItem")
                .with_children(vec![ast::Node::text("x")])]);
        ordered.enumtype = Some("arabic".to_owned());
        assert_eq!(
            convert(&ordered),
            vec![md::Node::list(
                true,
                Some(1),
                vec![md::Node::list_item(vec![md::Node::text("x")])]
            )]
        );

        let mut unordered = ast::Node::new("list");
        unordered.enumtype = Some("unordered".to_owned());
        assert_eq!(convert(&unordered), vec![md::Node::list(false, None, vec![])]);

        let mut flagged = ast::Node::new("list");
        flagged.ordered = Some(true);
        assert_eq!(convert(&flagged), vec![md::Node::list(true, Some(1), vec![])]);
    }

    #[test]
    fn test_start_prefers_startat_and_clamps() {
        let mut node = ast::Node::new("enumerated_list");
        node.start = Some(5);
        assert_eq!(convert(&node), vec![md::Node::list(true, Some(5), vec![])]);

        node.startat = Some(9);
        assert_eq!(convert(&node), vec![md::Node::list(true, Some(9), vec![])]);

        node.startat = Some(-3);
        assert_eq!(convert(&node), vec![md::Node::list(true, Some(1), vec![])]);
    }

    #[test]
    fn test_reference_with_and_without_url() {
        let mut node =
            ast::Node::new("reference").with_children(vec![ast::Node::text("docs site")]);
        node.refuri = Some("https://example.com".to_owned());
        assert_eq!(
            convert(&node),
            vec![md::Node::link(
                "https://example.com",
                vec![md::Node::text("docs site")]
            )]
        );

        node.refuri = None;
        assert_eq!(convert(&node), vec![md::Node::text("docs site")]);
    }

    #[test]
    fn test_ref_role_url_beats_target() {
        let mut node = ast::Node::new("ref_role").with_children(vec![ast::Node::text("setup")]);
        node.url = Some("/install#setup".to_owned());
        node.target = Some("setup-label".to_owned());

        let out = convert(&node);
        let [md::Node::TextElement(el)] = out.as_slice() else {
            panic!("expected one inline element, got {out:?}");
        };
        assert_eq!(el.name, "Ref");
        assert_eq!(el.attr_str("url"), Some("/install#setup"));
        assert_eq!(el.attr("target"), None);
        assert_eq!(el.children, vec![md::Node::text("setup")]);
    }

    #[test]
    fn test_ref_role_falls_back_to_target_then_children() {
        let mut node = ast::Node::new("ref_role").with_children(vec![ast::Node::text("setup")]);
        node.target = Some("setup-label".to_owned());
        let out = convert(&node);
        let [md::Node::TextElement(el)] = out.as_slice() else {
            panic!("expected one inline element, got {out:?}");
        };
        assert_eq!(el.attr_str("target"), Some("setup-label"));

        let bare = ast::Node::new("ref_role").with_children(vec![ast::Node::text("setup")]);
        assert_eq!(convert(&bare), vec![md::Node::text("setup")]);
    }

    #[test]
    fn test_role_derives_component_from_name() {
        let mut node = ast::Node::new("role")
            .with_name("guilabel")
            .with_children(vec![ast::Node::text("Save")]);
        node.target = Some("save-button".to_owned());
        let out = convert(&node);
        let [md::Node::TextElement(el)] = out.as_slice() else {
            panic!("expected one inline element, got {out:?}");
        };
        assert_eq!(el.name, "Guilabel");
        assert_eq!(el.attr_str("target"), Some("save-button"));
    }

    #[test]
    fn test_doc_reference() {
        let mut node = ast::Node::new("doc").with_children(vec![ast::Node::text("the guide")]);
        node.url = Some("/guide".to_owned());
        let out = convert(&node);
        let [md::Node::TextElement(el)] = out.as_slice() else {
            panic!("expected one inline element, got {out:?}");
        };
        assert_eq!(el.name, "DocRef");
        assert_eq!(el.attr_str("url"), Some("/guide"));
    }

    #[test]
    fn test_substitution_reference_and_definition() {
        let reference = ast::Node::new("substitution_reference").with_name("product");
        let out = convert(&reference);
        let [md::Node::TextElement(el)] = out.as_slice() else {
            panic!("expected one inline element, got {out:?}");
        };
        assert_eq!(el.name, "Sub");
        assert_eq!(el.attr_str("name"), Some("product"));

        let definition = ast::Node::new("substitution_definition")
            .with_name("product")
            .with_children(vec![ast::Node::text("Widget Pro")]);
        let out = convert(&definition);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "SubstitutionDef");
        assert_eq!(el.attr_str("name"), Some("product"));
        assert_eq!(el.children, vec![md::Node::text("Widget Pro")]);
    }

    #[test]
    fn test_nameless_substitution_definition_warns() {
        let node = ast::Node::new("substitution_definition");
        let (out, warnings) = convert_with_warnings(&node);
        assert!(out.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_target_fans_out_per_id() {
        let mut node = ast::Node::new("target");
        node.ids = vec!["a".to_owned(), "b".to_owned(), "a".to_owned()];
        let out = convert(&node);
        assert_eq!(out.len(), 2);
        let [md::Node::TextElement(first), md::Node::TextElement(second)] = out.as_slice() else {
            panic!("expected two anchors, got {out:?}");
        };
        assert_eq!(first.name, "span");
        assert_eq!(first.attr_str("id"), Some("a"));
        assert_eq!(second.attr_str("id"), Some("b"));
        assert!(first.children.is_empty());

        assert!(convert(&ast::Node::new("target")).is_empty());
    }

    #[test]
    fn test_dropped_kinds() {
        assert!(convert(&ast::Node::new("comment").with_value("internal")).is_empty());
        assert!(convert(&ast::Node::new("named_reference")).is_empty());
        assert!(convert(&ast::Node::new("colspec")).is_empty());
    }

    #[test]
    fn test_footnotes() {
        let mut footnote =
            ast::Node::new("footnote").with_children(vec![ast::Node::new("paragraph")
                .with_children(vec![ast::Node::text("source")])]);
        footnote.id = Some("fn-1".to_owned());
        assert_eq!(
            convert(&footnote),
            vec![md::Node::FootnoteDefinition {
                identifier: "fn-1".to_owned(),
                children: vec![md::Node::paragraph(vec![md::Node::text("source")])],
            }]
        );

        let mut reference = ast::Node::new("footnote_reference");
        reference.ids = vec!["fn-1".to_owned()];
        assert_eq!(
            convert(&reference),
            vec![md::Node::FootnoteReference {
                identifier: "fn-1".to_owned()
            }]
        );

        assert!(convert(&ast::Node::new("footnote_reference")).is_empty());
    }

    #[test]
    fn test_footnote_without_identifier_degrades_to_children() {
        let node = ast::Node::new("footnote").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("loose")]),
        ]);
        assert_eq!(
            convert(&node),
            vec![md::Node::paragraph(vec![md::Node::text("loose")])]
        );
    }

    #[test]
    fn test_family_wrappers() {
        let node = ast::Node::new("definition_list").with_children(vec![
            ast::Node::new("definitionListItem").with_children(vec![
                ast::Node::new("term").with_children(vec![ast::Node::text("word")]),
                ast::Node::new("definition").with_children(vec![ast::Node::text("meaning")]),
            ]),
        ]);
        let out = convert(&node);
        let [md::Node::FlowElement(list)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(list.name, "DefinitionList");
        let [md::Node::FlowElement(item)] = list.children.as_slice() else {
            panic!("expected one item, got {:?}", list.children);
        };
        assert_eq!(item.name, "DefinitionListItem");
        let [md::Node::FlowElement(term), md::Node::FlowElement(definition)] =
            item.children.as_slice()
        else {
            panic!("expected term and definition, got {:?}", item.children);
        };
        assert_eq!(term.name, "Term");
        assert_eq!(definition.name, "Definition");
    }

    #[test]
    fn test_field_carries_name_attribute() {
        let mut node = ast::Node::new("field");
        node.label = Some("returns".to_owned());
        let out = convert(&node);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "Field");
        assert_eq!(el.attr_str("name"), Some("returns"));
    }

    #[test]
    fn test_unknown_kind_with_children_splices() {
        let node = ast::Node::new("mystery").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("kept")]),
        ]);
        let (out, warnings) = convert_with_warnings(&node);
        assert_eq!(
            out,
            vec![md::Node::paragraph(vec![md::Node::text("kept")])]
        );
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("mystery"));
    }

    #[test]
    fn test_unknown_childless_kind_becomes_placeholder() {
        let (out, warnings) = convert_with_warnings(&ast::Node::new("mystery"));
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected placeholder, got {out:?}");
        };
        assert_eq!(el.name, "Unsupported");
        assert_eq!(el.attr_str("kind"), Some("mystery"));
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_generic_directive_options_and_argument() {
        let mut node = directive_node("list-table")
            .with_children(vec![ast::Node::new("paragraph")
                .with_children(vec![ast::Node::text("row")])]);
        node.argument = Some(Argument::Text("Caption".to_owned()));
        node.options = json!({"header-rows": 1, "widths": "20 80", "stub": true})
            .as_object()
            .cloned()
            .unwrap();

        let out = convert(&node);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "ListTable");
        assert_eq!(
            el.attr("header-rows"),
            Some(&AttrValue::Expression("1".to_owned()))
        );
        assert_eq!(el.attr_str("widths"), Some("20 80"));
        assert_eq!(el.attr("stub"), Some(&AttrValue::Expression("true".to_owned())));
        assert_eq!(
            el.children,
            vec![
                md::Node::text("Caption"),
                md::Node::paragraph(vec![md::Node::text("row")]),
            ]
        );
    }

    #[test]
    fn test_conditional_directive() {
        let mut node = directive_node("only").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("cloud only")]),
        ]);
        node.argument = Some(Argument::Text("cloud".to_owned()));
        let out = convert(&node);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "Only");
        assert_eq!(el.attr_str("expr"), Some("cloud"));
        assert_eq!(el.children.len(), 1);
    }

    #[test]
    fn test_bare_markers_drop() {
        assert!(convert(&directive_node("contents")).is_empty());
        assert!(convert(&directive_node("index")).is_empty());
        assert!(convert(&directive_node("seealso")).is_empty());
    }

    #[test]
    fn test_seealso_with_children_is_generic() {
        let node = directive_node("seealso").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("related")]),
        ]);
        let out = convert(&node);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "Seealso");
    }

    #[test]
    fn test_literalinclude() {
        let mut node = directive_node("literalinclude");
        node.argument = Some(Argument::Text("/samples/app.py".to_owned()));
        node.options = json!({"language": "python"}).as_object().cloned().unwrap();
        assert_eq!(
            convert(&node),
            vec![md::Node::code(
                Some("python".to_owned()),
                "# source: /samples/app.py\n# content not available"
            )]
        );
    }

    #[test]
    fn test_figure_imports_and_attributes() {
        let mut node = directive_node("figure");
        node.argument = Some(Argument::Text("/images/compass-connect.png".to_owned()));
        node.options = json!({"alt": "Connect screen", "width": "400", "height": "4in"})
            .as_object()
            .cloned()
            .unwrap();

        let mut emit = |_: &str, _: &md::Node| -> std::io::Result<()> { Ok(()) };
        let mut ctx = Context::new("guide/page.mdx", &mut emit);
        let out = convert_node(&node, 1, &mut ctx);

        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "Image");
        assert_eq!(
            el.attr("src"),
            Some(&AttrValue::Expression("compass_connectImg".to_owned()))
        );
        assert_eq!(el.attr_str("alt"), Some("Connect screen"));
        assert_eq!(el.attr("width"), Some(&AttrValue::Expression("400".to_owned())));
        assert_eq!(el.attr("height"), Some(&AttrValue::Literal("4in".to_owned())));
        assert!(el.children.is_empty());

        let root = assemble::finish_root(&mut ctx, out);
        let md::Node::Root { children } = &root else {
            panic!("expected root");
        };
        let md::Node::Esm { value } = &children[0] else {
            panic!("expected import block, got {:?}", children[0]);
        };
        assert_eq!(
            value,
            "import compass_connectImg from \"./images/compass-connect.png\";"
        );
    }

    #[test]
    fn test_figure_from_image_child() {
        let mut image = ast::Node::new("image");
        image.refuri = Some("shots/final.png".to_owned());
        let node = directive_node("figure").with_children(vec![image]);
        let out = convert(&node);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(
            el.attr("src"),
            Some(&AttrValue::Expression("finalImg".to_owned()))
        );
    }

    #[test]
    fn test_figure_without_source_warns() {
        let (out, warnings) = convert_with_warnings(&directive_node("figure"));
        assert!(out.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_include_emits_fragment_and_reference() {
        let mut node = directive_node("include").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("shared step")]),
        ]);
        node.argument = Some(Argument::Text("/includes/steps-run.rst".to_owned()));

        let mut emitted: Vec<(String, md::Node)> = Vec::new();
        let mut emit = |path: &str, tree: &md::Node| -> std::io::Result<()> {
            emitted.push((path.to_owned(), tree.clone()));
            Ok(())
        };
        let mut ctx = Context::new("guide/page.mdx", &mut emit);
        let out = convert_node(&node, 1, &mut ctx);

        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "StepsRun");
        assert!(el.children.is_empty());

        let root = assemble::finish_root(&mut ctx, out);
        drop(ctx);

        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].0, "includes/steps-run.mdx");
        assert_eq!(
            emitted[0].1,
            md::Node::root(vec![md::Node::paragraph(vec![md::Node::text(
                "shared step"
            )])])
        );

        let md::Node::Root { children } = &root else {
            panic!("expected root");
        };
        let md::Node::Esm { value } = &children[0] else {
            panic!("expected import block, got {:?}", children[0]);
        };
        assert_eq!(
            value,
            "import StepsRun from \"../includes/steps-run.mdx\";"
        );
    }

    #[test]
    fn test_include_unwraps_sole_extract_child() {
        let extract = directive_node("extract").with_children(vec![
            ast::Node::new("paragraph").with_children(vec![ast::Node::text("inner")]),
        ]);
        let mut node = directive_node("include").with_children(vec![extract]);
        node.argument = Some(Argument::Text("includes/extracted".to_owned()));

        let mut emitted: Vec<md::Node> = Vec::new();
        let mut emit = |_: &str, tree: &md::Node| -> std::io::Result<()> {
            emitted.push(tree.clone());
            Ok(())
        };
        let mut ctx = Context::new("page.mdx", &mut emit);
        convert_node(&node, 1, &mut ctx);
        drop(ctx);

        assert_eq!(
            emitted,
            vec![md::Node::root(vec![md::Node::paragraph(vec![
                md::Node::text("inner")
            ])])]
        );
    }

    #[test]
    fn test_include_cycle_warns_and_keeps_reference() {
        let mut inner = directive_node("include");
        inner.argument = Some(Argument::Text("includes/loop.rst".to_owned()));
        let mut node = directive_node("include").with_children(vec![inner]);
        node.argument = Some(Argument::Text("includes/loop.rst".to_owned()));

        let mut count = 0usize;
        let mut emit = |_: &str, _: &md::Node| -> std::io::Result<()> {
            count += 1;
            Ok(())
        };
        let mut ctx = Context::new("page.mdx", &mut emit);
        let out = convert_node(&node, 1, &mut ctx);
        let warnings = ctx.take_warnings();
        drop(ctx);

        assert_eq!(count, 1);
        let [md::Node::FlowElement(el)] = out.as_slice() else {
            panic!("expected one flow element, got {out:?}");
        };
        assert_eq!(el.name, "Loop");
        assert!(warnings
            .iter()
            .any(|w| w.contains("include cycle detected: includes/loop.mdx")));
    }

    #[test]
    fn test_include_without_argument_warns() {
        let (out, warnings) = convert_with_warnings(&directive_node("include"));
        assert!(out.is_empty());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_nested_figure_anchors_to_fragment_path() {
        let mut figure = directive_node("figure");
        figure.argument = Some(Argument::Text("/images/inner.png".to_owned()));
        let mut node = directive_node("include").with_children(vec![figure]);
        node.argument = Some(Argument::Text("includes/art.rst".to_owned()));

        let mut emitted: Vec<md::Node> = Vec::new();
        let mut emit = |_: &str, tree: &md::Node| -> std::io::Result<()> {
            emitted.push(tree.clone());
            Ok(())
        };
        let mut ctx = Context::new("guide/page.mdx", &mut emit);
        convert_node(&node, 1, &mut ctx);
        drop(ctx);

        let md::Node::Root { children } = &emitted[0] else {
            panic!("expected root");
        };
        let md::Node::Esm { value } = &children[0] else {
            panic!("expected import block, got {:?}", children[0]);
        };
        assert_eq!(value, "import innerImg from \"./images/inner.png\";");
    }

    #[test]
    fn test_meta_directive_feeds_frontmatter() {
        let mut meta = directive_node("meta");
        meta.options = json!({"description": "intro page"}).as_object().cloned().unwrap();

        let mut emit = |_: &str, _: &md::Node| -> std::io::Result<()> { Ok(()) };
        let mut ctx = Context::new("page.mdx", &mut emit);
        let out = convert_node(&meta, 1, &mut ctx);
        assert!(out.is_empty());

        let frontmatter = ctx.take_frontmatter();
        assert_eq!(
            frontmatter.get("description").and_then(Value::as_str),
            Some("intro page")
        );
    }
}

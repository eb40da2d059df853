//! Page assembly: conversion, frontmatter, imports, normalization.

use mdxport_ast as ast;
use mdxport_mdast as md;

use crate::context::{Context, EmitFragmentFn};
use crate::dispatch::convert_node;
use crate::frontmatter::frontmatter_yaml;
use crate::normalize::normalize_children;

/// A converted page: its document tree plus everything worth telling the
/// caller about.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    pub root: md::Node,
    pub warnings: Vec<String>,
}

/// Converts one page AST into a finished document tree.
///
/// `output_path` is the slash-separated path the page will be written to,
/// relative to the output root; asset anchoring and import specifiers derive
/// from it. Fragments split off by include directives are handed to `emit`
/// as they complete. Conversion itself never fails; problems degrade into
/// [`Page::warnings`].
///
/// # Example
///
/// ```
/// use mdxport_ast::Node;
/// use mdxport_convert::convert_page;
///
/// let ast = Node::new("root").with_children(vec![
///     Node::new("paragraph").with_children(vec![Node::text("hello")]),
/// ]);
/// let page = convert_page(&ast, "guide/page.mdx", &mut |_, _| Ok(()));
/// assert!(page.warnings.is_empty());
/// ```
pub fn convert_page<'e>(ast: &ast::Node, output_path: &str, emit: &'e mut EmitFragmentFn<'e>) -> Page {
    let mut ctx = Context::new(output_path, emit);
    ctx.merge_frontmatter(&ast.options);
    let mut children = Vec::new();
    for child in &ast.children {
        children.extend(convert_node(child, 1, &mut ctx));
    }
    let root = finish_root(&mut ctx, children);
    Page {
        root,
        warnings: ctx.take_warnings(),
    }
}

/// Wraps converted children into a root: frontmatter first, then the import
/// block, then content, with inline runs normalized throughout.
///
/// Consumes the context's pending frontmatter and imports, so fragment and
/// page assembly see only their own accumulation.
pub(crate) fn finish_root(ctx: &mut Context<'_>, children: Vec<md::Node>) -> md::Node {
    let mut blocks = Vec::new();
    let frontmatter = ctx.take_frontmatter();
    if !frontmatter.is_empty() {
        blocks.push(md::Node::yaml(frontmatter_yaml(&frontmatter)));
    }
    if let Some(imports) = ctx.take_imports().render() {
        blocks.push(md::Node::esm(imports));
    }
    blocks.extend(children);
    md::Node::root(normalize_children(blocks))
}

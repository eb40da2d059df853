//! Markdown document tree with embedded JSX components.
//!
//! This is the output side of the converter: a small mdast-style node
//! enumeration extended with JSX elements, ESM blocks and a YAML frontmatter
//! node, plus a deterministic MDX serializer. Rendering is pure string
//! accumulation; the caller decides where the text goes.

mod emit;
mod escape;
mod node;

pub use emit::to_mdx;
pub use escape::{calculate_fence_length, calculate_inline_code_ticks, escape_text};
pub use node::{components, AttrValue, Attribute, JsxElement, Node};

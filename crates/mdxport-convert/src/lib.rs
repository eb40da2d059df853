//! Source AST to MDX document tree conversion.
//!
//! The entry point is [`convert_page`]: it walks one page's AST, dispatches
//! every node kind to its output shape, folds sections into heading depths,
//! accumulates frontmatter and imports, and hands off include fragments
//! through a caller-supplied emission callback. The result is a
//! [`mdxport_mdast`] tree ready for serialization.

mod assemble;
mod context;
mod dispatch;
mod frontmatter;
mod normalize;
mod paths;

pub use assemble::{convert_page, Page};
pub use context::{Context, EmitFragmentFn};
pub use dispatch::convert_node;
pub use frontmatter::frontmatter_yaml;
pub use normalize::normalize_children;
pub use paths::{asset_identifier, component_name, import_specifier, relative_path};

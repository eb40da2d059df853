//! Conversion state threaded through the dispatcher.

use std::io;
use std::mem;

use mdxport_mdast::Node;
use serde_json::{Map, Value};

/// Callback invoked once per fragment produced while converting a page.
///
/// Receives the fragment's output path and its finished document tree.
pub type EmitFragmentFn<'e> = dyn FnMut(&str, &Node) -> io::Result<()> + 'e;

/// Mutable state for one page conversion.
///
/// Frontmatter and imports accumulate per emitted file; the include stack and
/// the warning list span the whole page, fragments included.
pub struct Context<'a> {
    output_path: String,
    frontmatter: Map<String, Value>,
    imports: ImportRegistry,
    include_stack: Vec<String>,
    warnings: Vec<String>,
    emit: &'a mut EmitFragmentFn<'a>,
}

impl<'a> Context<'a> {
    /// Creates a context for a page emitted at `output_path`.
    pub fn new(output_path: impl Into<String>, emit: &'a mut EmitFragmentFn<'a>) -> Self {
        Self {
            output_path: output_path.into(),
            frontmatter: Map::new(),
            imports: ImportRegistry::default(),
            include_stack: Vec::new(),
            warnings: Vec::new(),
            emit,
        }
    }

    /// Output path of the file currently being assembled.
    #[must_use]
    pub fn output_path(&self) -> &str {
        &self.output_path
    }

    /// Records a conversion warning.
    pub(crate) fn warn(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    /// Drains the accumulated warnings.
    pub(crate) fn take_warnings(&mut self) -> Vec<String> {
        mem::take(&mut self.warnings)
    }

    /// Merges options into the pending frontmatter. Later entries win.
    pub(crate) fn merge_frontmatter(&mut self, options: &Map<String, Value>) {
        for (key, value) in options {
            self.frontmatter.insert(key.clone(), value.clone());
        }
    }

    pub(crate) fn take_frontmatter(&mut self) -> Map<String, Value> {
        mem::take(&mut self.frontmatter)
    }

    /// Registers an import for the file currently being assembled.
    pub(crate) fn register_import(
        &mut self,
        identifier: impl Into<String>,
        path: impl Into<String>,
        image: bool,
    ) {
        self.imports.register(identifier, path, image);
    }

    pub(crate) fn take_imports(&mut self) -> ImportRegistry {
        mem::take(&mut self.imports)
    }

    /// Whether `path` is already being converted somewhere up the include
    /// chain.
    pub(crate) fn include_active(&self, path: &str) -> bool {
        self.include_stack.iter().any(|entry| entry == path)
    }

    pub(crate) fn push_include(&mut self, path: String) {
        self.include_stack.push(path);
    }

    pub(crate) fn pop_include(&mut self) {
        self.include_stack.pop();
    }

    /// Redirects accumulation to a fragment, returning the suspended page
    /// state for [`Context::restore_page`].
    pub(crate) fn swap_page(&mut self, output_path: String) -> SuspendedPage {
        SuspendedPage {
            output_path: mem::replace(&mut self.output_path, output_path),
            frontmatter: mem::take(&mut self.frontmatter),
            imports: mem::take(&mut self.imports),
        }
    }

    pub(crate) fn restore_page(&mut self, suspended: SuspendedPage) {
        self.output_path = suspended.output_path;
        self.frontmatter = suspended.frontmatter;
        self.imports = suspended.imports;
    }

    /// Hands a finished fragment to the caller. Emission failures degrade to
    /// a warning so the surrounding page can still complete.
    pub(crate) fn emit_fragment(&mut self, path: &str, tree: &Node) {
        if let Err(error) = (self.emit)(path, tree) {
            self.warn(format!("failed to emit fragment {path}: {error}"));
        }
    }
}

/// Page state parked while a fragment converts.
pub(crate) struct SuspendedPage {
    output_path: String,
    frontmatter: Map<String, Value>,
    imports: ImportRegistry,
}

/// Imports to prepend to an emitted file, in first-registration order with
/// component imports ahead of image imports. Duplicate identifiers are
/// ignored.
#[derive(Debug, Default)]
pub(crate) struct ImportRegistry {
    entries: Vec<ImportEntry>,
}

#[derive(Debug)]
struct ImportEntry {
    identifier: String,
    path: String,
    image: bool,
}

impl ImportRegistry {
    pub(crate) fn register(
        &mut self,
        identifier: impl Into<String>,
        path: impl Into<String>,
        image: bool,
    ) {
        let identifier = identifier.into();
        if self
            .entries
            .iter()
            .any(|entry| entry.identifier == identifier)
        {
            return;
        }
        self.entries.push(ImportEntry {
            identifier,
            path: path.into(),
            image,
        });
    }

    /// Renders the import block, or `None` when nothing was registered.
    pub(crate) fn render(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let mut lines = Vec::with_capacity(self.entries.len());
        for entry in self.entries.iter().filter(|e| !e.image) {
            lines.push(format!(
                "import {} from \"{}\";",
                entry.identifier, entry.path
            ));
        }
        for entry in self.entries.iter().filter(|e| e.image) {
            lines.push(format!(
                "import {} from \"{}\";",
                entry.identifier, entry.path
            ));
        }
        Some(lines.join("\n"))
    }
}

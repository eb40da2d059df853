//! `mdxport convert` command implementation.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::Args;
use mdxport_bundle::Bundle;
use mdxport_config::{CliSettings, Config};
use mdxport_convert::convert_page;
use mdxport_mdast::{to_mdx, Node};
use mdxport_refs::{referenced_substitutions, Registry};

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the convert command.
#[derive(Args)]
pub(crate) struct ConvertArgs {
    /// Path to the documentation bundle (zip archive).
    bundle: PathBuf,

    /// Output directory for the converted tree (overrides config).
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Registry artifact filename, relative to the output directory.
    #[arg(long)]
    refs_file: Option<String>,

    /// Do not merge with an existing registry artifact.
    #[arg(long)]
    no_merge_refs: bool,

    /// Do not copy assets out of the bundle.
    #[arg(long)]
    skip_assets: bool,

    /// Path to configuration file (default: auto-discover mdxport.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging.
    #[arg(short, long)]
    pub(crate) verbose: bool,
}

impl ConvertArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let cli_settings = CliSettings {
            out_dir: self.out.clone(),
            refs_file: self.refs_file.clone(),
            merge_refs: self.no_merge_refs.then_some(false),
            write_assets: self.skip_assets.then_some(false),
        };
        let config = Config::load(self.config.as_deref(), Some(&cli_settings))?;
        let out_dir = &config.output_resolved.dir;

        output.info(&format!("Bundle: {}", self.bundle.display()));
        output.info(&format!("Output: {}", out_dir.display()));

        let mut bundle = Bundle::open(&self.bundle)?;
        let documents = bundle.documents()?;

        let mut registry = Registry::default();
        let mut referenced = BTreeSet::new();
        let mut fragments = HashSet::new();
        let mut pages = 0usize;

        for document in &documents {
            let Some(ast) = &document.envelope.ast else {
                output.warning(&format!("{}: no AST payload, skipping", document.page_path));
                continue;
            };
            tracing::debug!(page = %document.page_path, "converting document");

            let page_rel = format!("{}.mdx", document.page_path);

            // Defined per document so the registry borrows end with the
            // conversion call.
            let mut emit = |path: &str, tree: &Node| -> io::Result<()> {
                registry.collect_into(tree);
                referenced.extend(referenced_substitutions(tree));
                let dest = resolve_output(out_dir, path)
                    .ok_or_else(|| io::Error::other("path escapes the output directory"))?;
                write_text(&dest, &to_mdx(tree))?;
                fragments.insert(path.to_owned());
                Ok(())
            };
            let page = convert_page(ast, &page_rel, &mut emit);

            for warning in &page.warnings {
                output.warning(&format!("{}: {warning}", document.page_path));
            }

            registry.collect_into(&page.root);
            referenced.extend(referenced_substitutions(&page.root));

            let Some(dest) = resolve_output(out_dir, &page_rel) else {
                output.warning(&format!("{page_rel}: path escapes the output directory, skipping"));
                continue;
            };
            write_text(&dest, &to_mdx(&page.root))?;
            pages += 1;
        }

        for name in &referenced {
            if !registry.substitutions.contains_key(name) {
                tracing::warn!(name = %name, "unresolved substitution reference");
            }
        }

        let mut assets = 0usize;
        if config.convert.write_assets {
            for document in &documents {
                for (key, dest) in &document.envelope.assets {
                    let Some(contents) = bundle.asset(key)? else {
                        output.warning(&format!("asset not in bundle: {key}"));
                        continue;
                    };
                    let Some(target) = resolve_output(out_dir, dest) else {
                        output.warning(&format!(
                            "{dest}: path escapes the output directory, skipping"
                        ));
                        continue;
                    };
                    if let Some(parent) = target.parent() {
                        fs::create_dir_all(parent)?;
                    }
                    fs::write(&target, contents)?;
                    assets += 1;
                }
            }
        }

        let refs_path = config.output_resolved.refs_path();
        let mut merged = if config.convert.merge_refs && refs_path.exists() {
            Registry::parse(&fs::read_to_string(&refs_path)?)
        } else {
            Registry::default()
        };
        merged.merge(registry);
        write_text(&refs_path, &merged.render())?;

        output.success(&format!(
            "Converted {pages} pages ({} fragments, {assets} assets) to {}",
            fragments.len(),
            out_dir.display()
        ));
        Ok(())
    }
}

/// Join a bundle-relative path onto the output root.
///
/// Rejects traversal segments so a hostile bundle cannot write outside the
/// output directory.
fn resolve_output(root: &Path, rel: &str) -> Option<PathBuf> {
    let rel = rel.replace('\\', "/");
    let rel = rel.trim_start_matches('/');
    if rel.is_empty() || rel.split('/').any(|segment| segment == "..") {
        return None;
    }
    Some(root.join(rel))
}

/// Write a text file, creating parent directories as needed.
fn write_text(path: &Path, contents: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)
}

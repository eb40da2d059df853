//! `mdxport list` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdxport_bundle::Bundle;

use crate::error::CliError;
use crate::output::Output;

/// Arguments for the list command.
#[derive(Args)]
pub(crate) struct ListArgs {
    /// Path to the documentation bundle (zip archive).
    bundle: PathBuf,
}

impl ListArgs {
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();

        let mut bundle = Bundle::open(&self.bundle)?;
        let documents = bundle.documents()?;

        output.highlight(&format!("Documents ({}):", documents.len()));
        for document in &documents {
            let mut line = format!("  {}", document.page_path);
            if document.envelope.ast.is_none() {
                line.push_str(" (no AST)");
            }
            if !document.envelope.assets.is_empty() {
                line.push_str(&format!(" [{} assets]", document.envelope.assets.len()));
            }
            output.info(&line);
        }

        let assets = bundle.asset_keys();
        output.highlight(&format!("Assets ({}):", assets.len()));
        for key in &assets {
            output.info(&format!("  {key}"));
        }

        Ok(())
    }
}

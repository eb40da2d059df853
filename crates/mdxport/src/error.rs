//! CLI error types.

use mdxport_bundle::BundleError;
use mdxport_config::ConfigError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Bundle(#[from] BundleError),

    #[error("{0}")]
    Io(#[from] std::io::Error),
}

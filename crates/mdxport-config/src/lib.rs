//! Configuration management for mdxport.
//!
//! Parses `mdxport.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdxport.toml";

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override output directory.
    pub out_dir: Option<PathBuf>,
    /// Override registry artifact filename.
    pub refs_file: Option<String>,
    /// Override merging with an existing registry artifact.
    pub merge_refs: Option<bool>,
    /// Override writing of bundle assets.
    pub write_assets: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output configuration (paths are relative strings from TOML).
    output: OutputConfigRaw,
    /// Conversion behavior.
    pub convert: ConvertConfig,

    /// Resolved output configuration (set after loading).
    #[serde(skip)]
    pub output_resolved: OutputConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw output configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct OutputConfigRaw {
    dir: Option<String>,
    refs_file: Option<String>,
}

/// Resolved output configuration.
#[derive(Debug)]
pub struct OutputConfig {
    /// Directory the converted tree is written into.
    pub dir: PathBuf,
    /// Filename of the registry artifact, relative to the output directory.
    pub refs_file: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("build"),
            refs_file: "refs.js".to_owned(),
        }
    }
}

impl OutputConfig {
    /// Full path of the registry artifact.
    #[must_use]
    pub fn refs_path(&self) -> PathBuf {
        self.dir.join(&self.refs_file)
    }
}

/// Conversion behavior configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ConvertConfig {
    /// Whether an existing registry artifact is parsed and merged into the
    /// new one.
    pub merge_refs: bool,
    /// Whether assets named by document manifests are copied out of the
    /// bundle.
    pub write_assets: bool,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            merge_refs: true,
            write_assets: true,
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdxport.toml` in current directory and
    /// parents and falls back to defaults when nothing is found.
    ///
    /// CLI settings are applied after loading and path resolution, allowing
    /// CLI arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if an explicit `config_path` doesn't exist or parsing
    /// fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(out_dir) = &settings.out_dir {
            self.output_resolved.dir.clone_from(out_dir);
        }
        if let Some(refs_file) = &settings.refs_file {
            self.output_resolved.refs_file.clone_from(refs_file);
        }
        if let Some(merge_refs) = settings.merge_refs {
            self.convert.merge_refs = merge_refs;
        }
        if let Some(write_assets) = settings.write_assets {
            self.convert.write_assets = write_assets;
        }
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output_resolved.refs_file.is_empty() {
            return Err(ConfigError::Validation(
                "output.refs_file cannot be empty".to_owned(),
            ));
        }
        if Path::new(&self.output_resolved.refs_file).is_absolute() {
            return Err(ConfigError::Validation(
                "output.refs_file must be relative to the output directory".to_owned(),
            ));
        }
        Ok(())
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            output: OutputConfigRaw::default(),
            convert: ConvertConfig::default(),
            output_resolved: OutputConfig {
                dir: base.join("build"),
                refs_file: "refs.js".to_owned(),
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        Ok(config)
    }

    /// Resolve raw string paths against the config file's directory.
    fn resolve_paths(&mut self, base: &Path) {
        let dir = match self.output.dir.as_deref() {
            Some(dir) if Path::new(dir).is_absolute() => PathBuf::from(dir),
            Some(dir) => base.join(dir),
            None => base.join("build"),
        };
        let refs_file = self
            .output
            .refs_file
            .clone()
            .unwrap_or_else(|| "refs.js".to_owned());
        self.output_resolved = OutputConfig { dir, refs_file };
    }
}

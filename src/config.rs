//! Configuration loader for the formula editor.
//!
//! `defaults/formula.default.toml` is embedded into the binary so that docs and
//! runtime behavior stay in sync. Callers layer a user file, environment
//! variables and command-line overrides on top via [`Loader`] before
//! deserializing into [`FormulaConfig`].

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File, FileFormat, ValueKind};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::catalog::CatalogSource;
use crate::editor::EditorSettings;

const DEFAULT_TOML: &str = include_str!("../defaults/formula.default.toml");

/// Prefix of environment overrides, e.g. `FORMULA__LOGGING__FILTER`
pub const ENV_PREFIX: &str = "FORMULA";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct FormulaConfig {
    pub catalog: CatalogConfig,
    pub editor: EditorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CatalogConfig {
    /// `http(s)://` URL or path to a JSON file
    pub source: String,
}

impl CatalogConfig {
    pub fn source(&self) -> CatalogSource {
        CatalogSource::parse(&self.source)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EditorConfig {
    pub presets: Vec<String>,
    pub anchor_offset: i32,
}

impl From<EditorConfig> for EditorSettings {
    fn from(config: EditorConfig) -> Self {
        EditorSettings {
            presets: config.presets,
            anchor_offset: config.anchor_offset,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub filter: String,
    #[serde(default)]
    pub file: Option<PathBuf>,
}

/// Helper for layering user overrides over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    /// Start a loader seeded with the embedded defaults.
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files trigger an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer an optional configuration file (ignored if the file is absent).
    pub fn with_optional_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(false);
        self.builder = self.builder.add_source(source);
        self
    }

    /// Layer `FORMULA__SECTION__KEY` environment variables.
    pub fn with_env(mut self) -> Self {
        let source = Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true)
            .list_separator(",")
            .with_list_parse_key("editor.presets");
        self.builder = self.builder.add_source(source);
        self
    }

    /// Apply a single key/value override (useful for CLI settings).
    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    /// Finalize the builder and deserialize the resulting configuration.
    pub fn build(self) -> Result<FormulaConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience helper for callers that only need the defaults.
pub fn load_defaults() -> Result<FormulaConfig, ConfigError> {
    Loader::new().build()
}

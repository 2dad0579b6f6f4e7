//! Configuration loading.
//!
//! `defaults/careletter.default.toml` is embedded into the binary. A user file
//! and command-line overrides are layered on top through [`Loader`] before the
//! result is deserialized into [`AppConfig`].

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use careletter_renderer::RenderSettings;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, ValueKind};
use once_cell::sync::OnceCell;
use serde::Deserialize;

use crate::error::AppError;

const DEFAULT_TOML: &str = include_str!("../defaults/careletter.default.toml");

static LOADED: OnceCell<AppConfig> = OnceCell::new();

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Firm and personnel details, each exposed as a placeholder.
    pub firm: BTreeMap<String, String>,
    pub fees: FeesConfig,
    #[serde(default)]
    pub precedent: PrecedentConfig,
    pub output: OutputConfig,
    pub render: RenderSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FeesConfig {
    pub default_lines: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrecedentConfig {
    /// Unset means the precedent bundled with the binary.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub preview: bool,
}

/// Layers user configuration over the built-in defaults.
#[derive(Debug, Clone)]
pub struct Loader {
    builder: ConfigBuilder<DefaultState>,
}

impl Loader {
    pub fn new() -> Self {
        let builder = Config::builder().add_source(File::from_str(DEFAULT_TOML, FileFormat::Toml));
        Self { builder }
    }

    /// Layer a configuration file. Missing files are an error.
    pub fn with_file(mut self, path: impl AsRef<Path>) -> Self {
        let source = File::from(path.as_ref())
            .format(FileFormat::Toml)
            .required(true);
        self.builder = self.builder.add_source(source);
        self
    }

    pub fn set_override<I>(mut self, key: &str, value: I) -> Result<Self, ConfigError>
    where
        I: Into<ValueKind>,
    {
        self.builder = self.builder.set_override(key, value)?;
        Ok(self)
    }

    pub fn build(self) -> Result<AppConfig, ConfigError> {
        self.builder.build()?.try_deserialize()
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

/// Builds the process-wide configuration on first use and returns it.
///
/// Later calls return the first result and ignore `loader`.
pub fn load_once(loader: Loader) -> Result<&'static AppConfig, AppError> {
    LOADED.get_or_try_init(|| {
        let config = loader.build()?;
        tracing::debug!(
            firm_keys = config.firm.len(),
            default_fee_lines = config.fees.default_lines.len(),
            "configuration loaded"
        );
        Ok(config)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_default_config() {
        let config = Loader::new().build().expect("defaults to deserialize");
        assert_eq!(config.firm["firm_name"], "Example Solicitors LLP");
        assert_eq!(config.fees.default_lines.len(), 3);
        assert!(config.precedent.path.is_none());
        assert_eq!(config.render, RenderSettings::default());
        assert!(!config.output.preview);
    }

    #[test]
    fn supports_overrides() {
        let config = Loader::new()
            .set_override("render.font_family", "Calibri")
            .expect("override to apply")
            .set_override("output.preview", true)
            .expect("override to apply")
            .build()
            .expect("config to build");
        assert_eq!(config.render.font_family, "Calibri");
        assert!(config.output.preview);
    }

    #[test]
    fn user_file_layers_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("careletter.toml");
        std::fs::write(&path, "[firm]\nfirm_name = \"Other LLP\"\n").unwrap();
        let config = Loader::new().with_file(&path).build().unwrap();
        assert_eq!(config.firm["firm_name"], "Other LLP");
        assert_eq!(config.firm["supervisor_title"], "Partner");
    }
}

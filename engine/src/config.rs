//! Layered configuration
//!
//! Sources, lowest priority first: built-in defaults, a config file
//! (`.codescroll.toml`, `.codescroll.yaml`, `.codescroll.yml` or
//! `.codescroll.json`), then `CODESCROLL_*` environment variables. Command-line
//! flags are applied on top by the caller.

use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EngineError, Result};
use crate::output::OutputFormat;
use crate::DEFAULT_MAX_BYTES;

/// Config file names looked up in a directory, in order
pub const CONFIG_FILE_NAMES: &[&str] =
    &[".codescroll.toml", ".codescroll.yaml", ".codescroll.yml", ".codescroll.json"];

/// Prefix for environment overrides
pub const ENV_PREFIX: &str = "CODESCROLL_";

/// Effective configuration for a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Files larger than this are skipped as oversize
    pub max_bytes: u64,
    /// Output format
    pub format: OutputFormat,
    /// Worker threads for rendering (0 = rayon default)
    pub threads: usize,
    /// Embed the stylesheet in HTML output
    pub embed_style: bool,
    /// Extensions treated as binary in addition to the built-in set
    pub extra_binary_extensions: Vec<String>,
    /// Extensions rendered as markdown in addition to the built-in set
    pub extra_markdown_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_bytes: DEFAULT_MAX_BYTES,
            format: OutputFormat::Html,
            threads: 0,
            embed_style: true,
            extra_binary_extensions: Vec::new(),
            extra_markdown_extensions: Vec::new(),
        }
    }
}

/// Config file serialization format for `init`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileFormat {
    Toml,
    Yaml,
    Json,
}

impl ConfigFileFormat {
    /// Default file name for this format
    pub fn default_file_name(&self) -> &'static str {
        match self {
            Self::Toml => ".codescroll.toml",
            Self::Yaml => ".codescroll.yaml",
            Self::Json => ".codescroll.json",
        }
    }
}

impl Config {
    /// Load configuration.
    ///
    /// With `explicit` set, only that file is read. Otherwise the first of
    /// [`CONFIG_FILE_NAMES`] found in `search_dir` is used, if any.
    pub fn load(explicit: Option<&Path>, search_dir: &Path) -> Result<Self> {
        let file = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => find_config_file(search_dir),
        };

        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(path) = &file {
            log::debug!("Loading config from {}", path.display());
            figment = merge_file(figment, path);
        }
        figment = figment.merge(Env::prefixed(ENV_PREFIX));

        let config: Self = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Check values the type system cannot
    pub fn validate(&self) -> Result<()> {
        if self.max_bytes == 0 {
            return Err(EngineError::InvalidSetting("max_bytes must be at least 1".to_owned()));
        }
        Ok(())
    }

    /// Serialize this configuration for a config file
    pub fn to_file_string(&self, format: ConfigFileFormat) -> Result<String> {
        let text = match format {
            ConfigFileFormat::Toml => toml::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
            ConfigFileFormat::Yaml => serde_yaml::to_string(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
            ConfigFileFormat::Json => serde_json::to_string_pretty(self)
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?,
        };
        Ok(text)
    }
}

fn find_config_file(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.is_file())
}

fn merge_file(figment: Figment, path: &Path) -> Figment {
    match path.extension().and_then(|e| e.to_str()) {
        Some("yaml" | "yml") => figment.merge(Yaml::file(path)),
        Some("json") => figment.merge(Json::file(path)),
        _ => figment.merge(Toml::file(path)),
    }
}

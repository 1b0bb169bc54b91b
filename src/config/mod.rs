//! Configuration management for `csslink.toml`.
//!
//! # Sections
//!
//! | Section   | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `[paths]` | Base directory, document root, local hosts       |
//! | `[bust]`  | Cache buster kind and parameter name             |
//! | `[merge]` | URL rendering of merged stylesheets              |
//!
//! # Example
//!
//! ```toml
//! [paths]
//! document_root = "public"
//! hosts = ["assets1.example.com", "https://assets2.example.com"]
//!
//! [bust]
//! type = "hard"
//!
//! [merge]
//! absolute_urls = true
//! ```
//!
//! The config file is optional. Relative paths inside it are resolved
//! against the file's directory; command-line flags take precedence.

mod error;

pub use error::ConfigError;

use crate::asset::{BusterKind, CacheBuster, ResolverOptions, version::DEFAULT_PARAM};
use crate::cli::{Cli, Commands, DEFAULT_CONFIG};
use crate::css::UrlMode;
use crate::log;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing csslink.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Absolute path to the config file, if one was loaded (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Asset path resolution
    pub paths: PathsConfig,

    /// Cache busting
    pub bust: BustConfig,

    /// Stylesheet merging
    pub merge: MergeConfig,
}

/// `[paths]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory relative references resolve against.
    pub base: Option<PathBuf>,
    /// Server document root.
    #[serde(alias = "web_root")]
    pub document_root: Option<PathBuf>,
    /// Local asset hosts.
    pub hosts: Vec<String>,
    /// Scheme for hosts written without one.
    pub protocol: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            base: None,
            document_root: None,
            hosts: Vec::new(),
            protocol: "http".into(),
        }
    }
}

/// `[bust]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BustConfig {
    #[serde(rename = "type")]
    pub kind: BusterKind,
    /// Parameter name; empty renders the bare token.
    pub param: String,
}

impl Default for BustConfig {
    fn default() -> Self {
        Self {
            kind: BusterKind::Soft,
            param: DEFAULT_PARAM.into(),
        }
    }
}

/// `[merge]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub absolute_urls: bool,
    pub relative_urls: bool,
}

impl Config {
    /// Load configuration for a CLI invocation.
    ///
    /// A missing default config file is fine; a missing file named
    /// explicitly with `--config` is an error.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let mut config = if cli.config.is_file() {
            let mut config = Self::from_path(&cli.config)?;
            let root = config
                .config_path
                .as_deref()
                .and_then(Path::parent)
                .map(Path::to_path_buf)
                .unwrap_or_default();
            config.normalize_paths(&root);
            config
        } else if cli.config != Path::new(DEFAULT_CONFIG) {
            return Err(ConfigError::Io(
                cli.config.clone(),
                std::io::Error::from(std::io::ErrorKind::NotFound),
            ));
        } else {
            Self::default()
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (mut config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring: {}", path.display(), ignored.join(", "));
        }

        config.config_path = Some(crate::asset::path::absolutize(path));
        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Resolve relative paths from the config file against its directory.
    fn normalize_paths(&mut self, root: &Path) {
        for path in [&mut self.paths.base, &mut self.paths.document_root]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = root.join(&*path);
            }
        }
    }

    /// Command-line flags override file values.
    fn apply_cli(&mut self, cli: &Cli) {
        let args = &cli.paths;
        if let Some(base) = &args.base {
            self.paths.base = Some(base.clone());
        }
        if let Some(root) = &args.document_root {
            self.paths.document_root = Some(root.clone());
        }
        if !args.hosts.is_empty() {
            self.paths.hosts = args.hosts.clone();
        }
        if let Some(protocol) = &args.protocol {
            self.paths.protocol = protocol.clone();
        }

        match &cli.command {
            Commands::Bust {
                kind,
                param,
                no_param,
                ..
            } => {
                if let Some(kind) = kind {
                    self.bust.kind = *kind;
                }
                if let Some(param) = param {
                    self.bust.param = param.clone();
                }
                if *no_param {
                    self.bust.param.clear();
                }
            }
            Commands::Merge {
                absolute_urls,
                relative_urls,
                ..
            } => {
                if *absolute_urls || *relative_urls {
                    self.merge.absolute_urls = *absolute_urls;
                    self.merge.relative_urls = *relative_urls;
                }
            }
        }
    }

    /// Validate option combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.merge.absolute_urls && self.merge.relative_urls {
            return Err(ConfigError::Validation(
                "`merge.absolute_urls` and `merge.relative_urls` are mutually exclusive".into(),
            ));
        }
        if self.paths.hosts.iter().any(|h| h.trim().trim_end_matches('/').is_empty()) {
            return Err(ConfigError::Validation("`paths.hosts` contains an empty host".into()));
        }
        Ok(())
    }

    /// Options for the path resolver of one run.
    pub fn resolver_options(&self) -> ResolverOptions {
        ResolverOptions {
            base: self.paths.base.clone(),
            document_root: self.paths.document_root.clone(),
            hosts: self.paths.hosts.clone(),
            protocol: self.paths.protocol.clone(),
        }
    }

    pub fn cache_buster(&self) -> CacheBuster {
        CacheBuster::new(self.bust.kind).with_param(Some(self.bust.param.clone()))
    }

    pub fn url_mode(&self) -> UrlMode {
        UrlMode::from_flags(self.merge.absolute_urls, self.merge.relative_urls)
    }
}

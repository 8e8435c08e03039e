// Runtime configuration - optional analyzer.toml overlaid by PROTOCOL_ANALYZER_* env vars

//! # Analyzer Settings
//!
//! Configuration is layered, lowest precedence first:
//!
//! 1. Built-in defaults ([`AnalyzerConfig::default`])
//! 2. An optional TOML file, `analyzer.toml` in the working directory by default
//! 3. Environment variables prefixed with `PROTOCOL_ANALYZER_`, for example
//!    `PROTOCOL_ANALYZER_LOG_LEVEL=debug` or
//!    `PROTOCOL_ANALYZER_CATALOG_PATH=/etc/flows.json`
//!
//! Command-line flags in the `flow-analyzer` binary override all three.
//!
//! ```toml
//! # analyzer.toml
//! catalog_path = "catalogs/lte-attach.json"
//! log_level = "debug"
//! output_format = "json"
//! ```

use std::path::{Path, PathBuf};

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::engine::catalog::FlowCatalog;
use crate::Result;

/// Prefix of the environment variables read by [`AnalyzerConfig::load`]
pub const ENV_PREFIX: &str = "PROTOCOL_ANALYZER";

/// Config file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "analyzer.toml";

/// How results are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Machine-readable JSON
    Json,
    /// Colored human-readable text
    #[default]
    Pretty,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// JSON catalog document; `None` selects the built-in 5G attach catalog
    pub catalog_path: Option<PathBuf>,

    /// `tracing` filter directive, e.g. `info` or `protocol_analyzer=debug`
    pub log_level: String,

    pub output_format: OutputFormat,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            catalog_path: None,
            log_level: "info".to_string(),
            output_format: OutputFormat::Pretty,
        }
    }
}

impl AnalyzerConfig {
    /// Load from `analyzer.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from(DEFAULT_CONFIG_FILE)
    }

    /// Load from the given config file (if present) and the environment
    ///
    /// A missing file is not an error; a malformed one is.
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Build the catalog these settings point at
    pub fn load_catalog(&self) -> Result<FlowCatalog> {
        match &self.catalog_path {
            Some(path) => FlowCatalog::from_path(path),
            None => FlowCatalog::standard(),
        }
    }
}

//! CLI configuration: built-in defaults, then an optional TOML file, then
//! `IKF_*` environment variables. Command-line flags are applied last by
//! the caller.

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File as ConfigFile, FileFormat};
use ikf_registry::RegistryLimits;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_FILE: &str = "ikf.toml";
pub const DEFAULT_STATE_PATH: &str = "ikf-state.json";

#[derive(Debug, Clone, Deserialize)]
pub struct CliConfig {
    pub state_path: PathBuf,
    pub log_level: String,
    /// `pretty` or `compact`
    pub log_format: String,
    pub max_filename_len: usize,
    pub max_category_len: usize,
    pub max_metadata_len: usize,
}

impl CliConfig {
    pub fn load(config_path_override: Option<&Path>) -> Result<Self> {
        let limits = RegistryLimits::default();
        let mut builder = Config::builder()
            .set_default("state_path", DEFAULT_STATE_PATH)?
            .set_default("log_level", "warn")?
            .set_default("log_format", "pretty")?
            .set_default("max_filename_len", limits.max_filename_len as i64)?
            .set_default("max_category_len", limits.max_category_len as i64)?
            .set_default("max_metadata_len", limits.max_metadata_len as i64)?;

        builder = match config_path_override {
            Some(path) => {
                if !path.exists() {
                    bail!(
                        "Configuration file {} not found (specified via --config)",
                        path.display()
                    );
                }
                builder.add_source(ConfigFile::from(path))
            }
            None => builder
                .add_source(ConfigFile::new(DEFAULT_CONFIG_FILE, FileFormat::Toml).required(false)),
        };

        builder = builder.add_source(Environment::with_prefix("IKF").try_parsing(true));

        builder
            .build()
            .context("failed to assemble configuration")?
            .try_deserialize()
            .context("invalid configuration")
    }

    pub fn limits(&self) -> RegistryLimits {
        RegistryLimits {
            max_filename_len: self.max_filename_len,
            max_category_len: self.max_category_len,
            max_metadata_len: self.max_metadata_len,
        }
    }
}

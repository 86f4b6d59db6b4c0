//! Command execution context
//!
//! Resolves config-file defaults under the CLI/env layer and opens the cache
//! store for the commands that need it.

use std::path::PathBuf;

use iocscout::cache::{CacheManager, SqliteStore};
use iocscout::config::Config;
use iocscout::error::Result;
use log::warn;

use crate::cli::{GlobalOptions, OutputFormat};

/// Context for command execution: loaded config plus resolved options
pub struct CommandContext {
    pub config: Config,
    pub format: OutputFormat,
    cache_dir_override: Option<PathBuf>,
}

impl CommandContext {
    /// Load the config file (missing file = defaults) and resolve the format.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let config = Config::load_at(opts.config_ref())?;
        let format = opts
            .format
            .or_else(|| config_format(&config))
            .unwrap_or_default();

        Ok(Self {
            config,
            format,
            cache_dir_override: opts.cache_dir.clone(),
        })
    }

    /// Cache directory: `--cache-dir` > config `cache_dir` > platform default
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = self
            .cache_dir_override
            .as_ref()
            .or(self.config.cache_dir.as_ref())
        {
            return Ok(dir.clone());
        }
        Ok(SqliteStore::cache_dir()?)
    }

    /// Open the SQLite-backed cache manager
    pub fn open_cache(&self) -> Result<CacheManager<SqliteStore>> {
        let store = SqliteStore::open_at(&self.cache_dir()?)?;
        Ok(CacheManager::new(store))
    }
}

fn config_format(config: &Config) -> Option<OutputFormat> {
    let raw = config.preferences.format.as_deref()?;
    match raw.parse() {
        Ok(format) => Some(format),
        Err(_) => {
            warn!("Ignoring unknown format '{}' in config", raw);
            None
        }
    }
}

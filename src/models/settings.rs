use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{GnomyError, Result};
use crate::utils::constants::{DEFAULT_BASE_URL, DEFAULT_CACHE_DIR};

/// Runtime settings, layered defaults < `gnomy.toml` < `GNOMY_*` env vars.
/// Command-line flags override on top of whatever this resolves to.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub cache_dir: PathBuf,
    pub max_workers: usize,
    pub base_url: String,
}

impl Settings {
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        Self::build(config_file).map_err(|e| GnomyError::Config(e.to_string()))
    }

    fn build(config_file: Option<&Path>) -> std::result::Result<Self, config::ConfigError> {
        let mut builder = config::Config::builder()
            .set_default("cache_dir", DEFAULT_CACHE_DIR)?
            .set_default("max_workers", num_cpus::get() as u64)?
            .set_default("base_url", DEFAULT_BASE_URL)?;

        builder = match config_file {
            Some(path) => builder.add_source(config::File::from(path)),
            None => builder.add_source(config::File::with_name("gnomy").required(false)),
        };

        builder
            .add_source(config::Environment::with_prefix("GNOMY"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_config_file() {
        let settings = Settings::load(None).unwrap();
        assert_eq!(settings.cache_dir, PathBuf::from(DEFAULT_CACHE_DIR));
        assert_eq!(settings.base_url, DEFAULT_BASE_URL);
        assert!(settings.max_workers >= 1);
    }
}

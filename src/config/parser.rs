use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variable that overrides `storage.path`
pub const STORAGE_PATH_ENV: &str = "SUMI_HARVEST_STORAGE_PATH";

/// Loads and parses a configuration file from the given path
///
/// Environment overrides are applied before validation, so an override is
/// validated like any other value.
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use sumi_harvest::config::load_config;
///
/// let config = load_config(Path::new("harvest.toml")).unwrap();
/// println!("Storage path: {}", config.storage.path);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;

    let mut config: Config = toml::from_str(&content)?;

    apply_env_overrides(&mut config);

    validate(&config)?;

    Ok(config)
}

/// Applies environment variable overrides to a parsed configuration
pub fn apply_env_overrides(config: &mut Config) {
    override_storage_path(config, std::env::var(STORAGE_PATH_ENV).ok());
}

fn override_storage_path(config: &mut Config, value: Option<String>) {
    if let Some(path) = value.filter(|p| !p.trim().is_empty()) {
        tracing::debug!("Storage path overridden by {}: {}", STORAGE_PATH_ENV, path);
        config.storage.path = path;
    }
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

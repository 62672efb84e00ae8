// src/config/loader.rs

use std::fs;
use std::path::Path;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{DiagwatchError, Result};
use crate::types::parse_truth_value;

/// Environment switch that makes every reported error tolerable.
pub const TOLERATE_ERRORS_ENV: &str = "DIAGWATCH_TOLERATE_ERRORS";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** validate
/// durations or patterns. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// Load the config file if one was given, defaults otherwise.
pub fn load_or_default(path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(p) => load_and_validate(p),
        None => Ok(ConfigFile::default()),
    }
}

/// Interpret the value of [`TOLERATE_ERRORS_ENV`].
///
/// `None` (unset) yields `None`; an unparseable value is a config error.
pub fn parse_tolerate_override(value: Option<&str>) -> Result<Option<bool>> {
    match value {
        None => Ok(None),
        Some(v) => parse_truth_value(v).map(Some).map_err(|_| {
            DiagwatchError::ConfigError(format!(
                "Environment variable {TOLERATE_ERRORS_ENV} has invalid truth value '{v}'"
            ))
        }),
    }
}

/// Read [`TOLERATE_ERRORS_ENV`] from the process environment.
pub fn tolerate_override_from_env() -> Result<Option<bool>> {
    let value = std::env::var(TOLERATE_ERRORS_ENV).ok();
    parse_tolerate_override(value.as_deref())
}

use crate::conf::error::ConfigError;
use crate::conf::types::Config;

use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable consulted when no `--config` flag is given.
pub const CONF_ENV_VAR: &str = "LOGWATCH_CONF";

/// Loads the agent configuration from a YAML file.
///
/// With no path the built-in defaults apply: the default access log is
/// tailed and both integrations stay inactive until configured.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let Some(path) = path else {
        return Ok(Config::default());
    };

    let s = fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
    let config: Config = serde_yaml::from_str(&s).map_err(|e| ConfigError::parse(path, e))?;

    Ok(config)
}

pub fn config_path_from_env() -> Option<PathBuf> {
    std::env::var_os(CONF_ENV_VAR).map(PathBuf::from)
}

mod discover;
mod error;
mod loader;
#[cfg(test)]
mod tests;
mod types;

pub use discover::{expand_globs, resolve_glob};
pub use error::ConfigError;
pub use loader::{CONF_ENV_VAR, config_path_from_env, load_config};
pub use types::{Config, DEFAULT_ACCESS_LOG, OverwatchConfig, SentryConfig};

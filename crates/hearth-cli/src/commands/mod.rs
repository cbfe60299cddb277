//! Subcommand implementations.

pub mod chat;
pub mod classify;
pub mod config_cmd;

use std::path::Path;

use hearth_types::config::HearthConfig;

/// Load the configuration from `config_override`, or discover it.
///
/// An explicit path that does not exist is an error; a missing default
/// file yields the built-in defaults.
pub fn load_config(config_override: Option<&str>) -> anyhow::Result<HearthConfig> {
    let path = config_override.map(Path::new);
    if let Some(path) = path {
        if !path.exists() {
            anyhow::bail!("config file not found: {}", path.display());
        }
    }
    HearthConfig::discover(path).map_err(|e| anyhow::anyhow!("failed to load config: {e}"))
}

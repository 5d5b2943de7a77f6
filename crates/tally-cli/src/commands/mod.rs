//! CLI subcommands.

pub mod config;
pub mod import;
pub mod merge;
pub mod segment;

use std::path::Path;

use tally_core::TallyConfig;

/// Load the configuration from an explicit path, the default config file,
/// or built-in defaults, in that order.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<TallyConfig> {
    if let Some(path) = config_path {
        return Ok(TallyConfig::from_file(Path::new(path))?);
    }

    let default_path = config::default_config_path();
    if default_path.exists() {
        Ok(TallyConfig::from_file(&default_path)?)
    } else {
        Ok(TallyConfig::default())
    }
}

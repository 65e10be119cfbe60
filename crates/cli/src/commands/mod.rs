//! Command implementations.

mod info;
mod run;
mod validate;

use std::path::Path;

use config_loader::ConfigLoader;
use contracts::StreamerConfig;

use crate::error::{CliError, Result};

pub use info::run_info;
pub use run::run_server;
pub use validate::run_validate;

/// Load `path`, or fall back to the built-in defaults
fn load_config(path: Option<&Path>) -> Result<StreamerConfig> {
    match path {
        Some(path) if !path.exists() => Err(CliError::config_not_found(path.display().to_string())),
        Some(path) => Ok(ConfigLoader::load_from_path(path)?),
        None => Ok(StreamerConfig::default()),
    }
}

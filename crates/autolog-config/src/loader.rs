//! Options loader.

use std::path::Path;

use tracing::debug;

use crate::{ConfigError, ConfigResult, Options};

/// Default options file name.
pub const CONFIG_FILE_NAME: &str = "autolog.toml";

/// Loads options from the given path.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed or validated.
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<Options> {
    let path = path.as_ref();
    debug!(?path, "loading options");

    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let options: Options = toml::from_str(&content)?;
    options.validate()?;

    Ok(options)
}

/// Finds and loads options starting from the given directory.
///
/// Walks up the directory tree until an options file is found.
///
/// # Errors
///
/// Returns an error if no options file is found or it cannot be parsed.
pub fn find_and_load_config_from(start_dir: impl AsRef<Path>) -> ConfigResult<Options> {
    let start_dir = start_dir.as_ref();
    let mut dir = start_dir;

    loop {
        let config_path = dir.join(CONFIG_FILE_NAME);
        if config_path.exists() {
            return load_config(config_path);
        }

        match dir.parent() {
            Some(parent) => dir = parent,
            None => break,
        }
    }

    Err(ConfigError::NotFound(start_dir.join(CONFIG_FILE_NAME)))
}

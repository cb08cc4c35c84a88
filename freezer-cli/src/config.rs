//! Configuration loading for freezer CLI.
//!
//! Handles loading configuration from a JSON file in the home directory.

use freezer::FreezerOptions;
use std::path::Path;
use tracing::warn;

const CONFIG_FILE_JSON: &str = "config.json";

/// Load FreezerOptions from configuration files in the given home directory.
///
/// Tries to load from config.json. The home directory always wins over any
/// `home_dir` in the file.
///
/// Returns options with defaults if no config file is found.
pub fn load_config(home_dir: &Path) -> FreezerOptions {
    let config = try_load_json(home_dir).unwrap_or_default();
    FreezerOptions {
        home_dir: home_dir.to_path_buf(),
        ..config
    }
}

fn try_load_json(home_dir: &Path) -> Option<FreezerOptions> {
    let config_path = home_dir.join(CONFIG_FILE_JSON);
    if !config_path.exists() {
        return None;
    }

    let content = match std::fs::read_to_string(&config_path) {
        Ok(c) => c,
        Err(e) => {
            warn!(
                "Failed to read config file {}: {}",
                config_path.display(),
                e
            );
            return None;
        }
    };

    match serde_json::from_str::<FreezerOptions>(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!(
                "Failed to parse config file {}: {}",
                config_path.display(),
                e
            );
            None
        }
    }
}

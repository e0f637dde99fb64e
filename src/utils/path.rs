//! Path utilities for configuration and database files

use std::path::{Path, PathBuf};

/// Config file looked up relative to the working directory
pub const LOCAL_CONFIG_FILE: &str = "config/config.yml";

/// Per-user configuration directory
///
/// `~/.config/iplookup-rs` on Linux, the platform equivalent elsewhere.
pub fn user_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("iplookup-rs"))
}

/// Config file used when none is given on the command line
///
/// Priority:
/// 1. `./config/config.yml`
/// 2. `<user config dir>/iplookup-rs/config.yml`
///
/// Falls back to the local path when neither exists so the caller can report it.
pub fn default_config_file() -> PathBuf {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    user_config_dir()
        .map(|dir| dir.join("config.yml"))
        .filter(|path| path.exists())
        .unwrap_or(local)
}

/// Expand tilde (~) in path
pub fn expand_tilde<P: AsRef<Path>>(path: P) -> PathBuf {
    let path = path.as_ref();
    if let Ok(rest) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    path.to_path_buf()
}

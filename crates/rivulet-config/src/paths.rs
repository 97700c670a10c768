//! Platform-specific paths for settings and saved graphs.
//!
//! - **User config**: `~/.config/rivulet/` (Linux), `~/Library/Application Support/rivulet/` (macOS), `%APPDATA%\rivulet\` (Windows)
//! - **Settings file**: `<user config>/settings.toml`
//! - **Saved graphs**: `<user config>/graphs/*.json`
//!
//! # Example
//!
//! ```rust,no_run
//! use rivulet_config::paths;
//!
//! if let Some(path) = paths::find_graph("tone_demo") {
//!     println!("Found graph at: {:?}", path);
//! }
//! ```

use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// Application name used for directory paths.
const APP_NAME: &str = "rivulet";

/// Subdirectory name for saved graphs.
const GRAPHS_SUBDIR: &str = "graphs";

/// File name of the default settings file.
const SETTINGS_FILE: &str = "settings.toml";

/// Returns the user-specific configuration directory.
///
/// Falls back to the current directory if the platform config directory
/// cannot be determined.
pub fn user_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Returns the directory saved graphs live in.
pub fn user_graphs_dir() -> PathBuf {
    user_config_dir().join(GRAPHS_SUBDIR)
}

/// Path of the settings file loaded when none is given explicitly.
pub fn default_settings_path() -> PathBuf {
    user_config_dir().join(SETTINGS_FILE)
}

/// Ensure the user config directory exists.
pub fn ensure_user_config_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_config_dir())
}

/// Ensure the saved graphs directory exists.
pub fn ensure_user_graphs_dir() -> Result<PathBuf, ConfigError> {
    ensure_dir(user_graphs_dir())
}

fn ensure_dir(dir: PathBuf) -> Result<PathBuf, ConfigError> {
    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| ConfigError::create_dir(&dir, e))?;
    }
    Ok(dir)
}

/// Find a graph file by name.
///
/// `name` may be a path to an existing file, or a graph name (with or
/// without `.json`) looked up in [`user_graphs_dir`].
pub fn find_graph(name: &str) -> Option<PathBuf> {
    find_graph_in(name, &user_graphs_dir())
}

/// [`find_graph`] against an explicit directory.
pub fn find_graph_in(name: &str, dir: &Path) -> Option<PathBuf> {
    let path = PathBuf::from(name);
    if path.is_file() {
        return Some(path);
    }

    let filename = if has_json_extension(&path) {
        name.to_string()
    } else {
        format!("{name}.json")
    };
    let candidate = dir.join(filename);
    candidate.is_file().then_some(candidate)
}

/// List graph files in `dir`, sorted by name.
///
/// Returns an empty vector if the directory doesn't exist or can't be read.
pub fn list_graphs_in_dir(dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut graphs: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && has_json_extension(path))
        .collect();
    graphs.sort();
    graphs
}

/// Graph name from its file path (the file stem).
pub fn graph_name_from_path(path: &Path) -> Option<String> {
    path.file_stem()
        .and_then(|s| s.to_str())
        .map(|s| s.to_string())
}

fn has_json_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

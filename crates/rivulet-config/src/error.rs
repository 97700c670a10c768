//! Configuration error type.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// File operation that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoAction {
    /// Reading a settings or graph file.
    Read,
    /// Writing a settings or graph file.
    Write,
    /// Creating a parent or config directory.
    CreateDir,
}

impl fmt::Display for IoAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            IoAction::Read => "read",
            IoAction::Write => "write",
            IoAction::CreateDir => "create directory",
        })
    }
}

/// Errors raised while loading or saving settings and graphs.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A filesystem operation failed on `path`.
    #[error("failed to {action} '{path}': {source}")]
    Io {
        /// What was being attempted.
        action: IoAction,
        /// File or directory involved.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Settings file is not valid TOML for [`EngineSettings`](crate::EngineSettings).
    #[error("invalid settings TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Settings could not be encoded.
    #[error("cannot encode settings: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// Malformed graph document, or one that could not be encoded.
    #[error("invalid graph JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// No graph file under the given name.
    #[error("graph not found: {0}")]
    GraphNotFound(String),

    /// Settings or document failed validation.
    #[error(transparent)]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    fn io(action: IoAction, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConfigError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// A failed read of `path`.
    pub fn read_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Read, path, source)
    }

    /// A failed write of `path`.
    pub fn write_file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::Write, path, source)
    }

    /// A failed `create_dir_all` of `path`.
    pub fn create_dir(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::io(IoAction::CreateDir, path, source)
    }

    /// The path involved, for I/O failures.
    pub fn path(&self) -> Option<&Path> {
        match self {
            ConfigError::Io { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// Writes `content` to `path`, creating missing parent directories.
pub(crate) fn write_with_parents(path: &Path, content: &str) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
    }
    std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))
}

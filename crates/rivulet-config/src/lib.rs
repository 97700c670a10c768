//! Settings and graph documents for rivulet.
//!
//! # Features
//!
//! - **Engine settings**: sample rate, buffer size and cycle count in TOML
//! - **Graph documents**: node/edge records plus the editor viewport in JSON
//! - **Validation**: settings ranges, and node block types and parameters
//!   checked against a catalog
//! - **Paths**: platform-specific config and saved-graph directories
//!
//! # Example
//!
//! ```rust,no_run
//! use rivulet_config::{EngineSettings, GraphDocument, paths};
//!
//! let settings = EngineSettings::load(paths::default_settings_path()).unwrap_or_default();
//! let graph = GraphDocument::load("tone_demo.json").unwrap();
//! println!("{} nodes at {} Hz", graph.nodes.len(), settings.sample_rate);
//! ```

mod document;
mod error;
mod settings;

/// Platform-specific paths for settings and saved graphs.
pub mod paths;

/// Settings and document validation.
pub mod validation;

pub use document::{GraphDocument, Viewport};
pub use error::{ConfigError, IoAction};
pub use paths::{
    default_settings_path, ensure_user_config_dir, ensure_user_graphs_dir, find_graph,
    user_config_dir, user_graphs_dir,
};
pub use settings::EngineSettings;
pub use validation::{ValidationError, ValidationResult, validate_document, validate_settings};

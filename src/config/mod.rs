//! Project settings and pipeline definition loading.
//!
//! - Schema definitions in [`schema`]
//! - Settings and definition discovery in [`loader`]
//!
//! # Example
//!
//! ```
//! use labflow::config::{load_definitions, ProjectLayout};
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! fs::write(temp.path().join("illum.pipe.yml"), "chain: []").unwrap();
//!
//! let layout = ProjectLayout::load(temp.path()).unwrap();
//! let definitions = load_definitions(&layout).unwrap();
//! assert_eq!(definitions[0].name.as_deref(), Some("illum"));
//! ```

pub mod loader;
pub mod schema;

pub use loader::{load_definitions, load_settings, parse_definition, settings_path, ProjectLayout};
pub use schema::{PipelineDefinition, ProjectSettings, StepDefinition, StepParameters};

//! Flag store implementations.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use chrono::Utc;

use crate::error::Result;

/// Directory (inside a pipeline's flag prefix) holding step markers.
const FLAG_DIR: &str = ".flags";

/// Extension of a step completion marker.
const FLAG_EXTENSION: &str = "complete";

/// Prior completion state keyed by pipeline and step.
pub trait FlagStore {
    /// Whether the step completed in a previous or the current run.
    fn is_complete(&self, pipeline: &str, step: &str) -> Result<bool>;

    /// Record the step as complete.
    fn mark_complete(&mut self, pipeline: &str, step: &str) -> Result<()>;

    /// Forget every completed step of `pipeline`.
    fn clear_pipeline(&mut self, pipeline: &str) -> Result<()>;
}

/// One marker file per completed step, at
/// `<root>/<pipeline>/.flags/<step>.complete`.
///
/// Removing a pipeline's output directory also drops its flags when the
/// root is the project root.
#[derive(Debug, Clone)]
pub struct FileFlagStore {
    root: PathBuf,
}

impl FileFlagStore {
    /// Create a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Marker path for a step.
    pub fn flag_path(&self, pipeline: &str, step: &str) -> PathBuf {
        self.root
            .join(pipeline)
            .join(FLAG_DIR)
            .join(format!("{}.{}", step, FLAG_EXTENSION))
    }
}

impl FlagStore for FileFlagStore {
    fn is_complete(&self, pipeline: &str, step: &str) -> Result<bool> {
        Ok(self.flag_path(pipeline, step).is_file())
    }

    fn mark_complete(&mut self, pipeline: &str, step: &str) -> Result<()> {
        let path = self.flag_path(pipeline, step);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, Utc::now().to_rfc3339())?;
        Ok(())
    }

    fn clear_pipeline(&mut self, pipeline: &str) -> Result<()> {
        let dir = self.root.join(pipeline).join(FLAG_DIR);
        if dir.is_dir() {
            fs::remove_dir_all(&dir)?;
        }
        Ok(())
    }
}

/// In-memory flags, for tests and throwaway runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryFlagStore {
    complete: HashSet<(String, String)>,
}

impl MemoryFlagStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed steps.
    pub fn len(&self) -> usize {
        self.complete.len()
    }

    /// Whether no step is complete.
    pub fn is_empty(&self) -> bool {
        self.complete.is_empty()
    }
}

impl FlagStore for MemoryFlagStore {
    fn is_complete(&self, pipeline: &str, step: &str) -> Result<bool> {
        Ok(self
            .complete
            .contains(&(pipeline.to_string(), step.to_string())))
    }

    fn mark_complete(&mut self, pipeline: &str, step: &str) -> Result<()> {
        self.complete.insert((pipeline.to_string(), step.to_string()));
        Ok(())
    }

    fn clear_pipeline(&mut self, pipeline: &str) -> Result<()> {
        self.complete.retain(|(p, _)| p != pipeline);
        Ok(())
    }
}

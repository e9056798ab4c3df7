//! Project settings and pipeline definition discovery.
//!
//! Settings come from an optional `.labflow/config.yml` in the project root.
//! Every regular file in the project root whose name ends with the configured
//! `pipe_extension` is a pipeline definition. Definitions are returned sorted
//! by file name, which is the discovery order used to break ordering ties.

use crate::config::schema::{PipelineDefinition, ProjectSettings};
use crate::error::{LabflowError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Resolved locations for a project.
#[derive(Debug, Clone)]
pub struct ProjectLayout {
    root: PathBuf,
    settings: ProjectSettings,
}

impl ProjectLayout {
    /// Create a layout from an explicit root and settings.
    pub fn new(root: impl Into<PathBuf>, settings: ProjectSettings) -> Self {
        Self {
            root: root.into(),
            settings,
        }
    }

    /// Load the layout for a project root, reading settings if present.
    pub fn load(root: &Path) -> Result<Self> {
        let settings = load_settings(root)?;
        Ok(Self::new(root, settings))
    }

    /// Project root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Loaded settings.
    pub fn settings(&self) -> &ProjectSettings {
        &self.settings
    }

    /// Directory for run reports and the status view.
    pub fn report_dir(&self) -> PathBuf {
        self.root.join(&self.settings.report_dir)
    }

    /// Root for completion flags.
    pub fn flag_prefix(&self) -> PathBuf {
        match &self.settings.flag_prefix {
            Some(prefix) => self.root.join(prefix),
            None => self.root.clone(),
        }
    }

    /// Output location of a pipeline.
    pub fn pipeline_output(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Definition files in discovery order.
    pub fn definition_files(&self) -> Result<Vec<PathBuf>> {
        let extension = &self.settings.pipe_extension;
        let mut files = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let path = entry.path();
            let matches = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(extension.as_str()) && n.len() > extension.len());
            if matches {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

/// Path of the settings file for a project root.
pub fn settings_path(root: &Path) -> PathBuf {
    root.join(".labflow").join("config.yml")
}

/// Load project settings, falling back to defaults when no file exists.
pub fn load_settings(root: &Path) -> Result<ProjectSettings> {
    let path = settings_path(root);
    if !path.exists() {
        return Ok(ProjectSettings::default());
    }

    let content = fs::read_to_string(&path)?;
    if content.trim().is_empty() {
        return Ok(ProjectSettings::default());
    }
    serde_yaml::from_str(&content).map_err(|e| LabflowError::ConfigParseError {
        path,
        message: e.to_string(),
    })
}

/// Parse YAML content into a pipeline definition.
///
/// A missing `name` is filled from the file name with `extension` stripped.
pub fn parse_definition(content: &str, source_path: &Path, extension: &str) -> Result<PipelineDefinition> {
    let mut definition: PipelineDefinition =
        serde_yaml::from_str(content).map_err(|e| LabflowError::ConfigParseError {
            path: source_path.to_path_buf(),
            message: e.to_string(),
        })?;

    if definition.name.is_none() {
        let file_name = source_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default();
        let stem = file_name.strip_suffix(extension).unwrap_or(file_name);
        definition.name = Some(stem.to_string());
    }

    Ok(definition)
}

/// Load every pipeline definition of a project, in discovery order.
pub fn load_definitions(layout: &ProjectLayout) -> Result<Vec<PipelineDefinition>> {
    let extension = layout.settings().pipe_extension.clone();
    let mut definitions = Vec::new();
    for path in layout.definition_files()? {
        let content = fs::read_to_string(&path)?;
        definitions.push(parse_definition(&content, &path, &extension)?);
    }
    tracing::debug!("Discovered {} pipeline definitions", definitions.len());
    Ok(definitions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_settings_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let settings = load_settings(temp.path()).unwrap();
        assert_eq!(settings, ProjectSettings::default());
    }

    #[test]
    fn load_settings_reads_file() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".labflow")).unwrap();
        fs::write(
            settings_path(temp.path()),
            "pipe_extension: .br\nreport_dir: out/reports\n",
        )
        .unwrap();

        let layout = ProjectLayout::load(temp.path()).unwrap();
        assert_eq!(layout.settings().pipe_extension, ".br");
        assert_eq!(layout.report_dir(), temp.path().join("out/reports"));
    }

    #[test]
    fn load_settings_rejects_invalid_yaml() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".labflow")).unwrap();
        fs::write(settings_path(temp.path()), "pipe_extension: [unclosed").unwrap();

        let result = load_settings(temp.path());
        assert!(matches!(result, Err(LabflowError::ConfigParseError { .. })));
    }

    #[test]
    fn flag_prefix_defaults_to_root() {
        let layout = ProjectLayout::new("/data/plate1", ProjectSettings::default());
        assert_eq!(layout.flag_prefix(), PathBuf::from("/data/plate1"));
        assert_eq!(layout.pipeline_output("illum"), PathBuf::from("/data/plate1/illum"));
    }

    #[test]
    fn definition_files_sorted_and_filtered() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("b.pipe.yml"), "chain: []").unwrap();
        fs::write(temp.path().join("a.pipe.yml"), "chain: []").unwrap();
        fs::write(temp.path().join("notes.txt"), "").unwrap();
        fs::write(temp.path().join(".pipe.yml"), "").unwrap();
        fs::create_dir_all(temp.path().join("c.pipe.yml")).unwrap();

        let layout = ProjectLayout::new(temp.path(), ProjectSettings::default());
        let files = layout.definition_files().unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.pipe.yml", "b.pipe.yml"]);
    }

    #[test]
    fn parse_definition_defaults_name_to_stem() {
        let def = parse_definition("chain: []", Path::new("/p/illum.pipe.yml"), ".pipe.yml").unwrap();
        assert_eq!(def.name.as_deref(), Some("illum"));
    }

    #[test]
    fn parse_definition_keeps_explicit_name() {
        let def = parse_definition(
            "name: custom\nchain: []",
            Path::new("/p/illum.pipe.yml"),
            ".pipe.yml",
        )
        .unwrap();
        assert_eq!(def.name.as_deref(), Some("custom"));
    }

    #[test]
    fn load_definitions_in_file_order() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("02_measure.pipe.yml"), "chain: []").unwrap();
        fs::write(temp.path().join("01_illum.pipe.yml"), "chain: []").unwrap();

        let layout = ProjectLayout::new(temp.path(), ProjectSettings::default());
        let defs = load_definitions(&layout).unwrap();
        let names: Vec<_> = defs.iter().map(|d| d.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["01_illum", "02_measure"]);
    }
}

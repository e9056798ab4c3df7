//! Integration tests for project loading through the public config API.

use labflow::config::{load_definitions, settings_path, ProjectLayout};
use labflow::pipeline::instantiate;
use labflow::steps::StepRegistry;
use labflow::LabflowError;
use std::fs;
use tempfile::TempDir;

#[test]
fn definitions_are_discovered_in_file_name_order() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("c_measure.pipe.yml"), "chain: []").unwrap();
    fs::write(temp.path().join("a_illum.pipe.yml"), "chain: []").unwrap();
    fs::write(temp.path().join("b_align.pipe.yml"), "name: align\nchain: []").unwrap();
    fs::write(temp.path().join("notes.yml"), "chain: []").unwrap();
    fs::create_dir(temp.path().join("dir.pipe.yml")).unwrap();

    let layout = ProjectLayout::load(temp.path()).unwrap();
    let names: Vec<_> = load_definitions(&layout)
        .unwrap()
        .into_iter()
        .map(|d| d.name.unwrap())
        .collect();

    assert_eq!(names, vec!["a_illum", "align", "c_measure"]);
}

#[test]
fn settings_change_extension_and_locations() {
    let temp = TempDir::new().unwrap();
    let settings = settings_path(temp.path());
    fs::create_dir_all(settings.parent().unwrap()).unwrap();
    fs::write(
        &settings,
        "pipe_extension: .flow.yaml\nreport_dir: out/reports\nflag_prefix: state\n",
    )
    .unwrap();
    fs::write(temp.path().join("illum.flow.yaml"), "chain: []").unwrap();
    fs::write(temp.path().join("ignored.pipe.yml"), "chain: []").unwrap();

    let layout = ProjectLayout::load(temp.path()).unwrap();
    let definitions = load_definitions(&layout).unwrap();
    assert_eq!(definitions.len(), 1);
    assert_eq!(definitions[0].name.as_deref(), Some("illum"));
    assert_eq!(layout.report_dir(), temp.path().join("out/reports"));

    let pipelines = instantiate(&definitions, &layout, &StepRegistry::with_builtins()).unwrap();
    assert_eq!(pipelines[0].output_path, temp.path().join("illum"));
    assert_eq!(pipelines[0].process_path, temp.path().join("state/illum"));
}

#[test]
fn full_definition_is_instantiated() {
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("measure.pipe.yml"),
        r#"
type: default
after: illum
chain:
  - name: segment
    default_parameters:
      command: ./segment.sh
      timeout: 600
  - type: noop
"#,
    )
    .unwrap();

    let layout = ProjectLayout::load(temp.path()).unwrap();
    let definitions = load_definitions(&layout).unwrap();
    let pipelines = instantiate(&definitions, &layout, &StepRegistry::with_builtins()).unwrap();
    let measure = &pipelines[0];

    assert_eq!(measure.after.as_deref(), Some("illum"));
    assert_eq!(measure.steps.len(), 2);
    assert_eq!(measure.steps[0].kind, "command");
    assert_eq!(measure.steps[0].default_parameters["timeout"], 600);
    assert_eq!(measure.steps[1].name, "noop");
    assert_eq!(measure.output_path, temp.path().join("measure"));
}

#[test]
fn duplicate_names_are_rejected() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.pipe.yml"), "name: same\nchain: []").unwrap();
    fs::write(temp.path().join("b.pipe.yml"), "name: same\nchain: []").unwrap();

    let layout = ProjectLayout::load(temp.path()).unwrap();
    let definitions = load_definitions(&layout).unwrap();
    let result = instantiate(&definitions, &layout, &StepRegistry::with_builtins());

    assert!(matches!(
        result,
        Err(LabflowError::ConfigValidationError { .. })
    ));
}

#[test]
fn malformed_settings_are_reported_with_path() {
    let temp = TempDir::new().unwrap();
    let settings = settings_path(temp.path());
    fs::create_dir_all(settings.parent().unwrap()).unwrap();
    fs::write(&settings, "report_dir: [").unwrap();

    match ProjectLayout::load(temp.path()) {
        Err(LabflowError::ConfigParseError { path, .. }) => assert_eq!(path, settings),
        other => panic!("expected parse error, got {:?}", other),
    }
}

//! Regression corpus tests for workflow fixtures.

use camino::Utf8Path;
use rstest::rstest;
use test_helpers::{fixture_source, load_fixture};
use workflowdef::DefError;
use workflowdef::def::{WorkflowDef, WorkflowField};
use workflowdef::fallible::FaultCarrier;
use workflowdef::load::{DiagnosticCode, LoadOptions, Loaded, load_workflow_file, load_workflow_with};

fn load_from_fixture(fixture_name: &str) -> Result<Loaded<WorkflowDef>, DefError> {
    let options = LoadOptions::new(fixture_source(fixture_name));
    load_workflow_with(&load_fixture(fixture_name), &options)
}

#[rstest]
#[case::clean("clean_workflow.yaml", 0)]
#[case::empty_sections("empty_sections.yaml", 0)]
#[case::faulty("faulty_workflow.yaml", 12)]
#[case::misshapen_sections("misshapen_sections.yaml", 3)]
fn tolerant_corpus_loads_with_expected_fault_count(
    #[case] fixture_name: &str,
    #[case] faults: usize,
) {
    let loaded = match load_from_fixture(fixture_name) {
        Ok(loaded) => loaded,
        Err(error) => panic!("expected {fixture_name} to load, got: {error}"),
    };
    assert_eq!(loaded.diagnostics.len(), faults, "{:?}", loaded.diagnostics);
    assert_eq!(loaded.def.fault_tree().len(), faults);
    assert_eq!(loaded.is_clean(), faults == 0);
}

#[rstest]
#[case::malformed_yaml("malformed_yaml.yaml")]
#[case::scalar_root("scalar_root.yaml")]
fn fatal_corpus_fails_with_diagnostic_source(#[case] fixture_name: &str) {
    let result = load_from_fixture(fixture_name);
    let Err(error) = result else {
        panic!("expected {fixture_name} to fail");
    };
    assert!(matches!(error, DefError::Deserialize { .. }));
    let Some(diagnostic) = error.diagnostic() else {
        panic!("diagnostic should be present for {fixture_name}");
    };
    assert_eq!(diagnostic.code, DiagnosticCode::ParseFailure);
    assert_eq!(diagnostic.source, fixture_source(fixture_name));
}

#[rstest]
fn misshapen_sections_fault_on_the_section_itself() {
    let Ok(loaded) = load_from_fixture("misshapen_sections.yaml") else {
        panic!("misshapen sections should load tolerantly");
    };
    let workflow = &loaded.def;
    assert_eq!(workflow.name(), None);
    assert!(workflow.nodes().is_empty());
    assert!(workflow.connections().is_empty());

    let nodes_fault = workflow
        .supply_fault(WorkflowField::Nodes)
        .map(ToString::to_string);
    assert_eq!(
        nodes_fault,
        Some("expected mapping, found sequence".to_owned())
    );
    let connections_fault = workflow
        .supply_fault(WorkflowField::Connections)
        .map(ToString::to_string);
    assert_eq!(
        connections_fault,
        Some("expected sequence, found mapping".to_owned())
    );
    assert!(workflow.supply_fault(WorkflowField::Annotations).is_none());
}

#[rstest]
#[case::clean("clean_workflow.yaml")]
#[case::faulty("faulty_workflow.yaml")]
fn file_and_string_loads_agree(#[case] fixture_name: &str) {
    let source = fixture_source(fixture_name);
    let from_file = load_workflow_file(Utf8Path::new(&source), &LoadOptions::new(source.clone()));
    let from_string = load_from_fixture(fixture_name);
    let (Ok(file_loaded), Ok(string_loaded)) = (from_file, from_string) else {
        panic!("{fixture_name} should load both ways");
    };
    assert_eq!(file_loaded, string_loaded);
}

//! Behavioural tests for strict workflow loading using `rstest-bdd`.

use rstest_bdd_macros::{given, scenario, then};
use test_helpers::{fixture_source, load_fixture};
use workflowdef::DefError;
use workflowdef::def::{NodeField, WorkflowDef};
use workflowdef::fallible::{FaultCarrier, FieldId};
use workflowdef::load::{DiagnosticPosition, LoadOptions, Loaded, load_workflow_with};

fn load_strictly(name: &str) -> Result<Loaded<WorkflowDef>, DefError> {
    let options = LoadOptions::new(fixture_source(name)).strict();
    load_workflow_with(&load_fixture(name), &options)
}

#[given("a clean workflow fixture")]
fn given_clean_workflow_fixture() {}

#[then("strict loading succeeds with an identical workflow")]
fn then_strict_loading_succeeds_with_an_identical_workflow() {
    let name = "clean_workflow.yaml";
    let strict = match load_strictly(name) {
        Ok(loaded) => loaded,
        Err(error) => panic!("strict load of a clean fixture should succeed: {error}"),
    };
    let tolerant = match load_workflow_with(&load_fixture(name), &LoadOptions::new(name)) {
        Ok(loaded) => loaded,
        Err(error) => panic!("tolerant load of a clean fixture should succeed: {error}"),
    };
    assert!(strict.is_clean());
    assert!(!strict.def.has_faults());
    assert_eq!(strict.def, tolerant.def);
}

#[given("a workflow fixture with malformed fields")]
fn given_workflow_fixture_with_malformed_fields() {}

#[then("strict loading fails at the first malformed node field")]
fn then_strict_loading_fails_at_the_first_malformed_node_field() {
    let result = load_strictly("faulty_workflow.yaml");
    let Err(error) = result else {
        panic!("strict load of a faulty fixture should fail");
    };
    let DefError::Strict { entity, key, fault } = &error else {
        panic!("expected a strict failure, got {error}");
    };
    assert_eq!(*entity, "NodeDef");
    assert_eq!(*key, NodeField::Id.key());
    assert_eq!(fault.to_string(), "expected integer, found string");
    assert_eq!(
        error.to_string(),
        "strict build of NodeDef failed at 'id': expected integer, found string"
    );
    assert!(error.diagnostic().is_none());
}

#[given("a workflow fixture with broken YAML syntax")]
fn given_workflow_fixture_with_broken_yaml_syntax() {}

#[then("strict loading fails with a located parse diagnostic")]
fn then_strict_loading_fails_with_a_located_parse_diagnostic() {
    let name = "malformed_yaml.yaml";
    let result = load_strictly(name);
    let Err(error) = result else {
        panic!("malformed YAML should be rejected");
    };
    assert!(error.strict_fault().is_none());
    let Some(diagnostic) = error.diagnostic() else {
        panic!("diagnostic should be present");
    };
    assert_eq!(diagnostic.code.as_str(), "workflow.parse_failure");
    assert_eq!(diagnostic.source, fixture_source(name));
    let DiagnosticPosition::Location { line, column } = &diagnostic.position else {
        panic!("parse diagnostics carry a location");
    };
    assert!(*line > 0);
    assert!(*column > 0);
}

#[scenario(
    path = "tests/features/strict_load.feature",
    name = "A clean workflow loads strictly"
)]
fn a_clean_workflow_loads_strictly() {}

#[scenario(
    path = "tests/features/strict_load.feature",
    name = "The first malformed field aborts a strict load"
)]
fn the_first_malformed_field_aborts_a_strict_load() {}

#[scenario(
    path = "tests/features/strict_load.feature",
    name = "Malformed YAML fails before any builder runs"
)]
fn malformed_yaml_fails_before_any_builder_runs() {}

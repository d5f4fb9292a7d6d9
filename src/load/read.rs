//! Readers that feed a parsed document through the entity builders.
//!
//! Every field is handed to its builder's `_with` setter, so a malformed
//! value becomes a recorded fault (or a strict abort) instead of a parse
//! error. A null value is treated like an absent key: optional fields stay
//! unset and required fields are recorded as missing by `build()`.
//!
//! Nested entities are read by functions returning [`Nested`]: the outer
//! error aborts a strict load, the inner error is the reason the entity
//! could not be supplied to its parent.

use indexmap::IndexMap;

use crate::def::{
    AnnotationDef, AnnotationDefBuilder, AnnotationField, BoundsDef, BoundsDefBuilder,
    BoundsField, ConfigDef, ConfigMapDefBuilder, ConfigMapField, ConfigValue,
    ConfigValueDefBuilder, ConfigValueField, ConnectionDef, ConnectionDefBuilder,
    ConnectionField, Coordinate, NodeDef, NodeDefBuilder, NodeField, NodeKind, PortDef,
    PortDefBuilder, PortField, PortTypeId, WorkflowDef, WorkflowDefBuilder, WorkflowField,
};
use crate::error::{DefError, FieldError};
use crate::fallible::{BuildMode, FieldId};

use super::value::DocValue;

type Entries = IndexMap<String, DocValue>;

type Nested<T> = Result<Result<T, FieldError>, DefError>;

const fn mismatch(expected: &'static str, found: &DocValue) -> FieldError {
    FieldError::TypeMismatch {
        expected,
        found: found.kind(),
    }
}

fn mapping(value: &DocValue) -> Result<&Entries, FieldError> {
    value.as_mapping().ok_or_else(|| mismatch("mapping", value))
}

fn sequence(value: &DocValue) -> Result<&[DocValue], FieldError> {
    value.as_sequence().ok_or_else(|| mismatch("sequence", value))
}

fn present(entries: &Entries, field: impl FieldId) -> Option<&DocValue> {
    entries.get(field.name()).filter(|value| !value.is_null())
}

fn ignore_unknown<F: FieldId>(entity: &'static str, entries: &Entries, fields: &[F]) {
    for key in entries.keys() {
        if !fields.iter().any(|field| field.name() == key.as_str()) {
            tracing::debug!(entity, key = %key, "ignoring unknown key");
        }
    }
}

fn integer<T: TryFrom<i64>>(value: &DocValue, target: &'static str) -> Result<T, FieldError> {
    match value {
        DocValue::Integer(number) => {
            T::try_from(*number).map_err(|_| FieldError::OutOfRange {
                value: number.to_string(),
                target,
            })
        }
        other => Err(mismatch("integer", other)),
    }
}

fn boolean(value: &DocValue) -> Result<bool, FieldError> {
    match value {
        DocValue::Bool(flag) => Ok(*flag),
        other => Err(mismatch("bool", other)),
    }
}

fn string(value: &DocValue) -> Result<String, FieldError> {
    match value {
        DocValue::String(text) => Ok(text.clone()),
        other => Err(mismatch("string", other)),
    }
}

fn port_type(value: &DocValue) -> Result<PortTypeId, FieldError> {
    PortTypeId::new(string(value)?)
}

fn node_kind(value: &DocValue) -> Result<NodeKind, FieldError> {
    match value {
        DocValue::String(text) => text.parse(),
        other => Err(mismatch("string", other)),
    }
}

fn coordinate(value: &DocValue) -> Result<Coordinate, FieldError> {
    match value {
        DocValue::Sequence(items) => match items.as_slice() {
            [x, y] => Ok(Coordinate::new(integer(x, "i32")?, integer(y, "i32")?)),
            _ => Err(FieldError::TypeMismatch {
                expected: "pair of integers",
                found: "sequence",
            }),
        },
        DocValue::Mapping(entries) => {
            let x = entries.get("x").ok_or_else(|| FieldError::missing("x"))?;
            let y = entries.get("y").ok_or_else(|| FieldError::missing("y"))?;
            Ok(Coordinate::new(integer(x, "i32")?, integer(y, "i32")?))
        }
        other => Err(mismatch("coordinate", other)),
    }
}

fn config_value(value: &DocValue) -> Result<ConfigValue, FieldError> {
    match value {
        DocValue::Bool(flag) => Ok(ConfigValue::Bool(*flag)),
        DocValue::Integer(number) => Ok(ConfigValue::Int(*number)),
        DocValue::Float(number) => Ok(ConfigValue::Double(*number)),
        DocValue::String(text) => Ok(ConfigValue::String(text.clone())),
        other => Err(mismatch("scalar", other)),
    }
}

/// Reads a whole workflow from the root mapping of a document.
pub(crate) fn workflow(entries: &Entries, mode: BuildMode) -> Result<WorkflowDef, DefError> {
    ignore_unknown(
        "WorkflowDef",
        entries,
        &[
            WorkflowField::Name,
            WorkflowField::Nodes,
            WorkflowField::Connections,
            WorkflowField::Annotations,
        ],
    );
    let mut builder = WorkflowDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, WorkflowField::Name) {
        builder.set_name_with(string(value).map(Some), None)?;
    }
    if let Some(value) = present(entries, WorkflowField::Nodes) {
        match mapping(value) {
            Ok(nodes) => {
                for (key, item) in nodes {
                    builder.put_to_nodes_with(
                        key.clone(),
                        node(item, mode)?,
                        NodeDef::placeholder(),
                    )?;
                }
            }
            Err(error) => {
                builder.set_nodes_with(Err(error), IndexMap::new())?;
            }
        }
    }
    if let Some(value) = present(entries, WorkflowField::Connections) {
        match sequence(value) {
            Ok(items) => {
                for item in items {
                    builder.add_to_connections_with(
                        connection(item, mode)?,
                        ConnectionDef::placeholder(),
                    )?;
                }
            }
            Err(error) => {
                builder.set_connections_with(Err(error), Vec::new())?;
            }
        }
    }
    if let Some(value) = present(entries, WorkflowField::Annotations) {
        match sequence(value) {
            Ok(items) => {
                for item in items {
                    builder.add_to_annotations_with(
                        annotation(item, mode)?,
                        AnnotationDef::placeholder(),
                    )?;
                }
            }
            Err(error) => {
                builder.set_annotations_with(Err(error), Vec::new())?;
            }
        }
    }

    builder.build()
}

fn node(doc: &DocValue, mode: BuildMode) -> Nested<NodeDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };
    ignore_unknown(
        "NodeDef",
        entries,
        &[
            NodeField::Id,
            NodeField::Name,
            NodeField::Kind,
            NodeField::Bounds,
            NodeField::InPorts,
            NodeField::OutPorts,
            NodeField::ModelSettings,
        ],
    );
    let mut builder = NodeDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, NodeField::Id) {
        builder.set_id_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, NodeField::Name) {
        builder.set_name_with(string(value), None)?;
    }
    if let Some(value) = present(entries, NodeField::Kind) {
        builder.set_kind_with(node_kind(value), None)?;
    }
    if let Some(value) = present(entries, NodeField::Bounds) {
        builder.set_bounds_with(bounds(value, mode)?.map(Some), None)?;
    }
    if let Some(value) = present(entries, NodeField::InPorts) {
        match sequence(value) {
            Ok(items) => {
                for item in items {
                    builder
                        .add_to_in_ports_with(port(item, mode)?, PortDef::placeholder())?;
                }
            }
            Err(error) => {
                builder.set_in_ports_with(Err(error), Vec::new())?;
            }
        }
    }
    if let Some(value) = present(entries, NodeField::OutPorts) {
        match sequence(value) {
            Ok(items) => {
                for item in items {
                    builder
                        .add_to_out_ports_with(port(item, mode)?, PortDef::placeholder())?;
                }
            }
            Err(error) => {
                builder.set_out_ports_with(Err(error), Vec::new())?;
            }
        }
    }
    if let Some(value) = present(entries, NodeField::ModelSettings) {
        builder.set_model_settings_with(config(value, mode)?.map(Some), None)?;
    }

    builder.build().map(Ok)
}

fn bounds(doc: &DocValue, mode: BuildMode) -> Nested<BoundsDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };
    ignore_unknown(
        "BoundsDef",
        entries,
        &[
            BoundsField::X,
            BoundsField::Y,
            BoundsField::Width,
            BoundsField::Height,
        ],
    );
    let mut builder = BoundsDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, BoundsField::X) {
        builder.set_x_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, BoundsField::Y) {
        builder.set_y_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, BoundsField::Width) {
        builder.set_width_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, BoundsField::Height) {
        builder.set_height_with(integer(value, "i32"), None)?;
    }

    builder.build().map(Ok)
}

fn port(doc: &DocValue, mode: BuildMode) -> Nested<PortDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };
    ignore_unknown(
        "PortDef",
        entries,
        &[PortField::Index, PortField::PortType, PortField::Name],
    );
    let mut builder = PortDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, PortField::Index) {
        builder.set_index_with(integer(value, "u32"), None)?;
    }
    if let Some(value) = present(entries, PortField::PortType) {
        builder.set_port_type_with(port_type(value), None)?;
    }
    if let Some(value) = present(entries, PortField::Name) {
        builder.set_name_with(string(value).map(Some), None)?;
    }

    builder.build().map(Ok)
}

fn connection(doc: &DocValue, mode: BuildMode) -> Nested<ConnectionDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };
    ignore_unknown(
        "ConnectionDef",
        entries,
        &[
            ConnectionField::SourceId,
            ConnectionField::SourcePort,
            ConnectionField::DestId,
            ConnectionField::DestPort,
            ConnectionField::Deletable,
            ConnectionField::BendPoints,
        ],
    );
    let mut builder = ConnectionDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, ConnectionField::SourceId) {
        builder.set_source_id_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, ConnectionField::SourcePort) {
        builder.set_source_port_with(integer(value, "u32"), None)?;
    }
    if let Some(value) = present(entries, ConnectionField::DestId) {
        builder.set_dest_id_with(integer(value, "i32"), None)?;
    }
    if let Some(value) = present(entries, ConnectionField::DestPort) {
        builder.set_dest_port_with(integer(value, "u32"), None)?;
    }
    if let Some(value) = present(entries, ConnectionField::Deletable) {
        builder.set_deletable_with(boolean(value).map(Some), None)?;
    }
    if let Some(value) = present(entries, ConnectionField::BendPoints) {
        match sequence(value) {
            Ok(items) => {
                for item in items {
                    builder.add_to_bend_points_with(coordinate(item), Coordinate::default())?;
                }
            }
            Err(error) => {
                builder.set_bend_points_with(Err(error), Vec::new())?;
            }
        }
    }

    builder.build().map(Ok)
}

fn annotation(doc: &DocValue, mode: BuildMode) -> Nested<AnnotationDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };
    ignore_unknown(
        "AnnotationDef",
        entries,
        &[
            AnnotationField::Text,
            AnnotationField::Bounds,
            AnnotationField::BorderSize,
        ],
    );
    let mut builder = AnnotationDefBuilder::with_mode(mode);

    if let Some(value) = present(entries, AnnotationField::Text) {
        builder.set_text_with(string(value), None)?;
    }
    if let Some(value) = present(entries, AnnotationField::Bounds) {
        builder.set_bounds_with(bounds(value, mode)?, None)?;
    }
    if let Some(value) = present(entries, AnnotationField::BorderSize) {
        builder.set_border_size_with(integer(value, "i32").map(Some), None)?;
    }

    builder.build().map(Ok)
}

/// A config entry is a mapping holding either `children` or `value`.
fn config(doc: &DocValue, mode: BuildMode) -> Nested<ConfigDef> {
    let entries = match mapping(doc) {
        Ok(found) => found,
        Err(error) => return Ok(Err(error)),
    };

    if entries.contains_key(ConfigMapField::Children.name()) {
        ignore_unknown("ConfigMapDef", entries, &[ConfigMapField::Children]);
        let mut builder = ConfigMapDefBuilder::with_mode(mode);
        if let Some(value) = present(entries, ConfigMapField::Children) {
            match mapping(value) {
                Ok(children) => {
                    for (key, child) in children {
                        builder.put_to_children_with(
                            key.clone(),
                            config(child, mode)?,
                            ConfigDef::default(),
                        )?;
                    }
                }
                Err(error) => {
                    builder.set_children_with(Err(error), IndexMap::new())?;
                }
            }
        }
        return builder.build().map(|map| Ok(map.into()));
    }

    if entries.contains_key(ConfigValueField::Value.name()) {
        ignore_unknown("ConfigValueDef", entries, &[ConfigValueField::Value]);
        let mut builder = ConfigValueDefBuilder::with_mode(mode);
        if let Some(value) = present(entries, ConfigValueField::Value) {
            builder.set_value_with(config_value(value), None)?;
        }
        return builder.build().map(|leaf| Ok(leaf.into()));
    }

    Ok(Err(FieldError::TypeMismatch {
        expected: "config entry with 'children' or 'value'",
        found: "mapping",
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallible::{FaultCarrier, FaultKey, FaultTree};
    use rstest::rstest;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn root(input: &str) -> Result<Entries, Box<dyn std::error::Error>> {
        let value: DocValue = serde_saphyr::from_str(input)?;
        match value {
            DocValue::Mapping(entries) => Ok(entries),
            other => Err(format!("expected a mapping, found {}", other.kind()).into()),
        }
    }

    fn cause_at(tree: &FaultTree, keys: &[FaultKey]) -> Option<FieldError> {
        tree.at(keys)
            .and_then(FaultTree::fault)
            .and_then(|fault| fault.downcast_ref::<FieldError>())
            .cloned()
    }

    #[rstest]
    #[case::pair("[3, 4]", Coordinate::new(3, 4))]
    #[case::mapping("{x: -1, y: 9}", Coordinate::new(-1, 9))]
    fn coordinates_accept_both_spellings(
        #[case] input: &str,
        #[case] expected: Coordinate,
    ) -> TestResult {
        let value: DocValue = serde_saphyr::from_str(input)?;
        assert_eq!(coordinate(&value)?, expected);
        Ok(())
    }

    #[test]
    fn integer_out_of_range_is_reported() {
        let result = integer::<u32>(&DocValue::Integer(-1), "u32");
        assert_eq!(
            result,
            Err(FieldError::OutOfRange {
                value: "-1".to_owned(),
                target: "u32",
            })
        );
    }

    #[test]
    fn clean_workflow_reads_every_field() -> TestResult {
        let entries = root(
            r"
name: demo
nodes:
  node_1:
    id: 1
    name: Table Creator
    kind: NATIVENODE
    out_ports:
      - index: 1
        port_type: org.knime.core.node.BufferedDataTable
connections: []
",
        )?;
        let loaded = workflow(&entries, BuildMode::Tolerant)?;
        assert_eq!(loaded.name(), Some("demo"));
        let node = loaded.node("node_1");
        assert_eq!(node.and_then(NodeDef::kind), Some(NodeKind::NativeNode));
        assert_eq!(node.map(|found| found.out_ports().len()), Some(1));
        assert!(loaded.fault_tree().is_empty());
        Ok(())
    }

    #[test]
    fn null_required_field_is_missing() -> TestResult {
        let entries = root("nodes:\n  n:\n    id: ~\n    name: A\n    kind: METANODE\n")?;
        let loaded = workflow(&entries, BuildMode::Tolerant)?;
        let cause = cause_at(
            loaded.fault_tree(),
            &[
                WorkflowField::Nodes.key(),
                FaultKey::Key("n".to_owned()),
                NodeField::Id.key(),
            ],
        );
        assert_eq!(cause, Some(FieldError::missing("id")));
        Ok(())
    }

    #[test]
    fn non_mapping_node_marks_the_default() -> TestResult {
        let entries = root("nodes:\n  n: 42\n")?;
        let loaded = workflow(&entries, BuildMode::Tolerant)?;
        let cause = cause_at(
            loaded.fault_tree(),
            &[WorkflowField::Nodes.key(), FaultKey::Key("n".to_owned())],
        );
        assert_eq!(
            cause,
            Some(FieldError::TypeMismatch {
                expected: "mapping",
                found: "integer",
            })
        );
        assert!(loaded.node("n").is_some_and(NodeDef::has_faults));
        Ok(())
    }

    #[test]
    fn config_entry_without_children_or_value_is_invalid() -> TestResult {
        let value: DocValue = serde_saphyr::from_str("{other: 1}")?;
        let result = config(&value, BuildMode::Tolerant)?;
        assert!(matches!(result, Err(FieldError::TypeMismatch { found: "mapping", .. })));
        Ok(())
    }

    #[test]
    fn unknown_keys_are_ignored() -> TestResult {
        let entries = root("name: demo\nversion: 5.3\n")?;
        let loaded = workflow(&entries, BuildMode::Strict)?;
        assert_eq!(loaded.name(), Some("demo"));
        Ok(())
    }

    #[test]
    fn strict_read_aborts_at_the_nested_entity() -> TestResult {
        let entries = root("annotations:\n  - text: hi\n    bounds: {x: 0, y: 0, width: 5}\n")?;
        let result = workflow(&entries, BuildMode::Strict);
        let Err(DefError::Strict { entity, key, .. }) = result else {
            return Err("strict read should fail".into());
        };
        assert_eq!(entity, "BoundsDef");
        assert_eq!(key, BoundsField::Height.key());
        Ok(())
    }
}

//! Workflow nodes.

use std::fmt;
use std::str::FromStr;

use crate::error::{DefError, FieldError};
use crate::fallible::{
    BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, ListSlot, Scope, Slot,
};

use super::bounds::BoundsDef;
use super::config::ConfigDef;
use super::port::PortDef;

/// What kind of node a [`NodeDef`] describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// A node backed by a node factory.
    NativeNode,
    /// A component: a shareable, encapsulated sub-workflow.
    Component,
    /// A metanode: a plain grouping of nodes.
    Metanode,
}

impl NodeKind {
    /// The document spelling.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::NativeNode => "NATIVENODE",
            Self::Component => "COMPONENT",
            Self::Metanode => "METANODE",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = FieldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NATIVENODE" => Ok(Self::NativeNode),
            "COMPONENT" => Ok(Self::Component),
            "METANODE" => Ok(Self::Metanode),
            other => Err(FieldError::UnknownVariant {
                kind: "node kind",
                value: other.to_owned(),
            }),
        }
    }
}

/// Fields of [`NodeDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeField {
    /// Node id, unique within the workflow.
    Id,
    /// Display name.
    Name,
    /// Node kind.
    Kind,
    /// Canvas bounds.
    Bounds,
    /// Input ports.
    InPorts,
    /// Output ports.
    OutPorts,
    /// Model settings.
    ModelSettings,
}

impl FieldId for NodeField {
    fn name(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Kind => "kind",
            Self::Bounds => "bounds",
            Self::InPorts => "in_ports",
            Self::OutPorts => "out_ports",
            Self::ModelSettings => "model_settings",
        }
    }
}

/// One node of a workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDef {
    id: Option<i32>,
    name: Option<String>,
    kind: Option<NodeKind>,
    bounds: Option<BoundsDef>,
    in_ports: Vec<PortDef>,
    out_ports: Vec<PortDef>,
    model_settings: Option<ConfigDef>,
    faults: FaultTree,
}

impl NodeDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> NodeDefBuilder {
        NodeDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    ///
    /// Equal to what a tolerant builder builds when no setter was called.
    /// Use it as the fallback of an element or entry that could not be
    /// supplied.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            id: None,
            name: None,
            kind: None,
            bounds: None,
            in_ports: Vec::new(),
            out_ports: Vec::new(),
            model_settings: None,
            faults: FaultTree::missing(&[NodeField::Id, NodeField::Name, NodeField::Kind]),
        }
    }

    /// Node id.
    #[must_use]
    pub const fn id(&self) -> Option<i32> {
        self.id
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Node kind.
    #[must_use]
    pub const fn kind(&self) -> Option<NodeKind> {
        self.kind
    }

    /// Canvas bounds, if the node is placed.
    #[must_use]
    pub const fn bounds(&self) -> Option<&BoundsDef> {
        self.bounds.as_ref()
    }

    /// Input ports, in order.
    #[must_use]
    pub fn in_ports(&self) -> &[PortDef] {
        &self.in_ports
    }

    /// Output ports, in order.
    #[must_use]
    pub fn out_ports(&self) -> &[PortDef] {
        &self.out_ports
    }

    /// Model settings, if the node has any.
    #[must_use]
    pub const fn model_settings(&self) -> Option<&ConfigDef> {
        self.model_settings.as_ref()
    }

    /// The bounds, but only when they carry faults.
    #[must_use]
    pub fn faulty_bounds(&self) -> Option<&BoundsDef> {
        self.bounds.as_ref().filter(|bounds| bounds.has_faults())
    }

    /// The model settings, but only when they carry faults.
    #[must_use]
    pub fn faulty_model_settings(&self) -> Option<&ConfigDef> {
        self.model_settings
            .as_ref()
            .filter(|settings| settings.has_faults())
    }

    /// Input ports that carry faults, with their positions.
    pub fn faulty_in_ports(&self) -> impl Iterator<Item = (usize, &PortDef)> {
        faulty(&self.in_ports)
    }

    /// Output ports that carry faults, with their positions.
    pub fn faulty_out_ports(&self) -> impl Iterator<Item = (usize, &PortDef)> {
        faulty(&self.out_ports)
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: NodeField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: NodeField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

fn faulty<T: FaultCarrier>(items: &[T]) -> impl Iterator<Item = (usize, &T)> {
    items
        .iter()
        .enumerate()
        .filter(|(_, item)| item.has_faults())
}

impl FaultCarrier for NodeDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`NodeDef`].
#[derive(Debug, Clone, Default)]
pub struct NodeDefBuilder {
    mode: BuildMode,
    id: Slot<i32>,
    name: Slot<String>,
    kind: Slot<NodeKind>,
    bounds: Slot<BoundsDef>,
    in_ports: ListSlot<PortDef>,
    out_ports: ListSlot<PortDef>,
    model_settings: Slot<ConfigDef>,
}

impl NodeDefBuilder {
    const ENTITY: &'static str = "NodeDef";

    /// A tolerant builder with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(BuildMode::Tolerant)
    }

    /// A builder that aborts at the first field that cannot be supplied.
    #[must_use]
    pub fn strict() -> Self {
        Self::with_mode(BuildMode::Strict)
    }

    /// A builder in the given mode.
    #[must_use]
    pub fn with_mode(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }

    /// A tolerant builder pre-populated from `def`, faults included.
    #[must_use]
    pub fn from_def(def: &NodeDef) -> Self {
        let faults = &def.faults;
        Self {
            mode: BuildMode::Tolerant,
            id: Slot::copied(def.id, faults.field_subtree(NodeField::Id)),
            name: Slot::copied(def.name.clone(), faults.field_subtree(NodeField::Name)),
            kind: Slot::copied(def.kind, faults.field_subtree(NodeField::Kind)),
            bounds: Slot::copied(def.bounds.clone(), faults.field_subtree(NodeField::Bounds)),
            in_ports: ListSlot::copied(
                def.in_ports.clone(),
                faults.field_subtree(NodeField::InPorts),
            ),
            out_ports: ListSlot::copied(
                def.out_ports.clone(),
                faults.field_subtree(NodeField::OutPorts),
            ),
            model_settings: Slot::copied(
                def.model_settings.clone(),
                faults.field_subtree(NodeField::ModelSettings),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the node id.
    pub fn set_id(&mut self, id: i32) -> &mut Self {
        self.id.assign(id);
        self
    }

    /// Sets the node id from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `id` failed and the builder is strict.
    pub fn set_id_with<E: Into<Cause>>(
        &mut self,
        id: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.id.supply(scope, &NodeField::Id.key(), id, fallback)?;
        Ok(self)
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name.assign(name.into());
        self
    }

    /// Sets the display name from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `name` failed and the builder is
    /// strict.
    pub fn set_name_with<E: Into<Cause>>(
        &mut self,
        name: Result<String, E>,
        fallback: Option<String>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.name
            .supply(scope, &NodeField::Name.key(), name, fallback)?;
        Ok(self)
    }

    /// Sets the node kind.
    pub fn set_kind(&mut self, kind: NodeKind) -> &mut Self {
        self.kind.assign(kind);
        self
    }

    /// Sets the node kind from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `kind` failed and the builder is
    /// strict.
    pub fn set_kind_with<E: Into<Cause>>(
        &mut self,
        kind: Result<NodeKind, E>,
        fallback: Option<NodeKind>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.kind
            .supply(scope, &NodeField::Kind.key(), kind, fallback)?;
        Ok(self)
    }

    /// Sets the bounds.
    pub fn set_bounds(&mut self, bounds: BoundsDef) -> &mut Self {
        self.bounds.assign_node(bounds);
        self
    }

    /// Sets the optional bounds from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `bounds` failed and the builder is
    /// strict.
    pub fn set_bounds_with<E: Into<Cause>>(
        &mut self,
        bounds: Result<Option<BoundsDef>, E>,
        fallback: Option<BoundsDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.bounds
            .supply_optional_node(scope, &NodeField::Bounds.key(), bounds, fallback)?;
        Ok(self)
    }

    /// Replaces the bulk input ports.
    pub fn set_in_ports(&mut self, ports: Vec<PortDef>) -> &mut Self {
        self.in_ports.assign_all(ports);
        self
    }

    /// Replaces the bulk input ports from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `ports` failed and the builder is
    /// strict.
    pub fn set_in_ports_with<E: Into<Cause>>(
        &mut self,
        ports: Result<Vec<PortDef>, E>,
        fallback: Vec<PortDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.in_ports
            .supply_all(scope, &NodeField::InPorts.key(), ports, fallback)?;
        Ok(self)
    }

    /// Appends one input port after the bulk ones.
    pub fn add_to_in_ports(&mut self, port: PortDef) -> &mut Self {
        self.in_ports.push(port);
        self
    }

    /// Appends one input port from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `port` failed and the builder is
    /// strict.
    pub fn add_to_in_ports_with<E: Into<Cause>>(
        &mut self,
        port: Result<PortDef, E>,
        fallback: PortDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.in_ports
            .supply_element_node(scope, &NodeField::InPorts.key(), port, fallback)?;
        Ok(self)
    }

    /// Replaces the bulk output ports.
    pub fn set_out_ports(&mut self, ports: Vec<PortDef>) -> &mut Self {
        self.out_ports.assign_all(ports);
        self
    }

    /// Replaces the bulk output ports from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `ports` failed and the builder is
    /// strict.
    pub fn set_out_ports_with<E: Into<Cause>>(
        &mut self,
        ports: Result<Vec<PortDef>, E>,
        fallback: Vec<PortDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.out_ports
            .supply_all(scope, &NodeField::OutPorts.key(), ports, fallback)?;
        Ok(self)
    }

    /// Appends one output port after the bulk ones.
    pub fn add_to_out_ports(&mut self, port: PortDef) -> &mut Self {
        self.out_ports.push(port);
        self
    }

    /// Appends one output port from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `port` failed and the builder is
    /// strict.
    pub fn add_to_out_ports_with<E: Into<Cause>>(
        &mut self,
        port: Result<PortDef, E>,
        fallback: PortDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.out_ports
            .supply_element_node(scope, &NodeField::OutPorts.key(), port, fallback)?;
        Ok(self)
    }

    /// Sets the model settings.
    pub fn set_model_settings(&mut self, settings: ConfigDef) -> &mut Self {
        self.model_settings.assign_node(settings);
        self
    }

    /// Sets the optional model settings from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `settings` failed and the builder is
    /// strict.
    pub fn set_model_settings_with<E: Into<Cause>>(
        &mut self,
        settings: Result<Option<ConfigDef>, E>,
        fallback: Option<ConfigDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.model_settings.supply_optional_node(
            scope,
            &NodeField::ModelSettings.key(),
            settings,
            fallback,
        )?;
        Ok(self)
    }

    /// Builds the node, recording unset required fields as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if a required field is missing and the
    /// builder is strict.
    pub fn build(mut self) -> Result<NodeDef, DefError> {
        let scope = self.scope();
        self.id.require(scope, &NodeField::Id.key())?;
        self.name.require(scope, &NodeField::Name.key())?;
        self.kind.require(scope, &NodeField::Kind.key())?;

        let (id, id_faults) = self.id.into_parts();
        let (name, name_faults) = self.name.into_parts();
        let (kind, kind_faults) = self.kind.into_parts();
        let (bounds, bounds_faults) = self.bounds.into_parts();
        let (in_ports, in_ports_faults) = self.in_ports.into_node_parts();
        let (out_ports, out_ports_faults) = self.out_ports.into_node_parts();
        let (model_settings, model_settings_faults) = self.model_settings.into_parts();
        let faults = FaultTree::merge(
            None,
            [
                (NodeField::Id.key(), id_faults),
                (NodeField::Name.key(), name_faults),
                (NodeField::Kind.key(), kind_faults),
                (NodeField::Bounds.key(), bounds_faults),
                (NodeField::InPorts.key(), in_ports_faults),
                (NodeField::OutPorts.key(), out_ports_faults),
                (NodeField::ModelSettings.key(), model_settings_faults),
            ],
        );

        Ok(NodeDef {
            id,
            name,
            kind,
            bounds,
            in_ports,
            out_ports,
            model_settings,
            faults,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::def::{PortField, PortTypeId};
    use crate::fallible::FaultKey;
    use rstest::rstest;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn port(index: u32) -> Result<PortDef, Box<dyn std::error::Error>> {
        let mut builder = PortDef::builder();
        builder
            .set_index(index)
            .set_port_type(PortTypeId::new("org.knime.core.node.BufferedDataTable")?);
        Ok(builder.build()?)
    }

    fn named_node() -> NodeDefBuilder {
        let mut builder = NodeDef::builder();
        builder
            .set_id(1)
            .set_name("CSV Reader")
            .set_kind(NodeKind::NativeNode);
        builder
    }

    #[rstest]
    #[case("NATIVENODE", NodeKind::NativeNode)]
    #[case("COMPONENT", NodeKind::Component)]
    #[case("METANODE", NodeKind::Metanode)]
    fn node_kind_parses_document_spelling(
        #[case] text: &str,
        #[case] expected: NodeKind,
    ) -> Result<(), FieldError> {
        assert_eq!(text.parse::<NodeKind>()?, expected);
        assert_eq!(expected.to_string(), text);
        Ok(())
    }

    #[test]
    fn unknown_node_kind_is_rejected() {
        assert!(matches!(
            "SUBNODE".parse::<NodeKind>(),
            Err(FieldError::UnknownVariant { kind: "node kind", .. })
        ));
    }

    #[test]
    fn optional_children_may_be_absent() -> Result<(), DefError> {
        let node = named_node().build()?;
        assert!(node.bounds().is_none());
        assert!(node.model_settings().is_none());
        assert!(!node.has_faults());
        Ok(())
    }

    #[test]
    fn faulty_port_surfaces_under_its_index() -> TestResult {
        let mut faulty_port = PortDef::builder();
        faulty_port.set_index(1);
        let mut builder = named_node();
        builder
            .add_to_out_ports(faulty_port.build()?)
            .set_out_ports(vec![port(0)?]);
        let node = builder.build()?;

        let faulty: Vec<usize> = node.faulty_out_ports().map(|(index, _)| index).collect();
        assert_eq!(faulty, vec![1]);
        let port_type = node.fault_tree().at(&[
            NodeField::OutPorts.key(),
            FaultKey::Index(1),
            PortField::PortType.key(),
        ]);
        assert!(port_type.is_some());
        assert_eq!(node.faulty_in_ports().count(), 0);
        Ok(())
    }

    #[test]
    fn failed_port_supply_marks_the_fallback() -> TestResult {
        let mut builder = named_node();
        builder
            .add_to_in_ports(port(0)?)
            .add_to_in_ports_with(Err("port entry is a number"), PortDef::placeholder())?;
        let node = builder.build()?;
        assert_eq!(node.in_ports().len(), 2);
        let marked = node
            .fault_tree_for(NodeField::InPorts)
            .and_then(|ports| ports.child(&FaultKey::Index(1)));
        assert_eq!(
            marked.and_then(FaultTree::self_fault),
            Some(&Fault::new("port entry is a number"))
        );
        Ok(())
    }

    #[test]
    fn failed_kind_keeps_fallback() -> Result<(), DefError> {
        let mut builder = named_node();
        builder.set_kind_with("SUBNODE".parse::<NodeKind>(), Some(NodeKind::NativeNode))?;
        let node = builder.build()?;
        assert_eq!(node.kind(), Some(NodeKind::NativeNode));
        assert!(node.supply_fault(NodeField::Kind).is_some());
        Ok(())
    }

    #[test]
    fn strict_builder_reports_the_failing_field() {
        let mut builder = NodeDefBuilder::strict();
        let result = builder.set_id_with(Err("id is text"), None).map(|_| ());
        let Err(DefError::Strict { key, .. }) = result else {
            panic!("strict builder should reject the id");
        };
        assert_eq!(key, NodeField::Id.key());
    }

    #[test]
    fn copy_then_extend_keeps_earlier_faults() -> TestResult {
        let mut builder = named_node();
        builder.set_bounds_with(Err("bounds is a list"), None)?;
        let original = builder.build()?;

        let mut copy = NodeDefBuilder::from_def(&original);
        copy.add_to_in_ports(port(0)?);
        let extended = copy.build()?;
        assert_eq!(extended.in_ports().len(), 1);
        assert_eq!(
            extended.fault_tree_for(NodeField::Bounds),
            original.fault_tree_for(NodeField::Bounds)
        );
        Ok(())
    }
}

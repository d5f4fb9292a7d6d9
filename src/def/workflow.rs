//! The workflow document root.

use indexmap::IndexMap;

use crate::error::DefError;
use crate::fallible::{
    BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, ListSlot, MapSlot, Scope, Slot,
};

use super::annotation::AnnotationDef;
use super::connection::ConnectionDef;
use super::node::NodeDef;

/// Fields of [`WorkflowDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowField {
    /// Workflow name.
    Name,
    /// Nodes keyed by their document key.
    Nodes,
    /// Connections between node ports.
    Connections,
    /// Canvas annotations.
    Annotations,
}

impl FieldId for WorkflowField {
    fn name(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Nodes => "nodes",
            Self::Connections => "connections",
            Self::Annotations => "annotations",
        }
    }
}

/// A workflow: nodes, the connections between them and annotations.
///
/// Every field may be empty. A workflow loaded from a damaged document still
/// holds everything that could be read; [`FaultCarrier::fault_tree`] says
/// what could not.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowDef {
    name: Option<String>,
    nodes: IndexMap<String, NodeDef>,
    connections: Vec<ConnectionDef>,
    annotations: Vec<AnnotationDef>,
    faults: FaultTree,
}

impl WorkflowDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> WorkflowDefBuilder {
        WorkflowDefBuilder::new()
    }

    /// Workflow name, if the document gives one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Nodes in document order.
    #[must_use]
    pub const fn nodes(&self) -> &IndexMap<String, NodeDef> {
        &self.nodes
    }

    /// One node by its document key.
    #[must_use]
    pub fn node(&self, key: &str) -> Option<&NodeDef> {
        self.nodes.get(key)
    }

    /// Connections in document order.
    #[must_use]
    pub fn connections(&self) -> &[ConnectionDef] {
        &self.connections
    }

    /// Annotations in document order.
    #[must_use]
    pub fn annotations(&self) -> &[AnnotationDef] {
        &self.annotations
    }

    /// Nodes that carry faults.
    pub fn faulty_nodes(&self) -> impl Iterator<Item = (&str, &NodeDef)> {
        self.nodes
            .iter()
            .filter(|(_, node)| node.has_faults())
            .map(|(key, node)| (key.as_str(), node))
    }

    /// Connections that carry faults, with their positions.
    pub fn faulty_connections(&self) -> impl Iterator<Item = (usize, &ConnectionDef)> {
        self.connections
            .iter()
            .enumerate()
            .filter(|(_, connection)| connection.has_faults())
    }

    /// Annotations that carry faults, with their positions.
    pub fn faulty_annotations(&self) -> impl Iterator<Item = (usize, &AnnotationDef)> {
        self.annotations
            .iter()
            .enumerate()
            .filter(|(_, annotation)| annotation.has_faults())
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: WorkflowField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: WorkflowField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for WorkflowDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`WorkflowDef`].
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefBuilder {
    mode: BuildMode,
    name: Slot<String>,
    nodes: MapSlot<NodeDef>,
    connections: ListSlot<ConnectionDef>,
    annotations: ListSlot<AnnotationDef>,
}

impl WorkflowDefBuilder {
    const ENTITY: &'static str = "WorkflowDef";

    /// A tolerant, empty builder.
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
    pub fn from_def(def: &WorkflowDef) -> Self {
        let faults = &def.faults;
        Self {
            mode: BuildMode::Tolerant,
            name: Slot::copied(def.name.clone(), faults.field_subtree(WorkflowField::Name)),
            nodes: MapSlot::copied(
                def.nodes.clone(),
                faults.field_subtree(WorkflowField::Nodes),
            ),
            connections: ListSlot::copied(
                def.connections.clone(),
                faults.field_subtree(WorkflowField::Connections),
            ),
            annotations: ListSlot::copied(
                def.annotations.clone(),
                faults.field_subtree(WorkflowField::Annotations),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the workflow name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name.assign(name.into());
        self
    }

    /// Sets the optional workflow name from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `name` failed and the builder is
    /// strict.
    pub fn set_name_with<E: Into<Cause>>(
        &mut self,
        name: Result<Option<String>, E>,
        fallback: Option<String>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.name
            .supply_optional(scope, &WorkflowField::Name.key(), name, fallback)?;
        Ok(self)
    }

    /// Replaces the bulk nodes.
    pub fn set_nodes(&mut self, nodes: IndexMap<String, NodeDef>) -> &mut Self {
        self.nodes.assign_all(nodes);
        self
    }

    /// Replaces the bulk nodes from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `nodes` failed and the builder is
    /// strict.
    pub fn set_nodes_with<E: Into<Cause>>(
        &mut self,
        nodes: Result<IndexMap<String, NodeDef>, E>,
        fallback: IndexMap<String, NodeDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.nodes
            .supply_all(scope, &WorkflowField::Nodes.key(), nodes, fallback)?;
        Ok(self)
    }

    /// Puts one node; it replaces a bulk node with the same key.
    pub fn put_to_nodes(&mut self, key: impl Into<String>, node: NodeDef) -> &mut Self {
        self.nodes.insert(key.into(), node);
        self
    }

    /// Puts one node from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `node` failed and the builder is
    /// strict.
    pub fn put_to_nodes_with<E: Into<Cause>>(
        &mut self,
        key: impl Into<String>,
        node: Result<NodeDef, E>,
        fallback: NodeDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.nodes.supply_entry_node(
            scope,
            &WorkflowField::Nodes.key(),
            key.into(),
            node,
            fallback,
        )?;
        Ok(self)
    }

    /// Replaces the bulk connections.
    pub fn set_connections(&mut self, connections: Vec<ConnectionDef>) -> &mut Self {
        self.connections.assign_all(connections);
        self
    }

    /// Replaces the bulk connections from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `connections` failed and the builder
    /// is strict.
    pub fn set_connections_with<E: Into<Cause>>(
        &mut self,
        connections: Result<Vec<ConnectionDef>, E>,
        fallback: Vec<ConnectionDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.connections.supply_all(
            scope,
            &WorkflowField::Connections.key(),
            connections,
            fallback,
        )?;
        Ok(self)
    }

    /// Appends one connection after the bulk ones.
    pub fn add_to_connections(&mut self, connection: ConnectionDef) -> &mut Self {
        self.connections.push(connection);
        self
    }

    /// Appends one connection from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `connection` failed and the builder
    /// is strict.
    pub fn add_to_connections_with<E: Into<Cause>>(
        &mut self,
        connection: Result<ConnectionDef, E>,
        fallback: ConnectionDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.connections.supply_element_node(
            scope,
            &WorkflowField::Connections.key(),
            connection,
            fallback,
        )?;
        Ok(self)
    }

    /// Replaces the bulk annotations.
    pub fn set_annotations(&mut self, annotations: Vec<AnnotationDef>) -> &mut Self {
        self.annotations.assign_all(annotations);
        self
    }

    /// Replaces the bulk annotations from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `annotations` failed and the builder
    /// is strict.
    pub fn set_annotations_with<E: Into<Cause>>(
        &mut self,
        annotations: Result<Vec<AnnotationDef>, E>,
        fallback: Vec<AnnotationDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.annotations.supply_all(
            scope,
            &WorkflowField::Annotations.key(),
            annotations,
            fallback,
        )?;
        Ok(self)
    }

    /// Appends one annotation after the bulk ones.
    pub fn add_to_annotations(&mut self, annotation: AnnotationDef) -> &mut Self {
        self.annotations.push(annotation);
        self
    }

    /// Appends one annotation from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `annotation` failed and the builder
    /// is strict.
    pub fn add_to_annotations_with<E: Into<Cause>>(
        &mut self,
        annotation: Result<AnnotationDef, E>,
        fallback: AnnotationDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.annotations.supply_element_node(
            scope,
            &WorkflowField::Annotations.key(),
            annotation,
            fallback,
        )?;
        Ok(self)
    }

    /// Builds the workflow.
    ///
    /// # Errors
    ///
    /// No workflow field is required, so this only fails if a future
    /// required field is added; the signature matches every other builder.
    pub fn build(self) -> Result<WorkflowDef, DefError> {
        let (name, name_faults) = self.name.into_parts();
        let (nodes, nodes_faults) = self.nodes.into_node_parts();
        let (connections, connections_faults) = self.connections.into_node_parts();
        let (annotations, annotations_faults) = self.annotations.into_node_parts();
        let faults = FaultTree::merge(
            None,
            [
                (WorkflowField::Name.key(), name_faults),
                (WorkflowField::Nodes.key(), nodes_faults),
                (WorkflowField::Connections.key(), connections_faults),
                (WorkflowField::Annotations.key(), annotations_faults),
            ],
        );

        Ok(WorkflowDef {
            name,
            nodes,
            connections,
            annotations,
            faults,
        })
    }
}

//! Connections between node ports.

use crate::error::DefError;
use crate::fallible::{
    BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, ListSlot, Scope, Slot,
};

/// Fields of [`ConnectionDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionField {
    /// Id of the node the connection leaves.
    SourceId,
    /// Output port index on the source node.
    SourcePort,
    /// Id of the node the connection enters.
    DestId,
    /// Input port index on the destination node.
    DestPort,
    /// Whether the user may delete the connection.
    Deletable,
    /// Intermediate points of the drawn connection.
    BendPoints,
}

impl FieldId for ConnectionField {
    fn name(self) -> &'static str {
        match self {
            Self::SourceId => "source_id",
            Self::SourcePort => "source_port",
            Self::DestId => "dest_id",
            Self::DestPort => "dest_port",
            Self::Deletable => "deletable",
            Self::BendPoints => "bend_points",
        }
    }
}

/// A point on the workflow canvas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Coordinate {
    /// Horizontal position.
    pub x: i32,
    /// Vertical position.
    pub y: i32,
}

impl Coordinate {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A directed edge from an output port to an input port.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionDef {
    source_id: Option<i32>,
    source_port: Option<u32>,
    dest_id: Option<i32>,
    dest_port: Option<u32>,
    deletable: Option<bool>,
    bend_points: Vec<Coordinate>,
    faults: FaultTree,
}

impl ConnectionDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> ConnectionDefBuilder {
        ConnectionDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            source_id: None,
            source_port: None,
            dest_id: None,
            dest_port: None,
            deletable: None,
            bend_points: Vec::new(),
            faults: FaultTree::missing(&[
                ConnectionField::SourceId,
                ConnectionField::SourcePort,
                ConnectionField::DestId,
                ConnectionField::DestPort,
            ]),
        }
    }

    /// Id of the source node.
    #[must_use]
    pub const fn source_id(&self) -> Option<i32> {
        self.source_id
    }

    /// Output port index on the source node.
    #[must_use]
    pub const fn source_port(&self) -> Option<u32> {
        self.source_port
    }

    /// Id of the destination node.
    #[must_use]
    pub const fn dest_id(&self) -> Option<i32> {
        self.dest_id
    }

    /// Input port index on the destination node.
    #[must_use]
    pub const fn dest_port(&self) -> Option<u32> {
        self.dest_port
    }

    /// Whether the connection may be deleted, if the document says.
    #[must_use]
    pub const fn deletable(&self) -> Option<bool> {
        self.deletable
    }

    /// Intermediate points, in drawing order.
    #[must_use]
    pub fn bend_points(&self) -> &[Coordinate] {
        &self.bend_points
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: ConnectionField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: ConnectionField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for ConnectionDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`ConnectionDef`].
#[derive(Debug, Clone, Default)]
pub struct ConnectionDefBuilder {
    mode: BuildMode,
    source_id: Slot<i32>,
    source_port: Slot<u32>,
    dest_id: Slot<i32>,
    dest_port: Slot<u32>,
    deletable: Slot<bool>,
    bend_points: ListSlot<Coordinate>,
}

impl ConnectionDefBuilder {
    const ENTITY: &'static str = "ConnectionDef";

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
    pub fn from_def(def: &ConnectionDef) -> Self {
        let faults = &def.faults;
        Self {
            mode: BuildMode::Tolerant,
            source_id: Slot::copied(
                def.source_id,
                faults.field_subtree(ConnectionField::SourceId),
            ),
            source_port: Slot::copied(
                def.source_port,
                faults.field_subtree(ConnectionField::SourcePort),
            ),
            dest_id: Slot::copied(def.dest_id, faults.field_subtree(ConnectionField::DestId)),
            dest_port: Slot::copied(
                def.dest_port,
                faults.field_subtree(ConnectionField::DestPort),
            ),
            deletable: Slot::copied(
                def.deletable,
                faults.field_subtree(ConnectionField::Deletable),
            ),
            bend_points: ListSlot::copied(
                def.bend_points.clone(),
                faults.field_subtree(ConnectionField::BendPoints),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the source node id.
    pub fn set_source_id(&mut self, source_id: i32) -> &mut Self {
        self.source_id.assign(source_id);
        self
    }

    /// Sets the source node id from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_source_id_with<E: Into<Cause>>(
        &mut self,
        source_id: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.source_id
            .supply(scope, &ConnectionField::SourceId.key(), source_id, fallback)?;
        Ok(self)
    }

    /// Sets the source port index.
    pub fn set_source_port(&mut self, source_port: u32) -> &mut Self {
        self.source_port.assign(source_port);
        self
    }

    /// Sets the source port index from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_source_port_with<E: Into<Cause>>(
        &mut self,
        source_port: Result<u32, E>,
        fallback: Option<u32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.source_port.supply(
            scope,
            &ConnectionField::SourcePort.key(),
            source_port,
            fallback,
        )?;
        Ok(self)
    }

    /// Sets the destination node id.
    pub fn set_dest_id(&mut self, dest_id: i32) -> &mut Self {
        self.dest_id.assign(dest_id);
        self
    }

    /// Sets the destination node id from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_dest_id_with<E: Into<Cause>>(
        &mut self,
        dest_id: Result<i32, E>,
        fallback: Option<i32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.dest_id
            .supply(scope, &ConnectionField::DestId.key(), dest_id, fallback)?;
        Ok(self)
    }

    /// Sets the destination port index.
    pub fn set_dest_port(&mut self, dest_port: u32) -> &mut Self {
        self.dest_port.assign(dest_port);
        self
    }

    /// Sets the destination port index from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_dest_port_with<E: Into<Cause>>(
        &mut self,
        dest_port: Result<u32, E>,
        fallback: Option<u32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.dest_port
            .supply(scope, &ConnectionField::DestPort.key(), dest_port, fallback)?;
        Ok(self)
    }

    /// Sets whether the connection is deletable.
    pub fn set_deletable(&mut self, deletable: bool) -> &mut Self {
        self.deletable.assign(deletable);
        self
    }

    /// Sets the optional deletable flag from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_deletable_with<E: Into<Cause>>(
        &mut self,
        deletable: Result<Option<bool>, E>,
        fallback: Option<bool>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.deletable.supply_optional(
            scope,
            &ConnectionField::Deletable.key(),
            deletable,
            fallback,
        )?;
        Ok(self)
    }

    /// Replaces the bulk bend points.
    pub fn set_bend_points(&mut self, bend_points: Vec<Coordinate>) -> &mut Self {
        self.bend_points.assign_all(bend_points);
        self
    }

    /// Replaces the bulk bend points from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn set_bend_points_with<E: Into<Cause>>(
        &mut self,
        bend_points: Result<Vec<Coordinate>, E>,
        fallback: Vec<Coordinate>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.bend_points.supply_all(
            scope,
            &ConnectionField::BendPoints.key(),
            bend_points,
            fallback,
        )?;
        Ok(self)
    }

    /// Appends one bend point after the bulk ones.
    pub fn add_to_bend_points(&mut self, bend_point: Coordinate) -> &mut Self {
        self.bend_points.push(bend_point);
        self
    }

    /// Appends one bend point from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the supply failed and the builder is
    /// strict.
    pub fn add_to_bend_points_with<E: Into<Cause>>(
        &mut self,
        bend_point: Result<Coordinate, E>,
        fallback: Coordinate,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.bend_points.supply_element(
            scope,
            &ConnectionField::BendPoints.key(),
            bend_point,
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
    pub fn build(mut self) -> Result<ConnectionDef, DefError> {
        let scope = self.scope();
        self.source_id
            .require(scope, &ConnectionField::SourceId.key())?;
        self.source_port
            .require(scope, &ConnectionField::SourcePort.key())?;
        self.dest_id.require(scope, &ConnectionField::DestId.key())?;
        self.dest_port
            .require(scope, &ConnectionField::DestPort.key())?;

        let (source_id, source_id_faults) = self.source_id.into_parts();
        let (source_port, source_port_faults) = self.source_port.into_parts();
        let (dest_id, dest_id_faults) = self.dest_id.into_parts();
        let (dest_port, dest_port_faults) = self.dest_port.into_parts();
        let (deletable, deletable_faults) = self.deletable.into_parts();
        let (bend_points, bend_points_faults) = self.bend_points.into_parts();
        let faults = FaultTree::merge(
            None,
            [
                (ConnectionField::SourceId.key(), source_id_faults),
                (ConnectionField::SourcePort.key(), source_port_faults),
                (ConnectionField::DestId.key(), dest_id_faults),
                (ConnectionField::DestPort.key(), dest_port_faults),
                (ConnectionField::Deletable.key(), deletable_faults),
                (ConnectionField::BendPoints.key(), bend_points_faults),
            ],
        );

        Ok(ConnectionDef {
            source_id,
            source_port,
            dest_id,
            dest_port,
            deletable,
            bend_points,
            faults,
        })
    }
}

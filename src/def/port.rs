//! Input and output ports of a node.

use crate::error::DefError;
use crate::fallible::{BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, Scope, Slot};

use super::newtypes::PortTypeId;

/// Fields of [`PortDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PortField {
    /// Position among the node's ports of the same direction.
    Index,
    /// Port type id.
    PortType,
    /// Display name.
    Name,
}

impl FieldId for PortField {
    fn name(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::PortType => "port_type",
            Self::Name => "name",
        }
    }
}

/// One port of a node.
#[derive(Debug, Clone, PartialEq)]
pub struct PortDef {
    index: Option<u32>,
    port_type: Option<PortTypeId>,
    name: Option<String>,
    faults: FaultTree,
}

impl PortDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> PortDefBuilder {
        PortDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    ///
    /// Equal to what a tolerant builder builds when no setter was called.
    /// Use it as the fallback of an element or entry that could not be
    /// supplied.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            index: None,
            port_type: None,
            name: None,
            faults: FaultTree::missing(&[PortField::Index, PortField::PortType]),
        }
    }

    /// Position among the node's ports of the same direction.
    #[must_use]
    pub const fn index(&self) -> Option<u32> {
        self.index
    }

    /// Port type id.
    #[must_use]
    pub const fn port_type(&self) -> Option<&PortTypeId> {
        self.port_type.as_ref()
    }

    /// Display name, if the port has one.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: PortField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: PortField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for PortDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`PortDef`].
#[derive(Debug, Clone, Default)]
pub struct PortDefBuilder {
    mode: BuildMode,
    index: Slot<u32>,
    port_type: Slot<PortTypeId>,
    name: Slot<String>,
}

impl PortDefBuilder {
    const ENTITY: &'static str = "PortDef";

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
    pub fn from_def(def: &PortDef) -> Self {
        Self {
            mode: BuildMode::Tolerant,
            index: Slot::copied(def.index, def.faults.field_subtree(PortField::Index)),
            port_type: Slot::copied(
                def.port_type.clone(),
                def.faults.field_subtree(PortField::PortType),
            ),
            name: Slot::copied(def.name.clone(), def.faults.field_subtree(PortField::Name)),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the port index.
    pub fn set_index(&mut self, index: u32) -> &mut Self {
        self.index.assign(index);
        self
    }

    /// Sets the port index from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `index` failed and the builder is
    /// strict.
    pub fn set_index_with<E: Into<Cause>>(
        &mut self,
        index: Result<u32, E>,
        fallback: Option<u32>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.index
            .supply(scope, &PortField::Index.key(), index, fallback)?;
        Ok(self)
    }

    /// Sets the port type.
    pub fn set_port_type(&mut self, port_type: PortTypeId) -> &mut Self {
        self.port_type.assign(port_type);
        self
    }

    /// Sets the port type from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `port_type` failed and the builder is
    /// strict.
    pub fn set_port_type_with<E: Into<Cause>>(
        &mut self,
        port_type: Result<PortTypeId, E>,
        fallback: Option<PortTypeId>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.port_type
            .supply(scope, &PortField::PortType.key(), port_type, fallback)?;
        Ok(self)
    }

    /// Sets the display name.
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name.assign(name.into());
        self
    }

    /// Sets the optional display name from a supply result.
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
            .supply_optional(scope, &PortField::Name.key(), name, fallback)?;
        Ok(self)
    }

    /// Builds the node, recording unset required fields as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if a required field is missing and the
    /// builder is strict.
    pub fn build(mut self) -> Result<PortDef, DefError> {
        let scope = self.scope();
        self.index.require(scope, &PortField::Index.key())?;
        self.port_type.require(scope, &PortField::PortType.key())?;

        let (index, index_faults) = self.index.into_parts();
        let (port_type, port_type_faults) = self.port_type.into_parts();
        let (name, name_faults) = self.name.into_parts();
        let faults = FaultTree::merge(
            None,
            [
                (PortField::Index.key(), index_faults),
                (PortField::PortType.key(), port_type_faults),
                (PortField::Name.key(), name_faults),
            ],
        );

        Ok(PortDef {
            index,
            port_type,
            name,
            faults,
        })
    }
}

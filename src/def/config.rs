//! Node configuration trees.
//!
//! A configuration is either a map of named sub-configurations or a single
//! typed value. Maps nest arbitrarily deep, and every level keeps its own
//! fault tree, so a malformed leaf setting deep inside `model_settings`
//! shows up under the exact path that produced it.

use std::fmt;

use indexmap::IndexMap;

use crate::error::DefError;
use crate::fallible::{
    BuildMode, Cause, Fault, FaultCarrier, FaultTree, FieldId, MapSlot, Scope, Slot,
};

/// A typed configuration value.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigValue {
    /// A boolean setting.
    Bool(bool),
    /// An integral setting.
    Int(i64),
    /// A floating point setting.
    Double(f64),
    /// A text setting.
    String(String),
}

impl ConfigValue {
    /// Name of the value's type, as used in diagnostics.
    #[must_use]
    pub const fn type_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::Int(_) => "int",
            Self::Double(_) => "double",
            Self::String(_) => "string",
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(value) => write!(f, "{value}"),
            Self::Int(value) => write!(f, "{value}"),
            Self::Double(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

/// Fields of [`ConfigValueDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigValueField {
    /// The stored value.
    Value,
}

impl FieldId for ConfigValueField {
    fn name(self) -> &'static str {
        match self {
            Self::Value => "value",
        }
    }
}

/// A leaf of the configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigValueDef {
    value: Option<ConfigValue>,
    faults: FaultTree,
}

impl ConfigValueDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> ConfigValueDefBuilder {
        ConfigValueDefBuilder::new()
    }

    /// A node with every required field recorded as missing.
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            value: None,
            faults: FaultTree::missing(&[ConfigValueField::Value]),
        }
    }

    /// The stored value.
    #[must_use]
    pub const fn value(&self) -> Option<&ConfigValue> {
        self.value.as_ref()
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: ConfigValueField) -> Option<&FaultTree> {
        self.faults.field(field)
    }

    /// The fault that made `field` fall back to its default.
    #[must_use]
    pub fn supply_fault(&self, field: ConfigValueField) -> Option<&Fault> {
        self.fault_tree_for(field).and_then(FaultTree::fault)
    }
}

impl FaultCarrier for ConfigValueDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`ConfigValueDef`].
#[derive(Debug, Clone, Default)]
pub struct ConfigValueDefBuilder {
    mode: BuildMode,
    value: Slot<ConfigValue>,
}

impl ConfigValueDefBuilder {
    const ENTITY: &'static str = "ConfigValueDef";

    /// A tolerant builder with the value unset.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(BuildMode::Tolerant)
    }

    /// A builder that aborts when the value cannot be supplied.
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
    pub fn from_def(def: &ConfigValueDef) -> Self {
        Self {
            mode: BuildMode::Tolerant,
            value: Slot::copied(
                def.value.clone(),
                def.faults.field_subtree(ConfigValueField::Value),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Sets the value.
    pub fn set_value(&mut self, value: ConfigValue) -> &mut Self {
        self.value.assign(value);
        self
    }

    /// Sets the value from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `value` failed and the builder is
    /// strict.
    pub fn set_value_with<E: Into<Cause>>(
        &mut self,
        value: Result<ConfigValue, E>,
        fallback: Option<ConfigValue>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.value
            .supply(scope, &ConfigValueField::Value.key(), value, fallback)?;
        Ok(self)
    }

    /// Builds the leaf, recording an unset value as missing.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if the value is missing and the builder
    /// is strict.
    pub fn build(mut self) -> Result<ConfigValueDef, DefError> {
        let scope = self.scope();
        self.value.require(scope, &ConfigValueField::Value.key())?;
        let (value, value_faults) = self.value.into_parts();
        let faults = FaultTree::merge(None, [(ConfigValueField::Value.key(), value_faults)]);
        Ok(ConfigValueDef { value, faults })
    }
}

/// Fields of [`ConfigMapDef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConfigMapField {
    /// Named sub-configurations.
    Children,
}

impl FieldId for ConfigMapField {
    fn name(self) -> &'static str {
        match self {
            Self::Children => "children",
        }
    }
}

/// An inner node of the configuration tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigMapDef {
    children: IndexMap<String, ConfigDef>,
    faults: FaultTree,
}

impl ConfigMapDef {
    /// A tolerant builder.
    #[must_use]
    pub fn builder() -> ConfigMapDefBuilder {
        ConfigMapDefBuilder::new()
    }

    /// Sub-configurations in document order.
    #[must_use]
    pub const fn children(&self) -> &IndexMap<String, ConfigDef> {
        &self.children
    }

    /// One sub-configuration by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ConfigDef> {
        self.children.get(key)
    }

    /// Sub-configurations that carry faults.
    pub fn faulty_children(&self) -> impl Iterator<Item = (&str, &ConfigDef)> {
        self.children
            .iter()
            .filter(|(_, child)| child.has_faults())
            .map(|(key, child)| (key.as_str(), child))
    }

    /// Fault sub-tree of one field; `None` if the field loaded cleanly.
    #[must_use]
    pub fn fault_tree_for(&self, field: ConfigMapField) -> Option<&FaultTree> {
        self.faults.field(field)
    }
}

impl FaultCarrier for ConfigMapDef {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

/// Builder for [`ConfigMapDef`].
#[derive(Debug, Clone, Default)]
pub struct ConfigMapDefBuilder {
    mode: BuildMode,
    children: MapSlot<ConfigDef>,
}

impl ConfigMapDefBuilder {
    const ENTITY: &'static str = "ConfigMapDef";

    /// A tolerant builder with no children.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(BuildMode::Tolerant)
    }

    /// A builder that aborts at the first child that cannot be supplied.
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
    pub fn from_def(def: &ConfigMapDef) -> Self {
        Self {
            mode: BuildMode::Tolerant,
            children: MapSlot::copied(
                def.children.clone(),
                def.faults.field_subtree(ConfigMapField::Children),
            ),
        }
    }

    const fn scope(&self) -> Scope {
        Scope::new(Self::ENTITY, self.mode)
    }

    /// Replaces the bulk children.
    pub fn set_children(&mut self, children: IndexMap<String, ConfigDef>) -> &mut Self {
        self.children.assign_all(children);
        self
    }

    /// Replaces the bulk children from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `children` failed and the builder is
    /// strict.
    pub fn set_children_with<E: Into<Cause>>(
        &mut self,
        children: Result<IndexMap<String, ConfigDef>, E>,
        fallback: IndexMap<String, ConfigDef>,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.children.supply_all(
            scope,
            &ConfigMapField::Children.key(),
            children,
            fallback,
        )?;
        Ok(self)
    }

    /// Puts one child; it replaces a bulk child with the same key.
    pub fn put_to_children(&mut self, key: impl Into<String>, child: ConfigDef) -> &mut Self {
        self.children.insert(key.into(), child);
        self
    }

    /// Puts one child from a supply result.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] if `child` failed and the builder is
    /// strict.
    pub fn put_to_children_with<E: Into<Cause>>(
        &mut self,
        key: impl Into<String>,
        child: Result<ConfigDef, E>,
        fallback: ConfigDef,
    ) -> Result<&mut Self, DefError> {
        let scope = self.scope();
        self.children.supply_entry_node(
            scope,
            &ConfigMapField::Children.key(),
            key.into(),
            child,
            fallback,
        )?;
        Ok(self)
    }

    /// Builds the map node.
    ///
    /// # Errors
    ///
    /// Does not fail: a map has no required field. A strict builder reports
    /// failures from its `_with` setters instead.
    pub fn build(self) -> Result<ConfigMapDef, DefError> {
        let (children, children_faults) = self.children.into_node_parts();
        let faults = FaultTree::merge(None, [(ConfigMapField::Children.key(), children_faults)]);
        Ok(ConfigMapDef { children, faults })
    }
}

/// One node of a configuration tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigDef {
    /// Named sub-configurations.
    Map(ConfigMapDef),
    /// A single value.
    Value(ConfigValueDef),
}

impl ConfigDef {
    /// The map, if this node is one.
    #[must_use]
    pub const fn as_map(&self) -> Option<&ConfigMapDef> {
        match self {
            Self::Map(map) => Some(map),
            Self::Value(_) => None,
        }
    }

    /// The value leaf, if this node is one.
    #[must_use]
    pub const fn as_value(&self) -> Option<&ConfigValueDef> {
        match self {
            Self::Value(value) => Some(value),
            Self::Map(_) => None,
        }
    }

    /// Follows `keys` through nested maps.
    #[must_use]
    pub fn lookup(&self, keys: &[&str]) -> Option<&Self> {
        keys.iter()
            .try_fold(self, |node, key| node.as_map().and_then(|map| map.get(*key)))
    }
}

impl Default for ConfigDef {
    fn default() -> Self {
        Self::Map(ConfigMapDef::default())
    }
}

impl From<ConfigMapDef> for ConfigDef {
    fn from(map: ConfigMapDef) -> Self {
        Self::Map(map)
    }
}

impl From<ConfigValueDef> for ConfigDef {
    fn from(value: ConfigValueDef) -> Self {
        Self::Value(value)
    }
}

impl FaultCarrier for ConfigDef {
    fn fault_tree(&self) -> &FaultTree {
        match self {
            Self::Map(map) => map.fault_tree(),
            Self::Value(value) => value.fault_tree(),
        }
    }

    fn with_fault(self, fault: Fault) -> Self {
        match self {
            Self::Map(map) => Self::Map(map.with_fault(fault)),
            Self::Value(value) => Self::Value(value.with_fault(fault)),
        }
    }
}

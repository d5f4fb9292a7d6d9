//! The workflow document object model.
//!
//! Each entity comes as an immutable `*Def` node, a `*DefBuilder` that
//! feeds every field through the [`fallible`](crate::fallible) setter
//! protocol, and a `*Field` enum naming the entity's fields in its fault
//! tree. Required values are `Option`s: a tolerant build leaves a missing
//! value as `None` and records why in the node's fault tree.

mod annotation;
mod bounds;
mod config;
mod connection;
mod identifier;
mod newtypes;
mod node;
mod port;
mod workflow;

pub use annotation::{AnnotationDef, AnnotationDefBuilder, AnnotationField};
pub use bounds::{BoundsDef, BoundsDefBuilder, BoundsField};
pub use config::{
    ConfigDef, ConfigMapDef, ConfigMapDefBuilder, ConfigMapField, ConfigValue, ConfigValueDef,
    ConfigValueDefBuilder, ConfigValueField,
};
pub use connection::{ConnectionDef, ConnectionDefBuilder, ConnectionField, Coordinate};
pub use identifier::validate_port_type_id;
pub use newtypes::PortTypeId;
pub use node::{NodeDef, NodeDefBuilder, NodeField, NodeKind};
pub use port::{PortDef, PortDefBuilder, PortField};
pub use workflow::{WorkflowDef, WorkflowDefBuilder, WorkflowField};

//! `workflowdef`: a partial-failure-tolerant object model for workflow
//! documents.
//!
//! Nodes, connections, annotations, ports and configuration trees are built
//! through builders whose setters accept already evaluated results. A failed
//! result does not abort construction: the field falls back to a default and
//! the failure is recorded in a fault tree that travels with the built node.
//!
//! - [`fallible`] holds the generic setter protocol and the fault tree.
//! - [`def`] holds the document entities and their builders.
//! - [`load`] reads YAML documents through those builders and turns the
//!   resulting fault trees into diagnostics.

pub mod def;
mod error;
pub mod fallible;
pub mod load;

pub use error::{DefError, FieldError};

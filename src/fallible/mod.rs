//! Partial-failure-tolerant construction of immutable document nodes.
//!
//! Every field of every builder is backed by one of three slot types:
//! [`Slot`] for single values and child nodes, [`ListSlot`] for lists, and
//! [`MapSlot`] for string-keyed maps. Setters hand a slot an already
//! evaluated `Result` plus a fallback. When the result is an error the slot
//! stores the fallback and records a [`Fault`]; `build()` then merges the
//! per-field faults into one [`FaultTree`] attached to the node.
//!
//! A [`Scope`] in [`BuildMode::Strict`] turns the first failure into
//! [`DefError::Strict`](crate::DefError::Strict) instead.

mod carrier;
mod fault;
mod key;
mod list;
mod map;
mod scope;
mod slot;
mod tree;

#[cfg(test)]
mod testing;

pub use carrier::FaultCarrier;
pub use fault::{Cause, Fault};
pub use key::{FaultKey, FaultPath, FieldId};
pub use list::ListSlot;
pub use map::MapSlot;
pub use scope::{BuildMode, Scope};
pub use slot::{Slot, SlotState};
pub use tree::FaultTree;

//! The setter protocol for single-valued fields.
//!
//! A [`Slot`] backs one scalar or child-node field of a builder. It holds
//! the field's current value and the fault sub-tree recorded by the last
//! setter call, and it knows whether the field was ever set so `build()` can
//! record missing required fields uniformly.

use crate::error::{DefError, FieldError};

use super::carrier::FaultCarrier;
use super::fault::Cause;
use super::key::FaultKey;
use super::scope::Scope;
use super::tree::FaultTree;

/// Outcome of the most recent setter call on a slot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SlotState {
    /// No setter has been called yet.
    #[default]
    Unset,
    /// The last setter call stored a supplied value.
    Supplied,
    /// The last setter call stored a fallback and recorded a fault.
    Faulted,
}

/// Storage and fault bookkeeping for one single-valued field.
///
/// Every setter call replaces both the value and the recorded faults, so the
/// last call wins and faults never accumulate across calls.
#[derive(Debug, Clone)]
pub struct Slot<T> {
    value: Option<T>,
    faults: FaultTree,
    state: SlotState,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Slot<T> {
    /// An unset slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            value: None,
            faults: FaultTree::EMPTY,
            state: SlotState::Unset,
        }
    }

    /// A slot seeded from an existing node's field.
    ///
    /// No supplier runs, so no new fault can arise; faults the source node
    /// already had for this field are carried over.
    #[must_use]
    pub const fn copied(value: Option<T>, faults: FaultTree) -> Self {
        let state = if faults.has_faults() {
            SlotState::Faulted
        } else {
            SlotState::Supplied
        };
        Self {
            value,
            faults,
            state,
        }
    }

    /// Outcome of the most recent setter call.
    #[must_use]
    pub const fn state(&self) -> SlotState {
        self.state
    }

    /// The current value.
    #[must_use]
    pub const fn value(&self) -> Option<&T> {
        self.value.as_ref()
    }

    /// The faults recorded by the most recent setter call.
    #[must_use]
    pub const fn faults(&self) -> &FaultTree {
        &self.faults
    }

    /// Stores `value` without any fault.
    pub fn assign(&mut self, value: T) {
        self.assign_optional(Some(value));
    }

    /// Stores an optional value without any fault.
    pub fn assign_optional(&mut self, value: Option<T>) {
        self.value = value;
        self.faults = FaultTree::EMPTY;
        self.state = SlotState::Supplied;
    }

    /// Stores the supplied value, or `fallback` plus a fault if supplying
    /// failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<T, E>,
        fallback: Option<T>,
    ) -> Result<(), DefError> {
        self.supply_optional(scope, key, supplied.map(Some), fallback)
    }

    /// Like [`Slot::supply`], but a supplied `None` is a legitimate absent
    /// value rather than a fault.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_optional<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<Option<T>, E>,
        fallback: Option<T>,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(value) => {
                self.assign_optional(value);
                Ok(())
            }
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.value = fallback;
                self.faults = FaultTree::leaf(fault);
                self.state = SlotState::Faulted;
                Ok(())
            }
        }
    }

    /// Records a missing-field fault if no setter was ever called.
    ///
    /// The recorded state is identical to supplying
    /// `Err(FieldError::Missing)` with no fallback.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] for an unset field in a strict scope.
    pub fn require(&mut self, scope: Scope, key: &FaultKey) -> Result<(), DefError> {
        if self.state != SlotState::Unset {
            return Ok(());
        }
        self.supply(scope, key, Err(FieldError::missing(key.to_string())), None)
    }

    /// Splits the slot into its final value and fault sub-tree.
    #[must_use]
    pub fn into_parts(self) -> (Option<T>, FaultTree) {
        (self.value, self.faults)
    }
}

impl<T: FaultCarrier> Slot<T> {
    /// Stores a child node, propagating the child's own faults.
    pub fn assign_node(&mut self, node: T) {
        self.assign_optional_node(Some(node));
    }

    /// Stores an optional child node, propagating the child's own faults.
    pub fn assign_optional_node(&mut self, node: Option<T>) {
        self.faults = node
            .as_ref()
            .map_or(FaultTree::EMPTY, |child| child.fault_tree().clone());
        self.value = node;
        self.state = SlotState::Supplied;
    }

    /// Stores the supplied child node, or a fault-carrying `fallback`.
    ///
    /// A successfully supplied child that is itself faulty still leaves its
    /// faults under this field. On failure the fallback receives the new
    /// fault through [`FaultCarrier::with_fault`], keeping its own history.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_node<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<T, E>,
        fallback: Option<T>,
    ) -> Result<(), DefError> {
        self.supply_optional_node(scope, key, supplied.map(Some), fallback)
    }

    /// Like [`Slot::supply_node`], but a supplied `None` is legitimate.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_optional_node<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<Option<T>, E>,
        fallback: Option<T>,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(node) => {
                self.assign_optional_node(node);
                Ok(())
            }
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                match fallback {
                    Some(default_node) => {
                        let marked = default_node.with_fault(fault);
                        self.faults = marked.fault_tree().clone();
                        self.value = Some(marked);
                    }
                    None => {
                        self.faults = FaultTree::EMPTY.inject(fault);
                        self.value = None;
                    }
                }
                self.state = SlotState::Faulted;
                Ok(())
            }
        }
    }
}

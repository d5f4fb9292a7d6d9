//! The capability shared by every node that carries a fault tree.

use super::fault::Fault;
use super::tree::FaultTree;

/// A built node that exposes its fault tree.
///
/// Child fields are typed by this capability rather than by concrete node
/// types, so a parent can propagate any child's faults and can replace a
/// fallback child with a copy that records why it was needed.
pub trait FaultCarrier: Sized {
    /// The faults of this node and everything below it.
    fn fault_tree(&self) -> &FaultTree;

    /// Returns this node with `fault` injected as its own fault.
    ///
    /// The node's existing faults are kept (see [`FaultTree::inject`]).
    #[must_use]
    fn with_fault(self, fault: Fault) -> Self;

    /// Returns `true` when this node or any descendant faulted.
    fn has_faults(&self) -> bool {
        self.fault_tree().has_faults()
    }
}

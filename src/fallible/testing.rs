//! A minimal fault-carrying node for slot unit tests.

use super::carrier::FaultCarrier;
use super::fault::Fault;
use super::key::FaultKey;
use super::scope::{BuildMode, Scope};
use super::tree::FaultTree;

pub(crate) const TOLERANT: Scope = Scope::new("Sample", BuildMode::Tolerant);
pub(crate) const STRICT: Scope = Scope::new("Sample", BuildMode::Strict);
pub(crate) const FIELD: FaultKey = FaultKey::Field("value");

/// A node holding a label and whatever faults a test gives it.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Sample {
    pub(crate) label: &'static str,
    pub(crate) faults: FaultTree,
}

impl Sample {
    pub(crate) const fn clean(label: &'static str) -> Self {
        Self {
            label,
            faults: FaultTree::EMPTY,
        }
    }

    pub(crate) fn faulty(label: &'static str, message: &str) -> Self {
        Self {
            label,
            faults: FaultTree::merge(
                None,
                [(
                    FaultKey::Field("inner"),
                    FaultTree::leaf(Fault::new(message.to_owned())),
                )],
            ),
        }
    }
}

impl FaultCarrier for Sample {
    fn fault_tree(&self) -> &FaultTree {
        &self.faults
    }

    fn with_fault(mut self, fault: Fault) -> Self {
        self.faults = self.faults.inject(fault);
        self
    }
}

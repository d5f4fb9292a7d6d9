//! The setter protocol for list fields.
//!
//! A list is fed through two channels. The bulk channel replaces the whole
//! list in one call; the element channel appends one element per call. At
//! build time bulk elements come first and appended elements follow, no
//! matter in which order the calls were made.

use crate::error::DefError;

use super::carrier::FaultCarrier;
use super::fault::Cause;
use super::key::FaultKey;
use super::scope::Scope;
use super::tree::FaultTree;

/// Storage and fault bookkeeping for one list field.
#[derive(Debug, Clone)]
pub struct ListSlot<T> {
    bulk: Vec<T>,
    bulk_faults: FaultTree,
    added: Vec<T>,
    added_faults: Vec<(usize, FaultTree)>,
}

impl<T> Default for ListSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ListSlot<T> {
    /// An empty list slot.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            bulk: Vec::new(),
            bulk_faults: FaultTree::EMPTY,
            added: Vec::new(),
            added_faults: Vec::new(),
        }
    }

    /// A slot whose bulk channel is seeded from an existing node's field.
    #[must_use]
    pub const fn copied(values: Vec<T>, faults: FaultTree) -> Self {
        Self {
            bulk: values,
            bulk_faults: faults,
            added: Vec::new(),
            added_faults: Vec::new(),
        }
    }

    /// Number of elements across both channels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bulk.len() + self.added.len()
    }

    /// Returns `true` when neither channel holds an element.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bulk.is_empty() && self.added.is_empty()
    }

    /// Replaces the bulk channel with `values`.
    pub fn assign_all(&mut self, values: Vec<T>) {
        self.bulk = values;
        self.bulk_faults = FaultTree::EMPTY;
    }

    /// Replaces the bulk channel with the supplied list, or with `fallback`
    /// plus a self fault on the field if supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_all<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<Vec<T>, E>,
        fallback: Vec<T>,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(values) => self.assign_all(values),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.bulk = fallback;
                self.bulk_faults = FaultTree::EMPTY.inject(fault);
            }
        }
        Ok(())
    }

    /// Appends one element.
    pub fn push(&mut self, value: T) {
        self.added.push(value);
    }

    /// Appends the supplied element, or `fallback` plus a fault keyed by the
    /// element's index if supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_element<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<T, E>,
        fallback: T,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(value) => self.push(value),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.added_faults
                    .push((self.added.len(), FaultTree::leaf(fault)));
                self.added.push(fallback);
            }
        }
        Ok(())
    }

    /// Concatenates the channels and assembles the field's fault tree.
    ///
    /// Element faults are keyed by final index, offset past the bulk
    /// elements.
    #[must_use]
    pub fn into_parts(self) -> (Vec<T>, FaultTree) {
        let Self {
            mut bulk,
            bulk_faults,
            added,
            added_faults,
        } = self;
        let offset = bulk.len();
        let inherited = bulk_faults
            .children()
            .map(|(key, tree)| (key.clone(), tree.clone()));
        let appended = added_faults
            .into_iter()
            .map(|(position, tree)| (FaultKey::Index(offset + position), tree));
        let faults = FaultTree::merge(bulk_faults.fault().cloned(), inherited.chain(appended));
        bulk.extend(added);
        (bulk, faults)
    }
}

impl<T: FaultCarrier> ListSlot<T> {
    /// Appends the supplied child node, or `fallback` marked with the fault
    /// if supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_element_node<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<T, E>,
        fallback: T,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(node) => self.push(node),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.added.push(fallback.with_fault(fault));
            }
        }
        Ok(())
    }

    /// Concatenates the channels and assembles the field's fault tree from
    /// each element's own faults, keyed by final index.
    #[must_use]
    pub fn into_node_parts(self) -> (Vec<T>, FaultTree) {
        let Self {
            mut bulk,
            bulk_faults,
            added,
            ..
        } = self;
        bulk.extend(added);
        let elements = bulk
            .iter()
            .enumerate()
            .map(|(index, node)| (FaultKey::Index(index), node.fault_tree().clone()));
        let faults = FaultTree::merge(bulk_faults.fault().cloned(), elements);
        (bulk, faults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fallible::Fault;
    use crate::fallible::testing::{FIELD, Sample, STRICT, TOLERANT};

    fn failed<T>(message: &str) -> Result<T, String> {
        Err(message.to_owned())
    }

    #[test]
    fn bulk_precedes_added_regardless_of_call_order() {
        let mut slot = ListSlot::new();
        slot.push('c');
        slot.assign_all(vec!['a', 'b']);
        slot.push('d');
        let (values, faults) = slot.into_parts();
        assert_eq!(values, vec!['a', 'b', 'c', 'd']);
        assert!(faults.is_empty());
    }

    #[test]
    fn later_bulk_supersedes_earlier_bulk() {
        let mut slot = ListSlot::new();
        slot.assign_all(vec![1, 2, 3]);
        slot.assign_all(vec![9]);
        slot.push(10);
        assert_eq!(slot.len(), 2);
        assert_eq!(slot.into_parts().0, vec![9, 10]);
    }

    #[test]
    fn element_fault_is_keyed_by_final_index() -> Result<(), DefError> {
        let mut slot = ListSlot::new();
        slot.assign_all(vec!["a", "b"]);
        slot.supply_element(TOLERANT, &FIELD, Ok::<_, String>("c"), "?")?;
        slot.supply_element(TOLERANT, &FIELD, failed("d broke"), "fallback")?;

        let (values, faults) = slot.into_parts();
        assert_eq!(values, vec!["a", "b", "c", "fallback"]);
        let at_three = faults.child(&FaultKey::Index(3)).and_then(FaultTree::leaf_fault);
        assert_eq!(at_three, Some(&Fault::new("d broke")));
        assert_eq!(faults.children().count(), 1);
        assert!(faults.self_fault().is_none());
        Ok(())
    }

    #[test]
    fn bulk_failure_records_self_fault() -> Result<(), DefError> {
        let mut slot = ListSlot::new();
        slot.supply_all(TOLERANT, &FIELD, failed("not a list"), vec![0])?;
        slot.push(1);
        let (values, faults) = slot.into_parts();
        assert_eq!(values, vec![0, 1]);
        assert_eq!(faults.self_fault(), Some(&Fault::new("not a list")));
        Ok(())
    }

    #[test]
    fn successful_bulk_clears_earlier_bulk_fault() -> Result<(), DefError> {
        let mut slot = ListSlot::new();
        slot.supply_all(TOLERANT, &FIELD, failed("not a list"), Vec::new())?;
        slot.supply_all(TOLERANT, &FIELD, Ok::<_, String>(vec![4]), Vec::new())?;
        assert!(slot.into_parts().1.is_empty());
        Ok(())
    }

    #[test]
    fn strict_element_failure_escalates() {
        let mut slot = ListSlot::new();
        let result = slot.supply_element(STRICT, &FIELD, failed("bad"), 0);
        assert!(result.is_err());
        assert!(slot.is_empty());
    }

    #[test]
    fn copied_faults_survive_and_offset_added_faults() -> Result<(), DefError> {
        let inherited = FaultTree::merge(
            None,
            [(FaultKey::Index(0), FaultTree::leaf(Fault::new("old")))],
        );
        let mut slot = ListSlot::copied(vec![0], inherited);
        slot.supply_element(TOLERANT, &FIELD, failed("new"), 1)?;
        let (_, faults) = slot.into_parts();
        assert_eq!(
            faults.child(&FaultKey::Index(0)).and_then(FaultTree::leaf_fault),
            Some(&Fault::new("old"))
        );
        assert_eq!(
            faults.child(&FaultKey::Index(1)).and_then(FaultTree::leaf_fault),
            Some(&Fault::new("new"))
        );
        Ok(())
    }

    #[test]
    fn node_elements_contribute_their_own_trees() -> Result<(), DefError> {
        let mut slot = ListSlot::new();
        slot.assign_all(vec![Sample::clean("a"), Sample::faulty("b", "b inner")]);
        slot.supply_element_node(TOLERANT, &FIELD, failed("c unreadable"), Sample::clean("c"))?;

        let (values, faults) = slot.into_node_parts();
        let labels: Vec<&str> = values.iter().map(|sample| sample.label).collect();
        assert_eq!(labels, vec!["a", "b", "c"]);
        assert!(faults.child(&FaultKey::Index(0)).is_none());
        assert!(faults.child(&FaultKey::Index(1)).is_some());
        let marked = faults.child(&FaultKey::Index(2));
        assert_eq!(
            marked.and_then(FaultTree::self_fault),
            Some(&Fault::new("c unreadable"))
        );
        Ok(())
    }
}

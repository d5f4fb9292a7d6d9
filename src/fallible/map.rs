//! The setter protocol for map fields keyed by caller-supplied strings.

use indexmap::IndexMap;

use crate::error::DefError;

use super::carrier::FaultCarrier;
use super::fault::Cause;
use super::key::FaultKey;
use super::scope::Scope;
use super::tree::FaultTree;

/// Storage and fault bookkeeping for one map field.
///
/// Like [`ListSlot`](super::ListSlot) it has a bulk channel and an
/// individual channel. Individual entries replace bulk entries that share
/// their key and keep the bulk entry's position; new keys are appended.
#[derive(Debug, Clone)]
pub struct MapSlot<T> {
    bulk: IndexMap<String, T>,
    bulk_faults: FaultTree,
    put: IndexMap<String, T>,
    put_faults: IndexMap<String, FaultTree>,
}

impl<T> Default for MapSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> MapSlot<T> {
    /// An empty map slot.
    #[must_use]
    pub fn new() -> Self {
        Self {
            bulk: IndexMap::new(),
            bulk_faults: FaultTree::EMPTY,
            put: IndexMap::new(),
            put_faults: IndexMap::new(),
        }
    }

    /// A slot whose bulk channel is seeded from an existing node's field.
    #[must_use]
    pub fn copied(entries: IndexMap<String, T>, faults: FaultTree) -> Self {
        Self {
            bulk: entries,
            bulk_faults: faults,
            ..Self::new()
        }
    }

    /// Replaces the bulk channel with `entries`.
    pub fn assign_all(&mut self, entries: IndexMap<String, T>) {
        self.bulk = entries;
        self.bulk_faults = FaultTree::EMPTY;
    }

    /// Replaces the bulk channel with the supplied map, or with `fallback`
    /// plus a self fault on the field if supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_all<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        supplied: Result<IndexMap<String, T>, E>,
        fallback: IndexMap<String, T>,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(entries) => self.assign_all(entries),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.bulk = fallback;
                self.bulk_faults = FaultTree::EMPTY.inject(fault);
            }
        }
        Ok(())
    }

    /// Puts one entry; a later put for the same key wins.
    pub fn insert(&mut self, entry: String, value: T) {
        self.put_faults.shift_remove(&entry);
        self.put.insert(entry, value);
    }

    /// Puts the supplied value, or `fallback` plus a fault keyed by `entry`
    /// if supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_entry<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        entry: String,
        supplied: Result<T, E>,
        fallback: T,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(value) => self.insert(entry, value),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.put_faults
                    .insert(entry.clone(), FaultTree::leaf(fault));
                self.put.insert(entry, fallback);
            }
        }
        Ok(())
    }

    /// Overlays individual entries onto the bulk entries and assembles the
    /// field's fault tree, keyed by entry key.
    #[must_use]
    pub fn into_parts(self) -> (IndexMap<String, T>, FaultTree) {
        let Self {
            mut bulk,
            bulk_faults,
            put,
            put_faults,
        } = self;
        let inherited = bulk_faults
            .children()
            .filter(|(key, _)| !is_put_key(key, &put))
            .map(|(key, tree)| (key.clone(), tree.clone()));
        let entries = put_faults
            .into_iter()
            .map(|(entry, tree)| (FaultKey::Key(entry), tree));
        let faults = FaultTree::merge(bulk_faults.fault().cloned(), inherited.chain(entries));
        bulk.extend(put);
        (bulk, faults)
    }
}

fn is_put_key<T>(key: &FaultKey, put: &IndexMap<String, T>) -> bool {
    matches!(key, FaultKey::Key(entry) if put.contains_key(entry))
}

impl<T: FaultCarrier> MapSlot<T> {
    /// Puts the supplied child node, or `fallback` marked with the fault if
    /// supplying failed.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] when supplying failed in a strict scope.
    pub fn supply_entry_node<E: Into<Cause>>(
        &mut self,
        scope: Scope,
        key: &FaultKey,
        entry: String,
        supplied: Result<T, E>,
        fallback: T,
    ) -> Result<(), DefError> {
        match supplied {
            Ok(node) => self.insert(entry, node),
            Err(cause) => {
                let fault = scope.fail(key, cause)?;
                self.insert(entry, fallback.with_fault(fault));
            }
        }
        Ok(())
    }

    /// Overlays individual entries onto the bulk entries and assembles the
    /// field's fault tree from each child's own faults.
    #[must_use]
    pub fn into_node_parts(self) -> (IndexMap<String, T>, FaultTree) {
        let Self {
            mut bulk,
            bulk_faults,
            put,
            ..
        } = self;
        bulk.extend(put);
        let entries = bulk
            .iter()
            .map(|(entry, node)| (FaultKey::Key(entry.clone()), node.fault_tree().clone()));
        let faults = FaultTree::merge(bulk_faults.fault().cloned(), entries);
        (bulk, faults)
    }
}

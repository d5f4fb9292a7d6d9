//! The recursive fault tree attached to every built node.

use indexmap::IndexMap;

use crate::error::FieldError;

use super::fault::Fault;
use super::key::{FaultKey, FaultPath, FieldId};

/// Describes which parts of a node (transitively) fell back to defaults.
///
/// A tree is one of:
///
/// - EMPTY: nothing faulted. This is the [`Default`] value.
/// - a leaf: exactly one fault, produced by a scalar field.
/// - an interior node: an optional fault for the container itself plus a
///   mapping from [`FaultKey`] to non-empty sub-trees.
///
/// Interior nodes are only built through [`FaultTree::merge`] and
/// [`FaultTree::inject`], which drop empty children and collapse a
/// childless, self-less interior into EMPTY. An EMPTY tree is therefore
/// always the one canonical value and compares equal to any other.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FaultTree {
    repr: Repr,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum Repr {
    #[default]
    Empty,
    Leaf(Fault),
    Interior {
        fault: Option<Fault>,
        children: IndexMap<FaultKey, FaultTree>,
    },
}

impl FaultTree {
    /// The tree without any faults.
    pub const EMPTY: Self = Self { repr: Repr::Empty };

    /// A leaf holding one fault.
    #[must_use]
    pub const fn leaf(fault: Fault) -> Self {
        Self {
            repr: Repr::Leaf(fault),
        }
    }

    /// Builds an interior node from an optional self fault and child trees.
    ///
    /// Empty children are dropped. When no child remains and `self_fault` is
    /// `None` the result is [`FaultTree::EMPTY`]. A later child with the same
    /// key replaces an earlier one.
    pub fn merge<I>(self_fault: Option<Fault>, children: I) -> Self
    where
        I: IntoIterator<Item = (FaultKey, Self)>,
    {
        let children: IndexMap<FaultKey, Self> = children
            .into_iter()
            .filter(|(_, tree)| !tree.is_empty())
            .collect();
        Self::interior(self_fault, children)
    }

    fn interior(fault: Option<Fault>, children: IndexMap<FaultKey, Self>) -> Self {
        if fault.is_none() && children.is_empty() {
            return Self::EMPTY;
        }
        Self {
            repr: Repr::Interior { fault, children },
        }
    }

    /// One missing-field leaf per field of `fields`.
    ///
    /// This is the tree `build()` records for required fields that were
    /// never set.
    #[must_use]
    pub fn missing<F: FieldId>(fields: &[F]) -> Self {
        Self::merge(
            None,
            fields.iter().copied().map(|field| {
                (
                    field.key(),
                    Self::leaf(Fault::new(FieldError::missing(field.name()))),
                )
            }),
        )
    }

    /// Returns this tree with `fault` injected as the container's own fault.
    ///
    /// Used when a node is stored as the fallback of a field whose supply
    /// failed. The node's existing children are kept. An existing leaf or self
    /// fault is kept too, as the [`FaultKey::Prior`] child. Repeated
    /// injections nest: each `Prior` child holds the next older fault under
    /// its own `Prior` key.
    #[must_use]
    pub fn inject(self, fault: Fault) -> Self {
        let children = match self.repr {
            Repr::Empty => IndexMap::new(),
            Repr::Leaf(prior) => IndexMap::from([(FaultKey::Prior, Self::leaf(prior))]),
            Repr::Interior {
                fault: prior,
                mut children,
            } => {
                if let Some(prior_fault) = prior {
                    let earlier = children
                        .shift_remove(&FaultKey::Prior)
                        .unwrap_or_default();
                    let history = if earlier.is_empty() {
                        Self::leaf(prior_fault)
                    } else {
                        Self::merge(Some(prior_fault), [(FaultKey::Prior, earlier)])
                    };
                    children.insert(FaultKey::Prior, history);
                }
                children
            }
        };
        Self::interior(Some(fault), children)
    }

    /// Returns `true` when nothing in this tree faulted.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        matches!(self.repr, Repr::Empty)
    }

    /// Returns `true` when this tree records at least one fault.
    #[must_use]
    pub const fn has_faults(&self) -> bool {
        !self.is_empty()
    }

    /// The container's own fault; `None` for leaves and EMPTY.
    #[must_use]
    pub const fn self_fault(&self) -> Option<&Fault> {
        match &self.repr {
            Repr::Interior { fault, .. } => fault.as_ref(),
            Repr::Empty | Repr::Leaf(_) => None,
        }
    }

    /// The fault of a leaf; `None` for interiors and EMPTY.
    #[must_use]
    pub const fn leaf_fault(&self) -> Option<&Fault> {
        match &self.repr {
            Repr::Leaf(fault) => Some(fault),
            Repr::Empty | Repr::Interior { .. } => None,
        }
    }

    /// The fault directly attached to this level: the leaf fault or the self
    /// fault, whichever applies.
    #[must_use]
    pub const fn fault(&self) -> Option<&Fault> {
        match &self.repr {
            Repr::Leaf(fault) => Some(fault),
            Repr::Interior { fault, .. } => fault.as_ref(),
            Repr::Empty => None,
        }
    }

    /// The sub-tree of one child; `None` when that child had no fault.
    #[must_use]
    pub fn child(&self, key: &FaultKey) -> Option<&Self> {
        match &self.repr {
            Repr::Interior { children, .. } => children.get(key),
            Repr::Empty | Repr::Leaf(_) => None,
        }
    }

    /// The sub-tree of one entity field; `None` when the field had no fault.
    #[must_use]
    pub fn field(&self, field: impl FieldId) -> Option<&Self> {
        self.child(&field.key())
    }

    /// An owned copy of one field's sub-tree, EMPTY when it had no fault.
    #[must_use]
    pub fn field_subtree(&self, field: impl FieldId) -> Self {
        self.field(field).cloned().unwrap_or_default()
    }

    /// Follows `keys` from this tree down; `None` if any step had no fault.
    #[must_use]
    pub fn at(&self, keys: &[FaultKey]) -> Option<&Self> {
        keys.iter().try_fold(self, |tree, key| tree.child(key))
    }

    /// Iterates the non-empty children in insertion order.
    pub fn children(&self) -> impl Iterator<Item = (&FaultKey, &Self)> {
        let children = match &self.repr {
            Repr::Interior { children, .. } => Some(children),
            Repr::Empty | Repr::Leaf(_) => None,
        };
        children.into_iter().flat_map(IndexMap::iter)
    }

    /// Every fault in the tree with its path, depth first.
    ///
    /// A container's own fault is listed before the faults of its children.
    #[must_use]
    pub fn faults(&self) -> Vec<(FaultPath, &Fault)> {
        let mut found = Vec::new();
        self.collect_faults(&FaultPath::root(), &mut found);
        found
    }

    fn collect_faults<'a>(&'a self, path: &FaultPath, found: &mut Vec<(FaultPath, &'a Fault)>) {
        if let Some(fault) = self.fault() {
            found.push((path.clone(), fault));
        }
        for (key, child) in self.children() {
            child.collect_faults(&path.join(key), found);
        }
    }

    /// Number of faults recorded anywhere in the tree.
    #[must_use]
    pub fn len(&self) -> usize {
        let own = usize::from(self.fault().is_some());
        own + self.children().map(|(_, child)| child.len()).sum::<usize>()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn fault(message: &str) -> Fault {
        Fault::new(message.to_owned())
    }

    #[test]
    fn default_is_empty() {
        let tree = FaultTree::default();
        assert!(tree.is_empty());
        assert!(!tree.has_faults());
        assert_eq!(tree, FaultTree::EMPTY);
        assert_eq!(tree.len(), 0);
        assert!(tree.faults().is_empty());
    }

    #[test]
    fn leaf_has_fault_but_no_self_fault() {
        let tree = FaultTree::leaf(fault("boom"));
        assert!(tree.has_faults());
        assert!(tree.self_fault().is_none());
        assert_eq!(tree.leaf_fault().map(ToString::to_string).as_deref(), Some("boom"));
        assert_eq!(tree.fault().map(ToString::to_string).as_deref(), Some("boom"));
    }

    #[test]
    fn merge_of_nothing_is_empty() {
        let tree = FaultTree::merge(None, [(FaultKey::Field("x"), FaultTree::EMPTY)]);
        assert!(tree.is_empty());
    }

    #[test]
    fn merge_drops_empty_children() {
        let tree = FaultTree::merge(
            None,
            [
                (FaultKey::Field("x"), FaultTree::EMPTY),
                (FaultKey::Field("y"), FaultTree::leaf(fault("bad y"))),
            ],
        );
        assert!(tree.child(&FaultKey::Field("x")).is_none());
        assert!(tree.child(&FaultKey::Field("y")).is_some());
        assert_eq!(tree.children().count(), 1);
    }

    #[test]
    fn merge_keeps_self_fault_without_children() {
        let tree = FaultTree::merge(Some(fault("container")), Vec::new());
        assert!(tree.has_faults());
        assert_eq!(
            tree.self_fault().map(ToString::to_string).as_deref(),
            Some("container")
        );
        assert!(tree.leaf_fault().is_none());
    }

    #[test]
    fn at_walks_nested_children() {
        let inner = FaultTree::merge(None, [(FaultKey::Field("x"), FaultTree::leaf(fault("x")))]);
        let outer = FaultTree::merge(None, [(FaultKey::Index(2), inner)]);
        let found = outer.at(&[FaultKey::Index(2), FaultKey::Field("x")]);
        assert_eq!(found.and_then(FaultTree::leaf_fault), Some(&fault("x")));
        assert!(outer.at(&[FaultKey::Index(1)]).is_none());
        assert_eq!(outer.at(&[]), Some(&outer));
    }

    #[rstest]
    #[case::empty(FaultTree::EMPTY, 0)]
    #[case::leaf(FaultTree::leaf(fault("a")), 1)]
    #[case::interior(
        FaultTree::merge(
            Some(fault("self")),
            [(FaultKey::Index(0), FaultTree::leaf(fault("a")))],
        ),
        2
    )]
    fn len_counts_every_fault(#[case] tree: FaultTree, #[case] expected: usize) {
        assert_eq!(tree.len(), expected);
    }

    #[test]
    fn inject_into_empty_yields_self_fault_only() {
        let tree = FaultTree::EMPTY.inject(fault("defaulted"));
        assert_eq!(tree.self_fault(), Some(&fault("defaulted")));
        assert_eq!(tree.children().count(), 0);
    }

    #[test]
    fn inject_keeps_existing_children() {
        let existing = FaultTree::merge(None, [(FaultKey::Field("x"), FaultTree::leaf(fault("x")))]);
        let tree = existing.inject(fault("outer"));
        assert_eq!(tree.self_fault(), Some(&fault("outer")));
        assert!(tree.child(&FaultKey::Field("x")).is_some());
    }

    #[test]
    fn inject_preserves_prior_self_fault() {
        let existing = FaultTree::EMPTY.inject(fault("first"));
        let tree = existing.inject(fault("second"));
        assert_eq!(tree.self_fault(), Some(&fault("second")));
        let prior = tree.child(&FaultKey::Prior).and_then(FaultTree::leaf_fault);
        assert_eq!(prior, Some(&fault("first")));
    }

    #[test]
    fn inject_preserves_prior_leaf() {
        let tree = FaultTree::leaf(fault("leaf")).inject(fault("outer"));
        let prior = tree.child(&FaultKey::Prior).and_then(FaultTree::leaf_fault);
        assert_eq!(prior, Some(&fault("leaf")));
    }

    #[test]
    fn repeated_injection_keeps_every_earlier_fault() {
        let existing = FaultTree::merge(None, [(FaultKey::Field("x"), FaultTree::leaf(fault("x")))]);
        let tree = existing
            .inject(fault("first"))
            .inject(fault("second"))
            .inject(fault("third"));
        assert_eq!(tree.len(), 4);
        let rendered: Vec<String> = tree
            .faults()
            .into_iter()
            .map(|(path, found)| format!("{path}: {found}"))
            .collect();
        assert_eq!(
            rendered,
            vec![
                "<root>: third",
                "x: x",
                "(prior): second",
                "(prior).(prior): first",
            ]
        );
    }

    #[test]
    fn triple_injection_into_empty_counts_three() {
        let tree = FaultTree::EMPTY
            .inject(fault("first"))
            .inject(fault("second"))
            .inject(fault("third"));
        assert_eq!(tree.len(), 3);
        let oldest = tree
            .at(&[FaultKey::Prior, FaultKey::Prior])
            .and_then(FaultTree::leaf_fault);
        assert_eq!(oldest, Some(&fault("first")));
    }

    #[derive(Debug, Clone, Copy)]
    enum Edge {
        Left,
        Top,
    }

    impl FieldId for Edge {
        fn name(self) -> &'static str {
            match self {
                Self::Left => "left",
                Self::Top => "top",
            }
        }
    }

    #[test]
    fn missing_records_one_leaf_per_field() {
        let tree = FaultTree::missing(&[Edge::Left, Edge::Top]);
        assert_eq!(tree.len(), 2);
        assert_eq!(
            tree.field(Edge::Top)
                .and_then(FaultTree::leaf_fault)
                .map(ToString::to_string)
                .as_deref(),
            Some("required field 'top' is missing")
        );
        assert!(FaultTree::missing::<Edge>(&[]).is_empty());
    }

    #[test]
    fn faults_lists_self_before_children_with_paths() {
        let nested = FaultTree::merge(None, [(FaultKey::Field("x"), FaultTree::leaf(fault("bad x")))]);
        let tree = FaultTree::merge(
            Some(fault("list")),
            [
                (FaultKey::Index(1), nested),
                (FaultKey::Index(4), FaultTree::leaf(fault("bad 4"))),
            ],
        );
        let rendered: Vec<String> = tree
            .faults()
            .into_iter()
            .map(|(path, f)| format!("{path}: {f}"))
            .collect();
        assert_eq!(
            rendered,
            vec!["<root>: list", "[1].x: bad x", "[4]: bad 4"]
        );
    }

    proptest! {
        #[test]
        fn merge_is_empty_iff_nothing_faulted(
            self_faulted in any::<bool>(),
            faulted in proptest::collection::vec(any::<bool>(), 0..8),
        ) {
            let children = faulted.iter().enumerate().map(|(index, &is_faulty)| {
                let child = if is_faulty {
                    FaultTree::leaf(fault("child"))
                } else {
                    FaultTree::EMPTY
                };
                (FaultKey::Index(index), child)
            });
            let self_fault = self_faulted.then(|| fault("self"));
            let tree = FaultTree::merge(self_fault, children);
            let faulty_children = faulted.iter().filter(|is_faulty| **is_faulty).count();

            prop_assert_eq!(tree.is_empty(), !self_faulted && faulty_children == 0);
            prop_assert_eq!(tree.children().count(), faulty_children);
            prop_assert_eq!(tree.len(), faulty_children + usize::from(self_faulted));
        }
    }
}

//! Child identifiers inside a fault tree and paths built from them.

use std::fmt;

/// Identifies one child of a fault-tree interior node.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FaultKey {
    /// A named field of a fixed-shape entity.
    Field(&'static str),
    /// A position inside a list field.
    Index(usize),
    /// A caller-supplied key inside a map field.
    Key(String),
    /// The earlier self fault of a tree that received an injected fault.
    Prior,
}

impl fmt::Display for FaultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => f.write_str(name),
            Self::Index(index) => write!(f, "[{index}]"),
            Self::Key(key) => write!(f, "['{key}']"),
            Self::Prior => f.write_str("(prior)"),
        }
    }
}

/// A field enumeration of one entity type.
///
/// Every entity declares an enum listing its fields; the enum is how callers
/// ask a node for the fault sub-tree of one field.
pub trait FieldId: Copy {
    /// The field's name as it appears in documents and fault paths.
    fn name(self) -> &'static str;

    /// The fault-tree key for this field.
    fn key(self) -> FaultKey {
        FaultKey::Field(self.name())
    }
}

/// The sequence of keys leading from a tree's root to one fault.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FaultPath(Vec<FaultKey>);

impl FaultPath {
    /// The path of the root itself.
    #[must_use]
    pub const fn root() -> Self {
        Self(Vec::new())
    }

    /// Returns this path extended by `key`.
    #[must_use]
    pub fn join(&self, key: &FaultKey) -> Self {
        let mut keys = self.0.clone();
        keys.push(key.clone());
        Self(keys)
    }

    /// The keys of this path, root first.
    #[must_use]
    pub fn keys(&self) -> &[FaultKey] {
        &self.0
    }

    /// The last key of this path; `None` for the root.
    #[must_use]
    pub fn last(&self) -> Option<&FaultKey> {
        self.0.last()
    }

    /// Returns `true` for the root path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for FaultPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("<root>");
        }
        for (position, key) in self.0.iter().enumerate() {
            let dotted = matches!(key, FaultKey::Field(_) | FaultKey::Prior);
            if dotted && position > 0 {
                f.write_str(".")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

impl FromIterator<FaultKey> for FaultPath {
    fn from_iter<I: IntoIterator<Item = FaultKey>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::field(FaultKey::Field("name"), "name")]
    #[case::index(FaultKey::Index(3), "[3]")]
    #[case::key(FaultKey::Key("node_1".to_owned()), "['node_1']")]
    #[case::prior(FaultKey::Prior, "(prior)")]
    fn keys_render(#[case] key: FaultKey, #[case] expected: &str) {
        assert_eq!(key.to_string(), expected);
    }

    #[test]
    fn root_path_renders_placeholder() {
        assert_eq!(FaultPath::root().to_string(), "<root>");
        assert!(FaultPath::root().is_root());
    }

    #[test]
    fn mixed_path_renders_dotted_and_bracketed() {
        let path: FaultPath = [
            FaultKey::Field("nodes"),
            FaultKey::Key("node_1".to_owned()),
            FaultKey::Field("in_ports"),
            FaultKey::Index(0),
            FaultKey::Field("port_type"),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            path.to_string(),
            "nodes['node_1'].in_ports[0].port_type"
        );
    }

    #[test]
    fn path_starting_with_index_has_no_leading_dot() {
        let path = FaultPath::root()
            .join(&FaultKey::Index(2))
            .join(&FaultKey::Field("x"));
        assert_eq!(path.to_string(), "[2].x");
        assert_eq!(path.last(), Some(&FaultKey::Field("x")));
    }
}

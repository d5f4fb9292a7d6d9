//! Validated newtypes for domain identifiers.
//!
//! `PortTypeId` wraps a `String` that passed port type validation at
//! construction time, so code holding one never re-checks it.

use std::fmt;

use crate::error::FieldError;

use super::identifier::validate_port_type_id;

/// A validated port type id such as `org.knime.core.node.BufferedDataTable`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PortTypeId(String);

impl PortTypeId {
    /// Creates a new `PortTypeId` after validating the input.
    ///
    /// # Errors
    ///
    /// Returns [`FieldError::InvalidIdentifier`] if the string fails
    /// validation.
    pub fn new(s: impl Into<String>) -> Result<Self, FieldError> {
        let id = s.into();
        validate_port_type_id(&id)?;
        Ok(Self(id))
    }

    /// Returns the inner string as a slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The last segment: the simple class name.
    #[must_use]
    pub fn simple_name(&self) -> &str {
        self.0.rsplit('.').next().unwrap_or(&self.0)
    }
}

impl PartialEq<&str> for PortTypeId {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl AsRef<str> for PortTypeId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PortTypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for PortTypeId {
    type Error = FieldError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

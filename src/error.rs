//! Error types for tolerant workflow construction and loading.
//!
//! [`FieldError`] values are causes: they end up wrapped in a
//! [`Fault`](crate::fallible::Fault) and never abort a tolerant build.
//! [`DefError`] values are fatal and abort construction or loading.

use crate::fallible::{Fault, FaultKey};
use crate::load::LoadDiagnostic;

/// Reasons a single field could not be supplied from its source data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
    /// A required field was never supplied or was explicitly null.
    #[error("required field '{field}' is missing")]
    Missing {
        /// Name of the missing field.
        field: String,
    },

    /// The source value had a different shape than the field expects.
    #[error("expected {expected}, found {found}")]
    TypeMismatch {
        /// Shape the field expects.
        expected: &'static str,
        /// Shape that was found instead.
        found: &'static str,
    },

    /// A numeric value does not fit the field's type.
    #[error("value {value} is out of range for {target}")]
    OutOfRange {
        /// The offending value, rendered.
        value: String,
        /// Name of the target type.
        target: &'static str,
    },

    /// A string did not name any variant of an enumerated field.
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// What kind of value was expected (e.g. `node kind`).
        kind: &'static str,
        /// The string that was found.
        value: String,
    },

    /// A port type identifier failed lexical or keyword validation.
    #[error("invalid identifier '{identifier}': {reason}")]
    InvalidIdentifier {
        /// The identifier string that failed validation.
        identifier: String,
        /// A human-readable explanation of why the identifier is invalid.
        reason: String,
    },
}

impl FieldError {
    /// Builds a [`FieldError::Missing`] for `field`.
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing {
            field: field.into(),
        }
    }
}

/// Fatal errors that abort building or loading a workflow document.
#[derive(Debug, thiserror::Error)]
pub enum DefError {
    /// A strict builder met a field that could not be supplied.
    #[error("strict build of {entity} failed at '{key}': {fault}")]
    Strict {
        /// Entity whose builder aborted.
        entity: &'static str,
        /// Field (or element) that failed.
        key: FaultKey,
        /// The fault that would have been recorded in tolerant mode.
        #[source]
        fault: Fault,
    },

    /// The document itself could not be parsed into a value tree.
    #[error("YAML deserialization failed: {message}")]
    Deserialize {
        /// Parser message.
        message: String,
        /// Structured diagnostic with the parse location, when known.
        diagnostic: Option<LoadDiagnostic>,
    },

    /// The document file could not be read.
    #[error("failed to read '{path}': {source}")]
    Io {
        /// Path that was being read.
        path: String,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

impl DefError {
    /// Returns the structured diagnostic attached to a parse failure.
    #[must_use]
    pub const fn diagnostic(&self) -> Option<&LoadDiagnostic> {
        match self {
            Self::Deserialize { diagnostic, .. } => diagnostic.as_ref(),
            Self::Strict { .. } | Self::Io { .. } => None,
        }
    }

    /// Returns the fault that aborted a strict build.
    #[must_use]
    pub const fn strict_fault(&self) -> Option<&Fault> {
        match self {
            Self::Strict { fault, .. } => Some(fault),
            Self::Deserialize { .. } | Self::Io { .. } => None,
        }
    }
}

//! Structured diagnostics for workflow loading.
//!
//! A parse failure is reported with a line and column. Faults recorded by a
//! tolerant load are reported with the path of the field that fell back,
//! since the value tree no longer knows where in the text a field came from.

use std::fmt;

use crate::error::FieldError;
use crate::fallible::{Fault, FaultPath, FaultTree};

/// Stable diagnostic classification codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    /// The document is not valid YAML or its root is not a mapping.
    ParseFailure,
    /// A required field was absent or null.
    MissingField,
    /// A field was present but its value could not be used.
    InvalidValue,
    /// A supplier failed for a reason other than the document's content.
    SupplyFailure,
}

impl DiagnosticCode {
    /// Returns the stable, machine-readable code string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ParseFailure => "workflow.parse_failure",
            Self::MissingField => "workflow.missing_field",
            Self::InvalidValue => "workflow.invalid_value",
            Self::SupplyFailure => "workflow.supply_failure",
        }
    }

    /// Classifies a recorded fault by its cause.
    #[must_use]
    pub fn for_fault(fault: &Fault) -> Self {
        match fault.downcast_ref::<FieldError>() {
            Some(FieldError::Missing { .. }) => Self::MissingField,
            Some(_) => Self::InvalidValue,
            None => Self::SupplyFailure,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where in the source a diagnostic points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiagnosticPosition {
    /// A 1-indexed line and column in the source text.
    Location {
        /// 1-indexed line number.
        line: usize,
        /// 1-indexed column number.
        column: usize,
    },
    /// A field path inside the loaded workflow.
    Path(FaultPath),
}

/// Structured load diagnostic payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadDiagnostic {
    /// Stable diagnostic code for programmatic handling.
    pub code: DiagnosticCode,
    /// Source file or source identifier.
    pub source: String,
    /// Primary position.
    pub position: DiagnosticPosition,
    /// Deterministic human-readable message.
    pub message: String,
}

impl LoadDiagnostic {
    /// Renders the diagnostic into a deterministic single-line format suitable
    /// for snapshot tests.
    #[must_use]
    pub fn render(&self) -> String {
        match &self.position {
            DiagnosticPosition::Location { line, column } => format!(
                "{} | {}:{line}:{column} | {}",
                self.code, self.source, self.message
            ),
            DiagnosticPosition::Path(path) => {
                format!("{} | {}#{path} | {}", self.code, self.source, self.message)
            }
        }
    }
}

/// Flattens a fault tree into one diagnostic per recorded fault.
///
/// Faults are visited depth-first; a container's own fault precedes the
/// faults of its children.
#[must_use]
pub fn diagnostics_for(source: &str, tree: &FaultTree) -> Vec<LoadDiagnostic> {
    tree.faults()
        .into_iter()
        .map(|(path, fault)| LoadDiagnostic {
            code: DiagnosticCode::for_fault(fault),
            source: source.to_owned(),
            position: DiagnosticPosition::Path(path),
            message: fault.to_string(),
        })
        .collect()
}

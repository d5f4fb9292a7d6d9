//! Tolerant loading of workflow documents.
//!
//! Provides [`load_workflow`], which parses a YAML string into a
//! [`WorkflowDef`]. Only a document that is not YAML at all, or whose root
//! is not a mapping, is rejected; everything below the root is read through
//! the fallible builders and every problem is reported as a diagnostic next
//! to the (possibly defaulted) workflow.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::def::WorkflowDef;
use crate::error::DefError;
use crate::fallible::{BuildMode, FaultCarrier};

use super::diagnostic::{DiagnosticCode, DiagnosticPosition, LoadDiagnostic, diagnostics_for};
use super::read;
use super::value::DocValue;

/// Synthetic source identifier used by [`load_workflow`].
const INLINE_SOURCE: &str = "<inline>";

/// How a document is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOptions {
    source: String,
    mode: BuildMode,
}

impl LoadOptions {
    /// Tolerant loading, with diagnostics attributed to `source`.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            mode: BuildMode::Tolerant,
        }
    }

    /// Switches to strict loading: the first fault aborts the load.
    #[must_use]
    pub fn strict(self) -> Self {
        self.with_mode(BuildMode::Strict)
    }

    /// Sets the build mode.
    #[must_use]
    pub fn with_mode(self, mode: BuildMode) -> Self {
        Self { mode, ..self }
    }

    /// Source identifier used in diagnostics.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Build mode handed to every builder.
    #[must_use]
    pub const fn mode(&self) -> BuildMode {
        self.mode
    }
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self::new(INLINE_SOURCE)
    }
}

/// A loaded definition and the diagnostics describing its faults.
#[derive(Debug, Clone, PartialEq)]
pub struct Loaded<T> {
    /// The definition, with defaults wherever a field could not be read.
    pub def: T,
    /// One diagnostic per recorded fault, depth first.
    pub diagnostics: Vec<LoadDiagnostic>,
}

impl<T> Loaded<T> {
    /// Returns `true` when the document loaded without any fault.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

/// Loads a workflow from a YAML string.
///
/// Malformed fields do not fail the load. They fall back to defaults and are
/// listed in [`Loaded::diagnostics`].
///
/// # Errors
///
/// Returns [`DefError::Deserialize`] if the input is not YAML or its root is
/// not a mapping.
///
/// # Examples
///
///     use workflowdef::load::load_workflow;
///
///     let yaml = r#"
///     name: demo
///     nodes:
///       node_1:
///         id: 1
///         name: CSV Reader
///         kind: NATIVENODE
///       node_2:
///         id: two
///         name: Row Filter
///         kind: NATIVENODE
///     "#;
///     let loaded = load_workflow(yaml)?;
///     assert_eq!(loaded.def.nodes().len(), 2);
///     assert_eq!(loaded.diagnostics.len(), 1);
///     # Ok::<(), workflowdef::DefError>(())
pub fn load_workflow(input: &str) -> Result<Loaded<WorkflowDef>, DefError> {
    load_workflow_with(input, &LoadOptions::default())
}

/// Loads a workflow from a YAML string with explicit options.
///
/// # Errors
///
/// Returns [`DefError::Deserialize`] when the input cannot be parsed, and
/// [`DefError::Strict`] when loading strictly and any field is faulty.
pub fn load_workflow_with(
    input: &str,
    options: &LoadOptions,
) -> Result<Loaded<WorkflowDef>, DefError> {
    let source = options.source();
    let root: DocValue = serde_saphyr::from_str(input).map_err(|error| {
        let message = error.to_string();
        let diagnostic = parse_diagnostic(source, &message, error.location());
        DefError::Deserialize {
            message,
            diagnostic: Some(diagnostic),
        }
    })?;

    let Some(entries) = root.as_mapping() else {
        let message = format!("workflow root must be a mapping, found {}", root.kind());
        let diagnostic = LoadDiagnostic {
            code: DiagnosticCode::ParseFailure,
            source: source.to_owned(),
            position: DiagnosticPosition::Location { line: 1, column: 1 },
            message: message.clone(),
        };
        return Err(DefError::Deserialize {
            message,
            diagnostic: Some(diagnostic),
        });
    };

    let def = read::workflow(entries, options.mode())?;
    let diagnostics = diagnostics_for(source, def.fault_tree());
    tracing::info!(
        source,
        nodes = def.nodes().len(),
        faults = diagnostics.len(),
        "loaded workflow"
    );
    Ok(Loaded { def, diagnostics })
}

/// Reads and loads a workflow file.
///
/// Diagnostics are attributed to the source given in `options`; use
/// `LoadOptions::new(path.as_str())` to attribute them to the file.
///
/// # Errors
///
/// Returns [`DefError::Io`] if the file cannot be read, otherwise the errors
/// of [`load_workflow_with`].
pub fn load_workflow_file(
    path: &Utf8Path,
    options: &LoadOptions,
) -> Result<Loaded<WorkflowDef>, DefError> {
    let input = read_file(path).map_err(|source| DefError::Io {
        path: path.to_string(),
        source,
    })?;
    load_workflow_with(&input, options)
}

fn read_file(path: &Utf8Path) -> std::io::Result<String> {
    let file_name = path.file_name().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::InvalidInput, "path has no file name")
    })?;
    let parent = path
        .parent()
        .filter(|dir| !dir.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}

/// Parse errors without a known location point at the document start.
fn parse_diagnostic(
    source: &str,
    message: &str,
    location: Option<serde_saphyr::Location>,
) -> LoadDiagnostic {
    let (line, column) = location.map_or((1, 1), |found| {
        (
            usize::try_from(found.line()).unwrap_or(usize::MAX),
            usize::try_from(found.column()).unwrap_or(usize::MAX),
        )
    });
    LoadDiagnostic {
        code: DiagnosticCode::ParseFailure,
        source: source.to_owned(),
        position: DiagnosticPosition::Location { line, column },
        message: first_line(message),
    }
}

fn first_line(message: &str) -> String {
    message.lines().next().unwrap_or(message).to_owned()
}

#[cfg(test)]
#[path = "loader_tests.rs"]
mod tests;

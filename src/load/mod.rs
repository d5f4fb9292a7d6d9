//! Loading workflow documents from YAML.
//!
//! Documents are deserialized with `serde-saphyr` into a generic value tree
//! and then read field by field through the tolerant builders of
//! [`def`](crate::def). A load only fails outright when the text is not a
//! YAML mapping at all (or, in strict mode, at the first faulty field).

mod diagnostic;
mod loader;
mod read;
mod value;

pub use diagnostic::{DiagnosticCode, DiagnosticPosition, LoadDiagnostic, diagnostics_for};
pub use loader::{LoadOptions, Loaded, load_workflow, load_workflow_file, load_workflow_with};
pub use value::DocValue;

//! Shared helpers for `workflowdef` integration tests.
//!
//! Fixture files live under `tests/fixtures/` of the root package; cargo runs
//! integration tests from the package root, so relative paths resolve there.

use std::io;

/// Returns the source label used when loading the named fixture.
#[must_use]
pub fn fixture_source(name: &str) -> String {
    format!("tests/fixtures/{name}")
}

/// Loads a fixture file from the `tests/fixtures/` directory.
///
/// # Panics
///
/// Panics if the file cannot be read.
#[must_use]
pub fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(fixture_source(name))
        .unwrap_or_else(|e| panic!("failed to read fixture {name}: {e}"))
}

/// A supply result that failed with `reason`.
///
/// Stands in for a field parser that could not produce a value.
///
/// # Errors
///
/// Always returns an [`io::Error`] carrying `reason`.
pub fn broken<T>(reason: &str) -> Result<T, io::Error> {
    Err(io::Error::other(reason.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broken_carries_reason() {
        let result: Result<u8, io::Error> = broken("bad digit");
        let message = result.err().map(|e| e.to_string()).unwrap_or_default();
        assert_eq!(message, "bad digit");
    }

    #[test]
    fn fixture_source_is_relative_to_package_root() {
        assert_eq!(fixture_source("a.yaml"), "tests/fixtures/a.yaml");
    }
}

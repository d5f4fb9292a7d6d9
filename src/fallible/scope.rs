//! Build modes and the per-builder scope handed to every slot.

use crate::error::DefError;

use super::fault::{Cause, Fault};
use super::key::FaultKey;

/// How a builder reacts to a field that cannot be supplied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildMode {
    /// Substitute the fallback and record a fault.
    #[default]
    Tolerant,
    /// Abort construction with [`DefError::Strict`] at the first failure.
    Strict,
}

/// The entity being built and the mode it is built in.
///
/// Slots receive the scope on every fallible call; it decides whether a
/// failure becomes a recorded [`Fault`] or a fatal error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scope {
    entity: &'static str,
    mode: BuildMode,
}

impl Scope {
    /// Creates a scope for `entity` built in `mode`.
    #[must_use]
    pub const fn new(entity: &'static str, mode: BuildMode) -> Self {
        Self { entity, mode }
    }

    /// Name of the entity being built.
    #[must_use]
    pub const fn entity(self) -> &'static str {
        self.entity
    }

    /// The build mode.
    #[must_use]
    pub const fn mode(self) -> BuildMode {
        self.mode
    }

    /// Turns a failed supply of `key` into a fault to record.
    ///
    /// # Errors
    ///
    /// Returns [`DefError::Strict`] instead when the scope is strict.
    pub fn fail(self, key: &FaultKey, cause: impl Into<Cause>) -> Result<Fault, DefError> {
        let fault = Fault::new(cause);
        match self.mode {
            BuildMode::Tolerant => {
                tracing::debug!(
                    entity = self.entity,
                    field = %key,
                    cause = %fault,
                    "field fell back to its default"
                );
                Ok(fault)
            }
            BuildMode::Strict => {
                tracing::debug!(
                    entity = self.entity,
                    field = %key,
                    cause = %fault,
                    "strict build aborted"
                );
                Err(DefError::Strict {
                    entity: self.entity,
                    key: key.clone(),
                    fault,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tolerant_scope_returns_the_fault() {
        let scope = Scope::new("BoundsDef", BuildMode::Tolerant);
        let fault = scope.fail(&FaultKey::Field("x"), "not a number");
        assert_eq!(fault.ok().map(|f| f.to_string()).as_deref(), Some("not a number"));
    }

    #[test]
    fn strict_scope_escalates() {
        let scope = Scope::new("BoundsDef", BuildMode::Strict);
        let Err(error) = scope.fail(&FaultKey::Field("x"), "not a number") else {
            panic!("strict scope should escalate");
        };
        assert_eq!(
            error.to_string(),
            "strict build of BoundsDef failed at 'x': not a number"
        );
        assert_eq!(
            error.strict_fault().map(ToString::to_string).as_deref(),
            Some("not a number")
        );
    }

    #[test]
    fn default_mode_is_tolerant() {
        assert_eq!(BuildMode::default(), BuildMode::Tolerant);
    }
}

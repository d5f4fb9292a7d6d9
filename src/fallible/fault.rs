//! A single recorded supply failure.

use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// Boxed cause accepted by every fallible setter.
///
/// Anything convertible into this type can be recorded: error types,
/// `String`, and `&str` all qualify.
pub type Cause = Box<dyn Error + Send + Sync + 'static>;

/// One failure to supply one field value.
///
/// The cause is shared behind an [`Arc`], so cloning a fault (and therefore
/// cloning a node that carries faults) never copies the underlying error.
/// Two faults are equal when their causes render the same message.
#[derive(Debug, Clone)]
pub struct Fault {
    cause: Arc<dyn Error + Send + Sync + 'static>,
}

impl Fault {
    /// Wraps `cause` into a fault.
    pub fn new(cause: impl Into<Cause>) -> Self {
        Self {
            cause: Arc::from(cause.into()),
        }
    }

    /// Returns the error that caused this fault.
    #[must_use]
    pub fn cause(&self) -> &(dyn Error + Send + Sync + 'static) {
        &*self.cause
    }

    /// Attempts to view the cause as a concrete error type.
    #[must_use]
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.cause.downcast_ref::<E>()
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.cause, f)
    }
}

impl Error for Fault {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(self.cause())
    }
}

impl PartialEq for Fault {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.cause, &other.cause) || self.to_string() == other.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FieldError;

    #[test]
    fn display_forwards_to_cause() {
        let fault = Fault::new("bad digit");
        assert_eq!(fault.to_string(), "bad digit");
    }

    #[test]
    fn source_is_the_cause() {
        let fault = Fault::new(FieldError::missing("name"));
        let source = fault.source().map(ToString::to_string);
        assert_eq!(source.as_deref(), Some("required field 'name' is missing"));
    }

    #[test]
    fn downcast_recovers_field_error() {
        let fault = Fault::new(FieldError::missing("id"));
        assert_eq!(
            fault.downcast_ref::<FieldError>(),
            Some(&FieldError::missing("id"))
        );
        assert!(fault.downcast_ref::<std::io::Error>().is_none());
    }

    #[test]
    fn faults_compare_by_message() {
        assert_eq!(Fault::new("x"), Fault::new(String::from("x")));
        assert_ne!(Fault::new("x"), Fault::new("y"));
    }

    #[test]
    fn clones_share_the_cause() {
        let fault = Fault::new("shared");
        let copy = fault.clone();
        assert!(Arc::ptr_eq(&fault.cause, &copy.cause));
    }
}

//! Identifier validation for port type ids.
//!
//! Port types are named by the fully qualified class name of their port
//! object, e.g. `org.knime.core.node.BufferedDataTable`. Each dot-separated
//! segment must match `^[A-Za-z_$][A-Za-z0-9_$]*$` and must not be a Java
//! reserved word.

use crate::error::FieldError;

/// Java reserved words and literals that cannot name a package or class.
const JAVA_RESERVED: &[&str] = &[
    "abstract", "assert", "boolean", "break", "byte", "case", "catch", "char", "class", "const",
    "continue", "default", "do", "double", "else", "enum", "extends", "final", "finally",
    "float", "for", "goto", "if", "implements", "import", "instanceof", "int", "interface",
    "long", "native", "new", "package", "private", "protected", "public", "return", "short",
    "static", "strictfp", "super", "switch", "synchronized", "this", "throw", "throws",
    "transient", "try", "void", "volatile", "while",
    // literals
    "true", "false", "null",
    // contextual
    "_",
];

/// Validates that a string is a legal port type id.
///
/// # Errors
///
/// Returns [`FieldError::InvalidIdentifier`] if the string is empty, has an
/// empty segment, a segment outside the allowed pattern, or a reserved-word
/// segment.
///
/// # Examples
///
/// ```
/// use workflowdef::def::validate_port_type_id;
///
/// assert!(validate_port_type_id("org.knime.core.node.BufferedDataTable").is_ok());
/// assert!(validate_port_type_id("org.knime.class.Port").is_err());
/// assert!(validate_port_type_id("org..Port").is_err());
/// ```
pub fn validate_port_type_id(s: &str) -> Result<(), FieldError> {
    if s.is_empty() {
        return Err(invalid(s, "identifier must not be empty"));
    }

    for segment in s.split('.') {
        if segment.is_empty() {
            return Err(invalid(s, "identifier must not contain empty segments"));
        }
        if !is_valid_segment_pattern(segment) {
            return Err(invalid(
                s,
                concat!(
                    "every segment must match the pattern ",
                    "^[A-Za-z_$][A-Za-z0-9_$]*$ ",
                    "(ASCII letters, digits, underscores and dollar signs; ",
                    "must not start with a digit)"
                ),
            ));
        }
        if is_java_reserved(segment) {
            return Err(FieldError::InvalidIdentifier {
                identifier: s.to_owned(),
                reason: format!("segment '{segment}' is a Java reserved word"),
            });
        }
    }

    Ok(())
}

fn invalid(identifier: &str, reason: &str) -> FieldError {
    FieldError::InvalidIdentifier {
        identifier: identifier.to_owned(),
        reason: reason.to_owned(),
    }
}

/// Returns `true` if the segment matches `^[A-Za-z_$][A-Za-z0-9_$]*$`.
fn is_valid_segment_pattern(segment: &str) -> bool {
    let mut chars = segment.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() && first != '_' && first != '$' {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

fn is_java_reserved(segment: &str) -> bool {
    JAVA_RESERVED.contains(&segment)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::table("org.knime.core.node.BufferedDataTable")]
    #[case::flow_variable("org.knime.core.node.port.flowvariable.FlowVariablePortObject")]
    #[case::inner_class("org.knime.ext.Port$Spec")]
    #[case::single_segment("Table")]
    #[case::underscore_prefix("_internal.Port")]
    fn valid_port_type_ids_pass(#[case] id: &str) {
        assert!(validate_port_type_id(id).is_ok());
    }

    #[rstest]
    #[case::empty("", "must not be empty")]
    #[case::leading_dot(".Port", "empty segments")]
    #[case::trailing_dot("org.", "empty segments")]
    #[case::double_dot("org..Port", "empty segments")]
    #[case::digit_start("org.1st.Port", "must match the pattern")]
    #[case::hyphen("org.my-port.Port", "must match the pattern")]
    #[case::space("org.my port", "must match the pattern")]
    #[case::keyword("org.class.Port", "'class' is a Java reserved word")]
    #[case::literal("null", "'null' is a Java reserved word")]
    #[case::boolean_literal("org.true.Port", "'true' is a Java reserved word")]
    #[case::contextual("org._.Port", "'_' is a Java reserved word")]
    fn invalid_port_type_ids_fail(#[case] id: &str, #[case] fragment: &str) {
        let message = validate_port_type_id(id)
            .err()
            .map(|e| e.to_string())
            .unwrap_or_default();
        assert!(message.contains(fragment), "got: {message}");
    }

    #[test]
    fn keyword_lookalikes_pass() {
        assert!(validate_port_type_id("org.classes.Interfaces").is_ok());
    }
}

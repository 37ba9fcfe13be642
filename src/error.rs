//! Construction and lookup errors
//!
//! These are returned to the caller. Problems found while evaluating rules
//! are not errors; they are recorded as [`crate::diagnostics::Diagnostic`]s.

use thiserror::Error;

use crate::rule::RuleKind;

/// A field, group or rule declaration that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// Field selector did not resolve to an input
    #[error("field with {selector} selector not found, check the field selector")]
    FieldNotFound {
        /// Selector as given
        selector: String,
    },

    /// Group selector did not resolve to a container
    #[error("group with {selector} selector not found, check the group selector")]
    GroupNotFound {
        /// Selector as given
        selector: String,
    },

    /// Field declared without rules
    #[error("rules for the field [{field}] should contain at least 1 element")]
    EmptyRules {
        /// Field selector
        field: String,
    },

    /// Rule declared with neither a catalog rule nor a validator
    #[error("rules for the field [{field}] must contain a rule or a validator")]
    MissingRule {
        /// Field selector
        field: String,
    },

    /// Rule declared with both a catalog rule and a validator
    #[error("rule {rule} for the field [{field}] must not also carry a validator")]
    AmbiguousRule {
        /// Field selector
        field: String,
        /// Catalog rule that was also given
        rule: RuleKind,
    },

    /// Rule identifier outside the catalog
    #[error("rule should be one of the catalog rules, provided value: {provided}")]
    UnknownRule {
        /// Identifier as given
        provided: String,
    },

    /// Group members are not all radios or all checkboxes
    #[error("group {group} should contain either checkboxes or radio buttons")]
    MixedGroup {
        /// Group selector
        group: String,
    },
}

/// An engine operation referred to something that is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// No field with this name
    #[error("field [{0}] is not registered")]
    UnknownField(String),

    /// No group with this name
    #[error("group [{0}] is not registered")]
    UnknownGroup(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_the_selector() {
        let err = ConfigError::FieldNotFound {
            selector: "#email".into(),
        };
        assert_eq!(
            err.to_string(),
            "field with #email selector not found, check the field selector"
        );

        let err = ConfigError::AmbiguousRule {
            field: "#name".into(),
            rule: RuleKind::MaxLength,
        };
        assert!(err.to_string().contains("maxLength"));
    }

    #[test]
    fn test_engine_error_display() {
        assert_eq!(
            EngineError::UnknownGroup("#g".into()).to_string(),
            "group [#g] is not registered"
        );
    }
}

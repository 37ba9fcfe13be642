//! Developer-facing diagnostics
//!
//! Misconfigured rules and misbehaving validators are reported here instead of
//! failing the pass. Each diagnostic is kept in the engine's [`Diagnostics`] log
//! and, with the `tracing` feature, emitted as a `warn` or `error` event.

use thiserror::Error;

use crate::rule::RuleKind;

/// How serious a diagnostic is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Behaviour is coerced but the field still validates
    Warning,
    /// The affected field is forced invalid
    Error,
}

/// A problem in how the engine was configured or used.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Diagnostic {
    /// Parameterised rule declared without its parameter
    #[error("value for {rule} rule for [{field}] field is not defined, the field will be always invalid")]
    MissingRuleValue {
        /// Field name
        field: String,
        /// Rule missing its parameter
        rule: RuleKind,
    },

    /// Parameter of the wrong shape
    #[error("value for {rule} rule for [{field}] field should be {expected}, the field will be always invalid")]
    InvalidRuleValue {
        /// Field name
        field: String,
        /// Offending rule
        rule: RuleKind,
        /// What the parameter should have been
        expected: &'static str,
    },

    /// Pattern source did not compile
    #[error("value for customRegexp rule for [{field}] field should be a valid regexp ({reason}), the field will be always invalid")]
    InvalidPattern {
        /// Field name
        field: String,
        /// Compiler message
        reason: String,
    },

    /// Custom rule without a validator
    #[error("validator for custom rule for [{field}] field is not defined, the field will be always invalid")]
    MissingValidator {
        /// Field name
        field: String,
    },

    /// Custom validator returned neither a boolean nor a deferred producer
    #[error("validator return value for [{field}] field should be boolean or function, it will be cast to boolean")]
    NonBooleanReturn {
        /// Field name
        field: String,
    },

    /// Deferred producer did not start a check
    #[error("validator function for custom rule for [{field}] field should return a deferred result, the field will be always invalid")]
    NotDeferred {
        /// Field name
        field: String,
    },

    /// Deferred check failed instead of answering
    #[error("deferred validator for [{field}] field failed: {reason}")]
    DeferredRejected {
        /// Field name
        field: String,
        /// Failure message
        reason: String,
    },

    /// Removal of a field that is not registered
    #[error("field {field} not found, check the field selector")]
    UnknownFieldRemoval {
        /// Selector as given
        field: String,
    },
}

impl Diagnostic {
    /// Severity of this diagnostic.
    pub fn severity(&self) -> Severity {
        match self {
            Diagnostic::NonBooleanReturn { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Field the diagnostic is about.
    pub fn field(&self) -> &str {
        match self {
            Diagnostic::MissingRuleValue { field, .. }
            | Diagnostic::InvalidRuleValue { field, .. }
            | Diagnostic::InvalidPattern { field, .. }
            | Diagnostic::MissingValidator { field }
            | Diagnostic::NonBooleanReturn { field }
            | Diagnostic::NotDeferred { field }
            | Diagnostic::DeferredRejected { field, .. }
            | Diagnostic::UnknownFieldRemoval { field } => field,
        }
    }
}

/// Append-only log of diagnostics owned by an engine.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a diagnostic and emit it on the logging channel.
    pub fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity() {
            Severity::Warning => {
                log_warn!(field = diagnostic.field(), "{}", diagnostic);
            }
            Severity::Error => {
                log_error!(field = diagnostic.field(), "{}", diagnostic);
            }
        }
        self.entries.push(diagnostic);
    }

    /// Recorded diagnostics, oldest first.
    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    /// Number of recorded diagnostics.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drain the log.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.entries)
    }

    pub(crate) fn extend(&mut self, diagnostics: impl IntoIterator<Item = Diagnostic>) {
        for diagnostic in diagnostics {
            self.report(diagnostic);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_keeps_order_and_take_drains() {
        let mut log = Diagnostics::new();
        log.report(Diagnostic::NotDeferred { field: "#a".into() });
        log.report(Diagnostic::NonBooleanReturn { field: "#b".into() });

        assert_eq!(log.len(), 2);
        assert_eq!(log.entries()[0].field(), "#a");
        assert_eq!(log.entries()[1].severity(), Severity::Warning);

        let drained = log.take();
        assert_eq!(drained.len(), 2);
        assert!(log.is_empty());
    }

    #[test]
    fn test_missing_value_message() {
        let d = Diagnostic::MissingRuleValue {
            field: "#name".into(),
            rule: RuleKind::MaxLength,
        };
        assert_eq!(
            d.to_string(),
            "value for maxLength rule for [#name] field is not defined, the field will be always invalid"
        );
        assert_eq!(d.severity(), Severity::Error);
    }

    #[cfg(feature = "tracing")]
    mod logging {
        use super::*;
        use tracing_test::traced_test;

        #[test]
        #[traced_test]
        fn test_errors_are_logged() {
            let mut log = Diagnostics::new();
            log.report(Diagnostic::InvalidPattern {
                field: "#zip".into(),
                reason: "unclosed group".into(),
            });
            assert!(logs_contain("should be a valid regexp"));
        }
    }
}

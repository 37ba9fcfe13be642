//! Rule evaluation
//!
//! [`CompiledRule`] turns a loosely declared catalog rule into a closed,
//! typed variant, reporting a [`Diagnostic`] when the parameter is missing or
//! of the wrong shape. [`Evaluator`] runs compiled rules and custom validators
//! against one field value and yields a [`Verdict`].
//!
//! Evaluation never fails: configuration problems and misbehaving validators
//! produce an invalid verdict plus a diagnostic.
//!
//! # Example
//!
//! ```
//! use formguard::evaluator::Evaluator;
//! use formguard::rule::FieldRule;
//! use formguard::snapshot::FieldsSnapshot;
//! use formguard::value::FieldValue;
//! use formguard::verdict::PassMode;
//!
//! let fields = FieldsSnapshot::new();
//! let mut eval = Evaluator::new("#name", &fields, PassMode::Full);
//!
//! let value = FieldValue::text("abcdef");
//! assert_eq!(eval.evaluate(&FieldRule::max_length(5), &value).immediate(), Some(false));
//! assert_eq!(eval.evaluate(&FieldRule::max_length(6), &value).immediate(), Some(true));
//! assert!(eval.into_diagnostics().is_empty());
//! ```

use regex::Regex;

use crate::catalog::{
    at_least, at_most, email, file_count_at_least, file_count_at_most, len_at_least, len_at_most,
    matches, numeric, parse_number, password, present, satisfies, strong_password, Predicate,
};
use crate::diagnostics::Diagnostic;
use crate::input::InputRef;
use crate::rule::{
    FieldRule, FileConstraints, GroupRule, GroupRuleKind, RuleKind, RuleValue, Validator,
    ValidatorReturn,
};
use crate::snapshot::FieldsSnapshot;
use crate::value::{FieldValue, FileInfo};
use crate::verdict::{PassMode, Verdict};

/// A catalog rule with its parameter checked and typed.
#[derive(Debug, Clone)]
pub enum CompiledRule {
    /// See [`RuleKind::Required`]
    Required,
    /// See [`RuleKind::Email`]
    Email,
    /// See [`RuleKind::MinLength`]
    MinLength(f64),
    /// See [`RuleKind::MaxLength`]
    MaxLength(f64),
    /// See [`RuleKind::Password`]
    Password,
    /// See [`RuleKind::StrongPassword`]
    StrongPassword,
    /// See [`RuleKind::Number`]
    Number,
    /// See [`RuleKind::MinNumber`]
    MinNumber(f64),
    /// See [`RuleKind::MaxNumber`]
    MaxNumber(f64),
    /// See [`RuleKind::CustomRegexp`]
    Pattern(Regex),
    /// See [`RuleKind::MinFilesCount`]
    MinFilesCount(f64),
    /// See [`RuleKind::MaxFilesCount`]
    MaxFilesCount(f64),
    /// See [`RuleKind::Files`]
    Files(FileConstraints),
}

impl CompiledRule {
    /// Validate the declared parameter of `kind` and build the typed rule.
    pub fn compile(
        field: &str,
        kind: RuleKind,
        value: Option<&RuleValue>,
    ) -> Result<Self, Diagnostic> {
        let param = Param { field, kind, value };

        Ok(match kind {
            RuleKind::Required => CompiledRule::Required,
            RuleKind::Email => CompiledRule::Email,
            RuleKind::Password => CompiledRule::Password,
            RuleKind::StrongPassword => CompiledRule::StrongPassword,
            RuleKind::Number => CompiledRule::Number,
            RuleKind::MinLength => CompiledRule::MinLength(param.positive()?),
            RuleKind::MaxLength => CompiledRule::MaxLength(param.positive()?),
            RuleKind::MinFilesCount => CompiledRule::MinFilesCount(param.number()?),
            RuleKind::MaxFilesCount => CompiledRule::MaxFilesCount(param.number()?),
            RuleKind::MinNumber => CompiledRule::MinNumber(param.number()?),
            RuleKind::MaxNumber => CompiledRule::MaxNumber(param.number()?),
            RuleKind::CustomRegexp => CompiledRule::Pattern(param.pattern()?),
            RuleKind::Files => CompiledRule::Files(param.files()?),
        })
    }

    /// Run the rule against a field value.
    pub fn check(&self, value: &FieldValue) -> bool {
        match self {
            CompiledRule::Required => present().check(value),
            CompiledRule::Email => value.as_text().is_some_and(|text| email().check(text)),
            CompiledRule::MinLength(min) => non_empty_text(value, |t| len_at_least(*min).check(t)),
            CompiledRule::MaxLength(max) => non_empty_text(value, |t| len_at_most(*max).check(t)),
            CompiledRule::Password => non_empty_text(value, |t| password().check(t)),
            CompiledRule::StrongPassword => non_empty_text(value, |t| strong_password().check(t)),
            CompiledRule::Number => non_empty_text(value, |t| numeric().check(t)),
            CompiledRule::MinNumber(min) => non_empty_text(value, |t| {
                parse_number(t).is_some_and(|n| at_least(*min).check(&n))
            }),
            CompiledRule::MaxNumber(max) => non_empty_text(value, |t| {
                parse_number(t).is_some_and(|n| at_most(*max).check(&n))
            }),
            CompiledRule::Pattern(re) => matches(re.clone()).check(value.coerce_to_string().as_str()),
            CompiledRule::MinFilesCount(min) => {
                file_list(value, |files| file_count_at_least(*min).check(files))
            }
            CompiledRule::MaxFilesCount(max) => {
                file_list(value, |files| file_count_at_most(*max).check(files))
            }
            CompiledRule::Files(constraints) => {
                file_list(value, |files| satisfies(constraints).check(files))
            }
        }
    }
}

// Text rules skip the empty string and reject every other shape.
fn non_empty_text(value: &FieldValue, check: impl FnOnce(&str) -> bool) -> bool {
    match value.as_text() {
        Some("") => true,
        Some(text) => check(text),
        None => false,
    }
}

// File rules only look at file lists.
fn file_list(value: &FieldValue, check: impl FnOnce(&[FileInfo]) -> bool) -> bool {
    value.as_files().map_or(true, check)
}

struct Param<'a> {
    field: &'a str,
    kind: RuleKind,
    value: Option<&'a RuleValue>,
}

impl<'a> Param<'a> {
    fn defined(&self) -> Result<&'a RuleValue, Diagnostic> {
        self.value
            .filter(|value| !value.is_unset())
            .ok_or_else(|| Diagnostic::MissingRuleValue {
                field: self.field.to_string(),
                rule: self.kind,
            })
    }

    fn invalid(&self, expected: &'static str) -> Diagnostic {
        Diagnostic::InvalidRuleValue {
            field: self.field.to_string(),
            rule: self.kind,
            expected,
        }
    }

    fn number(&self) -> Result<f64, Diagnostic> {
        match self.defined()? {
            RuleValue::Number(n) => Ok(*n),
            _ => Err(self.invalid("a number")),
        }
    }

    fn positive(&self) -> Result<f64, Diagnostic> {
        match self.number() {
            Ok(n) if n > 0.0 => Ok(n),
            Ok(_) => Err(self.invalid("a positive number")),
            Err(Diagnostic::InvalidRuleValue { .. }) => Err(self.invalid("a positive number")),
            Err(missing) => Err(missing),
        }
    }

    fn pattern(&self) -> Result<Regex, Diagnostic> {
        let source = match self.defined()? {
            RuleValue::Pattern(re) => return Ok(re.clone()),
            RuleValue::Text(source) => source.clone(),
            number @ RuleValue::Number(_) => number.to_string(),
            RuleValue::Files(_) => return Err(self.invalid("a regexp")),
        };

        Regex::new(&source).map_err(|err| Diagnostic::InvalidPattern {
            field: self.field.to_string(),
            reason: err.to_string(),
        })
    }

    fn files(&self) -> Result<FileConstraints, Diagnostic> {
        match self.defined()? {
            RuleValue::Files(rule) => rule
                .files
                .clone()
                .ok_or_else(|| self.invalid("an object with files property")),
            _ => Err(self.invalid("an object")),
        }
    }
}

/// Evaluates rules of one field during one pass.
///
/// Diagnostics raised while evaluating are collected and handed back through
/// [`Evaluator::into_diagnostics`]; nothing is logged here.
#[derive(Debug)]
pub struct Evaluator<'a> {
    field: &'a str,
    fields: &'a FieldsSnapshot,
    mode: PassMode,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> Evaluator<'a> {
    /// Evaluator for `field`, with validators seeing `fields`.
    pub fn new(field: &'a str, fields: &'a FieldsSnapshot, mode: PassMode) -> Self {
        Self {
            field,
            fields,
            mode,
            diagnostics: Vec::new(),
        }
    }

    /// Evaluate one rule against `value`.
    pub fn evaluate(&mut self, rule: &FieldRule, value: &FieldValue) -> Verdict {
        match (rule.rule, &rule.validator) {
            (Some(kind), _) => match CompiledRule::compile(self.field, kind, rule.value.as_ref()) {
                Ok(compiled) => Verdict::Immediate(compiled.check(value)),
                Err(diagnostic) => self.fail(diagnostic),
            },
            (None, Some(validator)) => self.evaluate_custom(validator, value),
            (None, None) => self.fail(Diagnostic::MissingValidator {
                field: self.field.to_string(),
            }),
        }
    }

    fn evaluate_custom(&mut self, validator: &Validator, value: &FieldValue) -> Verdict {
        match validator(value, self.fields) {
            ValidatorReturn::Bool(ok) => Verdict::Immediate(ok),
            ValidatorReturn::Other(other) => {
                self.diagnostics.push(Diagnostic::NonBooleanReturn {
                    field: self.field.to_string(),
                });
                Verdict::Immediate(other.is_truthy())
            }
            ValidatorReturn::Deferred(_) if !self.mode.runs_deferred() => Verdict::valid(),
            ValidatorReturn::Deferred(producer) => match producer() {
                Some(check) => Verdict::Deferred(check),
                None => self.fail(Diagnostic::NotDeferred {
                    field: self.field.to_string(),
                }),
            },
        }
    }

    fn fail(&mut self, diagnostic: Diagnostic) -> Verdict {
        self.diagnostics.push(diagnostic);
        Verdict::invalid()
    }

    /// Diagnostics raised so far.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Consume the evaluator, returning its diagnostics.
    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }
}

/// Evaluate a group rule over the group's members.
pub fn check_group(rule: &GroupRule, members: &[InputRef]) -> bool {
    match rule.kind() {
        GroupRuleKind::Required => members
            .iter()
            .any(|member| matches!(member.value(), FieldValue::Bool(true))),
    }
}

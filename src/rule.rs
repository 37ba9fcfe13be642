//! Declarative field and group rules
//!
//! A [`FieldRule`] is either one of the catalog rules identified by a
//! [`RuleKind`] (optionally parameterised by a [`RuleValue`]) or a custom
//! [`Validator`]. Rules are immutable once attached to a field.
//!
//! Parameters are loosely typed, like a declarative configuration: a
//! `MaxLength` rule may be declared without a number or with a string. Such
//! declarations are accepted at construction and surface at evaluation time
//! as a diagnostic plus a permanently invalid field.
//!
//! # Examples
//!
//! ```
//! use formguard::rule::{FieldRule, RuleKind};
//!
//! let rules = vec![
//!     FieldRule::required(),
//!     FieldRule::max_length(20).with_message("Too long"),
//!     FieldRule::custom(|value, _fields| value.as_text() != Some("admin")),
//! ];
//!
//! assert_eq!(rules[1].kind(), Some(RuleKind::MaxLength));
//! assert!(rules[2].kind().is_none());
//! ```

use std::fmt;
use std::future::Future;
use std::str::FromStr;
use std::sync::Arc;

use futures::FutureExt;
use regex::Regex;

use crate::error::ConfigError;
use crate::snapshot::FieldsSnapshot;
use crate::value::FieldValue;
use crate::verdict::{DeferredCheck, ValidatorError};

/// Identifier of a catalog rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum RuleKind {
    /// Value must be present
    Required,
    /// Value must look like an email address
    Email,
    /// Text must have at least N characters
    MinLength,
    /// Text must have at most N characters
    MaxLength,
    /// Letters and digits, at least eight
    Password,
    /// Mixed case, digit and special character, at least eight
    StrongPassword,
    /// Text must parse as a number
    Number,
    /// Number must be at most N
    MaxNumber,
    /// Number must be at least N
    MinNumber,
    /// Text must match a pattern
    CustomRegexp,
    /// At least N files selected
    MinFilesCount,
    /// At most N files selected
    MaxFilesCount,
    /// Every file must satisfy the file constraints
    Files,
}

impl RuleKind {
    /// Every catalog rule, in declaration order.
    pub const ALL: [RuleKind; 13] = [
        RuleKind::Required,
        RuleKind::Email,
        RuleKind::MinLength,
        RuleKind::MaxLength,
        RuleKind::Password,
        RuleKind::Number,
        RuleKind::MaxNumber,
        RuleKind::MinNumber,
        RuleKind::StrongPassword,
        RuleKind::CustomRegexp,
        RuleKind::MinFilesCount,
        RuleKind::MaxFilesCount,
        RuleKind::Files,
    ];

    /// Stable identifier used in declarations and messages.
    pub fn as_str(self) -> &'static str {
        match self {
            RuleKind::Required => "required",
            RuleKind::Email => "email",
            RuleKind::MinLength => "minLength",
            RuleKind::MaxLength => "maxLength",
            RuleKind::Password => "password",
            RuleKind::StrongPassword => "strongPassword",
            RuleKind::Number => "number",
            RuleKind::MaxNumber => "maxNumber",
            RuleKind::MinNumber => "minNumber",
            RuleKind::CustomRegexp => "customRegexp",
            RuleKind::MinFilesCount => "minFilesCount",
            RuleKind::MaxFilesCount => "maxFilesCount",
            RuleKind::Files => "files",
        }
    }
}

impl fmt::Display for RuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleKind {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ConfigError::UnknownRule {
                provided: s.to_string(),
            })
    }
}

/// Constraints checked against every selected file.
///
/// Unset constraints are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FileConstraints {
    /// Allowed extensions, without the dot
    pub extensions: Option<Vec<String>>,
    /// Allowed MIME types
    pub types: Option<Vec<String>>,
    /// Minimum size in bytes
    pub min_size: Option<u64>,
    /// Maximum size in bytes
    pub max_size: Option<u64>,
    /// Allowed exact file names
    pub names: Option<Vec<String>>,
}

impl FileConstraints {
    /// Start with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict extensions.
    pub fn extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = Some(extensions.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict MIME types.
    pub fn types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Restrict exact file names.
    pub fn names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.names = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Minimum size in bytes.
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.min_size = Some(bytes);
        self
    }

    /// Maximum size in bytes.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self
    }
}

/// Parameter object of the `Files` rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FilesRuleValue {
    /// Per-file constraints; required for the rule to be usable
    pub files: Option<FileConstraints>,
}

/// Loosely typed rule parameter.
#[derive(Debug, Clone)]
pub enum RuleValue {
    /// Numeric bound
    Number(f64),
    /// Text, used as pattern source by `CustomRegexp`
    Text(String),
    /// Pre-compiled pattern
    Pattern(Regex),
    /// File constraint object
    Files(FilesRuleValue),
}

impl RuleValue {
    /// Whether the parameter counts as "not defined".
    ///
    /// Zero, NaN and empty text are treated the same as a missing parameter.
    pub fn is_unset(&self) -> bool {
        match self {
            RuleValue::Number(n) => *n == 0.0 || n.is_nan(),
            RuleValue::Text(s) => s.is_empty(),
            RuleValue::Pattern(_) | RuleValue::Files(_) => false,
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", *n as i64)
            }
            RuleValue::Number(n) => write!(f, "{}", n),
            RuleValue::Text(s) => f.write_str(s),
            RuleValue::Pattern(re) => f.write_str(re.as_str()),
            RuleValue::Files(_) => f.write_str("[object Object]"),
        }
    }
}

impl From<f64> for RuleValue {
    fn from(value: f64) -> Self {
        RuleValue::Number(value)
    }
}

impl From<i64> for RuleValue {
    fn from(value: i64) -> Self {
        RuleValue::Number(value as f64)
    }
}

impl From<usize> for RuleValue {
    fn from(value: usize) -> Self {
        RuleValue::Number(value as f64)
    }
}

impl From<&str> for RuleValue {
    fn from(value: &str) -> Self {
        RuleValue::Text(value.to_string())
    }
}

impl From<String> for RuleValue {
    fn from(value: String) -> Self {
        RuleValue::Text(value)
    }
}

impl From<Regex> for RuleValue {
    fn from(value: Regex) -> Self {
        RuleValue::Pattern(value)
    }
}

impl From<FilesRuleValue> for RuleValue {
    fn from(value: FilesRuleValue) -> Self {
        RuleValue::Files(value)
    }
}

impl From<FileConstraints> for RuleValue {
    fn from(value: FileConstraints) -> Self {
        RuleValue::Files(FilesRuleValue { files: Some(value) })
    }
}

/// Zero-argument producer of a deferred check.
///
/// Returning `None` signals that the producer could not start a check; the
/// field is then permanently invalid for the pass.
pub type DeferredProducer = Box<dyn FnOnce() -> Option<DeferredCheck> + Send>;

/// What a custom validator returns.
pub enum ValidatorReturn {
    /// Immediate answer
    Bool(bool),
    /// Answer produced later; only started on full validation passes
    Deferred(DeferredProducer),
    /// Anything else; coerced by truthiness with a warning
    Other(FieldValue),
}

impl ValidatorReturn {
    /// Wrap an async check.
    ///
    /// ```
    /// use formguard::rule::ValidatorReturn;
    ///
    /// let ret = ValidatorReturn::deferred(|| async { Ok(true) });
    /// assert!(matches!(ret, ValidatorReturn::Deferred(_)));
    /// ```
    pub fn deferred<F, Fut>(producer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<bool, ValidatorError>> + Send + 'static,
    {
        ValidatorReturn::Deferred(Box::new(move || Some(producer().boxed())))
    }

    /// Wrap a raw producer that may fail to start a check.
    pub fn from_producer<F>(producer: F) -> Self
    where
        F: FnOnce() -> Option<DeferredCheck> + Send + 'static,
    {
        ValidatorReturn::Deferred(Box::new(producer))
    }
}

impl From<bool> for ValidatorReturn {
    fn from(value: bool) -> Self {
        ValidatorReturn::Bool(value)
    }
}

impl From<FieldValue> for ValidatorReturn {
    fn from(value: FieldValue) -> Self {
        ValidatorReturn::Other(value)
    }
}

impl fmt::Debug for ValidatorReturn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidatorReturn::Bool(b) => f.debug_tuple("Bool").field(b).finish(),
            ValidatorReturn::Deferred(_) => f.write_str("Deferred(..)"),
            ValidatorReturn::Other(v) => f.debug_tuple("Other").field(v).finish(),
        }
    }
}

/// User-supplied predicate over the field value and a snapshot of all fields.
pub type Validator = Arc<dyn Fn(&FieldValue, &FieldsSnapshot) -> ValidatorReturn + Send + Sync>;

/// One constraint attached to a field.
#[derive(Clone, Default)]
pub struct FieldRule {
    pub(crate) rule: Option<RuleKind>,
    pub(crate) value: Option<RuleValue>,
    pub(crate) validator: Option<Validator>,
    pub(crate) error_message: Option<String>,
}

impl FieldRule {
    /// Catalog rule without a parameter.
    pub fn new(rule: RuleKind) -> Self {
        Self {
            rule: Some(rule),
            ..Self::default()
        }
    }

    /// Custom rule backed by a validator.
    pub fn custom<F, R>(validator: F) -> Self
    where
        F: Fn(&FieldValue, &FieldsSnapshot) -> R + Send + Sync + 'static,
        R: Into<ValidatorReturn>,
    {
        Self::default().with_validator(validator)
    }

    /// Custom rule whose validator answers asynchronously.
    ///
    /// The future is built from the value and snapshot at call time and only
    /// awaited on full validation passes.
    pub fn custom_async<F, Fut>(validator: F) -> Self
    where
        F: Fn(&FieldValue, &FieldsSnapshot) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<bool, ValidatorError>> + Send + 'static,
    {
        Self::custom(move |value: &FieldValue, fields: &FieldsSnapshot| {
            let fut = validator(value, fields);
            ValidatorReturn::deferred(move || fut)
        })
    }

    /// Set the rule parameter.
    pub fn with_value(mut self, value: impl Into<RuleValue>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Set an explicit error message (also the locale lookup key).
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = Some(message.into());
        self
    }

    /// Attach a validator.
    pub fn with_validator<F, R>(mut self, validator: F) -> Self
    where
        F: Fn(&FieldValue, &FieldsSnapshot) -> R + Send + Sync + 'static,
        R: Into<ValidatorReturn>,
    {
        self.validator = Some(Arc::new(move |value: &FieldValue, fields: &FieldsSnapshot| {
            validator(value, fields).into()
        }));
        self
    }

    /// `Required` rule.
    pub fn required() -> Self {
        Self::new(RuleKind::Required)
    }

    /// `Email` rule.
    pub fn email() -> Self {
        Self::new(RuleKind::Email)
    }

    /// `MinLength` rule.
    pub fn min_length(len: usize) -> Self {
        Self::new(RuleKind::MinLength).with_value(len)
    }

    /// `MaxLength` rule.
    pub fn max_length(len: usize) -> Self {
        Self::new(RuleKind::MaxLength).with_value(len)
    }

    /// `Password` rule.
    pub fn password() -> Self {
        Self::new(RuleKind::Password)
    }

    /// `StrongPassword` rule.
    pub fn strong_password() -> Self {
        Self::new(RuleKind::StrongPassword)
    }

    /// `Number` rule.
    pub fn number() -> Self {
        Self::new(RuleKind::Number)
    }

    /// `MinNumber` rule.
    pub fn min_number(min: f64) -> Self {
        Self::new(RuleKind::MinNumber).with_value(min)
    }

    /// `MaxNumber` rule.
    pub fn max_number(max: f64) -> Self {
        Self::new(RuleKind::MaxNumber).with_value(max)
    }

    /// `CustomRegexp` rule from pattern source.
    pub fn custom_regexp(pattern: impl Into<String>) -> Self {
        Self::new(RuleKind::CustomRegexp).with_value(pattern.into())
    }

    /// `MinFilesCount` rule.
    pub fn min_files_count(count: usize) -> Self {
        Self::new(RuleKind::MinFilesCount).with_value(count)
    }

    /// `MaxFilesCount` rule.
    pub fn max_files_count(count: usize) -> Self {
        Self::new(RuleKind::MaxFilesCount).with_value(count)
    }

    /// `Files` rule.
    pub fn files(constraints: FileConstraints) -> Self {
        Self::new(RuleKind::Files).with_value(constraints)
    }

    /// Catalog rule identifier, `None` for custom rules.
    pub fn kind(&self) -> Option<RuleKind> {
        self.rule
    }

    /// Rule parameter.
    pub fn value(&self) -> Option<&RuleValue> {
        self.value.as_ref()
    }

    /// Explicit error message.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Whether a validator is attached.
    pub fn has_validator(&self) -> bool {
        self.validator.is_some()
    }

    /// Check the "exactly one of rule or validator" invariant.
    pub(crate) fn check_shape(&self, field: &str) -> Result<(), ConfigError> {
        match (self.rule, self.validator.is_some()) {
            (Some(_), false) | (None, true) => Ok(()),
            (None, false) => Err(ConfigError::MissingRule {
                field: field.to_string(),
            }),
            (Some(rule), true) => Err(ConfigError::AmbiguousRule {
                field: field.to_string(),
                rule,
            }),
        }
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRule")
            .field("rule", &self.rule)
            .field("value", &self.value)
            .field("validator", &self.validator.as_ref().map(|_| ".."))
            .field("error_message", &self.error_message)
            .finish()
    }
}

/// Rule kinds available to groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GroupRuleKind {
    /// At least one member must be checked
    Required,
}

/// One constraint attached to a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRule {
    pub(crate) rule: GroupRuleKind,
    pub(crate) error_message: Option<String>,
}

impl GroupRule {
    /// Required-one-of rule.
    pub fn required(error_message: Option<String>) -> Self {
        Self {
            rule: GroupRuleKind::Required,
            error_message,
        }
    }

    /// Rule identifier.
    pub fn kind(&self) -> GroupRuleKind {
        self.rule
    }

    /// Explicit error message.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_kind_round_trips_through_identifier() {
        for kind in RuleKind::ALL {
            assert_eq!(kind.as_str().parse::<RuleKind>().ok(), Some(kind));
        }
    }

    #[test]
    fn test_unknown_rule_identifier() {
        let err = "maxSize".parse::<RuleKind>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownRule { ref provided } if provided == "maxSize"));
    }

    #[test]
    fn test_shape_requires_exactly_one_of_rule_or_validator() {
        assert!(FieldRule::required().check_shape("#a").is_ok());
        assert!(FieldRule::custom(|_, _| true).check_shape("#a").is_ok());
        assert!(matches!(
            FieldRule::default().check_shape("#a"),
            Err(ConfigError::MissingRule { .. })
        ));
        assert!(matches!(
            FieldRule::required().with_validator(|_, _| true).check_shape("#a"),
            Err(ConfigError::AmbiguousRule { .. })
        ));
    }

    #[test]
    fn test_rule_value_display_prints_whole_numbers_as_integers() {
        assert_eq!(RuleValue::from(10usize).to_string(), "10");
        assert_eq!(RuleValue::from(2.5).to_string(), "2.5");
        assert_eq!(RuleValue::from("^a$").to_string(), "^a$");
    }

    #[test]
    fn test_unset_values() {
        assert!(RuleValue::Number(0.0).is_unset());
        assert!(RuleValue::Text(String::new()).is_unset());
        assert!(!RuleValue::Number(-1.0).is_unset());
        assert!(!RuleValue::from(FileConstraints::new()).is_unset());
    }
}

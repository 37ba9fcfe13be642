//! Message resolution
//!
//! The message shown for a failing rule is, in order of preference:
//!
//! 1. the rule's explicit message, localised through the locale table when a
//!    current locale is set and the table has a translation for it;
//! 2. the explicit message verbatim;
//! 3. the built-in default for the rule kind, with its parameter interpolated.
//!
//! Locale entries are looked up by the literal explicit message, not by rule.
//!
//! # Example
//!
//! ```
//! use formguard::message::{LocaleEntry, MessageResolver};
//! use formguard::rule::FieldRule;
//!
//! let mut resolver = MessageResolver::new(vec![
//!     LocaleEntry::new("Name is required").with("fr", "Le nom est requis"),
//! ]);
//!
//! let rule = FieldRule::required().with_message("Name is required");
//! assert_eq!(resolver.field_message(&rule), "Name is required");
//!
//! resolver.set_locale(Some("fr".to_string()));
//! assert_eq!(resolver.field_message(&rule), "Le nom est requis");
//!
//! assert_eq!(
//!     resolver.field_message(&FieldRule::max_length(5)),
//!     "The field must contain a maximum of 5 characters"
//! );
//! ```

use std::collections::HashMap;

use crate::rule::{FieldRule, GroupRule, GroupRuleKind, RuleKind, RuleValue};

/// Translations of one message key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocaleEntry {
    /// The explicit message being translated
    pub key: String,
    /// Locale code to translated text
    pub dict: HashMap<String, String>,
}

impl LocaleEntry {
    /// Entry with no translations yet.
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dict: HashMap::new(),
        }
    }

    /// Add a translation.
    pub fn with(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.dict.insert(locale.into(), text.into());
        self
    }
}

/// Resolves user-facing messages for failing rules.
#[derive(Debug, Clone, Default)]
pub struct MessageResolver {
    table: Vec<LocaleEntry>,
    current: Option<String>,
}

impl MessageResolver {
    /// Resolver over a locale table, with no current locale.
    pub fn new(table: Vec<LocaleEntry>) -> Self {
        Self {
            table,
            current: None,
        }
    }

    /// Change the current locale; `None` disables localisation.
    pub fn set_locale(&mut self, locale: Option<String>) {
        self.current = locale;
    }

    /// The current locale.
    pub fn locale(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The locale table.
    pub fn table(&self) -> &[LocaleEntry] {
        &self.table
    }

    /// Localise `text` if possible, otherwise return it unchanged.
    pub fn localize<'a>(&'a self, text: &'a str) -> &'a str {
        let Some(locale) = self.current.as_deref() else {
            return text;
        };

        self.table
            .iter()
            .find(|entry| entry.key == text)
            .and_then(|entry| entry.dict.get(locale))
            .map(String::as_str)
            .filter(|translated| !translated.is_empty())
            .unwrap_or(text)
    }

    /// Message for a failing field rule.
    pub fn field_message(&self, rule: &FieldRule) -> String {
        match explicit(rule.error_message()) {
            Some(message) => self.localize(message).to_string(),
            None => default_field_message(rule.kind(), rule.value()),
        }
    }

    /// Message for a failing group rule.
    pub fn group_message(&self, rule: &GroupRule) -> String {
        match explicit(rule.error_message()) {
            Some(message) => self.localize(message).to_string(),
            None => default_group_message(rule.kind()).to_string(),
        }
    }
}

fn explicit(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.is_empty())
}

/// Built-in message for a field rule; `None` is a custom rule.
pub fn default_field_message(rule: Option<RuleKind>, value: Option<&RuleValue>) -> String {
    let param = || value.map(ToString::to_string).unwrap_or_default();

    match rule {
        Some(RuleKind::Required) => "The field is required".to_string(),
        Some(RuleKind::Email) => "Email has invalid format".to_string(),
        Some(RuleKind::MaxLength) => {
            format!("The field must contain a maximum of {} characters", param())
        }
        Some(RuleKind::MinLength) => {
            format!("The field must contain a minimum of {} characters", param())
        }
        Some(RuleKind::Password) => {
            "Password must contain minimum eight characters, at least one letter and one number"
                .to_string()
        }
        Some(RuleKind::StrongPassword) => {
            "Password should contain minimum eight characters, at least one uppercase letter, \
             one lowercase letter, one number and one special character"
                .to_string()
        }
        Some(RuleKind::Number) => "Value should be a number".to_string(),
        Some(RuleKind::MaxNumber) => format!("Number should be less or equal than {}", param()),
        Some(RuleKind::MinNumber) => format!("Number should be more or equal than {}", param()),
        Some(RuleKind::MinFilesCount) => {
            format!("Files count should be more or equal than {}", param())
        }
        Some(RuleKind::MaxFilesCount) => {
            format!("Files count should be less or equal than {}", param())
        }
        Some(RuleKind::Files) => {
            "Uploaded files have one or several invalid properties (extension/size/type etc)"
                .to_string()
        }
        Some(RuleKind::CustomRegexp) | None => "Value is incorrect".to_string(),
    }
}

/// Built-in message for a group rule.
pub fn default_group_message(rule: GroupRuleKind) -> &'static str {
    match rule {
        GroupRuleKind::Required => "The field is required",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> MessageResolver {
        MessageResolver::new(vec![
            LocaleEntry::new("Too short")
                .with("de", "Zu kurz")
                .with("es", ""),
            LocaleEntry::new("Pick one").with("de", "Bitte wählen"),
        ])
    }

    #[test]
    fn test_without_locale_explicit_message_is_verbatim() {
        let r = resolver();
        let rule = FieldRule::min_length(3).with_message("Too short");
        assert_eq!(r.field_message(&rule), "Too short");
    }

    #[test]
    fn test_locale_lookup_by_message_key() {
        let mut r = resolver();
        r.set_locale(Some("de".into()));
        let rule = FieldRule::min_length(3).with_message("Too short");
        assert_eq!(r.field_message(&rule), "Zu kurz");
        assert_eq!(
            r.group_message(&GroupRule::required(Some("Pick one".into()))),
            "Bitte wählen"
        );
    }

    #[test]
    fn test_missing_translation_falls_back_to_message() {
        let mut r = resolver();
        r.set_locale(Some("it".into()));
        let rule = FieldRule::min_length(3).with_message("Too short");
        assert_eq!(r.field_message(&rule), "Too short");

        r.set_locale(Some("es".into()));
        assert_eq!(r.field_message(&rule), "Too short");
    }

    #[test]
    fn test_empty_explicit_message_uses_default() {
        let r = resolver();
        let rule = FieldRule::required().with_message("");
        assert_eq!(r.field_message(&rule), "The field is required");
    }

    #[test]
    fn test_defaults_interpolate_parameters() {
        let r = resolver();
        assert_eq!(
            r.field_message(&FieldRule::min_number(2.5)),
            "Number should be more or equal than 2.5"
        );
        assert_eq!(
            r.field_message(&FieldRule::max_files_count(3)),
            "Files count should be less or equal than 3"
        );
        assert_eq!(
            r.field_message(&FieldRule::custom(|_, _| false)),
            "Value is incorrect"
        );
        assert_eq!(
            r.group_message(&GroupRule::required(None)),
            "The field is required"
        );
    }

    #[test]
    fn test_default_messages_are_not_localised() {
        let mut r = MessageResolver::new(vec![
            LocaleEntry::new("The field is required").with("de", "Pflichtfeld"),
        ]);
        r.set_locale(Some("de".into()));
        assert_eq!(r.field_message(&FieldRule::required()), "The field is required");
    }
}

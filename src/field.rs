//! Registered fields and groups and their validity state

use crate::config::FieldConfig;
use crate::error::ConfigError;
use crate::input::{InputKind, InputRef};
use crate::rule::{FieldRule, GroupRule};

/// Validity of a field or group.
///
/// `Pending` means a full pass started deferred checks that have not all
/// settled; it never reads as valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum Validity {
    /// Never evaluated
    #[default]
    Unchecked,
    /// Waiting for deferred checks
    Pending,
    /// Every rule passed
    Valid,
    /// At least one rule failed
    Invalid,
}

impl Validity {
    /// Whether the last settled pass passed.
    pub fn is_valid(self) -> bool {
        matches!(self, Validity::Valid)
    }

    /// Whether the last settled pass failed.
    pub fn is_invalid(self) -> bool {
        matches!(self, Validity::Invalid)
    }

    /// Whether deferred checks are outstanding.
    pub fn is_pending(self) -> bool {
        matches!(self, Validity::Pending)
    }

    /// Tri-state view: `None` when unchecked or still pending.
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Validity::Valid => Some(true),
            Validity::Invalid => Some(false),
            Validity::Unchecked | Validity::Pending => None,
        }
    }
}

/// Kind of a required group, inferred from its members.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum GroupKind {
    /// All members are radio buttons
    Radio,
    /// All members are checkboxes
    Checkbox,
}

impl GroupKind {
    /// Infer the kind from member inputs.
    ///
    /// Members must be all radios or all checkboxes. An empty member list
    /// counts as a radio group.
    pub fn infer(group: &str, members: &[InputRef]) -> Result<Self, ConfigError> {
        let mut kinds = members.iter().map(|m| m.kind());
        match kinds.next() {
            None => Ok(GroupKind::Radio),
            Some(first) if first.is_toggle() && kinds.all(|kind| kind == first) => {
                Ok(match first {
                    InputKind::Checkbox => GroupKind::Checkbox,
                    _ => GroupKind::Radio,
                })
            }
            Some(_) => Err(ConfigError::MixedGroup {
                group: group.to_string(),
            }),
        }
    }
}

/// One validated input.
#[derive(Debug, Clone)]
pub struct Field {
    pub(crate) elem: InputRef,
    pub(crate) rules: Vec<FieldRule>,
    pub(crate) validity: Validity,
    pub(crate) error_message: Option<String>,
    pub(crate) config: Option<FieldConfig>,
}

impl Field {
    pub(crate) fn new(elem: InputRef, rules: Vec<FieldRule>, config: Option<FieldConfig>) -> Self {
        Self {
            elem,
            rules,
            validity: Validity::Unchecked,
            error_message: None,
            config,
        }
    }

    /// The input this field reads.
    pub fn elem(&self) -> &InputRef {
        &self.elem
    }

    /// Rules in declaration order.
    pub fn rules(&self) -> &[FieldRule] {
        &self.rules
    }

    /// Current validity.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Message of the winning failed rule, only while invalid.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Per-field presentation override.
    pub fn config(&self) -> Option<&FieldConfig> {
        self.config.as_ref()
    }

    pub(crate) fn set_pending(&mut self) {
        self.validity = Validity::Pending;
        self.error_message = None;
    }

    pub(crate) fn settle(&mut self, error_message: Option<String>) {
        self.validity = if error_message.is_some() {
            Validity::Invalid
        } else {
            Validity::Valid
        };
        self.error_message = error_message;
    }
}

/// A cluster of radios or checkboxes validated as one unit.
#[derive(Debug, Clone)]
pub struct Group {
    pub(crate) kind: GroupKind,
    pub(crate) elems: Vec<InputRef>,
    pub(crate) rules: Vec<GroupRule>,
    pub(crate) validity: Validity,
    pub(crate) error_message: Option<String>,
    pub(crate) config: Option<FieldConfig>,
}

impl Group {
    pub(crate) fn new(
        kind: GroupKind,
        elems: Vec<InputRef>,
        rules: Vec<GroupRule>,
        config: Option<FieldConfig>,
    ) -> Self {
        Self {
            kind,
            elems,
            rules,
            validity: Validity::Unchecked,
            error_message: None,
            config,
        }
    }

    /// Inferred kind.
    pub fn kind(&self) -> GroupKind {
        self.kind
    }

    /// Member inputs in document order.
    pub fn elems(&self) -> &[InputRef] {
        &self.elems
    }

    /// Group rules.
    pub fn rules(&self) -> &[GroupRule] {
        &self.rules
    }

    /// Current validity.
    pub fn validity(&self) -> Validity {
        self.validity
    }

    /// Message of the winning failed rule, only while invalid.
    pub fn error_message(&self) -> Option<&str> {
        self.error_message.as_deref()
    }

    /// Presentation override.
    pub fn config(&self) -> Option<&FieldConfig> {
        self.config.as_ref()
    }

    pub(crate) fn settle(&mut self, error_message: Option<String>) {
        self.validity = if error_message.is_some() {
            Validity::Invalid
        } else {
            Validity::Valid
        };
        self.error_message = error_message;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockInput;

    #[test]
    fn test_validity_tristate() {
        assert_eq!(Validity::Unchecked.as_bool(), None);
        assert_eq!(Validity::Pending.as_bool(), None);
        assert_eq!(Validity::Valid.as_bool(), Some(true));
        assert_eq!(Validity::Invalid.as_bool(), Some(false));
        assert!(!Validity::Pending.is_valid());
    }

    #[test]
    fn test_group_kind_inference() {
        let radios: Vec<InputRef> = vec![MockInput::radio().handle(), MockInput::radio().handle()];
        assert_eq!(GroupKind::infer("#g", &radios).unwrap(), GroupKind::Radio);

        let boxes: Vec<InputRef> = vec![MockInput::checkbox().handle()];
        assert_eq!(GroupKind::infer("#g", &boxes).unwrap(), GroupKind::Checkbox);

        let mixed: Vec<InputRef> = vec![MockInput::radio().handle(), MockInput::checkbox().handle()];
        assert_eq!(
            GroupKind::infer("#g", &mixed),
            Err(ConfigError::MixedGroup { group: "#g".into() })
        );

        assert_eq!(GroupKind::infer("#g", &[]).unwrap(), GroupKind::Radio);
    }

    #[test]
    fn test_group_of_non_toggles_is_rejected() {
        let texts: Vec<InputRef> = vec![MockInput::text("a").handle(), MockInput::text("b").handle()];
        assert!(matches!(
            GroupKind::infer("#g", &texts),
            Err(ConfigError::MixedGroup { .. })
        ));
    }

    #[test]
    fn test_settle_clears_message_when_valid() {
        let mut field = Field::new(MockInput::text("").handle(), vec![FieldRule::required()], None);
        field.settle(Some("bad".into()));
        assert_eq!(field.validity(), Validity::Invalid);
        assert_eq!(field.error_message(), Some("bad"));

        field.settle(None);
        assert_eq!(field.validity(), Validity::Valid);
        assert_eq!(field.error_message(), None);
    }
}

//! Read-only views of engine state
//!
//! [`FieldsSnapshot`] is what custom validators and the fail callback see;
//! [`FormSnapshot`] is what the [`Renderer`] receives after a pass.

use indexmap::IndexMap;

use crate::config::Presentation;
use crate::field::Validity;
use crate::value::FieldValue;

/// State of one field at the moment a snapshot was taken.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FieldSnapshot {
    /// Value read from the input
    pub value: FieldValue,
    /// Validity at snapshot time
    pub validity: Validity,
    /// Error message at snapshot time
    pub error_message: Option<String>,
}

/// Every registered field, keyed by name in insertion order.
pub type FieldsSnapshot = IndexMap<String, FieldSnapshot>;

/// Render-side view of one field or group.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TargetReport {
    /// Validity after the pass
    pub validity: Validity,
    /// Message to display, only when invalid
    pub error_message: Option<String>,
    /// Resolved presentation settings
    pub presentation: Presentation,
}

impl TargetReport {
    /// Whether an error should be displayed for this target.
    pub fn shows_error(&self) -> bool {
        !self.validity.is_valid()
    }
}

/// Complete render input after a pass.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FormSnapshot {
    /// Fields in insertion order
    pub fields: IndexMap<String, TargetReport>,
    /// Groups in insertion order
    pub groups: IndexMap<String, TargetReport>,
    /// Whether every field and group is valid
    pub is_valid: bool,
}

impl FormSnapshot {
    /// Names of fields and groups showing an error, groups first.
    pub fn invalid_targets(&self) -> impl Iterator<Item = &str> {
        self.groups
            .iter()
            .chain(self.fields.iter())
            .filter(|(_, report)| report.shows_error())
            .map(|(name, _)| name.as_str())
    }
}

/// Consumer of render snapshots.
///
/// The engine calls [`Renderer::render`] after each pass once the form has
/// been submitted, and [`Renderer::clear`] when it tears down.
pub trait Renderer: Send {
    /// Display the state in `snapshot`, replacing whatever was shown before.
    fn render(&mut self, snapshot: &FormSnapshot);

    /// Remove everything previously rendered.
    fn clear(&mut self) {}
}

impl<F> Renderer for F
where
    F: FnMut(&FormSnapshot) + Send,
{
    fn render(&mut self, snapshot: &FormSnapshot) {
        self(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GlobalConfig;

    fn report(validity: Validity) -> TargetReport {
        TargetReport {
            validity,
            error_message: None,
            presentation: GlobalConfig::default().resolve(None, "x"),
        }
    }

    #[test]
    fn test_invalid_targets_lists_groups_first() {
        let mut snapshot = FormSnapshot::default();
        snapshot.fields.insert("#a".into(), report(Validity::Invalid));
        snapshot.fields.insert("#b".into(), report(Validity::Valid));
        snapshot.groups.insert("#g".into(), report(Validity::Invalid));

        let names: Vec<_> = snapshot.invalid_targets().collect();
        assert_eq!(names, vec!["#g", "#a"]);
    }

    #[test]
    fn test_closure_renderer() {
        let mut count = 0;
        {
            let mut renderer = |_: &FormSnapshot| count += 1;
            Renderer::render(&mut renderer, &FormSnapshot::default());
            Renderer::render(&mut renderer, &FormSnapshot::default());
        }
        assert_eq!(count, 2);
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;
    use crate::config::GlobalConfig;

    #[test]
    fn test_field_snapshot_json_shape() {
        let snapshot = FieldSnapshot {
            value: FieldValue::text("ada"),
            validity: Validity::Invalid,
            error_message: Some("Name is too short".to_string()),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "value": { "type": "text", "value": "ada" },
                "validity": "invalid",
                "errorMessage": "Name is too short",
            })
        );
    }

    #[test]
    fn test_form_snapshot_keeps_field_order() {
        let report = TargetReport {
            validity: Validity::Valid,
            error_message: None,
            presentation: GlobalConfig::default().resolve(None, "x"),
        };
        let mut snapshot = FormSnapshot::default();
        snapshot.fields.insert("#z".into(), report.clone());
        snapshot.fields.insert("#a".into(), report);

        let json = serde_json::to_string(&snapshot).unwrap();
        let back: FormSnapshot = serde_json::from_str(&json).unwrap();
        let names: Vec<_> = back.fields.keys().map(String::as_str).collect();
        assert_eq!(names, vec!["#z", "#a"]);
    }
}

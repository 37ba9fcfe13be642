//! Engine configuration
//!
//! [`GlobalConfig`] holds process-wide defaults; [`FieldConfig`] overrides any
//! subset of the presentation settings for one field or group. Resolution is
//! per setting: the field value wins when present, the global value otherwise.
//!
//! # Example
//!
//! ```
//! use formguard::config::{FieldConfig, GlobalConfig, TooltipPosition};
//!
//! let global = GlobalConfig::default()
//!     .with_lock_form(false)
//!     .with_tooltip(TooltipPosition::Top);
//!
//! let field = FieldConfig::default().with_error_field_css_class("bad-email");
//! let presentation = global.resolve(Some(&field), "#email");
//!
//! assert_eq!(presentation.error_field_css_class, "bad-email");
//! assert_eq!(presentation.error_label_css_class, "just-validate-error-label");
//! assert_eq!(presentation.tooltip, Some(TooltipPosition::Top));
//! ```

use std::collections::BTreeMap;

/// Style declarations, property name to value.
pub type StyleMap = BTreeMap<String, String>;

/// Where a tooltip-style error label is placed relative to its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum TooltipPosition {
    /// Left of the input
    Left,
    /// Above the input
    Top,
    /// Right of the input
    Right,
    /// Below the input
    Bottom,
}

/// Tooltip rendering settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TooltipConfig {
    /// Placement of error labels
    pub position: TooltipPosition,
}

/// Process-wide engine defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct GlobalConfig {
    /// Style applied to invalid inputs
    pub error_field_style: StyleMap,
    /// Class applied to invalid inputs
    pub error_field_css_class: String,
    /// Style applied to error labels
    pub error_label_style: StyleMap,
    /// Class applied to error labels
    pub error_label_css_class: String,
    /// Focus the first invalid field after a failed submit
    pub focus_invalid_field: bool,
    /// Disable form controls while a submit pass runs
    pub lock_form: bool,
    /// Attach test ids to render presentations
    pub testing_mode: bool,
    /// Render error labels as positioned tooltips
    pub tooltip: Option<TooltipConfig>,
}

fn style(pairs: &[(&str, &str)]) -> StyleMap {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            error_field_style: style(&[("color", "#b81111"), ("border", "1px solid #B81111")]),
            error_field_css_class: "just-validate-error-field".to_string(),
            error_label_style: style(&[("color", "#b81111")]),
            error_label_css_class: "just-validate-error-label".to_string(),
            focus_invalid_field: true,
            lock_form: true,
            testing_mode: false,
            tooltip: None,
        }
    }
}

impl GlobalConfig {
    /// Replace the invalid-input style.
    pub fn with_error_field_style(mut self, style: StyleMap) -> Self {
        self.error_field_style = style;
        self
    }

    /// Replace the invalid-input class.
    pub fn with_error_field_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_field_css_class = class.into();
        self
    }

    /// Replace the error label style.
    pub fn with_error_label_style(mut self, style: StyleMap) -> Self {
        self.error_label_style = style;
        self
    }

    /// Replace the error label class.
    pub fn with_error_label_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_label_css_class = class.into();
        self
    }

    /// Toggle focusing the first invalid field on failed submit.
    pub fn with_focus_invalid_field(mut self, focus: bool) -> Self {
        self.focus_invalid_field = focus;
        self
    }

    /// Toggle form locking during submit.
    pub fn with_lock_form(mut self, lock: bool) -> Self {
        self.lock_form = lock;
        self
    }

    /// Toggle testing mode.
    pub fn with_testing_mode(mut self, testing: bool) -> Self {
        self.testing_mode = testing;
        self
    }

    /// Render labels as tooltips at `position`.
    pub fn with_tooltip(mut self, position: TooltipPosition) -> Self {
        self.tooltip = Some(TooltipConfig { position });
        self
    }

    /// Whether labels render as tooltips.
    pub fn is_tooltip(&self) -> bool {
        self.tooltip.is_some()
    }

    /// Resolve the presentation of one field or group named `name`.
    ///
    /// In tooltip mode the label style comes from the field config only.
    pub fn resolve(&self, field: Option<&FieldConfig>, name: &str) -> Presentation {
        let field_style = field.and_then(|c| c.error_label_style.clone());
        let error_label_style = if self.is_tooltip() {
            field_style.unwrap_or_default()
        } else {
            field_style.unwrap_or_else(|| self.error_label_style.clone())
        };

        Presentation {
            error_field_style: field
                .and_then(|c| c.error_field_style.clone())
                .unwrap_or_else(|| self.error_field_style.clone()),
            error_field_css_class: field
                .and_then(|c| c.error_field_css_class.clone())
                .unwrap_or_else(|| self.error_field_css_class.clone()),
            error_label_style,
            error_label_css_class: field
                .and_then(|c| c.error_label_css_class.clone())
                .unwrap_or_else(|| self.error_label_css_class.clone()),
            tooltip: self.tooltip.map(|global| {
                field
                    .and_then(|c| c.tooltip)
                    .map_or(global.position, |t| t.position)
            }),
            test_id: self
                .testing_mode
                .then(|| format!("error-label-{}", name)),
        }
    }
}

/// Per-field override of presentation settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct FieldConfig {
    /// Style applied to the invalid input
    pub error_field_style: Option<StyleMap>,
    /// Class applied to the invalid input
    pub error_field_css_class: Option<String>,
    /// Style applied to the error label
    pub error_label_style: Option<StyleMap>,
    /// Class applied to the error label
    pub error_label_css_class: Option<String>,
    /// Tooltip placement for this field
    pub tooltip: Option<TooltipConfig>,
}

impl FieldConfig {
    /// Override the invalid-input style.
    pub fn with_error_field_style(mut self, style: StyleMap) -> Self {
        self.error_field_style = Some(style);
        self
    }

    /// Override the invalid-input class.
    pub fn with_error_field_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_field_css_class = Some(class.into());
        self
    }

    /// Override the error label style.
    pub fn with_error_label_style(mut self, style: StyleMap) -> Self {
        self.error_label_style = Some(style);
        self
    }

    /// Override the error label class.
    pub fn with_error_label_css_class(mut self, class: impl Into<String>) -> Self {
        self.error_label_css_class = Some(class.into());
        self
    }

    /// Override the tooltip placement.
    pub fn with_tooltip(mut self, position: TooltipPosition) -> Self {
        self.tooltip = Some(TooltipConfig { position });
        self
    }
}

/// Resolved presentation settings handed to the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Presentation {
    /// Style for the invalid input
    pub error_field_style: StyleMap,
    /// Class for the invalid input
    pub error_field_css_class: String,
    /// Style for the error label
    pub error_label_style: StyleMap,
    /// Class for the error label
    pub error_label_css_class: String,
    /// Tooltip placement, when tooltips are enabled
    pub tooltip: Option<TooltipPosition>,
    /// Test id, in testing mode
    pub test_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let c = GlobalConfig::default();
        assert!(c.focus_invalid_field);
        assert!(c.lock_form);
        assert!(!c.testing_mode);
        assert!(!c.is_tooltip());
        assert_eq!(c.error_field_style.get("color").map(String::as_str), Some("#b81111"));
    }

    #[test]
    fn test_without_field_config_uses_global() {
        let c = GlobalConfig::default();
        let p = c.resolve(None, "#name");
        assert_eq!(p.error_field_css_class, c.error_field_css_class);
        assert_eq!(p.error_label_style, c.error_label_style);
        assert_eq!(p.tooltip, None);
        assert_eq!(p.test_id, None);
    }

    #[test]
    fn test_field_overrides_each_setting_independently() {
        let c = GlobalConfig::default();
        let f = FieldConfig::default().with_error_label_style(style(&[("color", "red")]));
        let p = c.resolve(Some(&f), "#name");
        assert_eq!(p.error_label_style, style(&[("color", "red")]));
        assert_eq!(p.error_field_style, c.error_field_style);
    }

    #[test]
    fn test_tooltip_mode_drops_global_label_style() {
        let c = GlobalConfig::default().with_tooltip(TooltipPosition::Right);
        let p = c.resolve(None, "#name");
        assert!(p.error_label_style.is_empty());
        assert_eq!(p.tooltip, Some(TooltipPosition::Right));

        let f = FieldConfig::default().with_tooltip(TooltipPosition::Bottom);
        assert_eq!(
            c.resolve(Some(&f), "#name").tooltip,
            Some(TooltipPosition::Bottom)
        );
    }

    #[test]
    fn test_field_tooltip_ignored_without_global_tooltip() {
        let c = GlobalConfig::default();
        let f = FieldConfig::default().with_tooltip(TooltipPosition::Left);
        assert_eq!(c.resolve(Some(&f), "#name").tooltip, None);
    }

    #[test]
    fn test_testing_mode_sets_test_id() {
        let c = GlobalConfig::default().with_testing_mode(true);
        assert_eq!(
            c.resolve(None, "#email").test_id.as_deref(),
            Some("error-label-#email")
        );
    }
}

#[cfg(all(test, feature = "serde"))]
mod serde_tests {
    use super::*;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let json = r#"{"lockForm":false,"tooltip":{"position":"bottom"}}"#;
        let config: GlobalConfig = serde_json::from_str(json).unwrap();

        assert!(!config.lock_form);
        assert!(config.focus_invalid_field);
        assert_eq!(
            config.tooltip,
            Some(TooltipConfig {
                position: TooltipPosition::Bottom
            })
        );
        assert_eq!(config.error_field_css_class, "just-validate-error-field");
    }

    #[test]
    fn test_field_config_only_sets_given_overrides() {
        let json = r#"{"errorLabelCssClass":"oops"}"#;
        let config: FieldConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.error_label_css_class.as_deref(), Some("oops"));
        assert!(config.error_field_style.is_none());
        assert!(config.tooltip.is_none());
    }

    #[test]
    fn test_unknown_tooltip_position_fails() {
        let json = r#"{"tooltip":{"position":"center"}}"#;
        assert!(serde_json::from_str::<GlobalConfig>(json).is_err());
    }
}

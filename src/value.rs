//! Field values as read from input handles
//!
//! Every input is read into a [`FieldValue`], whose shape depends on the kind of
//! element: toggles read as booleans, file inputs as file lists and everything
//! else as text. Rules that need a particular shape inspect the variant and
//! treat a mismatch as an invalid value rather than an error.
//!
//! # Examples
//!
//! ```
//! use formguard::value::{FieldValue, FileInfo};
//!
//! assert!(FieldValue::text("   ").is_empty());
//! assert!(FieldValue::Bool(false).is_empty());
//! assert!(!FieldValue::files(vec![FileInfo::new("a.png", 10, "image/png")]).is_empty());
//! ```

use std::fmt;

/// Metadata of a single selected file.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct FileInfo {
    /// File name including extension
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// MIME type reported by the input, possibly empty
    pub mime_type: String,
}

impl FileInfo {
    /// Create file metadata.
    pub fn new(name: impl Into<String>, size: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
        }
    }

    /// Extension of the file: the text after the last `.` of the name.
    ///
    /// A name without a dot yields the whole name.
    ///
    /// ```
    /// use formguard::value::FileInfo;
    ///
    /// assert_eq!(FileInfo::new("photo.final.JPG", 1, "").extension(), "JPG");
    /// assert_eq!(FileInfo::new("README", 1, "").extension(), "README");
    /// ```
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }
}

/// The current value of an input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", content = "value", rename_all = "camelCase"))]
pub enum FieldValue {
    /// Checked state of a checkbox or radio button
    Bool(bool),
    /// Text of a text-like input
    Text(String),
    /// Selected files of a file input
    Files(Vec<FileInfo>),
    /// No value could be read
    Absent,
}

impl FieldValue {
    /// Create a text value.
    pub fn text(value: impl Into<String>) -> Self {
        FieldValue::Text(value.into())
    }

    /// Create a file-list value.
    pub fn files(files: Vec<FileInfo>) -> Self {
        FieldValue::Files(files)
    }

    /// Borrow the text if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Borrow the file list if this is a file-list value.
    pub fn as_files(&self) -> Option<&[FileInfo]> {
        match self {
            FieldValue::Files(files) => Some(files),
            _ => None,
        }
    }

    /// Whether the value counts as "not provided".
    ///
    /// Blank text (after trimming), an unchecked toggle, an empty file list and
    /// an absent value are empty.
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Bool(checked) => !checked,
            FieldValue::Text(s) => s.trim().is_empty(),
            FieldValue::Files(files) => files.is_empty(),
            FieldValue::Absent => true,
        }
    }

    /// Loose truthiness, used when a custom validator returns a non-boolean.
    ///
    /// ```
    /// use formguard::value::FieldValue;
    ///
    /// assert!(FieldValue::text("x").is_truthy());
    /// assert!(!FieldValue::text("").is_truthy());
    /// assert!(FieldValue::files(vec![]).is_truthy());
    /// assert!(!FieldValue::Absent.is_truthy());
    /// ```
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Bool(b) => *b,
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::Files(_) => true,
            FieldValue::Absent => false,
        }
    }

    /// Coerce to text the way a pattern test sees the value.
    pub fn coerce_to_string(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Bool(b) => write!(f, "{}", b),
            FieldValue::Text(s) => f.write_str(s),
            FieldValue::Files(_) => f.write_str("[object FileList]"),
            FieldValue::Absent => f.write_str("null"),
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<Vec<FileInfo>> for FieldValue {
    fn from(value: Vec<FileInfo>) -> Self {
        FieldValue::Files(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_empty() {
        assert!(FieldValue::text("").is_empty());
        assert!(FieldValue::text(" \t\n").is_empty());
        assert!(!FieldValue::text(" a ").is_empty());
    }

    #[test]
    fn test_toggle_and_absent_emptiness() {
        assert!(FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Bool(true).is_empty());
        assert!(FieldValue::Absent.is_empty());
        assert!(FieldValue::files(vec![]).is_empty());
    }

    #[test]
    fn test_coercion_to_string() {
        assert_eq!(FieldValue::Bool(true).coerce_to_string(), "true");
        assert_eq!(FieldValue::Absent.coerce_to_string(), "null");
        assert_eq!(FieldValue::files(vec![]).coerce_to_string(), "[object FileList]");
        assert_eq!(FieldValue::text("abc").coerce_to_string(), "abc");
    }

    #[test]
    fn test_extension_uses_last_dot() {
        assert_eq!(FileInfo::new("archive.tar.gz", 1, "").extension(), "gz");
        assert_eq!(FileInfo::new("trailing.", 1, "").extension(), "");
    }
}

//! Presence check behind the `Required` rule

use super::Predicate;
use crate::value::FieldValue;

/// Predicate that checks a value was provided.
#[derive(Clone, Copy, Default, Debug)]
pub struct Present;

impl Predicate<FieldValue> for Present {
    #[inline]
    fn check(&self, value: &FieldValue) -> bool {
        !value.is_empty()
    }
}

/// Create a predicate that checks a value was provided.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
/// use formguard::value::FieldValue;
///
/// assert!(present().check(&FieldValue::text("x")));
/// assert!(!present().check(&FieldValue::text("  ")));
/// assert!(!present().check(&FieldValue::Bool(false)));
/// ```
pub fn present() -> Present {
    Present
}

//! Rule catalog: pure checks behind the built-in rules
//!
//! Each built-in rule is backed by a small [`Predicate`] over the value shape
//! it understands. Predicates hold their parameters, carry no other state and
//! never look at rule configuration; parameter validation and shape dispatch
//! belong to [`crate::evaluator`].
//!
//! # Example
//!
//! ```rust
//! use formguard::catalog::*;
//!
//! assert!(email().check("user@example.com"));
//! assert!(!email().check("user@"));
//! assert!(len_at_most(5.0).check("hello"));
//! assert!(!len_at_most(5.0).check("hello!"));
//! assert_eq!(parse_number(" 0x1F "), Some(31.0));
//! ```

mod files;
mod number;
mod presence;
mod text;

pub use files::{
    file_count_at_least, file_count_at_most, satisfies, FileCountAtLeast, FileCountAtMost,
    Satisfies,
};
pub use number::{at_least, at_most, numeric, parse_number, AtLeast, AtMost, Numeric};
pub use presence::{present, Present};
pub use text::{
    email, len_at_least, len_at_most, matches, password, strong_password, Email, LenAtLeast,
    LenAtMost, Matches, Password, StrongPassword,
};

/// A check over values of type `T`.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::Predicate;
///
/// let short = |s: &str| s.len() < 4;
/// assert!(short.check("abc"));
/// ```
pub trait Predicate<T: ?Sized>: Send + Sync {
    /// Whether the value satisfies the check.
    fn check(&self, value: &T) -> bool;
}

impl<T: ?Sized, F> Predicate<T> for F
where
    F: Fn(&T) -> bool + Send + Sync,
{
    #[inline]
    fn check(&self, value: &T) -> bool {
        self(value)
    }
}

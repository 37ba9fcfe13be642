//! Text predicates
//!
//! Shape checks for email addresses and passwords, character-count bounds and
//! pattern matching. Lengths count Unicode scalar values.

use std::sync::OnceLock;

use regex::Regex;

use super::Predicate;

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_REGEX.get_or_init(|| {
        Regex::new(
            r#"^(([^<>()\[\]\\.,;:\s@"]+(\.[^<>()\[\]\\.,;:\s@"]+)*)|(".+"))@((\[[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\.[0-9]{1,3}\])|(([a-zA-Z\-0-9]+\.)+[a-zA-Z]{2,}))$"#,
        )
        .expect("email pattern compiles")
    })
}

const PASSWORD_MIN_LEN: usize = 8;
const SPECIAL_CHARS: &str = "@$!%*?&";

/// Predicate that checks a string has an email address shape.
#[derive(Clone, Copy, Default, Debug)]
pub struct Email;

impl Predicate<str> for Email {
    #[inline]
    fn check(&self, value: &str) -> bool {
        email_regex().is_match(value)
    }
}

/// Create a predicate that checks a string has an email address shape.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
///
/// assert!(email().check("a@b.com"));
/// assert!(email().check("\"quoted local\"@example.org"));
/// assert!(!email().check("not-an-email"));
/// assert!(!email().check("a@b"));
/// ```
pub fn email() -> Email {
    Email
}

/// Predicate for the basic password policy.
///
/// Eight or more ASCII letters and digits, with at least one of each.
#[derive(Clone, Copy, Default, Debug)]
pub struct Password;

impl Predicate<str> for Password {
    fn check(&self, value: &str) -> bool {
        value.chars().count() >= PASSWORD_MIN_LEN
            && value.chars().all(|c| c.is_ascii_alphanumeric())
            && value.chars().any(|c| c.is_ascii_alphabetic())
            && value.chars().any(|c| c.is_ascii_digit())
    }
}

/// Create a predicate for the basic password policy.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
///
/// assert!(password().check("abcd1234"));
/// assert!(!password().check("abcdefgh"));
/// assert!(!password().check("abc123"));
/// ```
pub fn password() -> Password {
    Password
}

/// Predicate for the strong password policy.
///
/// Eight or more characters from ASCII letters, digits and `@$!%*?&`,
/// with at least one lowercase, one uppercase, one digit and one special.
#[derive(Clone, Copy, Default, Debug)]
pub struct StrongPassword;

impl Predicate<str> for StrongPassword {
    fn check(&self, value: &str) -> bool {
        let allowed = |c: char| c.is_ascii_alphanumeric() || SPECIAL_CHARS.contains(c);

        value.chars().count() >= PASSWORD_MIN_LEN
            && value.chars().all(allowed)
            && value.chars().any(|c| c.is_ascii_lowercase())
            && value.chars().any(|c| c.is_ascii_uppercase())
            && value.chars().any(|c| c.is_ascii_digit())
            && value.chars().any(|c| SPECIAL_CHARS.contains(c))
    }
}

/// Create a predicate for the strong password policy.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
///
/// assert!(strong_password().check("Abcdef1!"));
/// assert!(!strong_password().check("abcdef1!"));
/// assert!(!strong_password().check("Abcdef1#"));
/// ```
pub fn strong_password() -> StrongPassword {
    StrongPassword
}

/// Predicate that checks a string has at least `min` characters.
#[derive(Clone, Copy, Debug)]
pub struct LenAtLeast {
    min: f64,
}

impl Predicate<str> for LenAtLeast {
    #[inline]
    fn check(&self, value: &str) -> bool {
        value.chars().count() as f64 >= self.min
    }
}

/// Create a predicate that checks a string has at least `min` characters.
pub fn len_at_least(min: f64) -> LenAtLeast {
    LenAtLeast { min }
}

/// Predicate that checks a string has at most `max` characters.
#[derive(Clone, Copy, Debug)]
pub struct LenAtMost {
    max: f64,
}

impl Predicate<str> for LenAtMost {
    #[inline]
    fn check(&self, value: &str) -> bool {
        value.chars().count() as f64 <= self.max
    }
}

/// Create a predicate that checks a string has at most `max` characters.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
///
/// assert!(len_at_most(3.0).check("日本語"));
/// assert!(!len_at_most(3.0).check("日本語!"));
/// ```
pub fn len_at_most(max: f64) -> LenAtMost {
    LenAtMost { max }
}

/// Predicate that checks a string matches a pattern anywhere.
#[derive(Clone, Debug)]
pub struct Matches(pub Regex);

impl Predicate<str> for Matches {
    #[inline]
    fn check(&self, value: &str) -> bool {
        self.0.is_match(value)
    }
}

/// Create a predicate that checks a string matches `pattern`.
pub fn matches(pattern: Regex) -> Matches {
    Matches(pattern)
}

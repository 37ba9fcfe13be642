//! Number predicates
//!
//! Numeric text is parsed with [`parse_number`], which accepts the same
//! literal forms a browser accepts when converting input text to a number.

use super::Predicate;

const RADIX_PREFIXES: [(&str, u32); 6] = [
    ("0x", 16),
    ("0X", 16),
    ("0o", 8),
    ("0O", 8),
    ("0b", 2),
    ("0B", 2),
];

/// Parse input text as a number.
///
/// Surrounding whitespace is ignored and blank text is zero. Decimal and
/// exponent forms take an optional sign; `0x`/`0o`/`0b` integer forms do not
/// and are not limited to 64 bits.
/// `Infinity` is accepted, anything else returns `None`.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::parse_number;
///
/// assert_eq!(parse_number("42"), Some(42.0));
/// assert_eq!(parse_number(" -1.5e2 "), Some(-150.0));
/// assert_eq!(parse_number("0b101"), Some(5.0));
/// assert_eq!(parse_number("   "), Some(0.0));
/// assert_eq!(parse_number("12px"), None);
/// assert_eq!(parse_number("nan"), None);
/// ```
pub fn parse_number(text: &str) -> Option<f64> {
    let s = text.trim();
    if s.is_empty() {
        return Some(0.0);
    }

    for (prefix, radix) in RADIX_PREFIXES {
        if let Some(digits) = s.strip_prefix(prefix) {
            if digits.is_empty() {
                return None;
            }
            return digits.chars().try_fold(0.0, |acc: f64, c| {
                c.to_digit(radix)
                    .map(|d| acc * f64::from(radix) + f64::from(d))
            });
        }
    }

    let (sign, unsigned) = match s.strip_prefix('-') {
        Some(rest) => (-1.0, rest),
        None => (1.0, s.strip_prefix('+').unwrap_or(s)),
    };
    if unsigned == "Infinity" {
        return Some(sign * f64::INFINITY);
    }

    let literal = unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '+' | '-'));
    if !literal {
        return None;
    }

    s.parse::<f64>().ok()
}

/// Predicate that checks text parses as a number.
#[derive(Clone, Copy, Default, Debug)]
pub struct Numeric;

impl Predicate<str> for Numeric {
    #[inline]
    fn check(&self, value: &str) -> bool {
        parse_number(value).is_some()
    }
}

/// Create a predicate that checks text parses as a number.
pub fn numeric() -> Numeric {
    Numeric
}

/// Predicate that checks a number is at least `min`.
#[derive(Clone, Copy, Debug)]
pub struct AtLeast(pub f64);

impl Predicate<f64> for AtLeast {
    #[inline]
    fn check(&self, value: &f64) -> bool {
        *value >= self.0
    }
}

/// Create a predicate that checks a number is at least `min`.
///
/// # Example
///
/// ```rust
/// use formguard::catalog::*;
///
/// assert!(at_least(5.0).check(&5.0));
/// assert!(!at_least(5.0).check(&4.9));
/// ```
pub fn at_least(min: f64) -> AtLeast {
    AtLeast(min)
}

/// Predicate that checks a number is at most `max`.
#[derive(Clone, Copy, Debug)]
pub struct AtMost(pub f64);

impl Predicate<f64> for AtMost {
    #[inline]
    fn check(&self, value: &f64) -> bool {
        *value <= self.0
    }
}

/// Create a predicate that checks a number is at most `max`.
pub fn at_most(max: f64) -> AtMost {
    AtMost(max)
}

//! Verdicts of single rule evaluations
//!
//! Evaluating a rule either answers right away or hands back a deferred check
//! that the orchestrator awaits in a fan-in join.
//!
//! ```
//! use formguard::verdict::Verdict;
//!
//! let v = Verdict::valid();
//! assert_eq!(v.immediate(), Some(true));
//!
//! let v = Verdict::deferred(async { Ok(false) });
//! assert!(v.is_deferred());
//! ```

use std::fmt;
use std::future::Future;

use futures::future::BoxFuture;
use futures::FutureExt;

/// Error a deferred validator may fail with.
pub type ValidatorError = Box<dyn std::error::Error + Send + Sync>;

/// A started asynchronous check resolving to the validator's answer.
pub type DeferredCheck = BoxFuture<'static, Result<bool, ValidatorError>>;

/// Outcome of evaluating one rule against one value.
pub enum Verdict {
    /// Known now
    Immediate(bool),
    /// Known once the check settles
    Deferred(DeferredCheck),
}

impl Verdict {
    /// Immediate pass.
    #[inline]
    pub fn valid() -> Self {
        Verdict::Immediate(true)
    }

    /// Immediate failure.
    #[inline]
    pub fn invalid() -> Self {
        Verdict::Immediate(false)
    }

    /// Deferred verdict from a future.
    pub fn deferred<F>(check: F) -> Self
    where
        F: Future<Output = Result<bool, ValidatorError>> + Send + 'static,
    {
        Verdict::Deferred(check.boxed())
    }

    /// The answer if it is already known.
    pub fn immediate(&self) -> Option<bool> {
        match self {
            Verdict::Immediate(ok) => Some(*ok),
            Verdict::Deferred(_) => None,
        }
    }

    /// Whether the answer is pending.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Verdict::Deferred(_))
    }
}

impl From<bool> for Verdict {
    fn from(ok: bool) -> Self {
        Verdict::Immediate(ok)
    }
}

impl fmt::Debug for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Immediate(ok) => f.debug_tuple("Immediate").field(ok).finish(),
            Verdict::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// Why a validation pass runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassMode {
    /// Submit, explicit call, or revalidation: deferred validators run
    Full,
    /// A single input changed: deferred validators are skipped
    InputChanged,
}

impl PassMode {
    /// Whether deferred custom validators are started in this mode.
    pub fn runs_deferred(self) -> bool {
        matches!(self, PassMode::Full)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_immediate_answers() {
        assert_eq!(Verdict::valid().immediate(), Some(true));
        assert_eq!(Verdict::invalid().immediate(), Some(false));
        assert_eq!(Verdict::from(true).immediate(), Some(true));
    }

    #[tokio::test]
    async fn test_deferred_resolves() {
        match Verdict::deferred(async { Ok(true) }) {
            Verdict::Deferred(check) => assert!(check.await.unwrap()),
            Verdict::Immediate(_) => panic!("expected a deferred verdict"),
        }
    }

    #[test]
    fn test_input_changed_skips_deferred() {
        assert!(PassMode::Full.runs_deferred());
        assert!(!PassMode::InputChanged.runs_deferred());
    }
}

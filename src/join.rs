//! Fan-in barrier over the verdicts of one field or group
//!
//! Rules are pushed as they are evaluated. Immediate failures are recorded
//! on the spot; deferred checks are kept and awaited together by
//! [`RuleJoin::settle`], which waits for every one of them whether it
//! resolves or fails. A failing check never cancels its siblings.
//!
//! # Example
//!
//! ```
//! # tokio_test::block_on(async {
//! use formguard::join::RuleJoin;
//! use formguard::verdict::Verdict;
//!
//! let mut join = RuleJoin::new();
//! join.push(2, Verdict::invalid());
//! join.push(1, Verdict::deferred(async { Err("timeout".into()) }));
//! join.push(0, Verdict::deferred(async { Ok(true) }));
//!
//! let settled = join.settle().await;
//! assert_eq!(settled.failures(), &[1, 2]);
//! assert_eq!(settled.first_failure(), Some(1));
//! # });
//! ```

use std::fmt;

use futures::future::join_all;

use crate::verdict::{DeferredCheck, Verdict};

/// Verdicts of one field's rules, keyed by declaration index.
#[derive(Default)]
pub struct RuleJoin {
    failures: Vec<usize>,
    pending: Vec<(usize, DeferredCheck)>,
}

impl RuleJoin {
    /// Empty join.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the verdict of the rule declared at `index`.
    pub fn push(&mut self, index: usize, verdict: Verdict) {
        match verdict {
            Verdict::Immediate(true) => {}
            Verdict::Immediate(false) => self.failures.push(index),
            Verdict::Deferred(check) => self.pending.push((index, check)),
        }
    }

    /// Whether any deferred check is outstanding.
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Wait for every deferred check and combine all outcomes.
    pub async fn settle(self) -> Settled {
        let RuleJoin {
            mut failures,
            pending,
        } = self;

        let (indices, checks): (Vec<_>, Vec<_>) = pending.into_iter().unzip();
        let outcomes = join_all(checks).await;

        let mut rejections = Vec::new();
        for (index, outcome) in indices.into_iter().zip(outcomes) {
            match outcome {
                Ok(true) => {}
                Ok(false) => failures.push(index),
                Err(err) => {
                    failures.push(index);
                    rejections.push((index, err.to_string()));
                }
            }
        }

        failures.sort_unstable();
        Settled {
            failures,
            rejections,
        }
    }
}

impl fmt::Debug for RuleJoin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleJoin")
            .field("failures", &self.failures)
            .field(
                "pending",
                &self.pending.iter().map(|(index, _)| index).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Combined outcome of a join.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Settled {
    failures: Vec<usize>,
    rejections: Vec<(usize, String)>,
}

impl Settled {
    /// Indices of failed rules, ascending.
    pub fn failures(&self) -> &[usize] {
        &self.failures
    }

    /// Failed deferred checks with their error text.
    pub fn rejections(&self) -> &[(usize, String)] {
        &self.rejections
    }

    /// The failed rule whose message is shown: the first one declared.
    pub fn first_failure(&self) -> Option<usize> {
        self.failures.first().copied()
    }

    /// Whether every rule passed.
    pub fn is_valid(&self) -> bool {
        self.failures.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_immediate_only() {
        let mut join = RuleJoin::new();
        join.push(1, Verdict::valid());
        join.push(0, Verdict::valid());
        assert!(!join.has_pending());
        assert!(join.settle().await.is_valid());
    }

    #[tokio::test]
    async fn test_first_declared_failure_wins() {
        let mut join = RuleJoin::new();
        // evaluated in reverse declaration order
        join.push(2, Verdict::invalid());
        join.push(1, Verdict::valid());
        join.push(0, Verdict::invalid());

        let settled = join.settle().await;
        assert_eq!(settled.failures(), &[0, 2]);
        assert_eq!(settled.first_failure(), Some(0));
    }

    #[tokio::test]
    async fn test_rejection_does_not_abort_siblings() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut join = RuleJoin::new();

        let counter = finished.clone();
        join.push(
            1,
            Verdict::deferred(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(true)
            }),
        );
        join.push(0, Verdict::deferred(async { Err("backend down".into()) }));

        let settled = join.settle().await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
        assert_eq!(settled.failures(), &[0]);
        assert_eq!(settled.rejections(), &[(0, "backend down".to_string())]);
    }

    #[tokio::test]
    async fn test_deferred_false_fails() {
        let mut join = RuleJoin::new();
        join.push(0, Verdict::valid());
        join.push(1, Verdict::deferred(async { Ok(false) }));
        assert!(join.has_pending());

        let settled = join.settle().await;
        assert_eq!(settled.first_failure(), Some(1));
        assert!(settled.rejections().is_empty());
    }
}

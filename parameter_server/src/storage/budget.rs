use std::sync::atomic::{AtomicUsize, Ordering};

use comms::specs::server::DEFAULT_MAX_ERRORS;

/// How the hosting layer should react to a failed update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Escalation {
    /// Only the triggering request failed, the service keeps running.
    Recoverable,
    /// The service can no longer be trusted and has to be restarted from outside.
    Fatal,
}

/// A bounded failure counter acting as a circuit breaker.
///
/// The counter only grows, it's reset by restarting the process. Up to `max_errors`
/// failures are tolerated, every failure past that is fatal.
#[derive(Debug)]
pub struct ErrorBudget {
    failures: AtomicUsize,
    max_errors: usize,
}

impl Default for ErrorBudget {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ERRORS)
    }
}

impl ErrorBudget {
    /// Creates a new `ErrorBudget`.
    ///
    /// # Arguments
    /// * `max_errors` - The amount of failures tolerated before escalating.
    ///
    /// # Returns
    /// A new `ErrorBudget` instance.
    pub fn new(max_errors: usize) -> Self {
        Self {
            failures: AtomicUsize::new(0),
            max_errors,
        }
    }

    /// Counts a new failure.
    ///
    /// # Returns
    /// `Escalation::Fatal` if this failure pushed the counter past the threshold.
    pub fn record_failure(&self) -> Escalation {
        let failures = self.failures.fetch_add(1, Ordering::AcqRel) + 1;

        if failures > self.max_errors {
            Escalation::Fatal
        } else {
            Escalation::Recoverable
        }
    }

    /// The amount of failures counted so far.
    pub fn failures(&self) -> usize {
        self.failures.load(Ordering::Acquire)
    }

    pub fn max_errors(&self) -> usize {
        self.max_errors
    }

    /// Whether the threshold was already crossed.
    pub fn is_exhausted(&self) -> bool {
        self.failures() > self.max_errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_failures_are_tolerated() {
        let budget = ErrorBudget::default();

        for _ in 0..10 {
            assert_eq!(budget.record_failure(), Escalation::Recoverable);
        }

        assert_eq!(budget.failures(), 10);
        assert!(!budget.is_exhausted());

        assert_eq!(budget.record_failure(), Escalation::Fatal);
        assert!(budget.is_exhausted());

        // It never recovers on its own.
        assert_eq!(budget.record_failure(), Escalation::Fatal);
        assert_eq!(budget.failures(), 12);
    }

    #[test]
    fn zero_budget_escalates_immediately() {
        let budget = ErrorBudget::new(0);
        assert_eq!(budget.record_failure(), Escalation::Fatal);
    }
}

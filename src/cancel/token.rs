//! At-most-once cancellation cleanup actions.

use core::fmt;

/// A suspended cancellation action, executed at most once.
///
/// A token represents "perform cancellation cleanup now". At-most-once
/// execution is structural: running a token consumes it, and the owning
/// [`CancelChain`](super::CancelChain) removes a token from its stack before
/// invoking it.
///
/// Cleanup that must itself suspend should capture a
/// [`Scheduler`](crate::runtime::Scheduler) handle and submit follow-up work
/// through it.
pub struct CancelToken {
    action: Box<dyn FnOnce() + Send>,
}

impl CancelToken {
    /// Creates a token from a cleanup action.
    #[must_use]
    pub fn new(action: impl FnOnce() + Send + 'static) -> Self {
        Self {
            action: Box::new(action),
        }
    }

    /// Creates a token that does nothing when run.
    #[must_use]
    pub fn noop() -> Self {
        Self::new(|| {})
    }

    /// Runs the cleanup action, consuming the token.
    pub(crate) fn run(self) {
        (self.action)();
    }
}

impl fmt::Debug for CancelToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelToken").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::init_test_logging;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn run_consumes_and_fires_once() {
        init_test("run_consumes_and_fires_once");
        let fired = Arc::new(AtomicUsize::new(0));
        let token = CancelToken::new({
            let fired = Arc::clone(&fired);
            move || {
                fired.fetch_add(1, Ordering::SeqCst);
            }
        });
        token.run();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        crate::test_complete!("run_consumes_and_fires_once");
    }

    #[test]
    fn noop_token_runs() {
        init_test("noop_token_runs");
        CancelToken::noop().run();
        crate::test_complete!("noop_token_runs");
    }
}

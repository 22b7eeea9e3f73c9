//! The execution context threaded through every suspension boundary.
//!
//! [`Cx`] is an immutable snapshot bundling the cancellation chain, the
//! runtime options, and the scheduler handle. It is threaded as an explicit
//! value through the run loop, never captured from a thread-local, and is
//! replaced wholesale, never mutated in place, when a region needs a
//! different chain or options. The original snapshot is what outer
//! continuations close over, so exiting a region restores it by
//! construction.
//!
//! # Invariant
//!
//! At any point in the run loop, exactly one `Cx` is current for a given
//! logical fiber. Derived snapshots are owned by the region that created
//! them.

use crate::cancel::CancelChain;
use crate::runtime::Scheduler;
use crate::types::Options;
use core::fmt;
use std::sync::Arc;

/// An immutable execution-context snapshot.
///
/// Cheaply clonable; clones share the same chain and scheduler. The
/// derivation methods return a new snapshot with the untouched fields
/// shared.
#[derive(Clone)]
pub struct Cx {
    chain: Arc<CancelChain>,
    options: Options,
    scheduler: Arc<dyn Scheduler>,
}

impl Cx {
    /// Creates a context with a fresh cancelable chain and default options.
    #[must_use]
    pub fn new(scheduler: Arc<dyn Scheduler>) -> Self {
        Self {
            chain: Arc::new(CancelChain::new()),
            options: Options::default(),
            scheduler,
        }
    }

    /// Creates a context backed by a lab scheduler, for tests.
    #[must_use]
    pub fn for_testing() -> Self {
        Self::new(Arc::new(crate::lab::LabScheduler::new()))
    }

    /// Returns the cancellation chain of this context.
    #[must_use]
    pub fn chain(&self) -> Arc<CancelChain> {
        Arc::clone(&self.chain)
    }

    /// Returns the options in effect.
    #[must_use]
    pub fn options(&self) -> Options {
        self.options
    }

    /// Returns the scheduler handle.
    #[must_use]
    pub fn scheduler(&self) -> Arc<dyn Scheduler> {
        Arc::clone(&self.scheduler)
    }

    /// Returns a new context with the given chain; other fields shared.
    #[must_use]
    pub fn with_chain(&self, chain: Arc<CancelChain>) -> Self {
        Self {
            chain,
            options: self.options,
            scheduler: Arc::clone(&self.scheduler),
        }
    }

    /// Returns a new context with the given options; other fields shared.
    #[must_use]
    pub fn with_options(&self, options: Options) -> Self {
        Self {
            chain: Arc::clone(&self.chain),
            options,
            scheduler: Arc::clone(&self.scheduler),
        }
    }
}

impl fmt::Debug for Cx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cx")
            .field("chain", &self.chain)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lab::LabScheduler;
    use crate::test_utils::init_test_logging;

    fn init_test(test_name: &str) {
        init_test_logging();
        crate::test_phase!(test_name);
    }

    #[test]
    fn with_chain_shares_untouched_fields() {
        init_test("with_chain_shares_untouched_fields");
        let cx = Cx::for_testing().with_options(Options::default().enable_local_context());
        let replacement = Arc::new(CancelChain::uncancelable());
        let derived = cx.with_chain(Arc::clone(&replacement));

        assert!(Arc::ptr_eq(&derived.chain(), &replacement));
        assert_eq!(derived.options(), cx.options());
        // The original snapshot is untouched.
        assert!(!Arc::ptr_eq(&cx.chain(), &replacement));
        crate::test_complete!("with_chain_shares_untouched_fields");
    }

    #[test]
    fn with_options_keeps_chain_identity() {
        init_test("with_options_keeps_chain_identity");
        let scheduler = Arc::new(LabScheduler::new());
        let cx = Cx::new(scheduler);
        let derived = cx.with_options(cx.options().without_auto_cancel());

        assert!(Arc::ptr_eq(&cx.chain(), &derived.chain()));
        assert!(!derived.options().auto_cancelable_run_loops);
        assert!(cx.options().auto_cancelable_run_loops);
        crate::test_complete!("with_options_keeps_chain_identity");
    }
}

//! The three-way completion protocol and its single-fire guard.
//!
//! A [`Callback`] is the sink a region delivers into: exactly one of
//! `on_success`, `on_error`, or `on_termination` is observed by the ultimate
//! consumer across the lifetime of one logical execution.
//!
//! [`ProtectedCallback`] enforces that contract when two independent actors
//! race to decide the outcome. The winner is chosen by a
//! [`RaceArbiter`](crate::cancel::RaceArbiter) compare-and-swap; the winning
//! delivery is submitted to the scheduler's work queue (never invoked inline)
//! and the losing signal follows the asymmetric rule:
//!
//! - a losing success is dropped silently (a discarded value needs no
//!   reporting)
//! - a losing typed error or defect is rerouted to the scheduler's failure
//!   sink; it represents real work that produced a real failure, and
//!   silently dropping failures is unacceptable
//!
//! The asymmetry is part of the observable contract; tests depend on it.

use crate::cancel::RaceArbiter;
use crate::error::Defect;
use crate::runtime::Scheduler;
use crate::tracing_compat::{debug, trace};
use crate::types::Outcome;
use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// The three-way completion sink.
///
/// Implementors receive exactly one of the three signals. A plain
/// `FnOnce(Outcome<T, E>)` closure is a callback via the blanket impl.
pub trait Callback<T, E>: Send {
    /// Delivers a successful value.
    fn on_success(self: Box<Self>, value: T);

    /// Delivers a typed domain error.
    fn on_error(self: Box<Self>, error: E);

    /// Delivers a fatal defect.
    fn on_termination(self: Box<Self>, defect: Defect);

    /// Delivers any outcome by dispatching to the matching signal.
    fn on_outcome(self: Box<Self>, outcome: Outcome<T, E>) {
        match outcome {
            Outcome::Ok(value) => self.on_success(value),
            Outcome::Err(error) => self.on_error(error),
            Outcome::Terminated(defect) => self.on_termination(defect),
        }
    }
}

/// A boxed callback.
pub type BoxCallback<T, E> = Box<dyn Callback<T, E>>;

impl<T, E, F> Callback<T, E> for F
where
    F: FnOnce(Outcome<T, E>) + Send,
{
    fn on_success(self: Box<Self>, value: T) {
        self(Outcome::Ok(value));
    }

    fn on_error(self: Box<Self>, error: E) {
        self(Outcome::Err(error));
    }

    fn on_termination(self: Box<Self>, defect: Defect) {
        self(Outcome::Terminated(defect));
    }
}

/// A cloneable, single-fire guard around a callback.
///
/// All clones share one [`RaceArbiter`] and one underlying callback slot.
/// Whichever actor claims the arbiter first delivers exactly once; every
/// other signal is handled by the asymmetric lost-signal rule.
pub struct ProtectedCallback<T, E> {
    inner: Arc<ProtectedInner<T, E>>,
}

struct ProtectedInner<T, E> {
    arbiter: Arc<RaceArbiter>,
    slot: Mutex<Option<BoxCallback<T, E>>>,
    scheduler: Arc<dyn Scheduler>,
}

impl<T, E> Clone for ProtectedCallback<T, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T, E> ProtectedCallback<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    /// Wraps a callback with a fresh arbiter.
    #[must_use]
    pub fn new(callback: BoxCallback<T, E>, scheduler: Arc<dyn Scheduler>) -> Self {
        Self::with_arbiter(callback, scheduler, Arc::new(RaceArbiter::new()))
    }

    /// Wraps a callback sharing an existing arbiter.
    ///
    /// Used when another actor (such as a cancellation token) participates in
    /// the same race and needs to claim the arbiter itself before delivering.
    #[must_use]
    pub fn with_arbiter(
        callback: BoxCallback<T, E>,
        scheduler: Arc<dyn Scheduler>,
        arbiter: Arc<RaceArbiter>,
    ) -> Self {
        Self {
            inner: Arc::new(ProtectedInner {
                arbiter,
                slot: Mutex::new(Some(callback)),
                scheduler,
            }),
        }
    }

    /// Attempts to claim the arbiter.
    pub fn try_claim(&self) -> bool {
        self.inner.arbiter.try_claim()
    }

    /// Claims the arbiter and delivers, or applies the lost-signal rule.
    pub fn complete(&self, outcome: Outcome<T, E>) {
        if self.try_claim() {
            self.deliver(outcome);
        } else {
            self.report_lost(outcome);
        }
    }

    /// Delivers an outcome after the caller has already claimed the arbiter.
    ///
    /// Delivery is trampolined: the callback invocation is submitted to the
    /// scheduler's work queue, even when the computation completed
    /// synchronously.
    pub fn deliver(&self, outcome: Outcome<T, E>) {
        let Some(callback) = self.inner.slot.lock().take() else {
            // Claimed twice means an arbiter misuse upstream; surface it.
            self.inner
                .scheduler
                .report_failure(Defect::new("result delivered twice through one callback"));
            return;
        };
        trace!(severity = outcome.severity(), "delivering outcome");
        self.inner
            .scheduler
            .execute(Box::new(move || callback.on_outcome(outcome)));
    }

    /// Applies the asymmetric lost-signal rule to an outcome that lost the
    /// race.
    pub fn report_lost(&self, outcome: Outcome<T, E>) {
        match outcome {
            Outcome::Ok(_) => {
                trace!("dropping successful value that lost the race");
            }
            Outcome::Err(error) => {
                debug!("rerouting typed error that lost the race to the failure sink");
                self.inner
                    .scheduler
                    .report_failure(Defect::lost_error(format!("{error:?}")));
            }
            Outcome::Terminated(defect) => {
                debug!("rerouting defect that lost the race to the failure sink");
                self.inner.scheduler.report_failure(defect);
            }
        }
    }
}

impl<T, E> fmt::Debug for ProtectedCallback<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProtectedCallback")
            .field("decided", &self.inner.arbiter.is_decided())
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

    fn collector() -> (
        Arc<Mutex<Vec<Outcome<i32, &'static str>>>>,
        BoxCallback<i32, &'static str>,
    ) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let cb: BoxCallback<i32, &'static str> = {
            let seen = Arc::clone(&seen);
            Box::new(move |outcome: Outcome<i32, &'static str>| {
                seen.lock().push(outcome);
            })
        };
        (seen, cb)
    }

    #[test]
    fn first_complete_delivers_via_trampoline() {
        init_test("first_complete_delivers_via_trampoline");
        let scheduler = LabScheduler::new();
        let (seen, cb) = collector();
        let protected = ProtectedCallback::new(cb, Arc::new(scheduler.clone()));

        protected.complete(Outcome::Ok(42));
        // Not yet delivered: the invocation sits on the scheduler queue.
        assert!(seen.lock().is_empty());
        scheduler.run_until_idle();
        assert_eq!(*seen.lock(), vec![Outcome::Ok(42)]);
        crate::test_complete!("first_complete_delivers_via_trampoline");
    }

    #[test]
    fn losing_success_is_dropped_silently() {
        init_test("losing_success_is_dropped_silently");
        let scheduler = LabScheduler::new();
        let (seen, cb) = collector();
        let protected = ProtectedCallback::new(cb, Arc::new(scheduler.clone()));

        protected.complete(Outcome::Err("first"));
        protected.complete(Outcome::Ok(9));
        scheduler.run_until_idle();

        assert_eq!(*seen.lock(), vec![Outcome::Err("first")]);
        assert!(scheduler.failures().is_empty());
        crate::test_complete!("losing_success_is_dropped_silently");
    }

    #[test]
    fn losing_error_reaches_failure_sink() {
        init_test("losing_error_reaches_failure_sink");
        let scheduler = LabScheduler::new();
        let (seen, cb) = collector();
        let protected = ProtectedCallback::new(cb, Arc::new(scheduler.clone()));

        protected.complete(Outcome::Ok(1));
        protected.complete(Outcome::Err("late"));
        protected.complete(Outcome::Terminated(Defect::new("late defect")));
        scheduler.run_until_idle();

        assert_eq!(*seen.lock(), vec![Outcome::Ok(1)]);
        let failures = scheduler.failures();
        assert_eq!(failures.len(), 2);
        assert!(failures[0].message().contains("late"));
        assert_eq!(failures[1].message(), "late defect");
        crate::test_complete!("losing_error_reaches_failure_sink");
    }

    #[test]
    fn closure_callback_dispatches_signals() {
        init_test("closure_callback_dispatches_signals");
        let (seen, cb) = collector();
        cb.on_error("boom");
        assert_eq!(*seen.lock(), vec![Outcome::Err("boom")]);
        crate::test_complete!("closure_callback_dispatches_signals");
    }
}

//! The cancel-raises-error operator: race a region against cancellation.

use super::{BoxRegion, Region};
use crate::callback::{BoxCallback, Callback, ProtectedCallback};
use crate::cancel::{CancelChain, CancelToken, RaceArbiter};
use crate::cx::Cx;
use crate::error::Defect;
use crate::tracing_compat::{debug, trace};
use crate::types::Outcome;
use core::fmt;
use std::sync::Arc;

/// Races a region against external cancellation of the ambient chain,
/// raising `error` if cancellation wins.
///
/// The region runs under a dedicated child chain; a token registered on the
/// outer chain arbitrates against the region's natural completion through a
/// shared [`RaceArbiter`]. Exactly one of the two reaches the outer
/// callback:
///
/// - **Natural completion wins**: the token is popped from the outer chain
///   (so a later genuine cancel cannot re-fire it) and the real outcome is
///   delivered.
/// - **Cancellation wins**: cancellation propagates into the child chain, the
///   outer chain is reactivated, and `on_error(error)` is delivered. The
///   cancellation the outer chain just observed was synthetic, generated by
///   this region's own token, so the chain must appear alive for subsequent
///   steps.
///
/// The losing path's signal follows the asymmetric lost-signal rule of the
/// callback protocol. At the callback boundary the raised error is
/// indistinguishable from any other typed error.
#[must_use]
pub fn cancel_raise<T, E>(inner: BoxRegion<T, E>, error: E) -> BoxRegion<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    Box::new(CancelRaise { inner, error })
}

struct CancelRaise<T, E> {
    inner: BoxRegion<T, E>,
    error: E,
}

impl<T, E> Region<T, E> for CancelRaise<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    fn run(self: Box<Self>, cx: &Cx, cb: BoxCallback<T, E>) {
        let Self { inner, error } = *self;
        let arbiter = Arc::new(RaceArbiter::new());
        let child = Arc::new(CancelChain::new());
        let outer = cx.chain();
        let protected = ProtectedCallback::with_arbiter(cb, cx.scheduler(), Arc::clone(&arbiter));

        let token = CancelToken::new({
            let arbiter = Arc::clone(&arbiter);
            let child = Arc::clone(&child);
            let outer = Arc::clone(&outer);
            let protected = protected.clone();
            move || {
                if arbiter.try_claim() {
                    debug!("cancellation won the race; raising typed error");
                    child.cancel();
                    let reactivated = outer.try_reactivate();
                    trace!(reactivated, "synthetic cancellation absorbed");
                    protected.deliver(Outcome::Err(error));
                } else {
                    trace!("cancellation lost the race; token is a no-op");
                }
            }
        });
        outer.push(token);

        let child_cx = cx.with_chain(child);
        inner.run(&child_cx, Box::new(RaceCompletion { outer, protected }));
    }
}

/// The natural-completion side of the race.
struct RaceCompletion<T, E> {
    outer: Arc<CancelChain>,
    protected: ProtectedCallback<T, E>,
}

impl<T, E> RaceCompletion<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    fn settle(self: Box<Self>, outcome: Outcome<T, E>) {
        if self.protected.try_claim() {
            // Remove this region's token so a later genuine cancel of the
            // outer chain does not re-fire it.
            let _ = self.outer.pop();
            trace!(
                severity = outcome.severity(),
                "natural completion won the race"
            );
            self.protected.deliver(outcome);
        } else {
            self.protected.report_lost(outcome);
        }
    }
}

impl<T, E> Callback<T, E> for RaceCompletion<T, E>
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
{
    fn on_success(self: Box<Self>, value: T) {
        self.settle(Outcome::Ok(value));
    }

    fn on_error(self: Box<Self>, error: E) {
        self.settle(Outcome::Err(error));
    }

    fn on_termination(self: Box<Self>, defect: Defect) {
        self.settle(Outcome::Terminated(defect));
    }
}

//! The uncancelable operator: mask a region from the ambient chain.

use super::{BoxRegion, Region};
use crate::callback::{BoxCallback, Callback};
use crate::cancel::CancelChain;
use crate::cx::Cx;
use crate::error::Defect;
use crate::runtime::Scheduler;
use crate::tracing_compat::trace;
use crate::types::Outcome;
use std::sync::Arc;

/// Masks a region from the ambient cancellation chain.
///
/// The inner region runs under a derived context whose chain is the
/// uncancelable variant and whose options have automatic cancelable
/// checkpoints forced off. No cancellation request issued while the inner
/// region executes can stop or observably affect it. On completion (success,
/// typed error, or defect alike) the outcome is forwarded unchanged to the
/// outer callback via the trampoline, with the prior chain and options back
/// in effect: the ambient cancellation state after the region is exactly what
/// it was before, including remaining cancelled if the outer chain was
/// already cancelled at entry.
#[must_use]
pub fn uncancelable<T, E>(inner: BoxRegion<T, E>) -> BoxRegion<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    Box::new(Uncancelable { inner })
}

struct Uncancelable<T, E> {
    inner: BoxRegion<T, E>,
}

impl<T, E> Region<T, E> for Uncancelable<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn run(self: Box<Self>, cx: &Cx, cb: BoxCallback<T, E>) {
        trace!("entering uncancelable region");
        let masked = cx
            .with_chain(Arc::new(CancelChain::uncancelable()))
            .with_options(cx.options().without_auto_cancel());
        let restore = RestoreOnExit {
            scheduler: cx.scheduler(),
            cb,
        };
        self.inner.run(&masked, Box::new(restore));
    }
}

/// Forwards the masked region's outcome once the prior context is back in
/// effect.
///
/// The masked snapshot dies with the region; the outer continuation closed
/// over the original context, so restoration is structural. The forwarding
/// hop goes through the scheduler queue to bound stack depth across nested
/// regions.
struct RestoreOnExit<T, E> {
    scheduler: Arc<dyn Scheduler>,
    cb: BoxCallback<T, E>,
}

impl<T, E> RestoreOnExit<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    fn settle(self: Box<Self>, outcome: Outcome<T, E>) {
        trace!(
            severity = outcome.severity(),
            "uncancelable region completed; restoring outer context"
        );
        let Self { scheduler, cb } = *self;
        scheduler.execute(Box::new(move || cb.on_outcome(outcome)));
    }
}

impl<T, E> Callback<T, E> for RestoreOnExit<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
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

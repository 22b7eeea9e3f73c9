//! Region operators and run-loop entry points.
//!
//! A [`Region`] is a scoped sub-execution handed to this crate by the
//! surrounding run loop: it is started under an execution context and
//! completes through a callback, never by returning a value. The two
//! operators rewrite the context a region runs under:
//!
//! - [`uncancelable`]: masks the region from the ambient cancellation chain
//! - [`cancel_raise`]: races the region against external cancellation,
//!   raising a typed error if cancellation wins
//!
//! [`run_async`] is the public entry point for foreign effect adapters; it
//! wraps the supplied completion function in a
//! [`ProtectedCallback`](crate::callback::ProtectedCallback) so external
//! callers cannot bypass the single-resolution guarantee.

pub mod cancel_raise;
pub mod uncancelable;

pub use cancel_raise::cancel_raise;
pub use uncancelable::uncancelable;

use crate::callback::{BoxCallback, ProtectedCallback};
use crate::cx::Cx;
use crate::types::{Options, Outcome};
use core::fmt;

/// A scoped sub-execution with callback-driven completion.
///
/// A plain `FnOnce(&Cx, BoxCallback<T, E>)` closure is a region via the
/// blanket impl.
pub trait Region<T, E>: Send {
    /// Starts the region under the given context.
    ///
    /// Completion is delivered through `cb`; this call does not return a
    /// value.
    fn run(self: Box<Self>, cx: &Cx, cb: BoxCallback<T, E>);
}

/// A boxed region.
pub type BoxRegion<T, E> = Box<dyn Region<T, E>>;

impl<T, E, F> Region<T, E> for F
where
    F: FnOnce(&Cx, BoxCallback<T, E>) + Send,
{
    fn run(self: Box<Self>, cx: &Cx, cb: BoxCallback<T, E>) {
        self(cx, cb);
    }
}

/// Runs a region under a context, delivering through the given callback.
///
/// Used identically by both operators; exposed for the surrounding run loop.
pub fn run_region<T, E>(region: BoxRegion<T, E>, cx: &Cx, cb: BoxCallback<T, E>) {
    region.run(cx, cb);
}

/// Public `runAsync`-style entry point for foreign effect adapters.
///
/// The completion function is wrapped in a protected callback, so even an
/// adapter that signals more than once cannot deliver twice; late failures
/// reach the scheduler's failure sink per the lost-signal rule.
pub fn run_async<T, E, F>(region: BoxRegion<T, E>, cx: &Cx, on_complete: F)
where
    T: Send + 'static,
    E: fmt::Debug + Send + 'static,
    F: FnOnce(Outcome<T, E>) + Send + 'static,
{
    let protected = ProtectedCallback::new(Box::new(on_complete), cx.scheduler());
    region.run(
        cx,
        Box::new(move |outcome: Outcome<T, E>| protected.complete(outcome)),
    );
}

/// Introspection region: succeeds immediately with the [`Options`] in effect
/// at the point it runs.
///
/// Reading the current execution context is how callers observe options
/// propagation end-to-end.
#[must_use]
pub fn read_options<E>() -> BoxRegion<Options, E>
where
    E: Send + 'static,
{
    Box::new(move |cx: &Cx, cb: BoxCallback<Options, E>| {
        cb.on_success(cx.options());
    })
}

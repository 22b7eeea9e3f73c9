//! Quell: cancellation arbitration core for a typed-effect async runtime.
//!
//! # Overview
//!
//! Quell is the piece of a task runtime that decides who gets to finish: the
//! computation that ran to its natural end, or an asynchronous cancellation
//! request that arrived while it was in flight. It provides two region
//! operators and the execution context they rewrite:
//!
//! - [`uncancelable`](combinator::uncancelable): masks a sub-computation from
//!   the ambient cancellation chain entirely.
//! - [`cancel_raise`](combinator::cancel_raise): races a sub-computation
//!   against external cancellation, resolving a lost race into a typed
//!   domain error.
//!
//! # Core Guarantees
//!
//! - **Exactly-once delivery**: for every region, the outer callback observes
//!   exactly one completion signal, arbitrated by a single atomic
//!   compare-and-swap
//! - **No silent error drops**: typed errors and defects that lose a race are
//!   rerouted to the scheduler's failure sink; only losing successes are
//!   discarded
//! - **Faithful restoration**: nested regions compose; the outer cancellation
//!   state after a region is exactly what it was before
//! - **Non-blocking cancellation**: requesting cancellation never waits for
//!   the cancelled computation, and the cancel path takes no blocking locks
//!   around user code
//!
//! # Module Structure
//!
//! - [`types`]: Core vocabulary types ([`Options`], [`Outcome`])
//! - [`cancel`]: Cancellation chain, tokens, and the race arbiter
//! - [`callback`]: The three-way completion protocol and its single-fire guard
//! - [`cx`]: The execution context threaded through every suspension
//! - [`runtime`]: The scheduler handle boundary
//! - [`combinator`]: Region operators and the `run_async` entry point
//! - [`lab`]: Deterministic scheduler for testing
//! - [`error`]: Defects and configuration errors

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::module_name_repetitions)]

pub mod callback;
pub mod cancel;
pub mod combinator;
pub mod cx;
pub mod error;
pub mod lab;
pub mod runtime;
pub mod tracing_compat;
pub mod types;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-exports for convenient access to core types
pub use callback::{BoxCallback, Callback, ProtectedCallback};
pub use cancel::{CancelChain, CancelToken, RaceArbiter};
pub use combinator::{
    cancel_raise, read_options, run_async, run_region, uncancelable, BoxRegion, Region,
};
pub use cx::Cx;
pub use error::{ConfigError, Defect};
pub use lab::LabScheduler;
pub use runtime::{Scheduler, SchedulerFeatures, Work};
pub use types::{Failure, Options, Outcome};

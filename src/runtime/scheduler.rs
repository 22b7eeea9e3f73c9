//! Scheduler handle trait and capability flags.

use crate::error::Defect;

/// A unit of work submitted for trampolined execution.
pub type Work = Box<dyn FnOnce() + Send>;

/// The scheduler handle every execution context carries.
///
/// Three concerns meet here:
///
/// - [`execute`](Self::execute): terminal callback deliveries are submitted
///   to the scheduler's work queue rather than invoked on the triggering call
///   stack. This bounds stack depth across arbitrarily nested regions and
///   removes the reentrancy hazard of a callback running inside `cancel()`.
/// - [`report_failure`](Self::report_failure): the global sink for errors and
///   defects that lost a completion race and cannot be delivered. The sink is
///   carried in the handle, not read from a process-wide singleton.
/// - [`features`](Self::features): capability flags that let the same logical
///   [`Options`](crate::types::Options) value behave differently depending on
///   which scheduler is supplied at the call site.
pub trait Scheduler: Send + Sync {
    /// Submits a unit of work to the scheduler's queue.
    fn execute(&self, work: Work);

    /// Reports a failure that could not be delivered through a callback.
    fn report_failure(&self, defect: Defect);

    /// Returns the capability flags this scheduler advertises.
    fn features(&self) -> SchedulerFeatures {
        SchedulerFeatures::NONE
    }
}

/// Capability flags advertised by a scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SchedulerFeatures {
    /// Whether the scheduler supports local-context tracing.
    pub local_context_tracing: bool,
}

impl SchedulerFeatures {
    /// No capabilities.
    pub const NONE: Self = Self {
        local_context_tracing: false,
    };

    /// Local-context tracing supported.
    pub const TRACING: Self = Self {
        local_context_tracing: true,
    };
}

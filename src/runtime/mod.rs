//! The scheduler handle boundary.
//!
//! The general run-loop and the scheduler implementations live outside this
//! crate; [`Scheduler`] is the interface the cancellation core requires of
//! them: trampolined work submission, an explicit failure sink, and a
//! capability query.

pub mod scheduler;

pub use scheduler::{Scheduler, SchedulerFeatures, Work};

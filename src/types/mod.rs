//! Core vocabulary types for the cancellation core.
//!
//! - [`options`]: Immutable runtime feature flags with environment overrides
//! - [`outcome`]: Three-valued completion type (success / typed error / defect)

pub mod options;
pub mod outcome;

pub use options::{Options, ENV_AUTO_CANCELABLE_RUN_LOOPS, ENV_LOCAL_CONTEXT_PROPAGATION};
pub use outcome::{Failure, Outcome};

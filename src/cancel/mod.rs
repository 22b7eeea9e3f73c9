//! Cancellation chain, tokens, and the race arbiter.
//!
//! Cancellation in quell is arbitration, not a silent drop. This module
//! provides the three pieces the region operators are built from:
//!
//! - [`CancelToken`]: an at-most-once cleanup action
//! - [`CancelChain`]: a per-execution LIFO stack of tokens with idempotent
//!   cancel semantics and an uncancelable variant
//! - [`RaceArbiter`]: the atomic flag that decides which of two completion
//!   sources gets to deliver a result
//!
//! The chain and the arbiter are the only racily-accessed state in the
//! crate; everything else is immutable snapshots.

pub mod arbiter;
pub mod chain;
pub mod token;

pub use arbiter::RaceArbiter;
pub use chain::CancelChain;
pub use token::CancelToken;

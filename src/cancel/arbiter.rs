//! Single-resolution race arbiter.

use std::sync::atomic::{AtomicBool, Ordering};

/// The atomic flag that decides which of two independent completion sources
/// gets to deliver a result.
///
/// The flag starts "unclaimed". Any actor that wants to deliver performs a
/// compare-and-swap via [`try_claim`](Self::try_claim); the single winner may
/// deliver exactly once, losers must not deliver. The CAS is the sole
/// linearization point between the natural completion of a computation and an
/// asynchronous cancellation request; no other synchronization is needed
/// between the two actors.
///
/// The arbiter is deliberately use-site agnostic: anywhere two completion
/// sources must agree on exactly one outcome, share one `RaceArbiter` rather
/// than duplicating the flag logic.
#[derive(Debug)]
pub struct RaceArbiter {
    unclaimed: AtomicBool,
}

impl RaceArbiter {
    /// Creates a fresh, unclaimed arbiter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            unclaimed: AtomicBool::new(true),
        }
    }

    /// Attempts to claim the right to deliver the result.
    ///
    /// Returns `true` for exactly one caller across the arbiter's lifetime.
    pub fn try_claim(&self) -> bool {
        self.unclaimed
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns true if some actor has already claimed the result.
    #[must_use]
    pub fn is_decided(&self) -> bool {
        !self.unclaimed.load(Ordering::Acquire)
    }
}

impl Default for RaceArbiter {
    fn default() -> Self {
        Self::new()
    }
}

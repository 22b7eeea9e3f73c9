//! Per-execution cancellation token chain.

use super::token::CancelToken;
use crate::tracing_compat::trace;
use core::fmt;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::sync::atomic::{AtomicU8, Ordering};

/// Chain state values.
const ACTIVE: u8 = 0;
const CANCELLED: u8 = 1;

/// Whether the chain honors cancellation at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Cancelable,
    Uncancelable,
}

/// A mutable, per-execution stack of cancellation tokens with idempotent
/// cancel semantics.
///
/// The chain is the only structure in this crate mutated from more than one
/// logical actor: the owning fiber pushes and pops tokens, while an
/// asynchronous canceller may call [`cancel`](Self::cancel) at any moment.
/// The "first cancel wins" transition is a single compare-and-swap on an
/// atomic state byte; the token stack itself is guarded by a short
/// bookkeeping lock that is never held while a token runs, so cancellation
/// handlers may re-enter the chain from the cancelling thread.
///
/// # Pairing Discipline
///
/// Every region that pushes a token must pop it on every exit path. A token
/// left behind is a leaked handle that a later `cancel()` will still invoke.
///
/// # Uncancelable Variant
///
/// [`CancelChain::uncancelable`] ignores `cancel()` entirely: no tokens fire
/// and the chain never reports cancelled. Pushed tokens are discarded, since
/// nothing could ever run them.
pub struct CancelChain {
    state: AtomicU8,
    tokens: Mutex<SmallVec<[CancelToken; 4]>>,
    mode: Mode,
}

impl CancelChain {
    /// Creates a new, active, cancelable chain.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(ACTIVE),
            tokens: Mutex::new(SmallVec::new()),
            mode: Mode::Cancelable,
        }
    }

    /// Creates the distinguished uncancelable variant.
    #[must_use]
    pub fn uncancelable() -> Self {
        Self {
            state: AtomicU8::new(ACTIVE),
            tokens: Mutex::new(SmallVec::new()),
            mode: Mode::Uncancelable,
        }
    }

    /// Pushes a token onto the chain (LIFO).
    ///
    /// If the chain is already cancelled the token runs immediately: late
    /// registrations must still be cancelled, otherwise their cleanup would
    /// never happen. On the uncancelable variant the token is discarded.
    pub fn push(&self, token: CancelToken) {
        if self.mode == Mode::Uncancelable {
            return;
        }
        // The cancelled check happens under the bookkeeping lock: a
        // concurrent cancel() that has already set the flag will drain the
        // stack only after acquiring this lock, so a token pushed here is
        // either drained by that cancel or run immediately below, never both
        // and never neither.
        let late = {
            let mut tokens = self.tokens.lock();
            if self.is_cancelled() {
                Some(token)
            } else {
                tokens.push(token);
                None
            }
        };
        if let Some(token) = late {
            trace!("push on cancelled chain; running token immediately");
            token.run();
        }
    }

    /// Removes and returns the most recently pushed token without invoking
    /// it.
    ///
    /// Returns `None` if the chain holds no tokens (or is the uncancelable
    /// variant, which never retains any).
    pub fn pop(&self) -> Option<CancelToken> {
        self.tokens.lock().pop()
    }

    /// Cancels the chain.
    ///
    /// Idempotent: the first caller runs all pushed tokens in LIFO order and
    /// marks the chain cancelled; any later or concurrent call is a
    /// guaranteed no-op and does not re-run tokens. Tokens run on the calling
    /// thread with no lock held. The uncancelable variant ignores this
    /// entirely.
    pub fn cancel(&self) {
        if self.mode == Mode::Uncancelable {
            return;
        }
        if self
            .state
            .compare_exchange(ACTIVE, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            trace!("cancel on already-cancelled chain; no-op");
            return;
        }
        let mut drained = {
            let mut tokens = self.tokens.lock();
            std::mem::take(&mut *tokens)
        };
        trace!(tokens = drained.len(), "chain cancelled; running tokens");
        while let Some(token) = drained.pop() {
            token.run();
        }
    }

    /// Returns true if the chain has been cancelled.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.load(Ordering::Acquire) == CANCELLED
    }

    /// Clears the cancelled flag, returning true if the chain was cancelled.
    ///
    /// This is a narrow escape hatch for callers that themselves caused the
    /// cancellation as a side effect of losing an internal race. The chain
    /// cannot distinguish a synthetic cancellation from a genuine external
    /// one; the caller must be the sole reasoner about which case applies.
    /// Calling this after a genuine external cancel would incorrectly
    /// resurrect a chain its owner believes is dead.
    pub fn try_reactivate(&self) -> bool {
        if self.mode == Mode::Uncancelable {
            return false;
        }
        self.state
            .compare_exchange(CANCELLED, ACTIVE, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Returns the number of currently registered tokens.
    #[must_use]
    pub fn token_count(&self) -> usize {
        self.tokens.lock().len()
    }
}

impl Default for CancelChain {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CancelChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancelChain")
            .field("mode", &self.mode)
            .field("cancelled", &self.is_cancelled())
            .field("tokens", &self.token_count())
            .finish()
    }
}

//! Deterministic lab scheduler for testing.
//!
//! [`LabScheduler`] queues submitted work instead of running it, so a test
//! controls exactly when trampolined deliveries happen:
//!
//! - Drive the queue with [`tick`](LabScheduler::tick) or
//!   [`run_until_idle`](LabScheduler::run_until_idle)
//! - Inspect everything routed to the failure sink via
//!   [`failures`](LabScheduler::failures)
//! - Advertise capabilities with
//!   [`with_features`](LabScheduler::with_features)
//!
//! The queue is thread-safe: cancellation requests (and the deliveries they
//! trigger) may arrive from other threads, and all clones of a handle share
//! the same state.

use crate::error::Defect;
use crate::runtime::{Scheduler, SchedulerFeatures, Work};
use core::fmt;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

/// A deterministic FIFO scheduler with a recorded failure sink.
#[derive(Clone)]
pub struct LabScheduler {
    inner: Arc<LabInner>,
}

struct LabInner {
    queue: Mutex<VecDeque<Work>>,
    failures: Mutex<Vec<Defect>>,
    features: SchedulerFeatures,
}

impl LabScheduler {
    /// Creates a scheduler with no advertised capabilities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_features(SchedulerFeatures::NONE)
    }

    /// Creates a scheduler advertising the given capabilities.
    #[must_use]
    pub fn with_features(features: SchedulerFeatures) -> Self {
        Self {
            inner: Arc::new(LabInner {
                queue: Mutex::new(VecDeque::new()),
                failures: Mutex::new(Vec::new()),
                features,
            }),
        }
    }

    /// Runs the next queued unit of work, if any.
    ///
    /// The work runs with no lock held; work that submits further work is
    /// fine.
    pub fn tick(&self) -> bool {
        let work = self.inner.queue.lock().pop_front();
        match work {
            Some(work) => {
                work();
                true
            }
            None => false,
        }
    }

    /// Runs queued work until the queue is empty; returns how many units ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.tick() {
            ran += 1;
        }
        ran
    }

    /// Returns the number of queued units of work.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.queue.lock().len()
    }

    /// Returns a snapshot of everything routed to the failure sink.
    #[must_use]
    pub fn failures(&self) -> Vec<Defect> {
        self.inner.failures.lock().clone()
    }
}

impl Default for LabScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler for LabScheduler {
    fn execute(&self, work: Work) {
        self.inner.queue.lock().push_back(work);
    }

    fn report_failure(&self, defect: Defect) {
        self.inner.failures.lock().push(defect);
    }

    fn features(&self) -> SchedulerFeatures {
        self.inner.features
    }
}

impl fmt::Debug for LabScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LabScheduler")
            .field("pending", &self.pending())
            .field("failures", &self.failures().len())
            .field("features", &self.inner.features)
            .finish()
    }
}

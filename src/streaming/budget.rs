//! Per-frame job budget for the streaming dispatcher
//!
//! The job cap is the only backpressure mechanism: it bounds the work done in
//! one frame at the cost of catch-up latency when the viewer moves fast.

/// Job budget for one dispatch pass
pub struct FrameBudget {
    /// Maximum jobs to execute this frame
    max_jobs: usize,
    /// Jobs executed so far this frame
    used: usize,
}

impl FrameBudget {
    /// Create a budget allowing `max_jobs` executed jobs per frame
    pub fn new(max_jobs: usize) -> Self {
        Self { max_jobs, used: 0 }
    }

    // --- Tracking methods ---

    /// Record one executed job
    pub fn consume(&mut self) {
        self.used = self.used.saturating_add(1);
    }

    /// Start a new frame
    pub fn reset(&mut self) {
        self.used = 0;
    }

    // --- Query methods ---

    /// Jobs executed this frame
    pub fn used(&self) -> usize {
        self.used
    }

    /// Jobs still allowed this frame
    pub fn remaining(&self) -> usize {
        self.max_jobs.saturating_sub(self.used)
    }

    /// Maximum jobs per frame
    pub fn max_jobs(&self) -> usize {
        self.max_jobs
    }

    // --- Decision methods ---

    /// Whether another job may run this frame
    pub fn has_capacity(&self) -> bool {
        self.used < self.max_jobs
    }
}

//! Streaming diagnostics
//!
//! Job durations are kept in short rolling windows per job category so the
//! host can show recent averages without unbounded history.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Samples kept per rolling window
pub const WINDOW_SIZE: usize = 10;

/// Category of a timed streaming job
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobCategory {
    /// Chunk produced by the terrain generator
    NewGenerate,
    /// Chunk read back from the store
    StoreLoad,
    /// Full-detail chunk unloaded
    Unload,
    /// Chunk loaded straight to coarse detail
    Lod1Generate,
    /// Resident chunk re-meshed at another LoD
    LodTransition,
    /// Coarse chunk unloaded
    Lod1Unload,
}

impl JobCategory {
    pub const ALL: [JobCategory; 6] = [
        JobCategory::NewGenerate,
        JobCategory::StoreLoad,
        JobCategory::Unload,
        JobCategory::Lod1Generate,
        JobCategory::LodTransition,
        JobCategory::Lod1Unload,
    ];

    const fn index(self) -> usize {
        self as usize
    }
}

/// Fixed-size window of recent durations
#[derive(Clone, Debug, Default)]
pub struct RollingWindow {
    samples: VecDeque<f32>,
}

impl RollingWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sample in milliseconds, evicting the oldest when full
    pub fn push(&mut self, ms: f32) {
        if self.samples.len() == WINDOW_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(ms);
    }

    /// Mean of the window, 0 when empty
    pub fn average(&self) -> f32 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().sum::<f32>() / self.samples.len() as f32
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

/// Mutable diagnostics owned by the streaming manager
#[derive(Clone, Debug, Default)]
pub struct StreamingDiagnostics {
    windows: [RollingWindow; 6],
    generated: u64,
    loaded: u64,
}

impl StreamingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, category: JobCategory, elapsed: Duration) {
        self.windows[category.index()].push(elapsed.as_secs_f32() * 1000.0);
    }

    pub fn count_generated(&mut self) {
        self.generated += 1;
    }

    pub fn count_loaded(&mut self) {
        self.loaded += 1;
    }

    pub fn window(&self, category: JobCategory) -> &RollingWindow {
        &self.windows[category.index()]
    }

    pub fn average_ms(&self, category: JobCategory) -> f32 {
        self.window(category).average()
    }

    pub fn generated(&self) -> u64 {
        self.generated
    }

    pub fn loaded(&self) -> u64 {
        self.loaded
    }

    /// Clear all windows and counters
    pub fn reset(&mut self) {
        for window in &mut self.windows {
            window.clear();
        }
        self.generated = 0;
        self.loaded = 0;
    }
}

/// Average job durations in milliseconds
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct JobTimings {
    pub new_generate_ms: f32,
    pub store_load_ms: f32,
    pub unload_ms: f32,
    pub lod1_generate_ms: f32,
    pub lod_transition_ms: f32,
    pub lod1_unload_ms: f32,
}

/// Point-in-time snapshot of streaming state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StreamingStats {
    /// Resident chunks
    pub loaded_chunks: usize,
    pub lod0_chunks: usize,
    pub lod1_chunks: usize,
    pub load_queue: usize,
    pub unload_queue: usize,
    pub rebuild_queue: usize,
    pub timings: JobTimings,
    /// Chunks produced by the generator since the last reset
    pub generated_total: u64,
    /// Chunks read from the store since the last reset
    pub loaded_total: u64,
}

impl JobTimings {
    pub fn from_diagnostics(diagnostics: &StreamingDiagnostics) -> Self {
        Self {
            new_generate_ms: diagnostics.average_ms(JobCategory::NewGenerate),
            store_load_ms: diagnostics.average_ms(JobCategory::StoreLoad),
            unload_ms: diagnostics.average_ms(JobCategory::Unload),
            lod1_generate_ms: diagnostics.average_ms(JobCategory::Lod1Generate),
            lod_transition_ms: diagnostics.average_ms(JobCategory::LodTransition),
            lod1_unload_ms: diagnostics.average_ms(JobCategory::Lod1Unload),
        }
    }
}

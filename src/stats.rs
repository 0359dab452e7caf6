//! Pipeline statistics.
//!
//! Counts what the update loop did so a running bridge can report on itself.
//! Counters are atomic so readers on other threads never block the loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running counters for one pipeline instance.
#[derive(Debug)]
pub struct PipelineStats {
    /// Packets received from the source
    packets_received: AtomicU64,
    /// Frames that carried weights and were composed
    frames_composed: AtomicU64,
    /// Packets that decoded to no weights
    empty_frames: AtomicU64,
    /// Receive timeouts
    timeouts: AtomicU64,
    /// Receive failures other than timeouts
    failures: AtomicU64,
    /// When counting started
    session_start: DateTime<Utc>,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self {
            packets_received: AtomicU64::new(0),
            frames_composed: AtomicU64::new(0),
            empty_frames: AtomicU64::new(0),
            timeouts: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            session_start: Utc::now(),
        }
    }

    pub fn record_packet(&self) {
        self.packets_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_composed(&self) {
        self.frames_composed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_empty_frame(&self) {
        self.empty_frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_timeout(&self) {
        self.timeouts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Get the current statistics.
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot {
            packets_received: self.packets_received.load(Ordering::Relaxed),
            frames_composed: self.frames_composed.load(Ordering::Relaxed),
            empty_frames: self.empty_frames.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            session_start: self.session_start,
            session_duration_secs: (Utc::now() - self.session_start).num_seconds().max(0) as u64,
        }
    }

    /// Get a summary string for display.
    pub fn summary(&self) -> String {
        let stats = self.stats();
        format!(
            "Session Statistics:\n\
             - Packets received: {}\n\
             - Frames composed: {}\n\
             - Empty frames: {}\n\
             - Receive timeouts: {}\n\
             - Receive failures: {}\n\
             - Session duration: {} seconds",
            stats.packets_received,
            stats.frames_composed,
            stats.empty_frames,
            stats.timeouts,
            stats.failures,
            stats.session_duration_secs
        )
    }

    /// Reset all counters.
    pub fn reset(&self) {
        self.packets_received.store(0, Ordering::Relaxed);
        self.frames_composed.store(0, Ordering::Relaxed);
        self.empty_frames.store(0, Ordering::Relaxed);
        self.timeouts.store(0, Ordering::Relaxed);
        self.failures.store(0, Ordering::Relaxed);
    }
}

impl Default for PipelineStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time copy of [`PipelineStats`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub packets_received: u64,
    pub frames_composed: u64,
    pub empty_frames: u64,
    pub timeouts: u64,
    pub failures: u64,
    pub session_start: DateTime<Utc>,
    pub session_duration_secs: u64,
}

/// Thread-safe shared statistics.
pub type SharedPipelineStats = Arc<PipelineStats>;

/// Create a new shared statistics block.
pub fn create_shared_stats() -> SharedPipelineStats {
    Arc::new(PipelineStats::new())
}

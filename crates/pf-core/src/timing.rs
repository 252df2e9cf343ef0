//! Lightweight performance timing utilities.
//!
//! Timers are disabled unless `enable_timing()` was called or the
//! `PF_TIMING` environment variable is set.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("PF_TIMING").is_ok()
}

/// A simple timer that measures elapsed time.
pub struct Timer {
    start: Instant,
    enabled: bool,
}

impl Timer {
    /// Create and start a new timer.
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            enabled: is_enabled(),
        }
    }

    /// Stop the timer and return elapsed time in seconds.
    /// If timing is disabled, returns None.
    pub fn stop(self) -> Option<f64> {
        if self.enabled {
            Some(self.start.elapsed().as_secs_f64())
        } else {
            None
        }
    }

    /// Stop the timer and add the elapsed time to `acc` if enabled.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Accumulating timer for tracking total time across multiple calls.
///
/// Lock-free so it can be shared by rayon workers.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    /// Record a timing measurement.
    pub fn record(&self, duration_s: f64) {
        let nanos = (duration_s * 1e9) as u64;
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get total time spent (in seconds).
    pub fn total_seconds(&self) -> f64 {
        self.total_ns.load(Ordering::Relaxed) as f64 / 1e9
    }

    /// Get number of calls.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Get average time per call (in seconds).
    pub fn average_seconds(&self) -> f64 {
        let count = self.count();
        if count > 0 {
            self.total_seconds() / count as f64
        } else {
            0.0
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Residual assembly timers.
pub mod assembly_timing {
    use super::AccumulatingTimer;

    /// Time spent evaluating intensive quantities
    pub static QUANTITIES: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent in one focus-dof column pass (storage + source + fluxes)
    pub static COLUMN_PASS: AccumulatingTimer = AccumulatingTimer::new();
    /// Time spent scattering column blocks into the global system
    pub static SCATTER: AccumulatingTimer = AccumulatingTimer::new();

    pub fn reset_all() {
        QUANTITIES.reset();
        COLUMN_PASS.reset();
        SCATTER.reset();
    }

    /// Print assembly timing summary.
    pub fn print_summary() {
        if !super::is_enabled() {
            return;
        }

        println!("\n=== Assembly Breakdown ===");
        for (label, timer) in [
            ("quantities", &QUANTITIES),
            ("column passes", &COLUMN_PASS),
            ("scatter", &SCATTER),
        ] {
            if timer.count() > 0 {
                println!(
                    "{:<16} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    timer.count(),
                    timer.total_seconds(),
                    timer.average_seconds() * 1000.0
                );
            }
        }
        println!("==========================\n");
    }
}

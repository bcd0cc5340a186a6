//! Frame pacing utilities.
//!
//! The engine is driven by the producer's render submissions. This module
//! provides:
//! - A monotonic clock anchored at engine start
//! - Frame interval tracking for diagnostics
//! - A rate limiter for periodic, low-rate work (diagnostic summaries)

use std::time::Instant;

/// Monotonic clock anchored at engine start.
#[derive(Debug, Clone)]
pub struct FrameClock {
    /// The instant the engine started.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,

    /// Elapsed ns at the previous frame mark.
    last_mark_ns: Option<u64>,

    /// Smoothed frame interval in ns.
    avg_interval_ns: f64,

    /// Number of marked frames.
    frames: u64,
}

impl FrameClock {
    /// Smoothing factor applied to each new frame interval.
    const INTERVAL_ALPHA: f64 = 0.1;

    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
            last_mark_ns: None,
            avg_interval_ns: 0.0,
            frames: 0,
        }
    }

    /// Nanoseconds elapsed since the clock started.
    pub fn elapsed_ns(&self) -> u64 {
        self.epoch.elapsed().as_nanos() as u64
    }

    /// Wall-clock time at start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Record a frame boundary observed at `now_ns` (elapsed since start).
    ///
    /// Returns the interval since the previous mark, if any.
    pub fn mark_frame_at(&mut self, now_ns: u64) -> Option<u64> {
        self.frames += 1;
        let interval = self.last_mark_ns.map(|last| now_ns.saturating_sub(last));
        self.last_mark_ns = Some(now_ns);

        if let Some(interval) = interval {
            if self.avg_interval_ns == 0.0 {
                self.avg_interval_ns = interval as f64;
            } else {
                self.avg_interval_ns = Self::INTERVAL_ALPHA * interval as f64
                    + (1.0 - Self::INTERVAL_ALPHA) * self.avg_interval_ns;
            }
        }
        interval
    }

    /// Record a frame boundary now.
    pub fn mark_frame(&mut self) -> Option<u64> {
        let now = self.elapsed_ns();
        self.mark_frame_at(now)
    }

    /// Number of frames marked so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Smoothed frame rate estimate, if at least two frames were marked.
    pub fn frames_per_second(&self) -> Option<f64> {
        if self.avg_interval_ns > 0.0 {
            Some(1_000_000_000.0 / self.avg_interval_ns)
        } else {
            None
        }
    }
}

/// Rate limiter for periodic low-rate work.
#[derive(Debug)]
pub struct RateController {
    interval_ns: u64,
    last_tick_ns: Option<u64>,
}

impl RateController {
    /// Create a controller that fires at most once per `interval_ms`.
    pub fn every_ms(interval_ms: u64) -> Self {
        Self {
            interval_ns: interval_ms.saturating_mul(1_000_000),
            last_tick_ns: None,
        }
    }

    /// Check if enough time has passed for the next tick.
    /// Returns true and updates internal state if ready.
    /// The first call always returns true.
    pub fn should_tick(&mut self, current_ns: u64) -> bool {
        match self.last_tick_ns {
            None => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            Some(last) if current_ns >= last.saturating_add(self.interval_ns) => {
                self.last_tick_ns = Some(current_ns);
                true
            }
            _ => false,
        }
    }

    /// Interval in nanoseconds.
    pub fn interval_ns(&self) -> u64 {
        self.interval_ns
    }
}

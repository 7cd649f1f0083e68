//! Time management utilities

use std::time::Instant;

/// High-precision timer for frame timing
pub struct Timer {
    last_frame: Instant,
    delta_time: f32,
    total_time: f32,
    frame_count: u64,
}

impl Default for Timer {
    fn default() -> Self {
        Self::new()
    }
}

impl Timer {
    /// Create a new timer
    pub fn new() -> Self {
        Self {
            last_frame: Instant::now(),
            delta_time: 0.0,
            total_time: 0.0,
            frame_count: 0,
        }
    }

    /// Update the timer (should be called once per frame)
    pub fn update(&mut self) {
        let now = Instant::now();
        let elapsed = now.duration_since(self.last_frame);
        self.delta_time = elapsed.as_secs_f32();
        self.total_time += self.delta_time;
        self.last_frame = now;
        self.frame_count += 1;
    }

    /// Get the time since the last frame in seconds
    pub fn delta_time(&self) -> f32 {
        self.delta_time
    }

    /// Get the total elapsed time since timer creation
    pub fn total_time(&self) -> f32 {
        self.total_time
    }

    /// Get the current frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

/// Frame-rate estimator over a fixed tick window
///
/// Counts ticks and recomputes the rate once per window. This is a coarse
/// moving counter, not a precision timer; the estimate lags by up to one
/// window length.
pub struct FpsCounter {
    interval: u32,
    ticks: u32,
    window_start: Instant,
    fps: f32,
}

impl FpsCounter {
    /// Create a counter that re-estimates every `interval` ticks
    pub fn new(interval: u32) -> Self {
        Self {
            interval: interval.max(1),
            ticks: 0,
            window_start: Instant::now(),
            fps: 0.0,
        }
    }

    /// Record one tick (call once per frame)
    pub fn update(&mut self) {
        if self.ticks >= self.interval {
            let elapsed = self.window_start.elapsed().as_secs_f32();
            if elapsed > 0.0 {
                self.fps = self.ticks as f32 / elapsed;
            }
            self.ticks = 0;
            self.window_start = Instant::now();
        } else {
            self.ticks += 1;
        }
    }

    /// Latest frame-rate estimate (0.0 until the first window completes)
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

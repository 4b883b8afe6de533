//! Simulated time
//!
//! Staleness timestamps and gate animation both read the same monotonic
//! clock. Time only moves when the owner advances it.

use crate::consts::{MAX_SUBSTEPS, SIM_DT};

/// Simulated seconds
pub type SimTime = f64;

/// Monotonic simulated-time source
pub trait SimClock {
    fn now(&self) -> SimTime;
}

/// Clock advanced explicitly by the tick driver
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ManualClock {
    now: SimTime,
}

impl ManualClock {
    pub fn new() -> Self {
        Self { now: 0.0 }
    }

    pub fn starting_at(now: SimTime) -> Self {
        Self { now }
    }

    /// Move forward by `dt` seconds (negative steps are ignored)
    pub fn advance(&mut self, dt: SimTime) {
        if dt > 0.0 {
            self.now += dt;
        }
    }
}

impl SimClock for ManualClock {
    fn now(&self) -> SimTime {
        self.now
    }
}

/// Turns variable frame time into a whole number of fixed ticks
#[derive(Debug, Clone)]
pub struct FixedStepper {
    pub step: f32,
    pub max_substeps: u32,
    accumulator: f32,
}

impl Default for FixedStepper {
    fn default() -> Self {
        Self::new(SIM_DT, MAX_SUBSTEPS)
    }
}

impl FixedStepper {
    pub fn new(step: f32, max_substeps: u32) -> Self {
        Self {
            step,
            max_substeps,
            accumulator: 0.0,
        }
    }

    /// Add a frame's worth of time and return how many ticks to run
    ///
    /// Frame time is clamped to 0.1s and capped at `max_substeps` ticks to
    /// avoid a spiral of death after a long stall.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if !(self.step > 0.0) {
            return 0;
        }
        self.accumulator += frame_dt.clamp(0.0, 0.1);

        let mut steps = 0;
        while self.accumulator >= self.step && steps < self.max_substeps {
            self.accumulator -= self.step;
            steps += 1;
        }
        if steps == self.max_substeps {
            // Drop the backlog rather than carry it into the next frame
            self.accumulator = self.accumulator.min(self.step);
        }
        steps
    }

    /// Leftover fraction of a step, for render interpolation
    pub fn alpha(&self) -> f32 {
        if self.step > 0.0 {
            (self.accumulator / self.step).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

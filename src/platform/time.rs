//! Frame timing
//!
//! Turns measured frame timestamps into a number of fixed simulation steps,
//! so motion and effect durations do not depend on the display refresh rate.

use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    accumulator: f32,
    last_time_ms: Option<f64>,
}

impl FrameClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget timing history (new run, tab resumed)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
        self.last_time_ms = None;
    }

    /// Feed a frame timestamp in milliseconds; returns how many `SIM_DT`
    /// steps to run this frame
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let dt = match self.last_time_ms {
            Some(last) => ((now_ms - last) / 1000.0) as f32,
            None => SIM_DT,
        };
        self.last_time_ms = Some(now_ms);
        self.accumulator += dt.clamp(0.0, MAX_FRAME_DT);

        let mut steps = 0;
        while self.accumulator >= SIM_DT && steps < MAX_SUBSTEPS {
            self.accumulator -= SIM_DT;
            steps += 1;
        }
        if steps == MAX_SUBSTEPS {
            // Drop the backlog instead of spiralling
            self.accumulator = self.accumulator.min(SIM_DT);
        }
        steps
    }
}

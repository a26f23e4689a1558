/// Converts variable host frame times into whole scene steps of `dt`.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per step.
    dt: f32,
    /// Leftover time not yet consumed by a step.
    accumulator: f32,
}

impl FixedTimestep {
    /// Cap per rendered frame; a backgrounded tab must not replay minutes of animation.
    pub const MAX_STEPS: u32 = 10;

    pub fn new(dt: f32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
        }
    }

    /// Bank `frame_dt` and return how many steps are now owed.
    /// Negative or non-finite frame times count as zero.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        let frame_dt = if frame_dt.is_finite() {
            frame_dt.max(0.0)
        } else {
            0.0
        };
        self.accumulator = (self.accumulator + frame_dt).min(self.dt * Self::MAX_STEPS as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Drop any partial step, e.g. after the page becomes visible again.
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Simulated scene time: seconds elapsed and frames advanced.
/// Timers and particle absorption are stamped against this clock.
#[derive(Debug, Clone, Default)]
pub struct SceneClock {
    elapsed: f64,
    frame: u64,
}

impl SceneClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(&mut self, dt: f32) {
        self.elapsed += dt as f64;
        self.frame += 1;
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}

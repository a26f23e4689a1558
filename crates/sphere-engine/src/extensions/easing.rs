// extensions/easing.rs
//
// Easing curves and frame-rate independent smoothing.

/// Curve shaping the progress of a timed move (camera legs, absorption,
/// spawn fade-in).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    /// Decelerating quadratic; used for absorption.
    QuadOut,
    /// Accelerating cubic; the zoom dive.
    CubicIn,
    /// Decelerating cubic; focus moves and spawn fade-in.
    CubicOut,
}

impl Easing {
    /// Map progress `t` onto the curve. `t` is clamped to [0, 1] first so a
    /// late frame never overshoots the destination.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        let rest = 1.0 - t;
        match self {
            Easing::Linear => t,
            Easing::QuadOut => 1.0 - rest * rest,
            Easing::CubicIn => t * t * t,
            Easing::CubicOut => 1.0 - rest * rest * rest,
        }
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Frame-rate independent blend factor for first-order smoothing.
///
/// `smoothing` is the fraction of the remaining distance kept per 60 Hz
/// frame (0.0 = snap, 0.9 = slow). Applying `current += (target - current) * f`
/// converges from any starting point.
#[inline]
pub fn smoothing_factor(smoothing: f32, dt: f32) -> f32 {
    let smoothing = smoothing.clamp(0.0, 0.999);
    1.0 - smoothing.powf(dt.max(0.0) * 60.0)
}

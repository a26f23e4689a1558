use glam::Vec3;

use super::rng::Rng;
use crate::api::types::EmotionId;
use crate::extensions::easing::{lerp, Easing};

/// Per-particle lifecycle, independent of the global phase but driven by it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Lifecycle {
    Hidden = 0,
    Spawning = 1,
    Floating = 2,
    Flying = 3,
    Absorbing = 4,
    Absorbed = 5,
}

impl Lifecycle {
    pub fn name(self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Spawning => "spawning",
            Self::Floating => "floating",
            Self::Flying => "flying",
            Self::Absorbing => "absorbing",
            Self::Absorbed => "absorbed",
        }
    }

    pub fn is_rendered(self) -> bool {
        !matches!(self, Self::Hidden | Self::Absorbed)
    }
}

// ── Tuning ───────────────────────────────────────────────────────────────

/// Half extents of the floating volume.
pub const FLOAT_BOUNDS: Vec3 = Vec3::new(6.0, 4.0, 2.5);
/// Velocity kept when reflecting off the volume's walls.
pub const BOUNCE: f32 = 0.8;
/// Velocity kept per 60 Hz frame while floating.
pub const FRICTION: f32 = 0.95;
/// Acceleration of the sum-of-sines drift.
pub const DRIFT_STRENGTH: f32 = 0.6;
pub const POINTER_RADIUS: f32 = 3.0;
pub const POINTER_STRENGTH: f32 = 4.0;
/// Flying speed per unit of remaining distance.
pub const FLY_GAIN: f32 = 3.0;
pub const MAX_FLY_SPEED: f32 = 8.0;
/// Remaining distance at which a flying particle snaps and starts absorbing.
pub const ABSORB_DISTANCE: f32 = 0.3;
/// Fraction of the base scale left when absorption ends.
pub const ABSORBED_SCALE: f32 = 0.3;
/// Radius of the cluster a cohort forms around its sphere.
pub const REST_RADIUS: f32 = 0.45;
pub const SPAWN_DELAY_MIN: f32 = 0.4;
pub const SPAWN_DELAY_MAX: f32 = 1.4;
pub const SCALE_MIN: f32 = 0.035;
pub const SCALE_MAX: f32 = 0.08;

/// One pooled particle. Created hidden, recycled forever.
#[derive(Debug, Clone)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub affinity: EmotionId,
    pub lifecycle: Lifecycle,
    /// Where this particle sticks relative to its sphere's center.
    pub rest_offset: Vec3,
    pub base_scale: f32,
    pub scale: f32,
    pub opacity: f32,
    pub spawn_delay: f32,
    /// Drift phase offsets, one per axis.
    pub wobble: Vec3,
    /// Seconds spent in the current lifecycle step (spawning).
    pub timer: f32,
    /// Scene time at which absorption started.
    pub absorb_started: f64,
}

impl Particle {
    pub fn new(affinity: EmotionId, rng: &mut Rng) -> Self {
        let mut particle = Self {
            position: Vec3::ZERO,
            velocity: Vec3::ZERO,
            affinity,
            lifecycle: Lifecycle::Hidden,
            rest_offset: rng.in_ball(REST_RADIUS),
            base_scale: rng.range(SCALE_MIN, SCALE_MAX),
            scale: 0.0,
            opacity: 0.0,
            spawn_delay: SPAWN_DELAY_MIN,
            wobble: Vec3::new(
                rng.range(0.0, std::f32::consts::TAU),
                rng.range(0.0, std::f32::consts::TAU),
                rng.range(0.0, std::f32::consts::TAU),
            ),
            timer: 0.0,
            absorb_started: 0.0,
        };
        particle.reset(rng);
        particle
    }

    /// Back to hidden at a fresh random point of the floating volume.
    pub fn reset(&mut self, rng: &mut Rng) {
        self.lifecycle = Lifecycle::Hidden;
        self.position = rng.in_box(FLOAT_BOUNDS);
        self.velocity = Vec3::ZERO;
        self.scale = 0.0;
        self.opacity = 0.0;
        self.spawn_delay = rng.range(SPAWN_DELAY_MIN, SPAWN_DELAY_MAX);
        self.timer = 0.0;
    }

    pub fn start_spawning(&mut self) {
        self.lifecycle = Lifecycle::Spawning;
        self.timer = 0.0;
    }

    /// Grow in over `spawn_delay`, then float.
    pub fn step_spawning(&mut self, dt: f32) {
        self.timer += dt;
        let t = (self.timer / self.spawn_delay.max(f32::EPSILON)).min(1.0);
        let eased = Easing::CubicOut.apply(t);
        self.scale = self.base_scale * eased;
        self.opacity = eased;
        if t >= 1.0 {
            self.lifecycle = Lifecycle::Floating;
            self.timer = 0.0;
        }
    }

    pub fn step_floating(&mut self, dt: f32, time: f32, pointer: Option<Vec3>) {
        let w = self.wobble;
        let mut accel = Vec3::new(
            (time * 0.7 + w.x).sin() + 0.5 * (time * 1.3 + w.y).sin(),
            (time * 0.9 + w.y).cos() + 0.5 * (time * 1.7 + w.z).sin(),
            (time * 0.5 + w.z).sin(),
        ) * DRIFT_STRENGTH;

        if let Some(pointer) = pointer {
            let to_pointer = pointer - self.position;
            let distance = to_pointer.length();
            if distance > 1e-4 && distance < POINTER_RADIUS {
                let falloff = 1.0 - distance / POINTER_RADIUS;
                accel += to_pointer / distance * POINTER_STRENGTH * falloff;
            }
        }

        self.velocity += accel * dt;
        self.velocity *= FRICTION.powf(dt * 60.0);
        self.position += self.velocity * dt;

        // Soft walls: reflect outward velocity, leave position alone.
        for axis in 0..3 {
            let p = self.position[axis];
            let v = self.velocity[axis];
            let limit = FLOAT_BOUNDS[axis];
            if (p > limit && v > 0.0) || (p < -limit && v < 0.0) {
                self.velocity[axis] = -v * BOUNCE;
            }
        }
        self.opacity = 1.0;
        self.scale = self.base_scale;
    }

    /// Steer toward `target`. Returns true when it arrived and started absorbing.
    pub fn step_flying(&mut self, dt: f32, target: Vec3, now: f64) -> bool {
        let to_target = target - self.position;
        let distance = to_target.length();
        let speed = (distance * FLY_GAIN).min(MAX_FLY_SPEED);
        if distance < ABSORB_DISTANCE || speed * dt >= distance {
            self.position = target;
            self.velocity = Vec3::ZERO;
            self.lifecycle = Lifecycle::Absorbing;
            self.absorb_started = now;
            return true;
        }
        self.velocity = to_target / distance * speed;
        self.position += self.velocity * dt;
        false
    }

    /// Merge into the sphere at `center` over `duration` seconds.
    pub fn step_absorbing(&mut self, now: f64, center: Vec3, duration: f32) {
        let t = if duration > 0.0 {
            (((now - self.absorb_started) / duration as f64) as f32).clamp(0.0, 1.0)
        } else {
            1.0
        };
        let eased = Easing::QuadOut.apply(t);
        self.opacity = 1.0 - eased;
        self.scale = self.base_scale * lerp(1.0, ABSORBED_SCALE, eased);
        self.position = center + self.rest_offset * (1.0 - eased);
        if t >= 1.0 {
            self.lifecycle = Lifecycle::Absorbed;
            self.opacity = 0.0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn particle() -> Particle {
        Particle::new(EmotionId(0), &mut Rng::new(3))
    }

    #[test]
    fn starts_hidden_inside_volume() {
        let p = particle();
        assert_eq!(p.lifecycle, Lifecycle::Hidden);
        assert!(p.position.abs().cmple(FLOAT_BOUNDS).all());
        assert!(p.rest_offset.length() <= REST_RADIUS + 1e-6);
        assert!((SPAWN_DELAY_MIN..SPAWN_DELAY_MAX).contains(&p.spawn_delay));
    }

    #[test]
    fn spawning_grows_then_floats() {
        let mut p = particle();
        p.start_spawning();
        p.step_spawning(p.spawn_delay * 0.5);
        assert_eq!(p.lifecycle, Lifecycle::Spawning);
        assert!(p.scale > 0.0 && p.scale < p.base_scale);
        p.step_spawning(p.spawn_delay);
        assert_eq!(p.lifecycle, Lifecycle::Floating);
        assert_eq!(p.scale, p.base_scale);
    }

    #[test]
    fn floating_reflects_off_walls() {
        let mut p = particle();
        p.lifecycle = Lifecycle::Floating;
        p.position = Vec3::new(FLOAT_BOUNDS.x + 0.5, 0.0, 0.0);
        p.velocity = Vec3::new(2.0, 0.0, 0.0);
        p.step_floating(1.0 / 60.0, 0.0, None);
        assert!(p.velocity.x < 0.0, "velocity not reflected: {:?}", p.velocity);
    }

    #[test]
    fn pointer_attracts() {
        let mut p = particle();
        p.position = Vec3::ZERO;
        p.velocity = Vec3::ZERO;
        p.wobble = Vec3::ZERO;
        let mut q = p.clone();
        p.step_floating(1.0 / 60.0, 0.0, Some(Vec3::new(1.0, 0.0, 0.0)));
        q.step_floating(1.0 / 60.0, 0.0, None);
        assert!(p.velocity.x > q.velocity.x);
    }

    #[test]
    fn flying_arrives_and_snaps() {
        let mut p = particle();
        p.lifecycle = Lifecycle::Flying;
        p.position = Vec3::new(4.0, 0.0, 0.0);
        let target = Vec3::new(-1.0, 1.0, 0.0);
        let mut arrived = false;
        for frame in 0..600 {
            if p.step_flying(1.0 / 60.0, target, frame as f64 / 60.0) {
                arrived = true;
                break;
            }
            assert!(p.velocity.length() <= MAX_FLY_SPEED + 1e-4);
        }
        assert!(arrived);
        assert_eq!(p.position, target);
        assert_eq!(p.lifecycle, Lifecycle::Absorbing);
    }

    #[test]
    fn absorbing_fades_into_center() {
        let mut p = particle();
        p.lifecycle = Lifecycle::Absorbing;
        p.absorb_started = 1.0;
        let center = Vec3::new(2.0, 0.0, 0.0);
        p.step_absorbing(1.4, center, 0.8);
        assert_eq!(p.lifecycle, Lifecycle::Absorbing);
        assert!(p.opacity > 0.0 && p.opacity < 1.0);
        p.step_absorbing(1.9, center, 0.8);
        assert_eq!(p.lifecycle, Lifecycle::Absorbed);
        assert_eq!(p.position, center);
        assert!((p.scale - p.base_scale * ABSORBED_SCALE).abs() < 1e-6);
        assert_eq!(p.opacity, 0.0);
    }
}

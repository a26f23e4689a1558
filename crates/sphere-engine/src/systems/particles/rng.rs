//! Seedable pseudo-random number generator (xorshift64).
//! Deterministic and fast; only used for particle placement.

use glam::Vec3;

#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        Rng {
            state: if seed == 0 { 1 } else { seed },
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.state = x;
        x
    }

    /// Uniform in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Uniform in [min, max).
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + (max - min) * self.next_f32()
    }

    /// Uniform point in the axis-aligned box `[-half, half]`.
    pub fn in_box(&mut self, half: Vec3) -> Vec3 {
        Vec3::new(
            self.range(-half.x, half.x),
            self.range(-half.y, half.y),
            self.range(-half.z, half.z),
        )
    }

    /// Uniform point inside a ball of `radius` (rejection sampling).
    pub fn in_ball(&mut self, radius: f32) -> Vec3 {
        for _ in 0..16 {
            let p = self.in_box(Vec3::ONE);
            if p.length_squared() <= 1.0 {
                return p * radius;
            }
        }
        Vec3::ZERO
    }
}

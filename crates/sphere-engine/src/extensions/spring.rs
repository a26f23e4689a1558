// extensions/spring.rs
//
// Damped spring integrator for smoothly chasing a moving target.
// Values are polled each frame: set a target, tick(dt), read get().

use glam::Vec3;

/// Physical spring parameters.
/// `friction == 2 * sqrt(mass * tension)` is critical damping: the fastest
/// approach that never overshoots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpringConfig {
    pub mass: f32,
    pub tension: f32,
    pub friction: f32,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self::SNAPPY
    }
}

impl SpringConfig {
    /// Ordinary appearance, hover and recede moves.
    pub const SNAPPY: Self = Self {
        mass: 1.0,
        tension: 210.0,
        friction: 29.0,
    };

    /// Slower, heavier spring for the focus camera-lock.
    pub const HEAVY: Self = Self {
        mass: 2.0,
        tension: 120.0,
        friction: 31.0,
    };

    /// Critically damped spring for the given mass and tension.
    pub fn critical(mass: f32, tension: f32) -> Self {
        Self {
            mass,
            tension,
            friction: 2.0 * (mass * tension).sqrt(),
        }
    }

    /// 1.0 = critical, < 1.0 oscillates, > 1.0 creeps.
    pub fn damping_ratio(&self) -> f32 {
        self.friction / (2.0 * (self.mass * self.tension).sqrt())
    }
}

/// Integration substep; keeps semi-implicit Euler stable for stiff springs.
pub const SPRING_SUBSTEP: f32 = 1.0 / 240.0;
/// Longest frame the integrator will simulate in one tick.
pub const MAX_SPRING_DT: f32 = 0.1;
/// Distance from the target below which the spring may come to rest.
pub const REST_DELTA: f32 = 0.001;
/// Speed below which the spring may come to rest.
pub const REST_VELOCITY: f32 = 0.001;

/// Scalar value driven by a spring.
#[derive(Debug, Clone)]
pub struct Spring {
    current: f32,
    target: f32,
    velocity: f32,
    config: SpringConfig,
}

impl Spring {
    pub fn new(initial: f32, config: SpringConfig) -> Self {
        Self {
            current: initial,
            target: initial,
            velocity: 0.0,
            config,
        }
    }

    pub fn set_target(&mut self, target: f32) {
        self.target = target;
    }

    pub fn target(&self) -> f32 {
        self.target
    }

    pub fn get(&self) -> f32 {
        self.current
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.config = config;
    }

    /// Jump to `value` and stop.
    pub fn snap_to(&mut self, value: f32) {
        self.current = value;
        self.target = value;
        self.velocity = 0.0;
    }

    pub fn is_settled(&self) -> bool {
        self.current == self.target && self.velocity == 0.0
    }

    /// Advance by `dt` seconds: tension and friction give an acceleration,
    /// acceleration updates velocity, velocity updates position, in fixed
    /// substeps. Returns true once at rest on the target.
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.is_settled() {
            return true;
        }
        let SpringConfig { mass, tension, friction } = self.config;
        let mut remaining = if dt.is_finite() {
            dt.clamp(0.0, MAX_SPRING_DT)
        } else {
            0.0
        };

        while remaining > 0.0 {
            let h = remaining.min(SPRING_SUBSTEP);
            let displacement = self.current - self.target;
            let acceleration = (-tension * displacement - friction * self.velocity) / mass;
            self.velocity += acceleration * h;
            self.current += self.velocity * h;
            remaining -= h;
        }

        if (self.current - self.target).abs() < REST_DELTA && self.velocity.abs() < REST_VELOCITY {
            self.current = self.target;
            self.velocity = 0.0;
        }
        self.is_settled()
    }
}

/// Three independent springs sharing one config.
#[derive(Debug, Clone)]
pub struct SpringVec3 {
    pub x: Spring,
    pub y: Spring,
    pub z: Spring,
}

impl SpringVec3 {
    pub fn new(initial: Vec3, config: SpringConfig) -> Self {
        Self {
            x: Spring::new(initial.x, config),
            y: Spring::new(initial.y, config),
            z: Spring::new(initial.z, config),
        }
    }

    pub fn set_target(&mut self, target: Vec3) {
        self.x.set_target(target.x);
        self.y.set_target(target.y);
        self.z.set_target(target.z);
    }

    pub fn target(&self) -> Vec3 {
        Vec3::new(self.x.target(), self.y.target(), self.z.target())
    }

    pub fn get(&self) -> Vec3 {
        Vec3::new(self.x.get(), self.y.get(), self.z.get())
    }

    pub fn set_config(&mut self, config: SpringConfig) {
        self.x.set_config(config);
        self.y.set_config(config);
        self.z.set_config(config);
    }

    pub fn snap_to(&mut self, value: Vec3) {
        self.x.snap_to(value.x);
        self.y.snap_to(value.y);
        self.z.snap_to(value.z);
    }

    pub fn is_settled(&self) -> bool {
        self.x.is_settled() && self.y.is_settled() && self.z.is_settled()
    }

    pub fn tick(&mut self, dt: f32) -> bool {
        let x = self.x.tick(dt);
        let y = self.y.tick(dt);
        let z = self.z.tick(dt);
        x && y && z
    }
}

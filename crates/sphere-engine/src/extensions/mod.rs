// extensions/mod.rs
//
// Interpolation building blocks shared by the scene systems.
// Pure math; nothing here knows about phases or spheres.

pub mod easing;
pub mod spring;

pub use easing::{Easing, lerp, smoothing_factor};
pub use spring::{Spring, SpringConfig, SpringVec3};

use bytemuck::{Pod, Zeroable};
use glam::Vec3;

use super::camera::CameraUniform;

/// Per-instance render data read by the JS renderer.
/// Must match the TypeScript protocol: 8 floats = 32 bytes stride.
/// Used for both spheres and particles.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct RenderInstance {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    /// World-space radius.
    pub scale: f32,
    pub r: f32,
    pub g: f32,
    pub b: f32,
    /// Opacity (0.0 = invisible, 1.0 = opaque).
    pub alpha: f32,
}

impl RenderInstance {
    pub const FLOATS: usize = 8;
    pub const STRIDE_BYTES: usize = Self::FLOATS * 4;

    pub fn new(position: Vec3, scale: f32, color: [f32; 3], alpha: f32) -> Self {
        Self {
            x: position.x,
            y: position.y,
            z: position.z,
            scale,
            r: color[0],
            g: color[1],
            b: color[2],
            alpha,
        }
    }

    pub fn position(&self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// Everything the renderer draws for one frame.
pub struct RenderBuffer {
    /// One entry per sphere slot (emotion spheres in catalog order, then the
    /// main sphere). Hidden or unmounted spheres have zero alpha.
    pub spheres: Vec<RenderInstance>,
    /// Visible particles only.
    pub particles: Vec<RenderInstance>,
    pub camera: CameraUniform,
}

impl RenderBuffer {
    pub fn new(max_spheres: usize, max_particles: usize) -> Self {
        Self {
            spheres: Vec::with_capacity(max_spheres),
            particles: Vec::with_capacity(max_particles),
            camera: CameraUniform::zeroed(),
        }
    }

    pub fn clear(&mut self) {
        self.spheres.clear();
        self.particles.clear();
    }

    pub fn sphere_count(&self) -> u32 {
        self.spheres.len() as u32
    }

    pub fn particle_count(&self) -> u32 {
        self.particles.len() as u32
    }

    /// Raw pointer to sphere instance data for direct JS reads.
    pub fn spheres_ptr(&self) -> *const f32 {
        self.spheres.as_ptr() as *const f32
    }

    pub fn particles_ptr(&self) -> *const f32 {
        self.particles.as_ptr() as *const f32
    }
}

impl Default for RenderBuffer {
    fn default() -> Self {
        Self::new(16, 512)
    }
}

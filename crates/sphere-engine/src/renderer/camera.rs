use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

use crate::api::types::ViewportClass;

/// Vertical field of view of the scene camera.
pub const FOV_Y_DEGREES: f32 = 50.0;
pub const NEAR: f32 = 0.1;
pub const FAR: f32 = 100.0;
/// Distance of the overview camera from the origin.
pub const REST_DISTANCE_DESKTOP: f32 = 10.0;
/// Narrow screens pull back so the whole ring fits.
pub const REST_DISTANCE_MOBILE: f32 = 13.0;

/// Perspective camera placement: where it sits and what it looks at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub look_at: Vec3,
}

/// GPU-side uniform data for the camera.
#[repr(C)]
#[derive(Debug, Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position (w unused).
    pub position: [f32; 4],
}

impl CameraUniform {
    pub const FLOATS: usize = 20;
}

impl CameraPose {
    pub fn new(position: Vec3, look_at: Vec3) -> Self {
        Self { position, look_at }
    }

    /// Overview pose on the +z axis looking at the origin.
    pub fn rest(class: ViewportClass) -> Self {
        let distance = match class {
            ViewportClass::Desktop => REST_DISTANCE_DESKTOP,
            ViewportClass::Mobile => REST_DISTANCE_MOBILE,
        };
        Self::new(Vec3::new(0.0, 0.0, distance), Vec3::ZERO)
    }

    pub fn lerp(&self, other: &Self, t: f32) -> Self {
        Self {
            position: self.position.lerp(other.position, t),
            look_at: self.look_at.lerp(other.look_at, t),
        }
    }

    pub fn distance(&self, other: &Self) -> f32 {
        self.position.distance(other.position) + self.look_at.distance(other.look_at)
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.look_at, Vec3::Y)
    }

    /// Perspective projection with depth in [0, 1].
    pub fn projection_matrix(aspect: f32) -> Mat4 {
        Mat4::perspective_rh(FOV_Y_DEGREES.to_radians(), aspect.max(1e-3), NEAR, FAR)
    }

    pub fn uniform(&self, aspect: f32) -> CameraUniform {
        let view_proj = Self::projection_matrix(aspect) * self.view_matrix();
        CameraUniform {
            view_proj: view_proj.to_cols_array_2d(),
            position: self.position.extend(1.0).to_array(),
        }
    }

    /// Cast a ray through `ndc` (x, y in [-1, 1], y up) and intersect it with
    /// the z = 0 plane. `None` when the ray runs parallel to or away from it.
    pub fn unproject_to_plane(&self, aspect: f32, ndc: Vec2) -> Option<Vec3> {
        let inverse = (Self::projection_matrix(aspect) * self.view_matrix()).inverse();
        let near = inverse * ndc.extend(0.0).extend(1.0);
        let far = inverse * ndc.extend(1.0).extend(1.0);
        if near.w.abs() < 1e-6 || far.w.abs() < 1e-6 {
            return None;
        }
        let near = near.truncate() / near.w;
        let far = far.truncate() / far.w;
        let dir = far - near;
        if dir.z.abs() < 1e-6 {
            return None;
        }
        let t = -near.z / dir.z;
        if !(t >= 0.0 && t.is_finite()) {
            return None;
        }
        Some(near + dir * t)
    }
}

impl Default for CameraPose {
    fn default() -> Self {
        Self::rest(ViewportClass::Desktop)
    }
}

pub mod camera;
pub mod particles;
pub mod spheres;

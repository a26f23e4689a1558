pub mod camera;
pub mod instance;

pub use camera::{CameraPose, CameraUniform};
pub use instance::{RenderBuffer, RenderInstance};

pub mod api;
pub mod core;
pub mod components;
pub mod systems;
pub mod renderer;
pub mod bridge;
pub mod input;
pub mod assets;
pub mod extensions;

// Re-export key types at crate root for convenience
pub use api::config::SceneConfig;
pub use api::error::ConfigError;
pub use api::types::{EmotionId, RenderMode, SceneEvent, Viewport, ViewportClass, WireEvent};
pub use assets::catalog::{EmotionCatalog, EmotionDescriptor};
pub use components::sphere::{SphereKey, SphereTarget};
pub use core::phase::{AnimationPhase, Completion, PhaseController, SceneSnapshot, Transition};
pub use core::scene::EmotionScene;
pub use core::scheduler::{reveal_offsets, StaggerScheduler, TimerAction};
pub use core::time::{FixedTimestep, SceneClock};
pub use renderer::camera::{CameraPose, CameraUniform};
pub use renderer::instance::{RenderBuffer, RenderInstance};
pub use input::queue::{InputEvent, InputQueue};
pub use bridge::protocol::{pack_frame, FrameInfo, ProtocolLayout};
pub use systems::camera::CameraChoreographer;
pub use systems::particles::{
    Lifecycle, LifecycleCounts, Particle, ParticleSimulation, GATHER_THRESHOLD,
};
pub use systems::spheres::SphereVisualState;

// Interpolation helpers
pub use extensions::{Easing, Spring, SpringConfig, SpringVec3};

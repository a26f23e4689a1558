pub mod phase;
pub mod scene;
pub mod scheduler;
pub mod time;

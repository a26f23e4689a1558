use bytemuck::{Pod, Zeroable};
use serde::{Deserialize, Serialize};

use crate::core::phase::AnimationPhase;

/// Stable handle for an emotion: its index in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EmotionId(pub u32);

impl EmotionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Decode a wire value (negative = none).
    pub fn from_wire(value: i32) -> Option<Self> {
        u32::try_from(value).ok().map(EmotionId)
    }
}

/// Encode an optional emotion as a float for the frame header (-1.0 = none).
#[inline]
pub fn emotion_to_f32(id: Option<EmotionId>) -> f32 {
    id.map_or(-1.0, |id| id.0 as f32)
}

/// Layout variant chosen from the viewport width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewportClass {
    #[default]
    Desktop,
    Mobile,
}

/// Viewport size in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 && self.width > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn class(&self, mobile_breakpoint: f32) -> ViewportClass {
        if self.width < mobile_breakpoint {
            ViewportClass::Mobile
        } else {
            ViewportClass::Desktop
        }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 800.0)
    }
}

/// Whether the host can render the animated scene.
/// Probed once at mount; `Fallback` skips particle and camera work entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RenderMode {
    #[default]
    Animated,
    Fallback,
}

/// Notifications for the host application (UI chrome, router).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneEvent {
    PhaseChanged {
        from: AnimationPhase,
        to: AnimationPhase,
    },
    HoverChanged(Option<EmotionId>),
    /// The user confirmed an emotion and the dive finished; route to its content.
    Navigate(EmotionId),
}

impl SceneEvent {
    pub const KIND_PHASE_CHANGED: f32 = 1.0;
    pub const KIND_HOVER_CHANGED: f32 = 2.0;
    pub const KIND_NAVIGATE: f32 = 3.0;

    pub fn to_wire(&self) -> WireEvent {
        match *self {
            SceneEvent::PhaseChanged { from, to } => WireEvent {
                kind: Self::KIND_PHASE_CHANGED,
                a: from.as_u8() as f32,
                b: to.as_u8() as f32,
                c: 0.0,
            },
            SceneEvent::HoverChanged(id) => WireEvent {
                kind: Self::KIND_HOVER_CHANGED,
                a: emotion_to_f32(id),
                b: 0.0,
                c: 0.0,
            },
            SceneEvent::Navigate(id) => WireEvent {
                kind: Self::KIND_NAVIGATE,
                a: id.0 as f32,
                b: 0.0,
                c: 0.0,
            },
        }
    }
}

/// A scene event in its flat wire form.
/// Generic container: `kind` identifies the event, `a/b/c` carry payload.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct WireEvent {
    pub kind: f32,
    pub a: f32,
    pub b: f32,
    pub c: f32,
}

impl WireEvent {
    pub const FLOATS: usize = 4;
}

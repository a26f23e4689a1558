use glam::Vec3;

use crate::api::types::{EmotionId, ViewportClass};
use crate::assets::catalog::EmotionDescriptor;
use crate::core::phase::{AnimationPhase, SceneSnapshot};

/// Identifies a sphere in the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SphereKey {
    /// An emotion sphere (including the neutral spectrum sphere).
    Emotion(EmotionId),
    /// The central sphere shown before the split and after merging.
    Main,
}

/// Scale multiplier for the selected sphere once focused.
pub const FOCUSED_SCALE: f32 = 1.8;
/// Scale multiplier for the selected sphere while the camera flies in.
pub const FOCUSING_SCALE: f32 = 1.5;
pub const HOVER_SCALE: f32 = 1.15;
/// Opacity of the spheres that are not selected while a selection exists.
pub const RECEDED_OPACITY: f32 = 0.28;
pub const MAIN_SCALE_DESKTOP: f32 = 1.6;
pub const MAIN_SCALE_MOBILE: f32 = 1.2;
pub const MAIN_COLOR: [f32; 3] = [0.96, 0.95, 0.98];

/// Where a sphere should be heading this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereTarget {
    pub position: Vec3,
    pub scale: f32,
    pub opacity: f32,
}

impl SphereTarget {
    /// Collapsed into the origin, invisible.
    pub const HIDDEN: Self = Self {
        position: Vec3::ZERO,
        scale: 0.0,
        opacity: 0.0,
    };
}

/// Target for an emotion sphere. `reveal_fired` only matters while
/// splitting, where each sphere waits for its own staggered reveal.
pub fn emotion_target(
    id: EmotionId,
    desc: &EmotionDescriptor,
    snapshot: &SceneSnapshot,
    class: ViewportClass,
    reveal_fired: bool,
) -> SphereTarget {
    let phase = snapshot.phase;
    let shown = phase.is_revealed() || (phase == AnimationPhase::Splitting && reveal_fired);
    if !shown {
        return SphereTarget::HIDDEN;
    }

    let base = desc.base_scale(class);
    let selected = snapshot.is_selected(id);
    let scale = if selected {
        match phase {
            AnimationPhase::Focusing => base * FOCUSING_SCALE,
            p if p.is_detail() => base * FOCUSED_SCALE,
            _ => base,
        }
    } else if snapshot.is_hovered(id) {
        base * HOVER_SCALE
    } else {
        base
    };
    let opacity = if snapshot.selected.is_some() && !selected {
        RECEDED_OPACITY
    } else {
        1.0
    };

    SphereTarget {
        position: desc.anchor(class),
        scale,
        opacity,
    }
}

/// Target for the central sphere. `main_revealed` is set by the merge fade-in timer.
pub fn main_target(
    phase: AnimationPhase,
    class: ViewportClass,
    main_revealed: bool,
) -> SphereTarget {
    let shown = match phase {
        AnimationPhase::Intro | AnimationPhase::Initial => true,
        AnimationPhase::Merging => main_revealed,
        _ => false,
    };
    if !shown {
        return SphereTarget::HIDDEN;
    }
    SphereTarget {
        position: Vec3::ZERO,
        scale: match class {
            ViewportClass::Desktop => MAIN_SCALE_DESKTOP,
            ViewportClass::Mobile => MAIN_SCALE_MOBILE,
        },
        opacity: 1.0,
    }
}

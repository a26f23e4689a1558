//! Phase-driven camera moves.
//!
//! Timed phases (`focusing`, `zooming`) run an eased tween from the pose at
//! phase entry and raise their completion at progress 1. Every other phase
//! smooths exponentially toward a resting pose.

use glam::Vec3;

use crate::api::types::{EmotionId, ViewportClass};
use crate::assets::catalog::EmotionCatalog;
use crate::core::phase::{AnimationPhase, Completion, SceneSnapshot};
use crate::extensions::easing::{smoothing_factor, Easing};
use crate::renderer::camera::CameraPose;

/// Fraction of the anchor the focus look-at travels (toward, not onto, the sphere).
pub const FOCUS_LOOK_SCALE: f32 = 0.6;
pub const FOCUS_DISTANCE_DESKTOP: f32 = 6.0;
pub const FOCUS_DISTANCE_MOBILE: f32 = 4.5;
/// Distance in front of the anchor at the end of the zoom.
pub const ZOOM_DISTANCE: f32 = 1.4;
/// Fraction of the remaining distance kept per 60 Hz frame.
pub const CAMERA_SMOOTHING: f32 = 0.92;

/// Pose that frames the sphere anchored at `anchor`.
pub fn focus_pose(anchor: Vec3, class: ViewportClass) -> CameraPose {
    let look_at = anchor * FOCUS_LOOK_SCALE;
    let distance = match class {
        ViewportClass::Desktop => FOCUS_DISTANCE_DESKTOP,
        ViewportClass::Mobile => FOCUS_DISTANCE_MOBILE,
    };
    CameraPose::new(look_at + Vec3::new(0.0, 0.0, distance), look_at)
}

/// Pose right in front of the sphere, used for the dive.
pub fn zoom_pose(anchor: Vec3) -> CameraPose {
    CameraPose::new(anchor + Vec3::new(0.0, 0.0, ZOOM_DISTANCE), anchor)
}

#[derive(Debug, Clone, Copy)]
struct TimedMove {
    from: CameraPose,
    elapsed: f32,
}

pub struct CameraChoreographer {
    pose: CameraPose,
    last_phase: Option<AnimationPhase>,
    timed: Option<TimedMove>,
    focus_duration: f32,
    zoom_duration: f32,
    warned_unresolved: bool,
}

impl CameraChoreographer {
    pub fn new(class: ViewportClass, focus_duration: f32, zoom_duration: f32) -> Self {
        Self {
            pose: CameraPose::rest(class),
            last_phase: None,
            timed: None,
            focus_duration,
            zoom_duration,
            warned_unresolved: false,
        }
    }

    pub fn pose(&self) -> CameraPose {
        self.pose
    }

    fn anchor(
        &mut self,
        selected: Option<EmotionId>,
        catalog: &EmotionCatalog,
        class: ViewportClass,
    ) -> Option<Vec3> {
        let anchor = selected.and_then(|id| catalog.get(id)).map(|d| d.anchor(class));
        if anchor.is_none() && !self.warned_unresolved {
            log::warn!("camera: selection {:?} does not resolve, holding pose", selected);
            self.warned_unresolved = true;
        } else if anchor.is_some() {
            self.warned_unresolved = false;
        }
        anchor
    }

    /// Run the timed move for this phase. Returns true at progress 1.
    fn step_timed(
        &mut self,
        target: Option<CameraPose>,
        duration: f32,
        easing: Easing,
        dt: f32,
    ) -> bool {
        let pose = self.pose;
        let timed = self.timed.get_or_insert(TimedMove {
            from: pose,
            elapsed: 0.0,
        });
        timed.elapsed += dt;
        let progress = if duration > 0.0 {
            (timed.elapsed / duration).min(1.0)
        } else {
            1.0
        };
        let from = timed.from;
        if let Some(target) = target {
            self.pose = if progress >= 1.0 {
                target
            } else {
                from.lerp(&target, easing.apply(progress))
            };
        }
        progress >= 1.0
    }

    fn smooth_toward(&mut self, target: CameraPose, dt: f32) {
        let f = smoothing_factor(CAMERA_SMOOTHING, dt);
        self.pose = self.pose.lerp(&target, f);
    }

    /// Advance the camera one frame.
    pub fn advance(
        &mut self,
        snapshot: &SceneSnapshot,
        catalog: &EmotionCatalog,
        class: ViewportClass,
        dt: f32,
        completions: &mut Vec<Completion>,
    ) {
        if self.last_phase != Some(snapshot.phase) {
            self.last_phase = Some(snapshot.phase);
            self.timed = None;
        }

        match snapshot.phase {
            AnimationPhase::Focusing => {
                let target = self
                    .anchor(snapshot.selected, catalog, class)
                    .map(|a| focus_pose(a, class));
                if self.step_timed(target, self.focus_duration, Easing::CubicOut, dt) {
                    completions.push(Completion::FocusFinished);
                }
            }
            AnimationPhase::Zooming => {
                let target = self.anchor(snapshot.selected, catalog, class).map(zoom_pose);
                if self.step_timed(target, self.zoom_duration, Easing::CubicIn, dt) {
                    completions.push(Completion::ZoomFinished);
                }
            }
            AnimationPhase::Focused | AnimationPhase::Gathering => {
                if let Some(anchor) = self.anchor(snapshot.selected, catalog, class) {
                    self.smooth_toward(focus_pose(anchor, class), dt);
                }
            }
            AnimationPhase::Transitioning => {
                if let Some(anchor) = self.anchor(snapshot.selected, catalog, class) {
                    self.smooth_toward(zoom_pose(anchor), dt);
                }
            }
            _ => self.smooth_toward(CameraPose::rest(class), dt),
        }
    }

    /// Jump to the rest pose and drop any timed leg. Fallback mode holds the
    /// camera here every frame.
    pub fn reset(&mut self, class: ViewportClass) {
        self.pose = CameraPose::rest(class);
        self.timed = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    fn snap(phase: AnimationPhase, selected: Option<EmotionId>) -> SceneSnapshot {
        SceneSnapshot {
            phase,
            selected,
            hovered: None,
            is_split: true,
            selection_epoch: 0,
        }
    }

    fn frames_until(
        cam: &mut CameraChoreographer,
        catalog: &EmotionCatalog,
        s: &SceneSnapshot,
        signal: Completion,
    ) -> usize {
        let mut out = Vec::new();
        for frame in 1..=600 {
            cam.advance(s, catalog, ViewportClass::Desktop, DT, &mut out);
            if out.contains(&signal) {
                return frame;
            }
        }
        panic!("{:?} never raised", signal);
    }

    #[test]
    fn focus_completes_on_time_at_target() {
        let catalog = EmotionCatalog::default();
        let clarity = catalog.find("clarity").unwrap();
        let mut cam = CameraChoreographer::new(ViewportClass::Desktop, 0.8, 1.0);
        let focusing = snap(AnimationPhase::Focusing, Some(clarity));
        let frame = frames_until(&mut cam, &catalog, &focusing, Completion::FocusFinished);
        assert!((47..=49).contains(&frame), "finished at frame {}", frame);

        let anchor = catalog.get(clarity).unwrap().anchor_desktop;
        let expected = focus_pose(anchor, ViewportClass::Desktop);
        assert!(cam.pose().distance(&expected) < 1e-4);
    }

    #[test]
    fn focus_eases_out() {
        let catalog = EmotionCatalog::default();
        let clarity = catalog.find("clarity").unwrap();
        let mut cam = CameraChoreographer::new(ViewportClass::Desktop, 0.8, 1.0);
        let start = cam.pose();
        let anchor = catalog.get(clarity).unwrap().anchor_desktop;
        let target = focus_pose(anchor, ViewportClass::Desktop);
        let focusing = snap(AnimationPhase::Focusing, Some(clarity));
        let mut out = Vec::new();
        for _ in 0..24 {
            cam.advance(&focusing, &catalog, ViewportClass::Desktop, DT, &mut out);
        }
        // halfway through time, well past halfway in distance
        let covered = start.distance(&cam.pose()) / start.distance(&target);
        assert!(covered > 0.8, "covered {}", covered);
        assert!(out.is_empty());
    }

    #[test]
    fn zoom_completes() {
        let catalog = EmotionCatalog::default();
        let id = catalog.categories()[0];
        let mut cam = CameraChoreographer::new(ViewportClass::Desktop, 0.8, 1.0);
        let zooming = snap(AnimationPhase::Zooming, Some(id));
        let frame = frames_until(&mut cam, &catalog, &zooming, Completion::ZoomFinished);
        assert!((59..=61).contains(&frame));
        let anchor = catalog.get(id).unwrap().anchor_desktop;
        assert!(cam.pose().distance(&zoom_pose(anchor)) < 1e-4);
    }

    #[test]
    fn unresolvable_selection_holds_pose_but_completes() {
        let catalog = EmotionCatalog::default();
        let mut cam = CameraChoreographer::new(ViewportClass::Desktop, 0.8, 1.0);
        let start = cam.pose();
        let unknown = snap(AnimationPhase::Focusing, Some(EmotionId(42)));
        frames_until(&mut cam, &catalog, &unknown, Completion::FocusFinished);
        assert_eq!(cam.pose(), start);
    }

    #[test]
    fn overview_returns_to_rest() {
        let catalog = EmotionCatalog::default();
        let id = catalog.categories()[3];
        let mut cam = CameraChoreographer::new(ViewportClass::Desktop, 0.8, 1.0);
        let focusing = snap(AnimationPhase::Focusing, Some(id));
        frames_until(&mut cam, &catalog, &focusing, Completion::FocusFinished);
        let merging = snap(AnimationPhase::Merging, None);
        let mut out = Vec::new();
        for _ in 0..600 {
            cam.advance(&merging, &catalog, ViewportClass::Desktop, DT, &mut out);
        }
        assert!(cam.pose().distance(&CameraPose::rest(ViewportClass::Desktop)) < 1e-3);
    }
}

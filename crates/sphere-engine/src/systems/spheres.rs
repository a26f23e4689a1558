//! Spring-driven sphere presentation.
//!
//! Targets come from the pure functions in `components::sphere`; this system
//! owns the springs that chase them, the per-sphere reveal and mount flags,
//! and the idle breathing pulse layered on top of the rendered scale.

use crate::api::types::{EmotionId, ViewportClass};
use crate::assets::catalog::EmotionCatalog;
use crate::components::sphere::{emotion_target, main_target, SphereKey, SphereTarget, MAIN_COLOR};
use crate::core::phase::{AnimationPhase, Completion, SceneSnapshot};
use crate::extensions::easing::smoothing_factor;
use crate::extensions::spring::{Spring, SpringConfig, SpringVec3};
use crate::renderer::instance::RenderInstance;

/// Relative scale swing of the breathing pulse.
pub const BREATH_AMPLITUDE: f32 = 0.035;
/// Angular rate of the breathing pulse (rad/s).
pub const BREATH_RATE: f32 = 1.6;
/// How quickly the pulse fades in and out (fraction kept per 60 Hz frame).
const BREATH_SMOOTHING: f32 = 0.94;

#[derive(Debug, Clone)]
struct SphereVisual {
    key: SphereKey,
    mounted: bool,
    warned_unmounted: bool,
    /// Staggered reveal fired (splitting only).
    revealed: bool,
    position: SpringVec3,
    scale: Spring,
    opacity: Spring,
    breath_phase: f32,
    breath_weight: f32,
    target: SphereTarget,
}

impl SphereVisual {
    fn new(key: SphereKey, breath_phase: f32) -> Self {
        let hidden = SphereTarget::HIDDEN;
        Self {
            key,
            mounted: true,
            warned_unmounted: false,
            revealed: false,
            position: SpringVec3::new(hidden.position, SpringConfig::SNAPPY),
            scale: Spring::new(hidden.scale, SpringConfig::SNAPPY),
            opacity: Spring::new(hidden.opacity, SpringConfig::SNAPPY),
            breath_phase,
            breath_weight: 0.0,
            target: hidden,
        }
    }

    fn set_config(&mut self, config: SpringConfig) {
        self.position.set_config(config);
        self.scale.set_config(config);
        self.opacity.set_config(config);
    }

    fn set_target(&mut self, target: SphereTarget) {
        self.target = target;
        self.position.set_target(target.position);
        self.scale.set_target(target.scale);
        self.opacity.set_target(target.opacity);
    }

    /// True when the render target is gone; warns once per unmount.
    fn skip_unmounted(&mut self) -> bool {
        if self.mounted {
            return false;
        }
        if !self.warned_unmounted {
            log::warn!("sphere {:?} not mounted, skipping", self.key);
            self.warned_unmounted = true;
        }
        true
    }

    fn snap(&mut self, target: SphereTarget) {
        self.target = target;
        self.position.snap_to(target.position);
        self.scale.snap_to(target.scale);
        self.opacity.snap_to(target.opacity);
    }

    fn tick(&mut self, dt: f32) -> bool {
        let p = self.position.tick(dt);
        let s = self.scale.tick(dt);
        let o = self.opacity.tick(dt);
        p && s && o
    }

    fn is_settled(&self) -> bool {
        self.position.is_settled() && self.scale.is_settled() && self.opacity.is_settled()
    }
}

/// Rendered presentation of one sphere.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SphereFrame {
    pub key: SphereKey,
    pub target: SphereTarget,
    pub rendered: SphereTarget,
    pub mounted: bool,
}

pub struct SphereVisualState {
    /// Emotion spheres in catalog order, then the main sphere.
    spheres: Vec<SphereVisual>,
    main_revealed: bool,
    last_phase: Option<AnimationPhase>,
    time: f32,
}

impl SphereVisualState {
    pub fn new(catalog: &EmotionCatalog) -> Self {
        let mut spheres: Vec<SphereVisual> = catalog
            .iter()
            .map(|(id, desc)| {
                let a = desc.anchor_desktop;
                SphereVisual::new(SphereKey::Emotion(id), a.x * 1.3 + a.y * 0.7)
            })
            .collect();
        spheres.push(SphereVisual::new(SphereKey::Main, 0.0));
        Self {
            spheres,
            main_revealed: false,
            last_phase: None,
            time: 0.0,
        }
    }

    fn slot(&self, key: SphereKey) -> Option<usize> {
        let main = self.spheres.len() - 1;
        match key {
            SphereKey::Main => Some(main),
            SphereKey::Emotion(id) if id.index() < main => Some(id.index()),
            SphereKey::Emotion(_) => None,
        }
    }

    /// Staggered reveal timer fired for `id`.
    pub fn reveal(&mut self, id: EmotionId) {
        match self.slot(SphereKey::Emotion(id)) {
            Some(i) => self.spheres[i].revealed = true,
            None => log::warn!("reveal for unknown sphere {}", id.0),
        }
    }

    /// Merge fade-in timer fired.
    pub fn show_main(&mut self) {
        self.main_revealed = true;
    }

    /// Mark a sphere's render target as available or gone.
    /// Returns false for an unknown key.
    pub fn set_mounted(&mut self, key: SphereKey, mounted: bool) -> bool {
        let Some(i) = self.slot(key) else { return false };
        let sphere = &mut self.spheres[i];
        sphere.mounted = mounted;
        if mounted {
            sphere.warned_unmounted = false;
        }
        true
    }

    /// Reset per-phase flags when `phase` starts. Idempotent within a phase.
    pub fn on_phase_entered(&mut self, phase: AnimationPhase) {
        if self.last_phase == Some(phase) {
            return;
        }
        self.last_phase = Some(phase);
        match phase {
            AnimationPhase::Splitting => {
                for sphere in &mut self.spheres {
                    sphere.revealed = false;
                }
            }
            AnimationPhase::Merging => self.main_revealed = false,
            _ => {}
        }
    }

    fn target_for(
        &self,
        sphere: &SphereVisual,
        snapshot: &SceneSnapshot,
        catalog: &EmotionCatalog,
        class: ViewportClass,
    ) -> SphereTarget {
        match sphere.key {
            SphereKey::Main => main_target(snapshot.phase, class, self.main_revealed),
            SphereKey::Emotion(id) => match catalog.get(id) {
                Some(desc) => emotion_target(id, desc, snapshot, class, sphere.revealed),
                None => SphereTarget::HIDDEN,
            },
        }
    }

    /// Advance every mounted sphere's springs toward this frame's targets.
    /// Pushes `MergeFinished` while merging once the main sphere is back and
    /// everything has settled.
    pub fn advance(
        &mut self,
        snapshot: &SceneSnapshot,
        catalog: &EmotionCatalog,
        class: ViewportClass,
        dt: f32,
        completions: &mut Vec<Completion>,
    ) {
        self.on_phase_entered(snapshot.phase);
        self.time += dt;

        let config = match snapshot.phase {
            AnimationPhase::Focusing | AnimationPhase::Focused => SpringConfig::HEAVY,
            _ => SpringConfig::SNAPPY,
        };
        let breathing = matches!(snapshot.phase, AnimationPhase::Idle | AnimationPhase::Focused);
        let blend = smoothing_factor(BREATH_SMOOTHING, dt);

        let mut all_settled = true;
        for i in 0..self.spheres.len() {
            let target = self.target_for(&self.spheres[i], snapshot, catalog, class);
            let sphere = &mut self.spheres[i];
            if sphere.skip_unmounted() {
                continue;
            }
            sphere.set_config(config);
            sphere.set_target(target);
            let settled = sphere.tick(dt);
            all_settled &= settled;

            let weight_target = if breathing && sphere.scale.is_settled() {
                1.0
            } else {
                0.0
            };
            sphere.breath_weight += (weight_target - sphere.breath_weight) * blend;
        }

        if snapshot.phase == AnimationPhase::Merging && self.main_revealed && all_settled {
            completions.push(Completion::MergeFinished);
        }
    }

    /// Jump every mounted sphere straight to this frame's target (fallback mode).
    pub fn snap_to_targets(
        &mut self,
        snapshot: &SceneSnapshot,
        catalog: &EmotionCatalog,
        class: ViewportClass,
    ) {
        self.on_phase_entered(snapshot.phase);
        for i in 0..self.spheres.len() {
            let target = self.target_for(&self.spheres[i], snapshot, catalog, class);
            let sphere = &mut self.spheres[i];
            if sphere.skip_unmounted() {
                continue;
            }
            sphere.snap(target);
            sphere.breath_weight = 0.0;
        }
    }

    pub fn target(&self, key: SphereKey) -> Option<SphereTarget> {
        self.slot(key).map(|i| self.spheres[i].target)
    }

    /// Current presentation, breathing pulse included.
    pub fn rendered(&self, key: SphereKey) -> Option<SphereTarget> {
        self.slot(key).map(|i| self.rendered_at(i))
    }

    fn rendered_at(&self, i: usize) -> SphereTarget {
        let sphere = &self.spheres[i];
        let wave = (BREATH_RATE * self.time + sphere.breath_phase).sin();
        let pulse = 1.0 + BREATH_AMPLITUDE * sphere.breath_weight * wave;
        SphereTarget {
            position: sphere.position.get(),
            scale: (sphere.scale.get() * pulse).max(0.0),
            opacity: sphere.opacity.get().clamp(0.0, 1.0),
        }
    }

    pub fn is_settled(&self, key: SphereKey) -> bool {
        self.slot(key).is_some_and(|i| self.spheres[i].is_settled())
    }

    pub fn frames(&self) -> impl Iterator<Item = SphereFrame> + '_ {
        self.spheres.iter().enumerate().map(|(i, s)| SphereFrame {
            key: s.key,
            target: s.target,
            rendered: self.rendered_at(i),
            mounted: s.mounted,
        })
    }

    pub fn len(&self) -> usize {
        self.spheres.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spheres.is_empty()
    }

    /// One instance per sphere slot; unmounted spheres are written transparent.
    pub fn write_instances(&self, catalog: &EmotionCatalog, out: &mut Vec<RenderInstance>) {
        out.clear();
        for frame in self.frames() {
            let color = match frame.key {
                SphereKey::Main => MAIN_COLOR,
                SphereKey::Emotion(id) => catalog.get(id).map_or(MAIN_COLOR, |d| d.color),
            };
            let alpha = if frame.mounted {
                frame.rendered.opacity
            } else {
                0.0
            };
            let rendered = frame.rendered;
            out.push(RenderInstance::new(rendered.position, rendered.scale, color, alpha));
        }
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

    fn run(
        state: &mut SphereVisualState,
        catalog: &EmotionCatalog,
        s: &SceneSnapshot,
        frames: usize,
    ) -> Vec<Completion> {
        let mut out = Vec::new();
        for _ in 0..frames {
            state.advance(s, catalog, ViewportClass::Desktop, DT, &mut out);
        }
        out
    }

    #[test]
    fn idle_spheres_settle_on_anchors() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 240);
        for (id, desc) in catalog.iter() {
            let key = SphereKey::Emotion(id);
            assert!(state.is_settled(key), "{}", desc.id);
            assert_eq!(state.rendered(key).unwrap().position, desc.anchor_desktop);
        }
        assert_eq!(state.rendered(SphereKey::Main).unwrap().opacity, 0.0);
    }

    #[test]
    fn splitting_waits_for_reveal() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        let first = catalog.categories()[0];
        let second = catalog.categories()[1];
        state.reveal(first);
        // entering splitting clears earlier flags
        run(&mut state, &catalog, &snap(AnimationPhase::Splitting, None), 1);
        assert_eq!(state.target(SphereKey::Emotion(first)), Some(SphereTarget::HIDDEN));

        state.reveal(first);
        run(&mut state, &catalog, &snap(AnimationPhase::Splitting, None), 1);
        assert_ne!(state.target(SphereKey::Emotion(first)), Some(SphereTarget::HIDDEN));
        assert_eq!(state.target(SphereKey::Emotion(second)), Some(SphereTarget::HIDDEN));
    }

    #[test]
    fn merge_finishes_after_main_returns_and_settles() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 240);

        let merging = snap(AnimationPhase::Merging, None);
        assert!(run(&mut state, &catalog, &merging, 240).is_empty());

        state.show_main();
        let done = run(&mut state, &catalog, &merging, 240);
        assert!(done.contains(&Completion::MergeFinished));
        assert!(state.is_settled(SphereKey::Main));
        assert!(state.rendered(SphereKey::Main).unwrap().opacity > 0.99);
    }

    #[test]
    fn unmounted_sphere_is_skipped_then_resumes() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        let id = catalog.categories()[2];
        let key = SphereKey::Emotion(id);
        assert!(state.set_mounted(key, false));
        run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 30);
        assert_eq!(state.rendered(key).unwrap().scale, 0.0);

        state.set_mounted(key, true);
        run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 30);
        assert!(state.rendered(key).unwrap().scale > 0.0);
        assert!(!state.set_mounted(SphereKey::Emotion(EmotionId(99)), true));
    }

    #[test]
    fn breathing_only_once_settled_in_idle() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        let key = SphereKey::Emotion(catalog.categories()[0]);
        run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 600);
        let target = state.target(key).unwrap().scale;
        let mut deviated = false;
        for _ in 0..120 {
            run(&mut state, &catalog, &snap(AnimationPhase::Idle, None), 1);
            let rendered = state.rendered(key).unwrap().scale;
            assert!((rendered - target).abs() <= target * BREATH_AMPLITUDE + 1e-5);
            deviated |= (rendered - target).abs() > 1e-4;
        }
        assert!(deviated);
        assert!(state.is_settled(key));
    }

    #[test]
    fn snap_reaches_targets_immediately() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        let initial = snap(AnimationPhase::Initial, None);
        state.snap_to_targets(&initial, &catalog, ViewportClass::Desktop);
        assert!(state.is_settled(SphereKey::Main));
        assert_eq!(state.rendered(SphereKey::Main).unwrap().opacity, 1.0);

        let mut out = Vec::new();
        state.write_instances(&catalog, &mut out);
        assert_eq!(out.len(), catalog.len() + 1);
    }

    #[test]
    fn snap_leaves_unmounted_spheres_alone() {
        let catalog = EmotionCatalog::default();
        let mut state = SphereVisualState::new(&catalog);
        let initial = snap(AnimationPhase::Initial, None);
        assert!(state.set_mounted(SphereKey::Main, false));
        state.snap_to_targets(&initial, &catalog, ViewportClass::Desktop);
        assert_eq!(state.rendered(SphereKey::Main).unwrap().opacity, 0.0);

        assert!(state.set_mounted(SphereKey::Main, true));
        state.snap_to_targets(&initial, &catalog, ViewportClass::Desktop);
        assert_eq!(state.rendered(SphereKey::Main).unwrap().opacity, 1.0);
    }
}

//! The emotion overview scene: one object owning every component and the
//! per-frame pipeline that ties them together.
//!
//! Frame order: drain input, tick the clock, take the snapshot, fire due
//! timers, advance particles, spheres and camera, then apply the completion
//! signals raised along the way and rebuild the render buffers.

use glam::Vec2;

use crate::api::config::SceneConfig;
use crate::api::error::ConfigError;
use crate::api::types::{EmotionId, RenderMode, SceneEvent, Viewport, ViewportClass};
use crate::assets::catalog::EmotionCatalog;
use crate::bridge::protocol::FrameInfo;
use crate::components::sphere::SphereKey;
use crate::core::phase::{AnimationPhase, Completion, PhaseController, SceneSnapshot, Transition};
use crate::core::scheduler::{StaggerScheduler, TimerAction};
use crate::core::time::SceneClock;
use crate::input::queue::{InputEvent, InputQueue};
use crate::renderer::camera::CameraPose;
use crate::renderer::instance::RenderBuffer;
use crate::systems::camera::CameraChoreographer;
use crate::systems::particles::ParticleSimulation;
use crate::systems::spheres::SphereVisualState;

pub struct EmotionScene {
    config: SceneConfig,
    catalog: EmotionCatalog,
    mode: RenderMode,
    viewport: Viewport,
    controller: PhaseController,
    scheduler: StaggerScheduler,
    clock: SceneClock,
    particles: ParticleSimulation,
    spheres: SphereVisualState,
    camera: CameraChoreographer,
    input: InputQueue,
    /// Pointer in CSS pixels, `None` while outside the canvas.
    pointer: Option<Vec2>,
    events: Vec<SceneEvent>,
    completions: Vec<Completion>,
    actions: Vec<TimerAction>,
    render: RenderBuffer,
}

impl EmotionScene {
    /// Build a scene after validating `config`. Starts in `intro`.
    pub fn new(
        config: SceneConfig,
        catalog: EmotionCatalog,
        mode: RenderMode,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config, catalog, mode))
    }

    fn build(config: SceneConfig, catalog: EmotionCatalog, mode: RenderMode) -> Self {
        let viewport = Viewport::default();
        let class = viewport.class(config.mobile_breakpoint);
        let particles = ParticleSimulation::new(
            config.pool_size,
            catalog.categories(),
            config.seed,
            config.absorb_duration,
            config.gather_threshold,
        );
        let spheres = SphereVisualState::new(&catalog);
        let render = RenderBuffer::new(spheres.len(), config.pool_size);
        let mut scene = Self {
            controller: PhaseController::new(catalog.len()),
            scheduler: StaggerScheduler::new(),
            clock: SceneClock::new(),
            camera: CameraChoreographer::new(class, config.focus_duration, config.zoom_duration),
            particles,
            spheres,
            input: InputQueue::new(),
            pointer: None,
            events: Vec::with_capacity(config.max_events),
            completions: Vec::new(),
            actions: Vec::new(),
            render,
            config,
            catalog,
            mode,
            viewport,
        };
        scene
            .scheduler
            .on_phase_entered(AnimationPhase::Intro, 0.0, &scene.catalog, &scene.config);
        log::info!(
            "scene ready: {} emotions, {} particles, {:?}",
            scene.catalog.len(),
            scene.particles.len(),
            mode
        );
        scene
    }

    // ── Host input ───────────────────────────────────────────────────────

    /// Queue an input event; applied at the start of the next frame.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.pointer = Some(Vec2::new(x, y)),
            InputEvent::PointerLeave => self.pointer = None,
            InputEvent::HoverSphere(id) => {
                self.set_hovered(id);
            }
            InputEvent::ClickSphere(id) => {
                let snapshot = self.controller.snapshot();
                if snapshot.phase == AnimationPhase::Focused && snapshot.is_selected(id) {
                    self.confirm();
                } else {
                    self.select(id);
                }
            }
            InputEvent::ClickMainSphere => {
                self.start_split();
            }
            InputEvent::Confirm => {
                self.confirm();
            }
            InputEvent::Release => {
                self.release();
            }
            InputEvent::Deselect => {
                self.deselect();
            }
            InputEvent::ReturnToOverview => {
                self.return_to_overview();
            }
            InputEvent::Resize { width, height } => self.resize(width, height),
        }
    }

    // ── Transitions ──────────────────────────────────────────────────────

    fn apply(&mut self, op: impl FnOnce(&mut PhaseController) -> Option<Transition>) -> bool {
        let hovered_before = self.controller.hovered();
        let transition = op(&mut self.controller);
        if let Some(t) = transition {
            self.on_transition(t);
        }
        let hovered = self.controller.hovered();
        if hovered != hovered_before {
            self.push_event(SceneEvent::HoverChanged(hovered));
        }
        transition.is_some()
    }

    fn on_transition(&mut self, t: Transition) {
        let now = self.clock.elapsed();
        self.spheres.on_phase_entered(t.to);
        self.scheduler.on_phase_entered(t.to, now, &self.catalog, &self.config);
        self.push_event(SceneEvent::PhaseChanged {
            from: t.from,
            to: t.to,
        });
        if t.to == AnimationPhase::Transitioning {
            if let Some(id) = self.controller.selected() {
                log::info!("navigate to {}", self.emotion_name(id));
                self.push_event(SceneEvent::Navigate(id));
            }
        }
    }

    fn push_event(&mut self, event: SceneEvent) {
        if self.events.len() >= self.config.max_events {
            log::warn!("event queue full, dropping oldest");
            self.events.remove(0);
        }
        self.events.push(event);
    }

    pub fn select(&mut self, id: EmotionId) -> bool {
        self.apply(|c| c.select(id))
    }

    /// Select by catalog name.
    pub fn select_named(&mut self, name: &str) -> bool {
        match self.catalog.find(name) {
            Some(id) => self.select(id),
            None => {
                log::warn!("select: no emotion named {name:?}");
                false
            }
        }
    }

    pub fn start_split(&mut self) -> bool {
        self.apply(PhaseController::start_split)
    }

    pub fn return_to_overview(&mut self) -> bool {
        self.apply(PhaseController::return_to_overview)
    }

    pub fn confirm(&mut self) -> bool {
        self.apply(PhaseController::confirm)
    }

    pub fn release(&mut self) -> bool {
        self.apply(PhaseController::release)
    }

    pub fn deselect(&mut self) -> bool {
        self.apply(PhaseController::deselect)
    }

    pub fn set_hovered(&mut self, id: Option<EmotionId>) -> bool {
        let changed = self.controller.set_hovered(id);
        if changed {
            self.push_event(SceneEvent::HoverChanged(id));
        }
        changed
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            log::debug!("ignoring resize to {width}x{height}");
            return;
        }
        let before = self.class();
        self.viewport = Viewport::new(width, height);
        let after = self.class();
        if before != after {
            log::info!("layout switched to {:?}", after);
        }
    }

    /// Mark a sphere's render target available (or gone). False for unknown keys.
    pub fn set_sphere_mounted(&mut self, key: SphereKey, mounted: bool) -> bool {
        self.spheres.set_mounted(key, mounted)
    }

    // ── Frame ────────────────────────────────────────────────────────────

    /// Run one frame of `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        for event in self.input.drain() {
            self.handle_input(event);
        }

        self.clock.tick(dt);
        let now = self.clock.elapsed();
        let snapshot = self.controller.snapshot();
        let class = self.class();

        self.actions.clear();
        self.scheduler.advance(now, &mut self.actions);
        for action in &self.actions {
            match *action {
                TimerAction::Reveal(id) => self.spheres.reveal(id),
                TimerAction::ShowMainSphere => self.spheres.show_main(),
                TimerAction::Complete(signal) => self.completions.push(signal),
            }
        }

        match self.mode {
            RenderMode::Animated => {
                let pointer = self.pointer_world();
                self.particles.set_pointer(pointer);
                self.particles
                    .advance(&snapshot, &self.catalog, class, now, dt, &mut self.completions);
                self.spheres
                    .advance(&snapshot, &self.catalog, class, dt, &mut self.completions);
                self.camera
                    .advance(&snapshot, &self.catalog, class, dt, &mut self.completions);
            }
            RenderMode::Fallback => {
                self.camera.reset(class);
                self.spheres.snap_to_targets(&snapshot, &self.catalog, class);
                if let Some(signal) = Completion::for_phase(snapshot.phase) {
                    self.completions.push(signal);
                }
            }
        }

        let completions = std::mem::take(&mut self.completions);
        for signal in &completions {
            let signal = *signal;
            self.apply(|c| c.complete(signal));
        }
        self.completions = completions;
        self.completions.clear();

        self.rebuild_render();
    }

    fn pointer_world(&self) -> Option<glam::Vec3> {
        let px = self.pointer?;
        let ndc = Vec2::new(
            px.x / self.viewport.width * 2.0 - 1.0,
            1.0 - px.y / self.viewport.height * 2.0,
        );
        if !ndc.is_finite() {
            return None;
        }
        self.camera.pose().unproject_to_plane(self.viewport.aspect(), ndc)
    }

    fn rebuild_render(&mut self) {
        self.spheres.write_instances(&self.catalog, &mut self.render.spheres);
        match self.mode {
            RenderMode::Animated => {
                self.particles.write_instances(&self.catalog, &mut self.render.particles)
            }
            RenderMode::Fallback => self.render.particles.clear(),
        }
        self.render.camera = self.camera.pose().uniform(self.viewport.aspect());
    }

    // ── Output ───────────────────────────────────────────────────────────

    /// Take the events raised since the last drain.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn snapshot(&self) -> SceneSnapshot {
        self.controller.snapshot()
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.controller.snapshot())
    }

    pub fn phase(&self) -> AnimationPhase {
        self.controller.phase()
    }

    pub fn frame_info(&self) -> FrameInfo {
        FrameInfo {
            frame: self.clock.frame(),
            snapshot: self.controller.snapshot(),
            fallback: self.mode == RenderMode::Fallback,
            aspect: self.viewport.aspect(),
            elapsed: self.clock.elapsed(),
        }
    }

    pub fn render(&self) -> &RenderBuffer {
        &self.render
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn catalog(&self) -> &EmotionCatalog {
        &self.catalog
    }

    pub fn mode(&self) -> RenderMode {
        self.mode
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn class(&self) -> ViewportClass {
        self.viewport.class(self.config.mobile_breakpoint)
    }

    pub fn elapsed(&self) -> f64 {
        self.clock.elapsed()
    }

    pub fn frame(&self) -> u64 {
        self.clock.frame()
    }

    pub fn particles(&self) -> &ParticleSimulation {
        &self.particles
    }

    pub fn spheres(&self) -> &SphereVisualState {
        &self.spheres
    }

    pub fn camera_pose(&self) -> CameraPose {
        self.camera.pose()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    fn emotion_name(&self, id: EmotionId) -> &str {
        self.catalog.get(id).map_or("?", |d| d.id.as_str())
    }
}

impl Default for EmotionScene {
    fn default() -> Self {
        Self::build(SceneConfig::default(), EmotionCatalog::default(), RenderMode::Animated)
    }
}

use sphere_engine::{
    pack_frame, EmotionCatalog, EmotionScene, FixedTimestep, InputEvent, ProtocolLayout,
    RenderMode, SceneConfig, SphereKey, WireEvent,
};

/// Wires the scene to the host's animation frame loop.
///
/// The bridge keeps one runner in a `thread_local!` and exports free functions
/// via `#[wasm_bindgen]`; JS reads the packed frame through `frame_ptr`.
pub struct SceneRunner {
    scene: EmotionScene,
    timestep: FixedTimestep,
    layout: ProtocolLayout,
    /// Events drained this tick, already in wire form.
    events: Vec<WireEvent>,
    /// Packed frame for SharedArrayBuffer / memory view reads.
    frame: Vec<f32>,
}

impl SceneRunner {
    pub fn new(scene: EmotionScene) -> Self {
        let config = scene.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout =
            ProtocolLayout::new(scene.spheres().len(), config.pool_size, config.max_events);
        let mut runner = Self {
            scene,
            timestep,
            layout,
            events: Vec::new(),
            frame: Vec::new(),
        };
        runner.pack();
        runner
    }

    /// Build a runner from JSON overrides. Empty strings mean defaults.
    pub fn from_json(
        config_json: &str,
        catalog_json: &str,
        mode: RenderMode,
    ) -> Result<Self, sphere_engine::ConfigError> {
        let config = if config_json.trim().is_empty() {
            SceneConfig::default()
        } else {
            SceneConfig::from_json(config_json)?
        };
        let catalog = if catalog_json.trim().is_empty() {
            EmotionCatalog::default()
        } else {
            EmotionCatalog::from_json(catalog_json)?
        };
        Ok(Self::new(EmotionScene::new(config, catalog, mode)?))
    }

    pub fn push_input(&mut self, event: InputEvent) {
        self.scene.push_input(event);
    }

    /// Run the fixed steps owed for `dt` seconds of wall time and repack the frame.
    pub fn tick(&mut self, dt: f32) {
        let steps = self.timestep.accumulate(dt);
        let step_dt = self.timestep.dt();
        for _ in 0..steps {
            self.scene.advance(step_dt);
        }

        self.events.clear();
        self.events
            .extend(self.scene.drain_events().iter().map(|event| event.to_wire()));
        self.pack();
    }

    /// Page came back from the background; drop any partial step.
    pub fn resume(&mut self) {
        self.timestep.reset();
    }

    pub fn set_mounted(&mut self, key: SphereKey, mounted: bool) -> bool {
        self.scene.set_sphere_mounted(key, mounted)
    }

    fn pack(&mut self) {
        let info = self.scene.frame_info();
        pack_frame(&self.layout, &info, self.scene.render(), &self.events, &mut self.frame);
    }

    pub fn scene(&self) -> &EmotionScene {
        &self.scene
    }

    pub fn layout(&self) -> &ProtocolLayout {
        &self.layout
    }

    /// Wire events produced by the last tick.
    pub fn events(&self) -> &[WireEvent] {
        &self.events
    }

    // ---- Pointer accessors for memory view reads ----

    pub fn frame_ptr(&self) -> *const f32 {
        self.frame.as_ptr()
    }

    pub fn frame_len(&self) -> u32 {
        self.frame.len() as u32
    }

    pub fn frame(&self) -> &[f32] {
        &self.frame
    }

    pub fn is_fallback(&self) -> bool {
        self.scene.mode() == RenderMode::Fallback
    }
}

pub mod capability;
pub mod runner;

pub use runner::SceneRunner;

use std::cell::RefCell;

use sphere_engine::{EmotionId, InputEvent, RenderMode, SphereKey};
use wasm_bindgen::prelude::*;

thread_local! {
    static RUNNER: RefCell<Option<SceneRunner>> = const { RefCell::new(None) };
}

/// Run `f` against the live runner. Before `scene_init` this logs and
/// returns `R::default()`.
fn with_runner<R: Default>(f: impl FnOnce(&mut SceneRunner) -> R) -> R {
    RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
        Some(runner) => f(runner),
        None => {
            log::warn!("scene not initialized; call scene_init() first");
            R::default()
        }
    })
}

fn install(runner: SceneRunner) {
    RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
}

/// Create the scene. Empty JSON strings select the built-in config and catalog.
/// Invalid overrides are logged and replaced by defaults so the page still renders.
#[wasm_bindgen]
pub fn scene_init(config_json: &str, catalog_json: &str, width: f32, height: f32) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Info);

    let mode = capability::detect_mode();
    let runner = match SceneRunner::from_json(config_json, catalog_json, mode) {
        Ok(runner) => runner,
        Err(err) => {
            log::error!("scene_init: {err}; using defaults");
            match SceneRunner::from_json("", "", mode) {
                Ok(runner) => runner,
                Err(err) => {
                    log::error!("scene_init: defaults rejected: {err}");
                    return;
                }
            }
        }
    };
    install(runner);
    with_runner(|r| {
        r.push_input(InputEvent::Resize { width, height });
        r.tick(0.0);
    });
    log::info!("emotion scene: initialized ({:?})", mode);
}

/// Advance by `dt` seconds of wall time.
#[wasm_bindgen]
pub fn scene_tick(dt: f32) {
    with_runner(|r| r.tick(dt));
}

/// The page became visible again.
#[wasm_bindgen]
pub fn scene_resume() {
    with_runner(|r| r.resume());
}

// ---- Input ----

#[wasm_bindgen]
pub fn scene_pointer_move(x: f32, y: f32) {
    with_runner(|r| r.push_input(InputEvent::PointerMove { x, y }));
}

#[wasm_bindgen]
pub fn scene_pointer_leave() {
    with_runner(|r| r.push_input(InputEvent::PointerLeave));
}

/// `id < 0` clears the hover.
#[wasm_bindgen]
pub fn scene_hover(id: i32) {
    with_runner(|r| r.push_input(InputEvent::HoverSphere(EmotionId::from_wire(id))));
}

#[wasm_bindgen]
pub fn scene_click(id: u32) {
    with_runner(|r| r.push_input(InputEvent::ClickSphere(EmotionId(id))));
}

#[wasm_bindgen]
pub fn scene_click_main() {
    with_runner(|r| r.push_input(InputEvent::ClickMainSphere));
}

#[wasm_bindgen]
pub fn scene_confirm() {
    with_runner(|r| r.push_input(InputEvent::Confirm));
}

#[wasm_bindgen]
pub fn scene_release() {
    with_runner(|r| r.push_input(InputEvent::Release));
}

#[wasm_bindgen]
pub fn scene_deselect() {
    with_runner(|r| r.push_input(InputEvent::Deselect));
}

#[wasm_bindgen]
pub fn scene_return() {
    with_runner(|r| r.push_input(InputEvent::ReturnToOverview));
}

#[wasm_bindgen]
pub fn scene_resize(width: f32, height: f32) {
    with_runner(|r| r.push_input(InputEvent::Resize { width, height }));
}

/// Report a sphere mesh mounting or unmounting. `id < 0` is the main sphere.
#[wasm_bindgen]
pub fn scene_set_mounted(id: i32, mounted: bool) -> bool {
    let key = match EmotionId::from_wire(id) {
        Some(id) => SphereKey::Emotion(id),
        None => SphereKey::Main,
    };
    with_runner(|r| r.set_mounted(key, mounted))
}

// ---- Data accessors ----

/// Phase, selection, hover and split flag as JSON.
#[wasm_bindgen]
pub fn scene_state_json() -> String {
    with_runner(|r| match r.scene().snapshot_json() {
        Ok(json) => json,
        Err(err) => {
            log::error!("scene_state_json: {err}");
            String::new()
        }
    })
}

/// Resolve a catalog name to its wire id, or -1.
#[wasm_bindgen]
pub fn emotion_index(name: &str) -> i32 {
    with_runner(|r| r.scene().catalog().find(name).map_or(-1, |id| id.0 as i32))
}

#[wasm_bindgen]
pub fn get_frame_ptr() -> *const f32 {
    RUNNER.with(|cell| {
        cell.borrow()
            .as_ref()
            .map_or(std::ptr::null(), |r| r.frame_ptr())
    })
}

#[wasm_bindgen]
pub fn get_frame_len() -> u32 {
    with_runner(|r| r.frame_len())
}

#[wasm_bindgen]
pub fn get_buffer_total_floats() -> u32 {
    with_runner(|r| r.layout().buffer_total_floats as u32)
}

#[wasm_bindgen]
pub fn is_fallback() -> bool {
    with_runner(|r| r.is_fallback())
}

#[wasm_bindgen]
pub fn get_render_mode() -> u32 {
    with_runner(|r| match r.scene().mode() {
        RenderMode::Animated => 0,
        RenderMode::Fallback => 1,
    })
}

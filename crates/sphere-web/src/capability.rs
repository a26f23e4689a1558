use sphere_engine::RenderMode;
use wasm_bindgen::JsCast;
use web_sys::HtmlCanvasElement;

/// Probe for a WebGL context on a throwaway canvas.
pub fn webgl_available() -> bool {
    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        log::warn!("capability: no document");
        return false;
    };
    let canvas = match document.create_element("canvas") {
        Ok(el) => match el.dyn_into::<HtmlCanvasElement>() {
            Ok(canvas) => canvas,
            Err(_) => return false,
        },
        Err(err) => {
            log::warn!("capability: cannot create canvas: {:?}", err);
            return false;
        }
    };
    ["webgl2", "webgl"]
        .iter()
        .any(|kind| matches!(canvas.get_context(kind), Ok(Some(_))))
}

/// Pick the render mode once at mount.
pub fn detect_mode() -> RenderMode {
    if webgl_available() {
        RenderMode::Animated
    } else {
        log::info!("WebGL unavailable, using fallback rendering");
        RenderMode::Fallback
    }
}

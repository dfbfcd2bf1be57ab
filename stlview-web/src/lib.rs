/// stlview Web - WASM bindings producing scene documents
///
/// The browser (or a notebook front end) passes STL bytes in and receives the
/// renderer as JSON: scene children tagged by `"type"`, the camera node
/// index, orbit-control settings and the viewport size. A three.js widget can
/// build its scene graph directly from that document.
use stlview_core::{Color, Error, Renderer, VisualizeOptions, Visualizer};
use wasm_bindgen::prelude::*;

/// Interactive renderer kept alive on the Rust side
#[wasm_bindgen]
pub struct WebRenderer {
    renderer: Renderer,
}

#[wasm_bindgen]
impl WebRenderer {
    /// Build a renderer from STL bytes
    ///
    /// `color` is `#rrggbb` or a CSS name; `None` uses the default mesh color.
    #[wasm_bindgen(constructor)]
    pub fn new(
        data: &[u8],
        width: u32,
        height: u32,
        grid_unit: f32,
        color: Option<String>,
    ) -> Result<WebRenderer, JsValue> {
        build_renderer(data, width, height, grid_unit, color.as_deref())
            .map(|renderer| WebRenderer { renderer })
            .map_err(to_js_error)
    }

    /// Current scene document as JSON
    #[wasm_bindgen(js_name = sceneJson)]
    pub fn scene_json(&self) -> Result<String, JsValue> {
        self.renderer
            .to_json()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Camera position as `[x, y, z]`
    #[wasm_bindgen(js_name = cameraPosition)]
    pub fn camera_position(&self) -> Vec<f32> {
        self.renderer
            .camera()
            .map(|camera| camera.position.coords.as_slice().to_vec())
            .unwrap_or_default()
    }

    /// Orbit by angle deltas in radians
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        self.renderer.rotate(d_azimuth, d_polar);
    }

    /// Scale the camera distance; factors below 1 zoom in
    pub fn zoom(&mut self, factor: f32) {
        self.renderer.dolly(factor);
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        self.renderer.pan(dx, dy);
    }

    pub fn reset(&mut self) {
        self.renderer.reset_view();
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.renderer
            .resize(width, height)
            .map_err(|e| to_js_error(e.into()))
    }
}

/// One-shot conversion of STL bytes to a scene document
#[wasm_bindgen(js_name = visualizeStl)]
pub fn visualize_stl(
    data: &[u8],
    width: u32,
    height: u32,
    grid_unit: f32,
    color: Option<String>,
) -> Result<String, JsValue> {
    let renderer =
        build_renderer(data, width, height, grid_unit, color.as_deref()).map_err(to_js_error)?;
    renderer
        .to_json()
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn build_renderer(
    data: &[u8],
    width: u32,
    height: u32,
    grid_unit: f32,
    color: Option<&str>,
) -> Result<Renderer, Error> {
    let color = match color {
        Some(color) => color.parse::<Color>()?,
        None => VisualizeOptions::default().color,
    };
    let options = VisualizeOptions {
        width,
        height,
        grid_unit,
        color,
    };
    options.validate()?;

    let visualizer = Visualizer::from_bytes(data)?;
    log::debug!(
        "building web scene for {} triangles",
        visualizer.mesh().triangle_count()
    );
    let renderer = visualizer.create_renderer(
        visualizer.create_mesh(options.color),
        visualizer.create_camera(),
        options.width,
        options.height,
        options.grid_unit,
    )?;
    Ok(renderer)
}

fn to_js_error(error: Error) -> JsValue {
    JsValue::from_str(&error.to_string())
}

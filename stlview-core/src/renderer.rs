/// Interactive view of a scene: scene graph, camera and orbit controls
use serde::Serialize;

use crate::config::validate_viewport;
use crate::controls::OrbitControls;
use crate::error::SceneError;
use crate::projection::PerspectiveCamera;
use crate::scene::{Node, NodeId, Scene};

#[derive(Debug, Clone, Serialize)]
pub struct Renderer {
    scene: Scene,
    camera: NodeId,
    controls: OrbitControls,
    width: u32,
    height: u32,
}

impl Renderer {
    /// Bind `scene` to the camera node `camera`
    ///
    /// Fails when the viewport is empty. `camera` must refer to a
    /// [`Node::Camera`] in `scene`.
    pub fn new(
        mut scene: Scene,
        camera: NodeId,
        width: u32,
        height: u32,
    ) -> Result<Self, SceneError> {
        validate_viewport(width, height)?;

        let controls = match scene.get_mut(camera) {
            Some(Node::Camera(cam)) => {
                cam.set_aspect(width, height);
                OrbitControls::new(cam)
            }
            _ => return Err(SceneError::MissingCamera(camera.0)),
        };

        Ok(Self {
            scene,
            camera,
            controls,
            width,
            height,
        })
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn controls(&self) -> &OrbitControls {
        &self.controls
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn camera_id(&self) -> NodeId {
        self.camera
    }

    pub fn camera(&self) -> Option<&PerspectiveCamera> {
        match self.scene.get(self.camera) {
            Some(Node::Camera(camera)) => Some(camera),
            _ => None,
        }
    }

    pub fn camera_mut(&mut self) -> Option<&mut PerspectiveCamera> {
        match self.scene.get_mut(self.camera) {
            Some(Node::Camera(camera)) => Some(camera),
            _ => None,
        }
    }

    /// Orbit the camera around the controls' target
    pub fn rotate(&mut self, d_azimuth: f32, d_polar: f32) {
        if let Some(Node::Camera(camera)) = self.scene.get_mut(self.camera) {
            self.controls.rotate(camera, d_azimuth, d_polar);
        }
    }

    pub fn dolly(&mut self, factor: f32) {
        if let Some(Node::Camera(camera)) = self.scene.get_mut(self.camera) {
            self.controls.dolly(camera, factor);
        }
    }

    pub fn pan(&mut self, dx: f32, dy: f32) {
        if let Some(Node::Camera(camera)) = self.scene.get_mut(self.camera) {
            self.controls.pan(camera, dx, dy);
        }
    }

    pub fn reset_view(&mut self) {
        if let Some(Node::Camera(camera)) = self.scene.get_mut(self.camera) {
            self.controls.reset(camera);
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), SceneError> {
        validate_viewport(width, height)?;
        self.width = width;
        self.height = height;
        if let Some(camera) = self.camera_mut() {
            camera.set_aspect(width, height);
        }
        Ok(())
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}

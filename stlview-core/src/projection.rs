/// Camera and projection utilities
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

use crate::scene::DirectionalLight;

/// Projection mode for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProjectionMode {
    Orthographic,
    Perspective,
}

/// Camera looking from `position` toward `target`
///
/// `fov` is the vertical field of view in degrees. Lights in `children` are
/// attached to the camera and move with it; their positions are camera-local.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerspectiveCamera {
    pub position: Point3<f32>,
    pub target: Point3<f32>,
    pub up: Vector3<f32>,
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    pub mode: ProjectionMode,
    pub children: Vec<DirectionalLight>,
}

impl PerspectiveCamera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            position: Point3::new(0.0, 0.0, 5.0),
            target: Point3::origin(),
            up: Vector3::new(0.0, 1.0, 0.0),
            fov: 45.0,
            aspect: width as f32 / height.max(1) as f32,
            near: 0.1,
            far: 2000.0,
            mode: ProjectionMode::Perspective,
            children: Vec::new(),
        }
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).norm()
    }

    /// Up vector usable for the view matrix
    ///
    /// Falls back to +Y (or +X) when `up` is parallel to the view direction.
    pub fn effective_up(&self) -> Vector3<f32> {
        let forward = self.target - self.position;
        [self.up, Vector3::y(), Vector3::x()]
            .into_iter()
            .find(|up| forward.cross(up).norm() > 1e-6 * forward.norm().max(1.0))
            .unwrap_or(self.up)
    }

    /// Create the view matrix (camera transformation)
    pub fn view_matrix(&self) -> Matrix4<f32> {
        Matrix4::look_at_rh(&self.position, &self.target, &self.effective_up())
    }

    /// Camera-local to world transform
    pub fn world_matrix(&self) -> Matrix4<f32> {
        self.view_matrix()
            .try_inverse()
            .unwrap_or_else(Matrix4::identity)
    }

    /// Create the projection matrix
    pub fn projection_matrix(&self) -> Matrix4<f32> {
        let fovy = self.fov.to_radians();
        match self.mode {
            ProjectionMode::Perspective => {
                Matrix4::new_perspective(self.aspect, fovy, self.near, self.far)
            }
            ProjectionMode::Orthographic => {
                // Match the perspective view's size at the target distance
                let height = 2.0 * self.distance() * (fovy / 2.0).tan();
                let width = height * self.aspect;
                Matrix4::new_orthographic(
                    -width / 2.0,
                    width / 2.0,
                    -height / 2.0,
                    height / 2.0,
                    self.near,
                    self.far,
                )
            }
        }
    }

    /// Project a 3D point to screen space without viewport clipping
    ///
    /// Returns `None` for points behind the camera or outside the depth range.
    pub fn project_point(
        &self,
        point: &Point3<f32>,
        model_matrix: &Matrix4<f32>,
        width: u32,
        height: u32,
    ) -> Option<(f32, f32, f32)> {
        let mvp = self.projection_matrix() * self.view_matrix() * model_matrix;
        let clip = mvp * point.to_homogeneous();

        // Prevent division by near-zero w
        if clip.w <= 1e-6 {
            return None;
        }

        let ndc = clip.xyz() / clip.w;
        if !(-1.0..=1.0).contains(&ndc.z) {
            return None;
        }

        Some(to_screen(ndc.x, ndc.y, ndc.z, width, height))
    }

    /// Project a world-space line segment, clipped to the near and far planes
    ///
    /// Returns `None` when no part of the segment lies within the depth range.
    pub fn project_segment(
        &self,
        start: &Point3<f32>,
        end: &Point3<f32>,
        width: u32,
        height: u32,
    ) -> Option<[(f32, f32, f32); 2]> {
        let view = self.view_matrix();
        let a = view.transform_point(start);
        let b = view.transform_point(end);

        // The camera looks down -Z
        let (low, high) = (-self.far, -self.near);
        let dz = b.z - a.z;
        let (mut t0, mut t1) = (0.0f32, 1.0f32);
        if dz.abs() <= f32::EPSILON {
            if a.z < low || a.z > high {
                return None;
            }
        } else {
            let (ta, tb) = ((low - a.z) / dz, (high - a.z) / dz);
            t0 = t0.max(ta.min(tb));
            t1 = t1.min(ta.max(tb));
            if t0 > t1 {
                return None;
            }
        }

        let projection = self.projection_matrix();
        let project = |t: f32| {
            let p = a + (b - a) * t;
            let clip = projection * p.to_homogeneous();
            let ndc = clip.xyz() / clip.w;
            to_screen(ndc.x, ndc.y, ndc.z.clamp(-1.0, 1.0), width, height)
        };
        Some([project(t0), project(t1)])
    }
}

fn to_screen(x: f32, y: f32, depth: f32, width: u32, height: u32) -> (f32, f32, f32) {
    let screen_x = (x + 1.0) * 0.5 * width as f32;
    let screen_y = (1.0 - y) * 0.5 * height as f32;
    (screen_x, screen_y, depth)
}

impl Default for PerspectiveCamera {
    fn default() -> Self {
        Self::new(800, 600)
    }
}

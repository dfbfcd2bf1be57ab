/// Orbit-style camera controls
///
/// The camera circles `target` on a sphere, with +Z as the pole. Rotation
/// changes azimuth (around Z) and polar angle (from +Z), dolly scales the
/// radius and pan slides camera and target together in the view plane.
use nalgebra::{Point3, Vector3};
use serde::Serialize;

use crate::projection::PerspectiveCamera;

/// Keeps the polar angle off the poles where the view would flip
const POLAR_EPSILON: f32 = 1e-3;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrbitControls {
    pub target: Point3<f32>,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    #[serde(skip)]
    saved: Option<(Point3<f32>, Point3<f32>)>,
}

impl OrbitControls {
    /// Controls for `camera`, remembering its current view for [`reset`](Self::reset)
    pub fn new(camera: &PerspectiveCamera) -> Self {
        Self {
            target: camera.target,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            saved: Some((camera.position, camera.target)),
        }
    }

    /// Orbit by angle deltas in radians (scaled by `rotate_speed`)
    pub fn rotate(&mut self, camera: &mut PerspectiveCamera, d_azimuth: f32, d_polar: f32) {
        let offset = camera.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON {
            return;
        }

        let azimuth = offset.y.atan2(offset.x) + d_azimuth * self.rotate_speed;
        let polar = ((offset.z / radius).clamp(-1.0, 1.0).acos() + d_polar * self.rotate_speed)
            .clamp(POLAR_EPSILON, std::f32::consts::PI - POLAR_EPSILON);

        camera.position = self.target + spherical_offset(radius, azimuth, polar);
        camera.target = self.target;
    }

    /// Scale the distance to the target; factors below 1 move closer
    pub fn dolly(&mut self, camera: &mut PerspectiveCamera, factor: f32) {
        let offset = camera.position - self.target;
        let radius = offset.norm();
        if radius <= f32::EPSILON || factor <= 0.0 {
            return;
        }

        let scaled = radius * factor.powf(self.zoom_speed);
        let clamped = scaled
            .min(self.max_distance)
            .max(self.min_distance.max(f32::EPSILON));
        camera.position = self.target + offset * (clamped / radius);
        camera.target = self.target;
    }

    /// Move camera and target in the view plane
    ///
    /// Deltas are fractions of the distance to the target, so panning feels
    /// the same at every zoom level.
    pub fn pan(&mut self, camera: &mut PerspectiveCamera, dx: f32, dy: f32) {
        let forward = self.target - camera.position;
        let distance = forward.norm();
        let Some(forward) = forward.try_normalize(f32::EPSILON) else {
            return;
        };
        let Some(right) = forward.cross(&camera.effective_up()).try_normalize(f32::EPSILON)
        else {
            return;
        };
        let up = right.cross(&forward);

        let movement: Vector3<f32> = (right * dx + up * dy) * distance * self.pan_speed;
        camera.position += movement;
        self.target += movement;
        camera.target = self.target;
    }

    /// Restore the view the controls were created with
    pub fn reset(&mut self, camera: &mut PerspectiveCamera) {
        if let Some((position, target)) = self.saved {
            camera.position = position;
            camera.target = target;
            self.target = target;
        }
    }
}

fn spherical_offset(radius: f32, azimuth: f32, polar: f32) -> Vector3<f32> {
    Vector3::new(
        radius * polar.sin() * azimuth.cos(),
        radius * polar.sin() * azimuth.sin(),
        radius * polar.cos(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn camera_at(position: Point3<f32>) -> PerspectiveCamera {
        let mut camera = PerspectiveCamera::new(400, 400);
        camera.position = position;
        camera.up = Vector3::z();
        camera
    }

    #[test]
    fn test_rotate_preserves_distance() {
        let mut camera = camera_at(Point3::new(10.0, 5.0, 3.0));
        let mut controls = OrbitControls::new(&camera);
        let before = camera.distance();

        controls.rotate(&mut camera, 0.7, -0.3);
        assert!((camera.distance() - before).abs() < 1e-3);
        assert_ne!(camera.position, Point3::new(10.0, 5.0, 3.0));
    }

    #[test]
    fn test_azimuth_quarter_turn() {
        let mut camera = camera_at(Point3::new(10.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(&camera);

        controls.rotate(&mut camera, FRAC_PI_2, 0.0);
        assert!((camera.position - Point3::new(0.0, 10.0, 0.0)).norm() < 1e-4);
    }

    #[test]
    fn test_polar_is_clamped_at_pole() {
        let mut camera = camera_at(Point3::new(10.0, 0.0, 0.0));
        let mut controls = OrbitControls::new(&camera);

        controls.rotate(&mut camera, 0.0, -PI);
        assert!(camera.position.z < 10.0);
        assert!(camera.position.x > 0.0);
        assert!((camera.distance() - 10.0).abs() < 1e-3);
    }

    #[test]
    fn test_dolly_respects_limits() {
        let mut camera = camera_at(Point3::new(0.0, 0.0, 10.0));
        let mut controls = OrbitControls::new(&camera);
        controls.min_distance = 4.0;

        controls.dolly(&mut camera, 0.5);
        assert!((camera.distance() - 5.0).abs() < 1e-4);
        controls.dolly(&mut camera, 0.5);
        assert!((camera.distance() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn test_pan_then_reset() {
        let mut camera = camera_at(Point3::new(0.0, -10.0, 0.0));
        let mut controls = OrbitControls::new(&camera);

        controls.pan(&mut camera, 0.1, 0.0);
        assert!((controls.target.x - 1.0).abs() < 1e-4);
        assert!((camera.position.x - 1.0).abs() < 1e-4);
        assert_eq!(camera.target, controls.target);

        controls.reset(&mut camera);
        assert_eq!(camera.position, Point3::new(0.0, -10.0, 0.0));
        assert_eq!(controls.target, Point3::origin());
    }
}

/// Object orientation and model matrices
use nalgebra::{Matrix4, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// Rotation around the three axes (in radians), applied X then Y then Z
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Euler {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Euler {
    /// Rotate by delta amounts (in radians)
    pub fn rotate(&mut self, dx: f32, dy: f32, dz: f32) {
        self.x += dx;
        self.y += dy;
        self.z += dz;
    }

    pub fn rotate_x(&mut self, angle: f32) {
        self.rotate(angle, 0.0, 0.0);
    }

    pub fn rotate_z(&mut self, angle: f32) {
        self.rotate(0.0, 0.0, angle);
    }
}

/// Matrix builders for object transforms
pub struct Transform;

impl Transform {
    pub fn rotation_matrix(rotation: &Euler) -> Matrix4<f32> {
        let rx = Matrix4::new_rotation(Vector3::new(rotation.x, 0.0, 0.0));
        let ry = Matrix4::new_rotation(Vector3::new(0.0, rotation.y, 0.0));
        let rz = Matrix4::new_rotation(Vector3::new(0.0, 0.0, rotation.z));

        // Apply rotations in order: X, Y, Z
        rz * ry * rx
    }

    pub fn translation_matrix(x: f32, y: f32, z: f32) -> Matrix4<f32> {
        Matrix4::new_translation(&Vector3::new(x, y, z))
    }

    /// Local-to-world matrix of an object: rotate about its origin, then place it
    pub fn model_matrix(position: &Point3<f32>, rotation: &Euler) -> Matrix4<f32> {
        Self::translation_matrix(position.x, position.y, position.z)
            * Self::rotation_matrix(rotation)
    }
}

/// Axis-aligned bounding boxes
use nalgebra::{Point3, Vector3};

use crate::geometry::Mesh;

/// Component-wise min/max corners of a set of points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point3<f32>,
    pub max: Point3<f32>,
}

impl Bounds {
    pub fn new(min: Point3<f32>, max: Point3<f32>) -> Self {
        Self { min, max }
    }

    /// Bounds of every vertex in the mesh, or `None` when it has no triangles
    pub fn from_mesh(mesh: &Mesh) -> Option<Self> {
        let mut vertices = mesh.vertices();
        let first = *vertices.next()?;

        Some(vertices.fold(Self::new(first, first), |bounds, v| Self {
            min: bounds.min.inf(v),
            max: bounds.max.sup(v),
        }))
    }

    /// Grow the box so that it contains the origin
    pub fn including_origin(&self) -> Self {
        let origin = Point3::origin();
        Self {
            min: self.min.inf(&origin),
            max: self.max.sup(&origin),
        }
    }

    /// Round the corners outward to whole multiples of `unit`
    pub fn snapped(&self, unit: f32) -> Self {
        Self {
            min: self.min.map(|c| (c / unit).floor() * unit),
            max: self.max.map(|c| (c / unit).ceil() * unit),
        }
    }

    pub fn size(&self) -> Vector3<f32> {
        self.max - self.min
    }

    /// Largest coordinate of the max corner
    pub fn max_coordinate(&self) -> f32 {
        self.max.coords.max()
    }

    /// Largest absolute coordinate of either corner
    pub fn max_magnitude(&self) -> f32 {
        self.min.coords.amax().max(self.max.coords.amax())
    }
}

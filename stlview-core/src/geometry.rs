/// Triangle mesh as read from an STL file
use nalgebra::{Point3, Vector3};

/// A facet: three vertex positions and the face normal stored with them
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub normal: Vector3<f32>,
    pub vertices: [Point3<f32>; 3],
}

impl Triangle {
    pub fn new(normal: Vector3<f32>, v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        Self {
            normal,
            vertices: [v0, v1, v2],
        }
    }

    /// Create a triangle whose normal is derived from the winding order
    pub fn from_vertices(v0: Point3<f32>, v1: Point3<f32>, v2: Point3<f32>) -> Self {
        let mut triangle = Self::new(Vector3::zeros(), v0, v1, v2);
        triangle.normal = triangle.calculate_normal();
        triangle
    }

    /// Calculate the face normal from the triangle's vertices
    ///
    /// Degenerate triangles yield a zero vector.
    pub fn calculate_normal(&self) -> Vector3<f32> {
        let [v0, v1, v2] = self.vertices;
        let edge1 = v1 - v0;
        let edge2 = v2 - v0;

        edge1
            .cross(&edge2)
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vector3::zeros)
    }

    pub fn is_finite(&self) -> bool {
        self.normal.iter().all(|c| c.is_finite())
            && self
                .vertices
                .iter()
                .all(|v| v.coords.iter().all(|c| c.is_finite()))
    }
}

/// A 3D mesh composed of triangles
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn vertex_count(&self) -> usize {
        self.triangles.len() * 3
    }

    pub fn vertices(&self) -> impl Iterator<Item = &Point3<f32>> {
        self.triangles.iter().flat_map(|t| t.vertices.iter())
    }

    /// Axis-aligned box centered at the origin
    pub fn cuboid(size_x: f32, size_y: f32, size_z: f32) -> Self {
        let h = Vector3::new(size_x, size_y, size_z) / 2.0;
        let corner = |sx: f32, sy: f32, sz: f32| Point3::new(sx * h.x, sy * h.y, sz * h.z);

        // Each face as a normal and its four corners, counter-clockwise seen from outside
        let faces: [([f32; 3], [[f32; 3]; 4]); 6] = [
            ([0.0, 0.0, 1.0], [[-1.0, -1.0, 1.0], [1.0, -1.0, 1.0], [1.0, 1.0, 1.0], [-1.0, 1.0, 1.0]]),
            ([0.0, 0.0, -1.0], [[-1.0, -1.0, -1.0], [-1.0, 1.0, -1.0], [1.0, 1.0, -1.0], [1.0, -1.0, -1.0]]),
            ([0.0, 1.0, 0.0], [[-1.0, 1.0, -1.0], [-1.0, 1.0, 1.0], [1.0, 1.0, 1.0], [1.0, 1.0, -1.0]]),
            ([0.0, -1.0, 0.0], [[-1.0, -1.0, -1.0], [1.0, -1.0, -1.0], [1.0, -1.0, 1.0], [-1.0, -1.0, 1.0]]),
            ([1.0, 0.0, 0.0], [[1.0, -1.0, -1.0], [1.0, 1.0, -1.0], [1.0, 1.0, 1.0], [1.0, -1.0, 1.0]]),
            ([-1.0, 0.0, 0.0], [[-1.0, -1.0, -1.0], [-1.0, -1.0, 1.0], [-1.0, 1.0, 1.0], [-1.0, 1.0, -1.0]]),
        ];

        let mut mesh = Self::with_capacity(12);
        for (normal, quad) in faces {
            let normal = Vector3::from(normal);
            let [a, b, c, d] = quad.map(|[x, y, z]| corner(x, y, z));
            mesh.add_triangle(Triangle::new(normal, a, b, c));
            mesh.add_triangle(Triangle::new(normal, a, c, d));
        }
        mesh
    }

    /// Cube of edge length `size` centered at the origin
    pub fn cube(size: f32) -> Self {
        Self::cuboid(size, size, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cuboid_winding_matches_normals() {
        let mesh = Mesh::cuboid(60.0, 20.0, 10.0);
        assert_eq!(mesh.triangle_count(), 12);
        for triangle in &mesh.triangles {
            let computed = triangle.calculate_normal();
            assert!((computed - triangle.normal).norm() < 1e-6);
        }
    }

    #[test]
    fn test_degenerate_normal_is_zero() {
        let p = Point3::new(1.0, 1.0, 1.0);
        let triangle = Triangle::from_vertices(p, p, p);
        assert_eq!(triangle.normal, Vector3::zeros());
    }

    #[test]
    fn test_vertex_iteration() {
        let mesh = Mesh::cube(2.0);
        assert_eq!(mesh.vertices().count(), mesh.vertex_count());
        assert!(mesh.vertices().all(|v| v.coords.amax() == 1.0));
    }
}

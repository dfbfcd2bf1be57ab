/// Retained scene graph handed to display surfaces
///
/// Every node serializes to a three.js-style JSON object tagged with `"type"`.
use log::debug;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::projection::PerspectiveCamera;
use crate::transform::{Euler, Transform};

/// Index of a node within its [`Scene`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

/// Per-vertex attribute buffers of a renderable mesh
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BufferGeometry {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
}

impl BufferGeometry {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }
}

/// Diffuse-only material
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LambertMaterial {
    pub color: Color,
    pub opacity: f32,
    pub transparent: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeshNode {
    pub geometry: BufferGeometry,
    pub material: LambertMaterial,
    pub position: Point3<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

/// Light shining from `position` toward the origin of its parent's frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DirectionalLight {
    pub color: Color,
    pub position: Point3<f32>,
    pub intensity: f32,
}

/// A colored world-space line segment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point3<f32>,
    pub end: Point3<f32>,
    pub color: Color,
}

/// Most cells a grid is drawn with, per side
pub const MAX_GRID_DIVISIONS: u32 = 1000;

/// Square grid of `divisions` cells lying in the local XZ plane
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridHelper {
    pub size: f32,
    pub divisions: u32,
    pub color_center_line: Color,
    pub color_grid: Color,
    pub position: Point3<f32>,
    pub rotation: Euler,
}

impl GridHelper {
    pub fn new(size: f32, divisions: u32, color_center_line: Color, color_grid: Color) -> Self {
        Self {
            size,
            divisions,
            color_center_line,
            color_grid,
            position: Point3::origin(),
            rotation: Euler::default(),
        }
    }

    /// Grid lines in world space; the line through the center uses the center color
    pub fn segments(&self) -> Vec<Segment> {
        let model = Transform::model_matrix(&self.position, &self.rotation);
        let divisions = self.divisions.clamp(1, MAX_GRID_DIVISIONS);
        let half = self.size / 2.0;
        let step = self.size / divisions as f32;
        let center = divisions / 2;

        let mut segments = Vec::with_capacity(2 * (divisions as usize + 1));
        for i in 0..=divisions {
            let k = -half + i as f32 * step;
            let color = if i == center {
                self.color_center_line
            } else {
                self.color_grid
            };
            for (start, end) in [
                (Point3::new(-half, 0.0, k), Point3::new(half, 0.0, k)),
                (Point3::new(k, 0.0, -half), Point3::new(k, 0.0, half)),
            ] {
                segments.push(Segment {
                    start: model.transform_point(&start),
                    end: model.transform_point(&end),
                    color,
                });
            }
        }
        segments
    }
}

/// Axis indicator: X red, Y green, Z blue
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AxesHelper {
    pub size: f32,
}

impl AxesHelper {
    pub fn segments(&self) -> [Segment; 3] {
        let origin = Point3::origin();
        [
            (Point3::new(self.size, 0.0, 0.0), Color::RED),
            (Point3::new(0.0, self.size, 0.0), Color::GREEN),
            (Point3::new(0.0, 0.0, self.size), Color::BLUE),
        ]
        .map(|(end, color)| Segment {
            start: origin,
            end,
            color,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Node {
    Mesh(MeshNode),
    Camera(PerspectiveCamera),
    AmbientLight(AmbientLight),
    Grid(GridHelper),
    Axes(AxesHelper),
}

impl Node {
    pub fn kind(&self) -> &'static str {
        match self {
            Node::Mesh(_) => "Mesh",
            Node::Camera(_) => "Camera",
            Node::AmbientLight(_) => "AmbientLight",
            Node::Grid(_) => "Grid",
            Node::Axes(_) => "Axes",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Scene {
    children: Vec<Node>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.children.len());
        debug!("scene node {} is a {}", id.0, node.kind());
        self.children.push(node);
        id
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.children.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.children.get_mut(id.0)
    }

    pub fn meshes(&self) -> impl Iterator<Item = &MeshNode> {
        self.children.iter().filter_map(|n| match n {
            Node::Mesh(mesh) => Some(mesh),
            _ => None,
        })
    }

    pub fn grids(&self) -> impl Iterator<Item = &GridHelper> {
        self.children.iter().filter_map(|n| match n {
            Node::Grid(grid) => Some(grid),
            _ => None,
        })
    }

    pub fn axes(&self) -> impl Iterator<Item = &AxesHelper> {
        self.children.iter().filter_map(|n| match n {
            Node::Axes(axes) => Some(axes),
            _ => None,
        })
    }

    pub fn ambient_lights(&self) -> impl Iterator<Item = &AmbientLight> {
        self.children.iter().filter_map(|n| match n {
            Node::AmbientLight(light) => Some(light),
            _ => None,
        })
    }
}

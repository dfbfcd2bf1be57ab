/// Builds an interactive scene around an STL mesh
use std::f32::consts::FRAC_PI_2;
use std::path::Path;

use log::{debug, info};
use nalgebra::{Point3, Vector3};

use crate::bounds::Bounds;
use crate::color::Color;
use crate::config::{validate_grid_unit, validate_viewport, VisualizeOptions};
use crate::error::{Error, LoadError, SceneError};
use crate::geometry::Mesh;
use crate::projection::PerspectiveCamera;
use crate::renderer::Renderer;
use crate::scene::{
    AmbientLight, AxesHelper, BufferGeometry, DirectionalLight, GridHelper, LambertMaterial,
    MeshNode, Node, NodeId, Scene, MAX_GRID_DIVISIONS,
};
use crate::stl;

/// Camera distance as a multiple of the mesh's max corner
const CAMERA_OFFSET: f32 = 5.0;
const CAMERA_FOV: f32 = 20.0;
const DEFAULT_FAR: f32 = 2000.0;

const KEY_LIGHT_POSITION: [f32; 3] = [3.0, 5.0, 1.0];
const KEY_LIGHT_INTENSITY: f32 = 0.7;
const AMBIENT_COLOR: Color = Color::rgb(0x77, 0x77, 0x77);
const AMBIENT_INTENSITY: f32 = 0.5;

/// A loaded mesh and its bounds, ready to be turned into scene nodes
#[derive(Debug, Clone)]
pub struct Visualizer {
    mesh: Mesh,
    bounds: Bounds,
}

impl Visualizer {
    /// Load an STL file; I/O and parse failures are returned unchanged
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        Self::from_mesh(stl::load_stl(path)?)
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        Self::from_mesh(stl::parse_stl(data)?)
    }

    pub fn from_mesh(mesh: Mesh) -> Result<Self, LoadError> {
        if let Some(index) = mesh.triangles.iter().position(|t| !t.is_finite()) {
            return Err(LoadError::NonFinite(index));
        }
        let bounds = Bounds::from_mesh(&mesh).ok_or(LoadError::Empty)?;

        info!(
            "loaded mesh with {} triangles ({} vertices), bounds {:?} .. {:?}",
            mesh.triangle_count(),
            mesh.vertex_count(),
            bounds.min.coords.as_slice(),
            bounds.max.coords.as_slice()
        );
        Ok(Self { mesh, bounds })
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Renderable mesh with each face normal repeated for its three vertices
    pub fn create_mesh(&self, color: Color) -> MeshNode {
        let positions = self
            .mesh
            .vertices()
            .map(|v| [v.x, v.y, v.z])
            .collect();
        let normals = self
            .mesh
            .triangles
            .iter()
            .flat_map(|t| [[t.normal.x, t.normal.y, t.normal.z]; 3])
            .collect();

        MeshNode {
            geometry: BufferGeometry { positions, normals },
            material: LambertMaterial {
                color,
                opacity: 1.0,
                transparent: true,
            },
            position: Point3::origin(),
        }
    }

    /// Camera at five times the max corner, looking at the origin with +Z up
    pub fn create_camera(&self) -> PerspectiveCamera {
        let position = Point3::from(self.camera_corner() * CAMERA_OFFSET);
        let key_light = DirectionalLight {
            color: Color::WHITE,
            position: Point3::from(KEY_LIGHT_POSITION),
            intensity: KEY_LIGHT_INTENSITY,
        };

        let mut camera = PerspectiveCamera::new(1, 1);
        camera.position = position;
        camera.target = Point3::origin();
        camera.up = Vector3::z();
        camera.fov = CAMERA_FOV;
        camera.far = DEFAULT_FAR.max(4.0 * camera.distance());
        camera.children.push(key_light);

        debug!("camera at {:?}", camera.position.coords.as_slice());
        camera
    }

    /// Assemble the scene and bind it to orbit controls
    ///
    /// A `grid_unit` of zero leaves the grid out; axes are always added.
    pub fn create_renderer(
        &self,
        mesh: MeshNode,
        camera: PerspectiveCamera,
        width: u32,
        height: u32,
        grid_unit: f32,
    ) -> Result<Renderer, SceneError> {
        validate_viewport(width, height)?;
        validate_grid_unit(grid_unit)?;

        let mut scene = Scene::new();
        scene.add(Node::Mesh(mesh));
        let camera = scene.add(Node::Camera(camera));
        scene.add(Node::AmbientLight(AmbientLight {
            color: AMBIENT_COLOR,
            intensity: AMBIENT_INTENSITY,
        }));

        if grid_unit != 0.0 {
            self.add_grid(&mut scene, grid_unit)?;
        }
        self.add_axes(&mut scene);

        Renderer::new(scene, camera, width, height)
    }

    /// Axis indicator sized to twice the largest bounding coordinate
    pub fn add_axes(&self, scene: &mut Scene) -> NodeId {
        // Meshes entirely below the origin fall back to their largest magnitude
        let largest = [self.bounds.max_coordinate(), self.bounds.max_magnitude()]
            .into_iter()
            .find(|c| *c > 0.0)
            .unwrap_or(0.5);
        scene.add(Node::Axes(AxesHelper {
            size: 2.0 * largest,
        }))
    }

    /// Add XZ, XY and YZ reference grids covering the mesh and the origin
    ///
    /// Each grid extends one `unit` beyond the snapped extent on every side.
    pub fn add_grid(&self, scene: &mut Scene, unit: f32) -> Result<[NodeId; 3], SceneError> {
        validate_grid_unit(unit)?;
        if unit == 0.0 {
            return Err(SceneError::InvalidGridUnit(unit));
        }

        let extent = self.bounds.including_origin().snapped(unit);
        let grid_extent = extent.size().max();
        let center = extent.min + Vector3::repeat(grid_extent / 2.0);

        let size = grid_extent + 2.0 * unit;
        let cells = (size / unit).round();
        if !(cells <= MAX_GRID_DIVISIONS as f32) {
            return Err(SceneError::GridTooDense {
                unit,
                divisions: cells,
                limit: MAX_GRID_DIVISIONS,
            });
        }
        let divisions = cells.max(1.0) as u32;
        debug!(
            "grid extent {grid_extent} centered at {:?}, {divisions} divisions of {unit}",
            center.coords.as_slice()
        );

        let plane = |color: Color, position: Point3<f32>| {
            let mut grid = GridHelper::new(size, divisions, color, color);
            grid.position = position;
            grid
        };

        let xz = plane(Color::BLUE, Point3::new(center.x, 0.0, center.z));

        let mut xy = plane(Color::RED, Point3::new(center.x, center.y, 0.0));
        xy.rotation.rotate_x(FRAC_PI_2);

        let mut yz = plane(Color::GREEN, Point3::new(0.0, center.y, center.z));
        yz.rotation.rotate_z(FRAC_PI_2);

        Ok([xz, xy, yz].map(|grid| scene.add(Node::Grid(grid))))
    }

    /// Max corner used for camera placement
    ///
    /// A mesh whose max corner is the origin would put the camera on its
    /// target; such meshes are viewed from the diagonal at their largest
    /// magnitude instead.
    fn camera_corner(&self) -> Vector3<f32> {
        let max = self.bounds.max.coords;
        if max.norm() > f32::EPSILON {
            return max;
        }
        let magnitude = self.bounds.max_magnitude();
        Vector3::repeat(if magnitude > 0.0 { magnitude } else { 1.0 })
    }
}

/// Load `stl_file` and build its interactive renderer in one call
pub fn visualize_stl(
    stl_file: impl AsRef<Path>,
    options: &VisualizeOptions,
) -> Result<Renderer, Error> {
    options.validate()?;

    let visualizer = Visualizer::from_file(stl_file)?;
    let renderer = visualizer.create_renderer(
        visualizer.create_mesh(options.color),
        visualizer.create_camera(),
        options.width,
        options.height,
        options.grid_unit,
    )?;
    Ok(renderer)
}

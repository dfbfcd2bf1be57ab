use std::path::{Path, PathBuf};

use nalgebra::{Point3, Vector3};
use stlview_core::{
    stl, visualize_stl, Error, LoadError, Mesh, Node, SceneError, Triangle, VisualizeOptions,
    Visualizer,
};
use tempfile::TempDir;

fn write_fixture(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).unwrap();
    path
}

fn cube_fixture(dir: &Path) -> PathBuf {
    let cube = Mesh::cuboid(60.0, 20.0, 10.0);
    write_fixture(dir, "cube.stl", &stl::write_binary_stl(&cube))
}

fn sample_meshes() -> Vec<Mesh> {
    let mut sliver = Mesh::new();
    sliver.add_triangle(Triangle::from_vertices(
        Point3::new(1.0, 2.0, 3.0),
        Point3::new(7.0, 2.0, 3.0),
        Point3::new(1.0, 9.0, 4.0),
    ));

    let mut offset = Mesh::cube(3.0);
    for triangle in &mut offset.triangles {
        for v in &mut triangle.vertices {
            *v += Vector3::new(-10.0, 4.0, 0.5);
        }
    }

    vec![Mesh::cuboid(60.0, 20.0, 10.0), Mesh::cube(1.0), sliver, offset]
}

#[test]
fn cube_renders_with_mesh_camera_axes_and_grids() {
    let dir = TempDir::new().unwrap();
    let path = cube_fixture(dir.path());

    let renderer = visualize_stl(&path, &VisualizeOptions::default()).unwrap();
    let scene = renderer.scene();

    assert_eq!(scene.meshes().count(), 1);
    assert_eq!(
        scene
            .children()
            .iter()
            .filter(|node| matches!(node, Node::Camera(_)))
            .count(),
        1
    );
    assert_eq!(scene.axes().count(), 1);
    assert_eq!(scene.grids().count(), 3);
    assert_eq!((renderer.width(), renderer.height()), (400, 400));

    let camera = renderer.camera().unwrap();
    assert_eq!(camera.position, Point3::new(150.0, 50.0, 25.0));
    assert_eq!(scene.axes().next().unwrap().size, 60.0);
}

#[test]
fn missing_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.stl");

    match visualize_stl(&missing, &VisualizeOptions::default()) {
        Err(Error::Load(LoadError::Io { path, source })) => {
            assert_eq!(path, missing);
            assert_eq!(source.kind(), std::io::ErrorKind::NotFound);
        }
        other => panic!("expected LoadError::Io, got {other:?}"),
    }
}

#[test]
fn malformed_file_is_a_load_error() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(dir.path(), "broken.stl", b"solid broken\n  facet normal 0 0\n");

    assert!(matches!(
        Visualizer::from_file(&path),
        Err(LoadError::Ascii(_))
    ));
}

#[test]
fn zero_grid_unit_keeps_axes_only() {
    let dir = TempDir::new().unwrap();
    let path = cube_fixture(dir.path());
    let options = VisualizeOptions {
        grid_unit: 0.0,
        ..VisualizeOptions::default()
    };

    let renderer = visualize_stl(&path, &options).unwrap();
    assert_eq!(renderer.scene().grids().count(), 0);
    assert_eq!(renderer.scene().axes().count(), 1);
}

#[test]
fn grid_unit_too_fine_for_mesh_is_rejected() {
    let dir = TempDir::new().unwrap();
    let path = cube_fixture(dir.path());
    let options = VisualizeOptions {
        grid_unit: 1e-9,
        ..VisualizeOptions::default()
    };

    assert!(matches!(
        visualize_stl(&path, &options),
        Err(Error::Scene(SceneError::GridTooDense { .. }))
    ));
}

#[test]
fn invalid_options_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = cube_fixture(dir.path());
    let options = VisualizeOptions {
        width: 0,
        ..VisualizeOptions::default()
    };

    assert!(matches!(
        visualize_stl(&path, &options),
        Err(Error::Scene(SceneError::InvalidDimensions { width: 0, height: 400 }))
    ));
}

#[test]
fn ascii_file_loads() {
    let dir = TempDir::new().unwrap();
    let path = write_fixture(
        dir.path(),
        "tri.stl",
        b"solid tri\n facet normal 0 0 1\n  outer loop\n   vertex 0 0 0\n   vertex 2 0 0\n   vertex 0 2 0\n  endloop\n endfacet\nendsolid tri\n",
    );

    let visualizer = Visualizer::from_file(&path).unwrap();
    assert_eq!(visualizer.mesh().triangle_count(), 1);
    assert_eq!(visualizer.bounds().max, Point3::new(2.0, 2.0, 0.0));
}

#[test]
fn per_vertex_normals_triple_face_normals() {
    for mesh in sample_meshes() {
        let faces = mesh.triangle_count();
        let visualizer = Visualizer::from_mesh(mesh).unwrap();
        let node = visualizer.create_mesh("#ebcc34".parse().unwrap());
        assert_eq!(node.geometry.normals.len(), 3 * faces);
        assert_eq!(node.geometry.positions.len(), 3 * faces);
    }
}

#[test]
fn camera_is_five_times_max_corner() {
    for mesh in sample_meshes() {
        let visualizer = Visualizer::from_mesh(mesh).unwrap();
        let expected = visualizer.bounds().max.coords * 5.0;
        assert_eq!(visualizer.create_camera().position.coords, expected);
    }
}

#[test]
fn grid_present_iff_unit_nonzero() {
    for mesh in sample_meshes() {
        let visualizer = Visualizer::from_mesh(mesh).unwrap();
        for (unit, grids) in [(0.0, 0), (0.5, 3), (1.0, 3), (4.0, 3)] {
            let renderer = visualizer
                .create_renderer(
                    visualizer.create_mesh(stlview_core::Color::WHITE),
                    visualizer.create_camera(),
                    320,
                    240,
                    unit,
                )
                .unwrap();
            assert_eq!(renderer.scene().grids().count(), grids, "unit {unit}");
        }
    }
}

#[test]
fn grids_cover_mesh_and_origin() {
    for mesh in sample_meshes() {
        let visualizer = Visualizer::from_mesh(mesh).unwrap();
        let bounds = visualizer.bounds().including_origin();
        let mut scene = stlview_core::Scene::new();
        visualizer.add_grid(&mut scene, 1.0).unwrap();

        // The XZ grid spans x and z of every vertex and of the origin
        let xz = scene.grids().next().unwrap();
        let half = xz.size / 2.0;
        for (lo, hi, center) in [
            (bounds.min.x, bounds.max.x, xz.position.x),
            (bounds.min.z, bounds.max.z, xz.position.z),
        ] {
            assert!(center - half <= lo && hi <= center + half);
        }
    }
}

#[test]
fn renderer_serializes_to_json() {
    let dir = TempDir::new().unwrap();
    let renderer = visualize_stl(cube_fixture(dir.path()), &VisualizeOptions::default()).unwrap();

    let json: serde_json::Value = serde_json::from_str(&renderer.to_json().unwrap()).unwrap();
    let children = json["scene"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 7);
    assert_eq!(children[0]["type"], "Mesh");
    assert_eq!(children[0]["material"]["color"], "#ebcc34");
    assert_eq!(children[0]["geometry"]["normals"].as_array().unwrap().len(), 36);
}

//! stlview Core Library - STL meshes as interactive 3D scenes
//!
//! This library loads STL files and turns them into a retained scene graph
//! with a framing camera, lighting, axes and reference grids. Display
//! surfaces (terminal, web) consume the resulting [`Renderer`].

pub mod bounds;
pub mod color;
pub mod config;
pub mod controls;
pub mod error;
pub mod geometry;
pub mod projection;
pub mod renderer;
pub mod scene;
pub mod stl;
pub mod transform;
pub mod visualizer;

// Re-export commonly used types
pub use bounds::Bounds;
pub use color::Color;
pub use config::VisualizeOptions;
pub use controls::OrbitControls;
pub use error::{ConfigError, Error, LoadError, SceneError};
pub use geometry::{Mesh, Triangle};
pub use projection::{PerspectiveCamera, ProjectionMode};
pub use renderer::Renderer;
pub use scene::{Node, NodeId, Scene, Segment};
pub use transform::{Euler, Transform};
pub use visualizer::{visualize_stl, Visualizer};

/// Error types for loading meshes and building scenes
use std::path::PathBuf;

/// Failure to obtain a mesh from an STL source
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read STL file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("STL data too small: {0} bytes")]
    TooSmall(usize),

    #[error("unexpected end of binary STL: expected {expected} bytes, found {found}")]
    Truncated { expected: usize, found: usize },

    #[error("malformed ASCII STL: {0}")]
    Ascii(String),

    #[error("non-finite coordinate in facet {0}")]
    NonFinite(usize),

    #[error("STL contains no triangles")]
    Empty,
}

/// Invalid rendering parameters
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid viewport {width}x{height}: dimensions must be positive")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("invalid grid unit {0}: must be zero or a positive finite number")]
    InvalidGridUnit(f32),

    #[error("grid unit {unit} is too fine: {divisions} divisions exceed the limit of {limit}")]
    GridTooDense { unit: f32, divisions: f32, limit: u32 },

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("scene node {0} is not a camera")]
    MissingCamera(usize),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("config parse error: {0}")]
    Parse(String),
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Scene(#[from] SceneError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

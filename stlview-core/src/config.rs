/// Visualization options and their TOML form
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::error::{ConfigError, SceneError};

pub const DEFAULT_WIDTH: u32 = 400;
pub const DEFAULT_HEIGHT: u32 = 400;
pub const DEFAULT_GRID_UNIT: f32 = 1.0;
pub const DEFAULT_MESH_COLOR: Color = Color::rgb(0xeb, 0xcc, 0x34);

/// Viewport size, grid spacing and mesh color of one visualization
///
/// ```toml
/// width = 640
/// height = 480
/// grid_unit = 5.0   # 0 disables the grid
/// color = "#ebcc34"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisualizeOptions {
    /// Viewport width in pixels
    pub width: u32,
    /// Viewport height in pixels
    pub height: u32,
    /// Grid cell size in world units; `0` disables the grid
    pub grid_unit: f32,
    pub color: Color,
}

impl Default for VisualizeOptions {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            grid_unit: DEFAULT_GRID_UNIT,
            color: DEFAULT_MESH_COLOR,
        }
    }
}

impl VisualizeOptions {
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Load options from a TOML file; missing fields take their defaults
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        let options = Self::from_toml_str(&content)?;
        info!("loaded visualization options from {}", path.display());
        Ok(options)
    }

    pub fn validate(&self) -> Result<(), SceneError> {
        validate_viewport(self.width, self.height)?;
        validate_grid_unit(self.grid_unit)
    }
}

pub fn validate_viewport(width: u32, height: u32) -> Result<(), SceneError> {
    if width == 0 || height == 0 {
        return Err(SceneError::InvalidDimensions { width, height });
    }
    Ok(())
}

pub fn validate_grid_unit(unit: f32) -> Result<(), SceneError> {
    if !unit.is_finite() || unit < 0.0 {
        return Err(SceneError::InvalidGridUnit(unit));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = VisualizeOptions::default();
        assert_eq!(options.width, 400);
        assert_eq!(options.height, 400);
        assert_eq!(options.grid_unit, 1.0);
        assert_eq!(options.color.to_string(), "#ebcc34");
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let options = VisualizeOptions::from_toml_str("grid_unit = 0.0\ncolor = \"red\"").unwrap();
        assert_eq!(options.grid_unit, 0.0);
        assert_eq!(options.color, Color::RED);
        assert_eq!(options.width, DEFAULT_WIDTH);
    }

    #[test]
    fn test_bad_toml() {
        assert!(matches!(
            VisualizeOptions::from_toml_str("width = \"wide\""),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            VisualizeOptions::from_toml_str("color = \"#zzz\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            validate_viewport(0, 10),
            Err(SceneError::InvalidDimensions { width: 0, height: 10 })
        );
        assert_eq!(validate_grid_unit(-1.0), Err(SceneError::InvalidGridUnit(-1.0)));
        assert!(validate_grid_unit(f32::NAN).is_err());
        assert!(validate_grid_unit(0.0).is_ok());
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("view.toml");
        std::fs::write(&path, "width = 640\nheight = 480\n").unwrap();

        let options = VisualizeOptions::load_from_path(&path).unwrap();
        assert_eq!((options.width, options.height), (640, 480));

        let missing = dir.path().join("missing.toml");
        assert!(matches!(
            VisualizeOptions::load_from_path(&missing),
            Err(ConfigError::Read { .. })
        ));
    }
}

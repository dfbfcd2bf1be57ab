/// stlview terminal viewer
///
/// Renders an STL file with axes and reference grids as ASCII art.
/// Controls:
///   - WASD / Arrow Keys: Orbit around the target
///   - IJKL: Pan
///   - +/-: Zoom
///   - P: Toggle perspective/orthographic
///   - R: Reset the view
///   - Space: Toggle spinning
///   - Q/ESC: Quit
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::path::PathBuf;
use stlview_core::{Color, Mesh, ProjectionMode, VisualizeOptions, Visualizer};
use stlview_terminal::TerminalApp;

#[derive(Parser, Debug)]
#[command(name = "stlview-terminal", version, about = "View an STL file in the terminal")]
struct Args {
    /// STL file to view; a demo cube is shown when omitted
    stl_file: Option<PathBuf>,

    /// TOML file with width, height, grid_unit and color
    #[arg(long)]
    config: Option<PathBuf>,

    /// Viewport width in pixels (sets the aspect ratio)
    #[arg(long)]
    width: Option<u32>,

    /// Viewport height in pixels (sets the aspect ratio)
    #[arg(long)]
    height: Option<u32>,

    /// Grid cell size in world units; 0 disables the grid
    #[arg(long)]
    grid_unit: Option<f32>,

    /// Mesh color, `#rrggbb` or a CSS color name
    #[arg(long)]
    color: Option<Color>,

    /// Start with an orthographic projection
    #[arg(long)]
    orthographic: bool,

    /// Spin the model continuously
    #[arg(long)]
    spin: bool,
}

impl Args {
    fn options(&self) -> Result<VisualizeOptions> {
        let mut options = match &self.config {
            Some(path) => VisualizeOptions::load_from_path(path)?,
            None => VisualizeOptions::default(),
        };

        if let Some(width) = self.width {
            options.width = width;
        }
        if let Some(height) = self.height {
            options.height = height;
        }
        if let Some(grid_unit) = self.grid_unit {
            options.grid_unit = grid_unit;
        }
        if let Some(color) = self.color {
            options.color = color;
        }

        options.validate()?;
        Ok(options)
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();
    let options = args.options()?;

    let visualizer = match &args.stl_file {
        Some(path) => Visualizer::from_file(path)
            .with_context(|| format!("failed to load {}", path.display()))?,
        None => {
            info!("no STL file given, showing the demo cube");
            Visualizer::from_mesh(Mesh::cuboid(60.0, 20.0, 10.0))?
        }
    };

    let mut renderer = visualizer.create_renderer(
        visualizer.create_mesh(options.color),
        visualizer.create_camera(),
        options.width,
        options.height,
        options.grid_unit,
    )?;
    if args.orthographic {
        if let Some(camera) = renderer.camera_mut() {
            camera.mode = ProjectionMode::Orthographic;
        }
    }
    info!(
        "scene ready: {} nodes, {} grids",
        renderer.scene().children().len(),
        renderer.scene().grids().count()
    );

    let mut app = TerminalApp::new(renderer)?.with_spin(args.spin);
    app.run()?;

    Ok(())
}

/// ASCII rasterizer for terminal rendering
use crossterm::{
    cursor,
    style::{self, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Matrix4, Point3, Vector3};
use std::io::Write;
use stlview_core::scene::MeshNode;
use stlview_core::{Color, PerspectiveCamera, Renderer, Scene, Segment, Transform};

/// Character luminosity ramp for shading (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &['.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Depth tolerance so lines lying on a surface stay visible
const LINE_DEPTH_BIAS: f32 = 1e-4;

/// Light reaching a surface: a flat ambient term plus directional lights
#[derive(Debug, Clone, PartialEq)]
pub struct Lighting {
    pub ambient: f32,
    /// Unit vectors pointing toward each light, with intensity
    pub directional: Vec<(Vector3<f32>, f32)>,
}

impl Lighting {
    /// Collect the scene's ambient lights and the camera's attached lights in world space
    pub fn from_scene(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let ambient = scene
            .ambient_lights()
            .map(|light| light.intensity * luminance(light.color))
            .sum();

        let world = camera.world_matrix();
        let directional = camera
            .children
            .iter()
            .filter_map(|light| {
                // Directional lights aim at the world origin
                let position = world.transform_point(&light.position);
                let direction = position.coords.try_normalize(f32::EPSILON)?;
                Some((direction, light.intensity * luminance(light.color)))
            })
            .collect();

        Self {
            ambient,
            directional,
        }
    }

    /// Lambert brightness of a surface with the given normal, clamped to 1
    pub fn brightness(&self, normal: &Vector3<f32>) -> f32 {
        let diffuse: f32 = self
            .directional
            .iter()
            .map(|(direction, intensity)| intensity * normal.dot(direction).max(0.0))
            .sum();
        (self.ambient + diffuse).clamp(0.0, 1.0)
    }
}

/// ASCII renderer that converts a scene to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    depth_buffer: Vec<f32>,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            depth_buffer: vec![f32::INFINITY; size],
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::WHITE; size],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.depth_buffer.fill(f32::INFINITY);
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::WHITE);
    }

    pub fn char_at(&self, x: usize, y: usize) -> Option<char> {
        (x < self.width && y < self.height).then(|| self.char_buffer[y * self.width + x])
    }

    /// Rasterize meshes, grids and axes as seen from the renderer's camera
    pub fn render(&mut self, renderer: &Renderer) {
        let Some(camera) = renderer.camera() else {
            return;
        };
        let scene = renderer.scene();
        let lighting = Lighting::from_scene(scene, camera);

        for mesh in scene.meshes() {
            self.render_mesh(mesh, camera, &lighting);
        }
        for grid in scene.grids() {
            for segment in grid.segments() {
                self.render_segment(&segment, camera);
            }
        }
        for axes in scene.axes() {
            for segment in axes.segments() {
                self.render_segment(&segment, camera);
            }
        }
    }

    pub fn render_mesh(&mut self, mesh: &MeshNode, camera: &PerspectiveCamera, lighting: &Lighting) {
        let model = Transform::translation_matrix(mesh.position.x, mesh.position.y, mesh.position.z);
        let geometry = &mesh.geometry;

        for (positions, normals) in geometry
            .positions
            .chunks_exact(3)
            .zip(geometry.normals.chunks_exact(3))
        {
            // Flat shading: the three vertex normals are the face normal
            let normal = Vector3::from(normals[0]);
            let brightness = lighting.brightness(&normal);
            self.render_triangle(positions, &model, camera, brightness, mesh.material.color);
        }
    }

    fn render_triangle(
        &mut self,
        positions: &[[f32; 3]],
        model: &Matrix4<f32>,
        camera: &PerspectiveCamera,
        brightness: f32,
        color: Color,
    ) {
        // Project vertices to screen space
        let mut screen_coords = [(0.0, 0.0, 0.0); 3];
        for (coords, position) in screen_coords.iter_mut().zip(positions) {
            match camera.project_point(
                &Point3::from(*position),
                model,
                self.width as u32,
                self.height as u32,
            ) {
                Some(projected) => *coords = projected,
                None => return, // Triangle is clipped
            }
        }

        let char_index = (brightness * (LUMINOSITY_RAMP.len() - 1) as f32).round() as usize;
        let character = LUMINOSITY_RAMP[char_index.min(LUMINOSITY_RAMP.len() - 1)];
        let shade = color.scaled(0.35 + 0.65 * brightness);

        self.rasterize_triangle(&screen_coords, character, shade);
    }

    fn rasterize_triangle(&mut self, coords: &[(f32, f32, f32); 3], character: char, color: Color) {
        let [v0, v1, v2] = *coords;

        // Bounding box, clipped to screen bounds
        let min_x = (v0.0.min(v1.0).min(v2.0).floor() as i32).max(0);
        let max_x = (v0.0.max(v1.0).max(v2.0).ceil() as i32).min(self.width as i32 - 1);
        let min_y = (v0.1.min(v1.1).min(v2.1).floor() as i32).max(0);
        let max_y = (v0.1.max(v1.1).max(v2.1).ceil() as i32).min(self.height as i32 - 1);

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let px = x as f32 + 0.5;
                let py = y as f32 + 0.5;

                let Some((w0, w1, w2)) =
                    barycentric((v0.0, v0.1), (v1.0, v1.1), (v2.0, v2.1), (px, py))
                else {
                    continue;
                };
                if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                    let depth = w0 * v0.2 + w1 * v1.2 + w2 * v2.2;
                    self.plot(x as usize, y as usize, depth, character, color);
                }
            }
        }
    }

    /// Draw a world-space line segment with a slope-matched character
    pub fn render_segment(&mut self, segment: &Segment, camera: &PerspectiveCamera) {
        let Some([a, b]) = camera.project_segment(
            &segment.start,
            &segment.end,
            self.width as u32,
            self.height as u32,
        ) else {
            return;
        };

        let (dx, dy) = (b.0 - a.0, b.1 - a.1);
        let character = line_char(dx, dy);
        let max_steps = 4 * (self.width + self.height);
        let steps = (dx.abs().max(dy.abs()).ceil() as usize).clamp(1, max_steps.max(1));

        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = a.0 + dx * t;
            let y = a.1 + dy * t;
            if x < 0.0 || y < 0.0 || x >= self.width as f32 || y >= self.height as f32 {
                continue;
            }
            let depth = a.2 + (b.2 - a.2) * t - LINE_DEPTH_BIAS;
            self.plot(x as usize, y as usize, depth, character, segment.color);
        }
    }

    fn plot(&mut self, x: usize, y: usize, depth: f32, character: char, color: Color) {
        let idx = y * self.width + x;
        if depth < self.depth_buffer[idx] {
            self.depth_buffer[idx] = depth;
            self.char_buffer[idx] = character;
            self.color_buffer[idx] = color;
        }
    }

    /// Write the buffers starting at the given terminal row
    pub fn draw<W: Write>(&self, writer: &mut W, top: u16) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, top + y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(style::Color::Rgb {
                        r: color.r,
                        g: color.g,
                        b: color.b,
                    }))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

/// Perceived brightness of a color in `0.0..=1.0`
fn luminance(color: Color) -> f32 {
    let [r, g, b] = color.to_linear();
    0.2126 * r + 0.7152 * g + 0.0722 * b
}

/// Character approximating a screen-space direction (y grows downward)
fn line_char(dx: f32, dy: f32) -> char {
    if dx.abs() > 2.0 * dy.abs() {
        '-'
    } else if dy.abs() > 2.0 * dx.abs() {
        '|'
    } else if (dx > 0.0) == (dy > 0.0) {
        '\\'
    } else {
        '/'
    }
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: (f32, f32),
    v1: (f32, f32),
    v2: (f32, f32),
    p: (f32, f32),
) -> Option<(f32, f32, f32)> {
    let denom = (v1.1 - v2.1) * (v0.0 - v2.0) + (v2.0 - v1.0) * (v0.1 - v2.1);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.1 - v2.1) * (p.0 - v2.0) + (v2.0 - v1.0) * (p.1 - v2.1)) / denom;
    let w1 = ((v2.1 - v0.1) * (p.0 - v2.0) + (v0.0 - v2.0) * (p.1 - v2.1)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}

/// Interactive terminal viewer for stlview scenes
use crossterm::{
    cursor,
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use log::debug;
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};
use stlview_core::{ProjectionMode, Renderer};

pub mod renderer;

pub use renderer::{AsciiRenderer, Lighting};

/// Orbit step per key press, in radians
const ROTATE_STEP: f32 = 0.1;
/// Pan step per key press, as a fraction of the view distance
const PAN_STEP: f32 = 0.05;
const ZOOM_FACTOR: f32 = 0.9;
const SPIN_SPEED: f32 = 0.015;

/// Terminal cells are roughly twice as tall as they are wide
const CELL_ASPECT: f32 = 2.0;

/// Largest cell grid with the renderer's aspect ratio that fits the terminal
///
/// One row is kept free for the status line.
pub fn fit_viewport(columns: u16, rows: u16, width: u32, height: u32) -> (usize, usize) {
    let aspect = width as f32 / height.max(1) as f32;
    let max_cols = columns.max(1) as f32;
    let max_rows = rows.saturating_sub(1).max(1) as f32;

    let cols = max_cols;
    let rows = (cols / (aspect * CELL_ASPECT)).round();
    if rows <= max_rows {
        return (cols as usize, rows.max(1.0) as usize);
    }
    let cols = (max_rows * aspect * CELL_ASPECT).round().clamp(1.0, max_cols);
    (cols as usize, max_rows as usize)
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    renderer: Renderer,
    ascii: AsciiRenderer,
    spin: bool,
    running: bool,
    last_frame: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalApp {
    pub fn new(renderer: Renderer) -> io::Result<Self> {
        let (columns, rows) = terminal::size()?;
        let (width, height) = fit_viewport(columns, rows, renderer.width(), renderer.height());
        debug!("terminal {columns}x{rows}, viewport {width}x{height} cells");

        Ok(Self {
            renderer,
            ascii: AsciiRenderer::new(width, height),
            spin: false,
            running: true,
            last_frame: Instant::now(),
            frame_count: 0,
            fps: 0.0,
        })
    }

    pub fn with_spin(mut self, spin: bool) -> Self {
        self.spin = spin;
        self
    }

    pub fn renderer(&self) -> &Renderer {
        &self.renderer
    }

    pub fn run(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        let result = self.main_loop();

        // Cleanup
        terminal::disable_raw_mode()?;
        execute!(stdout(), terminal::LeaveAlternateScreen, cursor::Show)?;

        result
    }

    fn main_loop(&mut self) -> io::Result<()> {
        let target_frame_time = Duration::from_millis(1000 / 30); // 30 FPS target

        while self.running {
            let frame_start = Instant::now();

            // Handle input
            while event::poll(Duration::from_millis(0))? {
                self.handle_event(event::read()?)?;
            }

            self.update();
            self.render()?;

            // Frame timing
            self.frame_count += 1;
            let elapsed = frame_start.elapsed();
            if elapsed < target_frame_time {
                std::thread::sleep(target_frame_time - elapsed);
            }

            // Update FPS counter
            let now = Instant::now();
            if (now - self.last_frame).as_secs() >= 1 {
                self.fps = self.frame_count as f32 / (now - self.last_frame).as_secs_f32();
                self.frame_count = 0;
                self.last_frame = now;
            }
        }

        Ok(())
    }

    fn handle_event(&mut self, event: Event) -> io::Result<()> {
        match event {
            Event::Key(KeyEvent {
                code,
                kind: KeyEventKind::Press | KeyEventKind::Repeat,
                ..
            }) => self.handle_key(code),
            Event::Resize(columns, rows) => {
                let (width, height) =
                    fit_viewport(columns, rows, self.renderer.width(), self.renderer.height());
                self.ascii.resize(width, height);
                execute!(stdout(), terminal::Clear(ClearType::All))?;
            }
            _ => {}
        }
        Ok(())
    }

    /// Apply one key press to the view
    pub fn handle_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('a') | KeyCode::Left => self.renderer.rotate(-ROTATE_STEP, 0.0),
            KeyCode::Char('d') | KeyCode::Right => self.renderer.rotate(ROTATE_STEP, 0.0),
            KeyCode::Char('w') | KeyCode::Up => self.renderer.rotate(0.0, -ROTATE_STEP),
            KeyCode::Char('s') | KeyCode::Down => self.renderer.rotate(0.0, ROTATE_STEP),
            KeyCode::Char('+') | KeyCode::Char('=') => self.renderer.dolly(ZOOM_FACTOR),
            KeyCode::Char('-') => self.renderer.dolly(1.0 / ZOOM_FACTOR),
            KeyCode::Char('j') => self.renderer.pan(-PAN_STEP, 0.0),
            KeyCode::Char('l') => self.renderer.pan(PAN_STEP, 0.0),
            KeyCode::Char('i') => self.renderer.pan(0.0, PAN_STEP),
            KeyCode::Char('k') => self.renderer.pan(0.0, -PAN_STEP),
            KeyCode::Char('r') => self.renderer.reset_view(),
            KeyCode::Char(' ') => self.spin = !self.spin,
            KeyCode::Char('p') => {
                if let Some(camera) = self.renderer.camera_mut() {
                    camera.mode = match camera.mode {
                        ProjectionMode::Perspective => ProjectionMode::Orthographic,
                        ProjectionMode::Orthographic => ProjectionMode::Perspective,
                    };
                }
            }
            _ => {}
        }
    }

    fn update(&mut self) {
        if self.spin {
            self.renderer.rotate(SPIN_SPEED, 0.0);
        }
    }

    fn render(&mut self) -> io::Result<()> {
        self.ascii.clear();
        self.ascii.render(&self.renderer);

        let mut stdout = stdout();
        self.ascii.draw(&mut stdout, 1)?;

        // Status line above the viewport
        let mode = match self.renderer.camera().map(|c| c.mode) {
            Some(ProjectionMode::Orthographic) => "ortho",
            _ => "persp",
        };
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(ClearType::CurrentLine),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "stlview | FPS: {:.1} | {mode} | WASD/Arrows=Orbit IJKL=Pan +/-=Zoom P=Projection R=Reset Space=Spin Q=Quit",
                self.fps
            )),
            ResetColor
        )?;

        stdout.flush()?;
        Ok(())
    }
}

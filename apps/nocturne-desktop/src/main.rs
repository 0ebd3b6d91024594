mod app_state;
mod scene;

use anyhow::{Context, Result};
use app_state::{AppState, Step};
use clap::Parser;
use nocturne_common::ViewerConfig;
use nocturne_input::{Key, ScrollDelta};
use nocturne_render::Viewport;
use nocturne_render_wgpu::{Acquired, GpuContext, WgpuRenderer};
use scene::LoadedScene;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{DeviceEvent, DeviceId, ElementState, KeyEvent, MouseScrollDelta, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{CursorGrabMode, Window, WindowId};

#[derive(Parser, Debug)]
#[command(name = "nocturne-desktop", about = "Walk through the night alley scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML viewer configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Resource directory, overriding the config
    #[arg(long)]
    resources: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,
}

impl Cli {
    fn apply_overrides(&self, config: &mut ViewerConfig) {
        if let Some(resources) = &self.resources {
            config.resources = resources.clone();
        }
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
    }

    fn load_config(&self) -> Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => ViewerConfig::load(path)
                .with_context(|| format!("reading config {}", path.display()))?,
            None => ViewerConfig::default(),
        };
        self.apply_overrides(&mut config);
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if verbose { "debug" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn map_key(code: KeyCode) -> Option<Key> {
    match code {
        KeyCode::KeyW => Some(Key::W),
        KeyCode::KeyS => Some(Key::S),
        KeyCode::KeyA => Some(Key::A),
        KeyCode::KeyD => Some(Key::D),
        KeyCode::Escape => Some(Key::Escape),
        _ => None,
    }
}

fn map_scroll(delta: MouseScrollDelta) -> ScrollDelta {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => ScrollDelta::Lines(y),
        MouseScrollDelta::PixelDelta(pos) => ScrollDelta::Pixels(pos.y as f32),
    }
}

/// Grab modes in order of preference. `Locked` keeps raw motion unbounded;
/// `Confined` is the fallback where locking is unsupported.
const GRAB_MODES: [CursorGrabMode; 2] = [CursorGrabMode::Locked, CursorGrabMode::Confined];

fn capture_cursor(window: &Window) {
    let grabbed = GRAB_MODES
        .iter()
        .find(|mode| window.set_cursor_grab(**mode).is_ok());
    match grabbed {
        Some(mode) => tracing::debug!("cursor grabbed ({mode:?})"),
        None => tracing::warn!("cursor grab unavailable"),
    }
    window.set_cursor_visible(false);
}

/// Window, GPU and scene state driven by the winit event loop.
struct GpuApp {
    config: ViewerConfig,
    state: AppState,
    window: Option<Arc<Window>>,
    ctx: Option<GpuContext>,
    renderer: Option<WgpuRenderer>,
    /// Raw motion is delivered regardless of focus; only look while focused.
    focused: bool,
    /// Set when startup or rendering fails; reported after the loop exits.
    fatal: Option<anyhow::Error>,
}

impl GpuApp {
    fn new(config: ViewerConfig) -> Self {
        Self {
            state: AppState::new(&config),
            config,
            window: None,
            ctx: None,
            renderer: None,
            focused: true,
            fatal: None,
        }
    }

    fn init(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.window.title.clone())
            .with_inner_size(PhysicalSize::new(
                self.config.window.width,
                self.config.window.height,
            ));
        let window = Arc::new(event_loop.create_window(attrs).context("creating window")?);

        let size = window.inner_size();
        let ctx = GpuContext::new(window.clone(), size.width, size.height)
            .context("initializing GPU")?;

        let loaded = LoadedScene::load(&self.config)?;
        let (width, height) = ctx.size();
        let renderer = WgpuRenderer::new(
            &ctx.device,
            &ctx.queue,
            ctx.format(),
            width,
            height,
            loaded.assets(),
        );

        capture_cursor(&window);
        window.request_redraw();

        self.window = Some(window);
        self.ctx = Some(ctx);
        self.renderer = Some(renderer);
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let (Some(ctx), Some(renderer)) = (&self.ctx, &mut self.renderer) else {
            return Ok(());
        };
        let (width, height) = ctx.size();
        let plan = match self.state.step(Instant::now(), Viewport::new(width, height)) {
            Step::Exit => {
                tracing::info!("exit requested after {} frames", self.state.frames());
                event_loop.exit();
                return Ok(());
            }
            Step::Render(plan) => plan,
        };

        let frame = match ctx.acquire()? {
            Acquired::Frame(frame) => frame,
            Acquired::Skipped => return Ok(()),
        };
        let view = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        renderer.render(&ctx.device, &ctx.queue, &view, &plan)?;
        frame.present();

        if let Some(window) = &self.window {
            window.request_redraw();
        }
        Ok(())
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.fatal = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for GpuApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }
        if let Err(err) = self.init(event_loop) {
            self.fail(event_loop, err);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                if let Some(ctx) = &mut self.ctx {
                    ctx.resize(new_size.width, new_size.height);
                    let (width, height) = ctx.size();
                    if let Some(renderer) = &mut self.renderer {
                        renderer.resize(&ctx.device, width, height);
                    }
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(code),
                        state: key_state,
                        ..
                    },
                ..
            } => {
                if let Some(key) = map_key(code) {
                    self.state
                        .input
                        .key_event(key, key_state == ElementState::Pressed);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.state.input.cursor_moved(position.x, position.y);
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.state.input.scrolled(map_scroll(delta));
            }
            WindowEvent::Focused(false) => {
                self.focused = false;
                self.state.input.focus_lost();
            }
            WindowEvent::Focused(true) => {
                self.focused = true;
                if let Some(window) = &self.window {
                    capture_cursor(window);
                }
            }
            WindowEvent::RedrawRequested => {
                if let Err(err) = self.redraw(event_loop) {
                    self.fail(event_loop, err);
                }
            }
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        if let DeviceEvent::MouseMotion { delta } = event {
            if self.focused {
                self.state.input.mouse_motion(delta.0, delta.1);
            }
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = cli.load_config()?;
    tracing::info!(
        "nocturne-desktop starting, resources at {}",
        config.resources.display()
    );

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = GpuApp::new(config);
    event_loop.run_app(&mut app)?;

    match app.fatal.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_config() {
        let cli = Cli::parse_from([
            "nocturne-desktop",
            "--resources",
            "/srv/alley",
            "--width",
            "800",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.resources, PathBuf::from("/srv/alley"));
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 800);
    }

    #[test]
    fn config_file_is_read_before_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("viewer.yaml");
        std::fs::write(&path, "window:\n  title: Test\n  height: 600\n").unwrap();

        let cli = Cli::parse_from([
            "nocturne-desktop",
            "--config",
            path.to_str().unwrap(),
            "--height",
            "480",
        ]);
        let config = cli.load_config().unwrap();
        assert_eq!(config.window.title, "Test");
        assert_eq!(config.window.height, 480);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let cli = Cli::parse_from(["nocturne-desktop", "-c", "/nonexistent/viewer.yaml"]);
        let err = cli.load_config().unwrap_err();
        assert!(format!("{err:#}").contains("viewer.yaml"));
    }

    #[test]
    fn cursor_lock_is_preferred_over_confine() {
        assert_eq!(GRAB_MODES[0], CursorGrabMode::Locked);
        assert_eq!(GRAB_MODES[1], CursorGrabMode::Confined);
    }

    #[test]
    fn keys_map_to_viewer_keys() {
        assert_eq!(map_key(KeyCode::KeyW), Some(Key::W));
        assert_eq!(map_key(KeyCode::Escape), Some(Key::Escape));
        assert_eq!(map_key(KeyCode::KeyQ), None);
    }

    #[test]
    fn scroll_deltas_keep_their_unit() {
        assert_eq!(
            map_scroll(MouseScrollDelta::LineDelta(0.0, 2.0)),
            ScrollDelta::Lines(2.0)
        );
        let pixels = MouseScrollDelta::PixelDelta(winit::dpi::PhysicalPosition::new(0.0, -50.0));
        assert_eq!(map_scroll(pixels), ScrollDelta::Pixels(-50.0));
    }
}

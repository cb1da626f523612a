//! Hueshift - sound becomes light.
//!
//! Space starts and stops listening, Up/Down change sensitivity,
//! Left/Right change transition speed, Escape quits.

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use hueshift::audio::{
    list_input_devices, AcquisitionController, MicrophoneCapture, RedrawScheduler,
};
use hueshift::cli::Args;
use hueshift::config::{load_config, Config, ResolvedConfig};
use hueshift::display::Backdrop;
use hueshift::params::{AnalysisConfig, AnalyzerSettings, DisplayConfig};
use hueshift::rendering::RenderSystem;

type Controller = AcquisitionController<MicrophoneCapture, RedrawScheduler>;

/// Main application state
struct App {
    // Configuration
    settings: AnalyzerSettings,
    display_config: DisplayConfig,
    device_name: Option<String>,
    listen_on_start: bool,

    // Window and rendering
    window: Option<Arc<Window>>,
    render_system: Option<RenderSystem>,

    // Audio pipeline (created once the window exists)
    controller: Option<Controller>,
    backdrop: Backdrop,
}

impl App {
    fn new(resolved: ResolvedConfig, listen_on_start: bool) -> Self {
        let backdrop = Backdrop::new(&resolved.display, Instant::now());
        Self {
            settings: resolved.settings,
            display_config: resolved.display,
            device_name: resolved.device,
            listen_on_start,
            window: None,
            render_system: None,
            controller: None,
            backdrop,
        }
    }

    fn toggle_listening(&mut self) {
        let Some(ref mut controller) = self.controller else {
            return;
        };

        if controller.is_active() {
            controller.stop();
            self.backdrop.fade_to_idle(Instant::now());
        } else if controller.start().is_err() {
            // Already logged by the controller; stay idle until the next attempt
            log::warn!("Still idle, press Space to try again");
        }

        self.update_title();
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }

    fn step_sensitivity(&mut self, steps: i32) {
        if let Some(ref mut controller) = self.controller {
            controller.step_sensitivity(steps);
            log::info!("Sensitivity {:.1}", controller.settings().sensitivity());
        }
        self.update_title();
    }

    fn step_transition(&mut self, steps: i32) {
        self.display_config.step_transition(steps);
        self.backdrop.configure(&self.display_config);
        log::info!("Transition {:.1}s", self.display_config.transition_secs);
        self.update_title();
    }

    fn update_title(&self) {
        let (Some(window), Some(controller)) = (&self.window, &self.controller) else {
            return;
        };
        window.set_title(&format!(
            "Hueshift - {} - sensitivity {:.1} - transition {:.1}s",
            controller.state(),
            controller.settings().sensitivity(),
            self.display_config.transition_secs
        ));
    }

    /// Render a single frame
    fn render_frame(&mut self) {
        let now = Instant::now();

        if let Some(ref mut controller) = self.controller {
            if let Some(output) = controller.tick(now) {
                self.backdrop.show(output.color, now);
            }
        }

        let Some(ref mut render_system) = self.render_system else {
            return;
        };

        match render_system.render(self.backdrop.current(now)) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                render_system.reconfigure();
            }
            Err(e) => log::error!("Render error: {:?}", e),
        }
    }
}

impl ApplicationHandler for App {
    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        // Keep drawing while the background is still easing toward its target
        if let Some(ref window) = self.window {
            if !self.backdrop.is_settled(Instant::now()) {
                window.request_redraw();
            }
        }
    }

    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return; // Already initialized
        }

        let window_attributes = Window::default_attributes()
            .with_title("Hueshift")
            .with_inner_size(winit::dpi::LogicalSize::new(
                self.display_config.window_width,
                self.display_config.window_height,
            ));

        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                log::error!("Failed to create window: {}", e);
                event_loop.exit();
                return;
            }
        };

        let render_system = match pollster::block_on(RenderSystem::new(Arc::clone(&window))) {
            Ok(render_system) => render_system,
            Err(e) => {
                log::error!("{}", e);
                event_loop.exit();
                return;
            }
        };

        let controller = AcquisitionController::new(
            MicrophoneCapture::new(self.device_name.clone()),
            RedrawScheduler::new(Arc::clone(&window)),
            self.settings,
            AnalysisConfig::default(),
            self.display_config.strobe_duration(),
        );

        self.window = Some(window);
        self.render_system = Some(render_system);
        self.controller = Some(controller);

        log::info!("Press Space to start listening, Escape to quit");

        if self.listen_on_start {
            self.toggle_listening();
        }
        self.update_title();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                if let Some(ref mut controller) = self.controller {
                    controller.stop();
                }
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(ref mut render_system) = self.render_system {
                    render_system.resize(size.width, size.height);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        state: ElementState::Pressed,
                        physical_key: PhysicalKey::Code(code),
                        repeat,
                        ..
                    },
                ..
            } => match code {
                KeyCode::Escape => {
                    if let Some(ref mut controller) = self.controller {
                        controller.stop();
                    }
                    event_loop.exit();
                }
                KeyCode::Space | KeyCode::Enter if !repeat => self.toggle_listening(),
                KeyCode::ArrowUp => self.step_sensitivity(1),
                KeyCode::ArrowDown => self.step_sensitivity(-1),
                KeyCode::ArrowRight => self.step_transition(1),
                KeyCode::ArrowLeft => self.step_transition(-1),
                _ => {}
            },
            WindowEvent::RedrawRequested => {
                self.render_frame();
            }
            _ => {}
        }
    }
}

fn resolve_config(args: &Args) -> Result<ResolvedConfig> {
    let config = match args.config_path() {
        Some(path) => {
            let config = load_config(&path)?;
            log::info!("Loaded config from {}", path.display());
            config
        }
        None => Config::default(),
    };
    Ok(config.resolve(args)?)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let args = Args::parse();

    if args.list_devices {
        let devices = list_input_devices().context("Failed to list input devices")?;
        if devices.is_empty() {
            println!("No input devices found");
        }
        for name in devices {
            println!("{}", name);
        }
        return Ok(());
    }

    let resolved = resolve_config(&args)?;

    let mut app = App::new(resolved, args.listen);
    let event_loop = EventLoop::new().context("Failed to create event loop")?;
    event_loop
        .run_app(&mut app)
        .context("Event loop terminated abnormally")?;

    Ok(())
}

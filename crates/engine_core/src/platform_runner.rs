// crates/engine_core/src/platform_runner.rs

use std::fs::OpenOptions;
use std::io::Write;

use tracing::{error, info, warn};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop, EventLoopWindowTarget};
use winit::window::{Window, WindowBuilder};

use engine_shared::{GameEvent, Key};

use crate::app::App;
use crate::canvas::{EguiCanvas, LOGICAL_HEIGHT, LOGICAL_WIDTH};
use crate::error::HostError;
use crate::input::InputPoller;
use crate::plugin_manager::{PluginManager, PluginRuntimeState};
use crate::renderer::Renderer;

/// Simple, best-effort file logger for fatal errors.
fn log_fatal_error_to_file(message: &str) {
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open("engine_fatal.log")
    {
        let _ = writeln!(file, "{}", message);
    }
}

fn fatal(elwt: &EventLoopWindowTarget<()>, message: &str) {
    error!("{message}");
    log_fatal_error_to_file(message);
    elwt.exit();
}

/// Owns App and runs the platform (winit) event loop.
/// This isolates OS interaction from the engine core.
pub struct PlatformRunner {
    app: App,
}

impl PlatformRunner {
    pub fn new(app: App) -> Self {
        Self { app }
    }

    pub fn start(mut self) -> Result<(), HostError> {
        let event_loop = EventLoop::new().map_err(|e| HostError::Window(e.to_string()))?;
        let window = WindowBuilder::new()
            .with_title(&self.app.window_title)
            .with_inner_size(winit::dpi::LogicalSize::new(LOGICAL_WIDTH, LOGICAL_HEIGHT))
            .build(&event_loop)
            .map_err(|e| HostError::Window(e.to_string()))?;

        // GUI + renderer initialization
        self.app.gui.init(&window);
        let mut renderer = pollster::block_on(Renderer::new(&window))?;
        let mut canvas = EguiCanvas::new(self.app.gui.ctx.clone(), &self.app.assets_dir);

        let mut plugin_manager = PluginManager::new(&self.app.plugin_path)?;
        plugin_manager.initial_load(&mut canvas)?;
        info!(plugin = %self.app.plugin_path.display(), "simulation module started");

        let mut input_poller = InputPoller::new();

        event_loop
            .run(move |event, elwt| {
                elwt.set_control_flow(ControlFlow::Poll);

                // Give GUI first shot at all window events (for focus, etc.).
                if let Event::WindowEvent { event: ref w_event, .. } = event {
                    self.app.gui.handle_event(&window, w_event);
                }

                match event {
                    Event::WindowEvent { event: win_event, .. } => match win_event {
                        WindowEvent::CloseRequested => elwt.exit(),

                        WindowEvent::KeyboardInput { .. } => {
                            if !self.app.gui.wants_keyboard_input() {
                                input_poller.handle_event(&win_event);
                            }
                        }

                        WindowEvent::Resized(size) => renderer.resize(size),

                        WindowEvent::RedrawRequested => {
                            self.redraw(&window, &mut renderer, &mut plugin_manager, &mut canvas, elwt);
                        }

                        other => input_poller.handle_event(&other),
                    },

                    Event::AboutToWait => {
                        // --- UPDATE PHASE ---

                        // 1) Discrete presses: host keys first, the rest to the module.
                        for key in input_poller.drain_pressed() {
                            match key {
                                Key::Escape => elwt.exit(),
                                Key::F5 => reload(&mut plugin_manager, &mut canvas, elwt),
                                key => plugin_manager.handle_event(&GameEvent::KeyPressed(key)),
                            }
                        }

                        // 2) Held input snapshot, then one simulation step.
                        let input = input_poller.snapshot(
                            &self.app.input_map,
                            &canvas.viewport(),
                            self.app.gui.pixels_per_point(),
                        );
                        if let Some(title) = plugin_manager.update(&input).and_then(|s| s.window_title) {
                            window.set_title(&title);
                        }

                        window.request_redraw();
                    }

                    _ => {}
                }
            })
            .map_err(|e| HostError::Window(e.to_string()))
    }

    fn redraw(
        &mut self,
        window: &Window,
        renderer: &mut Renderer,
        plugin_manager: &mut PluginManager,
        canvas: &mut EguiCanvas,
        elwt: &EventLoopWindowTarget<()>,
    ) {
        let Some((primitives, textures_delta)) = self.app.gui.draw(window, |ctx| {
            plugin_manager.render(canvas);
            canvas.paint(ctx);

            // Plugin runtime errors overlay.
            if let PluginRuntimeState::PausedError(msg) = &plugin_manager.runtime_state {
                egui::Window::new("CRITICAL ERROR")
                    .default_pos([300.0, 100.0])
                    .show(ctx, |ui| {
                        ui.colored_label(egui::Color32::RED, format!("Plugin Error: {}", msg));
                        ui.label("Fix source code and press F5 to reload.");
                    });
            }
        }) else {
            return;
        };

        match renderer.render(&self.app.gui.ctx, &primitives, &textures_delta) {
            Ok(()) => {}
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                warn!("surface lost or outdated; reconfiguring swapchain");
                renderer.resize(window.inner_size());
            }
            Err(wgpu::SurfaceError::OutOfMemory) => {
                fatal(elwt, "out of GPU memory");
            }
            Err(wgpu::SurfaceError::Timeout) => {
                warn!("surface timeout; skipping frame");
            }
        }
    }
}

fn reload(plugin_manager: &mut PluginManager, canvas: &mut EguiCanvas, elwt: &EventLoopWindowTarget<()>) {
    // A paused module never got to release its textures.
    if plugin_manager.runtime_state != PluginRuntimeState::Running {
        canvas.clear();
    }
    match plugin_manager.try_hot_reload(canvas) {
        Ok(true) => info!("hot reload complete"),
        Ok(false) => {}
        Err(err) => fatal(elwt, &format!("reload failed: {err}")),
    }
}

use anyhow::{Result, anyhow};
use clap::Parser;
use lifegrid_common::{ALIVE_PROBABILITY, DEFAULT_SEED, GRID_SIZE, UPDATE_INTERVAL};
use lifegrid_kernel::{Generation, TickClock};
use lifegrid_render_wgpu::{FrameTarget, GpuContext, GridState, LifeSimulator};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, KeyEvent, WindowEvent};
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::{Window, WindowId};

#[derive(Parser)]
#[command(name = "lifegrid-desktop", about = "GPU Game of Life in a window")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Seed for the random initial generation
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
}

/// Window, surface and device, created once the event loop resumes.
struct Gpu {
    window: Arc<Window>,
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,
    context: GpuContext,
    simulator: Option<LifeSimulator>,
}

impl Gpu {
    fn new(event_loop: &ActiveEventLoop, initial: &Generation) -> Result<Self> {
        let attrs = Window::default_attributes()
            .with_title("lifegrid")
            .with_inner_size(PhysicalSize::new(768u32, 768));
        let window = Arc::new(event_loop.create_window(attrs)?);

        let instance = GpuContext::create_instance();
        let surface = instance.create_surface(window.clone())?;
        let context = pollster::block_on(GpuContext::request(instance, Some(&surface)))?;

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&context.adapter);
        // Linear formats keep the cell palette as authored.
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| !f.is_srgb())
            .or_else(|| surface_caps.formats.first())
            .copied()
            .ok_or_else(|| anyhow!("surface is not supported by the adapter"))?;

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&context.device, &config);

        let grid = GridState::upload(&context, initial)?;
        let simulator = LifeSimulator::new(&context, grid, surface_format)?;

        Ok(Self {
            window,
            surface,
            config,
            context,
            simulator: Some(simulator),
        })
    }

    fn resize(&mut self, size: PhysicalSize<u32>) {
        self.config.width = size.width.max(1);
        self.config.height = size.height.max(1);
        self.surface.configure(&self.context.device, &self.config);
    }

    /// One scheduler firing: acquire, tick, present.
    fn frame(&mut self) -> Result<()> {
        let Some(simulator) = self.simulator.as_mut() else {
            return Ok(());
        };

        let output = match self.surface.get_current_texture() {
            Ok(t) => t,
            Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                // Skipped firing; the next one draws into the reconfigured surface.
                self.surface.configure(&self.context.device, &self.config);
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                tracing::warn!("surface timeout, skipping tick");
                return Ok(());
            }
            Err(e) => return Err(anyhow!("surface error: {e}")),
        };

        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let target = FrameTarget {
            view: &view,
            width: self.config.width,
            height: self.config.height,
        };
        simulator.tick(&self.context, &target)?;

        self.window.pre_present_notify();
        output.present();
        Ok(())
    }

    fn teardown(&mut self) {
        if let Some(simulator) = self.simulator.take() {
            simulator.teardown();
        }
    }
}

struct LifeApp {
    initial: Generation,
    gpu: Option<Gpu>,
    clock: TickClock,
    running: bool,
    tick_pending: bool,
    error: Option<anyhow::Error>,
}

impl LifeApp {
    fn new(initial: Generation) -> Self {
        Self {
            initial,
            gpu: None,
            clock: TickClock::new(UPDATE_INTERVAL, Instant::now()),
            running: true,
            tick_pending: false,
            error: None,
        }
    }

    /// Record a fatal error and shut down.
    fn fail(&mut self, event_loop: &ActiveEventLoop, error: anyhow::Error) {
        tracing::error!("{error:#}");
        self.running = false;
        if let Some(gpu) = &mut self.gpu {
            gpu.teardown();
        }
        self.error = Some(error);
        event_loop.exit();
    }

    fn handle_key(&mut self, event_loop: &ActiveEventLoop, key: KeyCode) {
        match key {
            KeyCode::Space => {
                self.running = !self.running;
                if self.running {
                    self.clock.reset(Instant::now());
                    tracing::info!("scheduler resumed");
                } else {
                    self.tick_pending = false;
                    tracing::info!("scheduler stopped");
                }
            }
            KeyCode::Escape => {
                event_loop.exit();
            }
            _ => {}
        }
    }
}

impl ApplicationHandler for LifeApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.gpu.is_some() {
            return;
        }
        match Gpu::new(event_loop, &self.initial) {
            Ok(gpu) => {
                self.gpu = Some(gpu);
                self.clock.reset(Instant::now());
            }
            Err(e) => self.fail(event_loop, e.context("startup failed")),
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
                if let Some(gpu) = &mut self.gpu {
                    gpu.resize(new_size);
                }
            }
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                self.handle_key(event_loop, key);
            }
            WindowEvent::RedrawRequested => {
                // Redraws the OS asks for on its own do not advance the simulation.
                if !std::mem::take(&mut self.tick_pending) {
                    return;
                }
                let Some(gpu) = &mut self.gpu else {
                    return;
                };
                if let Err(e) = gpu.frame() {
                    self.fail(event_loop, e.context("tick failed"));
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if !self.running || self.gpu.is_none() {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        }
        if self.clock.poll(Instant::now()) {
            self.tick_pending = true;
            if let Some(gpu) = &self.gpu {
                gpu.window.request_redraw();
            }
        }
        event_loop.set_control_flow(ControlFlow::WaitUntil(self.clock.next_deadline()));
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(gpu) = &mut self.gpu {
            gpu.teardown();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("lifegrid-desktop starting");

    // Validated before any window or device exists.
    let initial = GridState::prepare(
        GRID_SIZE as i64,
        GRID_SIZE as i64,
        ALIVE_PROBABILITY,
        cli.seed,
    )?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = LifeApp::new(initial);
    event_loop.run_app(&mut app)?;

    match app.error.take() {
        Some(e) => Err(e),
        None => Ok(()),
    }
}

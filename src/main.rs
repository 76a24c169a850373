//! Simple GPU particle physics
//!
//! Drops a box of colored spheres onto a floor. The physics runs in a compute
//! kernel stepped five times per frame; the spheres are drawn with a single
//! instanced indirect draw straight from the particle buffer.

use particle_renderer::{Camera, MeshData, ParticleMesh, ParticleRenderer, WgpuBackend};
use particle_simulation::{ParticleSimulation, SimulationConfig};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Instant;
use winit::{
    application::ApplicationHandler,
    event::*,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

const PARTICLE_COUNT: u32 = 512;
const PARTICLE_DIAMETER: f32 = 0.2;
const BOX_SIZE: f32 = 2.5;

/// Longest frame the simulation is stepped by, so a stall does not explode the kernel
const MAX_FRAME_DELTA: f32 = 1.0 / 3.0;

const SPHERE_SECTORS: u32 = 16;
const SPHERE_STACKS: u32 = 8;

const KERNEL_SOURCE: &str = include_str!("../assets/shaders/simple_physics.wgsl");

fn simulation_config() -> SimulationConfig {
    SimulationConfig {
        particle_count: PARTICLE_COUNT,
        particle_diameter: PARTICLE_DIAMETER,
        box_size: BOX_SIZE,
        ..Default::default()
    }
}

/// Fresh seeded rng; the seed is logged so a run can be reproduced
fn seeded_rng() -> StdRng {
    let seed: u64 = rand::random();
    log::info!("Particle seed: {}", seed);
    StdRng::seed_from_u64(seed)
}

struct GpuState {
    surface: wgpu::Surface<'static>,
    config: wgpu::SurfaceConfiguration,

    simulation: ParticleSimulation<WgpuBackend>,
    sim_config: SimulationConfig,
    camera: Camera,

    last_frame_time: Instant,
}

impl GpuState {
    async fn new(window: Arc<Window>) -> Self {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor::default());

        let surface = instance.create_surface(window.clone()).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .unwrap();

        log::info!("✓ Using GPU: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("Device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: wgpu::MemoryHints::default(),
                experimental_features: wgpu::ExperimentalFeatures::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .unwrap();

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

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
        surface.configure(&device, &config);

        let renderer = ParticleRenderer::new(&device, config.format, config.width, config.height);
        let mesh = ParticleMesh::new(
            &device,
            &MeshData::uv_sphere(SPHERE_SECTORS, SPHERE_STACKS),
        );
        log::info!("✓ Renderer initialized");

        let backend = WgpuBackend::new(device, queue, KERNEL_SOURCE, renderer, Some(mesh))
            .unwrap_or_else(|e| panic!("Failed to load particle kernel: {}", e));

        let sim_config = simulation_config();
        let mut simulation = ParticleSimulation::new(backend);
        simulation
            .initialize(&sim_config, &mut seeded_rng())
            .unwrap_or_else(|e| panic!("Failed to initialize simulation: {}", e));
        log::info!("✓ Simulation initialized");

        let camera = Camera::new(config.width, config.height);

        Self {
            surface,
            config,
            simulation,
            sim_config,
            camera,
            last_frame_time: Instant::now(),
        }
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.config.width = new_size.width;
            self.config.height = new_size.height;
            let backend = self.simulation.device_mut();
            self.surface.configure(backend.device(), &self.config);
            backend.resize(new_size.width, new_size.height);
            self.camera.resize(new_size.width, new_size.height);
        }
    }

    fn reset(&mut self) {
        match self.simulation.initialize(&self.sim_config, &mut seeded_rng()) {
            Ok(()) => log::info!("Simulation reset"),
            Err(e) => log::error!("Simulation reset failed: {}", e),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let now = Instant::now();
        let frame_delta = (now - self.last_frame_time)
            .as_secs_f32()
            .min(MAX_FRAME_DELTA);
        self.last_frame_time = now;

        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let backend = self.simulation.device_mut();
        backend.update_camera(&self.camera);
        backend.set_render_target(view);

        if let Err(e) = self.simulation.step(frame_delta) {
            log::error!("Simulation step failed: {}", e);
        }

        output.present();
        Ok(())
    }
}

struct App {
    window: Option<Arc<Window>>,
    gpu_state: Option<GpuState>,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_none() {
            let window_attributes = Window::default_attributes()
                .with_title("Simple Particle Physics")
                .with_inner_size(winit::dpi::LogicalSize::new(1280, 720));

            let window = Arc::new(event_loop.create_window(window_attributes).unwrap());
            self.window = Some(window.clone());
            self.gpu_state = Some(pollster::block_on(GpuState::new(window)));
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested
            | WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::Escape),
                        ..
                    },
                ..
            } => {
                // Release the device buffers before the window goes away
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.simulation.shutdown();
                }
                event_loop.exit();
            }

            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(KeyCode::KeyR),
                        state: ElementState::Pressed,
                        repeat: false,
                        ..
                    },
                ..
            } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.reset();
                }
            }

            WindowEvent::Resized(physical_size) => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    gpu_state.resize(physical_size);
                }
            }

            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                self.mouse_pressed = state == ElementState::Pressed;
                if !self.mouse_pressed {
                    self.last_mouse_pos = None;
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                if self.mouse_pressed {
                    if let (Some((last_x, last_y)), Some(gpu_state)) =
                        (self.last_mouse_pos, &mut self.gpu_state)
                    {
                        let dx = (position.x - last_x) as f32 * 0.005;
                        let dy = (position.y - last_y) as f32 * 0.005;
                        gpu_state.camera.rotate(dx, dy);
                    }
                    self.last_mouse_pos = Some((position.x, position.y));
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    let scroll = match delta {
                        MouseScrollDelta::LineDelta(_, y) => y,
                        MouseScrollDelta::PixelDelta(pos) => pos.y as f32 * 0.02,
                    };
                    gpu_state.camera.zoom(-scroll * 0.5);
                }
            }

            WindowEvent::RedrawRequested => {
                if let Some(gpu_state) = &mut self.gpu_state {
                    match gpu_state.render() {
                        Ok(()) => {}
                        Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                            let size = winit::dpi::PhysicalSize::new(
                                gpu_state.config.width,
                                gpu_state.config.height,
                            );
                            gpu_state.resize(size);
                        }
                        Err(wgpu::SurfaceError::OutOfMemory) => {
                            log::error!("Out of GPU memory, exiting");
                            event_loop.exit();
                        }
                        Err(e) => log::warn!("Surface error: {:?}", e),
                    }
                }
            }

            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    log::info!("Starting simple particle physics...");

    let event_loop = EventLoop::new().unwrap();
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App {
        window: None,
        gpu_state: None,
        mouse_pressed: false,
        last_mouse_pos: None,
    };

    event_loop.run_app(&mut app).unwrap();
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{ensure, Context, Result};
use image::{DynamicImage, RgbaImage};
use warp_simulation::{
    BubbleAnimation, DriveParameters, Session, SymbolicMetricModel, FRAME_INTERVAL_MS,
};
use wgpu::util::DeviceExt;
use winit::{
    application::ApplicationHandler,
    event::{ElementState, KeyEvent, WindowEvent},
    event_loop::{ActiveEventLoop, EventLoop},
    keyboard::{KeyCode, PhysicalKey},
    window::{Window, WindowId},
};

use crate::actions::{dispatch, Action, Outcome};
use crate::plots::{render_animation_frame, RenderOptions};
use crate::texture::Texture;

pub const HELP: &str = "\
Warp Bubble Explorer
  1 / 2 / 3      1D curve, 2D map, animation
  Up / Down      mass +/- step (1..50 kg)
  Right / Left   energy density +/- step (1..100 J/m^3)
  I              concept explanation
  C              curvature estimate
  D              drive simulation
  S              symbolic analysis
  P              export PDF report
  H              this help
  Esc            quit";

#[derive(Debug, Clone)]
pub struct ViewerSettings {
    pub width: u32,
    pub height: u32,
    pub initial: DriveParameters,
    pub mass_step: f64,
    pub energy_step: f64,
    /// Where P writes the report; without one the export is cancelled.
    pub export_path: Option<PathBuf>,
    pub render: RenderOptions,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            width: 1024,
            height: 768,
            initial: DriveParameters::default(),
            mass_step: 1.0,
            energy_step: 1.0,
            export_path: None,
            render: RenderOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum View {
    Line,
    Contour,
    Animation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyResponse {
    Ignored,
    Handled,
    Quit,
}

/// Window-independent part of the viewer: session, current view and the
/// animation clock.
struct Explorer {
    session: Session,
    model: SymbolicMetricModel,
    settings: ViewerSettings,
    view: View,
    animation: Option<BubbleAnimation>,
    frame: usize,
    last_frame_at: Instant,
    dirty: bool,
}

impl Explorer {
    fn new(settings: ViewerSettings, model: SymbolicMetricModel) -> Self {
        let initial =
            DriveParameters::clamped(settings.initial.mass, settings.initial.energy_density);
        Self {
            session: Session::with_parameters(initial),
            model,
            settings,
            view: View::Line,
            animation: None,
            frame: 0,
            last_frame_at: Instant::now(),
            dirty: true,
        }
    }

    fn handle_key(&mut self, key: KeyCode) -> KeyResponse {
        let (mass_step, energy_step) = (self.settings.mass_step, self.settings.energy_step);
        match key {
            KeyCode::Digit1 => self.show(View::Line),
            KeyCode::Digit2 => self.show(View::Contour),
            KeyCode::Digit3 => self.show(View::Animation),
            KeyCode::ArrowUp => self.adjust(mass_step, 0.0),
            KeyCode::ArrowDown => self.adjust(-mass_step, 0.0),
            KeyCode::ArrowRight => self.adjust(0.0, energy_step),
            KeyCode::ArrowLeft => self.adjust(0.0, -energy_step),
            KeyCode::KeyI => self.print(Action::ShowConcept),
            KeyCode::KeyC => self.print(Action::ComputeCurvature(self.session.parameters())),
            KeyCode::KeyD => self.print(Action::SimulateDrive(self.session.parameters())),
            KeyCode::KeyS => self.print(Action::SymbolicAnalysis),
            KeyCode::KeyP => self.print(Action::ExportPdf(self.settings.export_path.clone())),
            KeyCode::KeyH => println!("{HELP}"),
            KeyCode::Escape => return KeyResponse::Quit,
            _ => return KeyResponse::Ignored,
        }
        KeyResponse::Handled
    }

    fn show(&mut self, view: View) {
        if self.view != view {
            self.view = view;
            self.frame = 0;
            self.dirty = true;
        }
    }

    fn adjust(&mut self, mass_delta: f64, energy_delta: f64) {
        let current = self.session.parameters();
        let params = DriveParameters::clamped(
            current.mass + mass_delta,
            current.energy_density + energy_delta,
        );
        if params != current {
            log::info!("mass {} kg, energy density {} J/m^3", params.mass, params.energy_density);
            self.session.record(params);
            self.animation = None;
            self.frame = 0;
            self.dirty = true;
        }
    }

    fn print(&mut self, action: Action) {
        match dispatch(&mut self.session, &self.model, action, &self.settings.render) {
            Ok(Outcome::Text { title, body }) => println!("\n== {title} ==\n{body}\n"),
            Ok(Outcome::Exported(path)) => println!("Report saved to {}", path.display()),
            Ok(Outcome::Cancelled) => {
                println!("Export cancelled: start the viewer with --export <PATH>")
            }
            Ok(other) => log::debug!("ignoring {:?}", other),
            Err(err) => log::error!("{err:#}"),
        }
    }

    /// The figure to show next, if it changed since the last call.
    fn next_image(&mut self, now: Instant) -> Result<Option<RgbaImage>> {
        match self.view {
            View::Line | View::Contour => {
                if !self.dirty {
                    return Ok(None);
                }
                let action = if self.view == View::Line {
                    Action::PlotLine
                } else {
                    Action::PlotContour
                };
                self.dirty = false;
                match dispatch(&mut self.session, &self.model, action, &self.settings.render)? {
                    Outcome::Figure { image, .. } => {
                        Ok(Some(DynamicImage::ImageRgb8(image).into_rgba8()))
                    }
                    _ => Ok(None),
                }
            }
            View::Animation => {
                let interval = Duration::from_millis(FRAME_INTERVAL_MS as u64);
                if !self.dirty && now.duration_since(self.last_frame_at) < interval {
                    return Ok(None);
                }
                if self.animation.is_none() {
                    let outcome = dispatch(
                        &mut self.session,
                        &self.model,
                        Action::Animate,
                        &self.settings.render,
                    )?;
                    if let Outcome::Animation(animation) = outcome {
                        self.animation = Some(animation);
                    }
                }
                let Some(animation) = &self.animation else {
                    return Ok(None);
                };
                if !self.dirty {
                    self.frame = (self.frame + 1) % animation.frame_count();
                }
                self.dirty = false;
                self.last_frame_at = now;
                let frame = animation.render_frame(self.frame)?;
                let image = render_animation_frame(&frame, &self.settings.render)?;
                Ok(Some(DynamicImage::ImageRgb8(image).into_rgba8()))
            }
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct Vertex {
    position: [f32; 3],
    tex_coords: [f32; 2],
}

impl Vertex {
    fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;
        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x3,
                },
                wgpu::VertexAttribute {
                    offset: mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x2,
                },
            ],
        }
    }
}

const QUAD_VERTICES: [Vertex; 4] = [
    Vertex {
        position: [-1.0, -1.0, 0.0],
        tex_coords: [0.0, 1.0],
    },
    Vertex {
        position: [1.0, -1.0, 0.0],
        tex_coords: [1.0, 1.0],
    },
    Vertex {
        position: [1.0, 1.0, 0.0],
        tex_coords: [1.0, 0.0],
    },
    Vertex {
        position: [-1.0, 1.0, 0.0],
        tex_coords: [0.0, 0.0],
    },
];
const QUAD_INDICES: [u16; 6] = [0, 1, 2, 0, 2, 3];

/// Scale applied to the quad so the figure keeps its aspect ratio.
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
struct ViewportUniform {
    scale: [f32; 2],
    _padding: [f32; 2],
}

impl ViewportUniform {
    fn fit(window_width: u32, window_height: u32, figure_aspect: f32) -> Self {
        let window_aspect = window_width.max(1) as f32 / window_height.max(1) as f32;
        let scale = if window_aspect > figure_aspect {
            [figure_aspect / window_aspect, 1.0]
        } else {
            [1.0, window_aspect / figure_aspect]
        };
        Self {
            scale,
            _padding: [0.0; 2],
        }
    }
}

struct State {
    surface: wgpu::Surface<'static>,
    device: wgpu::Device,
    queue: wgpu::Queue,
    config: wgpu::SurfaceConfiguration,
    size: winit::dpi::PhysicalSize<u32>,
    window: Arc<Window>,
    render_pipeline: wgpu::RenderPipeline,
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    viewport_buffer: wgpu::Buffer,
    viewport_bind_group: wgpu::BindGroup,
    texture_bind_group_layout: wgpu::BindGroupLayout,
    figure: Texture,
    figure_bind_group: wgpu::BindGroup,
}

impl State {
    async fn new(window: Arc<Window>, first_figure: &RgbaImage) -> Result<State> {
        let size = window.inner_size();

        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance
            .create_surface(Arc::clone(&window))
            .context("could not create a drawing surface for the window")?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .context("no compatible GPU adapter found")?;

        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    required_features: wgpu::Features::empty(),
                    required_limits: adapter.limits(),
                    label: None,
                },
                None,
            )
            .await
            .context("could not open the GPU device")?;

        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_caps.formats.first().copied())
            .context("surface reports no texture formats")?;

        let max_texture_size = device.limits().max_texture_dimension_2d;
        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1).min(max_texture_size),
            height: size.height.max(1).min(max_texture_size),
            present_mode: surface_caps
                .present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::Fifo),
            alpha_mode: surface_caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(&QUAD_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(&QUAD_INDICES),
            usage: wgpu::BufferUsages::INDEX,
        });

        check_texture_size(first_figure, device.limits().max_texture_dimension_2d)?;
        let figure = Texture::from_image(&device, &queue, first_figure, "figure");
        let viewport = ViewportUniform::fit(config.width, config.height, figure.aspect_ratio());
        let viewport_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Viewport Buffer"),
            contents: bytemuck::cast_slice(&[viewport]),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        let viewport_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::VERTEX,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Uniform,
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                }],
                label: Some("viewport_bind_group_layout"),
            });
        let viewport_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &viewport_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: viewport_buffer.as_entire_binding(),
            }],
            label: Some("viewport_bind_group"),
        });

        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some("texture_bind_group_layout"),
            });
        let figure_bind_group = figure_bind_group(&device, &texture_bind_group_layout, &figure);

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Figure Shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("figure.wgsl").into()),
        });
        let render_pipeline_layout =
            device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("Render Pipeline Layout"),
                bind_group_layouts: &[&viewport_bind_group_layout, &texture_bind_group_layout],
                push_constant_ranges: &[],
            });
        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Figure Pipeline"),
            layout: Some(&render_pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: "vs_main",
                buffers: &[Vertex::desc()],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: "fs_main",
                targets: &[Some(wgpu::ColorTargetState {
                    format: config.format,
                    blend: Some(wgpu::BlendState::REPLACE),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: wgpu::PipelineCompilationOptions::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: None,
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
        });

        Ok(State {
            surface,
            device,
            queue,
            config,
            size,
            window,
            render_pipeline,
            vertex_buffer,
            index_buffer,
            num_indices: QUAD_INDICES.len() as u32,
            viewport_buffer,
            viewport_bind_group,
            texture_bind_group_layout,
            figure,
            figure_bind_group,
        })
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        if new_size.width > 0 && new_size.height > 0 {
            self.size = new_size;
            let max_texture_size = self.device.limits().max_texture_dimension_2d;
            self.config.width = new_size.width.min(max_texture_size);
            self.config.height = new_size.height.min(max_texture_size);
            self.surface.configure(&self.device, &self.config);
            self.update_viewport();
        }
    }

    fn set_figure(&mut self, image: &RgbaImage) -> Result<()> {
        if self.figure.matches(image) {
            self.figure.write(&self.queue, image);
        } else {
            check_texture_size(image, self.device.limits().max_texture_dimension_2d)?;
            self.figure = Texture::from_image(&self.device, &self.queue, image, "figure");
            self.figure_bind_group =
                figure_bind_group(&self.device, &self.texture_bind_group_layout, &self.figure);
            self.update_viewport();
        }
        Ok(())
    }

    fn update_viewport(&self) {
        let viewport = ViewportUniform::fit(
            self.config.width,
            self.config.height,
            self.figure.aspect_ratio(),
        );
        self.queue
            .write_buffer(&self.viewport_buffer, 0, bytemuck::cast_slice(&[viewport]));
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Figure Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::WHITE),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                occlusion_query_set: None,
                timestamp_writes: None,
            });
            render_pass.set_pipeline(&self.render_pipeline);
            render_pass.set_bind_group(0, &self.viewport_bind_group, &[]);
            render_pass.set_bind_group(1, &self.figure_bind_group, &[]);
            render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
            render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint16);
            render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
        }
        self.queue.submit(std::iter::once(encoder.finish()));
        output.present();
        Ok(())
    }
}

/// Figures larger than the device allows cannot be uploaded.
fn check_texture_size(image: &RgbaImage, limit: u32) -> Result<()> {
    let (width, height) = image.dimensions();
    ensure!(
        width <= limit && height <= limit,
        "figure size {width}x{height} exceeds the device texture limit of {limit}px"
    );
    Ok(())
}

fn figure_bind_group(
    device: &wgpu::Device,
    layout: &wgpu::BindGroupLayout,
    figure: &Texture,
) -> wgpu::BindGroup {
    device.create_bind_group(&wgpu::BindGroupDescriptor {
        layout,
        entries: &[
            wgpu::BindGroupEntry {
                binding: 0,
                resource: wgpu::BindingResource::TextureView(&figure.view),
            },
            wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::Sampler(&figure.sampler),
            },
        ],
        label: Some("figure_bind_group"),
    })
}

struct App {
    explorer: Explorer,
    state: Option<State>,
    failure: Option<anyhow::Error>,
}

impl App {
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure = Some(err);
        event_loop.exit();
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() {
            return;
        }

        let settings = &self.explorer.settings;
        let window_attributes = Window::default_attributes()
            .with_title("Warp Bubble Explorer")
            .with_inner_size(winit::dpi::PhysicalSize::new(settings.width, settings.height));
        let window = match event_loop.create_window(window_attributes) {
            Ok(window) => Arc::new(window),
            Err(err) => return self.fail(event_loop, err.into()),
        };

        let first = match self.explorer.next_image(Instant::now()) {
            Ok(Some(image)) => image,
            Ok(None) => RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255])),
            Err(err) => return self.fail(event_loop, err),
        };
        match pollster::block_on(State::new(window, &first)) {
            Ok(state) => self.state = Some(state),
            Err(err) => self.fail(event_loop, err),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, id: WindowId, event: WindowEvent) {
        let Some(state) = self.state.as_mut() else {
            return;
        };
        if state.window.id() != id {
            return;
        }

        match event {
            WindowEvent::CloseRequested => event_loop.exit(),
            WindowEvent::KeyboardInput {
                event:
                    KeyEvent {
                        physical_key: PhysicalKey::Code(key),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => {
                if self.explorer.handle_key(key) == KeyResponse::Quit {
                    event_loop.exit();
                }
            }
            WindowEvent::Resized(physical_size) => state.resize(physical_size),
            WindowEvent::RedrawRequested => {
                let shown = match self.explorer.next_image(Instant::now()) {
                    Ok(Some(image)) => state.set_figure(&image),
                    Ok(None) => Ok(()),
                    Err(err) => Err(err),
                };
                if let Err(err) = shown {
                    log::error!("{err:#}");
                }
                match state.render() {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        state.resize(state.size)
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("OutOfMemory");
                        event_loop.exit();
                    }
                    Err(wgpu::SurfaceError::Timeout) => {
                        log::warn!("Surface timeout")
                    }
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(state) = &self.state {
            state.window.request_redraw();
        }
    }
}

/// Open the explorer window and block until it is closed.
pub fn run(settings: ViewerSettings, model: SymbolicMetricModel) -> Result<()> {
    settings.render.validate()?;
    println!("{HELP}");
    let event_loop = EventLoop::new()?;
    let mut app = App {
        explorer: Explorer::new(settings, model),
        state: None,
        failure: None,
    };
    event_loop.run_app(&mut app)?;
    match app.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oversized_figures_are_refused() {
        let figure = RgbaImage::new(64, 32);
        assert!(check_texture_size(&figure, 64).is_ok());
        assert!(check_texture_size(&figure, 63).is_err());
        assert!(check_texture_size(&RgbaImage::new(16, 100), 64).is_err());
    }

    fn explorer() -> Explorer {
        let settings = ViewerSettings {
            render: RenderOptions {
                width: 64,
                height: 48,
                ..RenderOptions::bare()
            },
            ..ViewerSettings::default()
        };
        Explorer::new(settings, SymbolicMetricModel::new())
    }

    #[test]
    fn test_arrow_keys_stay_within_slider_ranges() {
        let mut explorer = explorer();
        for _ in 0..80 {
            explorer.handle_key(KeyCode::ArrowUp);
            explorer.handle_key(KeyCode::ArrowLeft);
        }
        let params = explorer.session.parameters();
        assert_eq!(params.mass, 50.0);
        assert_eq!(params.energy_density, 1.0);
    }

    #[test]
    fn test_initial_parameters_are_clamped() {
        let settings = ViewerSettings {
            initial: DriveParameters {
                mass: 500.0,
                energy_density: 0.5,
            },
            ..ViewerSettings::default()
        };
        let explorer = Explorer::new(settings, SymbolicMetricModel::new());
        assert!(explorer.session.parameters().within_control_ranges());
    }

    #[test]
    fn test_static_views_render_once_until_changed() {
        let mut explorer = explorer();
        let now = Instant::now();
        assert!(explorer.next_image(now).unwrap().is_some());
        assert!(explorer.next_image(now).unwrap().is_none());
        assert_eq!(explorer.handle_key(KeyCode::Digit2), KeyResponse::Handled);
        let image = explorer.next_image(now).unwrap().unwrap();
        assert_eq!(image.dimensions(), (64, 48));
    }

    #[test]
    fn test_animation_advances_and_wraps() {
        let mut explorer = explorer();
        explorer.handle_key(KeyCode::Digit3);
        let start = Instant::now();
        assert!(explorer.next_image(start).unwrap().is_some());
        assert_eq!(explorer.frame, 0);
        assert!(explorer.next_image(start).unwrap().is_none());

        let mut now = start;
        for _ in 0..100 {
            now += Duration::from_millis(50);
            assert!(explorer.next_image(now).unwrap().is_some());
        }
        assert_eq!(explorer.frame, 0);
    }

    #[test]
    fn test_unknown_and_quit_keys() {
        let mut explorer = explorer();
        assert_eq!(explorer.handle_key(KeyCode::KeyZ), KeyResponse::Ignored);
        assert_eq!(explorer.handle_key(KeyCode::Escape), KeyResponse::Quit);
    }
}

//! Per-frame rendering orchestration.
//!
//! Owns the wgpu surface and device, the two shader programs (lit cubes and
//! light markers), and the shared cube vertex buffer. Each frame it reads
//! the camera snapshot, pushes matrices, material, and light descriptors
//! into the programs' uniform interfaces, and issues the fixed set of draw
//! calls — ten cubes, four markers. No culling, batching, or sorting; the
//! instance count is small and fixed.

use std::sync::Arc;

use cgmath::{perspective, Deg, EuclideanSpace, Matrix4, Point3};
use wgpu::util::DeviceExt;

use crate::gfx::{
    camera::FlyCamera,
    geometry::CUBE_VERTICES,
    lighting::{LightRig, Material},
    scene::{self, CUBE_POSITIONS, POINT_LIGHT_POSITIONS},
    shader::{RealizeParams, ShaderProgram},
    texture::{PixelData, Texture},
};

use super::vertex::Vertex3D;

const SCENE_VERTEX_PATH: &str = "shaders/cube.vert.wgsl";
const SCENE_FRAGMENT_PATH: &str = "shaders/cube.frag.wgsl";
const MARKER_VERTEX_PATH: &str = "shaders/light_marker.vert.wgsl";
const MARKER_FRAGMENT_PATH: &str = "shaders/light_marker.frag.wgsl";

/// Projection constants. The aspect ratio is fixed at this layer; resizes
/// reconfigure the surface but never the projection.
const ASPECT_RATIO: f32 = 800.0 / 600.0;
const NEAR_PLANE: f32 = 0.1;
const FAR_PLANE: f32 = 100.0;

/// Maps OpenGL's -1..1 clip-space depth onto wgpu's 0..1.
#[rustfmt::skip]
pub const OPENGL_TO_WGPU_MATRIX: Matrix4<f32> = Matrix4::new(
    1.0, 0.0, 0.0, 0.0,
    0.0, 1.0, 0.0, 0.0,
    0.0, 0.0, 0.5, 0.5,
    0.0, 0.0, 0.0, 1.0,
);

/// Core renderer managing GPU resources and the per-frame draw sequence.
pub struct FrameRenderer {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    depth_texture: Texture,
    scene_program: ShaderProgram,
    marker_program: ShaderProgram,
    material: Material,
    lights: LightRig,
    material_bind_group: wgpu::BindGroup,
    vertex_buffer: wgpu::Buffer,
}

impl FrameRenderer {
    /// Creates the renderer for the given window and builds both shader
    /// programs once.
    ///
    /// The material maps arrive as already-decoded pixels; the renderer
    /// never touches image files. A program that fails to build is logged
    /// and its draws are skipped — the frame loop keeps running.
    ///
    /// # Panics
    /// Panics if no adapter or device can be acquired; a machine that
    /// cannot create a GPU context cannot run this application at all.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        width: u32,
        height: u32,
        diffuse_pixels: &PixelData,
        specular_pixels: &PixelData,
    ) -> FrameRenderer {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window).unwrap();

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to request adapter!");

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults(),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await
            .expect("Failed to request a device!");
        let device = Arc::new(device);
        let queue = Arc::new(queue);

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| !f.is_srgb())
            .unwrap_or(surface_capabilities.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_capabilities.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let depth_texture = Texture::create_depth_texture(&device, &config, "depth_texture");

        let diffuse_map = Texture::from_pixels(&device, &queue, diffuse_pixels, "diffuse map");
        let specular_map = Texture::from_pixels(&device, &queue, specular_pixels, "specular map");

        let material_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("material maps layout"),
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
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Texture {
                        multisampled: false,
                        view_dimension: wgpu::TextureViewDimension::D2,
                        sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 3,
                    visibility: wgpu::ShaderStages::FRAGMENT,
                    ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                    count: None,
                },
            ],
        });

        let material_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("material maps bind group"),
            layout: &material_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&diffuse_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&diffuse_map.sampler),
                },
                wgpu::BindGroupEntry {
                    binding: 2,
                    resource: wgpu::BindingResource::TextureView(&specular_map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 3,
                    resource: wgpu::BindingResource::Sampler(&specular_map.sampler),
                },
            ],
        });

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cube vertices"),
            contents: bytemuck::cast_slice(&CUBE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let mut scene_program =
            ShaderProgram::from_files("scene", SCENE_VERTEX_PATH, SCENE_FRAGMENT_PATH);
        scene_program.build();
        scene_program.realize(
            &device,
            &RealizeParams {
                color_format: format,
                depth_format: Texture::DEPTH_FORMAT,
                vertex_layout: Vertex3D::desc(),
                extra_bind_group_layouts: &[&material_layout],
                slots: CUBE_POSITIONS.len() as u32,
            },
        );

        let mut marker_program =
            ShaderProgram::from_files("light marker", MARKER_VERTEX_PATH, MARKER_FRAGMENT_PATH);
        marker_program.build();
        marker_program.realize(
            &device,
            &RealizeParams {
                color_format: format,
                depth_format: Texture::DEPTH_FORMAT,
                vertex_layout: Vertex3D::desc(),
                extra_bind_group_layouts: &[],
                slots: POINT_LIGHT_POSITIONS.len() as u32,
            },
        );

        FrameRenderer {
            surface,
            device,
            queue,
            config,
            depth_texture,
            scene_program,
            marker_program,
            material: Material::default(),
            lights: LightRig::default(),
            material_bind_group,
            vertex_buffer,
        }
    }

    /// Reconfigures the surface after a window resize.
    ///
    /// The projection aspect stays the fixed constant; only presentation
    /// adapts to the new dimensions.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);
        self.depth_texture = Texture::create_depth_texture(&self.device, &self.config, "depth_texture");
    }

    /// Renders one frame from the camera's current state.
    pub fn render_frame(&mut self, camera: &FlyCamera) {
        let view = Matrix4::look_to_rh(
            Point3::from_vec(camera.position()),
            camera.front(),
            camera.up(),
        );
        let projection = OPENGL_TO_WGPU_MATRIX
            * perspective(Deg(camera.fov_deg()), ASPECT_RATIO, NEAR_PLANE, FAR_PLANE);

        // Stage per-draw uniforms: one slot per cube, then one per marker.
        for index in 0..CUBE_POSITIONS.len() {
            let program = &mut self.scene_program;
            program.set_mat4("model", scene::cube_model_matrix(index));
            program.set_mat4("view", view);
            program.set_mat4("projection", projection);
            program.set_vec3("viewPos", camera.position());
            self.material.write_uniforms(program);
            self.lights.write_uniforms(program, camera);
            program.upload_slot(&self.queue, index as u32);
        }

        for (index, position) in POINT_LIGHT_POSITIONS.iter().enumerate() {
            let program = &mut self.marker_program;
            program.set_mat4("model", scene::marker_model_matrix(*position));
            program.set_mat4("view", view);
            program.set_mat4("projection", projection);
            program.upload_slot(&self.queue, index as u32);
        }

        let frame = match self.surface.get_current_texture() {
            Ok(frame) => frame,
            Err(err) => {
                log::warn!("dropping frame, surface unavailable: {err}");
                self.surface.configure(&self.device, &self.config);
                return;
            }
        };
        let target = frame
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("frame encoder"),
            });

        {
            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("scene pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &target,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));

            // A program without GPU state (failed build) skips its draws;
            // the rest of the frame still renders.
            if self.scene_program.is_renderable() {
                for index in 0..CUBE_POSITIONS.len() as u32 {
                    self.scene_program.bind(&mut pass, index);
                    pass.set_bind_group(1, &self.material_bind_group, &[]);
                    pass.draw(0..CUBE_VERTICES.len() as u32, 0..1);
                }
            }

            if self.marker_program.is_renderable() {
                for index in 0..POINT_LIGHT_POSITIONS.len() as u32 {
                    self.marker_program.bind(&mut pass, index);
                    pass.draw(0..CUBE_VERTICES.len() as u32, 0..1);
                }
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        frame.present();
    }
}
